//! # sari-core: Pure Business Logic for Sari POS
//!
//! This crate is the **heart** of the customer financial ledger. It contains
//! all business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            UI / admin collaborators (external)                  │   │
//! │  │    Catalog ──► Checkout ──► Customer screens ──► Reports       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ data-shaped API                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                sari-ledger (stateful engine)                    │   │
//! │  │    customer ledger • credit accounts • loyalty • readings      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ sari-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   tier    │  │  reading  │  │   │
//! │  │   │ Customer  │  │   Money   │  │   Tier    │  │  Totals   │  │   │
//! │  │   │  Credit   │  │ centavos  │  │ benefits  │  │  X / Z    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO LOCKS • TIME ARRIVES AS ARGUMENTS • PURE          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, CreditAccount, LoyaltyTransaction, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`tier`] - Tier Policy Engine (pure spend → tier → benefits mapping)
//! - [`reading`] - X/Z reading aggregation and snapshot types
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64)
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod reading;
pub mod tier;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use sari_core::Money` instead of
// `use sari_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use reading::{Reading, ReadingTotals, XReading, ZReading};
pub use tier::{Tier, TierBenefits};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for single-store deployments.
///
/// The schema is multi-tenant (every row carries a tenant id) but a
/// single-store runtime partitions everything under this one key.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// How long earned points stay valid before they may be expired, in days.
///
/// Expiry itself is a scheduling decision made outside the ledger; this is
/// only the horizon stamped on `Earn` entries. The loyalty ledger lets the
/// deployment override it.
pub const DEFAULT_POINTS_EXPIRY_DAYS: i64 = 365;
