//! # sari-ledger: Stateful Ledger Managers for Sari POS
//!
//! This crate wires the pure domain logic of `sari-core` into concurrent,
//! in-memory ledger managers. It owns the shared store, the locking
//! discipline, and the audit checks; `sari-core` owns the arithmetic.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sari POS Ledger Flow                             │
//! │                                                                         │
//! │  Terminal / Shell (end_of_day demo, callers)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   sari-ledger (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────────┐  ┌──────────────┐  ┌────────────────────┐  │   │
//! │  │   │ CustomerLedger│  │ CreditManager│  │ ReconciliationEngine│  │   │
//! │  │   │ register      │  │ open_account │  │ record_transaction  │  │   │
//! │  │   │ record_sale   │  │ apply_payment│  │ x_reading           │  │   │
//! │  │   │ customer_view │  │ force_default│  │ z_reading           │  │   │
//! │  │   └──────┬───────┘  └──────┬───────┘  └─────────┬──────────┘  │   │
//! │  │          │    ┌────────────┘                    │              │   │
//! │  │          ▼    ▼        ┌──────────────┐         │              │   │
//! │  │   ┌──────────────┐     │ LoyaltyLedger│         │              │   │
//! │  │   │  LedgerStore │◄────│ earn / redeem│◄────────┘              │   │
//! │  │   │  (tokio locks│     └──────────────┘                        │   │
//! │  │   │   + audits)  │                                             │   │
//! │  │   └──────────────┘                                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              sari-core (pure types & arithmetic)                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - Shared in-memory tables, per-customer lock registry, audits
//! - [`customers`] - Customer Ledger Manager façade (sales, tiers, views)
//! - [`loyalty`] - Loyalty point ledger and reward catalog
//! - [`credit`] - Credit account lifecycle and payments
//! - [`reconciliation`] - Shift windows and X/Z readings
//! - [`error`] - Unified error type for all managers
//!
//! ## Concurrency Discipline
//!
//! 1. Every read-modify-write of one customer's aggregates holds that
//!    customer's async mutex for the whole logical transaction.
//! 2. Table locks (`RwLock`) are held briefly and never across another
//!    lock acquisition.
//! 3. Every mutation ends with an audit that the cached balances equal the
//!    ledger-derived sums; divergence surfaces as `InvariantViolation`.

pub mod credit;
pub mod customers;
pub mod error;
pub mod loyalty;
pub mod reconciliation;
pub mod store;

pub use credit::{CreditManager, PaymentOutcome};
pub use customers::{CustomerLedger, CustomerView, NewCustomer, SaleOutcome};
pub use error::{LedgerError, LedgerResult};
pub use loyalty::{LoyaltyLedger, NewReward};
pub use reconciliation::ReconciliationEngine;
pub use store::LedgerStore;
