//! # Domain Types
//!
//! Core domain types for the customer financial ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Customer     │   │  CreditAccount  │   │  CreditPayment  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  aggregates     │   │  balance/status │   │  amount/method  │       │
//! │  │  tier           │   │  due date       │   │  processed_by   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ LoyaltyTxn      │   │     Reward      │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  signed points  │   │  points_cost    │   │  total          │       │
//! │  │  append-only    │   │  stock          │   │  payment method │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cached Aggregates vs the Ledger
//! `Customer.loyalty_points` and `Customer.current_credit` are materialized
//! projections for fast reads. The loyalty log and the credit accounts are
//! the ground truth; every mutation path updates the projection in the same
//! logical transaction, and divergence is an `InvariantViolation`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::tier::Tier;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale or credit payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment. Counts toward the drawer at reconciliation.
    Cash,
    /// Card payment on external terminal.
    ExternalCard,
    /// E-wallet transfer (GCash and the like).
    DigitalWallet,
}

impl PaymentMethod {
    /// Whether this method puts money in the physical drawer.
    ///
    /// X/Z readings split subtotals on exactly this predicate: cash versus
    /// everything else ("digital").
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A registered customer with lifetime aggregates.
///
/// Mutated only through the Customer Ledger Manager. Never hard-deleted while
/// referenced by a credit account or loyalty entry; `is_active` is the soft
/// delete flag.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant partition key (opaque to the ledger).
    pub tenant_id: String,

    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: Option<String>,
    pub notes: Option<String>,

    /// When the customer registered.
    #[ts(as = "String")]
    pub registered_date: DateTime<Utc>,

    /// Lifetime count of recorded sales.
    pub total_purchases: i64,

    /// Lifetime spend. Drives tier selection.
    pub total_spent: Money,

    /// Cached point balance. Always equals the signed sum of the customer's
    /// loyalty ledger entries.
    pub loyalty_points: i64,

    /// Credit limit granted by the current tier.
    pub credit_limit: Money,

    /// Cached outstanding credit. Always equals the sum of `current_balance`
    /// across the customer's non-paid credit accounts.
    pub current_credit: Money,

    /// Current loyalty tier, re-derived after every spend-increasing event.
    pub tier: Tier,

    /// Soft delete flag.
    pub is_active: bool,
}

impl Customer {
    /// Display name for receipts and reports.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Remaining credit headroom under the tier limit.
    pub fn credit_headroom(&self) -> Money {
        self.credit_limit.saturating_sub_floor(self.current_credit)
    }
}

// =============================================================================
// Credit Status
// =============================================================================

/// The status of a credit account.
///
/// Status is never set directly by callers; it is derived from balance and
/// due date after every mutation (see [`CreditStatus::derive`]). `Defaulted`
/// is reachable only through the explicit administrative transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    /// Balance outstanding, not yet due.
    Active,
    /// Balance reached zero. Terminal.
    Paid,
    /// Balance outstanding past the due date.
    Overdue,
    /// Written off by an administrator. Terminal.
    Defaulted,
}

impl CreditStatus {
    /// Derives the status from balance and due date.
    ///
    /// One pure function called at every balance change, so the
    /// `status == Paid ⇔ balance == 0` invariant holds mechanically.
    /// Never derives `Defaulted`; that transition is manual.
    pub fn derive(balance: Money, due_date: DateTime<Utc>, now: DateTime<Utc>) -> CreditStatus {
        if balance.is_zero() {
            CreditStatus::Paid
        } else if now > due_date {
            CreditStatus::Overdue
        } else {
            CreditStatus::Active
        }
    }

    /// Terminal statuses accept no further payments.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, CreditStatus::Paid | CreditStatus::Defaulted)
    }
}

// =============================================================================
// Credit Account
// =============================================================================

/// A customer credit/loan account.
///
/// Created when credit is extended; mutated by payments; never deleted, only
/// transitions to a terminal status.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditAccount {
    pub id: String,
    pub customer_id: String,
    pub tenant_id: String,

    /// Amount originally extended.
    pub principal: Money,

    /// Outstanding balance. Invariant: `0 <= current_balance <= principal`.
    pub current_balance: Money,

    /// Interest rate in basis points. Recorded for the paper trail; the
    /// ledger never accrues it.
    pub interest_rate_bps: u32,

    #[ts(as = "String")]
    pub due_date: DateTime<Utc>,

    pub status: CreditStatus,

    /// Append-only, ordered by payment date.
    pub payment_history: Vec<CreditPayment>,

    #[ts(as = "String")]
    pub created_date: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub last_payment_date: Option<DateTime<Utc>>,
}

// =============================================================================
// Credit Payment
// =============================================================================

/// A payment towards a credit account. Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreditPayment {
    pub id: String,
    pub credit_account_id: String,
    pub amount: Money,
    #[ts(as = "String")]
    pub payment_date: DateTime<Utc>,
    pub method: PaymentMethod,
    /// Operator who took the payment.
    pub processed_by: String,
    pub note: Option<String>,
}

// =============================================================================
// Loyalty Ledger Entry
// =============================================================================

/// The kind of point-changing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyEntryType {
    /// Points earned from a sale. Carries an expiry horizon.
    Earn,
    /// Points spent on a reward. Negative delta.
    Redeem,
    /// Points lapsed past their expiry horizon. Negative delta.
    Expire,
    /// Manual correction. Signed delta; corrections are new entries, never
    /// edits of old ones.
    Adjustment,
}

/// An immutable loyalty ledger entry.
///
/// The current point balance is always derivable by summing `points` over a
/// customer's entries. No entry is ever mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoyaltyTransaction {
    pub id: String,
    pub customer_id: String,
    pub tenant_id: String,
    pub entry_type: LoyaltyEntryType,
    /// Signed point delta.
    pub points: i64,
    /// Originating sale, when the entry came from a purchase.
    pub sale_id: Option<String>,
    /// Originating reward, when the entry came from a redemption.
    pub reward_id: Option<String>,
    pub reason: String,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
    /// Only `Earn` entries carry an expiry.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Reward
// =============================================================================

/// A reward catalog item.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Reward {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub points_cost: i64,
    /// Cash-equivalent value of the reward.
    pub cash_value: Money,
    pub category: String,
    pub is_active: bool,
    /// Remaining stock; `None` means untracked.
    pub stock: Option<i64>,
}

impl Reward {
    /// Whether the reward can currently be redeemed at all
    /// (active and, if stock is tracked, in stock).
    pub fn is_redeemable(&self) -> bool {
        self.is_active && self.stock.map_or(true, |s| s > 0)
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A completed sale as reported by the product/sale collaborator.
///
/// The ledger does not own checkout; it consumes this record twice — once
/// into the customer aggregates (when a customer is attached) and once into
/// the shift reconciliation window.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRecord {
    pub id: String,
    pub tenant_id: String,
    /// Walk-in sales carry no customer.
    pub customer_id: Option<String>,
    pub total: Money,
    pub payment_method: PaymentMethod,
    /// Line item count, carried for the report footer.
    pub item_count: i64,
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
