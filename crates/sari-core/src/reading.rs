//! # Reading Module
//!
//! Pure aggregation for X/Z readings and the snapshot types themselves.
//!
//! ## X vs Z
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  X-READING (interim)              Z-READING (closing)                   │
//! │  ──────────────────────           ─────────────────────                 │
//! │  totals over the open window      everything an X-reading has, plus    │
//! │  repeatable, no reset             declared cash, expected cash and     │
//! │                                   variance; closes the window          │
//! │                                                                         │
//! │  variance = declared − expected, expected = cash subtotal              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A reading is a snapshot, not a live query: once generated it is never
//! recomputed, even if the transaction set it came from changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::SaleRecord;

// =============================================================================
// Reading Totals
// =============================================================================

/// Sales/payment-method breakdown over a transaction set.
///
/// Pure and deterministic: the same transaction set always produces the same
/// totals. Generating totals never alters the transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ReadingTotals {
    pub total_sales: Money,
    pub transaction_count: i64,
    /// Subtotal of sales tendered in cash.
    pub cash_sales: Money,
    /// Subtotal of every non-cash method.
    pub digital_sales: Money,
}

impl ReadingTotals {
    /// Aggregates a transaction set.
    pub fn summarize(transactions: &[SaleRecord]) -> ReadingTotals {
        let cash_sales: Money = transactions
            .iter()
            .filter(|t| t.payment_method.is_cash())
            .map(|t| t.total)
            .sum();
        let digital_sales: Money = transactions
            .iter()
            .filter(|t| !t.payment_method.is_cash())
            .map(|t| t.total)
            .sum();

        ReadingTotals {
            total_sales: cash_sales + digital_sales,
            transaction_count: transactions.len() as i64,
            cash_sales,
            digital_sales,
        }
    }
}

// =============================================================================
// X-Reading
// =============================================================================

/// Non-destructive interim sales summary. Immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct XReading {
    pub id: String,
    pub tenant_id: String,
    /// Start of the covered window (opening of the shift).
    #[ts(as = "String")]
    pub period_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    /// The transaction set this reading summarizes, frozen at generation.
    pub transactions: Vec<SaleRecord>,
    pub totals: ReadingTotals,
    /// Operator who ran the reading.
    pub cashier: String,
}

// =============================================================================
// Z-Reading
// =============================================================================

/// End-of-period summary with cash-drawer reconciliation. Immutable snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ZReading {
    pub id: String,
    pub tenant_id: String,
    #[ts(as = "String")]
    pub period_start: DateTime<Utc>,
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub transactions: Vec<SaleRecord>,
    pub totals: ReadingTotals,
    /// Cash counted in the drawer at close.
    pub closing_cash: Money,
    /// What the drawer should hold: the cash subtotal.
    pub expected_cash: Money,
    /// `closing_cash - expected_cash`. Positive = over, negative = short.
    pub variance: Money,
    pub closed_by: String,
}

// =============================================================================
// Reading (history entry)
// =============================================================================

/// Either kind of reading, as stored in the append-only history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reading {
    X(XReading),
    Z(ZReading),
}

impl Reading {
    pub fn id(&self) -> &str {
        match self {
            Reading::X(r) => &r.id,
            Reading::Z(r) => &r.id,
        }
    }

    pub fn tenant_id(&self) -> &str {
        match self {
            Reading::X(r) => &r.tenant_id,
            Reading::Z(r) => &r.tenant_id,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        match self {
            Reading::X(r) => r.generated_at,
            Reading::Z(r) => r.generated_at,
        }
    }

    pub fn totals(&self) -> &ReadingTotals {
        match self {
            Reading::X(r) => &r.totals,
            Reading::Z(r) => &r.totals,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
