//! # Shift Reconciliation Engine
//!
//! Accumulates completed sales per tenant into an open shift window and turns
//! that window into X and Z readings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shift Window Lifecycle                          │
//! │                                                                         │
//! │   record_transaction ──┐                                                │
//! │   record_transaction ──┼──▶ open window (per tenant)                    │
//! │   record_transaction ──┘         │                                      │
//! │                                  │                                      │
//! │   x_reading  ──▶ snapshot, window stays open (repeatable)               │
//! │                                  │                                      │
//! │   z_reading  ──▶ snapshot + cash reconciliation, window CLOSED:         │
//! │                  transactions archived, next cycle starts empty         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Readings are append-only snapshots. Reprinting one later reads it back
//! from history; nothing is ever recomputed from live data.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use sari_core::validation::validate_operator;
use sari_core::{
    CoreError, Money, Reading, ReadingTotals, SaleRecord, XReading, ZReading,
};

use crate::error::LedgerResult;
use crate::store::LedgerStore;

// =============================================================================
// Shift Window
// =============================================================================

/// The open accumulation window of one tenant.
#[derive(Debug)]
struct ShiftWindow {
    opened_at: DateTime<Utc>,
    transactions: Vec<SaleRecord>,
}

impl ShiftWindow {
    fn open(now: DateTime<Utc>) -> Self {
        ShiftWindow {
            opened_at: now,
            transactions: Vec::new(),
        }
    }
}

// =============================================================================
// Reconciliation Engine
// =============================================================================

/// Per-tenant shift accumulation and X/Z reading generation.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    store: Arc<LedgerStore>,
    // One window per tenant. A plain mutex over the map keeps window swaps
    // (Z-readings) atomic with respect to concurrent sale recording for the
    // same tenant; other tenants contend only for the map lookup.
    windows: Arc<Mutex<HashMap<String, ShiftWindow>>>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        ReconciliationEngine {
            store,
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Appends a completed sale to the tenant's open window, opening one if
    /// this is the first sale of the cycle.
    pub async fn record_transaction(&self, sale: SaleRecord) {
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry(sale.tenant_id.clone())
            .or_insert_with(|| ShiftWindow::open(Utc::now()));
        debug!(
            tenant_id = %sale.tenant_id,
            sale_id = %sale.id,
            total = %sale.total,
            "transaction recorded"
        );
        window.transactions.push(sale);
    }

    /// Generates an X reading: a snapshot of the open window. The window
    /// stays open, so a second X over the same window reproduces the same
    /// totals (plus whatever sold in between).
    pub async fn x_reading(&self, tenant_id: &str, cashier: &str) -> LedgerResult<XReading> {
        validate_operator(cashier)?;

        let now = Utc::now();
        let reading = {
            // Read-only against the window map: a reading for a tenant that
            // never sold reports an empty window without creating one.
            let windows = self.windows.lock().await;
            let (period_start, transactions) = match windows.get(tenant_id) {
                Some(window) => (window.opened_at, window.transactions.clone()),
                None => (now, Vec::new()),
            };
            XReading {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                period_start,
                generated_at: now,
                totals: ReadingTotals::summarize(&transactions),
                transactions,
                cashier: cashier.to_string(),
            }
        };

        self.store.append_reading(Reading::X(reading.clone())).await;
        info!(
            tenant_id,
            reading_id = %reading.id,
            transactions = reading.totals.transaction_count,
            total_sales = %reading.totals.total_sales,
            "X reading generated"
        );
        Ok(reading)
    }

    /// Generates a Z reading and closes the shift window.
    ///
    /// Expected cash is the cash subtotal of the window; variance is
    /// `declared − expected` (negative means a shortage). The covered
    /// transactions move into the reading itself and the next cycle starts
    /// from an empty window.
    pub async fn z_reading(
        &self,
        tenant_id: &str,
        declared_cash: Money,
        closed_by: &str,
    ) -> LedgerResult<ZReading> {
        validate_operator(closed_by)?;
        if declared_cash.is_negative() {
            return Err(CoreError::invalid_amount(
                "declared cash",
                "counted drawer cash cannot be negative",
            )
            .into());
        }

        let now = Utc::now();
        let reading = {
            let mut windows = self.windows.lock().await;
            // Closing removes the window outright; the next recorded sale
            // opens a fresh one. A Z against a tenant with no window is an
            // empty close.
            let closed = windows
                .remove(tenant_id)
                .unwrap_or_else(|| ShiftWindow::open(now));
            let totals = ReadingTotals::summarize(&closed.transactions);
            let expected_cash = totals.cash_sales;
            ZReading {
                id: Uuid::new_v4().to_string(),
                tenant_id: tenant_id.to_string(),
                period_start: closed.opened_at,
                generated_at: now,
                totals,
                transactions: closed.transactions,
                closing_cash: declared_cash,
                expected_cash,
                variance: declared_cash - expected_cash,
                closed_by: closed_by.to_string(),
            }
        };

        self.store.append_reading(Reading::Z(reading.clone())).await;
        info!(
            tenant_id,
            reading_id = %reading.id,
            expected = %reading.expected_cash,
            declared = %reading.closing_cash,
            variance = %reading.variance,
            "Z reading generated, shift closed"
        );
        Ok(reading)
    }

    /// Readings of one tenant whose generation timestamp falls in
    /// `[from, to]`, oldest first. Pure history read; safe for reprints.
    pub async fn reading_history(
        &self,
        tenant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Reading> {
        self.store.readings_in_range(tenant_id, from, to).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sari_core::PaymentMethod;

    fn sale(tenant: &str, cents: i64, method: PaymentMethod) -> SaleRecord {
        SaleRecord {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant.to_string(),
            customer_id: None,
            total: Money::from_cents(cents),
            payment_method: method,
            item_count: 1,
            recorded_at: Utc::now(),
        }
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(LedgerStore::new())
    }

    #[tokio::test]
    async fn test_x_reading_snapshots_open_window() {
        let engine = engine();
        engine
            .record_transaction(sale("tenant-1", 50_000, PaymentMethod::Cash))
            .await;
        engine
            .record_transaction(sale("tenant-1", 30_000, PaymentMethod::DigitalWallet))
            .await;

        let x = engine.x_reading("tenant-1", "Ana").await.unwrap();
        assert_eq!(x.totals.transaction_count, 2);
        assert_eq!(x.totals.total_sales, Money::from_cents(80_000));
        assert_eq!(x.totals.cash_sales, Money::from_cents(50_000));
        assert_eq!(x.totals.digital_sales, Money::from_cents(30_000));
        assert_eq!(x.transactions.len(), 2);
    }

    /// Two X readings over an unchanged window report identical totals.
    #[tokio::test]
    async fn test_double_x_is_deterministic() {
        let engine = engine();
        engine
            .record_transaction(sale("tenant-1", 42_000, PaymentMethod::Cash))
            .await;

        let first = engine.x_reading("tenant-1", "Ana").await.unwrap();
        let second = engine.x_reading("tenant-1", "Ana").await.unwrap();

        assert_eq!(first.totals, second.totals);
        assert_eq!(first.period_start, second.period_start);
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_z_reading_reconciles_and_closes() {
        let engine = engine();
        engine
            .record_transaction(sale("tenant-1", 60_000, PaymentMethod::Cash))
            .await;
        engine
            .record_transaction(sale("tenant-1", 40_000, PaymentMethod::ExternalCard))
            .await;

        // Drawer counted ₱590.00 against ₱600.00 of cash sales
        let z = engine
            .z_reading("tenant-1", Money::from_cents(59_000), "Ana")
            .await
            .unwrap();
        assert_eq!(z.expected_cash, Money::from_cents(60_000));
        assert_eq!(z.closing_cash, Money::from_cents(59_000));
        assert_eq!(z.variance, Money::from_cents(-1_000));
        assert_eq!(z.totals.total_sales, Money::from_cents(100_000));

        // The Z closed the window: the next X starts empty
        let x = engine.x_reading("tenant-1", "Ana").await.unwrap();
        assert_eq!(x.totals.transaction_count, 0);
        assert_eq!(x.totals.total_sales, Money::zero());
        assert!(x.period_start >= z.generated_at);
    }

    #[tokio::test]
    async fn test_x_reading_on_unknown_tenant_opens_no_window() {
        let engine = engine();
        let x = engine.x_reading("tenant-ghost", "Ana").await.unwrap();
        assert_eq!(x.totals.transaction_count, 0);
        assert_eq!(x.period_start, x.generated_at);

        // The read left no window behind: the window opens when the first
        // sale is recorded, not at the earlier read.
        engine
            .record_transaction(sale("tenant-ghost", 10_000, PaymentMethod::Cash))
            .await;
        let next = engine.x_reading("tenant-ghost", "Ana").await.unwrap();
        assert_eq!(next.totals.transaction_count, 1);
        assert!(next.period_start > x.generated_at);
    }

    #[tokio::test]
    async fn test_z_reading_on_empty_window() {
        let engine = engine();
        let z = engine
            .z_reading("tenant-1", Money::zero(), "Ana")
            .await
            .unwrap();
        assert_eq!(z.totals.transaction_count, 0);
        assert_eq!(z.expected_cash, Money::zero());
        assert_eq!(z.variance, Money::zero());
    }

    #[tokio::test]
    async fn test_z_reading_rejects_negative_declared_cash() {
        let engine = engine();
        let err = engine
            .z_reading("tenant-1", Money::from_cents(-1), "Ana")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::LedgerError::Core(CoreError::InvalidAmount { .. })
        ));
    }

    #[tokio::test]
    async fn test_tenants_are_isolated() {
        let engine = engine();
        engine
            .record_transaction(sale("tenant-1", 10_000, PaymentMethod::Cash))
            .await;
        engine
            .record_transaction(sale("tenant-2", 99_000, PaymentMethod::Cash))
            .await;

        let x1 = engine.x_reading("tenant-1", "Ana").await.unwrap();
        let x2 = engine.x_reading("tenant-2", "Ben").await.unwrap();
        assert_eq!(x1.totals.total_sales, Money::from_cents(10_000));
        assert_eq!(x2.totals.total_sales, Money::from_cents(99_000));

        // Closing tenant-1 leaves tenant-2's window alone
        engine
            .z_reading("tenant-1", Money::from_cents(10_000), "Ana")
            .await
            .unwrap();
        let x2_again = engine.x_reading("tenant-2", "Ben").await.unwrap();
        assert_eq!(x2_again.totals.total_sales, Money::from_cents(99_000));
    }

    #[tokio::test]
    async fn test_reading_history_filters_by_range() {
        let engine = engine();
        let before = Utc::now();
        engine
            .record_transaction(sale("tenant-1", 10_000, PaymentMethod::Cash))
            .await;
        engine.x_reading("tenant-1", "Ana").await.unwrap();
        engine
            .z_reading("tenant-1", Money::from_cents(10_000), "Ana")
            .await
            .unwrap();
        let after = Utc::now();

        let readings = engine.reading_history("tenant-1", before, after).await;
        assert_eq!(readings.len(), 2);
        assert!(matches!(readings[0], Reading::X(_)));
        assert!(matches!(readings[1], Reading::Z(_)));

        // A range in the past matches nothing
        let none = engine
            .reading_history("tenant-1", before - chrono::Duration::days(2), before - chrono::Duration::days(1))
            .await;
        assert!(none.is_empty());
    }
}
