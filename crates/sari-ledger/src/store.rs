//! # Ledger Store
//!
//! The shared, in-memory transactional store behind every manager.
//!
//! ## Logical Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         LedgerStore                                     │
//! │                                                                         │
//! │  customers   mutable aggregate rows, keyed by customer id              │
//! │  accounts    mutable header + append-only payment children             │
//! │  loyalty     append-only point ledger                                  │
//! │  rewards     mutable catalog rows                                      │
//! │  readings    append-only X/Z history                                   │
//! │                                                                         │
//! │  All rows carry a tenant partition key; the store itself treats it     │
//! │  as opaque.                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking Discipline
//! Every read-modify-write of one customer's aggregates must run under that
//! customer's entry in the lock registry, held for the whole logical
//! transaction:
//!
//! ```text
//! let lock = store.customer_lock("cust-1").await;
//! let _guard = lock.lock().await;
//! // read customer → mutate → append ledger entry → write back → audit
//! ```
//!
//! The per-table `RwLock`s only guard map integrity; they are held briefly
//! and never across another lock acquisition, so lock order cannot cycle.
//! Appends insert fully constructed records, so concurrent readers never
//! observe a partially written entry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use sari_core::{
    CoreError, CoreResult, CreditAccount, CreditStatus, Customer, LoyaltyTransaction, Money,
    Reading, Reward,
};

// =============================================================================
// Ledger Store
// =============================================================================

/// Shared state for the whole ledger. Cheap to clone via `Arc`.
#[derive(Debug, Default)]
pub struct LedgerStore {
    pub(crate) customers: RwLock<HashMap<String, Customer>>,
    pub(crate) accounts: RwLock<HashMap<String, CreditAccount>>,
    pub(crate) loyalty: RwLock<Vec<LoyaltyTransaction>>,
    pub(crate) rewards: RwLock<HashMap<String, Reward>>,
    pub(crate) readings: RwLock<Vec<Reading>>,
    /// Per-customer lock registry, created on first touch and never dropped
    /// (a customer row is never hard-deleted either).
    customer_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl LedgerStore {
    /// Creates an empty store.
    pub fn new() -> Arc<Self> {
        Arc::new(LedgerStore::default())
    }

    // -------------------------------------------------------------------------
    // Lock registry
    // -------------------------------------------------------------------------

    /// Returns the serialization lock for a customer id.
    ///
    /// Callers hold the returned lock for the duration of the whole logical
    /// transaction, including the invariant audit at the end.
    pub(crate) async fn customer_lock(&self, customer_id: &str) -> Arc<Mutex<()>> {
        let mut registry = self.customer_locks.lock().await;
        registry
            .entry(customer_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    // -------------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------------

    pub(crate) async fn get_customer(&self, id: &str) -> Option<Customer> {
        self.customers.read().await.get(id).cloned()
    }

    /// Fetches a customer or fails with the domain error.
    pub(crate) async fn require_customer(&self, id: &str) -> CoreResult<Customer> {
        self.get_customer(id)
            .await
            .ok_or_else(|| CoreError::CustomerNotFound(id.to_string()))
    }

    /// Writes back a customer row (insert or overwrite).
    pub(crate) async fn put_customer(&self, customer: Customer) {
        self.customers
            .write()
            .await
            .insert(customer.id.clone(), customer);
    }

    // -------------------------------------------------------------------------
    // Credit accounts
    // -------------------------------------------------------------------------

    pub(crate) async fn get_account(&self, id: &str) -> Option<CreditAccount> {
        self.accounts.read().await.get(id).cloned()
    }

    pub(crate) async fn require_account(&self, id: &str) -> CoreResult<CreditAccount> {
        self.get_account(id)
            .await
            .ok_or_else(|| CoreError::AccountNotFound(id.to_string()))
    }

    pub(crate) async fn put_account(&self, account: CreditAccount) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }

    /// All credit accounts of one customer, oldest first.
    pub(crate) async fn accounts_for_customer(&self, customer_id: &str) -> Vec<CreditAccount> {
        let mut accounts: Vec<CreditAccount> = self
            .accounts
            .read()
            .await
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.created_date);
        accounts
    }

    /// Sum of `current_balance` over the customer's non-paid accounts.
    ///
    /// This is the ground truth behind `Customer::current_credit`. Defaulted
    /// balances still count as exposure; only `Paid` accounts leave the sum.
    pub(crate) async fn credit_exposure(&self, customer_id: &str) -> Money {
        self.accounts
            .read()
            .await
            .values()
            .filter(|a| a.customer_id == customer_id && a.status != CreditStatus::Paid)
            .map(|a| a.current_balance)
            .sum()
    }

    // -------------------------------------------------------------------------
    // Loyalty ledger
    // -------------------------------------------------------------------------

    /// Appends a fully constructed loyalty entry. Append-only: entries are
    /// never mutated or removed; corrections are new `Adjustment` entries.
    pub(crate) async fn append_loyalty(&self, entry: LoyaltyTransaction) {
        self.loyalty.write().await.push(entry);
    }

    /// The customer's ledger entries, oldest first.
    pub(crate) async fn loyalty_for_customer(&self, customer_id: &str) -> Vec<LoyaltyTransaction> {
        self.loyalty
            .read()
            .await
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect()
    }

    /// Signed sum of the customer's point deltas.
    ///
    /// This is the ground truth behind `Customer::loyalty_points`.
    pub(crate) async fn loyalty_balance(&self, customer_id: &str) -> i64 {
        self.loyalty
            .read()
            .await
            .iter()
            .filter(|t| t.customer_id == customer_id)
            .map(|t| t.points)
            .sum()
    }

    // -------------------------------------------------------------------------
    // Readings
    // -------------------------------------------------------------------------

    /// Appends a reading to the immutable history.
    pub(crate) async fn append_reading(&self, reading: Reading) {
        self.readings.write().await.push(reading);
    }

    /// Readings for a tenant whose generation timestamp falls in the range.
    pub(crate) async fn readings_in_range(
        &self,
        tenant_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Reading> {
        self.readings
            .read()
            .await
            .iter()
            .filter(|r| {
                r.tenant_id() == tenant_id && r.generated_at() >= from && r.generated_at() <= to
            })
            .cloned()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Invariant audit
    // -------------------------------------------------------------------------

    /// Verifies the cached aggregates against their ledger-derived values.
    ///
    /// Called at the end of every mutating transaction, still under the
    /// customer's lock. Divergence means a bug in this crate, so it is
    /// logged loudly and surfaced, never swallowed.
    pub(crate) async fn audit_customer(&self, customer_id: &str) -> CoreResult<()> {
        let customer = self.require_customer(customer_id).await?;

        let derived_points = self.loyalty_balance(customer_id).await;
        if customer.loyalty_points != derived_points {
            warn!(
                customer_id,
                cached = customer.loyalty_points,
                derived = derived_points,
                "loyalty balance cache diverged from ledger sum"
            );
            return Err(CoreError::invariant(format!(
                "customer {}: cached loyalty_points {} != ledger sum {}",
                customer_id, customer.loyalty_points, derived_points
            )));
        }

        let derived_credit = self.credit_exposure(customer_id).await;
        if customer.current_credit != derived_credit {
            warn!(
                customer_id,
                cached = %customer.current_credit,
                derived = %derived_credit,
                "credit exposure cache diverged from account balances"
            );
            return Err(CoreError::invariant(format!(
                "customer {}: cached current_credit {} != account sum {}",
                customer_id, customer.current_credit, derived_credit
            )));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sari_core::{LoyaltyEntryType, Tier};

    fn customer(id: &str, points: i64) -> Customer {
        Customer {
            id: id.to_string(),
            tenant_id: "tenant-1".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Garcia".to_string(),
            email: None,
            phone: "09182222222".to_string(),
            address: None,
            notes: None,
            registered_date: Utc::now(),
            total_purchases: 0,
            total_spent: Money::zero(),
            loyalty_points: points,
            credit_limit: Tier::Bronze.benefits().credit_limit,
            current_credit: Money::zero(),
            tier: Tier::Bronze,
            is_active: true,
        }
    }

    fn earn_entry(customer_id: &str, points: i64) -> LoyaltyTransaction {
        LoyaltyTransaction {
            id: uuid::Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tenant_id: "tenant-1".to_string(),
            entry_type: LoyaltyEntryType::Earn,
            points,
            sale_id: None,
            reward_id: None,
            reason: "test".to_string(),
            recorded_at: Utc::now(),
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_audit_passes_when_cache_matches() {
        let store = LedgerStore::new();
        store.put_customer(customer("cust-1", 150)).await;
        store.append_loyalty(earn_entry("cust-1", 100)).await;
        store.append_loyalty(earn_entry("cust-1", 50)).await;

        assert!(store.audit_customer("cust-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_audit_catches_divergence() {
        let store = LedgerStore::new();
        store.put_customer(customer("cust-1", 999)).await;
        store.append_loyalty(earn_entry("cust-1", 100)).await;

        let err = store.audit_customer("cust-1").await.unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { .. }));
    }

    #[tokio::test]
    async fn test_loyalty_balance_sums_signed_deltas() {
        let store = LedgerStore::new();
        store.append_loyalty(earn_entry("cust-1", 500)).await;
        store.append_loyalty(earn_entry("cust-1", -200)).await;
        store.append_loyalty(earn_entry("cust-2", 50)).await;

        assert_eq!(store.loyalty_balance("cust-1").await, 300);
        assert_eq!(store.loyalty_balance("cust-2").await, 50);
        assert_eq!(store.loyalty_balance("cust-3").await, 0);
    }

    #[tokio::test]
    async fn test_customer_lock_is_stable_per_id() {
        let store = LedgerStore::new();
        let a = store.customer_lock("cust-1").await;
        let b = store.customer_lock("cust-1").await;
        let c = store.customer_lock("cust-2").await;

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
