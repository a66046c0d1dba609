//! # Loyalty Ledger
//!
//! Append-only log of point-changing events per customer, plus the reward
//! catalog redemptions draw from.
//!
//! ## Entry Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Loyalty Ledger Operations                          │
//! │                                                                         │
//! │  Sale completes ────────► earn_points() ──────► Earn  (+points, expiry)│
//! │                                                                         │
//! │  Reward claimed ────────► redeem_reward() ────► Redeem (−points_cost)  │
//! │                                                                         │
//! │  Scheduler decides ─────► expire_points() ────► Expire (−points)       │
//! │                                                                         │
//! │  Manual correction ─────► adjust_points() ────► Adjustment (±points)   │
//! │                                                                         │
//! │  Entries are never mutated or deleted. The customer's cached balance   │
//! │  is updated in the same critical section as every append, and the      │
//! │  audit at the end of each operation proves cache == ledger sum.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use sari_core::validation::{validate_name, validate_positive_points};
use sari_core::{
    CoreError, Customer, LoyaltyEntryType, LoyaltyTransaction, Money, Reward,
    DEFAULT_POINTS_EXPIRY_DAYS,
};

use crate::error::LedgerResult;
use crate::store::LedgerStore;

// =============================================================================
// Reward intake
// =============================================================================

/// Input for adding a reward to the catalog.
#[derive(Debug, Clone)]
pub struct NewReward {
    pub tenant_id: String,
    pub name: String,
    pub description: String,
    pub points_cost: i64,
    pub cash_value: Money,
    pub category: String,
    /// `None` means stock is not tracked.
    pub stock: Option<i64>,
}

// =============================================================================
// Loyalty Ledger
// =============================================================================

/// Manager for the append-only loyalty ledger and the reward catalog.
#[derive(Debug, Clone)]
pub struct LoyaltyLedger {
    store: Arc<LedgerStore>,
    /// Horizon stamped on `Earn` entries.
    expiry_horizon: Duration,
}

impl LoyaltyLedger {
    /// Creates a ledger with the default one-year expiry horizon.
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self::with_expiry_days(store, DEFAULT_POINTS_EXPIRY_DAYS)
    }

    /// Creates a ledger with a deployment-specific expiry horizon.
    pub fn with_expiry_days(store: Arc<LedgerStore>, days: i64) -> Self {
        LoyaltyLedger {
            store,
            expiry_horizon: Duration::days(days),
        }
    }

    // -------------------------------------------------------------------------
    // Point mutations
    // -------------------------------------------------------------------------

    /// Awards points to a customer.
    ///
    /// Appends an `Earn` entry carrying the expiry horizon and raises the
    /// cached balance in the same transaction.
    pub async fn earn_points(
        &self,
        customer_id: &str,
        points: i64,
        reason: impl Into<String>,
        sale_id: Option<String>,
    ) -> LedgerResult<LoyaltyTransaction> {
        validate_positive_points(points)?;

        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;
        if !customer.is_active {
            return Err(CoreError::CustomerInactive(customer_id.to_string()).into());
        }

        let entry = self
            .earn_locked(&mut customer, points, reason.into(), sale_id)
            .await;
        self.store.put_customer(customer).await;
        self.store.audit_customer(customer_id).await?;

        Ok(entry)
    }

    /// Appends an `Earn` entry for a customer whose lock the caller already
    /// holds, and raises the cached balance on the caller's working copy.
    ///
    /// The caller is responsible for writing the customer back and running
    /// the audit; this is the shared path between `earn_points` and the
    /// Customer Ledger Manager's `record_sale`.
    pub(crate) async fn earn_locked(
        &self,
        customer: &mut Customer,
        points: i64,
        reason: String,
        sale_id: Option<String>,
    ) -> LoyaltyTransaction {
        let now = Utc::now();
        let entry = LoyaltyTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: customer.id.clone(),
            tenant_id: customer.tenant_id.clone(),
            entry_type: LoyaltyEntryType::Earn,
            points,
            sale_id,
            reward_id: None,
            reason,
            recorded_at: now,
            expires_at: Some(now + self.expiry_horizon),
        };

        debug!(customer_id = %customer.id, points, "appending earn entry");
        self.store.append_loyalty(entry.clone()).await;
        customer.loyalty_points += points;
        entry
    }

    /// Redeems a reward for a customer.
    ///
    /// The point check-and-deduct is atomic with respect to other
    /// redemptions for the same customer (customer lock), and the stock
    /// check-and-decrement is atomic per reward (catalog write lock). A
    /// failed redemption leaves balance, ledger and stock untouched.
    pub async fn redeem_reward(
        &self,
        customer_id: &str,
        reward_id: &str,
    ) -> LedgerResult<LoyaltyTransaction> {
        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;
        if !customer.is_active {
            return Err(CoreError::CustomerInactive(customer_id.to_string()).into());
        }

        // Check and decrement stock under one catalog write guard. Every
        // failure path returns before anything is touched.
        let reward = {
            let mut rewards = self.store.rewards.write().await;
            let reward = rewards
                .get_mut(reward_id)
                .ok_or_else(|| CoreError::RewardNotFound(reward_id.to_string()))?;

            if !reward.is_active {
                return Err(CoreError::RewardInactive(reward_id.to_string()).into());
            }
            if matches!(reward.stock, Some(s) if s <= 0) {
                return Err(CoreError::RewardOutOfStock(reward_id.to_string()).into());
            }
            if customer.loyalty_points < reward.points_cost {
                return Err(CoreError::InsufficientPoints {
                    available: customer.loyalty_points,
                    required: reward.points_cost,
                }
                .into());
            }

            if let Some(stock) = reward.stock.as_mut() {
                *stock -= 1;
            }
            reward.clone()
        };

        let entry = LoyaltyTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tenant_id: customer.tenant_id.clone(),
            entry_type: LoyaltyEntryType::Redeem,
            points: -reward.points_cost,
            sale_id: None,
            reward_id: Some(reward.id.clone()),
            reason: format!("Redeemed: {}", reward.name),
            recorded_at: Utc::now(),
            expires_at: None,
        };

        self.store.append_loyalty(entry.clone()).await;
        customer.loyalty_points -= reward.points_cost;
        self.store.put_customer(customer).await;
        self.store.audit_customer(customer_id).await?;

        info!(
            customer_id,
            reward = %reward.name,
            points = reward.points_cost,
            "reward redeemed"
        );
        Ok(entry)
    }

    /// Records lapsed points as an `Expire` entry.
    ///
    /// When to expire is an external scheduling decision; the ledger only
    /// guarantees that the balance reflects the entry once it exists.
    pub async fn expire_points(
        &self,
        customer_id: &str,
        points: i64,
        reason: impl Into<String>,
    ) -> LedgerResult<LoyaltyTransaction> {
        validate_positive_points(points)?;
        self.append_signed(
            customer_id,
            LoyaltyEntryType::Expire,
            -points,
            reason.into(),
        )
        .await
    }

    /// Records a manual correction as an `Adjustment` entry.
    ///
    /// Corrections are always new entries; existing entries are never edited.
    pub async fn adjust_points(
        &self,
        customer_id: &str,
        delta: i64,
        reason: impl Into<String>,
    ) -> LedgerResult<LoyaltyTransaction> {
        if delta == 0 {
            return Err(CoreError::invalid_amount("points", "adjustment delta must be non-zero").into());
        }
        self.append_signed(customer_id, LoyaltyEntryType::Adjustment, delta, reason.into())
            .await
    }

    /// Shared append path for expire/adjustment entries.
    async fn append_signed(
        &self,
        customer_id: &str,
        entry_type: LoyaltyEntryType,
        delta: i64,
        reason: String,
    ) -> LedgerResult<LoyaltyTransaction> {
        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;

        let entry = LoyaltyTransaction {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tenant_id: customer.tenant_id.clone(),
            entry_type,
            points: delta,
            sale_id: None,
            reward_id: None,
            reason,
            recorded_at: Utc::now(),
            expires_at: None,
        };

        debug!(customer_id, ?entry_type, delta, "appending ledger entry");
        self.store.append_loyalty(entry.clone()).await;
        customer.loyalty_points += delta;
        self.store.put_customer(customer).await;
        self.store.audit_customer(customer_id).await?;

        Ok(entry)
    }

    // -------------------------------------------------------------------------
    // Reward catalog
    // -------------------------------------------------------------------------

    /// Adds a reward to the catalog.
    pub async fn add_reward(&self, new: NewReward) -> LedgerResult<Reward> {
        validate_name("name", &new.name)?;
        validate_positive_points(new.points_cost)?;

        let reward = Reward {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id,
            name: new.name,
            description: new.description,
            points_cost: new.points_cost,
            cash_value: new.cash_value,
            category: new.category,
            is_active: true,
            stock: new.stock,
        };

        self.store
            .rewards
            .write()
            .await
            .insert(reward.id.clone(), reward.clone());
        Ok(reward)
    }

    /// Switches a reward on or off without removing its redemption history.
    pub async fn set_reward_active(&self, reward_id: &str, is_active: bool) -> LedgerResult<Reward> {
        let mut rewards = self.store.rewards.write().await;
        let reward = rewards
            .get_mut(reward_id)
            .ok_or_else(|| CoreError::RewardNotFound(reward_id.to_string()))?;
        reward.is_active = is_active;
        Ok(reward.clone())
    }

    /// Fetches a reward by id.
    pub async fn reward(&self, reward_id: &str) -> LedgerResult<Reward> {
        self.store
            .rewards
            .read()
            .await
            .get(reward_id)
            .cloned()
            .ok_or_else(|| CoreError::RewardNotFound(reward_id.to_string()).into())
    }

    /// The catalog for one tenant, active rewards first then by name.
    pub async fn rewards_for_tenant(&self, tenant_id: &str) -> Vec<Reward> {
        let mut rewards: Vec<Reward> = self
            .store
            .rewards
            .read()
            .await
            .values()
            .filter(|r| r.tenant_id == tenant_id)
            .cloned()
            .collect();
        rewards.sort_by(|a, b| b.is_active.cmp(&a.is_active).then(a.name.cmp(&b.name)));
        rewards
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use sari_core::Tier;

    async fn store_with_customer(id: &str, points: i64) -> Arc<LedgerStore> {
        let store = LedgerStore::new();
        let customer = Customer {
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
            loyalty_points: 0,
            credit_limit: Tier::Bronze.benefits().credit_limit,
            current_credit: Money::zero(),
            tier: Tier::Bronze,
            is_active: true,
        };
        store.put_customer(customer).await;

        // Seed the starting balance through the ledger so cache == sum
        if points > 0 {
            let ledger = LoyaltyLedger::new(store.clone());
            ledger
                .earn_points(id, points, "seed", None)
                .await
                .expect("seeding points");
        }
        store
    }

    fn voucher(stock: Option<i64>) -> NewReward {
        NewReward {
            tenant_id: "tenant-1".to_string(),
            name: "₱50 Discount Voucher".to_string(),
            description: "Get ₱50 off your next purchase".to_string(),
            points_cost: 500,
            cash_value: Money::from_cents(5_000),
            category: "Discount".to_string(),
            stock,
        }
    }

    #[tokio::test]
    async fn test_earn_appends_entry_with_expiry() {
        let store = store_with_customer("cust-1", 0).await;
        let ledger = LoyaltyLedger::new(store.clone());

        let entry = ledger
            .earn_points("cust-1", 120, "Purchase of ₱120.00", None)
            .await
            .unwrap();

        assert_eq!(entry.entry_type, LoyaltyEntryType::Earn);
        assert_eq!(entry.points, 120);
        assert!(entry.expires_at.is_some());

        let customer = store.get_customer("cust-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 120);
        assert_eq!(store.loyalty_balance("cust-1").await, 120);
    }

    #[tokio::test]
    async fn test_earn_rejects_non_positive_points() {
        let store = store_with_customer("cust-1", 0).await;
        let ledger = LoyaltyLedger::new(store.clone());

        for points in [0, -10] {
            let err = ledger
                .earn_points("cust-1", points, "nothing", None)
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                LedgerError::Core(CoreError::InvalidAmount { .. })
            ));
        }
        assert_eq!(store.loyalty_balance("cust-1").await, 0);
    }

    #[tokio::test]
    async fn test_redeem_success_decrements_balance_and_stock() {
        let store = store_with_customer("cust-1", 800).await;
        let ledger = LoyaltyLedger::new(store.clone());
        let reward = ledger.add_reward(voucher(Some(3))).await.unwrap();

        let entry = ledger.redeem_reward("cust-1", &reward.id).await.unwrap();
        assert_eq!(entry.points, -500);
        assert_eq!(entry.reason, "Redeemed: ₱50 Discount Voucher");
        assert_eq!(entry.reward_id.as_deref(), Some(reward.id.as_str()));

        let customer = store.get_customer("cust-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 300);
        assert_eq!(ledger.reward(&reward.id).await.unwrap().stock, Some(2));
    }

    #[tokio::test]
    async fn test_redeem_insufficient_points_is_a_no_op() {
        let store = store_with_customer("cust-1", 300).await;
        let ledger = LoyaltyLedger::new(store.clone());
        let reward = ledger.add_reward(voucher(Some(3))).await.unwrap();

        let err = ledger.redeem_reward("cust-1", &reward.id).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InsufficientPoints {
                available: 300,
                required: 500
            })
        ));

        // Balance, ledger and stock all untouched
        let customer = store.get_customer("cust-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 300);
        assert_eq!(store.loyalty_for_customer("cust-1").await.len(), 1);
        assert_eq!(ledger.reward(&reward.id).await.unwrap().stock, Some(3));
    }

    #[tokio::test]
    async fn test_redeem_inactive_and_out_of_stock() {
        let store = store_with_customer("cust-1", 5_000).await;
        let ledger = LoyaltyLedger::new(store.clone());

        let inactive = ledger.add_reward(voucher(None)).await.unwrap();
        ledger.set_reward_active(&inactive.id, false).await.unwrap();
        let err = ledger.redeem_reward("cust-1", &inactive.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::RewardInactive(_))));

        let empty = ledger.add_reward(voucher(Some(0))).await.unwrap();
        let err = ledger.redeem_reward("cust-1", &empty.id).await.unwrap_err();
        assert!(matches!(err, LedgerError::Core(CoreError::RewardOutOfStock(_))));

        let err = ledger.redeem_reward("cust-1", "no-such-reward").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_expire_and_adjust_entries() {
        let store = store_with_customer("cust-1", 1_000).await;
        let ledger = LoyaltyLedger::new(store.clone());

        ledger
            .expire_points("cust-1", 200, "Annual expiry run")
            .await
            .unwrap();
        ledger
            .adjust_points("cust-1", -50, "Cashier keying error correction")
            .await
            .unwrap();
        ledger
            .adjust_points("cust-1", 25, "Goodwill credit")
            .await
            .unwrap();

        let customer = store.get_customer("cust-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 775);
        assert_eq!(store.loyalty_balance("cust-1").await, 775);

        assert!(ledger.adjust_points("cust-1", 0, "noop").await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_never_double_spend() {
        let store = store_with_customer("cust-1", 500).await;
        let ledger = LoyaltyLedger::new(store.clone());
        let reward = ledger.add_reward(voucher(None)).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            let reward_id = reward.id.clone();
            handles.push(tokio::spawn(async move {
                ledger.redeem_reward("cust-1", &reward_id).await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        // 500 points buy exactly one 500-point voucher
        assert_eq!(successes, 1);
        let customer = store.get_customer("cust-1").await.unwrap();
        assert_eq!(customer.loyalty_points, 0);
        assert_eq!(store.loyalty_balance("cust-1").await, 0);
    }
}
