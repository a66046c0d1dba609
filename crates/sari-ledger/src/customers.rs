//! # Customer Ledger Manager
//!
//! The façade that ties customer aggregates, the loyalty ledger, and tier
//! policy together. Sale recording is the one operation that touches all
//! three, and it runs as a single logical transaction:
//!
//! ```text
//! record_sale
//!   ├── customer lock acquired
//!   ├── total_purchases += 1, total_spent += amount
//!   ├── tier re-evaluated from lifetime spend   ← BEFORE points
//!   │     └── on change: credit_limit refreshed to the new tier's
//!   ├── points = floor(amount × new-tier multiplier)
//!   ├── Earn entry appended (when points > 0)
//!   └── cache/ledger audit, lock released
//! ```
//!
//! A sale that crosses a tier boundary earns points at the multiplier of the
//! tier it unlocked.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use sari_core::validation::{validate_name, validate_phone, validate_positive_amount};
use sari_core::{
    CoreError, Customer, LoyaltyTransaction, Money, Tier, TierBenefits,
};

use crate::error::LedgerResult;
use crate::loyalty::LoyaltyLedger;
use crate::store::LedgerStore;

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Registration input. Everything beyond name and phone is optional.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// What one recorded sale did to the customer.
#[derive(Debug, Clone, Serialize)]
pub struct SaleOutcome {
    pub customer: Customer,
    pub points_earned: i64,
    /// `Some((old, new))` when the sale crossed a tier boundary.
    pub tier_change: Option<(Tier, Tier)>,
}

/// Consistent snapshot of one customer with the derived sums alongside the
/// cached ones. Produced under the customer's lock, so the two always agree
/// (divergence surfaces as `InvariantViolation` instead).
#[derive(Debug, Clone, Serialize)]
pub struct CustomerView {
    pub customer: Customer,
    pub point_balance: i64,
    pub credit_exposure: Money,
    pub benefits: TierBenefits,
}

// =============================================================================
// Customer Ledger Manager
// =============================================================================

/// Façade over customer aggregates, tier policy, and the loyalty ledger.
#[derive(Debug, Clone)]
pub struct CustomerLedger {
    store: Arc<LedgerStore>,
    loyalty: LoyaltyLedger,
}

impl CustomerLedger {
    pub fn new(store: Arc<LedgerStore>, loyalty: LoyaltyLedger) -> Self {
        CustomerLedger { store, loyalty }
    }

    /// Registers a new customer: Bronze, zero aggregates, Bronze credit limit.
    pub async fn register_customer(
        &self,
        tenant_id: &str,
        input: NewCustomer,
    ) -> LedgerResult<Customer> {
        validate_name("first name", &input.first_name)?;
        validate_name("last name", &input.last_name)?;
        validate_phone(&input.phone)?;

        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.to_string(),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            notes: input.notes,
            registered_date: chrono::Utc::now(),
            total_purchases: 0,
            total_spent: Money::zero(),
            loyalty_points: 0,
            credit_limit: Tier::Bronze.benefits().credit_limit,
            current_credit: Money::zero(),
            tier: Tier::Bronze,
            is_active: true,
        };
        self.store.put_customer(customer.clone()).await;

        info!(
            customer_id = %customer.id,
            name = %customer.full_name(),
            "customer registered"
        );
        Ok(customer)
    }

    /// Records a completed sale against a customer.
    ///
    /// Bumps lifetime aggregates, re-evaluates the tier from the new lifetime
    /// spend, and credits points at the post-change multiplier. One logical
    /// transaction under the customer's lock.
    pub async fn record_sale(
        &self,
        customer_id: &str,
        amount: Money,
        sale_id: Option<String>,
    ) -> LedgerResult<SaleOutcome> {
        validate_positive_amount("sale amount", amount)?;

        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;
        if !customer.is_active {
            return Err(CoreError::CustomerInactive(customer_id.to_string()).into());
        }

        customer.total_purchases += 1;
        customer.total_spent += amount;

        let old_tier = customer.tier;
        let new_tier = Tier::for_spend(customer.total_spent);
        let tier_change = if new_tier != old_tier {
            customer.tier = new_tier;
            customer.credit_limit = new_tier.benefits().credit_limit;
            info!(
                customer_id,
                from = %old_tier,
                to = %new_tier,
                "tier changed"
            );
            Some((old_tier, new_tier))
        } else {
            None
        };

        let points_earned = new_tier.points_earned(amount);
        if points_earned > 0 {
            let reason = match &sale_id {
                Some(id) => format!("Sale {id}"),
                None => "Sale".to_string(),
            };
            self.loyalty
                .earn_locked(&mut customer, points_earned, reason, sale_id)
                .await;
        }

        self.store.put_customer(customer.clone()).await;
        self.store.audit_customer(customer_id).await?;

        debug!(
            customer_id,
            amount = %amount,
            points_earned,
            tier = %customer.tier,
            "sale recorded"
        );
        Ok(SaleOutcome {
            customer,
            points_earned,
            tier_change,
        })
    }

    /// Consistent aggregate snapshot of one customer.
    pub async fn customer_view(&self, customer_id: &str) -> LedgerResult<CustomerView> {
        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let customer = self.store.require_customer(customer_id).await?;
        self.store.audit_customer(customer_id).await?;

        let point_balance = self.store.loyalty_balance(customer_id).await;
        let credit_exposure = self.store.credit_exposure(customer_id).await;
        let benefits = customer.tier.benefits();
        Ok(CustomerView {
            customer,
            point_balance,
            credit_exposure,
            benefits,
        })
    }

    /// Soft-deactivates a customer. History and open debt stay; new sales,
    /// redemptions, and credit are refused while inactive.
    pub async fn deactivate_customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;
        customer.is_active = false;
        self.store.put_customer(customer.clone()).await;

        info!(customer_id, "customer deactivated");
        Ok(customer)
    }

    /// The customer's loyalty ledger entries, oldest first.
    pub async fn loyalty_history(
        &self,
        customer_id: &str,
    ) -> LedgerResult<Vec<LoyaltyTransaction>> {
        self.store.require_customer(customer_id).await?;
        Ok(self.store.loyalty_for_customer(customer_id).await)
    }

    /// Fetches a customer row by id.
    pub async fn customer(&self, customer_id: &str) -> LedgerResult<Customer> {
        Ok(self.store.require_customer(customer_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use sari_core::LoyaltyEntryType;

    fn ledger() -> (Arc<LedgerStore>, CustomerLedger) {
        let store = LedgerStore::new();
        let loyalty = LoyaltyLedger::new(store.clone());
        let customers = CustomerLedger::new(store.clone(), loyalty);
        (store, customers)
    }

    fn maria() -> NewCustomer {
        NewCustomer {
            first_name: "Maria".to_string(),
            last_name: "Santos".to_string(),
            phone: "09171234567".to_string(),
            email: Some("maria@example.ph".to_string()),
            address: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_register_starts_at_bronze() {
        let (_, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();

        assert_eq!(customer.tier, Tier::Bronze);
        assert_eq!(customer.total_purchases, 0);
        assert_eq!(customer.total_spent, Money::zero());
        assert_eq!(customer.loyalty_points, 0);
        assert_eq!(customer.credit_limit, Tier::Bronze.benefits().credit_limit);
        assert!(customer.is_active);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let (_, customers) = ledger();
        let mut input = maria();
        input.first_name = "  ".to_string();
        assert!(customers.register_customer("tenant-1", input).await.is_err());

        let mut input = maria();
        input.phone = "call me".to_string();
        assert!(customers.register_customer("tenant-1", input).await.is_err());
    }

    #[tokio::test]
    async fn test_record_sale_bumps_aggregates_and_points() {
        let (store, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();

        // ₱250.00 at Bronze ×1.0 → 250 points
        let outcome = customers
            .record_sale(&customer.id, Money::from_cents(25_000), Some("sale-1".to_string()))
            .await
            .unwrap();

        assert_eq!(outcome.points_earned, 250);
        assert!(outcome.tier_change.is_none());
        assert_eq!(outcome.customer.total_purchases, 1);
        assert_eq!(outcome.customer.total_spent, Money::from_cents(25_000));
        assert_eq!(outcome.customer.loyalty_points, 250);

        let entries = store.loyalty_for_customer(&customer.id).await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, LoyaltyEntryType::Earn);
        assert_eq!(entries[0].points, 250);
        assert_eq!(entries[0].sale_id.as_deref(), Some("sale-1"));
    }

    /// Lifetime spend 4800 + a 300 sale crosses into Silver; the 300 earns
    /// at the new ×1.5 multiplier → 450 points.
    #[tokio::test]
    async fn test_tier_crossing_sale_earns_at_new_multiplier() {
        let (_, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();

        customers
            .record_sale(&customer.id, Money::from_cents(480_000), None)
            .await
            .unwrap();

        let outcome = customers
            .record_sale(&customer.id, Money::from_cents(30_000), None)
            .await
            .unwrap();

        assert_eq!(outcome.tier_change, Some((Tier::Bronze, Tier::Silver)));
        assert_eq!(outcome.points_earned, 450);
        assert_eq!(outcome.customer.tier, Tier::Silver);
        // Limit refreshed to the Silver table entry
        assert_eq!(
            outcome.customer.credit_limit,
            Tier::Silver.benefits().credit_limit
        );
    }

    #[tokio::test]
    async fn test_record_sale_guards() {
        let (_, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();

        let err = customers
            .record_sale(&customer.id, Money::zero(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::InvalidAmount { .. })
        ));
        assert!(customers
            .record_sale("no-such-customer", Money::from_cents(100), None)
            .await
            .unwrap_err()
            .is_not_found());

        customers.deactivate_customer(&customer.id).await.unwrap();
        let err = customers
            .record_sale(&customer.id, Money::from_cents(100), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Core(CoreError::CustomerInactive(_))
        ));
    }

    #[tokio::test]
    async fn test_customer_view_matches_ledger() {
        let (_, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();
        customers
            .record_sale(&customer.id, Money::from_cents(120_000), None)
            .await
            .unwrap();

        let view = customers.customer_view(&customer.id).await.unwrap();
        assert_eq!(view.point_balance, 1200);
        assert_eq!(view.customer.loyalty_points, 1200);
        assert_eq!(view.credit_exposure, Money::zero());
        assert_eq!(view.benefits, Tier::Bronze.benefits());
    }

    #[tokio::test]
    async fn test_loyalty_history_oldest_first() {
        let (_, customers) = ledger();
        let customer = customers
            .register_customer("tenant-1", maria())
            .await
            .unwrap();
        for cents in [10_000, 20_000, 30_000] {
            customers
                .record_sale(&customer.id, Money::from_cents(cents), None)
                .await
                .unwrap();
        }

        let history = customers.loyalty_history(&customer.id).await.unwrap();
        let points: Vec<i64> = history.iter().map(|t| t.points).collect();
        assert_eq!(points, vec![100, 200, 300]);
        assert!(history.windows(2).all(|w| w[0].recorded_at <= w[1].recorded_at));
    }
}
