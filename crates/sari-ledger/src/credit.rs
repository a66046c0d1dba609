//! # Credit Account Manager
//!
//! Owns the lifecycle of customer credit/loan accounts and their payment
//! history.
//!
//! ## Account Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Credit Account Lifecycle                           │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── open_account() → balance = principal, status = Active          │
//! │         (fails LimitExceeded past the customer's credit limit)         │
//! │                                                                        │
//! │  2. PAY DOWN                                                           │
//! │     └── apply_payment() → balance shrinks, clamped at 0                │
//! │     └── status rederived: Paid / Overdue / Active                      │
//! │                                                                        │
//! │  3. TERMINAL                                                           │
//! │     └── Paid       (balance reached zero)                              │
//! │     └── Defaulted  (force_default(), administrative only)              │
//! │                                                                        │
//! │  Accounts are never deleted. Customer.current_credit always equals    │
//! │  the sum of balances over non-paid accounts.                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use sari_core::validation::{
    validate_interest_rate_bps, validate_operator, validate_positive_amount,
};
use sari_core::{
    CoreError, CreditAccount, CreditPayment, CreditStatus, Money, PaymentMethod,
};

use crate::error::LedgerResult;
use crate::store::LedgerStore;

// =============================================================================
// Payment Outcome
// =============================================================================

/// What a payment actually did to the account.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    pub account: CreditAccount,
    /// The amount actually applied: the tendered amount capped to the
    /// pre-payment balance. Overpayment is absorbed, never carried as
    /// customer credit elsewhere.
    pub amount_applied: Money,
}

// =============================================================================
// Credit Account Manager
// =============================================================================

/// Manager for credit accounts and their payments.
#[derive(Debug, Clone)]
pub struct CreditManager {
    store: Arc<LedgerStore>,
}

impl CreditManager {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        CreditManager { store }
    }

    /// Extends credit to a customer.
    ///
    /// ## Guards
    /// - `InvalidAmount` for a non-positive principal
    /// - `CustomerNotFound` / `CustomerInactive`
    /// - `LimitExceeded` when outstanding + principal would pass the
    ///   customer's tier credit limit (hard check, not a caller courtesy)
    pub async fn open_account(
        &self,
        customer_id: &str,
        principal: Money,
        interest_rate_bps: u32,
        due_date: DateTime<Utc>,
    ) -> LedgerResult<CreditAccount> {
        validate_positive_amount("principal", principal)?;
        validate_interest_rate_bps(interest_rate_bps)?;

        let lock = self.store.customer_lock(customer_id).await;
        let _guard = lock.lock().await;

        let mut customer = self.store.require_customer(customer_id).await?;
        if !customer.is_active {
            return Err(CoreError::CustomerInactive(customer_id.to_string()).into());
        }

        if customer.current_credit + principal > customer.credit_limit {
            return Err(CoreError::LimitExceeded {
                limit: customer.credit_limit,
                outstanding: customer.current_credit,
                requested: principal,
            }
            .into());
        }

        let now = Utc::now();
        let account = CreditAccount {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            tenant_id: customer.tenant_id.clone(),
            principal,
            current_balance: principal,
            interest_rate_bps,
            due_date,
            status: CreditStatus::Active,
            payment_history: Vec::new(),
            created_date: now,
            last_payment_date: None,
        };

        self.store.put_account(account.clone()).await;
        customer.current_credit += principal;
        self.store.put_customer(customer).await;
        self.store.audit_customer(customer_id).await?;

        info!(
            customer_id,
            account_id = %account.id,
            principal = %principal,
            "credit account opened"
        );
        Ok(account)
    }

    /// Applies a payment to an account.
    ///
    /// Reduces the balance by the tendered amount, clamped at zero, then
    /// rederives the status. The payment record keeps the tendered amount;
    /// the customer's credit exposure drops by the amount actually applied.
    ///
    /// Payments are accepted for deactivated customers: paying down an
    /// existing debt is not new financial activity.
    pub async fn apply_payment(
        &self,
        account_id: &str,
        amount: Money,
        method: PaymentMethod,
        processed_by: &str,
        note: Option<String>,
    ) -> LedgerResult<PaymentOutcome> {
        validate_positive_amount("payment amount", amount)?;
        validate_operator(processed_by)?;

        // Resolve the owning customer first so the whole mutation runs under
        // that customer's lock.
        let customer_id = self.store.require_account(account_id).await?.customer_id;

        let lock = self.store.customer_lock(&customer_id).await;
        let _guard = lock.lock().await;

        let mut account = self.store.require_account(account_id).await?;
        if account.status.is_terminal() {
            return Err(CoreError::AccountClosed {
                id: account_id.to_string(),
                status: account.status,
            }
            .into());
        }
        let mut customer = self.store.require_customer(&customer_id).await?;

        let now = Utc::now();
        let amount_applied = amount.min(account.current_balance);
        account.current_balance = account.current_balance.saturating_sub_floor(amount);
        account.status = CreditStatus::derive(account.current_balance, account.due_date, now);
        account.last_payment_date = Some(now);
        account.payment_history.push(CreditPayment {
            id: Uuid::new_v4().to_string(),
            credit_account_id: account_id.to_string(),
            amount,
            payment_date: now,
            method,
            processed_by: processed_by.to_string(),
            note,
        });

        customer.current_credit = customer.current_credit.saturating_sub_floor(amount_applied);

        self.store.put_account(account.clone()).await;
        self.store.put_customer(customer).await;
        self.store.audit_customer(&customer_id).await?;

        debug!(
            account_id,
            tendered = %amount,
            applied = %amount_applied,
            status = ?account.status,
            "payment applied"
        );
        Ok(PaymentOutcome {
            account,
            amount_applied,
        })
    }

    /// Writes an account off as `Defaulted`.
    ///
    /// Administrative transition only; payment logic never derives this
    /// status. The defaulted balance keeps counting toward the customer's
    /// credit exposure (only `Paid` accounts leave the sum).
    pub async fn force_default(
        &self,
        account_id: &str,
        processed_by: &str,
    ) -> LedgerResult<CreditAccount> {
        validate_operator(processed_by)?;

        let customer_id = self.store.require_account(account_id).await?.customer_id;

        let lock = self.store.customer_lock(&customer_id).await;
        let _guard = lock.lock().await;

        let mut account = self.store.require_account(account_id).await?;
        if account.status.is_terminal() {
            return Err(CoreError::AccountClosed {
                id: account_id.to_string(),
                status: account.status,
            }
            .into());
        }

        account.status = CreditStatus::Defaulted;
        self.store.put_account(account.clone()).await;
        self.store.audit_customer(&customer_id).await?;

        warn!(
            account_id,
            customer_id = %customer_id,
            balance = %account.current_balance,
            processed_by,
            "credit account written off"
        );
        Ok(account)
    }

    /// All accounts of one customer, oldest first.
    pub async fn accounts_for_customer(
        &self,
        customer_id: &str,
    ) -> LedgerResult<Vec<CreditAccount>> {
        self.store.require_customer(customer_id).await?;
        Ok(self.store.accounts_for_customer(customer_id).await)
    }

    /// Fetches an account by id.
    pub async fn account(&self, account_id: &str) -> LedgerResult<CreditAccount> {
        Ok(self.store.require_account(account_id).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
