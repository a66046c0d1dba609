//! End-to-end walk through one trading day of a sari-sari store.
//!
//! Registers a customer, records sales that cross a tier boundary, extends
//! and pays down credit, redeems a reward, then closes the shift with a
//! Z reading. Run with:
//!
//! ```sh
//! RUST_LOG=debug cargo run -p sari-ledger --example end_of_day
//! ```

use chrono::{Duration, Utc};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use sari_core::{Money, PaymentMethod, SaleRecord, DEFAULT_TENANT_ID};
use sari_ledger::{
    CreditManager, CustomerLedger, LedgerStore, LoyaltyLedger, NewCustomer, NewReward,
    ReconciliationEngine,
};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sari=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let store = LedgerStore::new();
    let loyalty = LoyaltyLedger::new(store.clone());
    let customers = CustomerLedger::new(store.clone(), loyalty.clone());
    let credit = CreditManager::new(store.clone());
    let shifts = ReconciliationEngine::new(store);

    // Morning: a regular signs up.
    let maria = customers
        .register_customer(
            DEFAULT_TENANT_ID,
            NewCustomer {
                first_name: "Maria".to_string(),
                last_name: "Santos".to_string(),
                phone: "09171234567".to_string(),
                email: None,
                address: Some("Purok 4, Barangay San Isidro".to_string()),
                notes: None,
            },
        )
        .await?;
    println!("registered {} at {:?}", maria.full_name(), maria.tier);

    // A big stock-up sale, then a small one that crosses into Silver.
    for cents in [480_000, 30_000] {
        let sale_id = Uuid::new_v4().to_string();
        let outcome = customers
            .record_sale(&maria.id, Money::from_cents(cents), Some(sale_id.clone()))
            .await?;
        shifts
            .record_transaction(SaleRecord {
                id: sale_id,
                tenant_id: DEFAULT_TENANT_ID.to_string(),
                customer_id: Some(maria.id.clone()),
                total: Money::from_cents(cents),
                payment_method: PaymentMethod::Cash,
                item_count: 3,
                recorded_at: Utc::now(),
            })
            .await;
        println!(
            "sale {} earned {} points{}",
            Money::from_cents(cents),
            outcome.points_earned,
            match outcome.tier_change {
                Some((from, to)) => format!(" and moved {from} -> {to}"),
                None => String::new(),
            }
        );
    }

    // Afternoon: utang. Open a credit line and pay part of it down.
    let account = credit
        .open_account(
            &maria.id,
            Money::from_cents(80_000),
            200,
            Utc::now() + Duration::days(30),
        )
        .await?;
    let payment = credit
        .apply_payment(
            &account.id,
            Money::from_cents(50_000),
            PaymentMethod::Cash,
            "Ana",
            Some("partial".to_string()),
        )
        .await?;
    println!(
        "credit balance {} after applying {}",
        payment.account.current_balance, payment.amount_applied
    );

    // Spend some of those points on a reward.
    let reward = loyalty
        .add_reward(NewReward {
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            name: "Free 3-in-1 Coffee".to_string(),
            description: "One sachet".to_string(),
            points_cost: 200,
            cash_value: Money::from_cents(1_200),
            category: "Pantry".to_string(),
            stock: Some(10),
        })
        .await?;
    loyalty.redeem_reward(&maria.id, &reward.id).await?;

    let view = customers.customer_view(&maria.id).await?;
    println!(
        "{}: tier {:?}, {} points, {} outstanding of {} limit",
        view.customer.full_name(),
        view.customer.tier,
        view.point_balance,
        view.credit_exposure,
        view.customer.credit_limit
    );

    // Closing time: count the drawer and cut a Z reading.
    let z = shifts
        .z_reading(DEFAULT_TENANT_ID, Money::from_cents(510_000), "Ana")
        .await?;
    println!(
        "shift closed: {} sales totalling {}, variance {}",
        z.totals.transaction_count, z.totals.total_sales, z.variance
    );
    println!("{}", serde_json::to_string_pretty(&z)?);

    Ok(())
}
