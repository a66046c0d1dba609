//! # Tier Policy Engine
//!
//! Pure mapping from lifetime spend to a loyalty tier and its benefits.
//!
//! ## Tier Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Tier      Min Spend    Points    Credit Limit    Discount             │
//! │  ────────  ──────────   ───────   ─────────────   ─────────            │
//! │  Bronze    ₱0           ×1.0      ₱500            0%                   │
//! │  Silver    ₱5,000       ×1.5      ₱2,000          5%                   │
//! │  Gold      ₱15,000      ×2.0      ₱5,000          10%                  │
//! │  Platinum  ₱50,000      ×3.0      ₱10,000         15%                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Selection is the highest tier whose threshold is ≤ lifetime spend. The
//! engine holds no state: the Customer Ledger Manager re-evaluates the tier
//! after every spend-increasing event, so a tier can move up or down as the
//! lifetime aggregate changes. It is never frozen.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tier
// =============================================================================

/// Discrete loyalty rank derived from lifetime spend.
///
/// Variant order IS the tier order: `Bronze < Silver < Gold < Platinum`
/// (the derived `Ord` makes tier monotonicity mechanically checkable).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// The benefits a tier grants.
///
/// ## Encoding
/// - `points_multiplier_pct`: percent, so 150 = ×1.5 (no floats in money math)
/// - `discount_bps`: basis points, so 500 = 5%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TierBenefits {
    /// Minimum lifetime spend to hold this tier.
    pub min_spend: Money,
    /// Points multiplier in percent (100 = ×1).
    pub points_multiplier_pct: u32,
    /// Credit limit granted at this tier.
    pub credit_limit: Money,
    /// Checkout discount in basis points.
    pub discount_bps: u32,
}

/// Benefit table, ordered by threshold. Thresholds are disjoint by
/// construction; ties are impossible.
const TIER_TABLE: [(Tier, TierBenefits); 4] = [
    (
        Tier::Bronze,
        TierBenefits {
            min_spend: Money::from_cents(0),
            points_multiplier_pct: 100,
            credit_limit: Money::from_cents(50_000),
            discount_bps: 0,
        },
    ),
    (
        Tier::Silver,
        TierBenefits {
            min_spend: Money::from_cents(500_000),
            points_multiplier_pct: 150,
            credit_limit: Money::from_cents(200_000),
            discount_bps: 500,
        },
    ),
    (
        Tier::Gold,
        TierBenefits {
            min_spend: Money::from_cents(1_500_000),
            points_multiplier_pct: 200,
            credit_limit: Money::from_cents(500_000),
            discount_bps: 1000,
        },
    ),
    (
        Tier::Platinum,
        TierBenefits {
            min_spend: Money::from_cents(5_000_000),
            points_multiplier_pct: 300,
            credit_limit: Money::from_cents(1_000_000),
            discount_bps: 1500,
        },
    ),
];

impl Tier {
    /// Selects the tier for a lifetime spend amount.
    ///
    /// Total over all inputs: negative spend (impossible through the ledger,
    /// but the function is total anyway) maps to Bronze.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    /// use sari_core::tier::Tier;
    ///
    /// assert_eq!(Tier::for_spend(Money::from_major_minor(4_800, 0)), Tier::Bronze);
    /// assert_eq!(Tier::for_spend(Money::from_major_minor(5_100, 0)), Tier::Silver);
    /// ```
    pub fn for_spend(total_spent: Money) -> Tier {
        TIER_TABLE
            .iter()
            .rev()
            .find(|(_, b)| total_spent >= b.min_spend)
            .map(|(tier, _)| *tier)
            .unwrap_or(Tier::Bronze)
    }

    /// Returns the benefits for this tier.
    pub fn benefits(&self) -> TierBenefits {
        TIER_TABLE[*self as usize].1
    }

    /// Loyalty points earned for a sale amount at this tier.
    ///
    /// `floor(pesos × multiplier)` — e.g. ₱300 at Silver (×1.5) earns 450.
    pub fn points_earned(&self, amount: Money) -> i64 {
        amount.points_at_multiplier(self.benefits().points_multiplier_pct)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Bronze
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
