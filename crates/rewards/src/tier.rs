use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Bronze => write!(f, "Bronze"),
            Tier::Silver => write!(f, "Silver"),
            Tier::Gold => write!(f, "Gold"),
            Tier::Platinum => write!(f, "Platinum"),
            Tier::Diamond => write!(f, "Diamond"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierBand {
    pub tier: Tier,
    pub min_points: u64,
    /// Inclusive; `None` for the open-ended top band.
    pub max_points: Option<u64>,
    pub multiplier: Decimal,
    pub benefits: &'static [&'static str],
    pub color: &'static str,
}

impl TierBand {
    fn contains(&self, points: u64) -> bool {
        points >= self.min_points && self.max_points.map_or(true, |max| points <= max)
    }
}

/// Fixed-point multiplier with two decimal places, e.g. `hundredths(125)` is 1.25.
const fn hundredths(n: u32) -> Decimal {
    Decimal::from_parts(n, 0, 0, false, 2)
}

pub static TIER_LADDER: [TierBand; 5] = [
    TierBand {
        tier: Tier::Bronze,
        min_points: 0,
        max_points: Some(499),
        multiplier: hundredths(100),
        benefits: &["Basic tracking", "Email support"],
        color: "#cd7f32",
    },
    TierBand {
        tier: Tier::Silver,
        min_points: 500,
        max_points: Some(1999),
        multiplier: hundredths(110),
        benefits: &["Priority support", "Advanced analytics", "Custom categories"],
        color: "#c0c0c0",
    },
    TierBand {
        tier: Tier::Gold,
        min_points: 2000,
        max_points: Some(4999),
        multiplier: hundredths(125),
        benefits: &[
            "All Silver benefits",
            "Early access to features",
            "Dedicated account manager",
        ],
        color: "#ffd700",
    },
    TierBand {
        tier: Tier::Platinum,
        min_points: 5000,
        max_points: Some(9999),
        multiplier: hundredths(150),
        benefits: &[
            "All Gold benefits",
            "Custom integrations",
            "API access",
            "White-label reports",
        ],
        color: "#e5e4e2",
    },
    TierBand {
        tier: Tier::Diamond,
        min_points: 10000,
        max_points: None,
        multiplier: hundredths(200),
        benefits: &[
            "All Platinum benefits",
            "24/7 phone support",
            "Custom development",
            "Enterprise features",
        ],
        color: "#b9f2ff",
    },
];

pub fn tiers() -> &'static [TierBand] {
    &TIER_LADDER
}

/// Where a points total sits on the ladder. Always derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierStatus {
    pub tier: Tier,
    pub multiplier: Decimal,
    pub next_tier: Option<Tier>,
    pub points_to_next: Option<u64>,
    pub progress_percent: f64,
}

pub fn resolve(points: u64) -> TierStatus {
    let idx = TIER_LADDER
        .iter()
        .position(|band| band.contains(points))
        .unwrap_or(0);
    let band = &TIER_LADDER[idx];

    match (band.max_points, TIER_LADDER.get(idx + 1)) {
        (Some(max), Some(next)) => {
            let span = (max + 1 - band.min_points) as f64;
            let progress = (points - band.min_points) as f64 / span * 100.0;
            TierStatus {
                tier: band.tier,
                multiplier: band.multiplier,
                next_tier: Some(next.tier),
                points_to_next: Some(next.min_points.saturating_sub(points)),
                progress_percent: progress.clamp(0.0, 100.0),
            }
        }
        _ => TierStatus {
            tier: band.tier,
            multiplier: band.multiplier,
            next_tier: None,
            points_to_next: None,
            progress_percent: 100.0,
        },
    }
}
