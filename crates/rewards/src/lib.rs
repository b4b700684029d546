//! Reward points for paid bills, and the tier ladder those points climb.

pub mod calculator;
pub mod config;
pub mod ledger;
pub mod projection;
pub mod tier;

pub use calculator::{bill_amount_from_f64, PaymentEvent, PointsAward, PointsBreakdown, RewardCalculator};
pub use config::{BillCategory, CategoryMultipliers, ConfigError, RewardConfig, StreakBand};
pub use ledger::{BillPayment, LedgerError, MonthlyBreakdown, RewardId, RewardKind, RewardLedger, RewardRecord};
pub use projection::{monthly_goal, project_tiers, GoalConfidence, MonthlyGoal, TierProjection};
pub use tier::{resolve, tiers, Tier, TierBand, TierStatus, TIER_LADDER};
