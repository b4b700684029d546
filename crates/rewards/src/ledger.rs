use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use finch_core::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calculator::{PaymentEvent, PointsBreakdown, RewardCalculator};
use crate::config::BillCategory;
use crate::tier::{resolve, TierStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Reward not found: {0}")]
    UnknownReward(RewardId),
    #[error("Reward {0} has already been reversed")]
    AlreadyReversed(RewardId),
    #[error("Reward {0} is itself a reversal and cannot be reversed")]
    NotReversible(RewardId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardId(pub Uuid);

impl RewardId {
    pub fn new() -> Self {
        RewardId(Uuid::new_v4())
    }
}

impl Default for RewardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RewardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardKind {
    Earned,
    Compensation { reverses: RewardId },
}

/// A bill payment handed to the ledger.
#[derive(Debug, Clone)]
pub struct BillPayment {
    pub bill_id: Option<i64>,
    pub event: PaymentEvent,
    pub description: Option<String>,
    pub paid_at: DateTime<Utc>,
}

/// One immutable ledger entry. Corrections are new entries with negated points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardRecord {
    id: RewardId,
    bill_id: Option<i64>,
    bill_amount: Decimal,
    category: BillCategory,
    on_time_payment: bool,
    streak_days: i64,
    points: i64,
    earned_at: DateTime<Utc>,
    description: Option<String>,
    #[serde(flatten)]
    kind: RewardKind,
}

impl RewardRecord {
    pub fn id(&self) -> RewardId {
        self.id
    }

    pub fn bill_id(&self) -> Option<i64> {
        self.bill_id
    }

    pub fn bill_amount(&self) -> Decimal {
        self.bill_amount
    }

    pub fn category(&self) -> BillCategory {
        self.category
    }

    pub fn on_time_payment(&self) -> bool {
        self.on_time_payment
    }

    pub fn streak_days(&self) -> i64 {
        self.streak_days
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn earned_at(&self) -> DateTime<Utc> {
        self.earned_at
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> RewardKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBreakdown {
    /// `YYYY-MM`
    pub month: String,
    pub total_points: i64,
    pub reward_count: usize,
    pub categories: BTreeMap<String, i64>,
}

/// Append-only record of awarded points for one user.
///
/// Only the entries are stored; the cumulative total and the tier are
/// recomputed from them on every read.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    records: Vec<RewardRecord>,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores a payment and appends the result. Nothing is appended on error.
    pub fn record(
        &mut self,
        calculator: &RewardCalculator,
        payment: BillPayment,
    ) -> Result<(&RewardRecord, PointsBreakdown), LedgerError> {
        let award = calculator.calculate(&payment.event)?;
        let record = RewardRecord {
            id: RewardId::new(),
            bill_id: payment.bill_id,
            bill_amount: payment.event.bill_amount,
            category: payment.event.category,
            on_time_payment: payment.event.on_time_payment,
            streak_days: payment.event.streak_days,
            points: award.points,
            earned_at: payment.paid_at,
            description: payment.description,
            kind: RewardKind::Earned,
        };
        tracing::debug!(reward_id = %record.id, points = record.points, "reward recorded");
        Ok((self.push(record), award.breakdown))
    }

    /// Appends an entry that cancels `id` out.
    pub fn compensate(
        &mut self,
        id: RewardId,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<&RewardRecord, LedgerError> {
        let original = self
            .records
            .iter()
            .find(|r| r.id == id)
            .ok_or(LedgerError::UnknownReward(id))?;
        if let RewardKind::Compensation { .. } = original.kind {
            return Err(LedgerError::NotReversible(id));
        }
        if self.is_reversed(id) {
            return Err(LedgerError::AlreadyReversed(id));
        }

        let reversal = RewardRecord {
            id: RewardId::new(),
            points: -original.points,
            earned_at: at,
            description: Some(reason.to_string()),
            kind: RewardKind::Compensation { reverses: id },
            ..original.clone()
        };
        tracing::debug!(reward_id = %id, reversal_id = %reversal.id, "reward reversed");
        Ok(self.push(reversal))
    }

    pub fn is_reversed(&self, id: RewardId) -> bool {
        self.records
            .iter()
            .any(|r| r.kind == RewardKind::Compensation { reverses: id })
    }

    pub fn records(&self) -> &[RewardRecord] {
        &self.records
    }

    pub fn get(&self, id: RewardId) -> Option<&RewardRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Net points, floored at zero and saturating at `u64::MAX`.
    pub fn total_points(&self) -> u64 {
        let sum: i128 = self.records.iter().map(|r| i128::from(r.points)).sum();
        u64::try_from(sum.max(0)).unwrap_or(u64::MAX)
    }

    pub fn tier_status(&self) -> TierStatus {
        resolve(self.total_points())
    }

    /// Net points per calendar month, oldest first.
    pub fn monthly_breakdown(&self) -> Vec<MonthlyBreakdown> {
        let mut months: BTreeMap<String, MonthlyBreakdown> = BTreeMap::new();
        for record in &self.records {
            let key = record.earned_at.format("%Y-%m").to_string();
            let entry = months.entry(key.clone()).or_insert_with(|| MonthlyBreakdown {
                month: key,
                total_points: 0,
                reward_count: 0,
                categories: BTreeMap::new(),
            });
            entry.total_points = entry.total_points.saturating_add(record.points);
            if record.kind == RewardKind::Earned {
                entry.reward_count += 1;
            }
            let category = entry.categories.entry(record.category.to_string()).or_insert(0);
            *category = category.saturating_add(record.points);
        }
        months.into_values().collect()
    }

    fn push(&mut self, record: RewardRecord) -> &RewardRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }
}
