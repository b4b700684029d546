use finch_core::ValidationError;
use serde::Serialize;

use crate::tier::{resolve, Tier};

const DEFAULT_GOAL: u64 = 1000;
const GOAL_FLOOR: f64 = 100.0;
const GOAL_CEILING: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierProjection {
    pub month: u32,
    pub projected_points: u64,
    pub projected_tier: Tier,
    pub progress_percent: f64,
}

/// Where a user would land each month if they kept earning at `monthly_rate`.
pub fn project_tiers(
    current_points: u64,
    monthly_rate: f64,
    months: u32,
) -> Result<Vec<TierProjection>, ValidationError> {
    if !monthly_rate.is_finite() {
        return Err(ValidationError::InvalidAmount(monthly_rate.to_string()));
    }
    Ok((1..=months)
        .map(|month| {
            let projected = (current_points as f64 + monthly_rate * f64::from(month)).max(0.0);
            // Tier uses whole points earned so far; the display value is rounded.
            let status = resolve(projected.trunc() as u64);
            TierProjection {
                month,
                projected_points: projected.round() as u64,
                projected_tier: status.tier,
                progress_percent: status.progress_percent,
            }
        })
        .collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyGoal {
    pub goal_points: u64,
    pub confidence: GoalConfidence,
    pub historical_months: usize,
    pub average_monthly_points: Option<i64>,
    pub std_deviation: Option<i64>,
}

/// Next month's target: the historical mean plus one standard deviation.
pub fn monthly_goal(history: &[i64]) -> MonthlyGoal {
    if history.is_empty() {
        return MonthlyGoal {
            goal_points: DEFAULT_GOAL,
            confidence: GoalConfidence::Low,
            historical_months: 0,
            average_monthly_points: None,
            std_deviation: None,
        };
    }

    let n = history.len() as f64;
    let mean = history.iter().map(|&p| p as f64).sum::<f64>() / n;
    let variance = history
        .iter()
        .map(|&p| (p as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();
    let goal = (mean + std_dev).clamp(GOAL_FLOOR, GOAL_CEILING);

    let confidence = match history.len() {
        6.. => GoalConfidence::High,
        3..=5 => GoalConfidence::Medium,
        _ => GoalConfidence::Low,
    };

    MonthlyGoal {
        goal_points: goal.round() as u64,
        confidence,
        historical_months: history.len(),
        average_monthly_points: Some(mean.round() as i64),
        std_deviation: Some(std_dev.round() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_walks_up_the_ladder() {
        let months = project_tiers(0, 250.0, 4).unwrap();
        let tiers: Vec<Tier> = months.iter().map(|m| m.projected_tier).collect();
        assert_eq!(tiers, vec![Tier::Bronze, Tier::Silver, Tier::Silver, Tier::Silver]);
        assert_eq!(months[3].projected_points, 1000);
        assert_eq!(months[0].month, 1);
    }

    #[test]
    fn projection_never_goes_below_zero() {
        let months = project_tiers(100, -500.0, 2).unwrap();
        assert!(months.iter().all(|m| m.projected_points == 0));
        assert!(months.iter().all(|m| m.projected_tier == Tier::Bronze));
    }

    #[test]
    fn projection_rejects_non_finite_rate() {
        assert!(project_tiers(0, f64::NAN, 3).is_err());
    }

    #[test]
    fn goal_without_history_is_default() {
        let goal = monthly_goal(&[]);
        assert_eq!(goal.goal_points, 1000);
        assert_eq!(goal.confidence, GoalConfidence::Low);
        assert_eq!(goal.average_monthly_points, None);
    }

    #[test]
    fn goal_is_mean_plus_std_dev() {
        // mean 500, population std dev 100
        let goal = monthly_goal(&[400, 600, 400, 600]);
        assert_eq!(goal.goal_points, 600);
        assert_eq!(goal.confidence, GoalConfidence::Medium);
        assert_eq!(goal.average_monthly_points, Some(500));
        assert_eq!(goal.std_deviation, Some(100));
    }

    #[test]
    fn goal_is_bounded() {
        assert_eq!(monthly_goal(&[5, 5]).goal_points, 100);
        assert_eq!(monthly_goal(&[50_000; 6]).goal_points, 10_000);
        assert_eq!(monthly_goal(&[50_000; 6]).confidence, GoalConfidence::High);
    }
}
