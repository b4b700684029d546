use finch_core::ValidationError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::{BillCategory, RewardConfig, StreakBand};

/// One bill payment, as seen by the point formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub bill_amount: Decimal,
    pub category: BillCategory,
    pub on_time_payment: bool,
    pub streak_days: i64,
}

impl PaymentEvent {
    pub fn new(
        bill_amount: Decimal,
        category: impl Into<BillCategory>,
        on_time_payment: bool,
        streak_days: i64,
    ) -> Self {
        Self { bill_amount, category: category.into(), on_time_payment, streak_days }
    }
}

/// Each factor of the formula, so a caller can show how the total came about.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsBreakdown {
    pub base: Decimal,
    pub category_multiplier: Decimal,
    pub on_time_multiplier: Decimal,
    pub streak_multiplier: Decimal,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointsAward {
    pub points: i64,
    pub breakdown: PointsBreakdown,
}

/// Converts a floating-point amount, rejecting NaN and infinities.
pub fn bill_amount_from_f64(value: f64) -> Result<Decimal, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidAmount(value.to_string()));
    }
    Decimal::from_f64(value).ok_or_else(|| ValidationError::InvalidAmount(value.to_string()))
}

pub struct RewardCalculator {
    config: RewardConfig,
}

impl Default for RewardCalculator {
    fn default() -> Self {
        Self::new(RewardConfig::default())
    }
}

impl RewardCalculator {
    pub fn new(mut config: RewardConfig) -> Self {
        // Highest threshold first; the first band reached is the one applied.
        config.streak_bands.sort_by(|a, b| b.min_days.cmp(&a.min_days));
        Self { config }
    }

    pub fn config(&self) -> &RewardConfig {
        &self.config
    }

    pub fn streak_multiplier(&self, streak_days: i64) -> Decimal {
        self.config
            .streak_bands
            .iter()
            .find(|band| streak_days >= i64::from(band.min_days))
            .map(|band: &StreakBand| band.multiplier)
            .unwrap_or(Decimal::ONE)
    }

    pub fn calculate(&self, event: &PaymentEvent) -> Result<PointsAward, ValidationError> {
        let amount = event.bill_amount;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        if event.streak_days < 0 {
            return Err(ValidationError::InvalidStreak(event.streak_days));
        }

        let overflow = || ValidationError::InvalidAmount(amount.to_string());

        let base = amount
            .checked_mul(self.config.points_per_unit)
            .ok_or_else(overflow)?;
        let category_multiplier = self.config.category_multipliers.get(event.category);
        let on_time_multiplier = if event.on_time_payment {
            self.config.on_time_multiplier
        } else {
            Decimal::ONE
        };
        let streak_multiplier = self.streak_multiplier(event.streak_days);

        let after_category = base.checked_mul(category_multiplier).ok_or_else(overflow)?;
        let after_on_time = after_category
            .checked_mul(on_time_multiplier)
            .ok_or_else(overflow)?;
        let raw = after_on_time
            .checked_mul(streak_multiplier)
            .ok_or_else(overflow)?;

        let points = round_half_up(raw)
            .to_i64()
            .ok_or_else(overflow)?
            .max(self.config.minimum_points);

        let mut steps = vec![
            format!(
                "Base: {amount} x {} points per unit = {} points",
                self.config.points_per_unit,
                round_half_up(base)
            ),
            format!(
                "Category ({}): x {category_multiplier} = {} points",
                event.category,
                round_half_up(after_category)
            ),
        ];
        if event.on_time_payment {
            steps.push(format!(
                "On-time bonus: x {on_time_multiplier} = {} points",
                round_half_up(after_on_time)
            ));
        }
        if streak_multiplier > Decimal::ONE {
            steps.push(format!(
                "Streak bonus ({} days): x {streak_multiplier} = {points} points",
                event.streak_days
            ));
        }

        tracing::debug!(
            %amount,
            category = %event.category,
            %category_multiplier,
            %on_time_multiplier,
            streak_days = event.streak_days,
            %streak_multiplier,
            points,
            "reward points calculated"
        );

        Ok(PointsAward {
            points,
            breakdown: PointsBreakdown {
                base,
                category_multiplier,
                on_time_multiplier,
                streak_multiplier,
                steps,
            },
        })
    }
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn calc(amount: &str, category: &str, on_time: bool, streak: i64) -> Result<PointsAward, ValidationError> {
        RewardCalculator::default().calculate(&PaymentEvent::new(dec(amount), category, on_time, streak))
    }

    #[test]
    fn credit_card_on_time_with_week_streak() {
        let award = calc("100", "credit_card", true, 10).unwrap();
        assert_eq!(award.points, 2700);
        assert_eq!(award.breakdown.base, dec("1000"));
        assert_eq!(award.breakdown.category_multiplier, dec("1.5"));
        assert_eq!(award.breakdown.on_time_multiplier, dec("1.5"));
        assert_eq!(award.breakdown.streak_multiplier, dec("1.2"));
        assert_eq!(award.breakdown.steps.len(), 4);
    }

    #[test]
    fn utilities_late_without_streak() {
        let award = calc("50", "utilities", false, 0).unwrap();
        assert_eq!(award.points, 500);
        assert_eq!(award.breakdown.base, dec("500"));
        assert_eq!(award.breakdown.category_multiplier, Decimal::ONE);
        assert_eq!(award.breakdown.on_time_multiplier, Decimal::ONE);
        assert_eq!(award.breakdown.streak_multiplier, Decimal::ONE);
        assert_eq!(award.breakdown.steps.len(), 2);
    }

    #[test]
    fn unknown_category_uses_neutral_weight() {
        let award = calc("10", "pet insurance", false, 0).unwrap();
        assert_eq!(award.breakdown.category_multiplier, Decimal::ONE);
        assert_eq!(award.points, 100);
    }

    #[test]
    fn non_positive_amounts_are_rejected() {
        assert!(matches!(calc("0", "rent", true, 0), Err(ValidationError::InvalidAmount(_))));
        assert!(matches!(calc("-5", "rent", true, 0), Err(ValidationError::InvalidAmount(_))));
    }

    #[test]
    fn negative_streak_is_rejected() {
        assert_eq!(
            calc("10", "rent", true, -1).unwrap_err(),
            ValidationError::InvalidStreak(-1)
        );
    }

    #[test]
    fn non_finite_float_amounts_are_rejected() {
        assert!(bill_amount_from_f64(f64::NAN).is_err());
        assert!(bill_amount_from_f64(f64::INFINITY).is_err());
        assert_eq!(bill_amount_from_f64(12.5).unwrap(), dec("12.5"));
    }

    #[test]
    fn streak_bands_use_highest_threshold_reached() {
        let calc = RewardCalculator::default();
        assert_eq!(calc.streak_multiplier(0), Decimal::ONE);
        assert_eq!(calc.streak_multiplier(2), Decimal::ONE);
        assert_eq!(calc.streak_multiplier(3), dec("1.1"));
        assert_eq!(calc.streak_multiplier(7), dec("1.2"));
        assert_eq!(calc.streak_multiplier(14), dec("1.2"));
        assert_eq!(calc.streak_multiplier(15), dec("1.3"));
        assert_eq!(calc.streak_multiplier(30), dec("1.5"));
        assert_eq!(calc.streak_multiplier(35), dec("1.5"));
    }

    #[test]
    fn rounding_is_half_up() {
        // 0.25 * 10 * 1.0 * 1.0 * 1.0 = 2.5 -> 3
        assert_eq!(calc("0.25", "utilities", false, 0).unwrap().points, 3);
        // 0.05 * 10 * 0.8 = 0.4 -> 0 -> floored to the one-point minimum
        assert_eq!(calc("0.05", "subscription", false, 0).unwrap().points, 1);
    }

    #[test]
    fn alternate_config_changes_the_formula() {
        let mut config = RewardConfig::default();
        config.points_per_unit = Decimal::ONE;
        config.on_time_multiplier = Decimal::from(2);
        config.streak_bands.clear();
        config.minimum_points = 0;
        let calc = RewardCalculator::new(config);
        let award = calc
            .calculate(&PaymentEvent::new(dec("100"), "credit_card", true, 90))
            .unwrap();
        assert_eq!(award.points, 300);
        assert_eq!(award.breakdown.streak_multiplier, Decimal::ONE);
    }

    #[test]
    fn unsorted_bands_are_ordered_on_construction() {
        let mut config = RewardConfig::default();
        config.streak_bands.reverse();
        let calc = RewardCalculator::new(config);
        assert_eq!(calc.streak_multiplier(40), dec("1.5"));
    }
}
