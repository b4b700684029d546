use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to parse reward config: {0}")]
    Parse(String),
    #[error("'{0}' must be greater than zero")]
    NonPositive(String),
    #[error("Streak threshold {0} is listed more than once")]
    DuplicateStreakBand(u32),
}

/// Bill categories with their own point weight.
///
/// Parsing is case-insensitive and never fails: anything unrecognised is
/// `Other`, which carries the neutral weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum BillCategory {
    Utilities,
    Rent,
    Mortgage,
    CreditCard,
    Loan,
    Insurance,
    Subscription,
    Education,
    Medical,
    Tax,
    Other,
}

impl BillCategory {
    pub const ALL: [BillCategory; 11] = [
        BillCategory::Utilities,
        BillCategory::Rent,
        BillCategory::Mortgage,
        BillCategory::CreditCard,
        BillCategory::Loan,
        BillCategory::Insurance,
        BillCategory::Subscription,
        BillCategory::Education,
        BillCategory::Medical,
        BillCategory::Tax,
        BillCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BillCategory::Utilities => "utilities",
            BillCategory::Rent => "rent",
            BillCategory::Mortgage => "mortgage",
            BillCategory::CreditCard => "credit_card",
            BillCategory::Loan => "loan",
            BillCategory::Insurance => "insurance",
            BillCategory::Subscription => "subscription",
            BillCategory::Education => "education",
            BillCategory::Medical => "medical",
            BillCategory::Tax => "tax",
            BillCategory::Other => "other",
        }
    }
}

impl fmt::Display for BillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BillCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        Ok(BillCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == key)
            .unwrap_or(BillCategory::Other))
    }
}

impl From<String> for BillCategory {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for BillCategory {
    fn from(s: &str) -> Self {
        BillCategory::from(s.to_string())
    }
}

/// One weight per [`BillCategory`]; lookups are an exhaustive match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryMultipliers {
    pub utilities: Decimal,
    pub rent: Decimal,
    pub mortgage: Decimal,
    pub credit_card: Decimal,
    pub loan: Decimal,
    pub insurance: Decimal,
    pub subscription: Decimal,
    pub education: Decimal,
    pub medical: Decimal,
    pub tax: Decimal,
    pub other: Decimal,
}

impl Default for CategoryMultipliers {
    fn default() -> Self {
        Self {
            utilities: Decimal::ONE,
            rent: Decimal::new(12, 1),
            mortgage: Decimal::new(12, 1),
            credit_card: Decimal::new(15, 1),
            loan: Decimal::new(13, 1),
            insurance: Decimal::new(11, 1),
            subscription: Decimal::new(8, 1),
            education: Decimal::new(14, 1),
            medical: Decimal::ONE,
            tax: Decimal::ONE,
            other: Decimal::ONE,
        }
    }
}

impl CategoryMultipliers {
    pub fn get(&self, category: BillCategory) -> Decimal {
        match category {
            BillCategory::Utilities => self.utilities,
            BillCategory::Rent => self.rent,
            BillCategory::Mortgage => self.mortgage,
            BillCategory::CreditCard => self.credit_card,
            BillCategory::Loan => self.loan,
            BillCategory::Insurance => self.insurance,
            BillCategory::Subscription => self.subscription,
            BillCategory::Education => self.education,
            BillCategory::Medical => self.medical,
            BillCategory::Tax => self.tax,
            BillCategory::Other => self.other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakBand {
    pub min_days: u32,
    pub multiplier: Decimal,
}

impl StreakBand {
    pub fn new(min_days: u32, multiplier: Decimal) -> Self {
        Self { min_days, multiplier }
    }
}

/// Everything the point formula depends on. Immutable once handed to a calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub points_per_unit: Decimal,
    pub on_time_multiplier: Decimal,
    pub category_multipliers: CategoryMultipliers,
    pub streak_bands: Vec<StreakBand>,
    /// Floor applied after rounding.
    pub minimum_points: i64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            points_per_unit: Decimal::from(10),
            on_time_multiplier: Decimal::new(15, 1),
            category_multipliers: CategoryMultipliers::default(),
            streak_bands: vec![
                StreakBand::new(30, Decimal::new(15, 1)),
                StreakBand::new(15, Decimal::new(13, 1)),
                StreakBand::new(7, Decimal::new(12, 1)),
                StreakBand::new(3, Decimal::new(11, 1)),
            ],
            minimum_points: 1,
        }
    }
}

impl RewardConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: RewardConfig =
            toml::from_str(toml_content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("points_per_unit", self.points_per_unit)?;
        positive("on_time_multiplier", self.on_time_multiplier)?;
        for category in BillCategory::ALL {
            positive(
                &format!("category_multipliers.{category}"),
                self.category_multipliers.get(category),
            )?;
        }
        let mut seen = Vec::with_capacity(self.streak_bands.len());
        for band in &self.streak_bands {
            positive(&format!("streak_bands[{}].multiplier", band.min_days), band.multiplier)?;
            if seen.contains(&band.min_days) {
                return Err(ConfigError::DuplicateStreakBand(band.min_days));
            }
            seen.push(band.min_days);
        }
        Ok(())
    }
}

fn positive(field: &str, value: Decimal) -> Result<(), ConfigError> {
    if value <= Decimal::ZERO {
        return Err(ConfigError::NonPositive(field.to_string()));
    }
    Ok(())
}
