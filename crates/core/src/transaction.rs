use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank transaction as seen by the categorizer.
///
/// The category pair starts out unset and is written either once by the
/// auto-categorizer or by an explicit manual override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    date: NaiveDate,
    description: String,
    amount: Money,
    category: Option<String>,
    subcategory: Option<String>,
}

impl Transaction {
    pub fn new(id: TransactionId, date: NaiveDate, description: &str, amount: Money) -> Self {
        Transaction {
            id,
            date,
            description: description.to_string(),
            amount,
            category: None,
            subcategory: None,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn is_categorized(&self) -> bool {
        self.category.is_some()
    }

    /// Writes the category only when none is set yet. Returns whether a write happened.
    pub fn categorize_if_unset(&mut self, category: &str, subcategory: Option<&str>) -> bool {
        if self.category.is_some() {
            return false;
        }
        self.category = Some(category.to_string());
        self.subcategory = subcategory.map(str::to_string);
        true
    }

    /// Manual override; replaces whatever was there.
    pub fn assign_category(&mut self, category: &str, subcategory: Option<&str>) {
        self.category = Some(category.to_string());
        self.subcategory = subcategory.map(str::to_string);
    }
}
