use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

use crate::pattern::{CompiledPattern, PatternType};

pub const PRIORITY_RANGE: RangeInclusive<i32> = 1..=10;

const MAX_NAME_LEN: usize = 100;
const MAX_PATTERN_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("Invalid regular expression pattern '{pattern}': {reason}")]
    InvalidRegex { pattern: String, reason: String },
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("Field '{field}' exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
    #[error("Priority {0} is outside the allowed range 1-10")]
    PriorityOutOfRange(i32),
    #[error("Failed to parse rules file: {0}")]
    Config(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(pub u64);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rule as submitted by an author, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRule {
    pub name: String,
    #[serde(default)]
    pub pattern_type: PatternType,
    pub pattern: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_priority() -> i32 {
    1
}

fn default_active() -> bool {
    true
}

impl NewRule {
    pub fn new(name: &str, pattern_type: PatternType, pattern: &str, category: &str) -> Self {
        NewRule {
            name: name.to_string(),
            pattern_type,
            pattern: pattern.to_string(),
            category: category.to_string(),
            subcategory: None,
            priority: default_priority(),
            is_active: true,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_subcategory(mut self, subcategory: &str) -> Self {
        self.subcategory = Some(subcategory.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    fn validate(&self) -> Result<(), RuleError> {
        check_text("name", &self.name, MAX_NAME_LEN)?;
        check_text("pattern", &self.pattern, MAX_PATTERN_LEN)?;
        check_text("category", &self.category, MAX_CATEGORY_LEN)?;
        if let Some(sub) = &self.subcategory {
            if sub.chars().count() > MAX_CATEGORY_LEN {
                return Err(RuleError::TooLong { field: "subcategory", max: MAX_CATEGORY_LEN });
            }
        }
        if !PRIORITY_RANGE.contains(&self.priority) {
            return Err(RuleError::PriorityOutOfRange(self.priority));
        }
        Ok(())
    }
}

fn check_text(field: &'static str, value: &str, max: usize) -> Result<(), RuleError> {
    if value.trim().is_empty() {
        return Err(RuleError::EmptyField(field));
    }
    if value.chars().count() > max {
        return Err(RuleError::TooLong { field, max });
    }
    Ok(())
}

/// A validated categorization rule. Only a [`crate::RuleSet`] hands these out.
#[derive(Debug, Clone, Serialize)]
pub struct Rule {
    id: RuleId,
    name: String,
    pattern_type: PatternType,
    pattern: String,
    category: String,
    subcategory: Option<String>,
    priority: i32,
    is_active: bool,
    #[serde(skip)]
    compiled: CompiledPattern,
}

impl Rule {
    pub(crate) fn build(id: RuleId, new_rule: NewRule) -> Result<Self, RuleError> {
        new_rule.validate()?;
        let compiled = CompiledPattern::compile(new_rule.pattern_type, &new_rule.pattern)?;
        Ok(Rule {
            id,
            name: new_rule.name,
            pattern_type: new_rule.pattern_type,
            pattern: new_rule.pattern,
            category: new_rule.category,
            subcategory: new_rule.subcategory.filter(|s| !s.trim().is_empty()),
            priority: new_rule.priority,
            is_active: new_rule.is_active,
            compiled,
        })
    }

    pub fn id(&self) -> RuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern_type(&self) -> PatternType {
        self.pattern_type
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subcategory(&self) -> Option<&str> {
        self.subcategory.as_deref()
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub(crate) fn compiled(&self) -> &CompiledPattern {
        &self.compiled
    }
}
