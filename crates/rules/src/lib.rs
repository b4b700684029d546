//! Rule-driven transaction categorization.
//!
//! A [`RuleSet`] holds validated rules in creation order. The
//! [`AutoCategorizer`] applies them first-match-wins by descending priority;
//! [`suggest`] previews every rule that would match, without writing anything.

pub mod categorizer;
pub mod pattern;
pub mod rule;
pub mod rule_set;
pub mod stats;
pub mod suggest;

pub use categorizer::{
    categorize, AutoCategorizeReport, AutoCategorizer, Categorization, CategorizationDetail,
    TransactionSelection,
};
pub use pattern::{matches, PatternType};
pub use rule::{NewRule, Rule, RuleError, RuleId, PRIORITY_RANGE};
pub use rule_set::RuleSet;
pub use stats::{category_statistics, CategoryReport, CategoryStatistics, UNCATEGORIZED};
pub use suggest::{confidence, recommended, suggest, RankedSuggestion};
