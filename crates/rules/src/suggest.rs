use serde::Serialize;

use crate::pattern::{matches, PatternType};
use crate::rule::RuleId;
use crate::rule_set::RuleSet;

/// A matching rule, annotated for preview in a rule-authoring screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSuggestion {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub pattern_type: PatternType,
    pub priority: i32,
    pub confidence: f64,
}

/// Specificity of a pattern type, in [0, 1]. Not a probability.
pub fn confidence(pattern_type: PatternType) -> f64 {
    match pattern_type {
        PatternType::Exact => 1.0,
        PatternType::Regex => 0.85,
        PatternType::StartsWith | PatternType::EndsWith => 0.7,
        PatternType::Contains => 0.5,
    }
}

/// Every active rule that matches, by priority then confidence then creation order.
pub fn suggest(description: &str, rules: &RuleSet) -> Vec<RankedSuggestion> {
    let mut ranked: Vec<RankedSuggestion> = rules
        .iter()
        .filter(|rule| rule.is_active() && matches(description, rule))
        .map(|rule| RankedSuggestion {
            rule_id: rule.id(),
            rule_name: rule.name().to_string(),
            category: rule.category().to_string(),
            subcategory: rule.subcategory().map(str::to_string),
            pattern_type: rule.pattern_type(),
            priority: rule.priority(),
            confidence: confidence(rule.pattern_type()),
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
    ranked
}

pub fn recommended(suggestions: &[RankedSuggestion]) -> Option<&RankedSuggestion> {
    suggestions.first()
}
