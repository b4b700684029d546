use serde::{Deserialize, Serialize};
use std::fmt;

use crate::rule::{Rule, RuleError};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    #[default]
    Contains,
    Exact,
    StartsWith,
    EndsWith,
    Regex,
}

impl std::str::FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "contains" => Ok(PatternType::Contains),
            "exact" => Ok(PatternType::Exact),
            "starts_with" => Ok(PatternType::StartsWith),
            "ends_with" => Ok(PatternType::EndsWith),
            "regex" => Ok(PatternType::Regex),
            other => Err(format!("Unknown pattern type: '{other}'")),
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternType::Contains => write!(f, "contains"),
            PatternType::Exact => write!(f, "exact"),
            PatternType::StartsWith => write!(f, "starts_with"),
            PatternType::EndsWith => write!(f, "ends_with"),
            PatternType::Regex => write!(f, "regex"),
        }
    }
}

/// A rule pattern prepared for repeated matching.
///
/// Text patterns are case-folded once up front. Regex patterns are compiled
/// when the rule is created and never at match time.
#[derive(Debug, Clone)]
pub(crate) enum CompiledPattern {
    Contains(String),
    Exact(String),
    StartsWith(String),
    EndsWith(String),
    Regex(regex::Regex),
}

impl CompiledPattern {
    pub(crate) fn compile(pattern_type: PatternType, pattern: &str) -> Result<Self, RuleError> {
        let folded = pattern.to_lowercase();
        let compiled = match pattern_type {
            PatternType::Contains => CompiledPattern::Contains(folded),
            PatternType::Exact => CompiledPattern::Exact(folded.trim().to_string()),
            PatternType::StartsWith => CompiledPattern::StartsWith(folded),
            PatternType::EndsWith => CompiledPattern::EndsWith(folded),
            PatternType::Regex => {
                let re = regex::Regex::new(pattern).map_err(|e| RuleError::InvalidRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                CompiledPattern::Regex(re)
            }
        };
        Ok(compiled)
    }

    pub(crate) fn is_match(&self, description: &str) -> bool {
        match self {
            // Regex sees the raw description; case sensitivity is up to the pattern.
            CompiledPattern::Regex(re) => re.is_match(description),
            CompiledPattern::Exact(p) => description.trim().to_lowercase() == *p,
            CompiledPattern::Contains(p) => description.to_lowercase().contains(p.as_str()),
            CompiledPattern::StartsWith(p) => description.to_lowercase().starts_with(p.as_str()),
            CompiledPattern::EndsWith(p) => description.to_lowercase().ends_with(p.as_str()),
        }
    }
}

/// Tests one rule's pattern against one description. Activity is not considered.
pub fn matches(description: &str, rule: &Rule) -> bool {
    rule.compiled().is_match(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(pattern_type: PatternType, pattern: &str) -> CompiledPattern {
        CompiledPattern::compile(pattern_type, pattern).unwrap()
    }

    #[test]
    fn contains_is_case_insensitive() {
        let p = compiled(PatternType::Contains, "amazon");
        assert!(p.is_match("AMAZON PURCHASE"));
        assert!(p.is_match("www.Amazon.com"));
        assert!(!p.is_match("AMZN MKTP"));
    }

    #[test]
    fn exact_trims_and_ignores_case() {
        let p = compiled(PatternType::Exact, " Netflix ");
        assert!(p.is_match("NETFLIX"));
        assert!(p.is_match("  netflix\t"));
        assert!(!p.is_match("NETFLIX.COM"));
    }

    #[test]
    fn starts_with_and_ends_with() {
        let starts = compiled(PatternType::StartsWith, "sq *");
        assert!(starts.is_match("SQ *BLUE BOTTLE"));
        assert!(!starts.is_match("PAYPAL SQ *"));

        let ends = compiled(PatternType::EndsWith, "autopay");
        assert!(ends.is_match("CHASE CARD AUTOPAY"));
        assert!(!ends.is_match("AUTOPAY CHASE"));
    }

    #[test]
    fn regex_is_case_sensitive_by_default() {
        let p = compiled(PatternType::Regex, r"^UBER\s+(TRIP|EATS)");
        assert!(p.is_match("UBER TRIP 1234"));
        assert!(p.is_match("UBER  EATS"));
        assert!(!p.is_match("uber trip"));
    }

    #[test]
    fn regex_can_opt_into_case_insensitivity() {
        let p = compiled(PatternType::Regex, r"(?i)^uber");
        assert!(p.is_match("Uber Trip"));
    }

    #[test]
    fn invalid_regex_is_rejected_at_compile_time() {
        let err = CompiledPattern::compile(PatternType::Regex, "(unclosed").unwrap_err();
        assert!(matches!(err, RuleError::InvalidRegex { .. }));
    }

    #[test]
    fn non_regex_patterns_accept_regex_metacharacters_literally() {
        let p = compiled(PatternType::Contains, "(unclosed");
        assert!(p.is_match("foo (UNCLOSED bar"));
    }

    #[test]
    fn pattern_type_parses_and_displays() {
        for name in ["contains", "exact", "starts_with", "ends_with", "regex"] {
            let parsed: PatternType = name.parse().unwrap();
            assert_eq!(parsed.to_string(), name);
        }
        assert!("fuzzy".parse::<PatternType>().is_err());
    }
}
