use serde::Deserialize;

use crate::rule::{NewRule, Rule, RuleError, RuleId};

#[derive(Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<NewRule>,
}

/// Rules in the order they were created.
///
/// Ids are handed out monotonically and never reused. Removal preserves the
/// relative order of the remaining rules, so the vector order is the
/// tie-break for rules of equal priority.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    next_id: u64,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rules(rules: impl IntoIterator<Item = NewRule>) -> Result<Self, RuleError> {
        let mut set = Self::new();
        for rule in rules {
            set.insert(rule)?;
        }
        Ok(set)
    }

    /// Parses `[[rules]]` tables; each entry is validated like any other insert.
    pub fn from_toml(toml_content: &str) -> Result<Self, RuleError> {
        let file: RulesFile =
            toml::from_str(toml_content).map_err(|e| RuleError::Config(e.to_string()))?;
        Self::from_rules(file.rules)
    }

    pub fn insert(&mut self, new_rule: NewRule) -> Result<&Rule, RuleError> {
        let id = RuleId(self.next_id + 1);
        let rule = Rule::build(id, new_rule)?;
        self.next_id = id.0;
        tracing::debug!(rule_id = %id, name = rule.name(), "rule added");
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    pub fn remove(&mut self, id: RuleId) -> Option<Rule> {
        let idx = self.rules.iter().position(|r| r.id() == id)?;
        Some(self.rules.remove(idx))
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    /// Returns `false` if no rule has this id.
    pub fn set_active(&mut self, id: RuleId, active: bool) -> bool {
        match self.rules.iter_mut().find(|r| r.id() == id) {
            Some(rule) => {
                rule.set_active(active);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Active rules in evaluation order: highest priority first, then first created.
    pub fn by_priority(&self) -> Vec<&Rule> {
        let mut active: Vec<&Rule> = self.rules.iter().filter(|r| r.is_active()).collect();
        // Stable sort keeps insertion order within a priority.
        active.sort_by(|a, b| b.priority().cmp(&a.priority()));
        active
    }
}
