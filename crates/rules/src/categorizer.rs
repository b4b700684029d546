use std::collections::BTreeSet;

use finch_core::{DateRange, Transaction, TransactionId};
use serde::Serialize;

use crate::pattern::matches;
use crate::rule::{Rule, RuleId};
use crate::rule_set::RuleSet;

/// The outcome of the first rule that fired for a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Categorization {
    pub category: String,
    pub subcategory: Option<String>,
    pub matched_rule: RuleId,
    pub rule_name: String,
}

impl Categorization {
    fn from_rule(rule: &Rule) -> Self {
        Categorization {
            category: rule.category().to_string(),
            subcategory: rule.subcategory().map(str::to_string),
            matched_rule: rule.id(),
            rule_name: rule.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorizationDetail {
    pub transaction_id: TransactionId,
    pub category: String,
    pub subcategory: Option<String>,
    pub rule_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoCategorizeReport {
    pub categorized_count: usize,
    /// Transactions that were examined and matched no rule.
    pub uncategorized_count: usize,
    pub details: Vec<CategorizationDetail>,
}

/// Which transactions a run is allowed to look at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransactionSelection {
    #[default]
    All,
    Ids(BTreeSet<TransactionId>),
    Dates(DateRange),
}

impl TransactionSelection {
    pub fn includes(&self, tx: &Transaction) -> bool {
        match self {
            TransactionSelection::All => true,
            TransactionSelection::Ids(ids) => ids.contains(&tx.id()),
            TransactionSelection::Dates(range) => range.contains(tx.date()),
        }
    }
}

/// First-match-wins categorization over a fixed evaluation order.
///
/// The order is computed once at construction, so a single instance can be
/// reused for a whole batch.
pub struct AutoCategorizer<'a> {
    ordered: Vec<&'a Rule>,
}

impl<'a> AutoCategorizer<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self { ordered: rules.by_priority() }
    }

    pub fn categorize(&self, description: &str) -> Option<Categorization> {
        self.ordered
            .iter()
            .find(|rule| matches(description, rule))
            .map(|rule| Categorization::from_rule(rule))
    }

    /// Categorizes every transaction that has no category yet.
    pub fn run(&self, transactions: &mut [Transaction]) -> AutoCategorizeReport {
        self.run_selected(transactions, &TransactionSelection::All)
    }

    pub fn run_selected(
        &self,
        transactions: &mut [Transaction],
        selection: &TransactionSelection,
    ) -> AutoCategorizeReport {
        let mut report = AutoCategorizeReport::default();

        for tx in transactions.iter_mut() {
            if tx.is_categorized() || !selection.includes(tx) {
                continue;
            }
            match self.categorize(tx.description()) {
                Some(hit) => {
                    if tx.categorize_if_unset(&hit.category, hit.subcategory.as_deref()) {
                        report.categorized_count += 1;
                        report.details.push(CategorizationDetail {
                            transaction_id: tx.id(),
                            category: hit.category,
                            subcategory: hit.subcategory,
                            rule_name: hit.rule_name,
                        });
                    }
                }
                None => report.uncategorized_count += 1,
            }
        }

        tracing::debug!(
            rules = self.ordered.len(),
            categorized = report.categorized_count,
            uncategorized = report.uncategorized_count,
            "auto-categorize run finished"
        );
        report
    }
}

/// One-shot form of [`AutoCategorizer::categorize`].
pub fn categorize(description: &str, rules: &RuleSet) -> Option<Categorization> {
    AutoCategorizer::new(rules).categorize(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PatternType;
    use crate::rule::NewRule;
    use chrono::NaiveDate;
    use finch_core::Money;

    fn make_tx(id: i64, desc: &str, day: u32) -> Transaction {
        Transaction::new(
            TransactionId(id),
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            desc,
            Money::from_cents(-1_000),
        )
    }

    fn make_rule(pattern: &str, pattern_type: PatternType, category: &str, priority: i32) -> NewRule {
        NewRule::new(category, pattern_type, pattern, category).with_priority(priority)
    }

    #[test]
    fn priority_ordering_highest_wins() {
        let rules = RuleSet::from_rules([
            make_rule("amazon", PatternType::Contains, "Shopping", 1),
            make_rule("amazon", PatternType::Contains, "Books", 5),
        ])
        .unwrap();
        let hit = categorize("AMAZON PURCHASE", &rules).unwrap();
        assert_eq!(hit.category, "Books");
        assert_eq!(hit.matched_rule, RuleId(2));
    }

    #[test]
    fn equal_priority_first_created_wins() {
        let rules = RuleSet::from_rules([
            make_rule("coffee", PatternType::Contains, "Cafe", 3),
            make_rule("coffee", PatternType::Contains, "Groceries", 3),
        ])
        .unwrap();
        assert_eq!(categorize("COFFEE BEAN", &rules).unwrap().category, "Cafe");
    }

    #[test]
    fn inactive_rules_never_fire() {
        let rules = RuleSet::from_rules([
            make_rule("netflix", PatternType::Contains, "Entertainment", 9).inactive(),
            make_rule("netflix", PatternType::Contains, "Subscriptions", 1),
        ])
        .unwrap();
        assert_eq!(categorize("NETFLIX.COM", &rules).unwrap().category, "Subscriptions");
    }

    #[test]
    fn no_match_is_none() {
        let rules = RuleSet::from_rules([make_rule("rent", PatternType::Exact, "Housing", 1)]).unwrap();
        assert!(categorize("RENTAL CAR", &rules).is_none());
        assert!(categorize("anything", &RuleSet::new()).is_none());
    }

    #[test]
    fn categorize_is_deterministic() {
        let rules = RuleSet::from_rules([
            make_rule("^SHELL", PatternType::Regex, "Fuel", 2),
            make_rule("shell", PatternType::Contains, "Misc", 2),
        ])
        .unwrap();
        let first = categorize("SHELL OIL 123", &rules);
        let second = categorize("SHELL OIL 123", &rules);
        assert_eq!(first, second);
        assert_eq!(first.unwrap().category, "Fuel");
    }

    #[test]
    fn run_counts_and_records_details() {
        let rules = RuleSet::from_rules([
            make_rule("github", PatternType::Contains, "Software", 1).with_subcategory("Dev tools"),
        ])
        .unwrap();
        let mut txs = vec![
            make_tx(1, "GITHUB SUBSCRIPTION", 1),
            make_tx(2, "STARBUCKS", 2),
            make_tx(3, "GITHUB ACTIONS", 3),
        ];
        let report = AutoCategorizer::new(&rules).run(&mut txs);

        assert_eq!(report.categorized_count, 2);
        assert_eq!(report.uncategorized_count, 1);
        assert_eq!(report.details.len(), 2);
        assert_eq!(report.details[0].transaction_id, TransactionId(1));
        assert_eq!(report.details[1].transaction_id, TransactionId(3));
        assert_eq!(txs[0].subcategory(), Some("Dev tools"));
        assert!(!txs[1].is_categorized());
    }

    #[test]
    fn run_is_idempotent_and_leaves_existing_categories_alone() {
        let rules = RuleSet::from_rules([make_rule("uber", PatternType::Contains, "Transport", 1)]).unwrap();
        let mut txs = vec![make_tx(1, "UBER TRIP", 1), make_tx(2, "UBER EATS", 2)];
        txs[1].assign_category("Food", None);

        let categorizer = AutoCategorizer::new(&rules);
        let first = categorizer.run(&mut txs);
        let snapshot = txs.clone();
        let second = categorizer.run(&mut txs);

        assert_eq!(first.categorized_count, 1);
        assert_eq!(txs[1].category(), Some("Food"));
        assert_eq!(second, AutoCategorizeReport::default());
        assert_eq!(txs, snapshot);
    }

    #[test]
    fn run_selected_respects_id_selection() {
        let rules = RuleSet::from_rules([make_rule("shop", PatternType::Contains, "Shopping", 1)]).unwrap();
        let mut txs = vec![make_tx(1, "SHOP A", 1), make_tx(2, "SHOP B", 2)];
        let selection = TransactionSelection::Ids([TransactionId(2)].into_iter().collect());
        let report = AutoCategorizer::new(&rules).run_selected(&mut txs, &selection);
        assert_eq!(report.categorized_count, 1);
        assert!(!txs[0].is_categorized());
        assert!(txs[1].is_categorized());
    }

    #[test]
    fn run_selected_respects_date_range() {
        let rules = RuleSet::from_rules([make_rule("shop", PatternType::Contains, "Shopping", 1)]).unwrap();
        let mut txs = vec![make_tx(1, "SHOP A", 5), make_tx(2, "SHOP B", 20), make_tx(3, "CAFE", 10)];
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        )
        .unwrap();
        let report = AutoCategorizer::new(&rules).run_selected(&mut txs, &TransactionSelection::Dates(range));
        assert_eq!(report.categorized_count, 1);
        assert_eq!(report.uncategorized_count, 1);
        assert!(!txs[1].is_categorized());
    }
}
