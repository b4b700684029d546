use std::collections::BTreeMap;

use finch_core::{Money, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Bucket the dashboard treats the same as "no category".
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    pub category: String,
    pub total_amount: Money,
    pub transaction_count: usize,
    pub percentage_of_total: f64,
    pub avg_transaction_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub total_spent: Money,
    pub statistics: Vec<CategoryStatistics>,
}

/// Per-category totals, sorted by category name.
pub fn category_statistics<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
) -> CategoryReport {
    let mut buckets: BTreeMap<&str, (Money, usize)> = BTreeMap::new();
    for tx in transactions {
        let Some(category) = tx.category() else { continue };
        if category == UNCATEGORIZED {
            continue;
        }
        let entry = buckets.entry(category).or_insert((Money::zero(), 0));
        entry.0 = entry.0 + tx.amount();
        entry.1 += 1;
    }

    let total_spent: Money = buckets.values().map(|(total, _)| *total).sum();

    let statistics = buckets
        .into_iter()
        .map(|(category, (total, count))| CategoryStatistics {
            category: category.to_string(),
            total_amount: total,
            transaction_count: count,
            percentage_of_total: percentage(total, total_spent),
            avg_transaction_amount: Money::from_decimal(total.as_decimal() / Decimal::from(count)),
        })
        .collect();

    CategoryReport { total_spent, statistics }
}

fn percentage(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    (part.as_decimal() / whole.as_decimal() * Decimal::ONE_HUNDRED)
        .round_dp(2)
        .to_f64()
        .unwrap_or(0.0)
}
