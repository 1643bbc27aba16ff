use std::collections::BTreeMap;

use serde::Serialize;

use crate::date_utils::{day_label, month_label};
use crate::models::{Category, Transaction, TransactionType};
use crate::money::format_percent;

// The aggregators sum plain i64 cents. Callers pass records that went through
// `validate_transactions`, whose amount cap and record limit keep every sum in
// range.

/// Number of most recent days with activity kept in the daily series.
pub const DAILY_WINDOW: usize = 14;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TotalsSummary {
    pub income_cents: i64,
    pub expense_cents: i64,
    pub balance_cents: i64,
}

impl TotalsSummary {
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        let mut income_cents = 0;
        let mut expense_cents = 0;

        for transaction in transactions {
            match transaction.kind {
                TransactionType::Income => income_cents += transaction.amount_cents,
                TransactionType::Expense => expense_cents += transaction.amount_cents,
            }
        }

        Self {
            income_cents,
            expense_cents,
            balance_cents: income_cents - expense_cents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBucket {
    pub category: Category,
    pub color: &'static str,
    pub total_cents: i64,
    pub count: usize,
    pub share_percent: f64,
    /// `share_percent` rendered with two decimals, e.g. `60.00%`.
    pub share_display: String,
}

/// Expense totals per category, largest first.
///
/// Income records are skipped. Categories with equal totals stay in the order
/// they were first seen.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryBucket> {
    let mut buckets: Vec<CategoryBucket> = Vec::new();

    for transaction in transactions.iter().filter(|t| t.is_expense()) {
        match buckets
            .iter_mut()
            .find(|b| b.category == transaction.category)
        {
            Some(bucket) => {
                bucket.total_cents += transaction.amount_cents;
                bucket.count += 1;
            }
            None => buckets.push(CategoryBucket {
                category: transaction.category,
                color: transaction.category.color(),
                total_cents: transaction.amount_cents,
                count: 1,
                share_percent: 0.0,
                share_display: format_percent(0.0),
            }),
        }
    }

    let grand_total: i64 = buckets.iter().map(|b| b.total_cents).sum();
    if grand_total > 0 {
        for bucket in &mut buckets {
            bucket.share_percent = (bucket.total_cents as f64 / grand_total as f64) * 100.0;
            bucket.share_display = format_percent(bucket.share_percent);
        }
    }

    buckets.sort_by(|a, b| b.total_cents.cmp(&a.total_cents));
    buckets
}

/// The expense category with the largest total, if there are any expenses.
pub fn dominant_category(transactions: &[Transaction]) -> Option<Category> {
    category_breakdown(transactions)
        .first()
        .map(|bucket| bucket.category)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeBucket {
    /// `YYYY-MM-DD` for days, `YYYY-MM` for months.
    pub key: String,
    pub label: String,
    pub income_cents: i64,
    pub expense_cents: i64,
    /// Net of this bucket alone, not a running total.
    pub balance_cents: i64,
}

/// Income and expense per day, oldest first, limited to the last
/// [`DAILY_WINDOW`] days that have at least one transaction.
pub fn daily_series(transactions: &[Transaction]) -> Vec<TimeBucket> {
    let mut buckets = bucket_by(transactions, |t| t.date.as_str(), day_label);
    if buckets.len() > DAILY_WINDOW {
        buckets.drain(..buckets.len() - DAILY_WINDOW);
    }
    buckets
}

/// Income, expense and net per calendar month, oldest first.
pub fn monthly_series(transactions: &[Transaction]) -> Vec<TimeBucket> {
    bucket_by(transactions, Transaction::month, month_label)
}

fn bucket_by<K, L>(transactions: &[Transaction], key_of: K, label_of: L) -> Vec<TimeBucket>
where
    K: Fn(&Transaction) -> &str,
    L: Fn(&str) -> String,
{
    let mut sums: BTreeMap<&str, (i64, i64)> = BTreeMap::new();

    for transaction in transactions {
        let entry = sums.entry(key_of(transaction)).or_insert((0, 0));
        match transaction.kind {
            TransactionType::Income => entry.0 += transaction.amount_cents,
            TransactionType::Expense => entry.1 += transaction.amount_cents,
        }
    }

    sums.into_iter()
        .map(|(key, (income_cents, expense_cents))| TimeBucket {
            key: key.to_string(),
            label: label_of(key),
            income_cents,
            expense_cents,
            balance_cents: income_cents - expense_cents,
        })
        .collect()
}
