use std::cmp::Ordering;

use crate::models::Transaction;
use crate::sort_utils::{SortableColumn, TableSort};

/// Sortable columns for the transactions table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSortColumn {
    Title,
    #[default]
    Date,
    Amount,
    Category,
}

impl SortableColumn for TransactionSortColumn {
    type Row = Transaction;

    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "title" => Some(Self::Title),
            "date" => Some(Self::Date),
            "amount" => Some(Self::Amount),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Amount => "amount",
            Self::Category => "category",
        }
    }

    fn sql_expression(&self) -> &'static str {
        match self {
            Self::Title => "t.title",
            Self::Date => "t.date",
            Self::Amount => "t.amount_cents",
            Self::Category => "t.category",
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        match self {
            Self::Title => a.title.cmp(&b.title),
            Self::Date => a.date.cmp(&b.date),
            Self::Amount => a.amount_cents.cmp(&b.amount_cents),
            Self::Category => a.category.as_str().cmp(b.category.as_str()),
        }
    }
}

pub type TransactionSort = TableSort<TransactionSortColumn>;

/// The transactions reordered for the table view.
pub fn sorted_view(transactions: &[Transaction], sort: &TransactionSort) -> Vec<Transaction> {
    sort.apply(transactions)
}
