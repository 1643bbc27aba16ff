use std::str::FromStr;

use chrono::NaiveDate;

use crate::date_utils::{format_date, Period};
use crate::models::{Category, Transaction, TransactionType};

/// Transaction type selector; `all` or one type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl FromStr for TypeFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

/// Category selector; `all` or one category.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl FromStr for CategoryFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "all" => Ok(Self::All),
            other => other.parse().map(Self::Only),
        }
    }
}

/// In-memory narrowing of a transaction list.
///
/// Income records always pass the category selector, since a category only
/// means something for expenses.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TransactionPredicate {
    pub kind: TypeFilter,
    pub category: CategoryFilter,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub since: Option<String>,
}

impl TransactionPredicate {
    pub fn new(kind: TypeFilter, category: CategoryFilter) -> Self {
        Self {
            kind,
            category,
            since: None,
        }
    }

    pub fn with_since(mut self, since: Option<NaiveDate>) -> Self {
        self.since = since.map(format_date);
        self
    }

    /// Restrict to the window `period` selects, counted back from `today`.
    pub fn with_period(self, period: Period, today: NaiveDate) -> Self {
        self.with_since(period.start_date(today))
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let in_window = match &self.since {
            Some(since) => transaction.date.as_str() >= since.as_str(),
            None => true,
        };

        let type_matches = match self.kind {
            TypeFilter::All => true,
            TypeFilter::Only(kind) => transaction.kind == kind,
        };

        let category_matches = match self.category {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => {
                transaction.is_income() || transaction.category == category
            }
        };

        in_window && type_matches && category_matches
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }
}
