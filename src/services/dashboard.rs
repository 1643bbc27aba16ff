//! Dashboard view model and the controller that decides which result is shown.
//!
//! Every change of period, type or category selector (or of the underlying
//! transactions) recomputes the whole view from scratch with [`build_view`].
//! Overlapping refreshes are settled by [`DashboardController`]: the refresh
//! started last wins, whatever order the results arrive in.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, trace};

use crate::date_utils::Period;
use crate::models::{Category, Transaction};
use crate::money::{format_money, MAX_AGGREGATED_RECORDS};
use crate::services::analytics::{
    category_breakdown, daily_series, monthly_series, CategoryBucket, TimeBucket, TotalsSummary,
};
use crate::services::filter::{CategoryFilter, TransactionPredicate, TypeFilter};
use crate::services::projection::{sorted_view, TransactionSort};

/// Declared inputs of the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardQuery {
    pub period: Period,
    pub kind: TypeFilter,
    pub category: CategoryFilter,
    pub sort: TransactionSort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsDisplay {
    pub income: String,
    pub expense: String,
    pub balance: String,
}

impl TotalsDisplay {
    pub fn new(totals: &TotalsSummary, currency: &str) -> Self {
        Self {
            income: format_money(totals.income_cents, currency),
            expense: format_money(totals.expense_cents, currency),
            balance: format_money(totals.balance_cents, currency),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub period: Period,
    /// Inclusive lower bound the period resolved to.
    pub from: Option<String>,
    pub totals: TotalsSummary,
    pub totals_display: TotalsDisplay,
    pub dominant_category: Option<Category>,
    pub categories: Vec<CategoryBucket>,
    pub daily: Vec<TimeBucket>,
    pub monthly: Vec<TimeBucket>,
    pub transactions: Vec<Transaction>,
}

/// Fail fast on records that would corrupt the aggregates.
pub fn validate_transactions(transactions: &[Transaction]) -> Result<(), String> {
    if transactions.len() > MAX_AGGREGATED_RECORDS {
        return Err(format!(
            "Too many transactions to aggregate: {}",
            transactions.len()
        ));
    }
    transactions.iter().try_for_each(Transaction::check_invariants)
}

/// Run the full pipeline: time window, type and category selectors, then
/// every aggregate over what is left.
pub fn build_view(
    transactions: &[Transaction],
    query: &DashboardQuery,
    today: NaiveDate,
    currency: &str,
) -> Result<DashboardView, String> {
    validate_transactions(transactions)?;

    let predicate =
        TransactionPredicate::new(query.kind, query.category).with_period(query.period, today);
    let filtered = predicate.apply(transactions);
    trace!(
        input = transactions.len(),
        kept = filtered.len(),
        period = query.period.as_str(),
        "Filtered transactions for dashboard"
    );

    let totals = TotalsSummary::from_transactions(&filtered);
    let categories = category_breakdown(&filtered);

    Ok(DashboardView {
        period: query.period,
        from: predicate.since.clone(),
        totals,
        totals_display: TotalsDisplay::new(&totals, currency),
        dominant_category: categories.first().map(|bucket| bucket.category),
        categories,
        daily: daily_series(&filtered),
        monthly: monthly_series(&filtered),
        transactions: sorted_view(&filtered, &query.sort),
    })
}

/// Generation a refresh was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Holds the displayed dashboard and resolves overlapping refreshes
/// last-write-wins by start order.
#[derive(Default)]
pub struct DashboardController {
    generation: AtomicU64,
    current: RwLock<Option<(RefreshTicket, Arc<DashboardView>)>>,
}

impl DashboardController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a refresh. Any ticket handed out earlier becomes stale.
    pub fn begin(&self) -> RefreshTicket {
        RefreshTicket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_latest(&self, ticket: RefreshTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Show `view` if no refresh was started after `ticket`. Returns whether
    /// it was applied.
    pub fn apply(&self, ticket: RefreshTicket, view: DashboardView) -> bool {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        if !self.is_latest(ticket) {
            debug!(
                ticket = ticket.0,
                latest = self.generation.load(Ordering::SeqCst),
                "Discarding stale dashboard result"
            );
            return false;
        }
        *guard = Some((ticket, Arc::new(view)));
        true
    }

    /// The view currently shown, if any refresh has completed.
    pub fn current(&self) -> Option<Arc<DashboardView>> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(_, view)| Arc::clone(view))
    }

    /// Ticket of the view currently shown.
    pub fn current_ticket(&self) -> Option<RefreshTicket> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|(ticket, _)| *ticket)
    }
}

/// One controller per signed-in user.
#[derive(Default)]
pub struct DashboardRegistry {
    controllers: Mutex<HashMap<String, Arc<DashboardController>>>,
}

impl DashboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_user(&self, user_id: &str) -> Arc<DashboardController> {
        let mut controllers = self.controllers.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(controllers.entry(user_id.to_string()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TransactionType;
    use crate::money::MAX_AMOUNT_CENTS;
    use crate::services::projection::TransactionSortColumn;
    use crate::sort_utils::{SortDirection, TableSort};

    fn tx(
        id: &str,
        kind: TransactionType,
        amount_cents: i64,
        category: Category,
        date: &str,
    ) -> Transaction {
        Transaction {
            id: id.into(),
            title: id.into(),
            amount_cents,
            kind,
            category,
            date: date.into(),
            notes: None,
            created_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("salary", TransactionType::Income, 100_000, Category::Other, "2024-01-05"),
            tx("lunch", TransactionType::Expense, 30_000, Category::Food, "2024-01-05"),
            tx("bus", TransactionType::Expense, 20_000, Category::Transport, "2024-01-06"),
            tx("old", TransactionType::Expense, 5_000, Category::Food, "2023-06-01"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    #[test]
    fn test_build_view_applies_period() {
        let query = DashboardQuery {
            period: Period::ThirtyDays,
            ..Default::default()
        };
        let view = build_view(&sample(), &query, today(), "THB").unwrap();

        assert_eq!(view.from.as_deref(), Some("2023-12-11"));
        assert_eq!(view.totals.income_cents, 100_000);
        assert_eq!(view.totals.expense_cents, 50_000);
        assert_eq!(view.totals.balance_cents, 50_000);
        assert_eq!(view.totals_display.balance, "\u{0e3f}500.00");
        assert_eq!(view.dominant_category, Some(Category::Food));
        assert_eq!(view.categories.len(), 2);
        assert_eq!(view.daily.len(), 2);
        assert_eq!(view.monthly.len(), 1);
        let ids: Vec<_> = view.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["bus", "salary", "lunch"]);
    }

    #[test]
    fn test_build_view_with_selectors_and_sort() {
        let query = DashboardQuery {
            period: Period::All,
            kind: TypeFilter::Only(TransactionType::Expense),
            category: CategoryFilter::Only(Category::Food),
            sort: TableSort::new(TransactionSortColumn::Amount, SortDirection::Asc),
        };
        let view = build_view(&sample(), &query, today(), "THB").unwrap();

        assert_eq!(view.from, None);
        assert_eq!(view.totals.income_cents, 0);
        assert_eq!(view.totals.expense_cents, 35_000);
        assert_eq!(view.monthly.len(), 2);
        let ids: Vec<_> = view.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["old", "lunch"]);
    }

    #[test]
    fn test_build_view_empty() {
        let view = build_view(&[], &DashboardQuery::default(), today(), "THB").unwrap();
        assert_eq!(view.totals, TotalsSummary::default());
        assert_eq!(view.dominant_category, None);
        assert!(view.categories.is_empty());
        assert!(view.daily.is_empty());
        assert!(view.monthly.is_empty());
        assert!(view.transactions.is_empty());
    }

    #[test]
    fn test_build_view_rejects_malformed_record() {
        let mut transactions = sample();
        transactions[1].date = "5 Jan 2024".into();
        let err = build_view(&transactions, &DashboardQuery::default(), today(), "THB")
            .unwrap_err();
        assert!(err.contains("malformed date"));
    }

    #[test]
    fn test_build_view_rejects_amount_above_limit() {
        let mut transactions = sample();
        transactions[0].amount_cents = 92_233_720_368_547_758;
        transactions.push(transactions[0].clone());
        let err = build_view(&transactions, &DashboardQuery::default(), today(), "THB")
            .unwrap_err();
        assert!(err.contains("amount limit"));
    }

    #[test]
    fn test_largest_amounts_sum_exactly() {
        let transactions = vec![
            tx("a", TransactionType::Income, MAX_AMOUNT_CENTS, Category::Other, "2024-01-05"),
            tx("b", TransactionType::Income, MAX_AMOUNT_CENTS, Category::Other, "2024-01-06"),
            tx("c", TransactionType::Expense, MAX_AMOUNT_CENTS, Category::Food, "2024-01-06"),
        ];
        let query = DashboardQuery {
            period: Period::All,
            ..Default::default()
        };
        let view = build_view(&transactions, &query, today(), "THB").unwrap();
        assert_eq!(view.totals.income_cents, 2 * MAX_AMOUNT_CENTS);
        assert_eq!(view.totals.balance_cents, MAX_AMOUNT_CENTS);
        assert_eq!(view.categories[0].total_cents, MAX_AMOUNT_CENTS);
        assert_eq!(view.monthly[0].income_cents, 2 * MAX_AMOUNT_CENTS);
    }

    #[test]
    fn test_build_view_is_deterministic() {
        let query = DashboardQuery {
            period: Period::All,
            ..Default::default()
        };
        let first = build_view(&sample(), &query, today(), "THB").unwrap();
        let second = build_view(&sample(), &query, today(), "THB").unwrap();
        assert_eq!(first, second);
    }

    fn empty_view() -> DashboardView {
        build_view(&[], &DashboardQuery::default(), today(), "THB").unwrap()
    }

    fn view_for(period: Period) -> DashboardView {
        let query = DashboardQuery {
            period,
            ..Default::default()
        };
        build_view(&sample(), &query, today(), "THB").unwrap()
    }

    #[test]
    fn test_controller_applies_in_order() {
        let controller = DashboardController::new();
        assert!(controller.current().is_none());

        let ticket = controller.begin();
        assert!(controller.apply(ticket, empty_view()));
        assert_eq!(controller.current_ticket(), Some(ticket));
    }

    #[test]
    fn test_latest_started_refresh_wins_when_it_finishes_first() {
        let controller = DashboardController::new();
        let slow = controller.begin();
        let fast = controller.begin();

        assert!(controller.apply(fast, view_for(Period::All)));
        assert!(!controller.apply(slow, view_for(Period::SevenDays)));

        assert_eq!(controller.current().unwrap().period, Period::All);
        assert_eq!(controller.current_ticket(), Some(fast));
    }

    #[test]
    fn test_stale_result_is_dropped_even_if_newer_is_pending() {
        let controller = DashboardController::new();
        let first = controller.begin();
        let second = controller.begin();

        assert!(!controller.apply(first, view_for(Period::SevenDays)));
        assert!(controller.current().is_none());

        assert!(controller.apply(second, view_for(Period::OneYear)));
        assert_eq!(controller.current().unwrap().period, Period::OneYear);
    }

    #[test]
    fn test_registry_keeps_one_controller_per_user() {
        let registry = DashboardRegistry::new();
        let a = registry.for_user("alice");
        let again = registry.for_user("alice");
        let b = registry.for_user("bob");

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));

        let ticket = a.begin();
        assert_eq!(ticket.generation(), 1);
        assert_eq!(b.begin().generation(), 1);
    }
}
