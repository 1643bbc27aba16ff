use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::date_utils::{format_date, period_table, today, Period, PeriodFilterable, PeriodInfo};
use crate::db::queries::transactions::{self, TransactionFilter};
use crate::error::{AppError, AppResult};
use crate::handlers::params::SelectorFilterable;
use crate::models::category::{category_table, CategoryInfo};
use crate::models::{Category, Transaction};
use crate::services::analytics::{
    category_breakdown, daily_series, monthly_series, CategoryBucket, TimeBucket, TotalsSummary,
};
use crate::services::dashboard::{validate_transactions, TotalsDisplay};
use crate::services::filter::TransactionPredicate;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsParams {
    pub period: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
}

impl PeriodFilterable for AnalyticsParams {
    fn period(&self) -> Option<&String> {
        self.period.as_ref()
    }
}

impl SelectorFilterable for AnalyticsParams {
    fn type_param(&self) -> Option<&String> {
        self.kind.as_ref()
    }
    fn category_param(&self) -> Option<&String> {
        self.category.as_ref()
    }
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub period: Period,
    #[serde(flatten)]
    pub totals: TotalsSummary,
    pub display: TotalsDisplay,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub period: Period,
    pub dominant_category: Option<Category>,
    pub categories: Vec<CategoryBucket>,
}

#[derive(Debug, Serialize)]
pub struct SeriesResponse {
    pub period: Period,
    pub buckets: Vec<TimeBucket>,
}

/// The user's transactions inside the requested window that pass the
/// type and category selectors.
fn load_filtered(
    state: &AppState,
    user: &CurrentUser,
    params: &AnalyticsParams,
) -> AppResult<(Period, Vec<Transaction>)> {
    let period = params.resolve_period();
    let predicate = TransactionPredicate::new(params.resolve_type()?, params.resolve_category()?);

    let filter = TransactionFilter {
        from_date: period.start_date(today()).map(format_date),
        ..Default::default()
    };
    let conn = state.db.get()?;
    let rows = transactions::list_transactions(&conn, &user.id, &filter)?;
    validate_transactions(&rows).map_err(AppError::Internal)?;

    Ok((period, predicate.apply(&rows)))
}

pub async fn totals(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<TotalsResponse>> {
    let (period, rows) = load_filtered(&state, &user, &params)?;
    let totals = TotalsSummary::from_transactions(&rows);

    Ok(Json(TotalsResponse {
        period,
        totals,
        display: TotalsDisplay::new(&totals, &state.config.currency),
    }))
}

pub async fn categories(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<CategoriesResponse>> {
    let (period, rows) = load_filtered(&state, &user, &params)?;
    let categories = category_breakdown(&rows);

    Ok(Json(CategoriesResponse {
        period,
        dominant_category: categories.first().map(|bucket| bucket.category),
        categories,
    }))
}

pub async fn daily(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<SeriesResponse>> {
    let (period, rows) = load_filtered(&state, &user, &params)?;
    Ok(Json(SeriesResponse {
        period,
        buckets: daily_series(&rows),
    }))
}

pub async fn monthly(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<AnalyticsParams>,
) -> AppResult<Json<SeriesResponse>> {
    let (period, rows) = load_filtered(&state, &user, &params)?;
    Ok(Json(SeriesResponse {
        period,
        buckets: monthly_series(&rows),
    }))
}

pub async fn category_list() -> Json<Vec<CategoryInfo>> {
    Json(category_table())
}

pub async fn period_list() -> Json<Vec<PeriodInfo>> {
    Json(period_table())
}
