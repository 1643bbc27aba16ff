use axum::extract::{Query, State};
use axum::response::Json;
use serde::Deserialize;
use tracing::debug;

use crate::auth::CurrentUser;
use crate::date_utils::{today, Period, PeriodFilterable};
use crate::db::queries::transactions::{self, TransactionFilter};
use crate::error::{AppError, AppResult};
use crate::handlers::params::SelectorFilterable;
use crate::services::dashboard::{build_view, DashboardQuery, DashboardView};
use crate::sort_utils::Sortable;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub period: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl PeriodFilterable for DashboardParams {
    fn period(&self) -> Option<&String> {
        self.period.as_ref()
    }

    fn default_period(&self) -> Period {
        Period::OneYear
    }
}

impl SelectorFilterable for DashboardParams {
    fn type_param(&self) -> Option<&String> {
        self.kind.as_ref()
    }
    fn category_param(&self) -> Option<&String> {
        self.category.as_ref()
    }
}

impl Sortable for DashboardParams {
    fn sort_by(&self) -> Option<&String> {
        self.sort.as_ref()
    }
    fn sort_dir(&self) -> Option<&String> {
        self.order.as_ref()
    }
}

impl DashboardParams {
    pub fn to_query(&self) -> AppResult<DashboardQuery> {
        Ok(DashboardQuery {
            period: self.resolve_period(),
            kind: self.resolve_type()?,
            category: self.resolve_category()?,
            sort: self.resolve_sort(),
        })
    }
}

/// Recompute the dashboard for the requested selectors.
///
/// When another refresh for the same user started after this one, its result
/// wins and this request's view is dropped. The response is then the view
/// currently displayed, or this request's own view if the newer refresh has
/// not landed yet.
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<DashboardParams>,
) -> AppResult<Json<DashboardView>> {
    let query = params.to_query()?;
    let controller = state.dashboards.for_user(&user.id);
    let ticket = controller.begin();

    let rows = {
        let conn = state.db.get()?;
        transactions::list_transactions(&conn, &user.id, &TransactionFilter::default())?
    };

    let view = build_view(&rows, &query, today(), &state.config.currency)
        .map_err(AppError::Internal)?;

    if controller.apply(ticket, view.clone()) {
        debug!(
            user_id = %user.id,
            generation = ticket.generation(),
            "Dashboard refreshed"
        );
        return Ok(Json(view));
    }

    let shown = controller.current().map(|shown| shown.as_ref().clone());
    Ok(Json(shown.unwrap_or(view)))
}

/// The view most recently applied for this user.
pub async fn current(
    State(state): State<AppState>,
    user: CurrentUser,
) -> AppResult<Json<DashboardView>> {
    let view = state
        .dashboards
        .for_user(&user.id)
        .current()
        .ok_or_else(|| AppError::NotFound("No dashboard has been computed yet".into()))?;
    Ok(Json(view.as_ref().clone()))
}
