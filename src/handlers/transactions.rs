use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::db::queries::transactions::{self, TransactionFilter};
use crate::error::{AppError, AppResult};
use crate::handlers::params::{date_bound, SelectorFilterable};
use crate::models::{NewTransaction, Transaction};
use crate::services::filter::{CategoryFilter, TypeFilter};
use crate::services::projection::TransactionSort;
use crate::sort_utils::Sortable;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct TransactionListParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl Sortable for TransactionListParams {
    fn sort_by(&self) -> Option<&String> {
        self.sort.as_ref()
    }
    fn sort_dir(&self) -> Option<&String> {
        self.order.as_ref()
    }
}

impl SelectorFilterable for TransactionListParams {
    fn type_param(&self) -> Option<&String> {
        self.kind.as_ref()
    }
    fn category_param(&self) -> Option<&String> {
        self.category.as_ref()
    }
}

impl TransactionListParams {
    fn to_filter(&self) -> AppResult<TransactionFilter> {
        let sort: TransactionSort = self.resolve_sort();
        let kind = match self.resolve_type()? {
            TypeFilter::All => None,
            TypeFilter::Only(kind) => Some(kind),
        };
        let category = match self.resolve_category()? {
            CategoryFilter::All => None,
            CategoryFilter::Only(category) => Some(category),
        };

        Ok(TransactionFilter {
            from_date: date_bound("from", self.from.as_ref())?,
            to_date: date_bound("to", self.to.as_ref())?,
            kind,
            category,
            sort_sql: Some(sort.sql_order_by()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<TransactionListParams>,
) -> AppResult<Json<Vec<Transaction>>> {
    let filter = params.to_filter()?;
    let conn = state.db.get()?;
    let list = transactions::list_transactions(&conn, &user.id, &filter)?;
    Ok(Json(list))
}

pub async fn show(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Transaction>> {
    let conn = state.db.get()?;
    let transaction = transactions::get_transaction(&conn, &user.id, &id)?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;
    Ok(Json(transaction))
}

pub async fn create(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<NewTransaction>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let draft = body.validate().map_err(AppError::Validation)?;
    let conn = state.db.get()?;
    let created = transactions::create_transaction(&conn, &user.id, &draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<NewTransaction>,
) -> AppResult<Json<Transaction>> {
    let draft = body.validate().map_err(AppError::Validation)?;
    let conn = state.db.get()?;
    let updated = transactions::update_transaction(&conn, &user.id, &id, &draft)?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let conn = state.db.get()?;
    if !transactions::delete_transaction(&conn, &user.id, &id)? {
        return Err(AppError::NotFound(format!("Transaction {} not found", id)));
    }
    Ok(Json(DeleteResponse { success: true }))
}
