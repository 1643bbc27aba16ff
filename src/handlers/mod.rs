pub mod api;
pub mod dashboard;
pub mod params;
pub mod transactions;

use axum::response::Json;
use axum::routing::get;
use axum::Router;
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::state::AppState;
use crate::VERSION;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // Transaction CRUD
        .route(
            "/api/transactions",
            get(transactions::index).post(transactions::create),
        )
        .route(
            "/api/transactions/:id",
            get(transactions::show)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        // Dashboard
        .route("/api/dashboard", get(dashboard::index))
        .route("/api/dashboard/current", get(dashboard::current))
        // Analytics
        .route("/api/analytics/totals", get(api::totals))
        .route("/api/analytics/categories", get(api::categories))
        .route("/api/analytics/daily", get(api::daily))
        .route("/api/analytics/monthly", get(api::monthly))
        .route("/api/categories", get(api::category_list))
        .route("/api/periods", get(api::period_list))
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub user: String,
}

async fn index(user: CurrentUser) -> Json<IndexResponse> {
    Json(IndexResponse {
        name: "pocketledger",
        version: VERSION,
        user: user.id,
    })
}

async fn health() -> &'static str {
    "OK"
}
