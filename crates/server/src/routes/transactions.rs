use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use finch_core::{Money, Transaction};
use finch_rules::AutoCategorizer;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_transactions).post(create_transaction))
}

#[derive(Debug, Deserialize)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    /// Skips the rule engine when given.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
}

async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewTransaction>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    if body.description.trim().is_empty() {
        return Err(ApiError::InvalidInput("description must not be empty".into()));
    }

    let rules = state.rules.read().await;
    let mut store = state.transactions.write().await;
    let tx = store.insert(body.date, &body.description, Money::from_decimal(body.amount));

    match body.category.as_deref() {
        Some(category) => tx.assign_category(category, body.subcategory.as_deref()),
        None => {
            if let Some(hit) = AutoCategorizer::new(&rules).categorize(tx.description()) {
                tx.categorize_if_unset(&hit.category, hit.subcategory.as_deref());
            }
        }
    }
    tracing::info!(transaction_id = %tx.id(), category = ?tx.category(), "transaction added");
    Ok((StatusCode::CREATED, Json(tx.clone())))
}

async fn list_transactions(State(state): State<Arc<AppState>>) -> Json<Vec<Transaction>> {
    Json(state.transactions.read().await.all().to_vec())
}
