use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use chrono::{Datelike, NaiveDate};
use finch_core::{DateRange, Transaction, TransactionId};
use finch_rules::{
    category_statistics, recommended, suggest, AutoCategorizeReport, AutoCategorizer, CategoryReport,
    NewRule, RankedSuggestion, Rule, RuleId, TransactionSelection,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rules", get(list_rules).post(create_rule))
        .route("/rules/{id}", delete(delete_rule))
        .route("/rules/{id}/active", put(set_rule_active))
        .route("/suggestions", get(suggestions))
        .route("/auto-categorize", post(auto_categorize))
        .route("/transactions/{id}/category", put(update_transaction_category))
        .route("/stats", get(stats))
}

async fn create_rule(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewRule>,
) -> ApiResult<(StatusCode, Json<Rule>)> {
    let mut rules = state.rules.write().await;
    let rule = rules.insert(body)?;
    tracing::info!(rule_id = %rule.id(), pattern_type = %rule.pattern_type(), "rule created");
    Ok((StatusCode::CREATED, Json(rule.clone())))
}

async fn list_rules(State(state): State<Arc<AppState>>) -> Json<Vec<Rule>> {
    Json(state.rules.read().await.iter().cloned().collect())
}

async fn delete_rule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<StatusCode> {
    match state.rules.write().await.remove(RuleId(id)) {
        Some(_) => {
            tracing::info!(rule_id = id, "rule deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(ApiError::NotFound(format!("Rule {id}"))),
    }
}

#[derive(Debug, Deserialize)]
pub struct ActiveFlag {
    pub is_active: bool,
}

async fn set_rule_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(body): Json<ActiveFlag>,
) -> ApiResult<Json<Rule>> {
    let mut rules = state.rules.write().await;
    if !rules.set_active(RuleId(id), body.is_active) {
        return Err(ApiError::NotFound(format!("Rule {id}")));
    }
    rules
        .get(RuleId(id))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Rule {id}")))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub description: String,
    pub suggestions: Vec<RankedSuggestion>,
    pub recommended: Option<RankedSuggestion>,
}

async fn suggestions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SuggestionQuery>,
) -> ApiResult<Json<SuggestionResponse>> {
    if query.description.is_empty() {
        return Err(ApiError::InvalidInput("description must not be empty".into()));
    }
    let ranked = suggest(&query.description, &*state.rules.read().await);
    let best = recommended(&ranked).cloned();
    Ok(Json(SuggestionResponse {
        description: query.description,
        suggestions: ranked,
        recommended: best,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct AutoCategorizeRequest {
    #[serde(default)]
    pub transaction_ids: Option<Vec<i64>>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl AutoCategorizeRequest {
    /// Explicit ids take precedence over a date window.
    fn selection(&self) -> ApiResult<TransactionSelection> {
        if let Some(ids) = self.transaction_ids.as_ref().filter(|ids| !ids.is_empty()) {
            let ids: BTreeSet<TransactionId> = ids.iter().copied().map(TransactionId).collect();
            return Ok(TransactionSelection::Ids(ids));
        }
        if self.start_date.is_none() && self.end_date.is_none() {
            return Ok(TransactionSelection::All);
        }
        Ok(TransactionSelection::Dates(DateRange::from_bounds(
            self.start_date,
            self.end_date,
        )?))
    }
}

async fn auto_categorize(
    State(state): State<Arc<AppState>>,
    body: Option<Json<AutoCategorizeRequest>>,
) -> ApiResult<Json<AutoCategorizeReport>> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let selection = request.selection()?;

    let rules = state.rules.read().await;
    // Held for the whole run so overlapping runs cannot write the same transaction twice.
    let mut store = state.transactions.write().await;
    let report = AutoCategorizer::new(&rules).run_selected(store.all_mut(), &selection);
    tracing::info!(
        categorized = report.categorized_count,
        uncategorized = report.uncategorized_count,
        "auto-categorize finished"
    );
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct CategoryUpdate {
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
}

async fn update_transaction_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<CategoryUpdate>,
) -> ApiResult<Json<Transaction>> {
    if body.category.trim().is_empty() {
        return Err(ApiError::InvalidInput("category must not be empty".into()));
    }
    let mut store = state.transactions.write().await;
    let tx = store
        .get_mut(TransactionId(id))
        .ok_or_else(|| ApiError::NotFound(format!("Transaction {id}")))?;
    tx.assign_category(&body.category, body.subcategory.as_deref());
    tracing::info!(transaction_id = id, category = %body.category, "category set manually");
    Ok(Json(tx.clone()))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<CategoryReport>> {
    if let Some(month) = query.month {
        if !(1..=12).contains(&month) {
            return Err(ApiError::InvalidInput(format!("month {month} is not in 1..=12")));
        }
    }
    let store = state.transactions.read().await;
    let report = category_statistics(store.all().iter().filter(|tx| {
        query.month.map_or(true, |m| tx.date().month() == m)
            && query.year.map_or(true, |y| tx.date().year() == y)
    }));
    Ok(Json(report))
}
