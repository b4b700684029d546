use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use finch_rewards::{
    bill_amount_from_f64, monthly_goal, project_tiers, resolve, tiers, BillPayment, MonthlyBreakdown,
    MonthlyGoal, PaymentEvent, PointsAward, PointsBreakdown, RewardId, RewardRecord, TierBand,
    TierProjection, TierStatus,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_PROJECTION_MONTHS: u32 = 120;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_rewards).post(record_reward))
        .route("/calculate-points", post(calculate_points))
        .route("/tiers", get(list_tiers))
        .route("/tier", get(tier_for_points))
        .route("/summary", get(summary))
        .route("/projection", get(projection))
        .route("/{id}/reverse", post(reverse_reward))
}

fn default_on_time() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PointsRequest {
    pub bill_amount: f64,
    pub category: String,
    #[serde(default = "default_on_time")]
    pub on_time_payment: bool,
    #[serde(default)]
    pub streak_days: i64,
}

impl PointsRequest {
    fn event(&self) -> ApiResult<PaymentEvent> {
        Ok(PaymentEvent::new(
            bill_amount_from_f64(self.bill_amount)?,
            self.category.as_str(),
            self.on_time_payment,
            self.streak_days,
        ))
    }
}

async fn calculate_points(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PointsRequest>,
) -> ApiResult<Json<PointsAward>> {
    let award = state.calculator.calculate(&body.event()?)?;
    Ok(Json(award))
}

async fn list_tiers() -> Json<&'static [TierBand]> {
    Json(tiers())
}

#[derive(Debug, Deserialize)]
pub struct TierQuery {
    pub points: u64,
}

async fn tier_for_points(Query(query): Query<TierQuery>) -> Json<TierStatus> {
    Json(resolve(query.points))
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    #[serde(flatten)]
    pub points: PointsRequest,
    #[serde(default)]
    pub bill_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RecordResponse {
    pub reward: RewardRecord,
    pub breakdown: PointsBreakdown,
    pub total_points: u64,
}

async fn record_reward(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordRequest>,
) -> ApiResult<(StatusCode, Json<RecordResponse>)> {
    let payment = BillPayment {
        bill_id: body.bill_id,
        event: body.points.event()?,
        description: body.description,
        paid_at: body.paid_at.unwrap_or_else(Utc::now),
    };

    let mut ledger = state.ledger.lock().await;
    let (reward, breakdown) = ledger.record(&state.calculator, payment)?;
    let reward = reward.clone();
    let total_points = ledger.total_points();
    tracing::info!(reward_id = %reward.id(), points = reward.points(), total_points, "reward earned");
    Ok((
        StatusCode::CREATED,
        Json(RecordResponse { reward, breakdown, total_points }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct ReverseRequest {
    pub reason: String,
}

async fn reverse_reward(
    State(state): State<Arc<AppState>>,
    Path(id): Path<RewardId>,
    Json(body): Json<ReverseRequest>,
) -> ApiResult<(StatusCode, Json<RewardRecord>)> {
    if body.reason.trim().is_empty() {
        return Err(ApiError::InvalidInput("reason must not be empty".into()));
    }
    let mut ledger = state.ledger.lock().await;
    let reversal = ledger.compensate(id, &body.reason, Utc::now())?.clone();
    tracing::info!(reward_id = %id, points = reversal.points(), "reward reversed");
    Ok((StatusCode::CREATED, Json(reversal)))
}

async fn list_rewards(State(state): State<Arc<AppState>>) -> Json<Vec<RewardRecord>> {
    Json(state.ledger.lock().await.records().to_vec())
}

#[derive(Debug, Serialize)]
pub struct RewardSummary {
    pub total_points: u64,
    pub tier: TierStatus,
    pub monthly_breakdown: Vec<MonthlyBreakdown>,
    pub goal: MonthlyGoal,
}

async fn summary(State(state): State<Arc<AppState>>) -> Json<RewardSummary> {
    let ledger = state.ledger.lock().await;
    let monthly_breakdown = ledger.monthly_breakdown();
    let history: Vec<i64> = monthly_breakdown.iter().map(|m| m.total_points).collect();
    Json(RewardSummary {
        total_points: ledger.total_points(),
        tier: ledger.tier_status(),
        goal: monthly_goal(&history),
        monthly_breakdown,
    })
}

#[derive(Debug, Deserialize)]
pub struct ProjectionQuery {
    pub monthly_rate: f64,
    #[serde(default = "default_projection_months")]
    pub months: u32,
}

fn default_projection_months() -> u32 {
    12
}

async fn projection(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectionQuery>,
) -> ApiResult<Json<Vec<TierProjection>>> {
    if query.months == 0 || query.months > MAX_PROJECTION_MONTHS {
        return Err(ApiError::InvalidInput(format!(
            "months must be between 1 and {MAX_PROJECTION_MONTHS}"
        )));
    }
    let current = state.ledger.lock().await.total_points();
    Ok(Json(project_tiers(current, query.monthly_rate, query.months)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{app, send};

    #[tokio::test]
    async fn calculate_points_matches_the_formula() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/rewards/calculate-points",
            Some(json!({ "bill_amount": 100.0, "category": "credit_card", "on_time_payment": true, "streak_days": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["points"], 2700);
        assert_eq!(body["breakdown"]["category_multiplier"], "1.5");
        assert_eq!(body["breakdown"]["streak_multiplier"], "1.2");

        let (_, late) = send(
            &app,
            Method::POST,
            "/rewards/calculate-points",
            Some(json!({ "bill_amount": 50, "category": "utilities", "on_time_payment": false })),
        )
        .await;
        assert_eq!(late["points"], 500);
    }

    #[tokio::test]
    async fn non_positive_amount_is_unprocessable() {
        let (app, _) = app();
        let (status, body) = send(
            &app,
            Method::POST,
            "/rewards/calculate-points",
            Some(json!({ "bill_amount": 0, "category": "rent" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn tiers_and_tier_lookup() {
        let (app, _) = app();
        let (_, ladder) = send(&app, Method::GET, "/rewards/tiers", None).await;
        assert_eq!(ladder.as_array().unwrap().len(), 5);
        assert_eq!(ladder[4]["tier"], "diamond");

        let (_, status) = send(&app, Method::GET, "/rewards/tier?points=500", None).await;
        assert_eq!(status["tier"], "silver");
        assert_eq!(status["next_tier"], "gold");
        assert_eq!(status["points_to_next"], 1500);
    }

    #[tokio::test]
    async fn earn_then_reverse_updates_summary() {
        let (app, _) = app();
        let (status, earned) = send(
            &app,
            Method::POST,
            "/rewards",
            Some(json!({
                "bill_amount": 100,
                "category": "credit_card",
                "streak_days": 10,
                "bill_id": 7,
                "paid_at": "2024-03-05T10:00:00Z"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(earned["reward"]["points"], 2700);
        assert_eq!(earned["reward"]["kind"], "earned");
        assert_eq!(earned["total_points"], 2700);

        let (_, summary) = send(&app, Method::GET, "/rewards/summary", None).await;
        assert_eq!(summary["tier"]["tier"], "gold");
        assert_eq!(summary["monthly_breakdown"][0]["month"], "2024-03");

        let id = earned["reward"]["id"].as_str().unwrap().to_string();
        let uri = format!("/rewards/{id}/reverse");
        let (status, reversal) =
            send(&app, Method::POST, &uri, Some(json!({ "reason": "payment bounced" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reversal["points"], -2700);
        assert_eq!(reversal["kind"], "compensation");
        assert_eq!(reversal["reverses"], id.as_str());

        let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "reason": "again" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, summary) = send(&app, Method::GET, "/rewards/summary", None).await;
        assert_eq!(summary["total_points"], 0);
        assert_eq!(summary["tier"]["tier"], "bronze");

        let (_, records) = send(&app, Method::GET, "/rewards", None).await;
        assert_eq!(records.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn reversing_unknown_reward_is_404() {
        let (app, _) = app();
        let (status, _) = send(
            &app,
            Method::POST,
            "/rewards/00000000-0000-4000-8000-000000000000/reverse",
            Some(json!({ "reason": "?" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn projection_uses_ledger_total() {
        let (app, _) = app();
        let (status, months) =
            send(&app, Method::GET, "/rewards/projection?monthly_rate=500&months=4", None).await;
        assert_eq!(status, StatusCode::OK);
        let months = months.as_array().unwrap();
        assert_eq!(months.len(), 4);
        assert_eq!(months[0]["projected_tier"], "silver");
        assert_eq!(months[3]["projected_points"], 2000);
        assert_eq!(months[3]["projected_tier"], "gold");

        let (status, _) =
            send(&app, Method::GET, "/rewards/projection?monthly_rate=500&months=0", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
