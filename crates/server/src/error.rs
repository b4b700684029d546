use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use finch_core::ValidationError;
use finch_rewards::LedgerError;
use finch_rules::RuleError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rule(#[from] RuleError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Rule(_) | ApiError::InvalidInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Ledger(e) => match e {
                LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                LedgerError::UnknownReward(_) => StatusCode::NOT_FOUND,
                LedgerError::AlreadyReversed(_) | LedgerError::NotReversible(_) => {
                    StatusCode::CONFLICT
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::CONFLICT {
            tracing::warn!(error = %self, "request conflicts with ledger state");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use finch_rewards::RewardId;

    #[test]
    fn statuses_follow_error_kind() {
        assert_eq!(
            ApiError::from(ValidationError::InvalidStreak(-1)).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(RuleError::EmptyField("name")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::InvalidInput("description must not be empty".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::NotFound("rule 3".into()).status(), StatusCode::NOT_FOUND);

        let id = RewardId::new();
        assert_eq!(
            ApiError::from(LedgerError::UnknownReward(id)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(LedgerError::AlreadyReversed(id)).status(),
            StatusCode::CONFLICT
        );
    }
}
