use thiserror::Error;

/// Input rejected before any computation runs. Never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid amount: {0} (must be a finite value greater than zero)")]
    InvalidAmount(String),
    #[error("Invalid streak: {0} days (must not be negative)")]
    InvalidStreak(i64),
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidDateRange { start: String, end: String },
}
