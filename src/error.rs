//! Error handling for the application

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::booking::availability::ExistingReservation;
use crate::booking::calculators::{PricingError, StayPolicyError};
use crate::booking::responses::{ConflictResponse, ErrorResponse};

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    /// Requested dates overlap blocking reservations
    #[error("{message}")]
    Conflict {
        message: String,
        conflicts: Vec<ExistingReservation>,
    },

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    StayPolicy(#[from] StayPolicyError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            AppError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            AppError::Conflict { .. } => (StatusCode::CONFLICT, "dates_unavailable"),
            AppError::Pricing(PricingError::InvalidRange { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_range")
            }
            AppError::Pricing(PricingError::InvalidRate { .. }) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_rate")
            }
            AppError::Pricing(PricingError::AmountOverflow) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "amount_overflow")
            }
            AppError::StayPolicy(_) => (StatusCode::UNPROCESSABLE_ENTITY, "minimum_stay"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        // Server-side details stay in the logs
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal error".to_string()
            }
            other => {
                tracing::debug!("Request rejected: {}", other);
                other.to_string()
            }
        };

        let details = match &self {
            AppError::Conflict { conflicts, .. } => {
                let conflicts: Vec<ConflictResponse> = conflicts.iter().map(ConflictResponse::from).collect();
                Some(serde_json::json!({ "conflicts": conflicts }))
            }
            _ => None,
        };

        let body = ErrorResponse {
            error_type: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
