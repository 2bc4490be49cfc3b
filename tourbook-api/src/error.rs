use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tourbook_order::ConfirmError;

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    NotFound(String),
    PaymentRequired(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PaymentRequired(msg) => (StatusCode::PAYMENT_REQUIRED, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<ConfirmError> for AppError {
    fn from(err: ConfirmError) -> Self {
        match &err {
            ConfirmError::InvalidInput(_) | ConfirmError::PricingMismatch { .. } => {
                tracing::warn!("Checkout rejected: {}", err);
                AppError::BadRequest(err.public_message())
            }
            ConfirmError::TourNotFound(_) => {
                tracing::warn!("Checkout rejected: {}", err);
                AppError::NotFound(err.public_message())
            }
            ConfirmError::PaymentDeclined { .. } => {
                tracing::warn!("Checkout rejected: {}", err);
                AppError::PaymentRequired(err.public_message())
            }
            ConfirmError::Catalog(_) | ConfirmError::Persist(_) | ConfirmError::PaymentFailed { .. } => {
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}
