use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Application error taxonomy. Validation errors never reach the gateway,
/// gateway errors carry the remote message verbatim, and a partial sale
/// (history written, inventory row left behind) is its own variant so it can
/// never be mistaken for a plain remote failure.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("sale recorded but phone {phone_id} was not removed from inventory: {message}")]
    PartialSale {
        sale_id: Option<i64>,
        phone_id: i64,
        message: String,
    },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Gateway(GatewayError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
            Self::PartialSale { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Conflict(_) => "conflict",
            Self::NotFound => "not_found",
            Self::Gateway(_) => "gateway",
            Self::PartialSale { .. } => "partial_sale",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });

        if let Self::PartialSale {
            sale_id, phone_id, ..
        } = &self
        {
            body["sale_id"] = json!(sale_id);
            body["phone_id"] = json!(phone_id);
        }

        (self.status(), Json(body)).into_response()
    }
}
