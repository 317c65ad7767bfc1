//! Error types for the IVR gateway

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::provider::ProviderError;

/// Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by the trigger endpoint.
///
/// Menu input problems never show up here: the IVR webhooks always answer
/// with well-formed markup.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            GatewayError::Validation(_) => tracing::info!(error = %self, "Rejected call request"),
            GatewayError::Provider(_) => tracing::error!(error = %self, "Call request failed"),
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
