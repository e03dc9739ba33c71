// SPDX-License-Identifier: MIT
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::config::ServiceConfig;

/// Failures surfaced by the task handlers.
///
/// Validation and not-found are expected caller errors and never logged as
/// server faults. `Internal` carries the generic message shown to the caller;
/// the source detail is logged server-side and echoed in the response body
/// only when the service runs in development mode.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("Task not found")]
    NotFound,
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
        expose_detail: bool,
    },
}

impl ApiError {
    /// Wrap a storage or other unexpected failure with its caller-facing
    /// context message. Detail exposure follows the configured environment.
    pub fn internal(config: &ServiceConfig, message: &'static str, source: anyhow::Error) -> Self {
        ApiError::Internal {
            message,
            source,
            expose_detail: config.environment.expose_error_detail(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Task not found" })),
            )
                .into_response(),
            ApiError::Internal {
                message,
                source,
                expose_detail,
            } => {
                error!(err = %source, "{message}");
                let mut body = json!({ "message": message });
                if expose_detail {
                    body["error"] = json!(source.to_string());
                }
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
