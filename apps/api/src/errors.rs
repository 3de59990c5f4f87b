use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

use crate::analysis::input::InputError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Provider failures never appear here: the analysis pipeline recovers them
/// internally and always yields an analysis.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Failed to {action}: {source}")]
    Persistence {
        action: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Builds a `map_err` adapter that tags a datastore error with the
    /// operation that failed. Only the action reaches the client.
    pub fn persistence(action: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
        move |source| AppError::Persistence { action, source }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::RateLimited => "RATE_LIMITED",
            AppError::Persistence { .. } => "PERSISTENCE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
            AppError::Unauthorized(msg) | AppError::Forbidden(msg) => msg.clone(),
            AppError::RateLimited => "Too many attempts. Please try again later.".to_string(),
            AppError::Persistence { action, .. } => format!("Failed to {action}"),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Persistence { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `axum::Json` whose rejections use the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl From<InputError> for AppError {
    fn from(err: InputError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Persistence { action, source } => {
                tracing::error!("Persistence error while trying to {action}: {source}");
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized request: {msg}");
            }
            _ => {}
        }

        let body = Json(json!({
            "error": self.public_message(),
            "code": self.code(),
            "timestamp": Utc::now().to_rfc3339(),
        }));

        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_message_hides_datastore_details() {
        let err = AppError::persistence("create profile")(sqlx::Error::RowNotFound);
        assert_eq!(err.public_message(), "Failed to create profile");
        assert_eq!(err.code(), "PERSISTENCE_ERROR");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_input_error_maps_to_validation() {
        let err: AppError = InputError::Markup.into();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_json_rejection_maps_to_validation() {
        use axum::body::Body;
        use axum::http::Request;

        #[derive(Debug, serde::Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            text: String,
        }

        let req = Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": 5}"#))
            .unwrap();
        let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let response = AppError::NotFound("Profile missing".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Profile missing");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["timestamp"].is_string());
    }
}
