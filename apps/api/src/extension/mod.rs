//! Server side of the browser extension's message contract.
//!
//! The extension posts `{"action": "<name>", ...}` to a single endpoint and
//! always gets `{success, data | error}` back with HTTP 200, so its message
//! port never has to branch on status codes.

use axum::{body::Bytes, extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use crate::analysis::handlers::{forwarded_for, run_analysis, AnalyzeRequest};
use crate::analysis::input::ProfileData;
use crate::auth::Session;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ExtensionRequest {
    CheckAuth,
    #[serde(rename_all = "camelCase")]
    AnalyzeProfile {
        profile: ProfileData,
        #[serde(default)]
        user_id: Option<Uuid>,
    },
    GetProfiles,
    /// Handled by the content script; the server cannot read the page.
    ExtractProfile,
}

#[derive(Debug, Serialize)]
pub struct ExtensionReply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtensionReply {
    fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

impl From<AppError> for ExtensionReply {
    fn from(err: AppError) -> Self {
        if matches!(err, AppError::Persistence { .. } | AppError::Internal(_)) {
            error!(error = %err, "Extension action failed");
        }
        ExtensionReply::err(err.public_message())
    }
}

async fn dispatch(
    state: &AppState,
    session: Option<Uuid>,
    headers: &HeaderMap,
    request: ExtensionRequest,
) -> Result<Value, AppError> {
    match request {
        ExtensionRequest::CheckAuth => Ok(json!({
            "authenticated": session.is_some(),
            "userId": session,
        })),
        ExtensionRequest::AnalyzeProfile { profile, user_id } => {
            let response = run_analysis(
                state,
                session,
                forwarded_for(headers),
                AnalyzeRequest {
                    profile: Some(profile),
                    user_id,
                    ..AnalyzeRequest::default()
                },
            )
            .await?;
            serde_json::to_value(response)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize analysis: {e}")))
        }
        ExtensionRequest::GetProfiles => {
            let user_id = session
                .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
            let profiles = state
                .store
                .list_profiles(user_id)
                .await
                .map_err(AppError::persistence("list profiles"))?;
            serde_json::to_value(profiles)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profiles: {e}")))
        }
        ExtensionRequest::ExtractProfile => Err(AppError::Validation(
            "extractProfile runs in the page content script".to_string(),
        )),
    }
}

/// POST /api/v1/extension
///
/// Reads the body and session itself so that malformed messages and auth
/// outages still produce an `ExtensionReply`.
pub async fn handle_extension(
    State(state): State<AppState>,
    session: Result<Session, AppError>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<ExtensionReply> {
    let session = match session {
        Ok(Session(session)) => session,
        Err(err) => return Json(err.into()),
    };
    let request = match serde_json::from_slice::<ExtensionRequest>(&body) {
        Ok(request) => request,
        Err(e) => return Json(ExtensionReply::err(format!("Invalid extension message: {e}"))),
    };

    let reply = match dispatch(&state, session, &headers, request).await {
        Ok(data) => ExtensionReply::ok(data),
        Err(err) => err.into(),
    };
    Json(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actions_deserialize() {
        let req: ExtensionRequest = serde_json::from_value(json!({"action": "checkAuth"})).unwrap();
        assert!(matches!(req, ExtensionRequest::CheckAuth));

        let req: ExtensionRequest = serde_json::from_value(json!({
            "action": "analyzeProfile",
            "profile": {"name": "Ada", "skills": ["Math"]},
            "userId": null
        }))
        .unwrap();
        match req {
            ExtensionRequest::AnalyzeProfile { profile, user_id } => {
                assert_eq!(profile.name, "Ada");
                assert!(user_id.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        assert!(serde_json::from_value::<ExtensionRequest>(json!({"action": "deleteAll"})).is_err());
    }

    #[test]
    fn test_reply_from_error_hides_internals() {
        let reply: ExtensionReply = AppError::Internal(anyhow::anyhow!("db password=secret")).into();
        assert!(!reply.success);
        assert_eq!(reply.error.as_deref(), Some("An internal server error occurred"));
    }
}
