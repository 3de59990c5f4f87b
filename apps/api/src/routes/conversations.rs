use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::errors::{ApiJson, AppError};
use crate::models::conversation::NewConversation;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ConversationFilter {
    pub profile_id: Option<Uuid>,
}

/// GET /api/v1/conversations
pub async fn handle_list_conversations(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Query(filter): Query<ConversationFilter>,
) -> Result<Json<Value>, AppError> {
    let conversations = state
        .store
        .list_conversations(user_id, filter.profile_id)
        .await
        .map_err(AppError::persistence("list conversations"))?;
    Ok(Json(json!({ "success": true, "conversations": conversations })))
}

/// POST /api/v1/conversations
pub async fn handle_create_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(req): ApiJson<NewConversation>,
) -> Result<Json<Value>, AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be empty".to_string()));
    }
    // Conversations may only hang off the caller's own profiles.
    state
        .store
        .get_profile(user_id, req.profile_id)
        .await
        .map_err(AppError::persistence("load profile"))?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", req.profile_id)))?;

    let conversation = state
        .store
        .create_conversation(user_id, req)
        .await
        .map_err(AppError::persistence("save conversation"))?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

/// GET /api/v1/conversations/:id
pub async fn handle_get_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let conversation = state
        .store
        .get_conversation(user_id, id)
        .await
        .map_err(AppError::persistence("load conversation"))?
        .ok_or_else(|| AppError::NotFound(format!("Conversation {id} not found")))?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

/// DELETE /api/v1/conversations/:id
pub async fn handle_delete_conversation(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = state
        .store
        .delete_conversation(user_id, id)
        .await
        .map_err(AppError::persistence("delete conversation"))?;
    if !deleted {
        return Err(AppError::NotFound(format!("Conversation {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}
