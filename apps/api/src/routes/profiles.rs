use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::errors::AppError;
use crate::models::profile::ProfileRow;
use crate::store::ClaimOutcome;
use crate::state::AppState;

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Value>, AppError> {
    let profiles = state
        .store
        .list_profiles(user_id)
        .await
        .map_err(AppError::persistence("list profiles"))?;
    Ok(Json(json!({ "success": true, "profiles": profiles })))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let profile = find_profile(&state, user_id, id).await?;
    Ok(Json(json!({ "success": true, "profile": profile })))
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = state
        .store
        .delete_profile(user_id, id)
        .await
        .map_err(AppError::persistence("delete profile"))?;
    if !deleted {
        return Err(AppError::NotFound(format!("Profile {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}

/// POST /api/v1/profiles/:id/claim
/// Attaches a profile saved by the anonymous extension path to the caller.
pub async fn handle_claim_profile(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    match state
        .store
        .claim_profile(user_id, id)
        .await
        .map_err(AppError::persistence("claim profile"))?
    {
        ClaimOutcome::Claimed(profile) => Ok(Json(json!({ "success": true, "profile": profile }))),
        ClaimOutcome::NotFound => Err(AppError::NotFound(format!("Profile {id} not found"))),
        ClaimOutcome::AlreadyOwned => Err(AppError::Forbidden(
            "Profile already belongs to a user".to_string(),
        )),
    }
}

async fn find_profile(state: &AppState, user_id: Uuid, id: Uuid) -> Result<ProfileRow, AppError> {
    state
        .store
        .get_profile(user_id, id)
        .await
        .map_err(AppError::persistence("load profile"))?
        .ok_or_else(|| AppError::NotFound(format!("Profile {id} not found")))
}
