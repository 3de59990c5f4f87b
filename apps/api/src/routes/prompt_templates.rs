use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::errors::{ApiJson, AppError};
use crate::models::prompt::NewPromptTemplate;
use crate::state::AppState;

const MAX_TEMPLATE_CHARS: usize = 8_000;

fn validate(template: &NewPromptTemplate) -> Result<(), AppError> {
    if template.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }
    if template.template.trim().is_empty() {
        return Err(AppError::Validation("template must not be empty".to_string()));
    }
    if template.template.chars().count() > MAX_TEMPLATE_CHARS {
        return Err(AppError::Validation(format!(
            "template must be at most {MAX_TEMPLATE_CHARS} characters"
        )));
    }
    Ok(())
}

/// GET /api/v1/prompts
pub async fn handle_list_prompts(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Value>, AppError> {
    let prompts = state
        .store
        .list_prompt_templates(user_id)
        .await
        .map_err(AppError::persistence("list prompt templates"))?;
    Ok(Json(json!({ "success": true, "prompts": prompts })))
}

/// POST /api/v1/prompts
pub async fn handle_create_prompt(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(req): ApiJson<NewPromptTemplate>,
) -> Result<Json<Value>, AppError> {
    validate(&req)?;
    let prompt = state
        .store
        .create_prompt_template(user_id, req)
        .await
        .map_err(AppError::persistence("save prompt template"))?;
    Ok(Json(json!({ "success": true, "prompt": prompt })))
}

/// GET /api/v1/prompts/:id
pub async fn handle_get_prompt(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prompt = state
        .store
        .get_prompt_template(user_id, id)
        .await
        .map_err(AppError::persistence("load prompt template"))?
        .ok_or_else(|| AppError::NotFound(format!("Prompt template {id} not found")))?;
    Ok(Json(json!({ "success": true, "prompt": prompt })))
}

/// PUT /api/v1/prompts/:id
pub async fn handle_update_prompt(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<NewPromptTemplate>,
) -> Result<Json<Value>, AppError> {
    validate(&req)?;
    let prompt = state
        .store
        .update_prompt_template(user_id, id, req)
        .await
        .map_err(AppError::persistence("update prompt template"))?
        .ok_or_else(|| AppError::NotFound(format!("Prompt template {id} not found")))?;
    Ok(Json(json!({ "success": true, "prompt": prompt })))
}

/// DELETE /api/v1/prompts/:id
pub async fn handle_delete_prompt(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let deleted = state
        .store
        .delete_prompt_template(user_id, id)
        .await
        .map_err(AppError::persistence("delete prompt template"))?;
    if !deleted {
        return Err(AppError::NotFound(format!("Prompt template {id} not found")));
    }
    Ok(Json(json!({ "success": true })))
}
