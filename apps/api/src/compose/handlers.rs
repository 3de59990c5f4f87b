//! Axum route handlers for the communication tools.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::RequireUser;
use crate::compose::generator::{compose, ComposeContext};
use crate::compose::prompts::default_template;
use crate::errors::{ApiJson, AppError};
use crate::models::conversation::{ConversationRow, NewConversation};
use crate::models::prompt::ToolKind;
use crate::state::AppState;

const MAX_CONTEXT_CHARS: usize = 4_000;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeRequest {
    pub profile_id: Uuid,
    pub context: String,
    /// Saved prompt customisation to use instead of the caller's latest one.
    #[serde(default)]
    pub template_id: Option<Uuid>,
    /// Store the draft as a conversation.
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposeResponse {
    pub success: bool,
    pub content: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation: Option<ConversationRow>,
}

fn tool_title(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Message => "Message",
        ToolKind::Email => "Email",
        ToolKind::MeetingPrep => "Meeting prep",
    }
}

/// Resolves the template text: an explicit id, else the caller's most recent
/// customisation for the tool, else the built-in one.
async fn resolve_template(
    state: &AppState,
    user_id: Uuid,
    tool: ToolKind,
    template_id: Option<Uuid>,
) -> Result<String, AppError> {
    if let Some(id) = template_id {
        let row = state
            .store
            .get_prompt_template(user_id, id)
            .await
            .map_err(AppError::persistence("load prompt template"))?
            .ok_or_else(|| AppError::NotFound(format!("Prompt template {id} not found")))?;
        if row.tool_kind() != Some(tool) {
            return Err(AppError::Validation(format!(
                "Prompt template {id} is for '{}', not '{}'",
                row.tool,
                tool.as_str()
            )));
        }
        return Ok(row.template);
    }

    let latest = state
        .store
        .latest_prompt_template(user_id, tool)
        .await
        .map_err(AppError::persistence("load prompt template"))?;
    Ok(latest
        .map(|row| row.template)
        .unwrap_or_else(|| default_template(tool).to_string()))
}

async fn run_compose(
    state: AppState,
    user_id: Uuid,
    tool: ToolKind,
    req: ComposeRequest,
) -> Result<Json<ComposeResponse>, AppError> {
    let context = req.context.trim();
    if context.is_empty() {
        return Err(AppError::Validation("context must not be empty".to_string()));
    }
    if context.chars().count() > MAX_CONTEXT_CHARS {
        return Err(AppError::Validation(format!(
            "context must be at most {MAX_CONTEXT_CHARS} characters"
        )));
    }

    let profile = state
        .store
        .get_profile(user_id, req.profile_id)
        .await
        .map_err(AppError::persistence("load profile"))?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", req.profile_id)))?;

    let template = resolve_template(&state, user_id, tool, req.template_id).await?;

    let ctx = ComposeContext {
        name: &profile.name,
        headline: profile.headline.as_deref(),
        analysis: &profile.analysis.0,
        context,
    };
    let draft = compose(&state.pipeline, tool, &template, &ctx).await;

    let conversation = if req.save {
        let row = state
            .store
            .create_conversation(
                user_id,
                NewConversation {
                    profile_id: profile.id,
                    kind: tool.as_str().to_string(),
                    title: format!("{} for {}", tool_title(tool), profile.name),
                    content: draft.content.clone(),
                },
            )
            .await
            .map_err(AppError::persistence("save conversation"))?;
        Some(row)
    } else {
        None
    };

    Ok(Json(ComposeResponse {
        success: true,
        content: draft.content,
        source: draft.source,
        conversation,
    }))
}

/// POST /api/v1/compose/message
pub async fn handle_compose_message(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(req): ApiJson<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    run_compose(state, user_id, ToolKind::Message, req).await
}

/// POST /api/v1/compose/email
pub async fn handle_compose_email(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(req): ApiJson<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    run_compose(state, user_id, ToolKind::Email, req).await
}

/// POST /api/v1/compose/meeting-prep
pub async fn handle_compose_meeting_prep(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    ApiJson(req): ApiJson<ComposeRequest>,
) -> Result<Json<ComposeResponse>, AppError> {
    run_compose(state, user_id, ToolKind::MeetingPrep, req).await
}
