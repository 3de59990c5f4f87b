pub mod conversations;
pub mod health;
pub mod profiles;
pub mod prompt_templates;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::compose::handlers::{
    handle_compose_email, handle_compose_meeting_prep, handle_compose_message,
};
use crate::extension::handle_extension;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Analysis
        .route("/api/v1/analyze", post(handle_analyze))
        // Profile library
        .route("/api/v1/profiles", get(profiles::handle_list_profiles))
        .route(
            "/api/v1/profiles/:id",
            get(profiles::handle_get_profile).delete(profiles::handle_delete_profile),
        )
        .route(
            "/api/v1/profiles/:id/claim",
            post(profiles::handle_claim_profile),
        )
        // Saved conversations
        .route(
            "/api/v1/conversations",
            get(conversations::handle_list_conversations)
                .post(conversations::handle_create_conversation),
        )
        .route(
            "/api/v1/conversations/:id",
            get(conversations::handle_get_conversation)
                .delete(conversations::handle_delete_conversation),
        )
        // Prompt customisations
        .route(
            "/api/v1/prompts",
            get(prompt_templates::handle_list_prompts).post(prompt_templates::handle_create_prompt),
        )
        .route(
            "/api/v1/prompts/:id",
            get(prompt_templates::handle_get_prompt)
                .put(prompt_templates::handle_update_prompt)
                .delete(prompt_templates::handle_delete_prompt),
        )
        // Communication tools
        .route("/api/v1/compose/message", post(handle_compose_message))
        .route("/api/v1/compose/email", post(handle_compose_email))
        .route(
            "/api/v1/compose/meeting-prep",
            post(handle_compose_meeting_prep),
        )
        // Browser extension bridge
        .route("/api/v1/extension", post(handle_extension))
        .with_state(state)
}
