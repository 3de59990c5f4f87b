use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A saved piece of communication (drafted message, email, meeting brief)
/// tied to one profile.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConversation {
    pub profile_id: Uuid,
    pub kind: String,
    pub title: String,
    pub content: String,
}
