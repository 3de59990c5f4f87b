use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Communication tool a prompt customisation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Message,
    Email,
    MeetingPrep,
}

impl ToolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Message => "message",
            ToolKind::Email => "email",
            ToolKind::MeetingPrep => "meeting_prep",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "message" => Some(ToolKind::Message),
            "email" => Some(ToolKind::Email),
            "meeting_prep" => Some(ToolKind::MeetingPrep),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub tool: String,
    pub template: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromptTemplateRow {
    pub fn tool_kind(&self) -> Option<ToolKind> {
        ToolKind::parse(&self.tool)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPromptTemplate {
    pub name: String,
    pub tool: ToolKind,
    pub template: String,
}
