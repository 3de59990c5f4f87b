use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::disc::PersonalityAnalysis;

/// A persisted profile. `user_id` is `None` for rows written through the
/// extension ingestion path until a user claims them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub headline: Option<String>,
    pub data_sources: Vec<String>,
    pub raw_text: String,
    pub analysis: Json<PersonalityAnalysis>,
    pub analysis_source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to write one profile row.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub name: String,
    pub email: Option<String>,
    pub linkedin_url: Option<String>,
    pub headline: Option<String>,
    pub data_sources: Vec<String>,
    pub raw_text: String,
    pub analysis: PersonalityAnalysis,
    pub analysis_source: String,
}
