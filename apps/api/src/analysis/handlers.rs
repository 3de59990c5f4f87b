//! Axum route handler for profile analysis.

use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analysis::disc::PersonalityAnalysis;
use crate::analysis::input::{build_analysis_text, AnalysisInput, ProfileData};
use crate::analysis::pipeline::AnalysisSource;
use crate::auth::{resolve_owner, Session};
use crate::errors::{ApiJson, AppError};
use crate::models::profile::{NewProfile, ProfileRow};
use crate::rate_limit::rate_limit_key;
use crate::state::AppState;

const UNKNOWN_NAME: &str = "Unknown";

/// Either raw text or structured profile data; profile data wins when both
/// are present.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub profile: Option<ProfileData>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    /// Must match the verified session when given.
    #[serde(default)]
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    pub profile: ProfileRow,
    pub analysis: PersonalityAnalysis,
    pub source: AnalysisSource,
    pub fallback_used: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Shared by the HTTP endpoint and the extension bridge.
///
/// Order: owner check → rate limit → input validation → provider cascade →
/// upsert. Only the first three can reject; the cascade always produces an
/// analysis.
pub async fn run_analysis(
    state: &AppState,
    session: Option<Uuid>,
    forwarded_for: Option<&str>,
    req: AnalyzeRequest,
) -> Result<AnalyzeResponse, AppError> {
    let owner = resolve_owner(session, req.user_id)?;

    let key = rate_limit_key(session, forwarded_for);
    if !state.rate_limiter.is_allowed(&key).await {
        return Err(AppError::RateLimited);
    }

    let (raw_text, data_sources, profile) = match (req.profile, req.text) {
        (Some(profile), _) => (
            build_analysis_text(&profile),
            vec!["linkedin".to_string()],
            profile,
        ),
        (None, Some(text)) => (text, vec!["manual".to_string()], ProfileData::default()),
        (None, None) => {
            return Err(AppError::Validation(
                "Either text or profile data is required".to_string(),
            ))
        }
    };

    let input = AnalysisInput::new(&raw_text)?;
    let report = state.pipeline.analyze(&input).await;

    let name = non_blank(Some(profile.name))
        .or_else(|| non_blank(req.name))
        .unwrap_or_else(|| UNKNOWN_NAME.to_string());

    let row = state
        .store
        .upsert_profile(
            owner,
            NewProfile {
                name,
                email: non_blank(profile.email).or_else(|| non_blank(req.email)),
                linkedin_url: non_blank(profile.linkedin_url)
                    .or_else(|| non_blank(req.linkedin_url)),
                headline: non_blank(profile.headline),
                data_sources,
                raw_text: input.text().to_string(),
                analysis: report.analysis.clone(),
                analysis_source: report.source.label(),
            },
        )
        .await
        .map_err(AppError::persistence("save profile"))?;

    info!(
        profile_id = %row.id,
        owned = row.user_id.is_some(),
        source = %report.source.label(),
        failed_providers = report.failures.len(),
        "Profile analysed"
    );

    Ok(AnalyzeResponse {
        success: true,
        profile: row,
        fallback_used: report.source == AnalysisSource::Heuristic,
        analysis: report.analysis,
        source: report.source,
    })
}

pub(crate) fn forwarded_for(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
}

/// POST /api/v1/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Session(session): Session,
    headers: HeaderMap,
    ApiJson(req): ApiJson<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let response = run_analysis(&state, session, forwarded_for(&headers), req).await?;
    Ok(Json(response))
}
