//! Response normalizer: raw provider JSON → canonical `PersonalityAnalysis`.
//!
//! Missing lists become empty, missing scores and confidence become 0.
//! A missing or unknown `primary_type` is rejected so the pipeline moves on
//! to the next provider instead of storing garbage.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::disc::{
    CommunicationTips, DiscScores, DiscType, Insights, PersonalityAnalysis,
};

#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("response is not a JSON object")]
    NotAnObject,

    #[error("primary_type is missing")]
    MissingPrimaryType,

    #[error("primary_type {0:?} is not one of D, I, S, C")]
    InvalidPrimaryType(String),
}

pub fn normalize_analysis(raw: &Value) -> Result<PersonalityAnalysis, SchemaError> {
    let obj = raw.as_object().ok_or(SchemaError::NotAnObject)?;

    let disc_type = match obj.get("primary_type") {
        None | Some(Value::Null) => return Err(SchemaError::MissingPrimaryType),
        Some(Value::String(s)) => {
            DiscType::parse(s).ok_or_else(|| SchemaError::InvalidPrimaryType(s.clone()))?
        }
        Some(other) => return Err(SchemaError::InvalidPrimaryType(other.to_string())),
    };

    let mut disc_scores = DiscScores::default();
    if let Some(scores) = obj.get("disc_scores").and_then(Value::as_object) {
        for axis in DiscType::ALL {
            let value = scores
                .get(axis.as_str())
                .or_else(|| scores.get(&axis.as_str().to_ascii_lowercase()));
            disc_scores.set(axis, unit_score(value));
        }
    }

    Ok(PersonalityAnalysis {
        disc_type,
        disc_scores,
        confidence_score: unit_score(obj.get("confidence_score")),
        insights: Insights {
            strengths: string_list(obj, "strengths"),
            challenges: string_list(obj, "challenges"),
            motivators: string_list(obj, "motivators"),
        },
        communication_tips: CommunicationTips {
            dos: string_list(obj, "communication_dos"),
            donts: string_list(obj, "communication_donts"),
        },
    })
}

/// Reads a score into [0, 1]. Values above 1 are read as percentages.
/// Anything non-numeric is 0.
fn unit_score(value: Option<&Value>) -> f64 {
    let number = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => {
            let n = if n > 1.0 { n / 100.0 } else { n };
            n.clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
