//! Input normalisation: profile data → analysis text, and the length/markup
//! gate every text passes before any provider is called.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_INPUT_CHARS: usize = 10;
pub const MAX_INPUT_CHARS: usize = 10_000;

/// Below this length the assembled profile text is replaced by a generic sentence.
const FALLBACK_THRESHOLD_CHARS: usize = 50;
const MAX_EXPERIENCE_ENTRIES: usize = 3;
const MAX_SKILLS: usize = 10;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("Text is too short: {actual} characters (minimum {})", MIN_INPUT_CHARS)]
    TooShort { actual: usize },

    #[error("Text is too long: {actual} characters (maximum {})", MAX_INPUT_CHARS)]
    TooLong { actual: usize },

    #[error("Text contains script or markup content")]
    Markup,
}

fn markup_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?i)<\s*/?\s*(script|iframe|object|embed|style)\b|javascript\s*:|vbscript\s*:|data\s*:\s*text/html|\bon[a-z]+\s*="#,
        )
        .expect("markup pattern is a valid regex")
    })
}

/// Sanitised, length-checked text ready for analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisInput {
    text: String,
}

impl AnalysisInput {
    pub fn new(raw: &str) -> Result<Self, InputError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
            .collect();
        let text = cleaned.trim();

        let len = text.chars().count();
        if len < MIN_INPUT_CHARS {
            return Err(InputError::TooShort { actual: len });
        }
        if len > MAX_INPUT_CHARS {
            return Err(InputError::TooLong { actual: len });
        }
        if markup_pattern().is_match(text) {
            return Err(InputError::Markup);
        }

        Ok(Self {
            text: text.to_string(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// One experience entry as sent by the extension: either a preformatted line
/// or the structured fields scraped from the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExperienceItem {
    Text(String),
    Detailed {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        company: Option<String>,
        #[serde(default)]
        duration: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

impl ExperienceItem {
    fn render(&self) -> Option<String> {
        match self {
            ExperienceItem::Text(text) => non_blank(Some(text)).map(str::to_string),
            ExperienceItem::Detailed {
                title,
                company,
                duration,
                description,
            } => {
                let mut line = match (non_blank(title.as_ref()), non_blank(company.as_ref())) {
                    (Some(t), Some(c)) => format!("{t} at {c}"),
                    (Some(t), None) => t.to_string(),
                    (None, Some(c)) => c.to_string(),
                    (None, None) => String::new(),
                };
                if let Some(d) = non_blank(duration.as_ref()) {
                    line.push_str(&format!(" ({d})"));
                }
                if let Some(desc) = non_blank(description.as_ref()) {
                    if line.is_empty() {
                        line = desc.to_string();
                    } else {
                        line.push_str(&format!(": {desc}"));
                    }
                }
                let line = line.trim().to_string();
                (!line.is_empty()).then_some(line)
            }
        }
    }
}

/// Structured profile data from the extension or the dashboard form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

/// Concatenates the present profile fields into one labelled text blob.
///
/// Experience is cut to the first 3 entries and skills to the first 10.
/// When the result is shorter than 50 characters a generic sentence
/// naming the person is returned instead. Never fails.
pub fn build_analysis_text(profile: &ProfileData) -> String {
    let mut sections = Vec::new();
    let name = profile.name.trim();

    if !name.is_empty() {
        sections.push(format!("Name: {name}"));
    }
    if let Some(headline) = non_blank(profile.headline.as_ref()) {
        sections.push(format!("Headline: {headline}"));
    }
    if let Some(about) = non_blank(profile.about.as_ref()) {
        sections.push(format!("About: {about}"));
    }

    let experience: Vec<String> = profile
        .experience
        .iter()
        .take(MAX_EXPERIENCE_ENTRIES)
        .filter_map(ExperienceItem::render)
        .map(|line| format!("- {line}"))
        .collect();
    if !experience.is_empty() {
        sections.push(format!("Experience:\n{}", experience.join("\n")));
    }

    let skills: Vec<&str> = profile
        .skills
        .iter()
        .take(MAX_SKILLS)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if !skills.is_empty() {
        sections.push(format!("Skills: {}", skills.join(", ")));
    }

    let text = sections.join("\n\n");
    if text.chars().count() < FALLBACK_THRESHOLD_CHARS {
        return fallback_sentence(name);
    }
    text
}

fn fallback_sentence(name: &str) -> String {
    let subject = if name.is_empty() { "this person" } else { name };
    format!(
        "Professional profile for {subject}. Limited public information is available, \
         so the analysis relies on general professional communication patterns."
    )
}
