//! Draft generation for the communication tools.
//!
//! Flow: fill template → provider cascade → on total failure, a template
//! draft assembled locally from the DISC tips. A draft is always returned.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::disc::{profile_for, DiscType, PersonalityAnalysis};
use crate::analysis::pipeline::AnalysisPipeline;
use crate::llm_client::prompts::COMMUNICATION_SYSTEM;
use crate::llm_client::CompletionRequest;
use crate::models::prompt::ToolKind;

const COMPOSE_TEMPERATURE: f32 = 0.7;
const TEMPLATE_SOURCE: &str = "template";

/// Everything a template can refer to.
#[derive(Debug, Clone, Copy)]
pub struct ComposeContext<'a> {
    pub name: &'a str,
    pub headline: Option<&'a str>,
    pub analysis: &'a PersonalityAnalysis,
    pub context: &'a str,
}

impl ComposeContext<'_> {
    fn dos(&self) -> Vec<String> {
        let dos = &self.analysis.communication_tips.dos;
        if dos.is_empty() {
            profile_for(self.analysis.disc_type).communication_tips().dos
        } else {
            dos.clone()
        }
    }

    fn donts(&self) -> Vec<String> {
        let donts = &self.analysis.communication_tips.donts;
        if donts.is_empty() {
            profile_for(self.analysis.disc_type).communication_tips().donts
        } else {
            donts.clone()
        }
    }

    fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(self.name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Draft {
    pub content: String,
    /// Provider name, or "template" for the local fallback.
    pub source: String,
}

fn max_tokens(tool: ToolKind) -> u32 {
    match tool {
        ToolKind::Message => 400,
        ToolKind::Email => 700,
        ToolKind::MeetingPrep => 1000,
    }
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is a valid regex"))
}

/// Substitutes the known placeholders in a single pass, so substituted values
/// are never expanded again. Unknown `{...}` tokens are left as-is.
pub fn fill_template(template: &str, ctx: &ComposeContext<'_>) -> String {
    let disc_type = ctx.analysis.disc_type;
    placeholder_pattern()
        .replace_all(template, |caps: &Captures<'_>| match &caps[1] {
            "name" => ctx.name.to_string(),
            "disc_type" => disc_type.as_str().to_string(),
            "disc_label" => disc_type.label().to_string(),
            "headline" => ctx.headline.unwrap_or("no headline").to_string(),
            "context" => ctx.context.to_string(),
            "dos" => bullet_list(&ctx.dos()),
            "donts" => bullet_list(&ctx.donts()),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Runs the filled template through the provider cascade.
pub async fn compose(
    pipeline: &AnalysisPipeline,
    tool: ToolKind,
    template: &str,
    ctx: &ComposeContext<'_>,
) -> Draft {
    let prompt = fill_template(template, ctx);
    let request = CompletionRequest {
        system: COMMUNICATION_SYSTEM,
        prompt: &prompt,
        max_tokens: max_tokens(tool),
        temperature: COMPOSE_TEMPERATURE,
        json_output: false,
    };

    match pipeline.complete_text(request).await {
        Ok((content, provider)) if !content.is_empty() => {
            info!(tool = tool.as_str(), provider = %provider, "Draft produced by provider");
            Draft {
                content,
                source: provider,
            }
        }
        Ok(_) => {
            warn!(tool = tool.as_str(), "Provider returned an empty draft, using template");
            template_draft(tool, ctx)
        }
        Err(failures) => {
            warn!(
                tool = tool.as_str(),
                failed = failures.len(),
                "All providers failed, using template draft"
            );
            template_draft(tool, ctx)
        }
    }
}

fn opening_line(disc_type: DiscType) -> &'static str {
    match disc_type {
        DiscType::D => "I'll keep this brief.",
        DiscType::I => "Hope you're having a great week!",
        DiscType::S => "I hope things are going well for you and the team.",
        DiscType::C => "I wanted to share some details with you.",
    }
}

fn closing_line(disc_type: DiscType) -> &'static str {
    match disc_type {
        DiscType::D => "Let me know your decision.",
        DiscType::I => "Would love to hear your thoughts!",
        DiscType::S => "No rush. Happy to talk it through whenever suits you.",
        DiscType::C => "Happy to send any supporting data you'd like to review.",
    }
}

/// Deterministic draft used when no provider answered.
pub fn template_draft(tool: ToolKind, ctx: &ComposeContext<'_>) -> Draft {
    let disc_type = ctx.analysis.disc_type;
    let context = ctx.context.trim();

    let content = match tool {
        ToolKind::Message => format!(
            "Hi {},\n\n{}\n\n{}\n\n{}",
            ctx.first_name(),
            opening_line(disc_type),
            context,
            closing_line(disc_type)
        ),
        ToolKind::Email => {
            let subject: String = context
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(60)
                .collect();
            format!(
                "Subject: {}\n\nHi {},\n\n{}\n\n{}\n\n{}\n\nBest regards",
                subject,
                ctx.first_name(),
                opening_line(disc_type),
                context,
                closing_line(disc_type)
            )
        }
        ToolKind::MeetingPrep => format!(
            "Meeting brief: {} ({} / {})\n\nStyle: {}\n\nContext:\n{}\n\nDo:\n{}\n\nAvoid:\n{}",
            ctx.name,
            disc_type.as_str(),
            disc_type.label(),
            profile_for(disc_type).summary,
            context,
            bullet_list(&ctx.dos()),
            bullet_list(&ctx.donts())
        ),
    };

    Draft {
        content,
        source: TEMPLATE_SOURCE.to_string(),
    }
}
