// Built-in prompt templates for the communication tools.
// Placeholders: {name} {disc_type} {disc_label} {headline} {context} {dos} {donts}.
// Users may replace these with their own saved templates.

use crate::models::prompt::ToolKind;

pub const MESSAGE_TEMPLATE: &str = r#"Write a short direct message to {name} ({headline}).
Their DISC style is {disc_type} ({disc_label}).

WHAT I WANT TO SAY:
{context}

ADAPT TO THEIR STYLE:
Do:
{dos}
Avoid:
{donts}

Keep it under 120 words. Return only the message text."#;

pub const EMAIL_TEMPLATE: &str = r#"Write a professional email to {name} ({headline}).
Their DISC style is {disc_type} ({disc_label}).

PURPOSE OF THE EMAIL:
{context}

ADAPT TO THEIR STYLE:
Do:
{dos}
Avoid:
{donts}

Start with a line "Subject: ..." followed by a blank line and the body.
Keep the body under 250 words."#;

pub const MEETING_PREP_TEMPLATE: &str = r#"Prepare a meeting brief for a conversation with {name} ({headline}).
Their DISC style is {disc_type} ({disc_label}).

MEETING CONTEXT:
{context}

ADAPT TO THEIR STYLE:
Do:
{dos}
Avoid:
{donts}

Return plain text with these sections: Opening, Key points, Likely concerns, How to close."#;

pub fn default_template(tool: ToolKind) -> &'static str {
    match tool {
        ToolKind::Message => MESSAGE_TEMPLATE,
        ToolKind::Email => EMAIL_TEMPLATE,
        ToolKind::MeetingPrep => MEETING_PREP_TEMPLATE,
    }
}
