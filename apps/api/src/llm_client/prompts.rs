// Prompt constants shared by every provider.
// Tool-specific prompts live next to the code that uses them.

/// System prompt for DISC analysis. Enforces JSON-only output.
pub const DISC_ANALYSIS_SYSTEM: &str = "You are an expert in the DISC behavioral model. \
    You analyse professional profiles and classify their dominant communication style. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// DISC analysis prompt. Replace `{profile_text}` before sending.
pub const DISC_ANALYSIS_PROMPT: &str = r#"Analyse the following professional profile and classify the person's DISC personality style.

PROFILE:
{profile_text}

Return a JSON object with this EXACT schema (no extra fields):
{
  "disc_scores": {"D": 0.0, "I": 0.0, "S": 0.0, "C": 0.0},
  "primary_type": "D" | "I" | "S" | "C",
  "confidence_score": 0.0,
  "strengths": ["string"],
  "challenges": ["string"],
  "motivators": ["string"],
  "communication_dos": ["string"],
  "communication_donts": ["string"]
}

RULES:
1. Every score is an independent confidence between 0.0 and 1.0; they do not need to sum to 1.
2. primary_type is a single letter and must be the axis you are most confident in.
3. confidence_score reflects how much evidence the profile provides (sparse profiles score low).
4. Give 3 to 5 short items for each list.
5. Return ONLY the JSON object."#;

/// System prompt for free-text communication tools.
pub const COMMUNICATION_SYSTEM: &str = "You are a communication coach who adapts tone and \
    structure to the recipient's DISC style. Write plain text ready to send or read. \
    Do NOT add commentary about the DISC model itself.";
