//! DISC taxonomy and the canonical `PersonalityAnalysis` record.
//!
//! A `PersonalityAnalysis` is built once per analysis request and never
//! mutated afterwards; a later analysis replaces it through an upsert.

use serde::{Deserialize, Serialize};

/// Primary DISC classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscType {
    D,
    I,
    S,
    C,
}

impl DiscType {
    /// Fixed enumeration order. Ties in scoring resolve to the earliest entry.
    pub const ALL: [DiscType; 4] = [DiscType::D, DiscType::I, DiscType::S, DiscType::C];

    pub fn as_str(self) -> &'static str {
        match self {
            DiscType::D => "D",
            DiscType::I => "I",
            DiscType::S => "S",
            DiscType::C => "C",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscType::D => "Dominance",
            DiscType::I => "Influence",
            DiscType::S => "Steadiness",
            DiscType::C => "Conscientiousness",
        }
    }

    /// Parses a single-letter type, case-insensitively, ignoring surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "D" => Some(DiscType::D),
            "I" => Some(DiscType::I),
            "S" => Some(DiscType::S),
            "C" => Some(DiscType::C),
            _ => None,
        }
    }
}

/// Independent per-axis confidence, each in [0, 1]. Not required to sum to 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscScores {
    #[serde(rename = "D")]
    pub d: f64,
    #[serde(rename = "I")]
    pub i: f64,
    #[serde(rename = "S")]
    pub s: f64,
    #[serde(rename = "C")]
    pub c: f64,
}

impl DiscScores {
    pub fn get(&self, axis: DiscType) -> f64 {
        match axis {
            DiscType::D => self.d,
            DiscType::I => self.i,
            DiscType::S => self.s,
            DiscType::C => self.c,
        }
    }

    pub fn set(&mut self, axis: DiscType, value: f64) {
        match axis {
            DiscType::D => self.d = value,
            DiscType::I => self.i = value,
            DiscType::S => self.s = value,
            DiscType::C => self.c = value,
        }
    }

    /// Axis with the highest score. Ties go to the first axis in D→I→S→C order.
    pub fn dominant(&self) -> DiscType {
        let mut best = DiscType::D;
        for axis in DiscType::ALL {
            if self.get(axis) > self.get(best) {
                best = axis;
            }
        }
        best
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub motivators: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationTips {
    #[serde(default)]
    pub dos: Vec<String>,
    #[serde(default)]
    pub donts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityAnalysis {
    pub disc_type: DiscType,
    pub disc_scores: DiscScores,
    /// Overall reliability in [0, 1]. Heuristic results sit in [0.3, 0.5].
    pub confidence_score: f64,
    pub insights: Insights,
    pub communication_tips: CommunicationTips,
}

/// Static description of a DISC style, used to fill heuristic results and
/// template-based drafts when no provider answered.
#[derive(Debug)]
pub struct DiscProfile {
    pub summary: &'static str,
    pub strengths: &'static [&'static str],
    pub challenges: &'static [&'static str],
    pub motivators: &'static [&'static str],
    pub dos: &'static [&'static str],
    pub donts: &'static [&'static str],
}

impl DiscProfile {
    pub fn insights(&self) -> Insights {
        Insights {
            strengths: to_owned_list(self.strengths),
            challenges: to_owned_list(self.challenges),
            motivators: to_owned_list(self.motivators),
        }
    }

    pub fn communication_tips(&self) -> CommunicationTips {
        CommunicationTips {
            dos: to_owned_list(self.dos),
            donts: to_owned_list(self.donts),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const DOMINANCE: DiscProfile = DiscProfile {
    summary: "direct, results-oriented and decisive",
    strengths: &[
        "Makes decisions quickly",
        "Drives toward measurable results",
        "Comfortable taking charge",
    ],
    challenges: &[
        "Can appear impatient",
        "May overlook details or other viewpoints",
    ],
    motivators: &["Autonomy", "Clear goals and wins", "Authority to act"],
    dos: &[
        "Be brief and get to the point",
        "Lead with outcomes and bottom-line impact",
        "Offer options and let them decide",
    ],
    donts: &[
        "Ramble or over-explain",
        "Make decisions for them",
        "Focus on feelings over results",
    ],
};

const INFLUENCE: DiscProfile = DiscProfile {
    summary: "enthusiastic, people-oriented and persuasive",
    strengths: &[
        "Builds relationships easily",
        "Energises and inspires others",
        "Communicates ideas with enthusiasm",
    ],
    challenges: &[
        "May lose track of details",
        "Can over-commit",
    ],
    motivators: &["Recognition", "Social connection", "Creative freedom"],
    dos: &[
        "Be friendly and personable",
        "Share stories and the big picture",
        "Acknowledge their ideas and contributions",
    ],
    donts: &[
        "Be cold or overly formal",
        "Bury them in data",
        "Cut off their enthusiasm",
    ],
};

const STEADINESS: DiscProfile = DiscProfile {
    summary: "patient, dependable and team-focused",
    strengths: &[
        "Reliable and consistent",
        "Supportive team player",
        "Listens carefully",
    ],
    challenges: &[
        "May resist sudden change",
        "Can avoid conflict",
    ],
    motivators: &["Stability", "Sincere appreciation", "Cooperative environments"],
    dos: &[
        "Be warm and patient",
        "Explain changes step by step",
        "Show how the team benefits",
    ],
    donts: &[
        "Pressure them for quick decisions",
        "Be confrontational",
        "Spring surprises without context",
    ],
};

const CONSCIENTIOUSNESS: DiscProfile = DiscProfile {
    summary: "analytical, precise and quality-driven",
    strengths: &[
        "Thorough and accurate",
        "Strong analytical thinking",
        "Holds high quality standards",
    ],
    challenges: &[
        "Can over-analyse",
        "May appear reserved or critical",
    ],
    motivators: &["Accuracy", "Expertise", "Clear processes and expectations"],
    dos: &[
        "Provide data and evidence",
        "Be precise and well prepared",
        "Give them time to evaluate",
    ],
    donts: &[
        "Be vague or exaggerate",
        "Rush their decision",
        "Rely on emotional appeals",
    ],
};

pub fn profile_for(disc_type: DiscType) -> &'static DiscProfile {
    match disc_type {
        DiscType::D => &DOMINANCE,
        DiscType::I => &INFLUENCE,
        DiscType::S => &STEADINESS,
        DiscType::C => &CONSCIENTIOUSNESS,
    }
}
