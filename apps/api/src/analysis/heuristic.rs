//! Local keyword heuristic, the last stage of the analysis cascade.
//!
//! Pure computation, cannot fail. Each axis gains a fixed increment when any
//! of its keywords appears in the lowercased text, then a noise term is added.
//! In `NoiseMode::Deterministic` the noise term is the midpoint of the random
//! range, so the same text always yields the same analysis.

use rand::Rng;

use crate::analysis::disc::{profile_for, DiscScores, DiscType, PersonalityAnalysis};

const KEYWORD_INCREMENT: f64 = 0.3;
const NOISE_MAX: f64 = 0.4;
const DETERMINISTIC_NOISE: f64 = NOISE_MAX / 2.0;
const MIN_CONFIDENCE: f64 = 0.3;
const MAX_CONFIDENCE: f64 = 0.5;
const DETERMINISTIC_CONFIDENCE: f64 = 0.4;

const DOMINANCE_KEYWORDS: &[&str] = &[
    "lead", "drive", "result", "decisive", "competitive", "executive", "ceo", "founder",
    "director", "challenge", "winning", "goal",
];

const INFLUENCE_KEYWORDS: &[&str] = &[
    "communicat", "people", "network", "enthusias", "marketing", "sales", "creative",
    "inspir", "relationship", "speaker", "community", "storytell",
];

const STEADINESS_KEYWORDS: &[&str] = &[
    "support", "help", "patient", "reliab", "loyal", "consistent", "caring", "steady",
    "cooperat", "service", "mentor", "listen",
];

const CONSCIENTIOUSNESS_KEYWORDS: &[&str] = &[
    "analy", "detail", "data", "quality", "accura", "research", "engineer", "process",
    "systematic", "precis", "compliance", "financ",
];

fn keywords_for(axis: DiscType) -> &'static [&'static str] {
    match axis {
        DiscType::D => DOMINANCE_KEYWORDS,
        DiscType::I => INFLUENCE_KEYWORDS,
        DiscType::S => STEADINESS_KEYWORDS,
        DiscType::C => CONSCIENTIOUSNESS_KEYWORDS,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseMode {
    #[default]
    Deterministic,
    /// Independent uniform noise in [0, 0.4] per axis, confidence drawn from [0.3, 0.5].
    Random,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer {
    noise: NoiseMode,
}

impl HeuristicAnalyzer {
    pub fn new(noise: NoiseMode) -> Self {
        Self { noise }
    }

    pub fn analyze(&self, text: &str) -> PersonalityAnalysis {
        self.analyze_with_rng(text, &mut rand::thread_rng())
    }

    pub fn analyze_with_rng<R: Rng + ?Sized>(&self, text: &str, rng: &mut R) -> PersonalityAnalysis {
        let mut scores = keyword_scores(text);

        for axis in DiscType::ALL {
            let noise = match self.noise {
                NoiseMode::Deterministic => DETERMINISTIC_NOISE,
                NoiseMode::Random => rng.gen_range(0.0..=NOISE_MAX),
            };
            scores.set(axis, (scores.get(axis) + noise).clamp(0.0, 1.0));
        }

        let confidence_score = match self.noise {
            NoiseMode::Deterministic => DETERMINISTIC_CONFIDENCE,
            NoiseMode::Random => rng.gen_range(MIN_CONFIDENCE..=MAX_CONFIDENCE),
        };

        let disc_type = scores.dominant();
        let profile = profile_for(disc_type);

        PersonalityAnalysis {
            disc_type,
            disc_scores: scores,
            confidence_score,
            insights: profile.insights(),
            communication_tips: profile.communication_tips(),
        }
    }
}

/// Keyword component only: `KEYWORD_INCREMENT` on each axis with at least one hit.
pub fn keyword_scores(text: &str) -> DiscScores {
    let lowered = text.to_lowercase();
    let mut scores = DiscScores::default();
    for axis in DiscType::ALL {
        if keywords_for(axis).iter().any(|kw| lowered.contains(kw)) {
            scores.set(axis, KEYWORD_INCREMENT);
        }
    }
    scores
}
