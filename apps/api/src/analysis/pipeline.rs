//! Analysis pipeline: ordered provider cascade ending in the local heuristic.
//!
//! Flow: provider[0] → provider[1] → … → heuristic, stopping at the first
//! success. Providers are awaited one after another, never concurrently, so
//! a request is billed by at most one provider that answered.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::disc::PersonalityAnalysis;
use crate::analysis::heuristic::HeuristicAnalyzer;
use crate::analysis::input::AnalysisInput;
use crate::analysis::normalizer::normalize_analysis;
use crate::llm_client::{CompletionRequest, LlmProvider, ProviderError};

/// One failed provider attempt, kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Result of the remote stages only.
#[derive(Debug)]
pub enum AnalysisOutcome {
    Success {
        analysis: PersonalityAnalysis,
        provider: String,
    },
    AllProvidersFailed(Vec<ProviderFailure>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum AnalysisSource {
    Provider(String),
    Heuristic,
}

impl AnalysisSource {
    /// Value stored alongside the profile.
    pub fn label(&self) -> String {
        match self {
            AnalysisSource::Provider(name) => name.clone(),
            AnalysisSource::Heuristic => "heuristic".to_string(),
        }
    }
}

/// Final pipeline result. Always carries an analysis.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub analysis: PersonalityAnalysis,
    pub source: AnalysisSource,
    pub failures: Vec<ProviderFailure>,
}

pub struct AnalysisPipeline {
    providers: Vec<Arc<dyn LlmProvider>>,
    heuristic: HeuristicAnalyzer,
}

impl AnalysisPipeline {
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>, heuristic: HeuristicAnalyzer) -> Self {
        Self {
            providers,
            heuristic,
        }
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Tries each provider in order. A response that fails the normalizer's
    /// schema gate counts as a provider failure.
    pub async fn attempt(&self, input: &AnalysisInput) -> AnalysisOutcome {
        let mut failures = Vec::new();

        for provider in &self.providers {
            let result = match provider.analyze(input.text()).await {
                Ok(raw) => normalize_analysis(&raw)
                    .map_err(|e| ProviderError::Schema(e.to_string())),
                Err(e) => Err(e),
            };

            match result {
                Ok(analysis) => {
                    info!(
                        provider = provider.name(),
                        disc_type = analysis.disc_type.as_str(),
                        "Analysis produced by provider"
                    );
                    return AnalysisOutcome::Success {
                        analysis,
                        provider: provider.name().to_string(),
                    };
                }
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Provider failed, advancing cascade"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        AnalysisOutcome::AllProvidersFailed(failures)
    }

    /// Runs the full cascade. Never fails: when every provider fails the
    /// heuristic result is returned with its lower confidence.
    pub async fn analyze(&self, input: &AnalysisInput) -> AnalysisReport {
        match self.attempt(input).await {
            AnalysisOutcome::Success { analysis, provider } => AnalysisReport {
                analysis,
                source: AnalysisSource::Provider(provider),
                failures: Vec::new(),
            },
            AnalysisOutcome::AllProvidersFailed(failures) => {
                warn!(
                    failed = failures.len(),
                    "All providers failed, using local heuristic"
                );
                AnalysisReport {
                    analysis: self.heuristic.analyze(input.text()),
                    source: AnalysisSource::Heuristic,
                    failures,
                }
            }
        }
    }

    /// Free-text completion through the same ordered cascade. Returns the
    /// text and the provider that produced it, or every failure.
    pub async fn complete_text(
        &self,
        request: CompletionRequest<'_>,
    ) -> Result<(String, String), Vec<ProviderFailure>> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.complete(request).await {
                Ok(text) => return Ok((text.trim().to_string(), provider.name().to_string())),
                Err(err) => {
                    warn!(
                        provider = provider.name(),
                        error = %err,
                        "Completion failed, advancing cascade"
                    );
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::disc::DiscType;
    use crate::analysis::heuristic::NoiseMode;
    use crate::llm_client::mock::MockProvider;
    use serde_json::json;

    fn valid_response(primary: &str) -> serde_json::Value {
        json!({
            "disc_scores": {"D": 0.9, "I": 0.3, "S": 0.2, "C": 0.4},
            "primary_type": primary,
            "confidence_score": 0.88,
            "strengths": ["Decisive"],
            "challenges": [],
            "motivators": [],
            "communication_dos": ["Be direct"],
            "communication_donts": []
        })
    }

    fn pipeline(providers: Vec<Arc<MockProvider>>) -> AnalysisPipeline {
        AnalysisPipeline::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn LlmProvider>)
                .collect(),
            HeuristicAnalyzer::new(NoiseMode::Random),
        )
    }

    fn input(text: &str) -> AnalysisInput {
        AnalysisInput::new(text).unwrap()
    }

    #[tokio::test]
    async fn test_first_provider_success_skips_second() {
        let a = Arc::new(MockProvider::returning_json("a", valid_response("D")));
        let b = Arc::new(MockProvider::returning_json("b", valid_response("C")));
        let report = pipeline(vec![a.clone(), b.clone()])
            .analyze(&input("Decisive founder and CEO"))
            .await;

        assert_eq!(report.source, AnalysisSource::Provider("a".to_string()));
        assert_eq!(report.analysis.disc_type, DiscType::D);
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_second_provider_used_when_first_fails() {
        let a = Arc::new(MockProvider::failing("a"));
        let b = Arc::new(MockProvider::returning_json("b", valid_response("C")));
        let report = pipeline(vec![a.clone(), b.clone()])
            .analyze(&input("Meticulous data analyst"))
            .await;

        assert_eq!(report.source, AnalysisSource::Provider("b".to_string()));
        assert_eq!(report.analysis.disc_type, DiscType::C);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].provider, "a");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_fall_back_to_heuristic() {
        let a = Arc::new(MockProvider::failing("a"));
        let b = Arc::new(MockProvider::failing("b"));
        let report = pipeline(vec![a, b])
            .analyze(&input("Supportive team member who listens"))
            .await;

        assert_eq!(report.source, AnalysisSource::Heuristic);
        assert_eq!(report.failures.len(), 2);
        assert!((0.3..=0.5).contains(&report.analysis.confidence_score));
    }

    #[tokio::test]
    async fn test_schema_violation_cascades() {
        let a = Arc::new(MockProvider::returning_json("a", valid_response("Z")));
        let b = Arc::new(MockProvider::returning_json("b", valid_response("S")));
        let report = pipeline(vec![a, b])
            .analyze(&input("Reliable operations manager"))
            .await;

        assert_eq!(report.source, AnalysisSource::Provider("b".to_string()));
        assert!(report.failures[0].error.contains("schema"));
    }

    #[tokio::test]
    async fn test_non_json_output_cascades() {
        let a = Arc::new(MockProvider::returning_text("a", "Sorry, I cannot help with that."));
        let report = pipeline(vec![a]).analyze(&input("Anything at all here")).await;
        assert_eq!(report.source, AnalysisSource::Heuristic);
    }

    #[tokio::test]
    async fn test_no_providers_uses_heuristic() {
        let report = pipeline(vec![]).analyze(&input("Quiet and careful engineer")).await;
        assert_eq!(report.source, AnalysisSource::Heuristic);
        assert!(report.failures.is_empty());
    }

    #[tokio::test]
    async fn test_attempt_reports_all_failures() {
        let a = Arc::new(MockProvider::failing("a"));
        let b = Arc::new(MockProvider::failing("b"));
        match pipeline(vec![a, b]).attempt(&input("Some profile text")).await {
            AnalysisOutcome::AllProvidersFailed(failures) => {
                let names: Vec<_> = failures.iter().map(|f| f.provider.as_str()).collect();
                assert_eq!(names, vec!["a", "b"]);
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_any_valid_input_yields_bounded_analysis() {
        let longest = "x".repeat(10_000);
        let texts: [&str; 6] = [
            "0123456789",
            "Visionary leader driving results",
            "Creative marketer who loves people and storytelling",
            "Patient, loyal, caring support specialist",
            "Compliance analyst focused on accuracy and process",
            longest.as_str(),
        ];
        let p = pipeline(vec![Arc::new(MockProvider::failing("a"))]);
        for text in texts {
            let report = p.analyze(&input(text)).await;
            assert!(DiscType::ALL.contains(&report.analysis.disc_type));
            assert!((0.0..=1.0).contains(&report.analysis.confidence_score));
        }
    }

    #[tokio::test]
    async fn test_complete_text_cascades() {
        let a = Arc::new(MockProvider::failing("a"));
        let b = Arc::new(MockProvider::returning_text("b", "  Hello there  "));
        let p = pipeline(vec![a, b.clone()]);
        let (text, provider) = p
            .complete_text(CompletionRequest {
                system: "s",
                prompt: "p",
                max_tokens: 10,
                temperature: 0.5,
                json_output: false,
            })
            .await
            .unwrap();
        assert_eq!(text, "Hello there");
        assert_eq!(provider, "b");
        assert_eq!(b.calls(), 1);
    }
}
