use std::sync::Arc;

use crate::analysis::pipeline::AnalysisPipeline;
use crate::auth::SessionVerifier;
use crate::rate_limit::RateLimiter;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    /// Ordered provider cascade ending in the local heuristic.
    pub pipeline: Arc<AnalysisPipeline>,
    pub sessions: Arc<dyn SessionVerifier>,
    /// Guards the analysis entry points.
    pub rate_limiter: Arc<RateLimiter>,
}
