mod analysis;
mod auth;
mod compose;
mod config;
mod db;
mod errors;
mod extension;
mod llm_client;
mod models;
mod rate_limit;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::heuristic::{HeuristicAnalyzer, NoiseMode};
use crate::analysis::pipeline::AnalysisPipeline;
use crate::auth::ManagedAuthVerifier;
use crate::config::{Config, Environment};
use crate::db::create_pool;
use crate::llm_client::{AnthropicProvider, LlmProvider, OpenAiProvider};
use crate::rate_limit::{MemoryRateLimitStore, RateLimitStore, RateLimiter, RedisRateLimitStore};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PersonaFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Provider cascade: OpenAI first, Anthropic second, heuristic last
    let mut providers: Vec<Arc<dyn LlmProvider>> = Vec::new();
    if let Some(settings) = &config.openai {
        providers.push(Arc::new(OpenAiProvider::new(settings)?));
        info!("OpenAI provider registered (model: {})", settings.model);
    }
    if let Some(settings) = &config.anthropic {
        providers.push(Arc::new(AnthropicProvider::new(settings)?));
        info!("Anthropic provider registered (model: {})", settings.model);
    }
    if providers.is_empty() {
        warn!("No LLM provider configured; analyses will use the local heuristic only");
    }

    let noise = if config.heuristic_noise {
        NoiseMode::Random
    } else {
        NoiseMode::Deterministic
    };
    let pipeline = AnalysisPipeline::new(providers, HeuristicAnalyzer::new(noise));
    info!(providers = ?pipeline.provider_names(), ?noise, "Analysis pipeline ready");

    // Session verification against the managed auth service
    let sessions = ManagedAuthVerifier::new(
        &config.auth_url,
        &config.auth_anon_key,
        config.provider_timeout,
    )?;

    // Rate-limit store: Redis when configured, otherwise process memory
    let limit_store: Arc<dyn RateLimitStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).context("Invalid REDIS_URL")?;
            info!("Rate limiting backed by Redis");
            Arc::new(RedisRateLimitStore::new(client))
        }
        None => {
            info!("Rate limiting backed by process memory");
            Arc::new(MemoryRateLimitStore::new())
        }
    };
    let rate_limiter = RateLimiter::new(
        limit_store,
        config.rate_limit_max_attempts,
        config.rate_limit_window,
    );

    // Build app state
    let state = AppState {
        store: Arc::new(PgStore::new(db)),
        pipeline: Arc::new(pipeline),
        sessions: Arc::new(sessions),
        rate_limiter: Arc::new(rate_limiter),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive in development. In production only the dashboard and the
/// extension origins may call the API, with credentials for the session cookie.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    if config.environment == Environment::Development {
        return Ok(CorsLayer::permissive());
    }

    let mut origins = vec![HeaderValue::from_str(&config.public_base_url)
        .context("PUBLIC_BASE_URL is not a valid origin")?];
    if let Some(origin) = &config.extension_origin {
        origins.push(HeaderValue::from_str(origin).context("EXTENSION_ORIGIN is not a valid origin")?);
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true))
}
