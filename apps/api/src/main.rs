mod candidates;
mod config;
mod db;
mod errors;
mod evaluation;
mod github_client;
mod llm_client;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::candidates::store::{CandidateStore, PgCandidateStore};
use crate::config::{Config, LlmProvider};
use crate::db::{create_pool, ensure_schema};
use crate::evaluation::document::PdfExtractor;
use crate::evaluation::pipeline::{EvaluationPipeline, PipelineSettings};
use crate::github_client::{GitHubClient, GitHubSettings};
use crate::llm_client::{gemini::GeminiClient, LlmClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hireloom API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    ensure_schema(&db).await?;
    let store: Arc<dyn CandidateStore> = Arc::new(PgCandidateStore::new(db));

    // Initialize the generative backend
    let llm = build_llm(&config)?;
    info!("LLM client initialized (model: {})", llm.model());

    // Initialize the code host
    let code_host = GitHubClient::new(GitHubSettings {
        api_url: config.github_api_url.clone(),
        token: config.github_token.clone(),
        max_pages: config.github_max_pages,
        timeout: config.github_timeout,
    })?;
    if config.github_token.is_none() {
        info!("GITHUB_TOKEN not set; code host calls are unauthenticated");
    }

    let pipeline = EvaluationPipeline::new(
        Arc::new(PdfExtractor),
        llm,
        Arc::new(code_host),
        store.clone(),
        PipelineSettings {
            llm_timeout: config.llm_timeout,
            max_repositories: config.github_max_repositories,
        },
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        store,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the generative backend selected by `LLM_PROVIDER`.
fn build_llm(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let api_key = config.llm_api_key.clone();
    let api_url = config.llm_api_url.as_deref();

    let llm: Arc<dyn TextGenerator> = match config.llm_provider {
        LlmProvider::Anthropic => {
            let client = LlmClient::new(api_key)?;
            Arc::new(match api_url {
                Some(url) => client.with_api_url(url),
                None => client,
            })
        }
        LlmProvider::Gemini => {
            let client = GeminiClient::new(api_key)?;
            Arc::new(match api_url {
                Some(url) => client.with_api_url(url),
                None => client,
            })
        }
    };
    Ok(llm)
}
