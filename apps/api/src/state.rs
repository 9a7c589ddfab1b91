use std::sync::Arc;

use crate::candidates::store::CandidateStore;
use crate::config::Config;
use crate::evaluation::pipeline::EvaluationPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<EvaluationPipeline>,
    /// Same store the pipeline writes to; read directly by the candidate routes.
    pub store: Arc<dyn CandidateStore>,
    pub config: Config,
}
