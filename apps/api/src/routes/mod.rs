pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::evaluation::handlers as evaluation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/parse_resume",
            post(evaluation::handle_parse_resume).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/candidates/:candidate_name",
            get(candidates::handle_get_candidate).delete(candidates::handle_delete_candidate),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::pipeline::{EvaluationPipeline, PipelineSettings};
    use crate::testing::{FakeCodeHost, InMemoryCandidateStore, ScriptedGenerator, StaticExtractor};

    const BOUNDARY: &str = "hireloom-test-boundary";
    const JANE: &str = "Jane Doe\nContact: jane@x.com\ngithub.com/janedoe";
    const RESUME_REPLY: &str = r#"{"overall_assessment": "Good fit."}"#;
    const FUSION_REPLY: &str = r#"{"suitability_score": 81, "reputation_score": 10, "resume_score": 77}"#;

    fn test_app(max_upload_bytes: usize) -> (Router, Arc<InMemoryCandidateStore>) {
        let mut config = Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some("postgres://localhost/hireloom".to_string()),
            "ANTHROPIC_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        config.max_upload_bytes = max_upload_bytes;

        let store = Arc::new(InMemoryCandidateStore::default());
        let pipeline = EvaluationPipeline::new(
            Arc::new(StaticExtractor::new(JANE)),
            Arc::new(ScriptedGenerator::new([
                Ok(RESUME_REPLY.to_string()),
                Ok(FUSION_REPLY.to_string()),
            ])),
            Arc::new(FakeCodeHost::unreachable()),
            store.clone(),
            PipelineSettings {
                llm_timeout: Duration::from_secs(30),
                max_repositories: 500,
            },
        );
        let state = AppState {
            pipeline: Arc::new(pipeline),
            store: store.clone(),
            config,
        };
        (build_router(state), store)
    }

    /// (field name, file name, content)
    fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file_name {
                Some(file_name) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/parse_resume")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    const PDF: &[u8] = b"%PDF-1.4 stand-in";

    #[tokio::test]
    async fn test_root_and_health() {
        let (app, _) = test_app(1024 * 1024);

        let (status, body) = send(&app, request(Method::GET, "/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Server OK");

        let (status, body) = send(&app, request(Method::GET, "/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "hireloom-api");
    }

    #[tokio::test]
    async fn test_parse_resume_returns_result_keyed_by_name() {
        let (app, store) = test_app(1024 * 1024);

        let (status, body) = send(
            &app,
            upload(&[
                ("resume", Some("Jane_Doe.PDF"), PDF),
                ("job_description", None, b"Python backend engineer".as_slice()),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let result = &body["Jane Doe"];
        assert_eq!(result["resume_analysis"]["overall_assessment"], "Good fit.");
        assert_eq!(result["combined_score"]["suitability_score"], 81);
        assert!(result["github_analysis"]["error"].is_string());
        assert!(store.contains("Jane_Doe"));
    }

    #[tokio::test]
    async fn test_non_pdf_upload_is_rejected() {
        let (app, store) = test_app(1024 * 1024);

        let (status, body) = send(
            &app,
            upload(&[
                ("resume", Some("resume.docx"), PDF),
                ("job_description", None, b"Python".as_slice()),
            ]),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_blank_job_description_is_rejected() {
        let (app, _) = test_app(1024 * 1024);
        let (status, _) = send(
            &app,
            upload(&[
                ("resume", Some("resume.pdf"), PDF),
                ("job_description", None, b"   ".as_slice()),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_resume_is_rejected() {
        let (app, _) = test_app(1024 * 1024);
        let (status, body) = send(&app, upload(&[("job_description", None, b"Python".as_slice())])).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("resume"));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let (app, store) = test_app(256);
        let large = vec![b'a'; 4096];
        let (status, _) = send(
            &app,
            upload(&[
                ("resume", Some("resume.pdf"), large.as_slice()),
                ("job_description", None, b"Python".as_slice()),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(store.count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_and_delete_candidate() {
        let (app, _) = test_app(1024 * 1024);
        let (status, _) = send(
            &app,
            upload(&[
                ("resume", Some("resume.pdf"), PDF),
                ("job_description", None, b"Python".as_slice()),
            ]),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&app, request(Method::GET, "/candidates/Jane%20Doe")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["candidate_name"], "Jane Doe");
        assert_eq!(body["contact"]["email"], "jane@x.com");

        let (status, body) = send(&app, request(Method::DELETE, "/candidates/Jane%20Doe")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Candidate 'Jane Doe' deleted.");

        let (status, body) = send(&app, request(Method::GET, "/candidates/Jane%20Doe")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&app, request(Method::DELETE, "/candidates/Jane%20Doe")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
