//! Fakes for the pipeline's collaborators, shared by the test modules.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::Router;
use futures::stream::{self, StreamExt};
use tokio::net::TcpListener;

use crate::candidates::store::{CandidateStore, StoreError};
use crate::evaluation::document::{CandidateDocument, DocumentExtractor, DocumentReadError, ExtractedText};
use crate::github_client::{CodeHost, CodeHostError, HostRepository, HostUser, RepositoryListing};
use crate::llm_client::{LlmError, TextGenerator};
use crate::models::candidate::CandidateRecord;

/// Builds a small uncompressed PDF with one Helvetica text line per entry,
/// one page per slice, and a correct cross-reference table.
pub fn pdf_with_pages(pages: &[&[&str]]) -> Vec<u8> {
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        String::new(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
    ];
    let mut kids = Vec::new();
    for lines in pages {
        let page_id = objects.len() + 1;
        kids.push(format!("{page_id} 0 R"));

        let mut content = String::from("BT /F1 12 Tf 72 720 Td\n");
        for line in lines.iter() {
            let escaped = line.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
            content.push_str(&format!("({escaped}) Tj 0 -14 Td\n"));
        }
        content.push_str("ET");

        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_id + 1
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }
    objects[1] = format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids.join(" "), pages.len());

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.extend_from_slice(xref.as_bytes());
    pdf
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Answers each call with the next scripted reply and records the prompts.
/// Calls beyond the script fail with [`LlmError::EmptyContent`].
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
    hang: bool,
}

impl ScriptedGenerator {
    pub fn new(replies: impl IntoIterator<Item = Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            hang: false,
        }
    }

    /// A backend that never answers.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new([])
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.hang {
            std::future::pending::<()>().await;
        }
        let next = self.replies.lock().unwrap().pop_front();
        next.unwrap_or(Err(LlmError::EmptyContent))
    }
}

/// In-memory code host with call counters.
pub struct FakeCodeHost {
    user: Option<String>,
    unreachable: bool,
    hang: bool,
    repos: Vec<HostRepository>,
    failing_languages: HashSet<String>,
    calls: AtomicUsize,
    language_calls: AtomicUsize,
}

impl FakeCodeHost {
    pub fn with_user(login: &str) -> Self {
        Self {
            user: Some(login.to_string()),
            unreachable: false,
            hang: false,
            repos: Vec::new(),
            failing_languages: HashSet::new(),
            calls: AtomicUsize::new(0),
            language_calls: AtomicUsize::new(0),
        }
    }

    pub fn without_user() -> Self {
        Self {
            user: None,
            ..Self::with_user("")
        }
    }

    /// Every call fails as if the service were down.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::with_user("")
        }
    }

    /// User lookups never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::with_user("")
        }
    }

    /// Adds a repository whose only language is its primary language.
    pub fn repo(mut self, name: &str, description: Option<&str>, language: Option<&str>) -> Self {
        let owner = self.user.clone().unwrap_or_default();
        self.repos.push(HostRepository {
            name: name.to_string(),
            full_name: format!("{owner}/{name}"),
            description: description.map(str::to_string),
            language: language.map(str::to_string),
        });
        self
    }

    pub fn failing_languages(mut self, name: &str) -> Self {
        self.failing_languages.insert(name.to_string());
        self
    }

    /// Total calls of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn language_calls(&self) -> usize {
        self.language_calls.load(Ordering::SeqCst)
    }

    fn down() -> CodeHostError {
        CodeHostError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        }
    }
}

#[async_trait]
impl CodeHost for FakeCodeHost {
    async fn resolve_user(&self, username: &str) -> Result<HostUser, CodeHostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.unreachable {
            return Err(Self::down());
        }
        match &self.user {
            Some(login) if login == username => Ok(HostUser {
                login: login.clone(),
                public_repos: self.repos.len() as u32,
            }),
            _ => Err(CodeHostError::UserNotFound(username.to_string())),
        }
    }

    fn list_repositories<'a>(&'a self, _user: &'a HostUser) -> RepositoryListing<'a> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return stream::iter([Err(Self::down())]).boxed();
        }
        stream::iter(self.repos.iter().cloned().map(Ok)).boxed()
    }

    async fn repository_languages(
        &self,
        repository: &HostRepository,
    ) -> Result<Vec<String>, CodeHostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.language_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable || self.failing_languages.contains(&repository.name) {
            return Err(Self::down());
        }
        Ok(repository.language.iter().cloned().collect())
    }
}

/// Returns the same text for any document.
pub struct StaticExtractor(pub String);

impl StaticExtractor {
    pub fn new(text: &str) -> Self {
        Self(text.to_string())
    }
}

impl DocumentExtractor for StaticExtractor {
    fn extract(&self, _document: &CandidateDocument) -> Result<ExtractedText, DocumentReadError> {
        Ok(ExtractedText::from_pages([self.0.as_str()]))
    }
}

/// Stores records as JSON, the way the database column does.
#[derive(Default)]
pub struct InMemoryCandidateStore {
    records: Mutex<HashMap<String, serde_json::Value>>,
    failing: bool,
}

impl InMemoryCandidateStore {
    /// A store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn contains(&self, doc_id: &str) -> bool {
        self.records.lock().unwrap().contains_key(doc_id)
    }
}

#[async_trait]
impl CandidateStore for InMemoryCandidateStore {
    async fn save(&self, record: &CandidateRecord) -> Result<String, StoreError> {
        if self.failing {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        let doc_id = record.doc_id();
        let body = serde_json::to_value(record)?;
        self.records.lock().unwrap().insert(doc_id.clone(), body);
        Ok(doc_id)
    }

    async fn fetch(&self, doc_id: &str) -> Result<Option<CandidateRecord>, StoreError> {
        let body = self.records.lock().unwrap().get(doc_id).cloned();
        Ok(body.map(serde_json::from_value).transpose()?)
    }

    async fn delete(&self, doc_id: &str) -> Result<bool, StoreError> {
        Ok(self.records.lock().unwrap().remove(doc_id).is_some())
    }
}
