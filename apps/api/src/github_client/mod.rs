//! GitHub REST client, the code-hosting collaborator behind [`CodeHost`].
//!
//! The reputation scan depends only on the trait; `main` wires in
//! [`GitHubClient`] and tests substitute a fake.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

mod http;

use http::check_response;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("hireloom-api/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum CodeHostError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A resolved account on the code host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostUser {
    pub login: String,
    #[serde(default)]
    pub public_repos: u32,
}

/// One entry of a user's repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HostRepository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    /// Primary language as reported by the listing.
    pub language: Option<String>,
}

/// A user's repositories, fetched page by page as the stream is polled.
/// Produced once per call and consumed by value; it cannot be rewound.
pub type RepositoryListing<'a> = BoxStream<'a, Result<HostRepository, CodeHostError>>;

#[async_trait]
pub trait CodeHost: Send + Sync {
    async fn resolve_user(&self, username: &str) -> Result<HostUser, CodeHostError>;

    fn list_repositories<'a>(&'a self, user: &'a HostUser) -> RepositoryListing<'a>;

    /// Language names, largest share of code first.
    async fn repository_languages(
        &self,
        repository: &HostRepository,
    ) -> Result<Vec<String>, CodeHostError>;
}

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub token: Option<String>,
    /// Upper bound on listing pages fetched per scan.
    pub max_pages: u32,
    pub timeout: Duration,
}

/// HTTP client for the GitHub REST API.
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
    max_pages: u32,
}

impl GitHubClient {
    pub fn new(settings: GitHubSettings) -> Result<Self, CodeHostError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: settings.token,
            max_pages: settings.max_pages,
        })
    }

    fn get(&self, path: &str) -> RequestBuilder {
        let request = self
            .http
            .get(format!("{}{}", self.api_url, path))
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_repository_page(
        &self,
        login: &str,
        page: u32,
    ) -> Result<Vec<HostRepository>, CodeHostError> {
        debug!("Fetching repository page {page} for {login}");
        let resp = self
            .get(&format!("/users/{login}/repos"))
            .query(&[
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
                ("type", "owner".to_string()),
            ])
            .send()
            .await?;
        Ok(check_response(resp).await?.json().await?)
    }
}

#[async_trait]
impl CodeHost for GitHubClient {
    async fn resolve_user(&self, username: &str) -> Result<HostUser, CodeHostError> {
        let resp = self.get(&format!("/users/{username}")).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(CodeHostError::UserNotFound(username.to_string()));
        }
        Ok(check_response(resp).await?.json().await?)
    }

    fn list_repositories<'a>(&'a self, user: &'a HostUser) -> RepositoryListing<'a> {
        let pages = stream::try_unfold(Some(1u32), move |next_page| async move {
            let Some(page) = next_page.filter(|p| *p <= self.max_pages) else {
                return Ok::<_, CodeHostError>(None);
            };
            let batch = self.fetch_repository_page(&user.login, page).await?;
            let following = (batch.len() == PER_PAGE).then_some(page + 1);
            Ok(Some((batch, following)))
        });

        pages
            .map_ok(|batch| stream::iter(batch.into_iter().map(Ok)))
            .try_flatten()
            .boxed()
    }

    async fn repository_languages(
        &self,
        repository: &HostRepository,
    ) -> Result<Vec<String>, CodeHostError> {
        let resp = self
            .get(&format!("/repos/{}/languages", repository.full_name))
            .send()
            .await?;
        let bytes_by_language: HashMap<String, u64> = check_response(resp).await?.json().await?;

        let mut languages: Vec<(String, u64)> = bytes_by_language.into_iter().collect();
        languages.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(languages.into_iter().map(|(name, _)| name).collect())
    }
}
