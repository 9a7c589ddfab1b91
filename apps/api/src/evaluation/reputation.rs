//! Scans a candidate's public repositories for work
//! related to the job description.
//!
//! Relevance is a plain keyword test: a repository counts when any
//! whitespace-separated, lowercased job-description word is a substring of
//! its lowercased description or primary language.

use std::collections::HashSet;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::github_client::{CodeHost, CodeHostError};

/// Digest handed to score fusion when there is no usable profile.
pub const NO_REPUTATION_DIGEST: &str = "No valid GitHub data.";

/// A repository judged relevant to the job description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub name: String,
    pub description: Option<String>,
    /// Languages ordered by share of code, largest first.
    pub languages: Vec<String>,
}

/// Either a profile scan or the reason it could not be made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReputationSummary {
    Profile {
        /// Number of repositories scanned, relevant or not.
        total_repository_count: usize,
        relevant_repositories: Vec<RepositoryRecord>,
    },
    Unavailable {
        error: String,
    },
}

impl ReputationSummary {
    fn unavailable(err: CodeHostError) -> Self {
        ReputationSummary::Unavailable {
            error: err.to_string(),
        }
    }
}

/// Distinct lowercased whitespace-separated words of the job description.
pub fn job_keywords(job_description: &str) -> HashSet<String> {
    job_description
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

pub fn is_relevant(keywords: &HashSet<String>, description: Option<&str>, language: Option<&str>) -> bool {
    [description, language].into_iter().flatten().any(|field| {
        let field = field.to_lowercase();
        keywords.iter().any(|keyword| field.contains(keyword.as_str()))
    })
}

/// Scans at most `max_repositories` of `username`'s repositories.
///
/// The listing is consumed exactly once. Languages are fetched only for
/// relevant repositories; a failed fetch leaves that record's list empty.
/// Failing to resolve the user or read the listing yields
/// [`ReputationSummary::Unavailable`] instead of an error.
pub async fn assess_reputation(
    host: &dyn CodeHost,
    username: &str,
    job_description: &str,
    max_repositories: usize,
) -> ReputationSummary {
    info!("Connecting to code host for user: {username}");
    let user = match host.resolve_user(username).await {
        Ok(user) => user,
        Err(err) => {
            warn!("Could not resolve code host user {username}: {err}");
            return ReputationSummary::unavailable(err);
        }
    };

    debug!("{} reports {} public repositories", user.login, user.public_repos);

    let keywords = job_keywords(job_description);
    let mut listing = host.list_repositories(&user).take(max_repositories);
    let mut total_repository_count = 0usize;
    let mut relevant_repositories = Vec::new();

    info!("Analyzing repositories");
    while let Some(next) = listing.next().await {
        let repository = match next {
            Ok(repository) => repository,
            Err(err) => {
                warn!("Repository listing for {username} failed: {err}");
                return ReputationSummary::unavailable(err);
            }
        };
        total_repository_count += 1;

        if !is_relevant(
            &keywords,
            repository.description.as_deref(),
            repository.language.as_deref(),
        ) {
            continue;
        }

        let languages = match host.repository_languages(&repository).await {
            Ok(languages) => languages,
            Err(err) => {
                debug!("Languages for {} unavailable: {err}", repository.full_name);
                Vec::new()
            }
        };
        relevant_repositories.push(RepositoryRecord {
            name: repository.name,
            description: repository.description,
            languages,
        });
    }

    if total_repository_count == max_repositories {
        warn!("Repository scan for {username} stopped at the cap of {max_repositories}");
    }
    info!(
        "Found {} relevant repos out of {} total",
        relevant_repositories.len(),
        total_repository_count
    );

    ReputationSummary::Profile {
        total_repository_count,
        relevant_repositories,
    }
}

/// Plain-text rendering of a summary for the fusion prompt.
pub fn reputation_digest(summary: Option<&ReputationSummary>) -> String {
    let Some(ReputationSummary::Profile {
        total_repository_count,
        relevant_repositories,
    }) = summary
    else {
        return NO_REPUTATION_DIGEST.to_string();
    };

    let mut digest = format!("Total Public Repos: {total_repository_count}\n");
    for repository in relevant_repositories {
        digest.push_str(&format!(
            "Project: {}\nDescription: {}\nLanguages: {}\n---\n",
            repository.name,
            repository.description.as_deref().unwrap_or("No description"),
            repository.languages.join(", ")
        ));
    }
    digest
}
