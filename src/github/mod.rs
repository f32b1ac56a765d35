pub mod auth;
pub mod fetch;
pub mod link;
pub mod paginate;
pub mod pulls;
pub mod repos;
pub mod types;

#[cfg(test)]
pub mod fake;

pub use fetch::{HttpFetcher, ResourceFetcher};
pub use types::AggregateResult;

use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum GithubError {
    #[error("GitHub API request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("GitHub API request to {url} timed out")]
    Timeout { url: String },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Expected a JSON array from {url}: {reason}")]
    NotACollection { url: String, reason: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No repos found for organization {0}")]
    NoRepositories(String),

    #[error("Problem with repo names for organization {0}")]
    NoRepositoryNames(String),

    #[error("Pagination starting at {start} exceeded {limit} pages")]
    PaginationLimitExceeded { start: String, limit: usize },

    #[error("Pagination starting at {start} returned to {url}")]
    CursorCycle { start: String, url: String },

    #[error("Collecting pull requests did not finish within {0:?}")]
    DeadlineExceeded(Duration),
}

impl GithubError {
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GithubError::Timeout { url: url.to_string() }
        } else if error.is_decode() {
            GithubError::Decode {
                url: url.to_string(),
                reason: error.to_string(),
            }
        } else {
            GithubError::Transport {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// The organization has nothing to report, as opposed to a failure
    /// talking to GitHub.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GithubError::NoRepositories(_) | GithubError::NoRepositoryNames(_)
        )
    }
}

/// `{baseUrl}/{segments...}` with each segment percent-encoded.
pub(crate) fn endpoint(config: &Config, segments: &[&str]) -> Result<Url, GithubError> {
    let mut url = Url::parse(config.api_root())
        .map_err(|e| GithubError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
    url.path_segments_mut()
        .map_err(|_| GithubError::InvalidUrl(config.base_url.clone()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Enumerate the organization's repositories and collect every pull
/// request for each of them, bounded by the configured deadline.
#[instrument(skip_all, fields(org = %config.org))]
pub async fn collect_org_pulls<F>(fetcher: &F, config: &Config) -> Result<AggregateResult, GithubError>
where
    F: ResourceFetcher + ?Sized,
{
    let token = auth::basic_token(&config.username, &config.token);

    let work = async {
        let repositories = repos::list_repositories(fetcher, config, &token).await?;
        info!(repositories = repositories.len(), "enumerated repositories");
        pulls::aggregate(fetcher, config, &token, repositories).await
    };

    let result = tokio::time::timeout(config.deadline(), work)
        .await
        .map_err(|_| GithubError::DeadlineExceeded(config.deadline()))??;

    info!(
        repositories = result.repositories.len(),
        pulls = result.total_pulls(),
        "collected pull requests"
    );
    Ok(result)
}
