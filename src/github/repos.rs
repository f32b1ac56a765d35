use reqwest::Url;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::fetch::ResourceFetcher;
use super::paginate::walk;
use super::types::RepositoryRef;
use super::{endpoint, GithubError};
use crate::config::Config;

/// `GET {baseUrl}/orgs/{org}/repos?per_page=..&type=..`
pub fn repos_url(config: &Config) -> Result<Url, GithubError> {
    let mut url = endpoint(config, &["orgs", config.org.as_str(), "repos"])?;
    url.query_pairs_mut()
        .append_pair("per_page", &config.repos_per_page.to_string())
        .append_pair("type", &config.repos_type.to_string());
    Ok(url)
}

/// List the names of every repository visible in the organization.
///
/// Follows `Link` pagination so organizations larger than one page are not
/// truncated. An organization with nothing visible, or a listing that is not
/// a JSON array, is an error, not an empty list.
#[instrument(skip_all, fields(org = %config.org))]
pub async fn list_repositories<F>(
    fetcher: &F,
    config: &Config,
    token: &str,
) -> Result<Vec<RepositoryRef>, GithubError>
where
    F: ResourceFetcher + ?Sized,
{
    let url = repos_url(config)?;
    let pages = walk(fetcher, url.as_str(), token, config.max_pages)
        .await
        .map_err(|e| match e {
            GithubError::NotACollection { url, reason } => {
                warn!(%url, %reason, "repository listing is not a collection");
                GithubError::NoRepositories(config.org.clone())
            }
            other => other,
        })?;
    let records: Vec<Value> = pages.into_iter().flat_map(|page| page.records).collect();
    if records.is_empty() {
        return Err(GithubError::NoRepositories(config.org.clone()));
    }

    let repositories: Vec<RepositoryRef> = records
        .iter()
        .filter_map(|record| match record.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => Some(RepositoryRef::new(name)),
            _ => {
                warn!(record = %record, "repository record without a name");
                None
            }
        })
        .collect();
    if repositories.is_empty() {
        return Err(GithubError::NoRepositoryNames(config.org.clone()));
    }

    debug!(count = repositories.len(), "listed repositories");
    Ok(repositories)
}
