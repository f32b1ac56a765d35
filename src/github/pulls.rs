use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Url;
use tracing::{debug, info_span, instrument, Instrument};

use super::fetch::ResourceFetcher;
use super::paginate::walk;
use super::types::{AggregateResult, PullRequestSet, RepositoryRef};
use super::{endpoint, GithubError};
use crate::config::Config;

/// `GET {baseUrl}/repos/{org}/{repo}/pulls?per_page=..&state=..`
pub fn pulls_url(config: &Config, repository: &RepositoryRef) -> Result<Url, GithubError> {
    let mut url = endpoint(config, &["repos", config.org.as_str(), repository.name.as_str(), "pulls"])?;
    url.query_pairs_mut()
        .append_pair("per_page", &config.pulls_per_page.to_string())
        .append_pair("state", &config.pulls_state.to_string());
    Ok(url)
}

/// Collect every pull request of every repository.
///
/// Up to `config.concurrency` repositories are walked at once; the result
/// keeps the order of `repositories` no matter which walk finishes first.
/// The first failing repository (in list order) fails the whole aggregate.
#[instrument(skip_all, fields(org = %config.org, repositories = repositories.len()))]
pub async fn aggregate<F>(
    fetcher: &F,
    config: &Config,
    token: &str,
    repositories: Vec<RepositoryRef>,
) -> Result<AggregateResult, GithubError>
where
    F: ResourceFetcher + ?Sized,
{
    let sets = stream::iter(repositories)
        .map(|repository| {
            let span = info_span!("repository", name = %repository);
            async move {
                let url = pulls_url(config, &repository)?;
                let pages = walk(fetcher, url.as_str(), token, config.max_pages).await?;
                let pulls: Vec<_> = pages.into_iter().flat_map(|page| page.records).collect();
                debug!(pulls = pulls.len(), "collected repository");
                Ok::<_, GithubError>(PullRequestSet { repository, pulls })
            }
            .instrument(span)
        })
        .buffered(config.concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await?;

    Ok(AggregateResult { repositories: sets })
}
