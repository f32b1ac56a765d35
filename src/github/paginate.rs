use reqwest::Url;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::fetch::ResourceFetcher;
use super::types::Page;
use super::{link, GithubError};

/// Fetch `start_url` and every page reachable through `rel="next"` links.
///
/// Pages come back in request order. The walk stops at the first page
/// without exactly one next link, and fails if it would fetch more than
/// `max_pages` pages or revisit a URL it has already fetched.
#[instrument(skip(fetcher, token))]
pub async fn walk<F>(
    fetcher: &F,
    start_url: &str,
    token: &str,
    max_pages: usize,
) -> Result<Vec<Page>, GithubError>
where
    F: ResourceFetcher + ?Sized,
{
    let mut pages: Vec<Page> = Vec::new();
    let mut visited = HashSet::new();
    let mut cursor = Some(start_url.to_string());

    while let Some(url) = cursor {
        if pages.len() >= max_pages {
            return Err(GithubError::PaginationLimitExceeded {
                start: start_url.to_string(),
                limit: max_pages,
            });
        }
        if !visited.insert(url.clone()) {
            return Err(GithubError::CursorCycle {
                start: start_url.to_string(),
                url,
            });
        }

        let fetched = fetcher.fetch(&url, token).await?;
        let next = link::next_link(&fetched.headers)
            .map(|next| resolve(&url, &next))
            .transpose()?;
        let records = into_records(&url, fetched.body)?;
        debug!(page = pages.len() + 1, records = records.len(), has_next = next.is_some(), "fetched page");

        cursor = next.clone();
        pages.push(Page { records, next });
    }

    Ok(pages)
}

/// Next links are absolute on GitHub; relative ones are resolved against
/// the page that carried them.
fn resolve(current: &str, next: &str) -> Result<String, GithubError> {
    Url::parse(current)
        .and_then(|base| base.join(next))
        .map(String::from)
        .map_err(|e| GithubError::InvalidUrl(format!("{next}: {e}")))
}

fn into_records(url: &str, body: Value) -> Result<Vec<Value>, GithubError> {
    match body {
        Value::Array(records) => Ok(records),
        other => Err(GithubError::NotACollection {
            url: url.to_string(),
            reason: match other.get("message").and_then(Value::as_str) {
                Some(message) => format!("got message {message:?}"),
                None => format!("got {}", kind(&other)),
            },
        }),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
