use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};

use super::GithubError;

pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = concat!("org-pulls/", env!("CARGO_PKG_VERSION"));

/// A decoded response body together with the headers needed for pagination.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Value,
    pub headers: HeaderMap,
}

/// One authenticated read against the upstream API.
/// Implementations must not retry; every failure is returned to the caller.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, url: &str, token: &str) -> Result<Fetched, GithubError>;
}

/// `ResourceFetcher` backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    #[instrument(skip(self, token))]
    async fn fetch(&self, url: &str, token: &str) -> Result<Fetched, GithubError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(AUTHORIZATION, format!("Basic {token}"))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| GithubError::from_reqwest(url, e))?
            .error_for_status()
            .map_err(|e| GithubError::from_reqwest(url, e))?;

        let headers = response.headers().clone();
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| GithubError::from_reqwest(url, e))?;
        debug!(has_link = headers.contains_key(LINK), "fetched");

        Ok(Fetched { body, headers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::auth::basic_token;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(reqwest::Client::new(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_fetch_applies_auth_and_media_type() {
        let server = MockServer::start().await;
        let next = format!("{}/repos/acme/r1/pulls?page=2", server.uri());
        Mock::given(method("GET"))
            .and(path("/repos/acme/r1/pulls"))
            .and(query_param("state", "open"))
            .and(header("authorization", "Basic dXNlcjpzZWNyZXQ="))
            .and(header("accept", GITHUB_MEDIA_TYPE))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("link", format!("<{next}>; rel=\"next\"").as_str())
                    .set_body_json(serde_json::json!([{"number": 7}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/repos/acme/r1/pulls?state=open", server.uri());
        let fetched = fetcher()
            .fetch(&url, &basic_token("user", "secret"))
            .await
            .unwrap();

        assert_eq!(fetched.body, serde_json::json!([{"number": 7}]));
        assert_eq!(
            crate::github::link::next_link(&fetched.headers),
            Some(next)
        );
    }

    #[tokio::test]
    async fn test_error_status_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({"message": "Not Found"})))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/orgs/nope/repos", server.uri()), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Transport { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetcher()
            .fetch(&format!("{}/orgs/acme/repos", server.uri()), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Decode { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(reqwest::Client::new(), Duration::from_millis(50));
        let err = fetcher
            .fetch(&format!("{}/orgs/acme/repos", server.uri()), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, GithubError::Timeout { .. }), "{err}");
    }
}
