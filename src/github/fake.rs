//! In-memory `ResourceFetcher` for tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, LINK};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use super::fetch::{Fetched, ResourceFetcher};
use super::GithubError;

#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, (Value, Option<String>)>,
    delays: HashMap<String, Duration>,
    failures: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url`, with `link` as the raw `Link` header value.
    pub fn page(mut self, url: &str, body: Value, link: Option<&str>) -> Self {
        self.responses
            .insert(url.to_string(), (body, link.map(str::to_string)));
        self
    }

    pub fn delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.failures.insert(url.to_string());
        self
    }

    /// URLs requested so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResourceFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _token: &str) -> Result<Fetched, GithubError> {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        if self.failures.contains(url) {
            return Err(GithubError::Timeout { url: url.to_string() });
        }

        let (body, link) = self.responses.get(url).ok_or_else(|| GithubError::Decode {
            url: url.to_string(),
            reason: "no fake response registered".to_string(),
        })?;

        let mut headers = HeaderMap::new();
        if let Some(link) = link {
            headers.insert(LINK, HeaderValue::from_str(link).unwrap());
        }
        Ok(Fetched {
            body: body.clone(),
            headers,
        })
    }
}
