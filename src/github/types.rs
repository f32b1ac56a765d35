use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A repository in the configured organization, addressed by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RepositoryRef {
    pub name: String,
}

impl RepositoryRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// One fetched page of a paginated collection.
#[derive(Debug, Clone)]
pub struct Page {
    /// Raw records in upstream order
    pub records: Vec<Value>,
    /// Absolute URL of the following page, if any
    pub next: Option<String>,
}

/// Every pull request of one repository, concatenated across pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PullRequestSet {
    pub repository: RepositoryRef,
    pub pulls: Vec<Value>,
}

/// Pull requests for the whole organization, in enumeration order.
/// Serializes as a JSON array of `{"repository", "pulls"}` objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateResult {
    pub repositories: Vec<PullRequestSet>,
}

impl AggregateResult {
    pub fn total_pulls(&self) -> usize {
        self.repositories.iter().map(|set| set.pulls.len()).sum()
    }
}
