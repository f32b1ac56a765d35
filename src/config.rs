use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing config file")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Config not valid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// True when no configuration could be read at all, as opposed to one
    /// that was read but rejected.
    pub fn is_missing(&self) -> bool {
        matches!(self, ConfigError::Missing { .. })
    }

    /// Missing, empty, non-object or out-of-range configuration. A file that
    /// fails to decode is a plain error instead.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Missing { .. } | ConfigError::Invalid(_))
    }
}

/// Repository visibility filter for `GET /orgs/{org}/repos`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepoType {
    #[default]
    All,
    Public,
    Private,
    Forks,
    Sources,
    Member,
    Internal,
}

impl fmt::Display for RepoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RepoType::All => "all",
            RepoType::Public => "public",
            RepoType::Private => "private",
            RepoType::Forks => "forks",
            RepoType::Sources => "sources",
            RepoType::Member => "member",
            RepoType::Internal => "internal",
        };
        f.write_str(value)
    }
}

/// Pull request state filter for `GET /repos/{org}/{repo}/pulls`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PullState {
    #[default]
    Open,
    Closed,
    All,
}

impl fmt::Display for PullState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            PullState::Open => "open",
            PullState::Closed => "closed",
            PullState::All => "all",
        };
        f.write_str(value)
    }
}

/// Settings for one collection run, read from `configs.json` (or a `.toml`
/// file) on every request.
///
/// `org`, `username` and `token` are required; everything else has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// API root, e.g. `https://api.github.com` or a GHES `/api/v3` URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Organization whose repositories are enumerated
    pub org: String,

    /// Basic auth username
    pub username: String,

    /// Basic auth secret (personal access token)
    pub token: String,

    #[serde(default = "default_per_page")]
    pub repos_per_page: u32,

    #[serde(default)]
    pub repos_type: RepoType,

    #[serde(default = "default_per_page")]
    pub pulls_per_page: u32,

    #[serde(default)]
    pub pulls_state: PullState,

    /// Upper bound on pages fetched for a single collection
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Repositories walked at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Budget for enumerating and aggregating the whole organization
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_base_url() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> u32 {
    30
}

fn default_max_pages() -> usize {
    1000
}

fn default_concurrency() -> usize {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_deadline_secs() -> u64 {
    300
}

impl Config {
    /// Load from a specific path. Files ending in `.toml` are parsed as TOML,
    /// everything else as JSON.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Missing {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let config = if is_toml {
            Self::from_toml(&contents)?
        } else {
            Self::from_json(&contents)?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_json(contents: &str) -> Result<Config, ConfigError> {
        // Decode to a Value first so an empty object or a non-object gets a
        // clearer message than serde's "missing field".
        let value: serde_json::Value = serde_json::from_str(contents)?;
        match value.as_object() {
            Some(map) if !map.is_empty() => {}
            Some(_) => return Err(ConfigError::Invalid("config is an empty object".to_string())),
            None => return Err(ConfigError::Invalid("config is not a JSON object".to_string())),
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_toml(contents: &str) -> Result<Config, ConfigError> {
        if contents.trim().is_empty() {
            return Err(ConfigError::Invalid("config file is empty".to_string()));
        }
        Ok(toml::from_str(contents)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("baseUrl must not be empty".to_string()));
        }
        if self.org.trim().is_empty() {
            return Err(ConfigError::Invalid("org must not be empty".to_string()));
        }
        for (name, value) in [
            ("reposPerPage", self.repos_per_page),
            ("pullsPerPage", self.pulls_per_page),
        ] {
            if !(1..=100).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be between 1 and 100, got {value}"
                )));
            }
        }
        if self.max_pages == 0 {
            return Err(ConfigError::Invalid("maxPages must be at least 1".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("requestTimeoutSecs must be at least 1".to_string()));
        }
        if self.deadline_secs == 0 {
            return Err(ConfigError::Invalid("deadlineSecs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// `base_url` without trailing slashes, ready for path concatenation.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}
