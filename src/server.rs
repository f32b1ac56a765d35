use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::config::{Config, ConfigError};
use crate::github::{self, AggregateResult, GithubError, HttpFetcher};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Github(#[from] GithubError),
}

impl AppError {
    /// 404 for "nothing to do" conditions, 400 for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::BAD_REQUEST,
            AppError::Github(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Github(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::NOT_FOUND {
            match &self {
                AppError::Config(ConfigError::Missing { path, source }) => {
                    warn!(path = %path.display(), error = %source, "no configuration found")
                }
                _ => warn!(error = %self, "nothing to report"),
            }
            self.to_string()
        } else {
            error!(error = %self, "collection failed");
            format!("Error: {self}")
        };
        (status, body).into_response()
    }
}

/// Shared across requests. The config file is re-read on every request so
/// edits take effect without a restart.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config_path: Arc<PathBuf>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path: Arc::new(config_path),
            client: reqwest::Client::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/prs", get(list_pull_requests))
        .with_state(state)
}

/// `GET /prs`: every pull request in the configured organization.
#[instrument(skip_all)]
pub async fn list_pull_requests(
    State(state): State<AppState>,
) -> Result<Json<AggregateResult>, AppError> {
    let config = Config::load_from(&state.config_path)?;
    let fetcher = HttpFetcher::new(state.client.clone(), config.request_timeout());

    let result = github::collect_org_pulls(&fetcher, &config).await?;
    info!(
        repositories = result.repositories.len(),
        pulls = result.total_pulls(),
        "serving pull requests"
    );
    Ok(Json(result))
}
