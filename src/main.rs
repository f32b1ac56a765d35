mod config;
mod github;
mod server;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// org-pulls — HTTP service that lists every pull request across all
/// repositories of a GitHub organization at `GET /prs`.
#[derive(Parser, Debug)]
#[command(name = "org-pulls", version, about)]
struct Cli {
    /// Configuration file, JSON or `.toml`. Re-read on every request.
    #[arg(short, long, default_value = "configs.json")]
    config: PathBuf,

    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    listen: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Only a startup hint; each request loads and validates on its own.
    match config::Config::load_from(&cli.config) {
        Ok(_) => {}
        Err(e) if e.is_missing() => {
            warn!(path = %cli.config.display(), "configuration file not found yet")
        }
        Err(e) => warn!(path = %cli.config.display(), error = %e, "configuration not usable yet"),
    }

    let app = server::router(server::AppState::new(cli.config));
    let listener = tokio::net::TcpListener::bind(cli.listen).await?;
    info!(address = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
