// Social video downloader backend

pub mod cli;
pub mod config;
pub mod downloader;
pub mod handlers;
pub mod logging;
pub mod processing;
pub mod server;
pub mod users;

use cli::Args;
use config::AppConfig;

/// Load config, apply CLI overrides, serve until Ctrl-C
pub async fn run(args: Args) -> anyhow::Result<()> {
    logging::init_tracing(args.verbose)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);
    tracing::debug!(?config, "configuration loaded");

    server::run_server(config).await
}
