// Binary entry point

use clap::Parser;

use social_downloader_lib::cli::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    social_downloader_lib::run(Args::parse()).await
}
