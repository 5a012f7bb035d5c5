//! Programmatic configuration instead of environment variables:
//! custom output directory, shorter download timeout, and four downloads
//! in flight at once.
//!
//! Run with: `cargo run --example custom_configuration`

use figma_dl::{ApiConfig, Config, DownloadConfig, FigmaDownloader};
use std::path::PathBuf;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .init();

    let config = Config {
        api: ApiConfig {
            api_token: std::env::var("FIGMA_API_TOKEN").unwrap_or_default(),
            file_key: std::env::var("FIGMA_FILE_KEY").unwrap_or_default(),
            ..ApiConfig::default()
        },
        download: DownloadConfig {
            download_dir: PathBuf::from("exported-assets"),
            download_timeout: Duration::from_secs(10),
            max_concurrent_downloads: 4,
        },
    };

    let downloader = FigmaDownloader::new(config).await?;
    let summary = downloader.run().await?;

    println!(
        "downloaded {}/{} images ({} failed) into exported-assets/",
        summary.downloaded, summary.total_discovered, summary.failed
    );

    Ok(())
}
