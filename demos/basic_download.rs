//! Minimal end-to-end run driven entirely by environment variables.
//!
//! Reads `FIGMA_API_TOKEN`, `FIGMA_FILE_KEY` and optionally
//! `DOWNLOAD_PATH` (from the environment or a `.env` file), downloads
//! every discovered image, and prints a JSON summary.
//!
//! Run with: `cargo run --example basic_download`

use figma_dl::{Config, FigmaDownloader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let downloader = FigmaDownloader::new(config).await?;

    // Surface diagnostics (discarded references, truncation, per-image
    // failures) as they happen.
    let mut events = downloader.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("event: {event:?}");
        }
    });

    let summary = downloader.run().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
