//! Top-level download orchestration
//!
//! [`FigmaDownloader`] wires the pipeline together: fetch the document,
//! walk and classify it, resolve references to URLs, and persist every
//! resolved image. Data flows strictly forward; no stage depends on a
//! later one's output.

use crate::client::FigmaClient;
use crate::config::Config;
use crate::error::Result;
use crate::persister::ImagePersister;
use crate::resolver::Resolver;
use crate::types::{Event, RunSummary};
use chrono::Utc;
use futures::StreamExt;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Capacity of the diagnostic event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestrates one complete discover-resolve-download run.
#[derive(Debug)]
pub struct FigmaDownloader {
    config: Config,
    client: FigmaClient,
    resolver: Resolver,
    persister: ImagePersister,
    event_tx: broadcast::Sender<Event>,
}

impl FigmaDownloader {
    /// Build a downloader from configuration.
    ///
    /// Validates the configuration first: a missing token or file key is a
    /// fatal [`Error::Config`](crate::Error::Config) raised before any
    /// network traffic. Creates the download directory.
    ///
    /// # Errors
    ///
    /// Configuration, client-construction, or directory-creation failures.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let client = FigmaClient::new(&config)?;
        let resolver = Resolver::new(client.clone(), event_tx.clone());
        let persister = ImagePersister::new(
            config.download.download_dir.clone(),
            config.download.download_timeout,
        )
        .await?;

        Ok(Self {
            config,
            client,
            resolver,
            persister,
            event_tx,
        })
    }

    /// Subscribe to diagnostic events for subsequent runs.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Execute one full run against the configured document.
    ///
    /// The document fetch and the resolution calls are sequential and
    /// single-shot; their transport failures abort the run. Individual
    /// image downloads run with up to `max_concurrent_downloads` in
    /// flight, and a failed item only increments the failure counter.
    /// Counters are exact: the stream is consumed by this single task.
    ///
    /// # Errors
    ///
    /// Document fetch or resolution transport failures.
    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let file_key = &self.config.api.file_key;
        info!(file_key, "starting download run");

        let file = self.client.get_file(file_key).await?;
        info!(document = %file.name, "document retrieved");

        let images = self
            .resolver
            .collect_downloadables(file_key, &file.document)
            .await?;
        info!(total = images.len(), "images to download");

        let concurrency = self.config.download.max_concurrent_downloads.max(1);
        let mut downloads = futures::stream::iter(images.iter().map(|image| async move {
            (image, self.persister.download(image).await)
        }))
        .buffer_unordered(concurrency);

        let mut downloaded = 0usize;
        let mut failed = 0usize;
        while let Some((image, result)) = downloads.next().await {
            match result {
                Ok(path) => {
                    downloaded += 1;
                    self.emit(Event::ImageDownloaded {
                        url: image.url.clone(),
                        path,
                    });
                }
                Err(e) => {
                    failed += 1;
                    error!(url = %image.url, error = %e, "image download failed");
                    self.emit(Event::ImageFailed {
                        url: image.url.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        drop(downloads);

        let summary = RunSummary {
            total_discovered: images.len(),
            downloaded,
            failed,
            started_at,
            finished_at: Utc::now(),
        };

        if summary.total_discovered == 0 {
            warn!("run completed without discovering any images");
        }
        info!(
            total = summary.total_discovered,
            downloaded = summary.downloaded,
            failed = summary.failed,
            "download run complete"
        );

        Ok(summary)
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
