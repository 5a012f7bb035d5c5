//! Image persistence
//!
//! Fetches resolved images and writes them into the download directory
//! with collision-safe naming. A failed item is an error for that item
//! only; the orchestrator records it and moves on, so one dead URL never
//! aborts a batch.

use crate::error::{Error, Result};
use crate::types::DownloadableImage;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Upper bound on collision-suffix probes before giving up
const MAX_SUFFIX_ATTEMPTS: u32 = 9999;

/// Downloads resolved images and persists them to disk.
#[derive(Debug)]
pub struct ImagePersister {
    http: reqwest::Client,
    download_dir: PathBuf,
}

impl ImagePersister {
    /// Create a persister writing into `download_dir`, creating the
    /// directory if needed.
    ///
    /// The per-image `timeout` is the only bounded wait in the pipeline;
    /// document fetch and resolution use the request timeout configured on
    /// their own client.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the directory cannot be created, [`Error::Other`]
    /// when the HTTP client cannot be constructed.
    pub async fn new(download_dir: impl Into<PathBuf>, timeout: Duration) -> Result<Self> {
        let download_dir = download_dir.into();
        tokio::fs::create_dir_all(&download_dir).await?;
        info!(dir = %download_dir.display(), "download directory ready");

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("figma-dl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { http, download_dir })
    }

    /// Directory this persister writes into.
    #[must_use]
    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Fetch one image and write it to a uniquely named file.
    ///
    /// Returns the path the image was saved under.
    ///
    /// # Errors
    ///
    /// [`Error::Network`]/[`Error::Api`] when the fetch fails,
    /// [`Error::Io`] when the file cannot be written. Callers treat any of
    /// these as a single failed item.
    pub async fn download(&self, image: &DownloadableImage) -> Result<PathBuf> {
        match (&image.name, &image.id) {
            (Some(name), Some(id)) => {
                debug!(name = %name, id = %id, url = %image.url, "downloading exported node")
            }
            _ => debug!(url = %image.url, "downloading image"),
        }

        let response = self.http.get(&image.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url: image.url.clone(),
            });
        }
        let bytes = response.bytes().await?;

        let filename = filename_for(image);
        let path = self.write_unique(&filename, &bytes).await?;
        info!(path = %path.display(), bytes = bytes.len(), "image saved");
        Ok(path)
    }

    /// Write `bytes` under `filename`, probing `_1`, `_2`, ... suffixes on
    /// collision.
    ///
    /// `create_new` makes the probe-and-claim step atomic, so concurrent
    /// downloads (or an external writer) cannot land on the same path.
    async fn write_unique(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let mut candidate = filename.to_string();
        let mut counter = 0u32;

        loop {
            let path = self.download_dir.join(&candidate);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    use tokio::io::AsyncWriteExt;
                    file.write_all(bytes).await?;
                    file.flush().await?;
                    return Ok(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    counter += 1;
                    if counter > MAX_SUFFIX_ATTEMPTS {
                        return Err(Error::Other(format!(
                            "could not find a free filename for {filename} after {MAX_SUFFIX_ATTEMPTS} attempts"
                        )));
                    }
                    candidate = with_collision_suffix(filename, counter);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Derive the output filename for a resolved image.
///
/// Exported nodes use their sanitized layer name with a `.png` extension.
/// Plain bitmaps fall back to the percent-decoded basename of the URL
/// path; when that is empty or has no extension, a stable digest-derived
/// name is synthesized instead.
#[must_use]
pub fn filename_for(image: &DownloadableImage) -> String {
    match &image.name {
        Some(name) => format!("{}.png", sanitize_name(name)),
        None => filename_from_url(&image.url),
    }
}

/// Reduce a layer name to filesystem-safe characters.
///
/// Keeps ASCII alphanumerics, spaces, `-` and `_`, trims trailing
/// whitespace, then turns each remaining space into an underscore.
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    let filtered: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    filtered.trim_end().replace(' ', "_")
}

fn filename_from_url(url: &str) -> String {
    let basename = url::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .map(|segment| {
            urlencoding::decode(&segment)
                .map(|decoded| decoded.into_owned())
                .unwrap_or(segment)
        })
        .unwrap_or_default();

    if basename.is_empty() || !basename.contains('.') {
        fallback_name(url)
    } else {
        basename
    }
}

/// Synthesized name for URLs whose path carries no usable basename.
///
/// Derived from the URL's SHA-256 so the same URL always maps to the same
/// name across runs.
fn fallback_name(url: &str) -> String {
    let digest = Sha256::digest(url.as_bytes());
    let hex: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
    format!("image_{hex}.png")
}

fn with_collision_suffix(filename: &str, counter: u32) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{counter}.{ext}"),
        _ => format!("{filename}_{counter}"),
    }
}
