//! Reference resolution against the batched export endpoint
//!
//! Turns the walker's raw output into downloadable records via two
//! independent paths:
//!
//! - **Bitmap path**: plain `imageRef` tokens from fills/strokes/effects,
//!   resolved with `format=png` and no scale
//! - **Export path**: exportable nodes rasterized whole, resolved with
//!   `format=png&scale=2`
//!
//! The paths carry different query parameters and are never merged into one
//! request. Each issues at most one batched call per run; the export path
//! truncates to the API's 100-id ceiling and drops the remainder, which is
//! accepted information loss, not an error. Only transport-level failures
//! propagate; per-id misses and filtered ids degrade to diagnostics.

use crate::client::FigmaClient;
use crate::document::DocumentNode;
use crate::error::Result;
use crate::types::{DownloadableImage, Event, ExportableNode, ImageReference};
use crate::walk::walk;
use std::collections::BTreeSet;
use tokio::sync::broadcast;
use tracing::{info, warn};

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

/// Maximum ids the export endpoint accepts in one call
pub const BATCH_CEILING: usize = 100;

/// Render scale for whole-node exports (bitmap references use the server
/// default and send no scale at all)
const EXPORT_SCALE: f64 = 2.0;

/// Resolves references and exportable nodes to downloadable URLs.
#[derive(Debug)]
pub struct Resolver {
    client: FigmaClient,
    events: broadcast::Sender<Event>,
}

impl Resolver {
    /// Create a resolver over the given transport and diagnostic channel.
    pub fn new(client: FigmaClient, events: broadcast::Sender<Event>) -> Self {
        Self { client, events }
    }

    /// Walk the document and resolve everything it yields.
    ///
    /// Bitmap results come before export results in the returned sequence.
    /// A path whose input is empty is skipped entirely (no API call). An
    /// empty combined result is a valid outcome and only logged as a
    /// warning.
    ///
    /// # Errors
    ///
    /// Propagates transport-level failures from whichever resolution call
    /// raised them; per-id misses never error.
    pub async fn collect_downloadables(
        &self,
        file_key: &str,
        document: &DocumentNode,
    ) -> Result<Vec<DownloadableImage>> {
        let outcome = walk(document);
        info!(
            image_refs = outcome.image_refs.len(),
            exportable_nodes = outcome.exportable_nodes.len(),
            "classified document tree"
        );

        let mut images = Vec::new();

        if !outcome.image_refs.is_empty() {
            images.extend(self.resolve_bitmaps(file_key, &outcome.image_refs).await?);
        }

        if !outcome.exportable_nodes.is_empty() {
            images.extend(
                self.resolve_exports(file_key, &outcome.exportable_nodes)
                    .await?,
            );
        }

        if images.is_empty() {
            warn!("no downloadable images discovered in document");
        }

        Ok(images)
    }

    /// Resolve plain bitmap references to download URLs.
    ///
    /// Filters out tokens without a `:`/`-` separator (the API rejects
    /// them with HTTP 400), deduplicates by exact value, and issues one
    /// batched request for whatever remains. Nothing remaining means no
    /// request at all.
    ///
    /// # Errors
    ///
    /// Transport-level failures only.
    pub async fn resolve_bitmaps(
        &self,
        file_key: &str,
        refs: &[ImageReference],
    ) -> Result<Vec<DownloadableImage>> {
        info!(total = refs.len(), "resolving bitmap references");

        // Dedup through an ordered set: stable for a given input set and
        // deterministic for the request body, though not input-ordered.
        let mut unique: BTreeSet<&ImageReference> = BTreeSet::new();
        for reference in refs {
            if reference.has_separator() {
                unique.insert(reference);
            } else {
                warn!(reference = %reference, "discarding image reference without separator");
                self.emit(Event::InvalidReferenceSkipped {
                    reference: reference.as_str().to_string(),
                });
            }
        }

        if unique.is_empty() {
            warn!("no valid image references left after filtering");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = unique.iter().map(|r| r.as_str().to_string()).collect();
        info!(unique = ids.len(), "requesting bitmap urls");

        let urls = self.client.get_image_urls(file_key, &ids, None).await?;

        let mut images = Vec::new();
        for id in &ids {
            match urls.get(id).cloned().flatten().filter(|u| !u.is_empty()) {
                Some(url) => images.push(DownloadableImage::bitmap(url)),
                None => {
                    warn!(reference = %id, "no url returned for image reference");
                    self.emit(Event::UrlUnavailable { id: id.clone() });
                }
            }
        }

        info!(resolved = images.len(), "bitmap references resolved");
        Ok(images)
    }

    /// Resolve exportable nodes to rendered-image URLs.
    ///
    /// Keeps the first [`BATCH_CEILING`] nodes in discovery order (the
    /// remainder is dropped with a diagnostic), filters ids without a
    /// separator, and issues one batched request at scale 2.
    ///
    /// # Errors
    ///
    /// Transport-level failures only.
    pub async fn resolve_exports(
        &self,
        file_key: &str,
        nodes: &[ExportableNode],
    ) -> Result<Vec<DownloadableImage>> {
        info!(total = nodes.len(), "resolving exportable nodes");

        let kept = &nodes[..nodes.len().min(BATCH_CEILING)];
        if nodes.len() > BATCH_CEILING {
            warn!(
                total = nodes.len(),
                kept = kept.len(),
                "export batch exceeds the API ceiling, dropping the remainder"
            );
            self.emit(Event::ExportBatchTruncated {
                total: nodes.len(),
                kept: kept.len(),
            });
        }

        let valid: Vec<&ExportableNode> = kept
            .iter()
            .filter(|node| {
                if node.has_separator() {
                    true
                } else {
                    warn!(id = %node.id, name = %node.name, "discarding node id without separator");
                    self.emit(Event::InvalidNodeSkipped {
                        id: node.id.clone(),
                        name: node.name.clone(),
                    });
                    false
                }
            })
            .collect();

        if valid.is_empty() {
            warn!("no valid exportable nodes left after filtering");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = valid.iter().map(|node| node.id.clone()).collect();
        let urls = self
            .client
            .get_image_urls(file_key, &ids, Some(EXPORT_SCALE))
            .await?;

        let mut images = Vec::new();
        for node in valid {
            match urls
                .get(&node.id)
                .cloned()
                .flatten()
                .filter(|u| !u.is_empty())
            {
                Some(url) => images.push(DownloadableImage::export(url, &*node.name, &*node.id)),
                None => {
                    warn!(id = %node.id, name = %node.name, "no url returned for exportable node");
                    self.emit(Event::UrlUnavailable {
                        id: node.id.clone(),
                    });
                }
            }
        }

        info!(resolved = images.len(), "exportable nodes resolved");
        Ok(images)
    }

    // Lagging or absent receivers are fine; diagnostics are best-effort.
    fn emit(&self, event: Event) {
        self.events.send(event).ok();
    }
}
