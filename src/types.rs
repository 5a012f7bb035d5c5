//! Core types and events for figma-dl

use crate::document::{DocumentNode, NodeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque token identifying a bitmap asset embedded in fills, strokes or
/// effects.
///
/// The export API only accepts tokens containing at least one `:` or `-`
/// separator; [`ImageReference::has_separator`] is the resolver's
/// sanitization check.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    /// Wrap a raw reference token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the raw token
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the raw token
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// True when the token contains a `:` or `-` separator.
    ///
    /// Tokens without one are rejected by the export API with HTTP 400, so
    /// the resolver discards them up front.
    #[must_use]
    pub fn has_separator(&self) -> bool {
        self.0.contains(':') || self.0.contains('-')
    }
}

impl From<&str> for ImageReference {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl std::fmt::Display for ImageReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Projection of a node judged exportable as a standalone rasterized unit.
///
/// Independent of the source tree after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportableNode {
    /// Remote node id
    pub id: String,
    /// Layer name, later used for the output filename
    pub name: String,
    /// Node type at classification time
    pub node_type: NodeType,
}

impl ExportableNode {
    /// Project the exportable fields out of a document node.
    pub fn from_node(node: &DocumentNode) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            node_type: node.node_type,
        }
    }

    /// True when the id contains a `:` or `-` separator (see
    /// [`ImageReference::has_separator`]).
    #[must_use]
    pub fn has_separator(&self) -> bool {
        self.id.contains(':') || self.id.contains('-')
    }
}

/// A resolved, downloadable image record.
///
/// `name` and `id` are populated only when the record was derived from an
/// [`ExportableNode`] (export path); plain bitmap references carry the URL
/// alone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadableImage {
    /// Download URL
    pub url: String,
    /// Source node name (export path only)
    pub name: Option<String>,
    /// Source node id (export path only)
    pub id: Option<String>,
}

impl DownloadableImage {
    /// Record for a plain bitmap reference
    pub fn bitmap(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: None,
            id: None,
        }
    }

    /// Record for an exported node
    pub fn export(url: impl Into<String>, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            name: Some(name.into()),
            id: Some(id.into()),
        }
    }
}

/// Diagnostic events emitted during a run.
///
/// Subscribe via [`FigmaDownloader::subscribe`](crate::FigmaDownloader::subscribe).
/// Every event is also mirrored to `tracing`; the channel exists so callers
/// can observe discards and per-item outcomes without parsing log output.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    /// A bitmap reference was discarded because it lacks a `:`/`-` separator
    InvalidReferenceSkipped {
        /// The rejected token
        reference: String,
    },

    /// An exportable node was discarded because its id lacks a separator
    InvalidNodeSkipped {
        /// The rejected node id
        id: String,
        /// The node's layer name
        name: String,
    },

    /// More exportable nodes were discovered than one export call accepts;
    /// everything past the ceiling was dropped
    ExportBatchTruncated {
        /// Nodes discovered by the walk
        total: usize,
        /// Nodes kept for the export call
        kept: usize,
    },

    /// A successful resolution response carried no URL for this id
    UrlUnavailable {
        /// The id the server did not render
        id: String,
    },

    /// An image was fetched and written to disk
    ImageDownloaded {
        /// Source URL
        url: String,
        /// Final path on disk
        path: PathBuf,
    },

    /// An image could not be fetched or written; the run continues
    ImageFailed {
        /// Source URL
        url: String,
        /// Failure description
        error: String,
    },
}

/// Aggregate outcome of one download run.
///
/// Serializable so consumers can emit a machine-readable summary next to
/// the logged counts.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    /// Downloadable records discovered (both paths combined)
    pub total_discovered: usize,
    /// Images written to disk
    pub downloaded: usize,
    /// Images that failed to download or persist
    pub failed: usize,
    /// Run start time
    pub started_at: DateTime<Utc>,
    /// Run finish time
    pub finished_at: DateTime<Utc>,
}
