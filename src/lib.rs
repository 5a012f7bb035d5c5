//! # figma-dl
//!
//! Library for discovering and downloading image assets from a Figma
//! document: embedded raster images (fills, strokes, effects) and
//! exportable composite nodes (components, icon-sized frames and groups).
//!
//! ## Design Philosophy
//!
//! figma-dl is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Observable** - Discards, truncations, and per-item outcomes surface
//!   as typed events, not just log lines
//! - **Forgiving where it should be** - A reference the API will not
//!   render, or one unreachable URL, costs a diagnostic, never the run
//! - **Strict where it must be** - Missing configuration and transport
//!   failures fail fast
//!
//! ## Quick Start
//!
//! ```no_run
//! use figma_dl::{Config, FigmaDownloader};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads FIGMA_API_TOKEN, FIGMA_FILE_KEY, DOWNLOAD_PATH
//!     let config = Config::from_env()?;
//!
//!     let downloader = FigmaDownloader::new(config).await?;
//!
//!     // Subscribe to diagnostics
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader.run().await?;
//!     println!("downloaded {} of {}", summary.downloaded, summary.total_discovered);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Node classification heuristics
pub mod classify;
/// HTTP transport for the Figma REST API
pub mod client;
/// Configuration types
pub mod config;
/// Remote document tree model
pub mod document;
/// Top-level download orchestration
pub mod downloader;
/// Error types
pub mod error;
/// Image download and collision-safe persistence
pub mod persister;
/// Batched reference resolution
pub mod resolver;
/// Core types and events
pub mod types;
/// Document tree traversal
pub mod walk;

// Re-export commonly used types
pub use client::FigmaClient;
pub use config::{ApiConfig, Config, DownloadConfig, DEFAULT_BASE_URL};
pub use document::{BoundingBox, DocumentNode, Effect, FileResponse, NodeType, Paint, PaintType};
pub use downloader::FigmaDownloader;
pub use error::{Error, Result};
pub use persister::ImagePersister;
pub use resolver::{Resolver, BATCH_CEILING};
pub use types::{DownloadableImage, Event, ExportableNode, ImageReference, RunSummary};
pub use walk::{walk, WalkOutcome};
