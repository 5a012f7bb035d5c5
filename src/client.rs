//! HTTP transport for the Figma REST API
//!
//! Thin wrapper over the two endpoints the pipeline needs: the document
//! fetch and the batched image/export resolution. No policy lives here —
//! sanitization, deduplication and batching are the
//! [`resolver`](crate::resolver)'s job.

use crate::config::Config;
use crate::document::{FileResponse, ImagesResponse};
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use std::collections::HashMap;
use tracing::{debug, info};

/// Header carrying the personal access token
const TOKEN_HEADER: &str = "X-Figma-Token";

/// Rendered image format requested from the export endpoint
const IMAGE_FORMAT: &str = "png";

/// Client for the document and image endpoints.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct FigmaClient {
    http: reqwest::Client,
    base_url: String,
}

impl FigmaClient {
    /// Build a client from the API configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the token is not a valid header
    /// value, or [`Error::Other`] when the underlying HTTP client cannot
    /// be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let mut token = HeaderValue::from_str(&config.api.api_token).map_err(|_| Error::Config {
            message: "API token contains characters not allowed in a header".to_string(),
            key: Some("api_token".to_string()),
        })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);

        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout)
            .user_agent(concat!("figma-dl/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.api.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full document tree.
    ///
    /// # Errors
    ///
    /// [`Error::Network`] on transport failure, [`Error::Api`] on a
    /// non-success status, [`Error::Serialization`] when the body is not
    /// the expected shape. All of these abort the run.
    pub async fn get_file(&self, file_key: &str) -> Result<FileResponse> {
        let url = format!("{}/files/{file_key}", self.base_url);
        info!(file_key, "fetching document");

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        info!(bytes = body.len(), "retrieved document");

        Ok(serde_json::from_slice(&body)?)
    }

    /// Resolve a batch of ids to rendered-image URLs.
    ///
    /// Issues a single `GET /images/{file_key}` with the ids joined by
    /// commas, `format=png`, and the given scale when present. The caller
    /// owns batching; this method sends exactly what it is given.
    ///
    /// A `null` or missing entry in the returned map is a per-id miss the
    /// caller handles; only transport-level problems are errors here.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`get_file`](Self::get_file).
    pub async fn get_image_urls(
        &self,
        file_key: &str,
        ids: &[String],
        scale: Option<f64>,
    ) -> Result<HashMap<String, Option<String>>> {
        let url = format!("{}/images/{file_key}", self.base_url);
        debug!(file_key, ids = ids.len(), ?scale, "resolving image urls");

        let mut query: Vec<(&str, String)> = vec![
            ("ids", ids.join(",")),
            ("format", IMAGE_FORMAT.to_string()),
        ];
        if let Some(scale) = scale {
            query.push(("scale", scale.to_string()));
        }

        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                url,
            });
        }

        let body: ImagesResponse = response.json().await?;
        if let Some(err) = &body.err {
            debug!(err = %err, "image endpoint reported a server-side note");
        }

        Ok(body.images)
    }
}
