//! Fetching grid pages.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::config::GridConfig;
use crate::models::{GridRequest, GridResponse};
use crate::{Error, Result};

/// Sends a [`GridRequest`] to a grid endpoint.
///
/// Implementations report network failures and replies that are not a grid
/// envelope as [`Error::Transport`]. A `success: false` envelope is a
/// normal response, not an error.
pub trait GridTransport: Send + Sync {
    /// Fetches one page.
    fn fetch(&self, request: &GridRequest) -> impl Future<Output = Result<GridResponse>> + Send;
}

impl<T: GridTransport> GridTransport for Arc<T> {
    fn fetch(&self, request: &GridRequest) -> impl Future<Output = Result<GridResponse>> + Send {
        (**self).fetch(request)
    }
}

/// [`GridTransport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Creates a transport for the grid endpoint at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(endpoint: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("tablegrid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Self::with_client(client, endpoint)
    }

    /// Creates a transport using an existing client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the URL is invalid.
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| Error::Transport(format!("invalid endpoint '{endpoint}': {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(Error::Transport(format!(
                "invalid endpoint '{endpoint}': not a hierarchical URL"
            )));
        }
        Ok(Self { client, endpoint })
    }

    /// Returns the grid endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetches the configuration the server publishes for `table_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] on network failure or an unexpected
    /// reply, and [`Error::UnknownTable`] if the server rejects the id.
    pub async fn fetch_config(&self, table_id: &str) -> Result<GridConfig> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Transport(format!("invalid endpoint '{}'", self.endpoint)))?
            .pop_if_empty()
            .push("config");

        let response = self
            .client
            .get(url)
            .query(&[("table", table_id)])
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<GridResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| format!("HTTP {status}"));
            return Err(if status == reqwest::StatusCode::NOT_FOUND {
                Error::UnknownTable(table_id.to_string())
            } else {
                Error::Transport(message)
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("HTTP {status}: not a grid config: {e}")))
    }
}

impl GridTransport for HttpTransport {
    async fn fetch(&self, request: &GridRequest) -> Result<GridResponse> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        // Failure envelopes come with 4xx/5xx statuses; the body decides.
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Transport(format!("HTTP {status}: not a grid response: {e}")))
    }
}
