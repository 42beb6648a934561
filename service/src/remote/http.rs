//! HTTP implementation of the remote source.

use std::time::Duration;

use quotesync_engine::Collection;
use reqwest::Client;

use super::{fallback_collection, map_remote_payload, RemoteSource};
use crate::error::TransportError;

/// Remote endpoint reached over HTTP: `GET` to pull, `POST` to push.
///
/// Each request is a single attempt bounded by the client timeout; there are
/// no retries beyond the next scheduled sync.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    client: Client,
    url: String,
}

impl HttpRemote {
    /// Create an adapter for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotesync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn try_fetch(&self) -> Result<Collection, TransportError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }

        let body = response.text().await?;
        map_remote_payload(&body)
    }

    async fn try_push(&self, collection: &Collection) -> Result<(), TransportError> {
        let response = self.client.post(&self.url).json(collection).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status));
        }
        Ok(())
    }
}

impl RemoteSource for HttpRemote {
    async fn fetch_remote(&self) -> Collection {
        match self.try_fetch().await {
            Ok(collection) => {
                tracing::debug!(url = %self.url, quotes = collection.len(), "Fetched remote quotes");
                collection
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Remote fetch failed, using fallback quotes");
                fallback_collection()
            }
        }
    }

    async fn push_local(&self, collection: &Collection) -> bool {
        match self.try_push(collection).await {
            Ok(()) => {
                tracing::debug!(url = %self.url, quotes = collection.len(), "Pushed local quotes");
                true
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Push to remote failed");
                false
            }
        }
    }
}
