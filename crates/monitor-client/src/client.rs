//! HTTP client for the monitor API.

use crate::error::Error;
use crate::types::{HealthSnapshot, OptionsPayload};
use reqwest::Client;
use std::time::Duration;
use url::Url;

#[cfg(test)]
mod tests;

/// Environment variable holding the API base URL.
pub const API_BASE_ENV: &str = "API_BASE";

/// Default API base, the front server's proxied prefix.
pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:3000/api").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Builds a configuration whose base URL comes from `API_BASE`, falling
    /// back to [`DEFAULT_API_BASE`].
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            ..Default::default()
        }
    }
}

/// HTTP client for the options monitor API.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    client: Client,
    base_url: String,
}

impl MonitorClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, base_url })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the trade records endpoint.
    #[must_use]
    pub fn options_url(&self) -> String {
        format!("{}/options", self.base_url)
    }

    /// URL of the health endpoint.
    #[must_use]
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Fetches the full current trade record set.
    ///
    /// # Errors
    /// Returns error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn get_options(&self) -> Result<OptionsPayload, Error> {
        let resp = self.client.get(self.options_url()).send().await?;
        self.handle_response(resp).await
    }

    /// Fetches the backend health snapshot.
    ///
    /// # Errors
    /// Returns error on transport failure, a non-success status, or an
    /// undecodable body.
    pub async fn get_health(&self) -> Result<HealthSnapshot, Error> {
        let resp = self.client.get(self.health_url()).send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status.is_success() {
            let bytes = resp.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        } else if status.as_u16() == 404 {
            let text = resp.text().await.unwrap_or_default();
            Err(Error::NotFound(text))
        } else {
            let message = match resp.text().await {
                Ok(text) if !text.is_empty() => text,
                _ => status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
            };
            Err(Error::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
