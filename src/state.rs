//! Application state management.

use crate::config::Config;
use reqwest::Client;
use reqwest::redirect::Policy;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// HTTP client used to forward requests to the backend.
    pub http: Client,
    /// Backend origin, e.g. `http://localhost:5000`.
    pub backend_origin: String,
}

impl AppState {
    /// Creates the state from configuration.
    ///
    /// # Errors
    /// Returns error if the proxy HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        // Redirects are relayed to the browser, never followed here.
        let mut builder = Client::builder().redirect(Policy::none()).no_proxy();
        if let Some(timeout) = config.backend.timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            backend_origin: config.backend.origin(),
            config,
            http,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_default_config() {
        let state = AppState::new(Config::default()).expect("client builds");
        assert_eq!(state.backend_origin, "http://localhost:5000");
    }

    #[test]
    fn test_state_with_timeout() {
        let mut config = Config::default();
        config.backend.timeout_ms = 250;
        config.backend.port = 5050;

        let state = AppState::new(config).expect("client builds");
        assert_eq!(state.backend_origin, "http://localhost:5050");
    }
}
