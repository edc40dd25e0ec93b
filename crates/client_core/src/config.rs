use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Backend address used for local development.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("backend url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

/// Everything the conversion client needs to reach the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    backend_base_url: Url,
    request_timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(backend_base_url: &str) -> Result<Self, ConfigError> {
        let raw = backend_base_url.trim();
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
            url: raw.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw.to_string()));
        }

        Ok(Self {
            backend_base_url: url,
            request_timeout: None,
        })
    }

    /// Applies a per-request timeout. Without one a stalled backend keeps
    /// the conversion in flight indefinitely.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn backend_base_url(&self) -> &Url {
        &self.backend_base_url
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.backend_base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
