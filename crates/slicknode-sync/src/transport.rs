//! Bundle transport
//!
//! The engine downloads bundles through the narrow [`Transport`] interface;
//! the HTTP implementation is the only network code in the crate. Retry
//! policy, if any, belongs to the transport, never to the engine.

use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a bundle
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("HTTP {status} for URL: {url}")]
    Status { status: u16, url: String },

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Response larger than the configured limit
    #[error("Bundle too large: {size} bytes (max: {max})")]
    TooLarge { size: u64, max: u64 },

    /// IO error while reading the response body
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Maximum bundle size (100 MB)
pub const MAX_BUNDLE_SIZE: u64 = 100 * 1024 * 1024;

/// HTTP request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches raw bytes from a URL
pub trait Transport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError>;
}

/// Blocking HTTP transport
pub struct HttpTransport {
    client: Client,
    max_size: u64,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("slicknode-sync/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            max_size: MAX_BUNDLE_SIZE,
        }
    }

    /// Create a transport with a custom response size limit
    pub fn with_max_size(max_size: u64) -> Self {
        let mut transport = Self::new();
        transport.max_size = max_size;
        transport
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let parsed = url::Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(TransportError::InvalidUrl(url.to_string()));
        }

        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(TransportError::TooLarge {
                    size: len,
                    max: self.max_size,
                });
            }
        }

        // Read with a hard limit; Content-Length is not always present
        let mut content = Vec::new();
        let mut reader = response.take(self.max_size + 1);
        reader.read_to_end(&mut content)?;

        if content.len() as u64 > self.max_size {
            return Err(TransportError::TooLarge {
                size: content.len() as u64,
                max: self.max_size,
            });
        }

        Ok(content)
    }
}
