//! HTTP transport used to reach issuer, OCSP and CRL endpoints.
//!
//! The checkers never talk to the network directly; they receive an
//! [`HttpClient`] so tests can substitute fixture-backed implementations.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::TransportError;

/// Default timeout applied to every request, in seconds.
pub const DEFAULT_TIMEOUT: u64 = 30;

/// Default upper bound for any response body (10 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 10 * 1024 * 1024;

/// Fetches resources over HTTP.
pub trait HttpClient {
    /// Performs a GET request and returns the full response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError>;

    /// Performs a POST request carrying `body` and returns the full response body.
    fn post(
        &self,
        url: &str,
        content_type: &str,
        accept: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError>;
}

/// [`HttpClient`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct BlockingClient {
    client: Client,
    max_response_bytes: usize,
}

impl BlockingClient {
    /// Builds a client with an explicit timeout, user agent and body limit.
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        max_response_bytes: usize,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Request {
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(BlockingClient {
            client,
            max_response_bytes,
        })
    }

    /// Builds a client from the merged configuration.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Self::new(
            Duration::from_secs(config.timeout.unwrap_or(DEFAULT_TIMEOUT)),
            config
                .user_agent
                .as_deref()
                .unwrap_or(concat!("certstatus/", env!("CARGO_PKG_VERSION"))),
            config
                .max_response_bytes
                .unwrap_or(DEFAULT_MAX_RESPONSE_BYTES),
        )
    }

    /// Reads the whole body, bounded by the configured limit.
    ///
    /// The response is consumed on every path, which releases the connection.
    fn read_body(&self, url: &str, response: Response) -> Result<Vec<u8>, TransportError> {
        let response = response.error_for_status()?;

        if let Some(len) = response.content_length() {
            if len > self.max_response_bytes as u64 {
                return Err(TransportError::TooLarge {
                    limit: self.max_response_bytes,
                });
            }
        }

        let mut body = Vec::new();
        response
            .take(self.max_response_bytes as u64 + 1)
            .read_to_end(&mut body)
            .map_err(|e| TransportError::Body {
                reason: e.to_string(),
            })?;

        if body.len() > self.max_response_bytes {
            return Err(TransportError::TooLarge {
                limit: self.max_response_bytes,
            });
        }

        debug!(url, bytes = body.len(), "fetched response body");
        Ok(body)
    }
}

impl HttpClient for BlockingClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        debug!(url, "HTTP GET");
        let response = self.client.get(parse_url(url)?).send()?;
        self.read_body(url, response)
    }

    fn post(
        &self,
        url: &str,
        content_type: &str,
        accept: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        debug!(url, content_type, bytes = body.len(), "HTTP POST");
        let response = self
            .client
            .post(parse_url(url)?)
            .header(CONTENT_TYPE, content_type)
            .header(ACCEPT, accept)
            .body(body.to_vec())
            .send()?;
        self.read_body(url, response)
    }
}

/// Only plain HTTP(S) URLs are fetched; LDAP and similar CRL locations are refused.
fn parse_url(url: &str) -> Result<Url, TransportError> {
    let parsed = Url::parse(url).map_err(|e| TransportError::Request {
        reason: format!("invalid URL '{}': {}", url, e),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(TransportError::Request {
            reason: format!("unsupported URL scheme '{}'", scheme),
        }),
    }
}
