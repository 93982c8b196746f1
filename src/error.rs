//! Error types for certificate revocation checking.
//!
//! Every component of the checker returns a [`RevocationError`] rather than a
//! generic I/O error, so the command line layer is the only place that turns a
//! failure into text and an exit code.

use std::fmt;
use std::io;

/// Failure of a single HTTP exchange with a remote peer.
///
/// Produced by [`crate::transport::HttpClient`] implementations. Always a
/// connectivity problem, never a statement about the data itself.
#[derive(Debug)]
pub enum TransportError {
    /// The request could not be sent or no response arrived (DNS, connect, timeout)
    Request {
        /// Description of the underlying failure
        reason: String,
    },

    /// The peer answered with a non-success HTTP status
    Status {
        /// The HTTP status code received
        code: u16,
    },

    /// The response body could not be read
    Body {
        /// Description of the underlying failure
        reason: String,
    },

    /// The response body exceeded the configured limit
    TooLarge {
        /// The configured limit in bytes
        limit: usize,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { reason } => write!(f, "request failed: {}", reason),
            Self::Status { code } => write!(f, "unexpected HTTP status {}", code),
            Self::Body { reason } => write!(f, "failed to read response body: {}", reason),
            Self::TooLarge { limit } => write!(f, "response body exceeds {} bytes", limit),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::Status {
                code: status.as_u16(),
            };
        }
        if e.is_body() || e.is_decode() {
            return Self::Body {
                reason: e.to_string(),
            };
        }
        Self::Request {
            reason: e.to_string(),
        }
    }
}

/// Error type for revocation checking failures.
///
/// None of these are retried internally; each one ends the current operation.
#[derive(Debug)]
pub enum RevocationError {
    /// The input carried PEM armor with a label other than `CERTIFICATE`
    NotACertificate {
        /// The PEM label that was found
        label: String,
    },

    /// The input could not be decoded as an X.509 certificate
    MalformedCertificate {
        /// Description of what went wrong
        reason: String,
    },

    /// The certificate carries no CA issuer URLs
    NoIssuerURLs,

    /// None of the CA issuer URLs could be fetched
    NoReachableIssuer {
        /// How many URLs were tried
        attempted: usize,
    },

    /// The certificate advertises no OCSP responder
    NoOCSPServers,

    /// The certificate advertises no CRL distribution point
    NoCRLDistributionPoints,

    /// A remote peer could not be reached or answered with an error
    TransportFailure {
        /// The URL that failed
        url: String,
        /// The underlying transport error
        source: TransportError,
    },

    /// The OCSP response is structurally invalid or improperly signed
    MalformedResponse {
        /// Description of what went wrong
        reason: String,
    },

    /// The CRL could not be parsed
    MalformedCRL {
        /// Description of what went wrong
        reason: String,
    },

    /// The certificate file could not be read
    Io {
        /// The path that failed to read
        path: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// OpenSSL failed on locally built data
    OpenSSLError {
        /// The underlying OpenSSL error
        details: String,
    },
}

impl RevocationError {
    /// Returns `true` for failures caused by connectivity rather than by the
    /// content of a response.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::TransportFailure { .. } | Self::NoReachableIssuer { .. }
        )
    }
}

impl fmt::Display for RevocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotACertificate { label } => {
                write!(f, "no certificate: found PEM block '{}'", label)
            }
            Self::MalformedCertificate { reason } => {
                write!(f, "malformed certificate: {}", reason)
            }
            Self::NoIssuerURLs => write!(f, "no issuer certificate URLs found"),
            Self::NoReachableIssuer { attempted } => {
                write!(
                    f,
                    "no issuer certificate: all {} issuer URLs were unreachable",
                    attempted
                )
            }
            Self::NoOCSPServers => write!(f, "no OCSP servers found"),
            Self::NoCRLDistributionPoints => write!(f, "no CRL distribution points found"),
            Self::TransportFailure { url, source } => {
                write!(f, "failed to fetch {}: {}", url, source)
            }
            Self::MalformedResponse { reason } => {
                write!(f, "malformed OCSP response: {}", reason)
            }
            Self::MalformedCRL { reason } => write!(f, "malformed CRL: {}", reason),
            Self::Io { path, source } => {
                write!(f, "failed to read certificate {}: {}", path, source)
            }
            Self::OpenSSLError { details } => write!(f, "OpenSSL error: {}", details),
        }
    }
}

impl std::error::Error for RevocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TransportFailure { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<openssl::error::ErrorStack> for RevocationError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSLError {
            details: e.to_string(),
        }
    }
}
