//! Certificate revocation checking over OCSP and CRL.
//!
//! Given a leaf certificate, `certstatus` resolves its issuer from the
//! Authority Information Access extension and asks either the OCSP responder
//! or the CRL distribution point the certificate advertises whether it has
//! been revoked.
//!
//! ```no_run
//! use certstatus::{check_ocsp, resolve_issuer, BlockingClient, Certificate, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BlockingClient::from_config(&Config::default())?;
//! let leaf = Certificate::from_file("certificate.pem")?;
//! let issuer = resolve_issuer(&client, &leaf)?;
//! let result = check_ocsp(&client, &leaf, &issuer)?;
//! certstatus::format::write_ocsp(&mut std::io::stdout(), &result)?;
//! # Ok(())
//! # }
//! ```

pub mod certificate;
pub mod config;
pub mod crl;
pub mod error;
pub mod format;
pub mod issuer;
pub mod ocsp;
pub mod reason;
pub mod timestamp;
pub mod transport;

pub use certificate::Certificate;
pub use config::{Config, ConfigError};
pub use crl::{check_crl, CrlResult, CrlStatus, RevokedEntry};
pub use error::{RevocationError, TransportError};
pub use issuer::resolve_issuer;
pub use ocsp::{check_ocsp, CertStatus, OcspResult};
pub use reason::RevocationReason;
pub use transport::{BlockingClient, HttpClient};
