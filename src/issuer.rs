//! Resolving the issuing CA certificate of a leaf certificate.

use tracing::{info, warn};

use crate::certificate::Certificate;
use crate::error::RevocationError;
use crate::transport::HttpClient;

/// Fetches the certificate of the CA that issued `cert`.
///
/// The CA issuer URLs are tried in the order the certificate lists them and
/// the first fetched certificate wins. An unreachable URL is skipped, but a
/// body that does not decode as a certificate aborts resolution with the
/// loader's error.
pub fn resolve_issuer(
    client: &dyn HttpClient,
    cert: &Certificate,
) -> Result<Certificate, RevocationError> {
    let urls = cert.issuer_urls();
    if urls.is_empty() {
        return Err(RevocationError::NoIssuerURLs);
    }

    for url in urls {
        let body = match client.get(url) {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "skipping unreachable issuer URL");
                continue;
            }
        };

        let issuer = Certificate::from_bytes(&body)?;
        info!(url = %url, issuer = %issuer.subject(), "resolved issuer certificate");
        return Ok(issuer);
    }

    Err(RevocationError::NoReachableIssuer {
        attempted: urls.len(),
    })
}
