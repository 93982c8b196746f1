//! Loading X.509 certificates from PEM or DER input.
//!
//! A [`Certificate`] wraps the parsed OpenSSL structure together with the
//! revocation metadata the checkers need: the serial number and the issuer,
//! OCSP and CRL URLs advertised by the certificate's extensions.

use std::fs;
use std::path::Path;

use openssl::bn::{BigNum, BigNumRef};
use openssl::nid::Nid;
use openssl::x509::{X509NameRef, X509Ref, X509};
use tracing::debug;

use crate::error::RevocationError;

const PEM_BEGIN: &[u8] = b"-----BEGIN ";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// A parsed certificate and its revocation endpoints.
///
/// Immutable once built.
pub struct Certificate {
    x509: X509,
    serial: BigNum,
    serial_number: String,
    issuer_urls: Vec<String>,
    ocsp_servers: Vec<String>,
    crl_distribution_points: Vec<String>,
}

impl Certificate {
    /// Decodes a certificate from PEM armor labeled `CERTIFICATE` or from raw DER.
    ///
    /// PEM armor with any other label fails with
    /// [`RevocationError::NotACertificate`]; anything that does not decode as a
    /// certificate fails with [`RevocationError::MalformedCertificate`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Certificate, RevocationError> {
        let der = if contains_pem_armor(bytes) {
            let block = pem::parse(bytes).map_err(|e| RevocationError::MalformedCertificate {
                reason: e.to_string(),
            })?;
            if block.tag() != CERTIFICATE_LABEL {
                return Err(RevocationError::NotACertificate {
                    label: block.tag().to_string(),
                });
            }
            block.into_contents()
        } else {
            bytes.to_vec()
        };

        let x509 = X509::from_der(&der).map_err(|e| RevocationError::MalformedCertificate {
            reason: e.to_string(),
        })?;
        Certificate::from_x509(x509)
    }

    /// Reads and decodes the certificate stored at `path`.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Certificate, RevocationError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| RevocationError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Certificate::from_bytes(&bytes)
    }

    /// Wraps an already parsed certificate.
    pub fn from_x509(x509: X509) -> Result<Certificate, RevocationError> {
        let serial = x509
            .serial_number()
            .to_bn()
            .map_err(|e| RevocationError::MalformedCertificate {
                reason: format!("invalid serial number: {}", e),
            })?;
        let serial_number = serial
            .to_dec_str()
            .map_err(|e| RevocationError::MalformedCertificate {
                reason: format!("invalid serial number: {}", e),
            })?
            .to_string();

        let issuer_urls = access_locations(&x509, Nid::AD_CA_ISSUERS);
        let ocsp_servers = access_locations(&x509, Nid::AD_OCSP);
        let crl_distribution_points = crl_urls(&x509);

        debug!(
            serial = %serial_number,
            issuer_urls = issuer_urls.len(),
            ocsp_servers = ocsp_servers.len(),
            crl_distribution_points = crl_distribution_points.len(),
            "loaded certificate"
        );

        Ok(Certificate {
            x509,
            serial,
            serial_number,
            issuer_urls,
            ocsp_servers,
            crl_distribution_points,
        })
    }

    /// The underlying OpenSSL certificate.
    pub fn x509(&self) -> &X509Ref {
        &self.x509
    }

    /// Serial number as an arbitrary-precision integer.
    pub fn serial(&self) -> &BigNumRef {
        &self.serial
    }

    /// Serial number in decimal.
    pub fn serial_number(&self) -> &str {
        &self.serial_number
    }

    /// Subject name on one line, e.g. `CN=leaf.example.test, O=Certstatus Test`.
    pub fn subject(&self) -> String {
        one_line(self.x509.subject_name())
    }

    /// Issuer name on one line, in the same form as [`Certificate::subject`].
    pub fn issuer(&self) -> String {
        one_line(self.x509.issuer_name())
    }

    /// CA issuer URLs from the Authority Information Access extension, in order.
    pub fn issuer_urls(&self) -> &[String] {
        &self.issuer_urls
    }

    /// OCSP responder URLs from the Authority Information Access extension, in order.
    pub fn ocsp_servers(&self) -> &[String] {
        &self.ocsp_servers
    }

    /// URLs from the CRL Distribution Points extension, in order.
    pub fn crl_distribution_points(&self) -> &[String] {
        &self.crl_distribution_points
    }

    /// DER encoding of the certificate.
    pub fn to_der(&self) -> Result<Vec<u8>, RevocationError> {
        Ok(self.x509.to_der()?)
    }
}

impl std::fmt::Debug for Certificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject())
            .field("serial_number", &self.serial_number)
            .field("issuer_urls", &self.issuer_urls)
            .field("ocsp_servers", &self.ocsp_servers)
            .field("crl_distribution_points", &self.crl_distribution_points)
            .finish()
    }
}

pub(crate) fn contains_pem_armor(bytes: &[u8]) -> bool {
    bytes
        .windows(PEM_BEGIN.len())
        .any(|window| window == PEM_BEGIN)
}

fn access_locations(x509: &X509Ref, method: Nid) -> Vec<String> {
    let Some(descriptions) = x509.authority_info() else {
        return Vec::new();
    };
    descriptions
        .iter()
        .filter(|description| description.method().nid() == method)
        .filter_map(|description| description.location().uri())
        .map(str::to_string)
        .collect()
}

fn crl_urls(x509: &X509Ref) -> Vec<String> {
    let Some(points) = x509.crl_distribution_points() else {
        return Vec::new();
    };
    let mut urls = Vec::new();
    for point in points.iter() {
        let Some(names) = point.distpoint().and_then(|name| name.fullname()) else {
            continue;
        };
        urls.extend(names.iter().filter_map(|name| name.uri()).map(str::to_string));
    }
    urls
}

fn one_line(name: &X509NameRef) -> String {
    name.entries()
        .map(|entry| {
            let key = entry.object().nid().short_name().unwrap_or("?");
            let value = String::from_utf8_lossy(entry.data().as_slice());
            format!("{}={}", key, value)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEAF_PEM: &[u8] = include_bytes!("../tests/testdata/certificate.pem");
    const LEAF_DER: &[u8] = include_bytes!("../tests/testdata/certificate.der");
    const BARE_PEM: &[u8] = include_bytes!("../tests/testdata/bare.pem");
    const PRIVATE_KEY_PEM: &[u8] = include_bytes!("../tests/testdata/private_key.pem");

    #[test]
    fn test_pem_certificate_round_trips_to_der() {
        let cert = Certificate::from_bytes(LEAF_PEM).unwrap();
        assert_eq!(cert.to_der().unwrap(), LEAF_DER);
    }

    #[test]
    fn test_raw_der_is_accepted() {
        let cert = Certificate::from_bytes(LEAF_DER).unwrap();
        assert_eq!(cert.serial_number(), "137764557074587603213226");
    }

    #[test]
    fn test_other_pem_label_is_not_a_certificate() {
        match Certificate::from_bytes(PRIVATE_KEY_PEM) {
            Err(RevocationError::NotACertificate { label }) => assert_eq!(label, "PRIVATE KEY"),
            other => panic!("expected NotACertificate, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let result = Certificate::from_bytes(b"definitely not a certificate");
        assert!(matches!(
            result,
            Err(RevocationError::MalformedCertificate { .. })
        ));
    }

    #[test]
    fn test_broken_pem_is_malformed() {
        let input = b"-----BEGIN CERTIFICATE-----\nnot base64 at all!!\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            Certificate::from_bytes(input),
            Err(RevocationError::MalformedCertificate { .. })
        ));
    }

    #[test]
    fn test_endpoints_keep_certificate_order() {
        let cert = Certificate::from_bytes(LEAF_PEM).unwrap();
        assert_eq!(
            cert.issuer_urls(),
            [
                "http://unreachable.example.test/issuer.crt",
                "http://ca.example.test/issuer.crt"
            ]
        );
        assert_eq!(
            cert.ocsp_servers(),
            ["http://ocsp.example.test", "http://ocsp-backup.example.test"]
        );
        assert_eq!(
            cert.crl_distribution_points(),
            [
                "http://crl.example.test/ca.crl",
                "http://crl-backup.example.test/ca.crl"
            ]
        );
    }

    #[test]
    fn test_certificate_without_extensions_has_no_endpoints() {
        let cert = Certificate::from_bytes(BARE_PEM).unwrap();
        assert!(cert.issuer_urls().is_empty());
        assert!(cert.ocsp_servers().is_empty());
        assert!(cert.crl_distribution_points().is_empty());
        assert_eq!(cert.serial_number(), "4242");
    }

    #[test]
    fn test_names() {
        let cert = Certificate::from_bytes(LEAF_PEM).unwrap();
        assert_eq!(cert.subject(), "CN=leaf.example.test, O=Certstatus Test");
        assert_eq!(
            cert.issuer(),
            "CN=Certstatus Test Root CA, O=Certstatus Test"
        );
    }
}
