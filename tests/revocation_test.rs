//! End-to-end revocation checks against recorded fixtures.
//!
//! `tests/testdata` holds a test CA (`issuer.pem`), a leaf it issued
//! (`certificate.pem`, serial 0x1D2C3B4A5F6E7D8C9BAA) and responses that
//! CA's OCSP responder and CRL publisher produced for it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;

use certstatus::format::{write_crl, write_ocsp};
use certstatus::{
    check_crl, check_ocsp, resolve_issuer, CertStatus, Certificate, CrlStatus, HttpClient,
    RevocationError, RevocationReason, TransportError,
};

const ISSUER_URL: &str = "http://ca.example.test/issuer.crt";
const OCSP_URL: &str = "http://ocsp.example.test";
const CRL_URL: &str = "http://crl.example.test/ca.crl";

fn testdata(name: &str) -> Vec<u8> {
    fs::read(format!("tests/testdata/{}", name)).unwrap()
}

/// Serves fixture files by URL and records every request.
#[derive(Default)]
struct StubHttpClient {
    routes: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl StubHttpClient {
    fn with(mut self, url: &str, fixture: &str) -> Self {
        self.routes.insert(url.to_string(), testdata(fixture));
        self
    }

    fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    fn serve(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.requests.borrow_mut().push(url.to_string());
        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| TransportError::Request {
                reason: format!("unrecognised URL: {}", url),
            })
    }
}

impl HttpClient for StubHttpClient {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        self.serve(url)
    }

    fn post(
        &self,
        url: &str,
        content_type: &str,
        accept: &str,
        _body: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        assert_eq!(content_type, "application/ocsp-request");
        assert_eq!(accept, "application/ocsp-response");
        self.serve(url)
    }
}

fn leaf() -> Certificate {
    Certificate::from_file("tests/testdata/certificate.pem").unwrap()
}

fn bare() -> Certificate {
    Certificate::from_file("tests/testdata/bare.pem").unwrap()
}

#[test]
fn test_get_issuer_cert() {
    let client = StubHttpClient::default().with(ISSUER_URL, "issuer.pem");

    let issuer = resolve_issuer(&client, &leaf()).unwrap();

    assert_eq!(
        issuer.subject(),
        "CN=Certstatus Test Root CA, O=Certstatus Test"
    );
    assert_eq!(client.request_count(), 2);
}

#[test]
fn test_ocsp_good_end_to_end() {
    let client = StubHttpClient::default()
        .with(ISSUER_URL, "issuer.der")
        .with(OCSP_URL, "ocsp_good.der");
    let leaf = leaf();

    let issuer = resolve_issuer(&client, &leaf).unwrap();
    let result = check_ocsp(&client, &leaf, &issuer).unwrap();

    assert_eq!(result.status, CertStatus::Good);
    assert_eq!(result.revocation_reason, None);

    let mut out = Vec::new();
    write_ocsp(&mut out, &result).unwrap();
    let expected = "Serial number: 137764557074587603213226\n\n\
                    Status: Good\n\n\
                    Produced at: 2026-10-17 17:13:15 +0000 UTC\n\
                    This update: 2026-10-17 17:13:15 +0000 UTC\n\
                    Next update: 2126-09-23 17:13:15 +0000 UTC\n";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_ocsp_revoked_key_compromise() {
    let client = StubHttpClient::default().with(OCSP_URL, "ocsp_revoked.der");
    let issuer = Certificate::from_bytes(&testdata("issuer.pem")).unwrap();

    let result = check_ocsp(&client, &leaf(), &issuer).unwrap();

    assert_eq!(result.status, CertStatus::Revoked);
    assert_eq!(
        result.revocation_reason.map(|r| r.to_string()),
        Some("Key compromise".to_string())
    );

    let mut out = Vec::new();
    write_ocsp(&mut out, &result).unwrap();
    assert!(String::from_utf8(out)
        .unwrap()
        .ends_with("Revocation reason: Key compromise\n"));
}

#[test]
fn test_ocsp_improperly_signed() {
    let client = StubHttpClient::default().with(OCSP_URL, "ocsp_rogue.der");
    let issuer = Certificate::from_bytes(&testdata("issuer.pem")).unwrap();

    let err = check_ocsp(&client, &leaf(), &issuer).unwrap_err();

    assert!(matches!(err, RevocationError::MalformedResponse { .. }));
    assert!(!err.is_connectivity());
}

#[test]
fn test_ocsp_unreachable_responder() {
    let client = StubHttpClient::default();
    let issuer = Certificate::from_bytes(&testdata("issuer.pem")).unwrap();

    let err = check_ocsp(&client, &leaf(), &issuer).unwrap_err();

    assert!(matches!(err, RevocationError::TransportFailure { .. }));
    assert!(err.is_connectivity());
    assert_eq!(*client.requests.borrow(), [OCSP_URL]);
}

#[test]
fn test_crl_contains_leaf() {
    let client = StubHttpClient::default().with(CRL_URL, "crl_revoked.der");

    let result = check_crl(&client, &leaf()).unwrap();

    assert_eq!(result.status, CrlStatus::Revoked);
    let entry = result.entry.as_ref().unwrap();
    assert_eq!(entry.serial_number, "137764557074587603213226");
    assert_eq!(entry.reason, RevocationReason::KeyCompromise);

    let mut out = Vec::new();
    write_crl(&mut out, &result).unwrap();
    let expected = "Serial number: 137764557074587603213226\n\n\
                    Status: Revoked\n\n\
                    This update: 2026-10-17 17:13:26 +0000 UTC\n\
                    Next update: 2126-09-23 17:13:26 +0000 UTC\n\
                    Revoked at: 2024-03-15 12:00:00 +0000 UTC\n\
                    Revocation reason: Key compromise\n";
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
fn test_crl_disjoint_serials() {
    let client = StubHttpClient::default().with(CRL_URL, "crl_clean.der");

    let result = check_crl(&client, &leaf()).unwrap();

    assert_eq!(result.status, CrlStatus::NotRevoked);
    assert_eq!(result.entry, None);
    assert_eq!(*client.requests.borrow(), [CRL_URL]);
}

#[test]
fn test_crl_served_as_garbage() {
    let client = StubHttpClient::default().with(CRL_URL, "certificate.der");

    assert!(matches!(
        check_crl(&client, &leaf()),
        Err(RevocationError::MalformedCRL { .. })
    ));
}

#[test]
fn test_fail_fast_without_endpoints() {
    let client = StubHttpClient::default()
        .with(OCSP_URL, "ocsp_good.der")
        .with(CRL_URL, "crl_clean.der");
    let issuer = Certificate::from_bytes(&testdata("issuer.pem")).unwrap();
    let bare = bare();

    assert!(matches!(
        resolve_issuer(&client, &bare),
        Err(RevocationError::NoIssuerURLs)
    ));
    assert!(matches!(
        check_ocsp(&client, &bare, &issuer),
        Err(RevocationError::NoOCSPServers)
    ));
    assert!(matches!(
        check_crl(&client, &bare),
        Err(RevocationError::NoCRLDistributionPoints)
    ));
    assert_eq!(client.request_count(), 0);
}

#[test]
fn test_certificate_from_bytes_no_certificate() {
    let input = testdata("private_key.pem");
    assert!(matches!(
        Certificate::from_bytes(&input),
        Err(RevocationError::NotACertificate { .. })
    ));
}
