//! OCSP (Online Certificate Status Protocol, RFC 6960) checking.
//!
//! A request for the leaf certificate is built with OpenSSL, POSTed to the
//! first responder the leaf advertises, and the signed response is verified
//! against the issuer before its status is interpreted.

use std::os::raw::c_int;
use std::ptr;

use chrono::{DateTime, Utc};
use foreign_types::ForeignTypeRef;
use openssl::asn1::Asn1GeneralizedTimeRef;
use openssl::hash::MessageDigest;
use openssl::ocsp::{
    OcspBasicResponseRef, OcspCertId, OcspCertIdRef, OcspFlag, OcspRequest, OcspResponse,
    OcspResponseStatus,
};
use openssl::stack::Stack;
use openssl::x509::store::X509StoreBuilder;
use openssl::x509::verify::X509VerifyFlags;
use openssl_sys as ffi;
use serde::Serialize;
use strum_macros::Display;
use tracing::{debug, info};

use crate::certificate::Certificate;
use crate::error::RevocationError;
use crate::reason::RevocationReason;
use crate::timestamp;
use crate::transport::HttpClient;

pub const OCSP_REQUEST_CONTENT_TYPE: &str = "application/ocsp-request";
pub const OCSP_RESPONSE_CONTENT_TYPE: &str = "application/ocsp-response";

extern "C" {
    fn OCSP_resp_get0_produced_at(bs: *const ffi::OCSP_BASICRESP) -> *const ffi::ASN1_GENERALIZEDTIME;
}

/// Certificate status reported by an OCSP responder.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CertStatus {
    Good,
    Revoked,
    Unknown,
}

/// Interpreted OCSP response for one certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcspResult {
    /// Serial number of the queried certificate, in decimal
    pub serial_number: String,
    pub status: CertStatus,
    /// Present only when `status` is `Revoked`
    pub revocation_reason: Option<RevocationReason>,
    /// Present only when `status` is `Revoked`
    pub revocation_time: Option<DateTime<Utc>>,
    pub produced_at: DateTime<Utc>,
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
}

/// Queries the leaf's first OCSP responder about the leaf certificate.
///
/// Fails with [`RevocationError::NoOCSPServers`] before any network access
/// when the leaf lists no responder. Only the first responder is used and the
/// request is never retried.
pub fn check_ocsp(
    client: &dyn HttpClient,
    leaf: &Certificate,
    issuer: &Certificate,
) -> Result<OcspResult, RevocationError> {
    let url = leaf
        .ocsp_servers()
        .first()
        .ok_or(RevocationError::NoOCSPServers)?;

    let request = build_request(leaf, issuer)?;
    info!(url = %url, serial = %leaf.serial_number(), "querying OCSP responder");

    let body = client
        .post(
            url,
            OCSP_REQUEST_CONTENT_TYPE,
            OCSP_RESPONSE_CONTENT_TYPE,
            &request,
        )
        .map_err(|source| RevocationError::TransportFailure {
            url: url.clone(),
            source,
        })?;

    let result = parse_response(&body, leaf, issuer)?;
    info!(status = %result.status, "OCSP responder answered");
    Ok(result)
}

/// DER-encoded OCSP request for `leaf`, identified by a SHA-1 CertID.
pub fn build_request(leaf: &Certificate, issuer: &Certificate) -> Result<Vec<u8>, RevocationError> {
    let id = cert_id(leaf, issuer)?;
    let mut request = OcspRequest::new()?;
    request.add_id(id)?;
    Ok(request.to_der()?)
}

/// Verifies a DER-encoded OCSP response against `issuer` and extracts the
/// status of `leaf`.
pub fn parse_response(
    der: &[u8],
    leaf: &Certificate,
    issuer: &Certificate,
) -> Result<OcspResult, RevocationError> {
    let response = OcspResponse::from_der(der).map_err(|e| malformed(e.to_string()))?;

    let response_status = response.status();
    if response_status != OcspResponseStatus::SUCCESSFUL {
        return Err(malformed(format!(
            "responder returned '{}'",
            response_status_name(response_status)
        )));
    }

    let basic = response.basic().map_err(|e| malformed(e.to_string()))?;
    verify_signature(&basic, issuer)?;

    let id = cert_id(leaf, issuer)?;
    let single = find_status(&basic, &id)
        .ok_or_else(|| malformed("no status for the requested certificate".to_string()))?;

    let status = match single.status {
        ffi::V_OCSP_CERTSTATUS_GOOD => CertStatus::Good,
        ffi::V_OCSP_CERTSTATUS_REVOKED => CertStatus::Revoked,
        ffi::V_OCSP_CERTSTATUS_UNKNOWN => CertStatus::Unknown,
        other => return Err(malformed(format!("unrecognised certificate status {}", other))),
    };

    let (revocation_reason, revocation_time) = if status == CertStatus::Revoked {
        let reason = if single.reason == ffi::OCSP_REVOKED_STATUS_NOSTATUS {
            RevocationReason::Unspecified
        } else {
            RevocationReason::from_code(i64::from(single.reason))
        };
        let time = single
            .revocation_time
            .map(convert_time)
            .transpose()?;
        (Some(reason), time)
    } else {
        (None, None)
    };

    let produced_at = produced_at(&basic)
        .ok_or_else(|| malformed("missing producedAt".to_string()))
        .and_then(convert_time)?;
    let this_update = single
        .this_update
        .ok_or_else(|| malformed("missing thisUpdate".to_string()))
        .and_then(convert_time)?;
    let next_update = single.next_update.map(convert_time).transpose()?;

    debug!(?status, ?revocation_reason, "parsed OCSP response");

    Ok(OcspResult {
        serial_number: leaf.serial_number().to_string(),
        status,
        revocation_reason,
        revocation_time,
        produced_at,
        this_update,
        next_update,
    })
}

fn cert_id(leaf: &Certificate, issuer: &Certificate) -> Result<OcspCertId, RevocationError> {
    Ok(OcspCertId::from_cert(
        MessageDigest::sha1(),
        leaf.x509(),
        issuer.x509(),
    )?)
}

/// Accepts a response signed by the issuer itself or by a responder
/// certificate the issuer signed.
fn verify_signature(
    basic: &OcspBasicResponseRef,
    issuer: &Certificate,
) -> Result<(), RevocationError> {
    let mut certs = Stack::new()?;
    certs.push(issuer.x509().to_owned())?;

    let mut store = X509StoreBuilder::new()?;
    store.add_cert(issuer.x509().to_owned())?;
    store.set_flags(X509VerifyFlags::PARTIAL_CHAIN)?;
    let store = store.build();

    basic
        .verify(&certs, &store, OcspFlag::TRUST_OTHER)
        .map_err(|e| malformed(format!("signature verification failed: {}", e)))
}

struct SingleStatus<'a> {
    status: c_int,
    reason: c_int,
    revocation_time: Option<&'a Asn1GeneralizedTimeRef>,
    this_update: Option<&'a Asn1GeneralizedTimeRef>,
    next_update: Option<&'a Asn1GeneralizedTimeRef>,
}

fn find_status<'a>(basic: &'a OcspBasicResponseRef, id: &OcspCertIdRef) -> Option<SingleStatus<'a>> {
    let mut status = ffi::V_OCSP_CERTSTATUS_UNKNOWN;
    let mut reason = ffi::OCSP_REVOKED_STATUS_NOSTATUS;
    let mut revocation_time = ptr::null_mut();
    let mut this_update = ptr::null_mut();
    let mut next_update = ptr::null_mut();

    // SAFETY: both pointers come from live OpenSSL objects; the returned times
    // point into `basic` and are bound to its lifetime.
    unsafe {
        let found = ffi::OCSP_resp_find_status(
            basic.as_ptr(),
            id.as_ptr(),
            &mut status,
            &mut reason,
            &mut revocation_time,
            &mut this_update,
            &mut next_update,
        );
        if found != 1 {
            return None;
        }
        Some(SingleStatus {
            status,
            reason,
            revocation_time: time_ref(revocation_time),
            this_update: time_ref(this_update),
            next_update: time_ref(next_update),
        })
    }
}

fn produced_at(basic: &OcspBasicResponseRef) -> Option<&Asn1GeneralizedTimeRef> {
    // SAFETY: the returned time is owned by `basic`.
    unsafe { time_ref(OCSP_resp_get0_produced_at(basic.as_ptr()) as *mut _) }
}

unsafe fn time_ref<'a>(ptr: *mut ffi::ASN1_GENERALIZEDTIME) -> Option<&'a Asn1GeneralizedTimeRef> {
    if ptr.is_null() {
        None
    } else {
        Some(Asn1GeneralizedTimeRef::from_ptr(ptr))
    }
}

fn convert_time(time: &Asn1GeneralizedTimeRef) -> Result<DateTime<Utc>, RevocationError> {
    timestamp::from_asn1(time).map_err(malformed)
}

const RESPONSE_STATUS_NAMES: [(OcspResponseStatus, &str); 5] = [
    (OcspResponseStatus::MALFORMED_REQUEST, "malformedRequest"),
    (OcspResponseStatus::INTERNAL_ERROR, "internalError"),
    (OcspResponseStatus::TRY_LATER, "tryLater"),
    (OcspResponseStatus::SIG_REQUIRED, "sigRequired"),
    (OcspResponseStatus::UNAUTHORIZED, "unauthorized"),
];

fn response_status_name(status: OcspResponseStatus) -> &'static str {
    RESPONSE_STATUS_NAMES
        .iter()
        .find(|(known, _)| *known == status)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

fn malformed(reason: String) -> RevocationError {
    RevocationError::MalformedResponse { reason }
}
