//! CRL (Certificate Revocation List) checking.
//!
//! The first distribution point advertised by the leaf is fetched and its
//! entries are scanned for the leaf's serial number. The CRL signature is not
//! verified here.

use chrono::{DateTime, Utc};
use openssl::bn::BigNumRef;
use openssl::x509::{ReasonCode, X509Crl, X509CrlRef, X509RevokedRef};
use serde::Serialize;
use strum_macros::Display;
use tracing::{debug, info};

use crate::certificate::{contains_pem_armor, Certificate};
use crate::error::RevocationError;
use crate::reason::RevocationReason;
use crate::timestamp;
use crate::transport::HttpClient;

const CRL_LABEL: &str = "X509 CRL";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrlStatus {
    #[strum(to_string = "Not revoked")]
    NotRevoked,
    Revoked,
}

/// A CRL entry matching the queried certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevokedEntry {
    pub serial_number: String,
    pub revocation_time: DateTime<Utc>,
    pub reason: RevocationReason,
}

/// Outcome of looking a certificate up in a CRL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrlResult {
    /// Serial number of the queried certificate, in decimal
    pub serial_number: String,
    pub status: CrlStatus,
    /// Present only when `status` is `Revoked`
    pub entry: Option<RevokedEntry>,
    /// The CRL's lastUpdate
    pub this_update: DateTime<Utc>,
    pub next_update: Option<DateTime<Utc>>,
}

/// Fetches the leaf's first CRL distribution point and looks the leaf up in it.
///
/// Fails with [`RevocationError::NoCRLDistributionPoints`] before any network
/// access when the leaf lists none.
pub fn check_crl(client: &dyn HttpClient, leaf: &Certificate) -> Result<CrlResult, RevocationError> {
    let url = leaf
        .crl_distribution_points()
        .first()
        .ok_or(RevocationError::NoCRLDistributionPoints)?;

    info!(url = %url, serial = %leaf.serial_number(), "fetching CRL");
    let body = client
        .get(url)
        .map_err(|source| RevocationError::TransportFailure {
            url: url.clone(),
            source,
        })?;

    let result = parse_crl(&body, leaf)?;
    info!(status = %result.status, "CRL checked");
    Ok(result)
}

/// Parses a DER or PEM CRL and reports whether `leaf` is listed in it.
pub fn parse_crl(body: &[u8], leaf: &Certificate) -> Result<CrlResult, RevocationError> {
    let crl = if contains_pem_armor(body) {
        let block = pem::parse(body).map_err(|e| malformed(e.to_string()))?;
        if block.tag() != CRL_LABEL {
            return Err(malformed(format!("unexpected PEM label '{}'", block.tag())));
        }
        X509Crl::from_der(block.contents())
    } else {
        X509Crl::from_der(body)
    }
    .map_err(|e| malformed(e.to_string()))?;

    let this_update = timestamp::from_asn1(crl.last_update()).map_err(malformed)?;
    let next_update = crl
        .next_update()
        .map(|time| timestamp::from_asn1(time).map_err(malformed))
        .transpose()?;

    let entry = find_entry(&crl, leaf.serial())?;
    let status = if entry.is_some() {
        CrlStatus::Revoked
    } else {
        CrlStatus::NotRevoked
    };

    Ok(CrlResult {
        serial_number: leaf.serial_number().to_string(),
        status,
        entry,
        this_update,
        next_update,
    })
}

/// Scans the revoked entries for `serial`, comparing as integers.
pub fn find_entry(
    crl: &X509CrlRef,
    serial: &BigNumRef,
) -> Result<Option<RevokedEntry>, RevocationError> {
    let Some(revoked) = crl.get_revoked() else {
        debug!("CRL has no revoked entries");
        return Ok(None);
    };

    debug!(entries = revoked.len(), "scanning CRL");
    for entry in revoked {
        let entry_serial = entry
            .serial_number()
            .to_bn()
            .map_err(|e| malformed(format!("invalid entry serial: {}", e)))?;
        if &*entry_serial != serial {
            continue;
        }

        let serial_number = entry_serial
            .to_dec_str()
            .map_err(|e| malformed(e.to_string()))?
            .to_string();
        let revocation_time =
            timestamp::from_asn1(entry.revocation_date()).map_err(malformed)?;

        return Ok(Some(RevokedEntry {
            serial_number,
            revocation_time,
            reason: entry_reason(entry)?,
        }));
    }
    Ok(None)
}

/// An entry without a reasonCode extension is `Unspecified` (RFC 5280 §5.3.1).
fn entry_reason(entry: &X509RevokedRef) -> Result<RevocationReason, RevocationError> {
    let code = entry
        .extension::<ReasonCode>()
        .map_err(|e| malformed(format!("invalid reason code: {}", e)))?;
    match code {
        Some((_critical, code)) => {
            let code = code
                .get_i64()
                .map_err(|e| malformed(format!("invalid reason code: {}", e)))?;
            Ok(RevocationReason::from_code(code))
        }
        None => Ok(RevocationReason::Unspecified),
    }
}

fn malformed(reason: String) -> RevocationError {
    RevocationError::MalformedCRL { reason }
}
