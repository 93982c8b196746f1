//! Revocation reason codes (RFC 5280 §5.3.1) and their English phrases.

use serde::Serialize;
use strum_macros::Display;

/// Reason attached to a revoked certificate.
///
/// Covers the closed set of codes defined by RFC 5280. Any other value maps
/// to [`RevocationReason::Other`] instead of failing.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RevocationReason {
    #[strum(to_string = "Unspecified")]
    Unspecified,
    #[strum(to_string = "Key compromise")]
    KeyCompromise,
    #[strum(to_string = "CA compromise")]
    CaCompromise,
    #[strum(to_string = "Affiliation changed")]
    AffiliationChanged,
    #[strum(to_string = "Superseded")]
    Superseded,
    #[strum(to_string = "Cessation of operation")]
    CessationOfOperation,
    #[strum(to_string = "Certificate hold")]
    CertificateHold,
    #[strum(to_string = "Remove from CRL")]
    RemoveFromCrl,
    #[strum(to_string = "Privilege withdrawn")]
    PrivilegeWithdrawn,
    #[strum(to_string = "AA compromise")]
    AaCompromise,
    #[strum(to_string = "Unspecified reason")]
    Other(i64),
}

impl RevocationReason {
    /// Maps a numeric CRLReason code to its variant.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            other => Self::Other(other),
        }
    }

    /// The numeric CRLReason code.
    pub fn code(&self) -> i64 {
        match self {
            Self::Unspecified => 0,
            Self::KeyCompromise => 1,
            Self::CaCompromise => 2,
            Self::AffiliationChanged => 3,
            Self::Superseded => 4,
            Self::CessationOfOperation => 5,
            Self::CertificateHold => 6,
            Self::RemoveFromCrl => 8,
            Self::PrivilegeWithdrawn => 9,
            Self::AaCompromise => 10,
            Self::Other(code) => *code,
        }
    }
}
