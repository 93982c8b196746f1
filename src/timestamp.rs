//! Conversion between OpenSSL ASN.1 times and UTC timestamps.

use std::fmt::Display;

use chrono::{DateTime, NaiveDateTime, Utc};

/// Layout OpenSSL uses when printing ASN.1 times, after whitespace is collapsed.
const ASN1_PRINT_FORMAT: &str = "%b %d %H:%M:%S%.f %Y GMT";

/// Layout used in rendered results, before the fractional seconds.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts an OpenSSL time (`Asn1TimeRef` or `Asn1GeneralizedTimeRef`) to UTC.
///
/// Goes through OpenSSL's printed form, e.g. `Jan  1 00:00:00 2024 GMT`, so
/// fractional seconds are kept.
pub fn from_asn1<T: Display + ?Sized>(time: &T) -> Result<DateTime<Utc>, String> {
    let printed = time.to_string();
    let collapsed = printed.split_whitespace().collect::<Vec<_>>().join(" ");
    NaiveDateTime::parse_from_str(&collapsed, ASN1_PRINT_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid time '{}': {}", printed, e))
}

/// Renders a timestamp as `2017-12-23 06:30:33 +0000 UTC`.
///
/// Fractional seconds are printed only when non-zero, without trailing zeros.
pub fn display(time: &DateTime<Utc>) -> String {
    let mut out = time.format(DISPLAY_FORMAT).to_string();
    let nanos = time.timestamp_subsec_nanos();
    if nanos != 0 {
        let fraction = format!("{:09}", nanos);
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push_str(" +0000 UTC");
    out
}
