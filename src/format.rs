//! Plain-text and JSON rendering of revocation results.
//!
//! The OCSP text layout is fixed: scripts compare it byte for byte.

use std::io::{self, Write};

use serde::Serialize;

use crate::crl::CrlResult;
use crate::ocsp::OcspResult;
use crate::timestamp;

/// Writes an OCSP result in the fixed text layout.
pub fn write_ocsp<W: Write>(out: &mut W, result: &OcspResult) -> io::Result<()> {
    write!(out, "Serial number: {}\n\n", result.serial_number)?;
    write!(out, "Status: {}\n\n", result.status)?;
    writeln!(out, "Produced at: {}", timestamp::display(&result.produced_at))?;
    writeln!(out, "This update: {}", timestamp::display(&result.this_update))?;
    writeln!(out, "Next update: {}", optional_time(&result.next_update))?;
    if let Some(reason) = &result.revocation_reason {
        writeln!(out, "Revocation reason: {}", reason)?;
    }
    Ok(())
}

/// Writes a CRL result in the same style as [`write_ocsp`].
pub fn write_crl<W: Write>(out: &mut W, result: &CrlResult) -> io::Result<()> {
    write!(out, "Serial number: {}\n\n", result.serial_number)?;
    write!(out, "Status: {}\n\n", result.status)?;
    writeln!(out, "This update: {}", timestamp::display(&result.this_update))?;
    writeln!(out, "Next update: {}", optional_time(&result.next_update))?;
    if let Some(entry) = &result.entry {
        writeln!(out, "Revoked at: {}", timestamp::display(&entry.revocation_time))?;
        writeln!(out, "Revocation reason: {}", entry.reason)?;
    }
    Ok(())
}

/// Writes any result as pretty-printed JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize>(out: &mut W, result: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, result)?;
    writeln!(out)
}

fn optional_time(time: &Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.as_ref()
        .map(timestamp::display)
        .unwrap_or_else(|| "none".to_string())
}
