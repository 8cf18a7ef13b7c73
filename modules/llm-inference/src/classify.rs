//! Response parsing and classification.
//!
//! Input is whatever the peer sent in reply to one request: possibly empty,
//! cut off mid-header or mid-body, and never NUL-terminated. Only the body is
//! matched against the signature table; the status code is extracted for the
//! record but plays no part in the decision.

use crate::signatures::{self, Service};
use memchr::memmem;
use toolbox_core::{OutItem, OutLevel};
use tracing::debug;

/// Anything shorter cannot hold a status line.
pub const MIN_RESPONSE_LEN: usize = 12;

const HTTP_MARKER: &[u8] = b"HTTP/";
const BODY_SEPARATOR: &[u8] = b"\r\n\r\n";
const STATUS_OFFSET: usize = 9;

pub const VERSION_DETECTED: &str = "version-detected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub service: Service,
    pub evidence: &'static str,
    /// 0 when no three-digit code sits at the usual offset.
    pub status: u16,
}

/// Status code of an `HTTP/x.y NNN` line, if the digits are present.
pub fn status_code(px: &[u8]) -> Option<u16> {
    let digits = px.get(STATUS_OFFSET..STATUS_OFFSET + 3)?;
    if !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    Some(digits.iter().fold(0u16, |acc, d| acc * 10 + (d - b'0') as u16))
}

/// Bytes after the first CRLFCRLF, or `None` if the headers never ended.
pub fn body(px: &[u8]) -> Option<&[u8]> {
    memmem::find(px, BODY_SEPARATOR).map(|i| &px[i + BODY_SEPARATOR.len()..])
}

/// Classify a raw response. `None` means the peer did not speak HTTP and the
/// target should produce no output.
pub fn classify(px: &[u8], detect_version: bool) -> Option<Classification> {
    if px.len() < MIN_RESPONSE_LEN || !px.starts_with(HTTP_MARKER) {
        return None;
    }
    let status = status_code(px).unwrap_or(0);

    let hit = body(px)
        .filter(|b| !b.is_empty())
        .and_then(|b| signatures::match_body(b).map(|sig| (sig, b)));

    let (service, evidence) = match hit {
        Some((sig, b)) => {
            let versioned = detect_version
                && sig.version_marker.map_or(false, |m| signatures::contains(b, m));
            (sig.service, if versioned { VERSION_DETECTED } else { "" })
        }
        None => (Service::Unknown, ""),
    };
    Some(Classification { service, evidence, status })
}

/// Build the output record for a response.
pub fn classify_response(px: &[u8], detect_version: bool) -> OutItem {
    let Some(c) = classify(px, detect_version) else {
        debug!(len = px.len(), "no http response, suppressing");
        return OutItem::suppressed();
    };
    debug!(service = %c.service, status = c.status, evidence = c.evidence, "classified response");

    let mut item = OutItem { level: OutLevel::Success, ..Default::default() };
    item.set_classification(c.service.label());
    item.evidence = c.evidence.to_string();
    if c.status != 0 {
        item.report.append_text("status", c.status.to_string());
    }
    item.report.append_banner("banner", px);
    item
}
