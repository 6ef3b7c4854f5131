//! Server time reconciliation.
//!
//! Derives the authoritative server timestamp for a fetch from an ordered
//! chain of sources: the response `Date` header, then the cache-recorded
//! original request timestamp, then nothing (the caller falls back to its
//! local clock, which yields a zero offset for that fetch).

use chrono::{DateTime, Utc};
use tracing::debug;

/// Resolve the server timestamp from response metadata.
///
/// The `Date` header uses the fixed RFC 1123 pattern
/// (`Wed, 05 Jan 2022 08:00:00 GMT`); parsing is locale-independent and
/// timezone-aware. A parse failure degrades to the next source and is
/// logged, never failing the fetch.
pub fn resolve_server_time(
    date_header: Option<&str>,
    cached_request_at: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
    if let Some(raw) = date_header {
        match DateTime::parse_from_rfc2822(raw) {
            Ok(parsed) => return Some(parsed.with_timezone(&Utc)),
            Err(error) => {
                debug!(raw, %error, "unparseable Date header, trying next time source");
            }
        }
    }

    cached_request_at
}
