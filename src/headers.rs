//! Header classification.
//!
//! The platform collapses repeated request headers into one comma-joined
//! string per key before the event reaches the function. That collapsing is
//! only reversible for headers where a comma is a legal value separator
//! (RFC 7230 list syntax). For the rest — `User-Agent`, `Authorization`,
//! dates, and friends — a comma is part of the value and splitting would
//! corrupt it, so they pass through untouched.

use http::HeaderName;
use http::header;

/// Headers that only ever carry a single value, which may itself contain
/// commas. Everything not listed here is treated as multi-value capable and
/// gets comma-split on the way in.
const SINGLETON_HEADERS: [HeaderName; 13] = [
    header::CONTENT_TYPE,
    header::CONTENT_DISPOSITION,
    header::CONTENT_LENGTH,
    header::USER_AGENT,
    header::REFERER,
    header::HOST,
    header::AUTHORIZATION,
    header::PROXY_AUTHORIZATION,
    header::IF_MODIFIED_SINCE,
    header::IF_UNMODIFIED_SINCE,
    header::FROM,
    header::LOCATION,
    header::MAX_FORWARDS,
];

/// Whether `name` belongs to the single-value group.
///
/// `HeaderName` is already in canonical (lowercase) form, so membership is
/// case-insensitive with respect to the original event key.
pub fn is_singleton(name: &HeaderName) -> bool {
    SINGLETON_HEADERS.contains(name)
}

/// Converts a canonical (lowercase) header name to the `Mixed-Case` wire
/// form the platform uses in response envelopes: `content-type` →
/// `Content-Type`.
pub(crate) fn canonical_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;
    for c in name.chars() {
        if upper_next {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = c == '-';
    }
    out
}
