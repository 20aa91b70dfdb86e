//! Wire-format grammars for envelope attribute values.
//!
//! Three independent string predicates used by both the validator and the
//! content-kind resolver: RFC 3339 timestamps, RFC 2046 media types, and
//! Base64 payload text. All are deterministic, side-effect free, and backed
//! by regexes compiled once per process.

use std::sync::OnceLock;

use regex::Regex;

fn rfc3339_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^([0-9]+)-(0[1-9]|1[012])-(0[1-9]|[12][0-9]|3[01])[Tt]([01][0-9]|2[0-3]):([0-5][0-9]):([0-5][0-9]|60)(\.[0-9]+)?(([Zz])|([+-]([01][0-9]|2[0-3]):[0-5][0-9]))$",
        )
        .unwrap()
    })
}

fn rfc2046_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9!#$%^&*_+{}|'.`~-]+/[A-Za-z0-9!#$%^&*_+{}|'.`~-]+$").unwrap()
    })
}

fn base64_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}(?:==)?|[A-Za-z0-9+/]{3}=?)?$")
            .unwrap()
    })
}

/// Returns `true` when `s` is an RFC 3339 timestamp.
///
/// Requires full-date, full-time, and a zone designator (`Z`/`z` or a
/// numeric UTC offset). Fractional seconds are optional; a timestamp with
/// no timezone is rejected.
pub fn is_rfc3339(s: &str) -> bool {
    rfc3339_regex().is_match(s)
}

/// Returns `true` when `s` is a `type/subtype` media type per RFC 2046.
///
/// Both sides must be one or more characters from the RFC 2046 token
/// alphabet. Bare tokens (`pdf`) and double slashes (`application//pdf`)
/// are rejected.
pub fn is_rfc2046_media_type(s: &str) -> bool {
    rfc2046_regex().is_match(s)
}

/// Returns `true` when `s` looks like Base64 text: groups of four standard
/// alphabet characters with an optionally padded final group.
///
/// This is a classification heuristic, not a strict decode guarantee; a
/// short string payload can match coincidentally.
pub fn is_base64(s: &str) -> bool {
    base64_regex().is_match(s)
}
