//! Content-kind resolution.
//!
//! Classifies the payload of a parsed envelope into one of four variants
//! without any schema negotiation from the wire. The CloudEvents JSON
//! format never states the payload encoding explicitly, so the resolver
//! follows the declared content type first and falls back to sniffing the
//! shape of the `data` value.

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{alphabet, Engine};
use serde_json::{Map, Value};

use crate::formats::is_base64;
use crate::schema::SpecVersion;

// Classification accepts an unpadded final group, so decoding must too.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// The payload variant of a decoded envelope. Every envelope maps to
/// exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// The envelope has no `data` attribute at all.
    NoData,
    /// The payload is a JSON node.
    JsonData,
    /// The payload is plain text.
    StringData,
    /// The payload is Base64-encoded bytes.
    BinaryData,
}

/// Classifies the payload of an envelope object under the given revision.
///
/// Rules, in order:
/// 1. no `data` key at all is [`PayloadKind::NoData`];
/// 2. a declared content type equal to `application/json` or ending in
///    `+json` (ASCII case-insensitive, surrounding whitespace ignored) is
///    [`PayloadKind::JsonData`];
/// 3. a string `data` value that matches the Base64 grammar and strictly
///    decodes is [`PayloadKind::BinaryData`];
/// 4. any other string `data` value is [`PayloadKind::StringData`];
/// 5. a non-string `data` value is [`PayloadKind::JsonData`], the only
///    lossless representation for it.
///
/// A short text payload that happens to be valid Base64 (`"AAAAAA"`) is
/// classified as binary; the wire format carries nothing that could
/// disambiguate it.
pub fn resolve_kind(obj: &Map<String, Value>, version: SpecVersion) -> PayloadKind {
    let Some(data) = obj.get("data") else {
        return PayloadKind::NoData;
    };

    if let Some(ct) = obj.get(version.content_type_wire_key()).and_then(Value::as_str) {
        if is_json_media_type(ct) {
            return PayloadKind::JsonData;
        }
    }

    match data {
        Value::String(s) if is_base64(s) && decode_base64(s).is_some() => PayloadKind::BinaryData,
        Value::String(_) => PayloadKind::StringData,
        _ => PayloadKind::JsonData,
    }
}

/// Returns `true` for `application/json` and `*+json` media types.
pub fn is_json_media_type(content_type: &str) -> bool {
    let ct = content_type.trim();
    ct.eq_ignore_ascii_case("application/json") || ct.to_ascii_lowercase().ends_with("+json")
}

/// Decodes Base64 text with the standard alphabet, tolerating a missing
/// final padding group. Returns `None` on any other malformation.
pub(crate) fn decode_base64(s: &str) -> Option<Vec<u8>> {
    LENIENT_STANDARD.decode(s).ok()
}
