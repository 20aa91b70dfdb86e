//! Core primitives for CloudEvents envelopes.
//!
//! Decodes, validates, and re-encodes the CloudEvents JSON envelope format
//! across its three historical spec revisions (0.1, 0.2, 1.0). Decoding is
//! lenient and infers the payload variant (none/JSON/string/binary) by
//! content-kind resolution; validation is the strict conformance gate and
//! reports every violation at once; encoding writes canonical attribute
//! order and preserves extension attributes verbatim.

pub mod codec;
pub mod envelope;
pub mod formats;
pub mod kind;
pub mod schema;
pub mod validate;

pub use codec::{decode, decode_as, decode_value, encode_string, encode_value, DecodeError};
pub use envelope::{Envelope, ExtensionError, Payload};
pub use kind::{resolve_kind, PayloadKind};
pub use schema::{attributes, AttributeSpec, SpecVersion, ValueKind};
pub use validate::{validate_json, validate_json_detailed, validate_value_detailed};

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
