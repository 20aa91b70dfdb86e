//! Strict envelope validation.
//!
//! Walks a parsed envelope against the attribute schema of one spec
//! revision and the wire-format grammars, producing a pass/fail verdict
//! plus every rule violation found. Validation never short-circuits and
//! never panics: malformed input of any shape comes back as an error
//! message, so callers branch on the verdict instead of catching anything.
//!
//! Decoding is deliberately lenient about missing attributes; this module
//! is the conformance gate.

use std::sync::OnceLock;

use serde_json::{Map, Value};
use url::Url;

use crate::formats::{is_rfc2046_media_type, is_rfc3339};
use crate::schema::{attributes, AttributeSpec, SpecVersion, ValueKind};

/// Validates a JSON string against one spec revision.
///
/// Convenience wrapper over [`validate_json_detailed`] for callers that
/// only need the verdict.
pub fn validate_json(version: SpecVersion, json: &str) -> bool {
    validate_json_detailed(version, json).0
}

/// Validates a JSON string against one spec revision, reporting every
/// violation.
///
/// Input that is not well-formed JSON yields `(false, ["Failed to parse
/// json."])` rather than an error.
pub fn validate_json_detailed(version: SpecVersion, json: &str) -> (bool, Vec<String>) {
    match serde_json::from_str::<Value>(json) {
        Ok(value) => validate_value_detailed(version, &value),
        Err(_) => (false, vec!["Failed to parse json.".to_string()]),
    }
}

/// Validates a parsed JSON tree against one spec revision, reporting every
/// violation in schema order.
pub fn validate_value_detailed(version: SpecVersion, value: &Value) -> (bool, Vec<String>) {
    let Some(obj) = value.as_object() else {
        return (false, vec!["Cloud event must be a JSON object.".to_string()]);
    };

    let mut errors = Vec::new();

    for spec in attributes(version) {
        let label = if spec.required { "Required" } else { "Optional" };
        match obj.get(spec.wire) {
            None => {
                if spec.required {
                    errors.push(format!("Required field '{}' is missing.", spec.wire));
                }
            }
            Some(Value::Null) => {
                errors.push(format!("{} field '{}' is null.", label, spec.wire));
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                if spec.required {
                    errors.push(format!(
                        "Required field '{}' must contain a value.",
                        spec.wire
                    ));
                } else {
                    errors.push(format!(
                        "Optional field '{}' is present and therefore must contain a value.",
                        spec.wire
                    ));
                }
            }
            Some(Value::String(s)) => check_format(version, spec, s, &mut errors),
            Some(_) => {
                errors.push(format!(
                    "{} field '{}' must contain a string value.",
                    label, spec.wire
                ));
            }
        }
    }

    check_data(obj, &mut errors);

    (errors.is_empty(), errors)
}

fn check_format(
    version: SpecVersion,
    spec: &AttributeSpec,
    value: &str,
    errors: &mut Vec<String>,
) {
    match spec.kind {
        ValueKind::String => {}
        ValueKind::VersionTag => {
            if !value.eq_ignore_ascii_case(version.as_str()) {
                errors.push(format!(
                    "Required field '{}' must contain the value '{}'",
                    spec.wire, version
                ));
            }
        }
        ValueKind::Timestamp => {
            if !is_rfc3339(value) {
                errors.push(format!(
                    "Optional field '{}' must adhere to the format specified in RFC 3339.",
                    spec.wire
                ));
            }
        }
        ValueKind::MediaType => {
            if !is_rfc2046_media_type(value) {
                errors.push(format!(
                    "Optional field '{}' must adhere to the format specified in RFC 2046.",
                    spec.wire
                ));
            }
        }
        ValueKind::Uri => {
            if !is_uri_reference(value) {
                let label = if spec.required { "Required" } else { "Optional" };
                errors.push(format!(
                    "{} field '{}' must contain a valid Uri.",
                    label, spec.wire
                ));
            }
        }
    }
}

// The data attribute is variant-driven rather than a schema row, but a
// present-and-null or present-and-blank value is still a defect.
fn check_data(obj: &Map<String, Value>, errors: &mut Vec<String>) {
    match obj.get("data") {
        None => {}
        Some(Value::Null) => errors.push("Optional field 'data' is null.".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => errors.push(
            "Optional field 'data' is present and therefore must contain a value.".to_string(),
        ),
        Some(_) => {}
    }
}

/// Accepts both absolute URIs and relative references, matching the
/// permissive `source`/`schema` contract.
fn is_uri_reference(s: &str) -> bool {
    match Url::parse(s) {
        Ok(_) => true,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::options().base_url(Some(base_url())).parse(s).is_ok()
        }
        Err(_) => false,
    }
}

fn base_url() -> &'static Url {
    static BASE: OnceLock<Url> = OnceLock::new();
    BASE.get_or_init(|| Url::parse("https://cloudevents.invalid/").unwrap())
}
