//! Envelope decoding and encoding.
//!
//! Decoding is lenient: a syntactically valid JSON object always yields an
//! envelope, even when required attributes are missing or the declared
//! version is unrecognized (unknown versions fall back to the latest
//! schema on purpose). Strictness lives in [`crate::validate`]. Encoding
//! writes attributes in canonical order under the revision's wire names
//! and always re-derives the version literal from the envelope's revision.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value};

use crate::envelope::{Envelope, Payload};
use crate::kind::{decode_base64, resolve_kind, PayloadKind};
use crate::schema::{attributes, is_schema_attribute, SpecVersion};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("failed to parse json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cloud event input must not be empty")]
    EmptyInput,
    #[error("cloud event must be a JSON object")]
    NotAnObject,
}

/// Decodes wire text into an envelope, sniffing the spec revision.
pub fn decode(json: &str) -> Result<Envelope, DecodeError> {
    if json.trim().is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    let value: Value = serde_json::from_str(json)?;
    decode_value(&value)
}

/// Decodes a parsed JSON tree into an envelope, sniffing the spec
/// revision.
pub fn decode_value(value: &Value) -> Result<Envelope, DecodeError> {
    let obj = value.as_object().ok_or(DecodeError::NotAnObject)?;
    Ok(decode_as(sniff_version(obj), obj))
}

/// Determines the spec revision of an envelope object from its version
/// attribute. An unknown or absent version falls back to the latest
/// revision; that fallback is intentional compatibility behavior, not an
/// error.
pub fn sniff_version(obj: &Map<String, Value>) -> SpecVersion {
    if let Some(s) = obj.get("specversion").and_then(Value::as_str) {
        let s = s.trim();
        if s.eq_ignore_ascii_case("1.0") {
            return SpecVersion::V1_0;
        }
        if s.eq_ignore_ascii_case("0.2") {
            return SpecVersion::V0_2;
        }
    }
    if let Some(s) = obj.get("cloudEventsVersion").and_then(Value::as_str) {
        if s.trim().eq_ignore_ascii_case("0.1") {
            return SpecVersion::V0_1;
        }
    }
    SpecVersion::LATEST
}

/// Decodes an envelope object under a fixed spec revision.
///
/// Best-effort extraction: schema attributes populate by wire name when
/// they carry strings, every unknown top-level key lands in `extensions`
/// verbatim, and the payload variant comes from content-kind resolution.
pub fn decode_as(version: SpecVersion, obj: &Map<String, Value>) -> Envelope {
    let mut env = Envelope::new(version);

    for spec in attributes(version) {
        let Some(text) = obj.get(spec.wire).and_then(Value::as_str) else {
            continue;
        };
        let text = Some(text.to_string());
        match spec.name {
            "id" => env.id = text,
            "type" => env.event_type = text,
            "typeversion" => env.type_version = text,
            "source" => env.source = text,
            "time" => env.time = text,
            "schema" => env.schema = text,
            "subject" => env.subject = text,
            "contenttype" => env.content_type = text,
            // The version literal is re-derived from the revision.
            _ => {}
        }
    }

    for (key, value) in obj {
        if !is_schema_attribute(version, key) {
            env.extensions.insert(key.clone(), value.clone());
        }
    }

    env.payload = match resolve_kind(obj, version) {
        PayloadKind::NoData => Payload::None,
        PayloadKind::JsonData => match obj.get("data") {
            Some(data) => Payload::Json(data.clone()),
            None => Payload::None,
        },
        PayloadKind::StringData => match obj.get("data").and_then(Value::as_str) {
            Some(s) => Payload::String(s.to_string()),
            None => Payload::None,
        },
        PayloadKind::BinaryData => {
            match obj.get("data").and_then(Value::as_str) {
                Some(s) => match decode_base64(s) {
                    Some(bytes) => Payload::Binary(bytes),
                    // Resolver and decoder disagreeing would be a bug; keep
                    // the raw text rather than dropping the payload.
                    None => Payload::String(s.to_string()),
                },
                None => Payload::None,
            }
        }
    };

    env
}

/// Encodes an envelope as a JSON tree in canonical attribute order: the
/// schema attributes (version literal re-derived), then `data`, then
/// extensions in their stored order. Absent attributes are omitted, never
/// written as null.
pub fn encode_value(env: &Envelope) -> Value {
    let version = env.version();
    let mut root = Map::new();

    for spec in attributes(version) {
        let text: Option<&str> = match spec.name {
            "id" => env.id.as_deref(),
            "type" => env.event_type.as_deref(),
            "typeversion" => env.type_version.as_deref(),
            "specversion" => Some(version.as_str()),
            "source" => env.source.as_deref(),
            "time" => env.time.as_deref(),
            "schema" => env.schema.as_deref(),
            "subject" => env.subject.as_deref(),
            "contenttype" => env.content_type.as_deref(),
            _ => None,
        };
        if let Some(text) = text {
            root.insert(spec.wire.to_string(), Value::String(text.to_string()));
        }
    }

    match &env.payload {
        Payload::None => {}
        Payload::Json(value) => {
            root.insert("data".to_string(), value.clone());
        }
        Payload::String(s) => {
            root.insert("data".to_string(), Value::String(s.clone()));
        }
        Payload::Binary(bytes) => {
            root.insert("data".to_string(), Value::String(STANDARD.encode(bytes)));
        }
    }

    for (key, value) in &env.extensions {
        root.insert(key.clone(), value.clone());
    }

    Value::Object(root)
}

/// Encodes an envelope as wire text.
pub fn encode_string(env: &Envelope) -> String {
    encode_value(env).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── version sniffing ──────────────────────────────────────────────────

    #[test]
    fn sniffs_each_revision() {
        let cases = [
            (json!({"specversion": "1.0"}), SpecVersion::V1_0),
            (json!({"specversion": "0.2"}), SpecVersion::V0_2),
            (json!({"cloudEventsVersion": "0.1"}), SpecVersion::V0_1),
        ];
        for (value, expected) in cases {
            let obj = value.as_object().expect("object literal");
            assert_eq!(sniff_version(obj), expected);
        }
    }

    #[test]
    fn unknown_version_falls_back_to_latest() {
        for value in [
            json!({"specversion": "2.0"}),
            json!({"specversion": 2}),
            json!({}),
        ] {
            let obj = value.as_object().expect("object literal");
            assert_eq!(sniff_version(obj), SpecVersion::LATEST);
        }
    }

    // ── decoding ──────────────────────────────────────────────────────────

    #[test]
    fn decodes_json_payload_events() {
        let env = decode(
            r#"{
                "id": "C234-1234-1234",
                "type": "com.example.someevent",
                "specversion": "1.0",
                "source": "/mycontext",
                "time": "2018-04-05T17:31:00Z",
                "datacontenttype": "application/json",
                "data": {"appinfoA": "abc", "appinfoB": 123, "appinfoC": true}
            }"#,
        )
        .expect("valid wire text");

        assert_eq!(env.version(), SpecVersion::V1_0);
        assert_eq!(env.id.as_deref(), Some("C234-1234-1234"));
        assert_eq!(env.event_type.as_deref(), Some("com.example.someevent"));
        assert_eq!(env.source.as_deref(), Some("/mycontext"));
        assert_eq!(env.content_type.as_deref(), Some("application/json"));
        assert!(env.extensions.is_empty());

        let Payload::Json(data) = &env.payload else {
            panic!("expected json payload, got {:?}", env.payload);
        };
        assert_eq!(data["appinfoA"], json!("abc"));
        assert_eq!(data["appinfoB"], json!(123));
        assert_eq!(data["appinfoC"], json!(true));
    }

    #[test]
    fn decodes_base64_string_as_binary() {
        let env = decode(
            r#"{
                "id": "a",
                "type": "t",
                "specversion": "1.0",
                "source": "/",
                "data": "AAAAAA"
            }"#,
        )
        .expect("valid wire text");
        assert_eq!(env.payload, Payload::Binary(vec![0, 0, 0, 0]));
    }

    #[test]
    fn decodes_plain_text_as_string() {
        let env = decode(
            r#"{
                "id": "a",
                "type": "t",
                "specversion": "1.0",
                "source": "/",
                "data": "This is some text..."
            }"#,
        )
        .expect("valid wire text");
        assert_eq!(
            env.payload,
            Payload::String("This is some text...".to_string())
        );
    }

    #[test]
    fn decodes_missing_data_as_no_payload() {
        let env = decode(r#"{"id": "a", "type": "t", "specversion": "1.0", "source": "/"}"#)
            .expect("valid wire text");
        assert!(env.payload.is_none());
    }

    #[test]
    fn collects_unknown_attributes_as_extensions() {
        let env = decode(
            r#"{
                "id": "a",
                "type": "t",
                "specversion": "1.0",
                "source": "/",
                "comexampleextension1": "value",
                "comexampleothervalue": 5,
                "nested": {"x": [1, 2]}
            }"#,
        )
        .expect("valid wire text");
        assert_eq!(env.extensions.len(), 3);
        assert_eq!(env.extensions["comexampleextension1"], json!("value"));
        assert_eq!(env.extensions["comexampleothervalue"], json!(5));
        assert_eq!(env.extensions["nested"], json!({"x": [1, 2]}));
    }

    #[test]
    fn v01_wire_names_map_to_canonical_fields() {
        let env = decode(
            r#"{
                "eventId": "C234-1234-1234",
                "eventType": "com.example.someevent",
                "eventTypeVersion": "1.0",
                "cloudEventsVersion": "0.1",
                "source": "/mycontext",
                "eventTime": "2018-04-05T17:31:00Z",
                "contentType": "application/json",
                "data": {"a": 1}
            }"#,
        )
        .expect("valid wire text");
        assert_eq!(env.version(), SpecVersion::V0_1);
        assert_eq!(env.id.as_deref(), Some("C234-1234-1234"));
        assert_eq!(env.event_type.as_deref(), Some("com.example.someevent"));
        assert_eq!(env.type_version.as_deref(), Some("1.0"));
        assert_eq!(env.time.as_deref(), Some("2018-04-05T17:31:00Z"));
        assert_eq!(env.content_type.as_deref(), Some("application/json"));
        assert_eq!(env.payload, Payload::Json(json!({"a": 1})));
        assert!(env.extensions.is_empty());
    }

    #[test]
    fn missing_required_attributes_still_decode() {
        let env = decode(r#"{"specversion": "1.0"}"#).expect("lenient decode");
        assert!(env.id.is_none());
        assert!(env.event_type.is_none());
        assert!(env.source.is_none());
    }

    #[test]
    fn version_less_object_decodes_under_latest_schema() {
        let env = decode(r#"{"id": "a", "subject": "s"}"#).expect("lenient decode");
        assert_eq!(env.version(), SpecVersion::LATEST);
        assert_eq!(env.subject.as_deref(), Some("s"));
    }

    #[test]
    fn malformed_text_is_a_parse_error() {
        assert!(matches!(decode("{not json"), Err(DecodeError::Parse(_))));
    }

    #[test]
    fn blank_input_is_rejected() {
        assert!(matches!(decode("   "), Err(DecodeError::EmptyInput)));
    }

    #[test]
    fn non_object_root_is_rejected() {
        assert!(matches!(decode("[1, 2]"), Err(DecodeError::NotAnObject)));
    }

    // ── encoding ──────────────────────────────────────────────────────────

    #[test]
    fn encodes_in_canonical_order() {
        let mut env = Envelope::new(SpecVersion::V1_0);
        env.id = Some("a".to_string());
        env.event_type = Some("t".to_string());
        env.source = Some("/".to_string());
        env.subject = Some("s".to_string());
        env.payload = Payload::String("hello world".to_string());
        env.extensions.insert("zzz".to_string(), json!(1));

        let keys: Vec<String> = encode_value(&env)
            .as_object()
            .expect("object")
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["id", "type", "specversion", "source", "subject", "data", "zzz"]);
    }

    #[test]
    fn encode_rederives_the_version_literal() {
        let env = Envelope::new(SpecVersion::V0_2);
        let value = encode_value(&env);
        assert_eq!(value["specversion"], json!("0.2"));

        let old = Envelope::new(SpecVersion::V0_1);
        let value = encode_value(&old);
        assert_eq!(value["cloudEventsVersion"], json!("0.1"));
        assert!(value.get("specversion").is_none());
    }

    #[test]
    fn encode_omits_absent_attributes() {
        let value = encode_value(&Envelope::new(SpecVersion::V1_0));
        let obj = value.as_object().expect("object");
        assert_eq!(obj.len(), 1); // specversion only
        assert!(!obj.contains_key("data"));
    }

    #[test]
    fn binary_payload_encodes_as_base64() {
        let mut env = Envelope::new(SpecVersion::V1_0);
        env.payload = Payload::Binary(b"Man".to_vec());
        assert_eq!(encode_value(&env)["data"], json!("TWFu"));
    }

    // ── round trips ───────────────────────────────────────────────────────

    #[test]
    fn decode_encode_decode_is_stable() {
        let wire = r#"{
            "id": "C234-1234-1234",
            "type": "com.example.someevent",
            "specversion": "1.0",
            "source": "/mycontext",
            "time": "2018-04-05T17:31:00Z",
            "datacontenttype": "application/json",
            "data": {"appinfoA": "abc"},
            "comexampleextension1": "value"
        }"#;
        let first = decode(wire).expect("decode");
        let second = decode_value(&encode_value(&first)).expect("re-decode");
        assert_eq!(first, second);
    }

    #[test]
    fn binary_round_trip_preserves_bytes() {
        let env = Envelope::binary(SpecVersion::V1_0, "test", "/", b"This is a test!".to_vec());
        let back = decode_value(&encode_value(&env)).expect("re-decode");
        assert_eq!(back.payload, Payload::Binary(b"This is a test!".to_vec()));
    }
}
