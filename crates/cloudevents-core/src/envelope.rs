//! The envelope data model and factory operations.
//!
//! An [`Envelope`] is one CloudEvent: a spec revision, the schema-defined
//! attributes of that revision, any extension attributes, and exactly one
//! payload variant. Attribute fields are optional because decoding is
//! lenient; the validator is the conformance gate.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::kind::PayloadKind;
use crate::schema::{is_schema_attribute, SpecVersion};

const JSON_MEDIA_TYPE: &str = "application/json";
const PLAIN_TEXT_MEDIA_TYPE: &str = "text/plain";
const OCTET_STREAM_MEDIA_TYPE: &str = "application/octet-stream";

/// The payload carried by an envelope. Exactly one variant describes any
/// decoded envelope; `None` means the `data` attribute was absent, not
/// null.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    None,
    Json(Value),
    String(String),
    Binary(Vec<u8>),
}

impl Payload {
    /// The content kind this payload belongs to.
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::None => PayloadKind::NoData,
            Payload::Json(_) => PayloadKind::JsonData,
            Payload::String(_) => PayloadKind::StringData,
            Payload::Binary(_) => PayloadKind::BinaryData,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtensionError {
    #[error("extension attribute '{0}' collides with a schema attribute")]
    SchemaCollision(String),
}

/// One CloudEvent.
///
/// The spec revision is fixed at construction and the wire `specversion`
/// attribute is always re-derived from it on encode; a stored version
/// literal can never disagree with the concrete revision.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    version: SpecVersion,
    pub id: Option<String>,
    pub event_type: Option<String>,
    pub source: Option<String>,
    pub time: Option<String>,
    /// Event type version; schema attribute of 0.1 only.
    pub type_version: Option<String>,
    /// Schema URI (`schemaUrl` / `schemaurl` / `dataschema` on the wire).
    pub schema: Option<String>,
    /// Subject; schema attribute of 1.0 only.
    pub subject: Option<String>,
    pub content_type: Option<String>,
    /// Top-level attributes outside the revision's schema, verbatim.
    pub extensions: Map<String, Value>,
    pub payload: Payload,
}

impl Envelope {
    /// An empty envelope of the given revision. Used by the codec; most
    /// callers want one of the factory constructors below.
    pub fn new(version: SpecVersion) -> Self {
        Envelope {
            version,
            id: None,
            event_type: None,
            source: None,
            time: None,
            type_version: None,
            schema: None,
            subject: None,
            content_type: None,
            extensions: Map::new(),
            payload: Payload::None,
        }
    }

    /// The spec revision this envelope was constructed under.
    pub fn version(&self) -> SpecVersion {
        self.version
    }

    /// A minimal envelope with no payload: fresh UUID id, current UTC time.
    pub fn generic(version: SpecVersion, event_type: &str, source: &str) -> Self {
        let mut env = Envelope::new(version);
        env.id = Some(Uuid::new_v4().to_string());
        env.time = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true));
        env.event_type = Some(event_type.to_string());
        env.source = Some(source.to_string());
        env
    }

    /// An envelope carrying a JSON payload, content type
    /// `application/json` unless overridden later.
    pub fn json(version: SpecVersion, event_type: &str, source: &str, data: Value) -> Self {
        let mut env = Envelope::generic(version, event_type, source);
        env.content_type = Some(JSON_MEDIA_TYPE.to_string());
        env.payload = Payload::Json(data);
        env
    }

    /// An envelope carrying a text payload, content type `text/plain`
    /// unless overridden later.
    pub fn string(
        version: SpecVersion,
        event_type: &str,
        source: &str,
        data: impl Into<String>,
    ) -> Self {
        let mut env = Envelope::generic(version, event_type, source);
        env.content_type = Some(PLAIN_TEXT_MEDIA_TYPE.to_string());
        env.payload = Payload::String(data.into());
        env
    }

    /// An envelope carrying a binary payload, content type
    /// `application/octet-stream` unless overridden later.
    pub fn binary(version: SpecVersion, event_type: &str, source: &str, data: Vec<u8>) -> Self {
        let mut env = Envelope::generic(version, event_type, source);
        env.content_type = Some(OCTET_STREAM_MEDIA_TYPE.to_string());
        env.payload = Payload::Binary(data);
        env
    }

    /// Sets an extension attribute, rejecting keys reserved by the
    /// revision's schema (including `data`).
    pub fn set_extension(
        &mut self,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), ExtensionError> {
        let key = key.into();
        if is_schema_attribute(self.version, &key) {
            return Err(ExtensionError::SchemaCollision(key));
        }
        self.extensions.insert(key, value);
        Ok(())
    }

    /// Builder-style content type override.
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    /// Builder-style schema URI.
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    /// Builder-style subject (meaningful for 1.0 envelopes).
    pub fn with_subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }
}
