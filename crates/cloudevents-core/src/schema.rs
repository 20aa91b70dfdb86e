//! Versioned attribute schema tables.
//!
//! One static table per spec revision maps canonical attribute names to
//! their wire names, required flags, and semantic value kinds. The
//! validator and the envelope codec both consult these tables instead of
//! hardcoding field lists, so supporting a new revision means adding a
//! table and the variant wiring, nothing else.
//!
//! Table row order is the canonical encode order: id, type, specversion,
//! source, time, schema, subject, contenttype. The `data` attribute and
//! extension attributes are handled by the codec after the table rows.

use std::fmt;

/// One of the three historical CloudEvents spec revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecVersion {
    V0_1,
    V0_2,
    V1_0,
}

impl SpecVersion {
    /// The revision used when an incoming envelope declares no recognizable
    /// version.
    pub const LATEST: SpecVersion = SpecVersion::V1_0;

    /// The exact version literal carried on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            SpecVersion::V0_1 => "0.1",
            SpecVersion::V0_2 => "0.2",
            SpecVersion::V1_0 => "1.0",
        }
    }

    /// Parses a wire version literal, ASCII case-insensitively.
    pub fn from_literal(s: &str) -> Option<SpecVersion> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("0.1") {
            Some(SpecVersion::V0_1)
        } else if s.eq_ignore_ascii_case("0.2") {
            Some(SpecVersion::V0_2)
        } else if s.eq_ignore_ascii_case("1.0") {
            Some(SpecVersion::V1_0)
        } else {
            None
        }
    }

    /// The top-level key carrying the version literal for this revision.
    pub fn version_wire_key(self) -> &'static str {
        match self {
            SpecVersion::V0_1 => "cloudEventsVersion",
            SpecVersion::V0_2 | SpecVersion::V1_0 => "specversion",
        }
    }

    /// The top-level key carrying the declared content type for this
    /// revision. Drives content-kind resolution.
    pub fn content_type_wire_key(self) -> &'static str {
        match self {
            SpecVersion::V0_1 => "contentType",
            SpecVersion::V0_2 => "contenttype",
            SpecVersion::V1_0 => "datacontenttype",
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic type of an attribute value, selecting the format check the
/// validator applies on top of the generic string checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Plain non-empty string.
    String,
    /// URI reference, absolute or relative.
    Uri,
    /// RFC 3339 timestamp.
    Timestamp,
    /// RFC 2046 media type.
    MediaType,
    /// The version literal itself; must match the revision exactly.
    VersionTag,
}

/// One row of a versioned attribute schema.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    /// Canonical, version-independent attribute name.
    pub name: &'static str,
    /// Name of the attribute on the wire for this revision.
    pub wire: &'static str,
    /// Whether validation fails when the attribute is absent.
    pub required: bool,
    /// Semantic value kind.
    pub kind: ValueKind,
}

const fn attr(
    name: &'static str,
    wire: &'static str,
    required: bool,
    kind: ValueKind,
) -> AttributeSpec {
    AttributeSpec {
        name,
        wire,
        required,
        kind,
    }
}

static V0_1_ATTRIBUTES: [AttributeSpec; 8] = [
    attr("id", "eventId", true, ValueKind::String),
    attr("type", "eventType", true, ValueKind::String),
    attr("typeversion", "eventTypeVersion", false, ValueKind::String),
    attr("specversion", "cloudEventsVersion", true, ValueKind::VersionTag),
    attr("source", "source", true, ValueKind::Uri),
    attr("time", "eventTime", false, ValueKind::Timestamp),
    attr("schema", "schemaUrl", false, ValueKind::Uri),
    attr("contenttype", "contentType", false, ValueKind::MediaType),
];

static V0_2_ATTRIBUTES: [AttributeSpec; 7] = [
    attr("id", "id", true, ValueKind::String),
    attr("type", "type", true, ValueKind::String),
    attr("specversion", "specversion", true, ValueKind::VersionTag),
    attr("source", "source", true, ValueKind::Uri),
    attr("time", "time", false, ValueKind::Timestamp),
    attr("schema", "schemaurl", false, ValueKind::Uri),
    attr("contenttype", "contenttype", false, ValueKind::MediaType),
];

static V1_0_ATTRIBUTES: [AttributeSpec; 8] = [
    attr("id", "id", true, ValueKind::String),
    attr("type", "type", true, ValueKind::String),
    attr("specversion", "specversion", true, ValueKind::VersionTag),
    attr("source", "source", true, ValueKind::Uri),
    attr("time", "time", false, ValueKind::Timestamp),
    attr("schema", "dataschema", false, ValueKind::Uri),
    attr("subject", "subject", false, ValueKind::String),
    attr("contenttype", "datacontenttype", false, ValueKind::MediaType),
];

/// The attribute schema for a spec revision, in canonical encode order.
pub fn attributes(version: SpecVersion) -> &'static [AttributeSpec] {
    match version {
        SpecVersion::V0_1 => &V0_1_ATTRIBUTES,
        SpecVersion::V0_2 => &V0_2_ATTRIBUTES,
        SpecVersion::V1_0 => &V1_0_ATTRIBUTES,
    }
}

/// Returns `true` when `wire_key` is a schema-defined attribute of the
/// given revision. The `data` attribute is variant-driven and is not a
/// schema row, but it is reserved all the same.
pub fn is_schema_attribute(version: SpecVersion, wire_key: &str) -> bool {
    wire_key == "data" || attributes(version).iter().any(|a| a.wire == wire_key)
}
