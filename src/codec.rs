//! Metadata codec: conversions between the engine's wire representation and
//! in-memory JSON, and between in-memory JSON and user-facing text.
//!
//! The engine carries the entire metadata payload as the *string* value of a
//! single custom tag, so the wire side is double-encoded: the envelope is
//! JSON, and the tag value inside it is JSON text again. Reading peels both
//! layers; writing applies the inner one and wraps it in a single-object
//! envelope (the write path patches one tag, it does not replace the whole
//! record, hence object rather than array).

use clap::ValueEnum;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::str::FromStr;
use strum::Display;

use crate::error::{MetaError, Result};

/// Key of the custom tag that carries the payload. Must match the tag name
/// defined in `config/xmp.config`.
pub const TAG_KEY: &str = "DM";

/// Envelope field naming the document a record belongs to.
pub const SOURCE_FILE_KEY: &str = "SourceFile";

/// Output text encodings for rendered metadata.
///
/// A closed set: adding a format means adding a variant, and every `match`
/// below is exhaustive. Strings outside the set fail to parse with
/// [`MetaError::UnsupportedFormat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// Extension used for sibling files produced by batch reads.
    pub fn sibling_extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yml",
        }
    }
}

impl FromStr for Format {
    type Err = MetaError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(Format::Json),
            "yaml" => Ok(Format::Yaml),
            other => Err(MetaError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Outcome of scanning engine output for the custom tag.
///
/// A document without the tag is a normal case; a tag that cannot be parsed
/// is not. Callers decide how to treat each.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedTag {
    /// Tag present; the payload parsed from its string value.
    Present(Value),
    /// Document carries no custom tag.
    Empty,
    /// Output or tag data did not have the expected shape.
    Malformed(String),
}

/// Decode the engine's read output into a metadata payload.
///
/// Expects a single-element JSON array whose one object may contain
/// [`TAG_KEY`]; the value under that key is itself JSON text and is parsed
/// again.
pub fn decode_engine_output(raw: &str) -> DecodedTag {
    let parsed: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => return DecodedTag::Malformed(format!("engine output is not JSON: {err}")),
    };
    let Some(records) = parsed.as_array() else {
        return DecodedTag::Malformed("engine output is not a JSON array".to_string());
    };
    let [record] = records.as_slice() else {
        return DecodedTag::Malformed(format!(
            "expected a single record, engine returned {}",
            records.len()
        ));
    };
    let Some(fields) = record.as_object() else {
        return DecodedTag::Malformed("engine record is not an object".to_string());
    };
    let Some(tag) = fields.get(TAG_KEY) else {
        return DecodedTag::Empty;
    };
    let Some(text) = tag.as_str() else {
        return DecodedTag::Malformed("tag value is not a string".to_string());
    };
    match serde_json::from_str(text) {
        Ok(payload) => DecodedTag::Present(payload),
        Err(err) => DecodedTag::Malformed(format!("tag payload is not valid JSON: {err}")),
    }
}

/// Encode a metadata payload into the envelope text the engine ingests.
///
/// The payload is stringified and becomes the value of [`TAG_KEY`] inside a
/// single JSON object; `source_file` adds the engine's source-file field.
pub fn encode_engine_input(payload: &Value, source_file: Option<&str>) -> Result<String> {
    let stringified = serde_json::to_string(payload)?;
    let mut envelope = Map::new();
    envelope.insert(TAG_KEY.to_string(), Value::String(stringified));
    if let Some(source) = source_file {
        envelope.insert(
            SOURCE_FILE_KEY.to_string(),
            Value::String(source.to_string()),
        );
    }
    Ok(serde_json::to_string(&Value::Object(envelope))?)
}

/// Render a metadata payload as text in the requested format.
///
/// JSON is pretty-printed at 4-space indent; YAML uses block style.
pub fn render(payload: &Value, format: Format) -> Result<String> {
    match format {
        Format::Json => {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut buf = Vec::new();
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            payload.serialize(&mut serializer)?;
            Ok(String::from_utf8(buf).expect("serde_json emits UTF-8"))
        }
        Format::Yaml => Ok(serde_yaml::to_string(payload)?),
    }
}

/// Parse user-supplied metadata text into a payload.
///
/// Trimmed text starting with `{` or `[` is treated as JSON, anything else
/// as YAML.
pub fn load(text: &str) -> Result<Value> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        Ok(serde_json::from_str(trimmed)?)
    } else {
        Ok(serde_yaml::from_str(trimmed)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("yaml".parse::<Format>().unwrap(), Format::Yaml);
    }

    #[test]
    fn test_format_parse_rejects_unknown() {
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(matches!(err, MetaError::UnsupportedFormat(f) if f == "xml"));
    }

    #[test]
    fn test_format_display() {
        assert_eq!(Format::Json.to_string(), "json");
        assert_eq!(Format::Yaml.to_string(), "yaml");
    }

    #[test]
    fn test_decode_present_tag() {
        let raw = r#"[{"SourceFile": "a.pdf", "DM": "{\"title\":\"x\",\"year\":2021}"}]"#;
        let decoded = decode_engine_output(raw);
        assert_eq!(
            decoded,
            DecodedTag::Present(json!({"title": "x", "year": 2021}))
        );
    }

    #[test]
    fn test_decode_missing_tag_is_empty() {
        let raw = r#"[{"SourceFile": "a.pdf", "FileType": "PDF"}]"#;
        assert_eq!(decode_engine_output(raw), DecodedTag::Empty);
    }

    #[test]
    fn test_decode_non_json_output_is_malformed() {
        assert!(matches!(
            decode_engine_output("not json at all"),
            DecodedTag::Malformed(_)
        ));
    }

    #[test]
    fn test_decode_non_array_output_is_malformed() {
        assert!(matches!(
            decode_engine_output(r#"{"DM": "{}"}"#),
            DecodedTag::Malformed(_)
        ));
    }

    #[test]
    fn test_decode_empty_array_is_malformed() {
        assert!(matches!(decode_engine_output("[]"), DecodedTag::Malformed(_)));
    }

    #[test]
    fn test_decode_multiple_records_is_malformed() {
        let raw = r#"[{"DM": "{}"}, {"DM": "{}"}]"#;
        assert!(matches!(decode_engine_output(raw), DecodedTag::Malformed(_)));
    }

    #[test]
    fn test_decode_non_string_tag_is_malformed() {
        let raw = r#"[{"DM": {"title": "x"}}]"#;
        assert!(matches!(decode_engine_output(raw), DecodedTag::Malformed(_)));
    }

    #[test]
    fn test_decode_unparsable_tag_payload_is_malformed() {
        let raw = r#"[{"DM": "{broken"}]"#;
        assert!(matches!(decode_engine_output(raw), DecodedTag::Malformed(_)));
    }

    #[test]
    fn test_encode_wraps_stringified_payload() {
        let envelope = encode_engine_input(&json!({"title": "x"}), None).unwrap();
        let parsed: Value = serde_json::from_str(&envelope).unwrap();

        let tag = parsed[TAG_KEY].as_str().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(tag).unwrap(),
            json!({"title": "x"})
        );
        assert!(parsed.get(SOURCE_FILE_KEY).is_none());
    }

    #[test]
    fn test_encode_with_source_file() {
        let envelope = encode_engine_input(&json!(["a", "b"]), Some("doc.pdf")).unwrap();
        let parsed: Value = serde_json::from_str(&envelope).unwrap();

        assert_eq!(parsed[SOURCE_FILE_KEY], json!("doc.pdf"));
        assert_eq!(
            serde_json::from_str::<Value>(parsed[TAG_KEY].as_str().unwrap()).unwrap(),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let payload = json!({"title": "x", "tags": ["a", "b"], "count": 3});
        let envelope = encode_engine_input(&payload, Some("doc.pdf")).unwrap();

        // Wrap the single-object write form into the array-of-records read form.
        let record: Value = serde_json::from_str(&envelope).unwrap();
        let read_form = serde_json::to_string(&json!([record])).unwrap();

        assert_eq!(decode_engine_output(&read_form), DecodedTag::Present(payload));
    }

    #[test]
    fn test_render_json_uses_four_space_indent() {
        let text = render(&json!({"title": "x"}), Format::Json).unwrap();
        assert_eq!(text, "{\n    \"title\": \"x\"\n}");
    }

    #[test]
    fn test_render_empty_object() {
        assert_eq!(render(&json!({}), Format::Json).unwrap(), "{}");
    }

    #[test]
    fn test_render_yaml_block_style() {
        let text = render(&json!({"title": "x", "year": 2021}), Format::Yaml).unwrap();
        assert!(text.contains("title: x"));
        assert!(text.contains("year: 2021"));
    }

    #[test]
    fn test_load_json_object() {
        assert_eq!(load(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_load_json_array() {
        assert_eq!(load("  [1, 2]  ").unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_load_yaml() {
        assert_eq!(
            load("title: x\nyear: 2021\n").unwrap(),
            json!({"title": "x", "year": 2021})
        );
    }

    #[test]
    fn test_load_rejects_broken_json() {
        assert!(load("{broken").is_err());
    }

    #[test]
    fn test_load_render_stability() {
        let original = load("title: x\ncount: 2\n").unwrap();
        let rendered = render(&original, Format::Json).unwrap();
        assert_eq!(load(&rendered).unwrap(), original);
    }
}
