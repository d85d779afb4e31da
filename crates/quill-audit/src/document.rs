//! Append-only change documents.
//!
//! A [`ChangeDocument`] collects `key -> ["add", value]` tuples for one
//! audited entity. It is written straight into its JSON text so that the
//! wire format keeps every append in call order, including repeated keys.
//! Finishing the document consumes it; a [`FinishedDocument`] cannot be
//! appended to.

use serde::Serialize;

use crate::error::AuditError;

/// Operation tag written as the first element of every change tuple.
pub const CHANGE_OP_ADD: &str = "add";

/// Serialized form of a document with no fields.
pub const EMPTY_OBJECT: &str = "{}";

/// A scalar recorded in a change tuple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChangeValue {
    String(String),
    Uint64(u64),
}

impl From<&str> for ChangeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ChangeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<u64> for ChangeValue {
    fn from(value: u64) -> Self {
        Self::Uint64(value)
    }
}

/// Open change document for one entity.
#[derive(Debug, Clone)]
pub struct ChangeDocument {
    buffer: String,
    fields: usize,
}

impl Default for ChangeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeDocument {
    /// Start an empty object document.
    pub fn new() -> Self {
        Self {
            buffer: String::from("{"),
            fields: 0,
        }
    }

    /// Number of tuples appended so far.
    pub fn len(&self) -> usize {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields == 0
    }

    /// Append `key: ["add", value]`.
    pub fn add(&mut self, key: &str, value: impl Into<ChangeValue>) -> Result<(), AuditError> {
        let key = serde_json::to_string(key)?;
        let tuple = serde_json::to_string(&(CHANGE_OP_ADD, value.into()))?;

        if self.fields > 0 {
            self.buffer.push(',');
        }
        self.buffer.push_str(&key);
        self.buffer.push(':');
        self.buffer.push_str(&tuple);
        self.fields += 1;
        Ok(())
    }

    pub fn add_string(&mut self, key: &str, value: &str) -> Result<(), AuditError> {
        self.add(key, value)
    }

    pub fn add_uint64(&mut self, key: &str, value: u64) -> Result<(), AuditError> {
        self.add(key, value)
    }

    /// Close the document.
    pub fn finish(mut self) -> FinishedDocument {
        self.buffer.push('}');
        FinishedDocument(self.buffer)
    }
}

/// A closed change document, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedDocument(String);

impl FinishedDocument {
    /// True when the serialized text is exactly the empty object.
    pub fn is_empty_object(&self) -> bool {
        self.0 == EMPTY_OBJECT
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the document back into a JSON value.
    ///
    /// Repeated keys collapse to the last tuple in the parsed value.
    pub fn to_value(&self) -> Result<serde_json::Value, AuditError> {
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl std::fmt::Display for FinishedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_is_empty_object() {
        let doc = ChangeDocument::new();
        assert!(doc.is_empty());

        let finished = doc.finish();
        assert!(finished.is_empty_object());
        assert_eq!(finished.as_str(), "{}");
    }

    #[test]
    fn test_tuples_keep_call_order() {
        let mut doc = ChangeDocument::new();
        doc.add_uint64("host.tls_connect", 1).unwrap();
        doc.add_string("host.psk_identity", "abc").unwrap();
        assert_eq!(doc.len(), 2);

        let finished = doc.finish();
        assert!(!finished.is_empty_object());
        assert_eq!(
            finished.as_str(),
            r#"{"host.tls_connect":["add",1],"host.psk_identity":["add","abc"]}"#
        );
        assert_eq!(
            finished.to_value().unwrap(),
            json!({"host.tls_connect": ["add", 1], "host.psk_identity": ["add", "abc"]})
        );
    }

    #[test]
    fn test_repeated_key_is_not_deduplicated() {
        let mut doc = ChangeDocument::new();
        doc.add_string("host.name", "a").unwrap();
        doc.add_string("host.name", "b").unwrap();

        assert_eq!(
            doc.finish().into_string(),
            r#"{"host.name":["add","a"],"host.name":["add","b"]}"#
        );
    }

    #[test]
    fn test_strings_are_escaped() {
        let mut doc = ChangeDocument::new();
        doc.add_string("script.output", "line \"1\"\nline 2").unwrap();

        let value = doc.finish().to_value().unwrap();
        assert_eq!(value["script.output"][1], "line \"1\"\nline 2");
    }

    #[test]
    fn test_empty_string_value_is_not_an_empty_document() {
        let mut doc = ChangeDocument::new();
        doc.add_string("host.psk", "").unwrap();
        assert!(!doc.finish().is_empty_object());
    }
}
