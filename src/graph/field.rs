use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::UNIX_EPOCH;

/// Declared type of a field. Drives coercion in the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Boolean,
    Array,
    File,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::File => "file",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whatever the editor stored in a field. The shape is not guaranteed to
/// match the declared `FieldType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
    File(FileRef),
}

impl FieldValue {
    /// Short name of the runtime shape, used in anomaly reports.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "boolean",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::List(_) => "array",
            FieldValue::File(_) => "file",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(value: Vec<String>) -> Self {
        FieldValue::List(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}

/// A named, typed input slot on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default, rename = "fieldType", alias = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default, rename = "readOnly")]
    pub read_only: bool,
}

impl Field {
    pub fn new(label: &str, field_type: FieldType, value: Option<FieldValue>) -> Self {
        Self {
            label: label.to_string(),
            value,
            field_type,
            placeholder: String::new(),
            read_only: false,
        }
    }

    pub fn text(label: &str, value: impl Into<FieldValue>) -> Self {
        Self::new(label, FieldType::Text, Some(value.into()))
    }

    pub fn number(label: &str, value: Option<f64>) -> Self {
        Self::new(label, FieldType::Number, value.map(FieldValue::Number))
    }

    pub fn boolean(label: &str, value: bool) -> Self {
        Self::new(label, FieldType::Boolean, Some(FieldValue::Bool(value)))
    }

    pub fn array<S: Into<String>>(label: &str, items: impl IntoIterator<Item = S>) -> Self {
        let items = items.into_iter().map(Into::into).collect();
        Self::new(label, FieldType::Array, Some(FieldValue::List(items)))
    }

    pub fn file(label: &str, file: Option<FileRef>) -> Self {
        Self::new(label, FieldType::File, file.map(FieldValue::File))
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Same field with no value set.
    pub fn unset(mut self) -> Self {
        self.value = None;
        self
    }
}

/// An uploaded file. `content` stays `None` until the bytes are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(rename = "size", default)]
    pub size_bytes: u64,
    #[serde(rename = "lastModified", default)]
    pub last_modified: i64,
    #[serde(default, with = "content_base64")]
    pub content: Option<Vec<u8>>,
}

impl FileRef {
    pub fn new(name: &str, mime_type: &str, size_bytes: u64, last_modified: i64) -> Self {
        Self {
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
            last_modified,
            content: None,
        }
    }

    pub fn with_content(mut self, content: Vec<u8>) -> Self {
        self.size_bytes = content.len() as u64;
        self.content = Some(content);
        self
    }

    pub fn is_loaded(&self) -> bool {
        self.content.is_some()
    }

    /// Describes a file on disk. The bytes are only read when `load_content` is set.
    pub fn from_path(path: &Path, load_content: bool) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let file = FileRef::new(&name, guess_mime_type(path), metadata.len(), last_modified);
        if load_content {
            Ok(file.with_content(std::fs::read(path)?))
        } else {
            Ok(file)
        }
    }
}

fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("txt") | Some("md") => "text/plain",
        _ => "application/octet-stream",
    }
}

/// File bytes travel as base64 text in JSON.
mod content_base64 {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(content: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match content {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|text| STANDARD.decode(text.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}
