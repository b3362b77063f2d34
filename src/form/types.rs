//! Form configuration types and error definitions.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Maximum length of a form name in bytes.
pub const MAX_FORM_NAME_LEN: usize = 128;

/// Errors raised while building or validating form configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// Form name is empty, too long or contains unsupported characters.
    #[error("Invalid form name '{0}'")]
    InvalidName(String),

    /// A default field set declares the same field twice.
    #[error("Duplicate field '{field}' in default set for {form}")]
    DuplicateField { form: String, field: String },

    /// Document is not an object.
    #[error("Configuration document must be a JSON object")]
    NotAnObject,

    /// Document has no `fields` list.
    #[error("Configuration document must contain a 'fields' list")]
    MissingFields,
}

/// Identifier of a logical form or menu, e.g. `AssetForm` or `MainLayout`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FormName(String);

impl FormName {
    /// Validate and wrap a form name.
    pub fn new(name: impl Into<String>) -> Result<Self, FormError> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(FormError::InvalidName(name))
        }
    }

    /// Wrap a name known at compile time.
    pub fn from_static(name: &'static str) -> Self {
        debug_assert!(Self::is_valid(name), "invalid static form name {name}");
        Self(name.to_string())
    }

    fn is_valid(name: &str) -> bool {
        !name.is_empty()
            && name.len() <= MAX_FORM_NAME_LEN
            && !name.starts_with('.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FormName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FormName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        FormName::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Semantic kind of a field or menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Textarea,
    Email,
    MenuItem,
    #[serde(other)]
    Other,
}

/// Code-defined description of one field or menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    pub order: i64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        field_type: FieldType,
        order: i64,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            order,
            visible: true,
            parent_path: None,
        }
    }

    /// Menu entry with `path` as its identifying name.
    pub fn menu_item(path: impl Into<String>, label: impl Into<String>, order: i64) -> Self {
        Self::new(path, label, FieldType::MenuItem, order)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Group this entry under another entry's path.
    pub fn under(mut self, parent_path: impl Into<String>) -> Self {
        self.parent_path = Some(parent_path.into());
        self
    }
}

/// One field entry as persisted in a configuration document.
///
/// Every property except `name` is optional; unknown properties are kept in
/// `extra` so hand-edited documents survive a load/save cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfiguredField {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(
        default,
        deserialize_with = "lenient_order",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfiguredField {
    pub fn positioned(name: impl Into<String>, order: i64) -> Self {
        Self {
            name: name.into(),
            order: Some(order),
            ..Self::default()
        }
    }
}

/// Accepts integers, floats (truncated) and numeric strings; anything else
/// counts as "no order".
fn lenient_order<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}

/// Typed view of a persisted configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormConfiguration {
    pub fields: Vec<ConfiguredField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FormConfiguration {
    pub fn with_fields(fields: Vec<ConfiguredField>) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// First entry carrying `name`.
    pub fn field(&self, name: &str) -> Option<&ConfiguredField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn to_document(&self) -> serde_json::Result<ConfigDocument> {
        serde_json::to_value(self).map(ConfigDocument)
    }
}

/// Opaque configuration document exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Value);

impl ConfigDocument {
    /// Accept a document for writing: it must be an object with a `fields` list.
    pub fn parse(value: Value) -> Result<Self, FormError> {
        let object = value.as_object().ok_or(FormError::NotAnObject)?;
        match object.get("fields") {
            Some(Value::Array(_)) => Ok(Self(value)),
            _ => Err(FormError::MissingFields),
        }
    }

    /// Wrap a document read back from storage without checking its shape.
    pub fn from_stored(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// A persisted document plus its storage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfiguration {
    /// Assigned on first save, kept across replacements.
    pub id: Uuid,
    pub form_name: FormName,
    pub config: ConfigDocument,
    /// Seconds since epoch.
    pub created_at: u64,
    pub updated_at: u64,
}
