//! Normalization of raw configuration documents.
//!
//! # Responsibilities
//! - Turn an opaque stored document into a typed `FormConfiguration`
//! - Degrade to "no configuration" on shape mismatch instead of failing
//! - Drop individual field entries that cannot be used (no `name`)
//!
//! # Design Decisions
//! - The only place in the crate that deals with malformed documents
//! - Mismatches are logged at warn level, never surfaced as errors

use serde_json::{Map, Value};

use crate::form::types::{ConfigDocument, ConfiguredField, FormConfiguration, FormName};

/// Normalize a stored document for `form`.
///
/// Returns `None` when the document is not an object or has no `fields`
/// list. An empty `fields` list is returned as-is; the resolver treats it
/// like an absent configuration.
pub fn normalize(form: &FormName, document: &ConfigDocument) -> Option<FormConfiguration> {
    let Some(object) = document.as_value().as_object() else {
        tracing::warn!(form = %form, "Configuration document is not an object, using defaults");
        return None;
    };

    let Some(Value::Array(entries)) = object.get("fields") else {
        tracing::warn!(form = %form, "Configuration document has no fields list, using defaults");
        return None;
    };

    let mut fields = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<ConfiguredField>(entry.clone()) {
            Ok(field) if !field.name.is_empty() => fields.push(field),
            Ok(_) => {
                tracing::warn!(form = %form, index, "Dropping field entry with empty name");
            }
            Err(e) => {
                tracing::warn!(form = %form, index, error = %e, "Dropping unreadable field entry");
            }
        }
    }

    let mut extra = Map::new();
    let mut layout = None;
    let mut kind = None;
    let mut title = None;
    for (key, value) in object {
        match key.as_str() {
            "fields" => {}
            "layout" => layout = text_property(form, key, value),
            "type" => kind = text_property(form, key, value),
            "title" => title = text_property(form, key, value),
            _ => {
                extra.insert(key.clone(), value.clone());
            }
        }
    }

    Some(FormConfiguration {
        fields,
        layout,
        kind,
        title,
        extra,
    })
}

fn text_property(form: &FormName, key: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => {
            tracing::warn!(form = %form, property = key, value = %other, "Ignoring non-text property");
            None
        }
    }
}
