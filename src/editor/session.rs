//! Local editing state for one form.

use serde::Serialize;

use crate::form::{ConfiguredField, DefaultFieldSet, FormConfiguration, FormName};
use crate::resolver::resolve_all;

/// One row of the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorEntry {
    pub name: String,
    pub label: String,
    /// Always equal to the entry's position in the list.
    pub order: i64,
    pub visible: bool,
    pub parent_path: Option<String>,
}

/// Snapshot of a form's effective order plus everything needed to write
/// the document back without losing data.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    form: FormName,
    entries: Vec<EditorEntry>,
    /// Entries of the opened configuration with no matching default field.
    inert: Vec<ConfiguredField>,
    /// Opened configuration with its field list cleared.
    metadata: FormConfiguration,
}

impl EditSession {
    /// Snapshot the effective field list of `defaults` under `config`.
    ///
    /// Hidden fields are included so that saving keeps them hidden.
    pub fn snapshot(defaults: &DefaultFieldSet, config: Option<&FormConfiguration>) -> Self {
        let entries = resolve_all(defaults, config)
            .into_iter()
            .enumerate()
            .map(|(position, field)| EditorEntry {
                name: field.name.to_string(),
                label: field.label,
                order: position as i64,
                visible: field.visible,
                parent_path: field.default.parent_path.clone(),
            })
            .collect();

        let (inert, metadata) = match config {
            Some(config) => {
                let inert = config
                    .fields
                    .iter()
                    .filter(|f| !defaults.fields().iter().any(|d| d.name == f.name))
                    .cloned()
                    .collect();
                let metadata = FormConfiguration {
                    fields: Vec::new(),
                    ..config.clone()
                };
                (inert, metadata)
            }
            None => (Vec::new(), FormConfiguration::default()),
        };

        Self {
            form: defaults.form().clone(),
            entries,
            inert,
            metadata,
        }
    }

    pub fn form(&self) -> &FormName {
        &self.form
    }

    pub fn entries(&self) -> &[EditorEntry] {
        &self.entries
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Swap `index` with its predecessor. Returns false at the top.
    pub(crate) fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.entries.swap(index - 1, index);
        self.renumber();
        true
    }

    /// Swap `index` with its successor. Returns false at the bottom.
    pub(crate) fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index + 1);
        self.renumber();
        true
    }

    fn renumber(&mut self) {
        for (position, entry) in self.entries.iter_mut().enumerate() {
            entry.order = position as i64;
        }
    }

    /// The full replacement document for the current local order.
    pub fn to_configuration(&self) -> FormConfiguration {
        let mut fields: Vec<ConfiguredField> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| ConfiguredField {
                name: entry.name.clone(),
                label: Some(entry.label.clone()),
                order: Some(position as i64),
                visible: Some(entry.visible),
                parent_path: entry.parent_path.clone(),
                ..ConfiguredField::default()
            })
            .collect();
        fields.extend(self.inert.iter().cloned());

        FormConfiguration {
            fields,
            ..self.metadata.clone()
        }
    }
}
