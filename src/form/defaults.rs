//! Code-defined default field sets.
//!
//! Each form or menu ships with a fixed list of fields and their baked-in
//! order. Persisted configuration only ever rearranges (or hides) these.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::form::types::{FieldDescriptor, FieldType, FormError, FormName};

/// What a default set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    /// Data-entry form: configuration only moves or hides fields.
    Form,
    /// Navigation menu: configuration may also relabel entries.
    Menu,
}

/// Immutable default field list for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultFieldSet {
    form: FormName,
    kind: FormKind,
    fields: Vec<FieldDescriptor>,
}

impl DefaultFieldSet {
    /// Build a default set. Field names must be unique.
    pub fn new(
        form: FormName,
        kind: FormKind,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, FormError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FormError::DuplicateField {
                    form: form.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { form, kind, fields })
    }

    pub fn form(&self) -> &FormName {
        &self.form
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Lookup of default sets by form name.
#[derive(Debug, Clone, Default)]
pub struct DefaultRegistry {
    sets: HashMap<FormName, DefaultFieldSet>,
}

impl DefaultRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a set, replacing any previous set for the same form.
    pub fn register(&mut self, set: DefaultFieldSet) {
        self.sets.insert(set.form.clone(), set);
    }

    pub fn get(&self, form: &FormName) -> Option<&DefaultFieldSet> {
        self.sets.get(form)
    }

    pub fn forms(&self) -> impl Iterator<Item = &FormName> {
        self.sets.keys()
    }

    /// The portal's built-in forms and navigation menu.
    pub fn builtin() -> Result<Self, FormError> {
        let mut registry = Self::new();
        registry.register(asset_form()?);
        registry.register(expense_form()?);
        registry.register(training_form()?);
        registry.register(main_layout()?);
        Ok(registry)
    }
}

fn asset_form() -> Result<DefaultFieldSet, FormError> {
    DefaultFieldSet::new(
        FormName::from_static("AssetForm"),
        FormKind::Form,
        vec![
            FieldDescriptor::new("name", "Name", FieldType::Text, 0).required(),
            FieldDescriptor::new("serialNumber", "Serial Number", FieldType::Text, 1).required(),
            FieldDescriptor::new("type", "Type", FieldType::Select, 2).required(),
            FieldDescriptor::new("status", "Status", FieldType::Select, 3),
            FieldDescriptor::new("purchaseDate", "Purchase Date", FieldType::Date, 4),
            FieldDescriptor::new("purchasePrice", "Purchase Price", FieldType::Number, 5),
            FieldDescriptor::new("vendorId", "Vendor", FieldType::Select, 6),
            FieldDescriptor::new("location", "Location", FieldType::Text, 7),
            FieldDescriptor::new("assignedTo", "Assigned To", FieldType::Email, 8),
            FieldDescriptor::new("notes", "Notes", FieldType::Textarea, 9),
        ],
    )
}

fn expense_form() -> Result<DefaultFieldSet, FormError> {
    DefaultFieldSet::new(
        FormName::from_static("ExpenseForm"),
        FormKind::Form,
        vec![
            FieldDescriptor::new("description", "Description", FieldType::Text, 0).required(),
            FieldDescriptor::new("amount", "Amount", FieldType::Number, 1).required(),
            FieldDescriptor::new("category", "Category", FieldType::Select, 2).required(),
            FieldDescriptor::new("expenseDate", "Expense Date", FieldType::Date, 3).required(),
            FieldDescriptor::new("receiptNumber", "Receipt Number", FieldType::Text, 4),
            FieldDescriptor::new("notes", "Notes", FieldType::Textarea, 5),
        ],
    )
}

fn training_form() -> Result<DefaultFieldSet, FormError> {
    DefaultFieldSet::new(
        FormName::from_static("TrainingForm"),
        FormKind::Form,
        vec![
            FieldDescriptor::new("title", "Title", FieldType::Text, 0).required(),
            FieldDescriptor::new("trainer", "Trainer", FieldType::Text, 1),
            FieldDescriptor::new("startDate", "Start Date", FieldType::Date, 2).required(),
            FieldDescriptor::new("endDate", "End Date", FieldType::Date, 3),
            FieldDescriptor::new("capacity", "Capacity", FieldType::Number, 4),
            FieldDescriptor::new("contactEmail", "Contact Email", FieldType::Email, 5),
            FieldDescriptor::new("internalCode", "Internal Code", FieldType::Text, 6).hidden(),
            FieldDescriptor::new("description", "Description", FieldType::Textarea, 7),
        ],
    )
}

fn main_layout() -> Result<DefaultFieldSet, FormError> {
    DefaultFieldSet::new(
        FormName::from_static("MainLayout"),
        FormKind::Menu,
        vec![
            FieldDescriptor::menu_item("/dashboard", "Dashboard", 0),
            FieldDescriptor::menu_item("/assets", "Assets", 1),
            FieldDescriptor::menu_item("/assets/licenses", "Licenses", 2).under("/assets"),
            FieldDescriptor::menu_item("/assets/maintenance", "Maintenance", 3).under("/assets"),
            FieldDescriptor::menu_item("/assets/movements", "Movements", 4).under("/assets"),
            FieldDescriptor::menu_item("/training", "Training", 5),
            FieldDescriptor::menu_item("/expenses", "Expenses", 6),
            FieldDescriptor::menu_item("/settings", "Settings", 7),
            FieldDescriptor::menu_item("/settings/forms", "Form Layouts", 8).under("/settings"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_field_rejected() {
        let err = DefaultFieldSet::new(
            FormName::from_static("Dup"),
            FormKind::Form,
            vec![
                FieldDescriptor::new("a", "A", FieldType::Text, 0),
                FieldDescriptor::new("a", "Again", FieldType::Text, 1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, FormError::DuplicateField { ref field, .. } if field == "a"));
    }

    #[test]
    fn test_builtin_registry() {
        let registry = DefaultRegistry::builtin().unwrap();
        let asset = registry.get(&FormName::from_static("AssetForm")).unwrap();
        assert_eq!(asset.kind(), FormKind::Form);
        assert_eq!(asset.fields()[0].name, "name");

        let menu = registry.get(&FormName::from_static("MainLayout")).unwrap();
        assert_eq!(menu.kind(), FormKind::Menu);
        assert!(menu.fields().iter().all(|f| f.field_type == FieldType::MenuItem));

        assert!(registry.get(&FormName::from_static("Unknown")).is_none());
        assert_eq!(registry.forms().count(), 4);
    }
}
