//! Merge of default field sets with persisted configuration.

use serde::Serialize;

use crate::form::{DefaultFieldSet, FieldDescriptor, FormConfiguration, FormKind};

/// Order reported for default fields the configuration does not position.
///
/// Sorting does not depend on this value: unpositioned fields always come
/// after every positioned one, whatever orders the configuration uses.
pub const UNCONFIGURED_ORDER: i64 = 999;

/// A default field with its effective label, order and visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField<'a> {
    /// The code-defined descriptor this entry renders with.
    #[serde(skip)]
    pub default: &'a FieldDescriptor,
    pub name: &'a str,
    pub label: String,
    pub order: i64,
    pub visible: bool,
    /// False when the order came from the sentinel.
    pub positioned: bool,
}

impl ResolvedField<'_> {
    /// The default descriptor with effective values applied.
    pub fn to_descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            label: self.label.clone(),
            order: self.order,
            visible: self.visible,
            ..self.default.clone()
        }
    }

    fn sort_key(&self) -> (bool, i64) {
        (!self.positioned, self.order)
    }
}

/// Merge defaults with an optional configuration and drop invisible fields.
pub fn resolve<'a>(
    defaults: &'a DefaultFieldSet,
    config: Option<&FormConfiguration>,
) -> Vec<ResolvedField<'a>> {
    let mut fields = resolve_all(defaults, config);
    fields.retain(|f| f.visible);
    fields
}

/// Merge defaults with an optional configuration, keeping invisible fields.
///
/// Every default field appears exactly once. A configuration without any
/// field entries behaves like no configuration at all.
pub fn resolve_all<'a>(
    defaults: &'a DefaultFieldSet,
    config: Option<&FormConfiguration>,
) -> Vec<ResolvedField<'a>> {
    let config = config.filter(|c| !c.fields.is_empty());

    let mut fields: Vec<ResolvedField<'a>> = defaults
        .fields()
        .iter()
        .map(|default| match config {
            None => ResolvedField {
                default,
                name: &default.name,
                label: default.label.clone(),
                order: default.order,
                visible: default.visible,
                positioned: true,
            },
            Some(config) => merge_field(defaults.kind(), default, config),
        })
        .collect();

    // Vec::sort_by_key is stable: ties keep declaration order.
    fields.sort_by_key(|f| f.sort_key());
    fields
}

fn merge_field<'a>(
    kind: FormKind,
    default: &'a FieldDescriptor,
    config: &FormConfiguration,
) -> ResolvedField<'a> {
    let Some(entry) = config.field(&default.name) else {
        return ResolvedField {
            default,
            name: &default.name,
            label: default.label.clone(),
            order: UNCONFIGURED_ORDER,
            visible: default.visible,
            positioned: false,
        };
    };

    let label = match (kind, entry.label.as_deref()) {
        (FormKind::Menu, Some(label)) if !label.trim().is_empty() => label.to_string(),
        _ => default.label.clone(),
    };

    ResolvedField {
        default,
        name: &default.name,
        label,
        order: entry.order.unwrap_or(UNCONFIGURED_ORDER),
        visible: entry.visible.unwrap_or(default.visible),
        positioned: entry.order.is_some(),
    }
}
