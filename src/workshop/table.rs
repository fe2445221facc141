use crate::catalog::{PropertyKind, PropertySpec};

use super::props::InteractiveProps;

const MISSING_DESCRIPTION: &str = "No description provided";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyControl {
    Select(Vec<String>),
    TextInput,
    ReadOnly,
}

impl PropertyControl {
    pub fn for_kind(kind: &PropertyKind) -> Self {
        match kind {
            PropertyKind::Text => PropertyControl::TextInput,
            PropertyKind::List | PropertyKind::Callback => PropertyControl::ReadOnly,
            PropertyKind::Boolean | PropertyKind::Enum(_) => kind
                .options()
                .filter(|options| !options.is_empty())
                .map(PropertyControl::Select)
                .unwrap_or(PropertyControl::ReadOnly),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyRow<'a> {
    pub name: &'a str,
    pub type_label: &'a str,
    pub control: PropertyControl,
    /// Current value as control text; the default literal while unset.
    pub value: String,
    pub description: &'a str,
    pub dirty: bool,
}

pub(crate) fn property_rows<'a>(specs: &'a [PropertySpec], props: &InteractiveProps) -> Vec<PropertyRow<'a>> {
    specs
        .iter()
        .map(|spec| PropertyRow {
            name: &spec.name,
            type_label: &spec.type_label,
            control: PropertyControl::for_kind(&spec.kind),
            value: props
                .get(&spec.name)
                .map(ToString::to_string)
                .unwrap_or_else(|| spec.default.clone()),
            description: if spec.description.trim().is_empty() {
                MISSING_DESCRIPTION
            } else {
                spec.description.as_str()
            },
            dirty: props.meta(&spec.name).is_some_and(|meta| meta.dirty),
        })
        .collect()
}
