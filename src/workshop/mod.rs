mod props;
mod table;


pub use props::{InteractiveProps, PropMeta, PropsSnapshot};
pub use table::{PropertyControl, PropertyRow};

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{
    AccessibilityNotes, Catalog, ComponentDescriptor, Platform, PropValue, SourceSnippet, Variant,
    VariantColumn,
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkshopTab {
    #[default]
    Preview,
    Source,
    Accessibility,
}

impl WorkshopTab {
    pub const ALL: [WorkshopTab; 3] = [
        WorkshopTab::Preview,
        WorkshopTab::Source,
        WorkshopTab::Accessibility,
    ];

    pub fn id(self) -> &'static str {
        match self {
            WorkshopTab::Preview => "preview",
            WorkshopTab::Source => "source",
            WorkshopTab::Accessibility => "accessibility",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WorkshopTab::Preview => "Preview",
            WorkshopTab::Source => "Component Source",
            WorkshopTab::Accessibility => "Accessibility",
        }
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown tab `{0}`, expected `preview`, `source` or `accessibility`")]
pub struct UnknownTab(pub String);

impl FromStr for WorkshopTab {
    type Err = UnknownTab;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase();
        WorkshopTab::ALL
            .into_iter()
            .find(|tab| tab.id() == wanted)
            .ok_or_else(|| UnknownTab(value.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractiveExample {
    /// Fan-out value as a heading, e.g. `Secondary`. `None` for the single instance.
    pub label: Option<String>,
    pub props: BTreeMap<String, PropValue>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariantColumns<'a> {
    pub left: Vec<&'a Variant>,
    pub right: Vec<&'a Variant>,
    pub unassigned: Vec<&'a Variant>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TabContent<'a> {
    NothingSelected,
    Preview {
        platform: Platform,
        examples: Vec<InteractiveExample>,
        rows: Vec<PropertyRow<'a>>,
    },
    Source(&'a [SourceSnippet]),
    Accessibility(Option<&'a AccessibilityNotes>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WorkshopSnapshot {
    pub component: Option<String>,
    pub platform: Platform,
    pub tab: WorkshopTab,
    pub props: PropsSnapshot,
}

/// Session state of the workshop: what is shown and what is being edited.
#[derive(Clone, Debug)]
pub struct Workshop<'c> {
    catalog: &'c Catalog,
    selected: Option<&'c ComponentDescriptor>,
    platform: Platform,
    active_tab: WorkshopTab,
    props: InteractiveProps,
}

impl<'c> Workshop<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        let mut workshop = Self {
            catalog,
            selected: None,
            platform: Platform::Web,
            active_tab: WorkshopTab::Preview,
            props: InteractiveProps::default(),
        };
        if let Some(first) = catalog.first() {
            workshop.select(first);
        }
        workshop
    }

    pub fn selected(&self) -> Option<&'c ComponentDescriptor> {
        self.selected
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn active_tab(&self) -> WorkshopTab {
        self.active_tab
    }

    pub fn props(&self) -> &InteractiveProps {
        &self.props
    }

    /// Returns `false`, leaving the state untouched, for an unknown id.
    pub fn select_component(&mut self, id: &str) -> bool {
        match self.catalog.get(id) {
            Some(descriptor) => {
                self.select(descriptor);
                true
            }
            None => {
                debug!(component = id, "ignoring selection of unknown component");
                false
            }
        }
    }

    fn select(&mut self, descriptor: &'c ComponentDescriptor) {
        self.selected = Some(descriptor);
        self.active_tab = WorkshopTab::Preview;
        self.props = InteractiveProps::seeded(seed_props(descriptor));
        debug!(component = %descriptor.id, props = self.props.len(), "selected component");
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub fn set_active_tab(&mut self, tab: WorkshopTab) {
        self.active_tab = tab;
    }

    /// Coerces `raw` by the property's declared kind. Returns `false` for an
    /// unknown property or when nothing is selected.
    pub fn change_property(&mut self, name: &str, raw: &str) -> bool {
        let Some(spec) = self.selected.and_then(|descriptor| descriptor.property(name)) else {
            debug!(property = name, "ignoring change to unknown property");
            return false;
        };
        self.props.set(name, spec.coerce(raw));
        true
    }

    pub fn reset_property(&mut self, name: &str) -> bool {
        if self
            .selected
            .and_then(|descriptor| descriptor.property(name))
            .is_none()
        {
            return false;
        }
        self.props.reset(name);
        true
    }

    pub fn reset_props(&mut self) {
        self.props.reset_all();
    }

    pub fn is_dirty(&self) -> bool {
        self.props.is_dirty()
    }

    pub fn snapshot(&self) -> WorkshopSnapshot {
        WorkshopSnapshot {
            component: self.selected.map(|descriptor| descriptor.id.clone()),
            platform: self.platform,
            tab: self.active_tab,
            props: self.props.snapshot(),
        }
    }

    pub fn search(&self, query: &str) -> Vec<&'c ComponentDescriptor> {
        self.catalog.search(query)
    }

    pub fn property_rows(&self) -> Vec<PropertyRow<'c>> {
        match self.selected {
            Some(descriptor) => table::property_rows(&descriptor.properties, &self.props),
            None => Vec::new(),
        }
    }

    /// One instance per fan-out value when the component declares one, else a
    /// single instance of the current props.
    pub fn interactive_examples(&self) -> Vec<InteractiveExample> {
        let Some(descriptor) = self.selected else {
            return Vec::new();
        };
        match &descriptor.preview.fan_out {
            Some(fan_out) if !fan_out.values.is_empty() => fan_out
                .values
                .iter()
                .map(|value| InteractiveExample {
                    label: Some(capitalize(value)),
                    props: self
                        .props
                        .with_override(&fan_out.property, PropValue::Text(value.clone())),
                })
                .collect(),
            _ => vec![InteractiveExample {
                label: None,
                props: self.props.values().clone(),
            }],
        }
    }

    pub fn variant_columns(&self) -> VariantColumns<'c> {
        let mut columns = VariantColumns::default();
        let Some(descriptor) = self.selected else {
            return columns;
        };
        for variant in &descriptor.variants {
            match variant.column {
                Some(VariantColumn::Left) => columns.left.push(variant),
                Some(VariantColumn::Right) => columns.right.push(variant),
                None => columns.unassigned.push(variant),
            }
        }
        columns
    }

    pub fn tab_content(&self) -> TabContent<'c> {
        let Some(descriptor) = self.selected else {
            return TabContent::NothingSelected;
        };
        match self.active_tab {
            WorkshopTab::Preview => TabContent::Preview {
                platform: self.platform,
                examples: self.interactive_examples(),
                rows: self.property_rows(),
            },
            WorkshopTab::Source => TabContent::Source(&descriptor.source),
            WorkshopTab::Accessibility => TabContent::Accessibility(descriptor.accessibility.as_ref()),
        }
    }
}

fn seed_props(descriptor: &ComponentDescriptor) -> BTreeMap<String, PropValue> {
    let mut values = BTreeMap::new();
    for spec in &descriptor.properties {
        match spec.decode_default() {
            Ok(Some(value)) => {
                values.insert(spec.name.clone(), value);
            }
            Ok(None) => {}
            Err(error) => {
                debug!(
                    component = %descriptor.id,
                    property = %spec.name,
                    %error,
                    "skipping undecodable default"
                );
            }
        }
    }
    for (name, value) in descriptor.seed_values() {
        values.insert(name.to_string(), value);
    }
    values
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
