use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::property::{PropValue, PropertySpec};
use super::source::SourceSnippet;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Base,
    Pattern,
    Subcomponent,
}

impl ComponentCategory {
    pub fn label(self) -> &'static str {
        match self {
            ComponentCategory::Base => "Base",
            ComponentCategory::Pattern => "Pattern",
            ComponentCategory::Subcomponent => "Subcomponent",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    App,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Platform::Web => "Web",
            Platform::App => "App",
        }
    }
}

impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown platform `{0}`, expected `web` or `app`")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "web" => Ok(Platform::Web),
            "app" => Ok(Platform::App),
            _ => Err(UnknownPlatform(value.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VariantColumn {
    Left,
    Right,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Variant {
    pub name: String,
    #[serde(default)]
    pub column: Option<VariantColumn>,
    #[serde(default)]
    pub props: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct AccessibilityNotes {
    pub aria_label: String,
    pub keyboard_navigation: String,
    pub screen_reader_support: String,
    pub color_contrast: String,
    #[serde(default)]
    pub focus_management: Option<String>,
}

impl AccessibilityNotes {
    /// Heading and body of every section that has content.
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        let mut sections = vec![
            ("ARIA Label", self.aria_label.as_str()),
            ("Keyboard Navigation", self.keyboard_navigation.as_str()),
            ("Screen Reader Support", self.screen_reader_support.as_str()),
            ("Color Contrast", self.color_contrast.as_str()),
        ];
        if let Some(focus) = &self.focus_management {
            sections.push(("Focus Management", focus.as_str()));
        }
        sections.retain(|(_, body)| !body.trim().is_empty());
        sections
    }
}

/// Render the interactive example once per value of `property`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct FanOut {
    pub property: String,
    pub values: Vec<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct PreviewConfig {
    #[serde(default)]
    pub fan_out: Option<FanOut>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ComponentDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ComponentCategory,
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub preview: PreviewConfig,
    /// Applied over the decoded defaults whenever the component is selected.
    #[serde(default)]
    pub seed_overrides: Map<String, Value>,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
    #[serde(default)]
    pub accessibility: Option<AccessibilityNotes>,
    #[serde(skip)]
    pub source: Vec<SourceSnippet>,
}

impl ComponentDescriptor {
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|spec| spec.name == name)
    }

    /// Seed values that are representable as props. Others are dropped.
    pub fn seed_values(&self) -> impl Iterator<Item = (&str, PropValue)> {
        self.seed_overrides.iter().filter_map(|(name, value)| {
            let value = match value {
                Value::Bool(flag) => PropValue::Bool(*flag),
                Value::String(text) => PropValue::Text(text.clone()),
                Value::Number(number) => PropValue::Text(number.to_string()),
                Value::Array(items) => PropValue::List(items.clone()),
                Value::Null | Value::Object(_) => return None,
            };
            Some((name.as_str(), value))
        })
    }
}
