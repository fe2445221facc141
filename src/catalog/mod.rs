mod descriptor;
mod property;
mod source;

pub use descriptor::{
    AccessibilityNotes, ComponentCategory, ComponentDescriptor, FanOut, Platform, PreviewConfig,
    UnknownPlatform, Variant, VariantColumn,
};
pub use property::{DefaultLiteralError, PropValue, PropertyKind, PropertySpec, UNDEFINED_LITERAL};
pub use source::{SourceSnippet, extract_snippets};

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use crate::assets::{self, AssetError};

const CATALOG_FOLDER: &str = "catalog";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("invalid component descriptor {path}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("component id `{0}` is declared more than once")]
    DuplicateId(String),
}

/// Immutable, ordered set of component descriptors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    components: Vec<ComponentDescriptor>,
}

impl Catalog {
    /// Descriptors embedded under `assets/catalog`, with Markdown snippets attached.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut components = Vec::new();
        for path in assets::list(CATALOG_FOLDER, "toml") {
            let text = assets::required_text(&path)?;
            let mut descriptor: ComponentDescriptor =
                toml::from_str(&text).map_err(|source| CatalogError::Parse {
                    path: path.clone(),
                    source,
                })?;
            let markdown = format!("{CATALOG_FOLDER}/{}.md", descriptor.id);
            if let Some(markdown) = assets::text(&markdown)? {
                descriptor.source = extract_snippets(&markdown);
            }
            debug!(
                component = %descriptor.id,
                asset = assets::file_stem(&path).unwrap_or_default(),
                snippets = descriptor.source.len(),
                "loaded component descriptor"
            );
            components.push(descriptor);
        }
        Self::from_descriptors(components)
    }

    /// Sorts by `order`, keeping declaration order for ties.
    pub fn from_descriptors(mut components: Vec<ComponentDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for component in &components {
            if !seen.insert(component.id.as_str()) {
                return Err(CatalogError::DuplicateId(component.id.clone()));
            }
        }
        components.sort_by_key(|component| component.order);
        Ok(Self { components })
    }

    pub fn get(&self, id: &str) -> Option<&ComponentDescriptor> {
        self.components.iter().find(|component| component.id == id)
    }

    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    pub fn first(&self) -> Option<&ComponentDescriptor> {
        self.components.first()
    }

    /// Case-insensitive name match. A blank query matches everything.
    pub fn search(&self, query: &str) -> Vec<&ComponentDescriptor> {
        let query = query.trim().to_lowercase();
        self.components
            .iter()
            .filter(|component| query.is_empty() || component.name.to_lowercase().contains(&query))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, name: &str, order: u32) -> ComponentDescriptor {
        toml::from_str(&format!(
            "id = \"{id}\"\nname = \"{name}\"\ncategory = \"base\"\norder = {order}\n"
        ))
        .expect("descriptor should parse")
    }

    #[test]
    fn builtin_catalog_loads_every_embedded_component() {
        let catalog = Catalog::builtin().expect("builtin catalog should load");
        let ids = catalog
            .components()
            .iter()
            .map(|component| component.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec!["button", "badge", "tab-bar", "toggle-tab-bar", "tds-tab-bar", "tab"]
        );
        assert_eq!(catalog.first().map(|component| component.id.as_str()), Some("button"));
    }

    #[test]
    fn builtin_descriptors_carry_source_snippets() {
        let catalog = Catalog::builtin().expect("builtin catalog should load");
        let button = catalog.get("button").expect("button should exist");
        assert_eq!(button.source.len(), 2);
        assert_eq!(button.source[0].title.as_deref(), Some("Usage"));
        assert_eq!(button.source[0].language.as_deref(), Some("jsx"));
        assert!(catalog.get("badge").is_some_and(|badge| badge.source.is_empty()));
    }

    #[test]
    fn builtin_descriptors_decode_every_default() {
        let catalog = Catalog::builtin().expect("builtin catalog should load");
        for component in catalog.components() {
            for spec in &component.properties {
                assert!(
                    spec.decode_default().is_ok(),
                    "{}.{} has an undecodable default `{}`",
                    component.id,
                    spec.name,
                    spec.default
                );
            }
        }
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = Catalog::from_descriptors(vec![
            descriptor("button", "Button", 1),
            descriptor("button", "Other Button", 2),
        ]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "button"));
    }

    #[test]
    fn descriptors_are_ordered_stably() {
        let catalog = Catalog::from_descriptors(vec![
            descriptor("c", "Gamma", 2),
            descriptor("a", "Alpha", 1),
            descriptor("b", "Beta", 2),
        ])
        .expect("catalog should build");
        let ids = catalog
            .components()
            .iter()
            .map(|component| component.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c", "b"]);
    }

    #[test]
    fn search_matches_names_case_insensitively() {
        let catalog = Catalog::from_descriptors(vec![
            descriptor("tab-bar", "Tab Bar", 1),
            descriptor("toggle", "Toggle Tab Bar", 2),
            descriptor("button", "Button", 3),
        ])
        .expect("catalog should build");
        let names = |query| {
            catalog
                .search(query)
                .into_iter()
                .map(|component| component.name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names("tab BAR"), vec!["Tab Bar", "Toggle Tab Bar"]);
        assert_eq!(names("  "), vec!["Tab Bar", "Toggle Tab Bar", "Button"]);
        assert!(names("slider").is_empty());
        assert!(catalog.get("slider").is_none());
    }
}
