use std::path::{Component, Path};

use rust_embed::RustEmbed;
use thiserror::Error;

#[derive(RustEmbed)]
#[folder = "assets"]
struct WorkshopAssets;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum AssetError {
    #[error("embedded asset `{0}` is not valid UTF-8")]
    NotUtf8(String),
    #[error("embedded asset `{0}` is missing")]
    Missing(String),
}

pub(crate) fn text(path: &str) -> Result<Option<String>, AssetError> {
    let Some(file) = WorkshopAssets::get(path) else {
        return Ok(None);
    };
    String::from_utf8(file.data.into_owned())
        .map(Some)
        .map_err(|_| AssetError::NotUtf8(path.to_string()))
}

pub(crate) fn required_text(path: &str) -> Result<String, AssetError> {
    text(path)?.ok_or_else(|| AssetError::Missing(path.to_string()))
}

/// Embedded asset paths directly under `folder` with the given extension, sorted.
pub(crate) fn list(folder: &str, extension: &str) -> Vec<String> {
    let mut names = WorkshopAssets::iter()
        .filter_map(|relative| {
            let relative = relative.as_ref();
            let path = sanitize_relative_path(relative)?;
            let parent = path.parent()?;
            let matches = parent == Path::new(folder)
                && path.extension().and_then(|value| value.to_str()) == Some(extension);
            matches.then(|| relative.to_string())
        })
        .collect::<Vec<_>>();
    names.sort();
    names
}

pub(crate) fn file_stem(path: &str) -> Option<&str> {
    Path::new(path).file_stem().and_then(|value| value.to_str())
}

fn sanitize_relative_path(input: &str) -> Option<&Path> {
    let path = Path::new(input);
    path.components()
        .all(|component| matches!(component, Component::Normal(_)))
        .then_some(path)
}
