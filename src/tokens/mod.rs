mod error;
mod filter;
mod fonts;
mod format;
mod math;
mod merge;
mod pipeline;

pub use error::{FormatError, TokenBuildError};
pub use filter::{CategoryDecision, FilterReport, ThemeFilter, merge_categories};
pub use fonts::{FontFaceConfig, FontWeight};
pub use format::{CssVariablesFormatter, FormattedTokens, TokenFormatter};
pub use merge::{BorderDefaults, deep_merge, repair_borders};
pub use pipeline::{BuildSummary, CompiledTokens, build_tokens, compile_tokens, rewrite_transparent};

use serde_json::Value;

pub type TokenMap = serde_json::Map<String, Value>;

pub const VALUE_KEY: &str = "$value";
pub const TYPE_KEY: &str = "$type";
pub const DESCRIPTION_KEY: &str = "$description";

/// A node is a leaf iff it carries `$value`. A child named `value` is just a token.
pub fn is_leaf(node: &TokenMap) -> bool {
    node.contains_key(VALUE_KEY)
}

/// The object behind `value` when it is a group rather than a leaf.
pub fn as_group(value: &Value) -> Option<&TokenMap> {
    value.as_object().filter(|node| !is_leaf(node))
}

#[derive(Clone, Debug, PartialEq)]
pub struct TokenLeaf<'a> {
    pub path: Vec<&'a str>,
    pub token_type: Option<&'a str>,
    pub value: &'a Value,
    pub description: Option<&'a str>,
}

impl<'a> TokenLeaf<'a> {
    fn from_node(path: Vec<&'a str>, node: &'a TokenMap) -> Option<Self> {
        let value = node.get(VALUE_KEY)?;
        Some(Self {
            path,
            token_type: node.get(TYPE_KEY).and_then(Value::as_str),
            value,
            description: node
                .get(DESCRIPTION_KEY)
                .and_then(Value::as_str)
                .filter(|text| !text.trim().is_empty()),
        })
    }

    pub fn dotted_path(&self) -> String {
        self.path.join(".")
    }
}

/// Merged token tree, keyed in source insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenTree {
    root: TokenMap,
}

impl TokenTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: TokenMap) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &TokenMap {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut TokenMap {
        &mut self.root
    }

    pub fn into_map(self) -> TokenMap {
        self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn merge(&mut self, source: &TokenMap) {
        deep_merge(&mut self.root, source);
    }

    /// Leaf reached by walking `path` through groups.
    pub fn leaf(&self, path: &[&str]) -> Option<TokenLeaf<'_>> {
        let (last, parents) = path.split_last()?;
        let mut node = &self.root;
        let mut leaf_path = Vec::with_capacity(path.len());
        for segment in parents {
            let (key, child) = node.get_key_value(*segment)?;
            node = as_group(child)?;
            leaf_path.push(key.as_str());
        }
        let (key, target) = node.get_key_value(*last)?;
        leaf_path.push(key.as_str());
        TokenLeaf::from_node(leaf_path, target.as_object()?)
    }

    /// Every leaf, depth first in insertion order.
    pub fn leaves(&self) -> Vec<TokenLeaf<'_>> {
        let mut leaves = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut leaves);
        leaves
    }

    pub fn wrap(self, wrapper: &str) -> Value {
        let mut outer = TokenMap::new();
        outer.insert(wrapper.to_string(), Value::Object(self.root));
        Value::Object(outer)
    }
}

fn collect_leaves<'a>(node: &'a TokenMap, path: &mut Vec<&'a str>, out: &mut Vec<TokenLeaf<'a>>) {
    for (key, value) in node {
        let Some(child) = value.as_object() else {
            continue;
        };
        path.push(key.as_str());
        if is_leaf(child) {
            if let Some(leaf) = TokenLeaf::from_node(path.clone(), child) {
                out.push(leaf);
            }
        } else {
            collect_leaves(child, path, out);
        }
        path.pop();
    }
}

/// Top-level token export: theme category name to `{ tds: TokenNode, ... }`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenSource {
    categories: TokenMap,
}

impl TokenSource {
    pub fn from_json_str(text: &str) -> Result<Self, TokenBuildError> {
        let value = serde_json::from_str::<Value>(text).map_err(TokenBuildError::Parse)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, TokenBuildError> {
        match value {
            Value::Object(categories) => Ok(Self { categories }),
            other => Err(TokenBuildError::NotAnObject(json_kind(&other))),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.categories
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
