use std::fmt::Write as _;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use super::{FontFaceConfig, FormatError, TokenMap, TokenTree, math};

const HEADER: &str = "/**\n * Do not edit directly, this file was auto-generated.\n */\n\n";

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("reference pattern is valid"));
static HEX_RGBA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rgba\(\s*#([0-9a-fA-F]{6}|[0-9a-fA-F]{3})\s*,\s*([^)]+?)\s*\)")
        .expect("rgba pattern is valid")
});

/// Turns a merged token tree into stylesheet text.
pub trait TokenFormatter {
    fn format(&self, tokens: &TokenTree) -> Result<FormattedTokens, FormatError>;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormattedTokens {
    pub text: String,
    pub variables: usize,
}

/// `:root { --name: value; }` output with references, math, unit and
/// composite handling.
#[derive(Clone, Debug)]
pub struct CssVariablesFormatter {
    wrapper: String,
    fraction_digits: u32,
    fonts: FontFaceConfig,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ValueKind {
    Color,
    Dimension,
    FontWeight,
    FontFamily,
    LineHeight,
    LetterSpacing,
    Opacity,
    Typography,
    Border,
    Shadow,
    Other,
}

impl ValueKind {
    fn from_type(token_type: Option<&str>) -> Self {
        match token_type.unwrap_or_default() {
            "color" => Self::Color,
            "dimension" | "sizing" | "spacing" | "borderRadius" | "borderWidth" | "fontSizes"
            | "fontSize" | "paragraphSpacing" | "paragraphIndent" => Self::Dimension,
            "fontWeights" | "fontWeight" => Self::FontWeight,
            "fontFamilies" | "fontFamily" => Self::FontFamily,
            "lineHeights" | "lineHeight" => Self::LineHeight,
            "letterSpacing" => Self::LetterSpacing,
            "opacity" => Self::Opacity,
            "typography" => Self::Typography,
            "border" => Self::Border,
            "boxShadow" | "shadow" => Self::Shadow,
            _ => Self::Other,
        }
    }

    fn typography_field(field: &str) -> Self {
        match field {
            "fontFamily" => Self::FontFamily,
            "fontWeight" => Self::FontWeight,
            "fontSize" | "paragraphSpacing" | "paragraphIndent" => Self::Dimension,
            "lineHeight" => Self::LineHeight,
            "letterSpacing" => Self::LetterSpacing,
            _ => Self::Other,
        }
    }

    fn border_field(field: &str) -> Self {
        match field {
            "color" => Self::Color,
            "width" => Self::Dimension,
            _ => Self::Other,
        }
    }

    fn shadow_field(field: &str) -> Self {
        match field {
            "color" => Self::Color,
            "x" | "y" | "offsetX" | "offsetY" | "blur" | "spread" => Self::Dimension,
            _ => Self::Other,
        }
    }
}

impl CssVariablesFormatter {
    pub fn new(wrapper: impl Into<String>, fraction_digits: u32, fonts: FontFaceConfig) -> Self {
        Self {
            wrapper: wrapper.into(),
            fraction_digits,
            fonts,
        }
    }

    fn variable_name(&self, path: &[&str]) -> String {
        std::iter::once(self.wrapper.as_str())
            .chain(path.iter().copied())
            .map(kebab_case)
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    fn declarations(&self, token: &str, kind: ValueKind, value: &Value) -> Vec<(Option<String>, String)> {
        let expand = |fields: &TokenMap, field_kind: fn(&str) -> ValueKind| {
            fields
                .iter()
                .filter_map(|(field, value)| {
                    self.scalar(field_kind(field), value)
                        .map(|css| (Some(field.clone()), css))
                })
                .collect::<Vec<_>>()
        };

        match (kind, value) {
            (ValueKind::Typography, Value::Object(fields)) => {
                expand(fields, ValueKind::typography_field)
            }
            (ValueKind::Border, Value::Object(fields)) => expand(fields, ValueKind::border_field),
            (ValueKind::Shadow, Value::Object(fields)) => expand(fields, ValueKind::shadow_field),
            (ValueKind::Shadow, Value::Array(layers)) => layers
                .iter()
                .enumerate()
                .flat_map(|(index, layer)| {
                    let Some(fields) = layer.as_object() else {
                        warn!(token, layer = index + 1, "skipping shadow layer that is not an object");
                        return Vec::new();
                    };
                    expand(fields, ValueKind::shadow_field)
                        .into_iter()
                        .map(|(field, css)| {
                            (field.map(|field| format!("{}-{field}", index + 1)), css)
                        })
                        .collect::<Vec<_>>()
                })
                .collect(),
            (_, Value::Object(_)) => {
                warn!(token, "skipping composite token of unsupported type");
                Vec::new()
            }
            _ => self
                .scalar(kind, value)
                .map(|css| vec![(None, css)])
                .unwrap_or_default(),
        }
    }

    fn scalar(&self, kind: ValueKind, value: &Value) -> Option<String> {
        let raw = match value {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            Value::Bool(flag) => flag.to_string(),
            Value::Array(items) => {
                let parts = items
                    .iter()
                    .filter_map(|item| self.scalar(kind, item))
                    .collect::<Vec<_>>();
                return (!parts.is_empty()).then(|| parts.join(", "));
            }
            Value::Null | Value::Object(_) => return None,
        };
        let raw = math::evaluate(&raw, self.fraction_digits).unwrap_or(raw);
        Some(self.transform(kind, raw))
    }

    fn transform(&self, kind: ValueKind, raw: String) -> String {
        match kind {
            ValueKind::Dimension if Decimal::from_str(&raw).is_ok() => format!("{raw}px"),
            ValueKind::FontWeight => self
                .fonts
                .weight_for(&raw)
                .map(|weight| weight.to_string())
                .unwrap_or(raw),
            ValueKind::LineHeight | ValueKind::Opacity => {
                percent_to_fraction(&raw, self.fraction_digits).unwrap_or(raw)
            }
            ValueKind::LetterSpacing => percent_to_fraction(&raw, self.fraction_digits)
                .map(|fraction| format!("{fraction}em"))
                .unwrap_or(raw),
            ValueKind::Color => expand_hex_rgba(&raw),
            _ => raw,
        }
    }
}

impl TokenFormatter for CssVariablesFormatter {
    fn format(&self, tokens: &TokenTree) -> Result<FormattedTokens, FormatError> {
        let resolver = Resolver {
            tree: tokens,
            wrapper: &self.wrapper,
        };
        let mut lines = Vec::new();

        for leaf in tokens.leaves() {
            let token = leaf.dotted_path();
            let mut chain = vec![token.clone()];
            let value = resolver.resolve(leaf.value, &token, &mut chain)?;
            let base = self.variable_name(&leaf.path);
            let kind = ValueKind::from_type(leaf.token_type);

            for (field, css) in self.declarations(&token, kind, &value) {
                let name = match field {
                    Some(field) => format!("{base}-{}", kebab_case(&field)),
                    None => base.clone(),
                };
                let mut line = format!("  --{name}: {css};");
                if let Some(description) = leaf.description {
                    let _ = write!(line, " /** {} */", description.replace("*/", "* /"));
                }
                lines.push(line);
            }
        }

        let mut text = String::from(HEADER);
        text.push_str(":root {\n");
        for line in &lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push_str("}\n");

        Ok(FormattedTokens {
            text,
            variables: lines.len(),
        })
    }
}

struct Resolver<'a> {
    tree: &'a TokenTree,
    wrapper: &'a str,
}

impl Resolver<'_> {
    fn resolve(&self, value: &Value, token: &str, chain: &mut Vec<String>) -> Result<Value, FormatError> {
        match value {
            Value::String(text) => self.resolve_text(text, token, chain),
            Value::Array(items) => items
                .iter()
                .map(|item| self.resolve(item, token, chain))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            Value::Object(fields) => {
                let mut resolved = TokenMap::new();
                for (key, field) in fields {
                    resolved.insert(key.clone(), self.resolve(field, token, chain)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    fn resolve_text(&self, text: &str, token: &str, chain: &mut Vec<String>) -> Result<Value, FormatError> {
        let trimmed = text.trim();
        if let Some(found) = REFERENCE.captures(trimmed)
            && let (Some(whole), Some(path)) = (found.get(0), found.get(1))
            && whole.start() == 0
            && whole.end() == trimmed.len()
        {
            return self.lookup(path.as_str(), token, chain);
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for found in REFERENCE.captures_iter(text) {
            let (Some(whole), Some(path)) = (found.get(0), found.get(1)) else {
                continue;
            };
            out.push_str(&text[last..whole.start()]);
            match self.lookup(path.as_str(), token, chain)? {
                Value::String(resolved) => out.push_str(&resolved),
                Value::Number(number) => out.push_str(&number.to_string()),
                Value::Bool(flag) => out.push_str(&flag.to_string()),
                _ => {
                    return Err(FormatError::CompositeInterpolation {
                        token: token.to_string(),
                        reference: path.as_str().to_string(),
                    });
                }
            }
            last = whole.end();
        }
        out.push_str(&text[last..]);
        Ok(Value::String(out))
    }

    fn lookup(&self, reference: &str, token: &str, chain: &mut Vec<String>) -> Result<Value, FormatError> {
        let reference = reference.trim();
        let segments = reference.split('.').collect::<Vec<_>>();
        let leaf = self
            .tree
            .leaf(&segments)
            .or_else(|| match segments.split_first() {
                Some((first, rest)) if *first == self.wrapper => self.tree.leaf(rest),
                _ => None,
            })
            .ok_or_else(|| FormatError::UnresolvedReference {
                token: token.to_string(),
                reference: reference.to_string(),
            })?;

        let key = leaf.dotted_path();
        if chain.contains(&key) {
            let mut cycle = chain.clone();
            cycle.push(key);
            return Err(FormatError::CircularReference { chain: cycle });
        }
        chain.push(key);
        let resolved = self.resolve(leaf.value, token, chain);
        chain.pop();
        resolved
    }
}

/// `fontSize` → `font-size`, `Font Size` → `font-size`, `HTMLElement` → `html-element`.
pub(crate) fn kebab_case(input: &str) -> String {
    let chars = input.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(input.len() + 4);
    for (index, ch) in chars.iter().copied().enumerate() {
        if !ch.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if ch.is_uppercase() && index > 0 && !out.is_empty() && !out.ends_with('-') {
            let previous = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if previous.is_lowercase() || (previous.is_uppercase() && next_is_lower) {
                out.push('-');
            }
        }
        out.extend(ch.to_lowercase());
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

fn percent_to_fraction(raw: &str, fraction_digits: u32) -> Option<String> {
    let number = raw.strip_suffix('%')?.trim();
    let value = Decimal::from_str(number).ok()? / Decimal::ONE_HUNDRED;
    Some(value.round_dp(fraction_digits).normalize().to_string())
}

fn expand_hex_rgba(raw: &str) -> String {
    HEX_RGBA
        .replace_all(raw, |found: &Captures<'_>| {
            let hex = &found[1];
            let expanded = if hex.len() == 3 {
                hex.chars().flat_map(|ch| [ch, ch]).collect::<String>()
            } else {
                hex.to_string()
            };
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&expanded[range], 16).unwrap_or_default()
            };
            format!(
                "rgba({}, {}, {}, {})",
                channel(0..2),
                channel(2..4),
                channel(4..6),
                &found[2]
            )
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::FontWeight;
    use serde_json::json;

    fn formatter() -> CssVariablesFormatter {
        let fonts = FontFaceConfig {
            family: "Wonder".into(),
            source: "/fonts/{name}.ttf".into(),
            format: "truetype".into(),
            style: "normal".into(),
            display: "swap".into(),
            weights: vec![
                FontWeight { name: "Regular".into(), weight: 400 },
                FontWeight { name: "SemiBold".into(), weight: 600 },
            ],
        };
        CssVariablesFormatter::new("tds", 3, fonts)
    }

    fn format(value: Value) -> Result<FormattedTokens, FormatError> {
        let Value::Object(map) = value else {
            panic!("tree must be an object");
        };
        formatter().format(&TokenTree::from_map(map))
    }

    fn declarations(value: Value) -> Vec<String> {
        format(value)
            .expect("tokens should format")
            .text
            .lines()
            .filter(|line| line.starts_with("  --"))
            .map(|line| line.trim().to_string())
            .collect()
    }

    #[test]
    fn wraps_declarations_in_root_block_with_header() {
        let formatted = format(json!({ "a": { "$type": "color", "$value": "#fff" } }))
            .expect("tokens should format");
        assert_eq!(
            formatted.text,
            "/**\n * Do not edit directly, this file was auto-generated.\n */\n\n:root {\n  --tds-a: #fff;\n}\n"
        );
        assert_eq!(formatted.variables, 1);
    }

    #[test]
    fn empty_tree_produces_an_empty_root() {
        let formatted = format(json!({})).expect("empty tree should format");
        assert_eq!(formatted.variables, 0);
        assert!(formatted.text.ends_with(":root {\n}\n"));
    }

    #[test]
    fn names_are_kebab_cased_paths() {
        let lines = declarations(json!({
            "Colors": { "Brand Primary": { "$type": "color", "$value": "#f00" } },
            "fontSize": { "heading1": { "$type": "fontSizes", "$value": "32" } }
        }));
        assert_eq!(
            lines,
            vec!["--tds-colors-brand-primary: #f00;", "--tds-font-size-heading1: 32px;"]
        );
    }

    #[test]
    fn resolves_whole_and_embedded_references() {
        let lines = declarations(json!({
            "base": { "$type": "spacing", "$value": "4" },
            "double": { "$type": "spacing", "$value": "{base} * 2" },
            "alias": { "$type": "spacing", "$value": "{tds.double}" },
            "brand": { "$type": "color", "$value": "#00ff00" },
            "ring": { "$type": "other", "$value": "0 0 0 2px {brand}" }
        }));
        assert_eq!(
            lines,
            vec![
                "--tds-base: 4px;",
                "--tds-double: 8px;",
                "--tds-alias: 8px;",
                "--tds-brand: #00ff00;",
                "--tds-ring: 0 0 0 2px #00ff00;",
            ]
        );
    }

    #[test]
    fn missing_and_circular_references_fail() {
        let missing = format(json!({ "a": { "$value": "{nope.gone}" } }));
        assert_eq!(
            missing,
            Err(FormatError::UnresolvedReference {
                token: "a".into(),
                reference: "nope.gone".into()
            })
        );

        let circular = format(json!({
            "a": { "$value": "{b}" },
            "b": { "$value": "{a}" }
        }));
        assert_eq!(
            circular,
            Err(FormatError::CircularReference {
                chain: vec!["a".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn applies_type_transforms() {
        let lines = declarations(json!({
            "weight": { "$type": "fontWeights", "$value": "Semi Bold" },
            "leading": { "$type": "lineHeights", "$value": "150%" },
            "tracking": { "$type": "letterSpacing", "$value": "2%" },
            "muted": { "$type": "opacity", "$value": "40%" },
            "overlay": { "$type": "color", "$value": "rgba(#000000, 0.5)" },
            "radius": { "$type": "borderRadius", "$value": 8 },
            "gap": { "$type": "spacing", "$value": "1rem" }
        }));
        assert_eq!(
            lines,
            vec![
                "--tds-weight: 600;",
                "--tds-leading: 1.5;",
                "--tds-tracking: 0.02em;",
                "--tds-muted: 0.4;",
                "--tds-overlay: rgba(0, 0, 0, 0.5);",
                "--tds-radius: 8px;",
                "--tds-gap: 1rem;",
            ]
        );
    }

    #[test]
    fn expands_typography_and_border_composites() {
        let lines = declarations(json!({
            "body": {
                "$type": "typography",
                "$value": {
                    "fontFamily": "Wonder",
                    "fontWeight": "Regular",
                    "fontSize": "16",
                    "lineHeight": "140%"
                }
            },
            "divider": {
                "$type": "border",
                "$value": { "color": "#ccc", "width": "1", "style": "solid" }
            }
        }));
        assert_eq!(
            lines,
            vec![
                "--tds-body-font-family: Wonder;",
                "--tds-body-font-weight: 400;",
                "--tds-body-font-size: 16px;",
                "--tds-body-line-height: 1.4;",
                "--tds-divider-color: #ccc;",
                "--tds-divider-width: 1px;",
                "--tds-divider-style: solid;",
            ]
        );
    }

    #[test]
    fn shadow_layers_expand_per_field() {
        let lines = declarations(json!({
            "raised": {
                "$type": "boxShadow",
                "$value": [
                    { "x": "0", "y": "2", "blur": "4", "spread": "0", "color": "#0003", "type": "dropShadow" },
                    { "x": "0", "y": "1", "blur": "1", "spread": "0", "color": "#0002", "type": "innerShadow" }
                ]
            }
        }));
        assert_eq!(
            lines,
            vec![
                "--tds-raised-1-x: 0px;",
                "--tds-raised-1-y: 2px;",
                "--tds-raised-1-blur: 4px;",
                "--tds-raised-1-spread: 0px;",
                "--tds-raised-1-color: #0003;",
                "--tds-raised-1-type: dropShadow;",
                "--tds-raised-2-x: 0px;",
                "--tds-raised-2-y: 1px;",
                "--tds-raised-2-blur: 1px;",
                "--tds-raised-2-spread: 0px;",
                "--tds-raised-2-color: #0002;",
                "--tds-raised-2-type: innerShadow;",
            ]
        );
    }

    #[test]
    fn single_shadow_expands_without_a_layer_index() {
        let lines = declarations(json!({
            "brand": { "$type": "color", "$value": "#e4002b" },
            "focus": {
                "$type": "boxShadow",
                "$value": { "offsetX": "0", "offsetY": "0", "blur": "0", "spread": "2", "color": "{brand}" }
            }
        }));
        assert_eq!(
            lines,
            vec![
                "--tds-brand: #e4002b;",
                "--tds-focus-offset-x: 0px;",
                "--tds-focus-offset-y: 0px;",
                "--tds-focus-blur: 0px;",
                "--tds-focus-spread: 2px;",
                "--tds-focus-color: #e4002b;",
            ]
        );
    }

    #[test]
    fn token_named_value_is_not_mistaken_for_a_leaf() {
        let lines = declarations(json!({
            "opacity": {
                "value": { "$type": "opacity", "$value": "50%" },
                "other": { "$type": "opacity", "$value": "10%" }
            }
        }));
        assert_eq!(lines, vec!["--tds-opacity-value: 0.5;", "--tds-opacity-other: 0.1;"]);
    }

    #[test]
    fn descriptions_become_trailing_comments() {
        let lines = declarations(json!({
            "clear": { "$type": "color", "$value": "#0000", "$description": "Fully transparent" }
        }));
        assert_eq!(lines, vec!["--tds-clear: #0000; /** Fully transparent */"]);
    }

    #[test]
    fn kebab_case_handles_common_spellings() {
        assert_eq!(kebab_case("fontSize"), "font-size");
        assert_eq!(kebab_case("Font Size"), "font-size");
        assert_eq!(kebab_case("HTMLElement"), "html-element");
        assert_eq!(kebab_case("spacing_2xl"), "spacing-2xl");
        assert_eq!(kebab_case("1.5"), "1-5");
        assert_eq!(kebab_case("--"), "");
    }
}
