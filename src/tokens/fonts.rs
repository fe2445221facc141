use std::fmt::Write as _;

use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct FontWeight {
    pub name: String,
    pub weight: u16,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct FontFaceConfig {
    pub family: String,
    /// Font file URL; `{name}` is replaced by the weight name.
    pub source: String,
    pub format: String,
    pub style: String,
    pub display: String,
    pub weights: Vec<FontWeight>,
}

impl FontFaceConfig {
    /// One `@font-face` block per weight, in table order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for weight in &self.weights {
            let source = self.source.replace("{name}", &weight.name);
            let _ = write!(
                out,
                "@font-face {{\n  font-family: '{family}';\n  src: url('{source}') format('{format}');\n  font-weight: {weight};\n  font-style: {style};\n  font-display: {display};\n}}\n\n",
                family = self.family,
                format = self.format,
                weight = weight.weight,
                style = self.style,
                display = self.display,
            );
        }
        out
    }

    /// Numeric weight for a weight name, ignoring case, spaces, `-` and `_`.
    pub fn weight_for(&self, name: &str) -> Option<u16> {
        let wanted = normalize_weight_name(name);
        self.weights
            .iter()
            .find(|entry| normalize_weight_name(&entry.name) == wanted)
            .map(|entry| entry.weight)
    }
}

fn normalize_weight_name(name: &str) -> String {
    name.chars()
        .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
