use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::{TYPE_KEY, TokenMap, VALUE_KEY, as_group, is_leaf};

/// Recursively unions `source` into `target`. Groups merge key by key, anything
/// else overwrites the target entry as-is.
pub fn deep_merge(target: &mut TokenMap, source: &TokenMap) {
    for (key, value) in source {
        match as_group(value) {
            Some(group) => {
                let slot = target
                    .entry(key.clone())
                    .or_insert_with(|| Value::Object(TokenMap::new()));
                if as_group(slot).is_none() {
                    *slot = Value::Object(TokenMap::new());
                }
                if let Value::Object(child) = slot {
                    deep_merge(child, group);
                }
            }
            None => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct BorderDefaults {
    pub width: String,
    pub style: String,
}

impl Default for BorderDefaults {
    fn default() -> Self {
        Self {
            width: "0px".to_string(),
            style: "solid".to_string(),
        }
    }
}

/// Fills empty `width`/`style` fields of structured border tokens. Returns the
/// dotted paths (prefixed with `wrapper`) of every repaired token.
pub fn repair_borders(tree: &mut TokenMap, defaults: &BorderDefaults, wrapper: &str) -> Vec<String> {
    let mut repaired = Vec::new();
    let mut path = vec![wrapper.to_string()];
    repair_node(tree, defaults, &mut path, &mut repaired);
    repaired
}

fn repair_node(
    node: &mut TokenMap,
    defaults: &BorderDefaults,
    path: &mut Vec<String>,
    repaired: &mut Vec<String>,
) {
    for (key, value) in node.iter_mut() {
        let Value::Object(child) = value else {
            continue;
        };
        path.push(key.clone());
        if is_leaf(child) {
            if repair_border_leaf(child, defaults) {
                let dotted = path.join(".");
                warn!(token = %dotted, "fixing border token with empty width/style");
                repaired.push(dotted);
            }
        } else {
            repair_node(child, defaults, path, repaired);
        }
        path.pop();
    }
}

fn repair_border_leaf(leaf: &mut TokenMap, defaults: &BorderDefaults) -> bool {
    if leaf.get(TYPE_KEY).and_then(Value::as_str) != Some("border") {
        return false;
    }
    let Some(Value::Object(border)) = leaf.get_mut(VALUE_KEY) else {
        return false;
    };

    let mut changed = false;
    for (field, fallback) in [("width", &defaults.width), ("style", &defaults.style)] {
        if let Some(slot) = border.get_mut(field)
            && slot.as_str() == Some("")
        {
            *slot = Value::String(fallback.clone());
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> TokenMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merge_unions_groups_and_overwrites_leaves() {
        let mut target = map(json!({
            "colors": {
                "primary": { "$type": "color", "$value": "#111" },
                "secondary": { "$type": "color", "$value": "#222" }
            }
        }));
        let source = map(json!({
            "colors": {
                "primary": { "$type": "color", "$value": "#999" },
                "accent": { "$type": "color", "$value": "#333" }
            },
            "spacing": { "sm": { "$type": "dimension", "$value": "4" } }
        }));

        deep_merge(&mut target, &source);

        assert_eq!(
            Value::Object(target),
            json!({
                "colors": {
                    "primary": { "$type": "color", "$value": "#999" },
                    "secondary": { "$type": "color", "$value": "#222" },
                    "accent": { "$type": "color", "$value": "#333" }
                },
                "spacing": { "sm": { "$type": "dimension", "$value": "4" } }
            })
        );
    }

    #[test]
    fn leaf_values_are_replaced_not_combined() {
        let mut target = map(json!({
            "border": { "$type": "border", "$value": { "width": "1px", "color": "#000" } }
        }));
        let source = map(json!({
            "border": { "$type": "border", "$value": { "style": "dashed" } }
        }));
        deep_merge(&mut target, &source);
        assert_eq!(
            target["border"],
            json!({ "$type": "border", "$value": { "style": "dashed" } })
        );
    }

    #[test]
    fn group_replaces_leaf_at_the_same_path() {
        let mut target = map(json!({ "size": { "$value": "4" } }));
        let source = map(json!({ "size": { "sm": { "$value": "2" } } }));
        deep_merge(&mut target, &source);
        assert_eq!(target["size"], json!({ "sm": { "$value": "2" } }));
    }

    #[test]
    fn child_token_named_value_survives_a_later_sibling() {
        let mut target = map(json!({
            "opacity": { "value": { "$type": "opacity", "$value": "50%" } }
        }));
        let source = map(json!({
            "opacity": { "other": { "$type": "opacity", "$value": "10%" } }
        }));

        deep_merge(&mut target, &source);

        assert_eq!(
            Value::Object(target),
            json!({
                "opacity": {
                    "value": { "$type": "opacity", "$value": "50%" },
                    "other": { "$type": "opacity", "$value": "10%" }
                }
            })
        );
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let source = map(json!({
            "a": { "b": { "$value": "1" }, "c": { "d": { "$value": [1, 2] } } },
            "e": "literal"
        }));
        let mut once = TokenMap::new();
        deep_merge(&mut once, &source);
        let mut twice = once.clone();
        deep_merge(&mut twice, &source);
        assert_eq!(once, twice);
    }

    #[test]
    fn repairs_empty_border_fields() {
        let mut tree = map(json!({
            "outline": {
                "focus": { "$type": "border", "$value": { "color": "#00f", "width": "", "style": "" } },
                "card": { "$type": "border", "$value": { "color": "#000", "width": "2px", "style": "dashed" } }
            }
        }));

        let repaired = repair_borders(&mut tree, &BorderDefaults::default(), "tds");

        assert_eq!(repaired, vec!["tds.outline.focus"]);
        assert_eq!(
            tree["outline"]["focus"]["$value"],
            json!({ "color": "#00f", "width": "0px", "style": "solid" })
        );
        assert_eq!(
            tree["outline"]["card"]["$value"],
            json!({ "color": "#000", "width": "2px", "style": "dashed" })
        );
    }

    #[test]
    fn repair_ignores_non_border_and_string_values() {
        let mut tree = map(json!({
            "line": { "$type": "border", "$value": "{outline.focus}" },
            "shadow": { "$type": "boxShadow", "$value": { "x": "", "style": "" } }
        }));
        let before = tree.clone();
        assert!(repair_borders(&mut tree, &BorderDefaults::default(), "tds").is_empty());
        assert_eq!(tree, before);
    }

    #[test]
    fn repair_only_touches_the_empty_field() {
        let mut tree = map(json!({
            "line": { "$type": "border", "$value": { "width": "", "style": "dotted" } }
        }));
        repair_borders(&mut tree, &BorderDefaults::default(), "tds");
        assert_eq!(tree["line"]["$value"], json!({ "width": "0px", "style": "dotted" }));
    }
}
