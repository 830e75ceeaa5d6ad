//! The [`StyleObject`] schema: a keyed map of style properties, plus the
//! reserved `$style` key that names a card-level style to merge under.

use std::collections::BTreeMap;

use crate::value::Value;

/// A parsed style object attached to a node.
///
/// `base` holds the name from a `"$style": "cardName"` entry, if present.
/// `props` holds every other key, verbatim — including keys outside the
/// whitelist, which the validator reports only when they're in the
/// *forbidden* set (§4.5) and the renderer silently drops otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleObject {
    pub base: Option<String>,
    pub props: BTreeMap<String, Value>,
}

impl StyleObject {
    #[must_use]
    pub fn from_json(json: &serde_json::Value) -> Option<Self> {
        let map = json.as_object()?;
        let mut style = StyleObject::default();
        for (key, value) in map {
            if key == "$style" {
                style.base = value.as_str().map(str::to_string);
            } else {
                style.props.insert(key.clone(), Value::from_json(value));
            }
        }
        Some(style)
    }

    #[must_use]
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.props.get(property)
    }

    /// Renders back to the JSON object shape this was parsed from — used
    /// by the normalize-then-revalidate round-trip property.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        if let Some(base) = &self.base {
            map.insert("$style".to_string(), serde_json::Value::String(base.clone()));
        }
        for (key, value) in &self.props {
            map.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Merges `self` as the inline override on top of `base` (§4.10,
    /// `Merged style`): `base` keys survive unless `self` overrides them,
    /// and `self`'s own `$style` pointer is never propagated further (a
    /// merged style is final — it is not itself a new base to chase).
    #[must_use]
    pub fn merge_over(&self, base: &StyleObject) -> StyleObject {
        let mut merged = base.clone();
        merged.base = None;
        for (key, value) in &self.props {
            merged.props.insert(key.clone(), value.clone());
        }
        merged
    }
}

/// Style properties whose literal string values must pass the
/// [`FORBIDDEN_STYLE_PROPERTY`](crate) check (§4.5) — not part of the
/// renderer's output whitelist at all, reported whenever present.
pub const FORBIDDEN_STYLE_PROPERTIES: &[&str] = &[
    "backgroundImage",
    "cursor",
    "listStyleImage",
    "content",
    "filter",
    "backdropFilter",
    "mixBlendMode",
    "animation",
    "transition",
    "clipPath",
    "mask",
];

/// Style properties whose dynamic-value permission is *Static* (§4.4):
/// literal only, never `$ref`/`$expr`. These are also exactly the
/// properties the security pass applies position/overflow checks to.
pub const STATIC_ONLY_STYLE_PROPERTIES: &[&str] = &[
    "position",
    "top",
    "right",
    "bottom",
    "left",
    "overflow",
    "zIndex",
    "transform",
    "border",
    "borderTop",
    "borderRight",
    "borderBottom",
    "borderLeft",
    "boxShadow",
    "backgroundGradient",
];

/// Color-typed properties (§4.4, §4.5): dynamic permission, `INVALID_COLOR`
/// range-checked when literal.
pub const COLOR_PROPERTIES: &[&str] = &["backgroundColor", "color"];

/// Length/spacing-typed properties (§4.4, §4.5): dynamic permission,
/// `INVALID_LENGTH` range-checked when literal.
pub const LENGTH_PROPERTIES: &[&str] = &[
    "width",
    "height",
    "minWidth",
    "minHeight",
    "maxWidth",
    "maxHeight",
    "padding",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    "margin",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "gap",
];

/// Properties for which the literal string `"auto"` is an accepted length
/// (§4.5): width/height and their min/max/margin variants.
#[must_use]
pub fn accepts_auto_length(property: &str) -> bool {
    property == "width"
        || property == "height"
        || property.starts_with("min")
        || property.starts_with("max")
        || property.starts_with("margin")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_style_with_base_reference() {
        let style =
            StyleObject::from_json(&json!({"$style": "card", "color": "#fff"})).unwrap();
        assert_eq!(style.base.as_deref(), Some("card"));
        assert!(style.get("color").is_some());
    }

    #[test]
    fn merge_over_overrides_base_keys() {
        let base = StyleObject::from_json(&json!({"color": "#000", "fontSize": "14px"})).unwrap();
        let inline = StyleObject::from_json(&json!({"color": "#fff"})).unwrap();
        let merged = inline.merge_over(&base);
        assert_eq!(merged.get("color").unwrap().as_literal_str(), Some("#fff"));
        assert_eq!(
            merged.get("fontSize").unwrap().as_literal_str(),
            Some("14px")
        );
        assert!(merged.base.is_none());
    }

    #[test]
    fn auto_length_accepted_properties() {
        assert!(accepts_auto_length("width"));
        assert!(accepts_auto_length("minHeight"));
        assert!(accepts_auto_length("marginTop"));
        assert!(!accepts_auto_length("gap"));
        assert!(!accepts_auto_length("padding"));
    }
}
