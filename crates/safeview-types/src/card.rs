//! The top-level [`Card`] document: metadata, optional assets/state/styles
//! maps, and the named [`Node`] trees under `views`.

use std::collections::BTreeMap;

use serde_json::Value as Json;

use crate::node::Node;
use crate::style::StyleObject;

/// `{name, version}` — both are expected to be non-empty strings; that
/// invariant is enforced by the Schema Pass, not by this type.
#[derive(Debug, Clone, Default)]
pub struct CardMeta {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// The whole validated document (§3).
///
/// Parsing a [`Card`] from JSON is permissive in the same way parsing a
/// [`Node`] is: a missing `meta.name`, an empty `views` map, or a
/// duplicate view name does not fail parsing — it leaves a gap the Schema
/// Pass reports as a typed error with a path.
#[derive(Debug, Clone, Default)]
pub struct Card {
    pub meta: CardMeta,
    pub assets: BTreeMap<String, String>,
    pub state: Json,
    pub styles: BTreeMap<String, StyleObject>,
    pub views: BTreeMap<String, Node>,
    /// View insertion order as it appeared in the source document, since
    /// "the first view in document order" (§6) is only recoverable from a
    /// `BTreeMap` by re-sorting alphabetically, which is not the same
    /// thing.
    pub view_order: Vec<String>,
}

impl Card {
    /// Builds a [`Card`] from a raw JSON value.
    ///
    /// Returns `None` only when `json` is not even a JSON object — every
    /// other shape problem (missing `meta`, non-object `views`, a view
    /// whose tree fails to parse) is represented as an absence (empty map,
    /// missing field) for the Schema Pass to report, not a hard error
    /// here.
    #[must_use]
    pub fn from_json(json: &Json) -> Option<Card> {
        let map = json.as_object()?;

        let meta = map
            .get("meta")
            .and_then(Json::as_object)
            .map(|m| CardMeta {
                name: m.get("name").and_then(Json::as_str).map(str::to_string),
                version: m
                    .get("version")
                    .and_then(Json::as_str)
                    .map(str::to_string),
            })
            .unwrap_or_default();

        let assets = map
            .get("assets")
            .and_then(Json::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let state = map.get("state").cloned().unwrap_or(Json::Null);

        let styles = map
            .get("styles")
            .and_then(Json::as_object)
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| StyleObject::from_json(v).map(|s| (k.clone(), s)))
                    .collect()
            })
            .unwrap_or_default();

        let mut views = BTreeMap::new();
        let mut view_order = Vec::new();
        if let Some(raw_views) = map.get("views").and_then(Json::as_object) {
            for (name, node_json) in raw_views {
                if let Ok(node) = Node::from_json(node_json) {
                    view_order.push(name.clone());
                    views.insert(name.clone(), node);
                }
            }
        }

        Some(Card {
            meta,
            assets,
            state,
            styles,
            views,
            view_order,
        })
    }

    /// The view selected when no `viewName` is given: the first view in
    /// document order (§6).
    #[must_use]
    pub fn default_view_name(&self) -> Option<&str> {
        self.view_order.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_minimal_card() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hi"}}
        }))
        .unwrap();
        assert_eq!(card.meta.name.as_deref(), Some("a"));
        assert_eq!(card.default_view_name(), Some("Main"));
        assert_eq!(card.views.len(), 1);
    }

    #[test]
    fn non_object_input_returns_none() {
        assert!(Card::from_json(&json!("not a card")).is_none());
    }

    #[test]
    fn missing_meta_leaves_empty_fields_for_schema_pass() {
        let card = Card::from_json(&json!({"views": {}})).unwrap();
        assert!(card.meta.name.is_none());
        assert!(card.views.is_empty());
    }
}
