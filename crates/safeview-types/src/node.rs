//! The closed, 16-kind [`Node`] variant and the shared shape every kind
//! carries: an optional [`StyleObject`], an optional `condition`, and (for
//! layout kinds) [`Children`].

use std::fmt;

use serde_json::Value as Json;

use crate::style::StyleObject;
use crate::value::Value;

/// The sixteen node kinds, grouped the way §3 groups them. The variant
/// name is exactly the `"type"` string a card author writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // Layout
    Box,
    Row,
    Column,
    Stack,
    Grid,
    // Content
    Text,
    Image,
    // Display
    ProgressBar,
    Avatar,
    Icon,
    Badge,
    Chip,
    Divider,
    Spacer,
    // Interaction
    Button,
    Toggle,
}

impl NodeKind {
    /// All sixteen kinds, in the order §3 lists them.
    pub const ALL: [NodeKind; 16] = [
        NodeKind::Box,
        NodeKind::Row,
        NodeKind::Column,
        NodeKind::Stack,
        NodeKind::Grid,
        NodeKind::Text,
        NodeKind::Image,
        NodeKind::ProgressBar,
        NodeKind::Avatar,
        NodeKind::Icon,
        NodeKind::Badge,
        NodeKind::Chip,
        NodeKind::Divider,
        NodeKind::Spacer,
        NodeKind::Button,
        NodeKind::Toggle,
    ];

    #[must_use]
    pub fn from_type_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            NodeKind::Box => "Box",
            NodeKind::Row => "Row",
            NodeKind::Column => "Column",
            NodeKind::Stack => "Stack",
            NodeKind::Grid => "Grid",
            NodeKind::Text => "Text",
            NodeKind::Image => "Image",
            NodeKind::ProgressBar => "ProgressBar",
            NodeKind::Avatar => "Avatar",
            NodeKind::Icon => "Icon",
            NodeKind::Badge => "Badge",
            NodeKind::Chip => "Chip",
            NodeKind::Divider => "Divider",
            NodeKind::Spacer => "Spacer",
            NodeKind::Button => "Button",
            NodeKind::Toggle => "Toggle",
        }
    }

    /// True for the five layout kinds, which carry [`Children`] instead of
    /// kind-specific content fields.
    #[must_use]
    pub const fn is_layout(self) -> bool {
        matches!(
            self,
            NodeKind::Box | NodeKind::Row | NodeKind::Column | NodeKind::Stack | NodeKind::Grid
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The shape every node carries regardless of kind.
#[derive(Debug, Clone, Default)]
pub struct Common {
    pub style: Option<StyleObject>,
    pub condition: Option<Value>,
}

impl Common {
    fn from_object(map: &serde_json::Map<String, Json>) -> Self {
        Common {
            style: map.get("style").and_then(StyleObject::from_json),
            condition: map.get("condition").map(Value::from_json),
        }
    }
}

/// A card node: one of the sixteen closed kinds, each carrying [`Common`]
/// plus its own content fields.
///
/// Required-field presence is *not* enforced here — a missing `content` on
/// a `Text` node simply leaves that field `None`. The Node Pass (§4.3) is
/// responsible for turning a missing required field into a `MISSING_FIELD`
/// error; this type only has to represent what was actually present.
#[derive(Debug, Clone)]
pub enum Node {
    Box(LayoutFields),
    Row(LayoutFields),
    Column(LayoutFields),
    Stack(LayoutFields),
    Grid(LayoutFields),
    Text(TextFields),
    Image(ImageFields),
    ProgressBar(ProgressBarFields),
    Avatar(AvatarFields),
    Icon(IconFields),
    Badge(LabelFields),
    Chip(LabelFields),
    Divider(DividerFields),
    Spacer(Common),
    Button(ButtonFields),
    Toggle(ToggleFields),
}

#[derive(Debug, Clone)]
pub struct LayoutFields {
    pub common: Common,
    pub children: Option<Children>,
}

#[derive(Debug, Clone)]
pub struct TextFields {
    pub common: Common,
    pub content: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ImageFields {
    pub common: Common,
    pub src: Option<Value>,
    pub alt: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ProgressBarFields {
    pub common: Common,
    pub value: Option<Value>,
    pub max: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct AvatarFields {
    pub common: Common,
    pub src: Option<Value>,
    pub size: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct IconFields {
    pub common: Common,
    pub name: Option<Value>,
    pub size: Option<Value>,
    pub color: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct LabelFields {
    pub common: Common,
    pub label: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct DividerFields {
    pub common: Common,
    pub thickness: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ButtonFields {
    pub common: Common,
    pub label: Option<Value>,
    pub action: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct ToggleFields {
    pub common: Common,
    pub value: Option<Value>,
    pub on_toggle: Option<Value>,
}

/// A layout node's children: an ordered list, or a template expanded over
/// an array drawn from state.
#[derive(Debug, Clone)]
pub enum Children {
    List(Vec<Node>),
    ForLoop(ForLoop),
}

/// `{"for": ident, "in": "$path", "template": Node}` — expands `template`
/// once per element of the array `in` resolves to, with `for` bound as a
/// fresh loop-local.
#[derive(Debug, Clone)]
pub struct ForLoop {
    pub for_ident: Option<String>,
    pub in_path: Option<String>,
    pub template: Option<Box<Node>>,
}

/// Failure to even begin interpreting a JSON value as a node — every
/// variant here is something the Schema Pass is expected to have already
/// ruled out; this type exists for defense in depth and for unit-testing
/// the parser in isolation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeParseError {
    #[error("node is not a JSON object")]
    NotAnObject,
    #[error("node is missing a \"type\" field")]
    MissingType,
    #[error("unknown node type \"{0}\"")]
    UnknownType(String),
}

impl Node {
    /// Builds a typed [`Node`] from a raw JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`NodeParseError`] if the value isn't an object, has no
    /// `"type"` field, or the `"type"` isn't one of the sixteen closed
    /// kinds — in a validated pipeline these are unreachable once the
    /// Schema Pass has already run.
    pub fn from_json(json: &Json) -> Result<Node, NodeParseError> {
        let map = json.as_object().ok_or(NodeParseError::NotAnObject)?;
        let type_str = map
            .get("type")
            .and_then(Json::as_str)
            .ok_or(NodeParseError::MissingType)?;
        let kind = NodeKind::from_type_str(type_str).ok_or_else(|| {
            tracing::debug!(type_str, "unrecognized node type");
            NodeParseError::UnknownType(type_str.to_string())
        })?;
        let common = Common::from_object(map);
        let field = |name: &str| map.get(name).map(Value::from_json);

        Ok(match kind {
            NodeKind::Box => Node::Box(LayoutFields {
                common,
                children: map.get("children").map(|c| parse_children(c)),
            }),
            NodeKind::Row => Node::Row(LayoutFields {
                common,
                children: map.get("children").map(|c| parse_children(c)),
            }),
            NodeKind::Column => Node::Column(LayoutFields {
                common,
                children: map.get("children").map(|c| parse_children(c)),
            }),
            NodeKind::Stack => Node::Stack(LayoutFields {
                common,
                children: map.get("children").map(|c| parse_children(c)),
            }),
            NodeKind::Grid => Node::Grid(LayoutFields {
                common,
                children: map.get("children").map(|c| parse_children(c)),
            }),
            NodeKind::Text => Node::Text(TextFields {
                common,
                content: field("content"),
            }),
            NodeKind::Image => Node::Image(ImageFields {
                common,
                src: field("src"),
                alt: field("alt"),
            }),
            NodeKind::ProgressBar => Node::ProgressBar(ProgressBarFields {
                common,
                value: field("value"),
                max: field("max"),
            }),
            NodeKind::Avatar => Node::Avatar(AvatarFields {
                common,
                src: field("src"),
                size: field("size"),
            }),
            NodeKind::Icon => Node::Icon(IconFields {
                common,
                name: field("name"),
                size: field("size"),
                color: field("color"),
            }),
            NodeKind::Badge => Node::Badge(LabelFields {
                common,
                label: field("label"),
            }),
            NodeKind::Chip => Node::Chip(LabelFields {
                common,
                label: field("label"),
            }),
            NodeKind::Divider => Node::Divider(DividerFields {
                common,
                thickness: field("thickness"),
            }),
            NodeKind::Spacer => Node::Spacer(common),
            NodeKind::Button => Node::Button(ButtonFields {
                common,
                label: field("label"),
                action: field("action"),
            }),
            NodeKind::Toggle => Node::Toggle(ToggleFields {
                common,
                value: field("value"),
                on_toggle: field("onToggle"),
            }),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Node::Box(_) => NodeKind::Box,
            Node::Row(_) => NodeKind::Row,
            Node::Column(_) => NodeKind::Column,
            Node::Stack(_) => NodeKind::Stack,
            Node::Grid(_) => NodeKind::Grid,
            Node::Text(_) => NodeKind::Text,
            Node::Image(_) => NodeKind::Image,
            Node::ProgressBar(_) => NodeKind::ProgressBar,
            Node::Avatar(_) => NodeKind::Avatar,
            Node::Icon(_) => NodeKind::Icon,
            Node::Badge(_) => NodeKind::Badge,
            Node::Chip(_) => NodeKind::Chip,
            Node::Divider(_) => NodeKind::Divider,
            Node::Spacer(_) => NodeKind::Spacer,
            Node::Button(_) => NodeKind::Button,
            Node::Toggle(_) => NodeKind::Toggle,
        }
    }

    #[must_use]
    pub fn common(&self) -> &Common {
        match self {
            Node::Box(f) | Node::Row(f) | Node::Column(f) | Node::Stack(f) | Node::Grid(f) => {
                &f.common
            }
            Node::Text(f) => &f.common,
            Node::Image(f) => &f.common,
            Node::ProgressBar(f) => &f.common,
            Node::Avatar(f) => &f.common,
            Node::Icon(f) => &f.common,
            Node::Badge(f) | Node::Chip(f) => &f.common,
            Node::Divider(f) => &f.common,
            Node::Spacer(common) => common,
            Node::Button(f) => &f.common,
            Node::Toggle(f) => &f.common,
        }
    }

    /// The node's children, if it is a layout kind that has any.
    #[must_use]
    pub fn children(&self) -> Option<&Children> {
        match self {
            Node::Box(f) | Node::Row(f) | Node::Column(f) | Node::Stack(f) | Node::Grid(f) => {
                f.children.as_ref()
            }
            _ => None,
        }
    }
}

fn parse_children(json: &Json) -> Children {
    match json {
        Json::Array(items) => Children::List(
            items
                .iter()
                .filter_map(|item| Node::from_json(item).ok())
                .collect(),
        ),
        Json::Object(map) => Children::ForLoop(ForLoop {
            for_ident: map.get("for").and_then(Json::as_str).map(str::to_string),
            in_path: map.get("in").and_then(Json::as_str).map(str::to_string),
            template: map
                .get("template")
                .and_then(|t| Node::from_json(t).ok())
                .map(Box::new),
        }),
        _ => Children::List(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_through_str() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_type_str(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_type_rejected() {
        let err = Node::from_json(&json!({"type": "Video"})).unwrap_err();
        assert_eq!(err, NodeParseError::UnknownType("Video".to_string()));
    }

    #[test]
    fn missing_type_rejected() {
        let err = Node::from_json(&json!({})).unwrap_err();
        assert_eq!(err, NodeParseError::MissingType);
    }

    #[test]
    fn text_node_parses_content_as_value() {
        let node = Node::from_json(&json!({"type": "Text", "content": "hi"})).unwrap();
        match node {
            Node::Text(f) => assert_eq!(f.content.unwrap().as_literal_str(), Some("hi")),
            _ => panic!("expected Text"),
        }
    }

    #[test]
    fn missing_required_field_is_none_not_an_error() {
        let node = Node::from_json(&json!({"type": "Text"})).unwrap();
        match node {
            Node::Text(f) => assert!(f.content.is_none()),
            _ => panic!("expected Text"),
        }
    }

    #[test]
    fn for_loop_shape_is_recognized() {
        let node = Node::from_json(&json!({
            "type": "Box",
            "children": {"for": "item", "in": "$items", "template": {"type": "Text", "content": "x"}}
        }))
        .unwrap();
        match node {
            Node::Box(f) => match f.children {
                Some(Children::ForLoop(loop_)) => {
                    assert_eq!(loop_.for_ident.as_deref(), Some("item"));
                    assert_eq!(loop_.in_path.as_deref(), Some("$items"));
                    assert!(loop_.template.is_some());
                }
                _ => panic!("expected ForLoop"),
            },
            _ => panic!("expected Box"),
        }
    }
}
