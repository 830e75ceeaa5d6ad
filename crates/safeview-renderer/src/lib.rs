//! # safeview-renderer
//!
//! The sandboxed renderer (§4.9-§4.11): given an already-validated [`Card`]
//! and a [`HostFactory`] standing in for a real UI toolkit, walks one view
//! and produces a host node tree — or nothing, if the view is unknown or a
//! runtime resource limit trips partway through.
//!
//! A render never trusts that the card it's handed actually passed
//! `safeview-validator::validate` first: the asset-path rule, the
//! `javascript:` URL check, and the prototype-pollution guard are all
//! re-applied here as an independent defense-in-depth layer (§9), and the
//! runtime budget enforces the same four aggregate limits the
//! Resource-Limits Pass checks statically, against what actually gets
//! emitted.

mod budget;
pub mod callbacks;
pub mod host;
mod render;
mod resolver;
mod scope;
pub mod style;

use std::collections::BTreeMap;

use safeview_types::{Card, StyleObject};
use safeview_validator::{Limits, ValidationError};
use serde_json::Value as Json;

pub use callbacks::{ActionKind, IconResolver, OnAction, OnError};
pub use host::HostFactory;
pub use style::HostStyle;

/// Everything a render needs beyond the card document itself (§6): the
/// view to render (or `None` for "the first view in document order"),
/// the state/asset/named-style overrides to render against, and the
/// host's callbacks.
pub struct RenderRequest<'a, F: HostFactory> {
    pub card: &'a Card,
    pub view_name: Option<&'a str>,
    pub state: Option<&'a Json>,
    pub assets: Option<&'a BTreeMap<String, String>>,
    pub styles: Option<&'a BTreeMap<String, StyleObject>>,
    pub container_style: Option<&'a StyleObject>,
    pub icon_resolver: Option<IconResolver<F::Node>>,
    pub on_action: Option<OnAction>,
    pub limits: Limits,
}

/// A render's outcome (§6): either the host view tree, wrapped in the
/// sandbox container, or nothing at all — an unknown `viewName`, a
/// budget blown on the root node, and related conditions all collapse
/// to the same empty output.
#[derive(Debug)]
pub enum RenderOutput<N> {
    View(N),
    Empty,
}

impl<N> RenderOutput<N> {
    #[must_use]
    pub fn into_option(self) -> Option<N> {
        match self {
            RenderOutput::View(n) => Some(n),
            RenderOutput::Empty => None,
        }
    }
}

/// Renders one view of `request.card` against `factory` (§4.9's full
/// per-node pipeline: merge style, compute budget deltas, check them
/// all-or-nothing, commit, resolve style, dispatch by kind, recurse into
/// children).
///
/// `on_error` runs at most once, only if the render accumulated any
/// `RUNTIME_*` errors along the way (§6's `onError(errors)`); a render
/// that never touches a limit never calls it at all.
pub fn render<F: HostFactory>(
    request: &RenderRequest<'_, F>,
    factory: &F,
    on_error: Option<&mut dyn FnMut(&[ValidationError])>,
) -> RenderOutput<F::Node> {
    render::run(request, factory, on_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeview_types::Card;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum TestNode {
        Sandbox(Vec<TestNode>),
        Layout(String, Vec<TestNode>),
        Text(String),
        Image(String),
        Avatar(Option<String>),
        Icon(Box<TestNode>),
        ProgressBar(i64),
        Badge(String),
        Chip(String),
        Divider(String),
        Spacer,
        Button(String),
        Toggle(bool),
        Empty,
    }

    struct TestFactory;

    impl HostFactory for TestFactory {
        type Node = TestNode;

        fn sandbox(&self, _style: HostStyle, child: Self::Node) -> Self::Node {
            TestNode::Sandbox(vec![child])
        }

        fn layout(&self, kind: safeview_types::NodeKind, _style: HostStyle, children: Vec<Self::Node>) -> Self::Node {
            TestNode::Layout(kind.to_string(), children)
        }

        fn text(&self, _style: HostStyle, content: &str) -> Self::Node {
            TestNode::Text(content.to_string())
        }

        fn image(&self, _style: HostStyle, url: &str, _alt: Option<&str>) -> Self::Node {
            TestNode::Image(url.to_string())
        }

        fn avatar(&self, _style: HostStyle, url: Option<&str>) -> Self::Node {
            TestNode::Avatar(url.map(str::to_string))
        }

        fn icon(&self, _style: HostStyle, glyph: Self::Node) -> Self::Node {
            TestNode::Icon(Box::new(glyph))
        }

        fn progress_bar(&self, _style: HostStyle, percent: f64) -> Self::Node {
            TestNode::ProgressBar(percent.round() as i64)
        }

        fn badge(&self, _style: HostStyle, label: &str) -> Self::Node {
            TestNode::Badge(label.to_string())
        }

        fn chip(&self, _style: HostStyle, label: &str) -> Self::Node {
            TestNode::Chip(label.to_string())
        }

        fn divider(&self, _style: HostStyle, thickness: &str) -> Self::Node {
            TestNode::Divider(thickness.to_string())
        }

        fn spacer(&self, _style: HostStyle) -> Self::Node {
            TestNode::Spacer
        }

        fn button(&self, _style: HostStyle, label: &str, on_click: std::rc::Rc<dyn Fn()>) -> Self::Node {
            on_click();
            TestNode::Button(label.to_string())
        }

        fn toggle(&self, _style: HostStyle, value: bool, _on_change: std::rc::Rc<dyn Fn(bool)>) -> Self::Node {
            TestNode::Toggle(value)
        }
    }

    fn request(card: &Card) -> RenderRequest<'_, TestFactory> {
        RenderRequest {
            card,
            view_name: None,
            state: None,
            assets: None,
            styles: None,
            container_style: None,
            icon_resolver: None,
            on_action: None,
            limits: Limits::default(),
        }
    }

    #[test]
    fn renders_a_simple_text_view() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hello"}}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => {
                assert_eq!(children, vec![TestNode::Text("hello".to_string())]);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn unknown_view_name_renders_nothing() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hi"}}
        }))
        .unwrap();
        let mut req = request(&card);
        req.view_name = Some("Nope");
        let output = render(&req, &TestFactory, None);
        assert!(matches!(output, RenderOutput::Empty));
    }

    #[test]
    fn resolves_state_bound_text_content() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"name": "Ada"},
            "views": {"Main": {"type": "Text", "content": {"$ref": "$name"}}}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => {
                assert_eq!(children, vec![TestNode::Text("Ada".to_string())]);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn for_loop_expands_once_per_array_item_with_scoped_locals() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"items": ["a", "b", "c"]},
            "views": {"Main": {
                "type": "Column",
                "children": {
                    "for": "item", "in": "$items",
                    "template": {"type": "Text", "content": {"$ref": "$item"}}
                }
            }}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => match &children[0] {
                TestNode::Layout(_, items) => {
                    assert_eq!(
                        items,
                        &vec![
                            TestNode::Text("a".to_string()),
                            TestNode::Text("b".to_string()),
                            TestNode::Text("c".to_string()),
                        ]
                    );
                }
                other => panic!("unexpected child: {other:?}"),
            },
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn for_loop_soft_skips_when_source_is_undefined() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {
                "type": "Column",
                "children": {"for": "item", "in": "$missing", "template": {"type": "Text", "content": "x"}}
            }}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => match &children[0] {
                TestNode::Layout(_, items) => assert!(items.is_empty()),
                other => panic!("unexpected child: {other:?}"),
            },
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn for_loop_over_a_non_array_source_reports_runtime_error() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"items": "not an array"},
            "views": {"Main": {
                "type": "Column",
                "children": {"for": "item", "in": "$items", "template": {"type": "Text", "content": "x"}}
            }}
        }))
        .unwrap();
        let captured: RefCell<Vec<ValidationError>> = RefCell::new(Vec::new());
        let mut on_error = |errors: &[ValidationError]| captured.borrow_mut().extend(errors.iter().cloned());
        let _ = render(&request(&card), &TestFactory, Some(&mut on_error));
        assert!(captured
            .borrow()
            .iter()
            .any(|e| e.code == safeview_validator::ErrorCode::RuntimeLoopSourceInvalid));
    }

    #[test]
    fn exceeding_node_budget_at_the_root_renders_nothing() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hi"}}
        }))
        .unwrap();
        let mut req = request(&card);
        req.limits = Limits::builder().node_count(0).build();
        let output = render(&req, &TestFactory, None);
        assert!(matches!(output, RenderOutput::Empty));
    }

    #[test]
    fn exceeding_node_budget_on_a_child_drops_only_that_child() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {
                "type": "Column",
                "children": [{"type": "Text", "content": "a"}, {"type": "Text", "content": "b"}]
            }}
        }))
        .unwrap();
        let mut req = request(&card);
        req.limits = Limits::builder().node_count(2).build();
        let output = render(&req, &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => match &children[0] {
                TestNode::Layout(_, items) => {
                    assert_eq!(items, &vec![TestNode::Text("a".to_string())]);
                }
                other => panic!("unexpected child: {other:?}"),
            },
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn image_with_unmapped_asset_renders_nothing() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Image", "src": "@assets/logo.png"}}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        assert!(matches!(output, RenderOutput::Empty));
    }

    #[test]
    fn image_resolves_through_the_asset_map() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Image", "src": "@assets/logo.png"}}
        }))
        .unwrap();
        let assets: BTreeMap<String, String> =
            [("logo.png".to_string(), "https://cdn.example/logo.png".to_string())].into();
        let mut req = request(&card);
        req.assets = Some(&assets);
        let output = render(&req, &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => {
                assert_eq!(children, vec![TestNode::Image("https://cdn.example/logo.png".to_string())]);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn button_activation_invokes_on_action_with_its_payload() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Button", "label": "Go", "action": "go"}}
        }))
        .unwrap();
        let seen: RefCell<Vec<(ActionKind, String)>> = RefCell::new(Vec::new());
        let on_action: OnAction = std::rc::Rc::new(|kind, action_id, _payload| {
            seen.borrow_mut().push((kind, action_id.to_string()));
        });
        let mut req = request(&card);
        req.on_action = Some(on_action);
        let _ = render(&req, &TestFactory, None);
        assert_eq!(seen.borrow().as_slice(), &[(ActionKind::Button, "go".to_string())]);
    }

    #[test]
    fn icon_without_a_resolver_renders_nothing() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Icon", "name": "star"}}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        assert!(matches!(output, RenderOutput::Empty));
    }

    #[test]
    fn progress_bar_with_zero_max_clamps_to_zero_percent() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "ProgressBar", "value": 5, "max": 0}}
        }))
        .unwrap();
        let output = render(&request(&card), &TestFactory, None);
        match output {
            RenderOutput::View(TestNode::Sandbox(children)) => {
                assert_eq!(children, vec![TestNode::ProgressBar(0)]);
            }
            other => panic!("unexpected output: {other:?}"),
        }
    }
}
