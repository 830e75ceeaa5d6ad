//! Full pipeline integration tests: validate a raw document, then render
//! whatever survives, through the public `safeview` facade only. Unlike
//! the crate's own `#[cfg(test)]` modules, these never reach into a single
//! pass or pipeline stage — they exercise exactly what an embedding host
//! would call.

use std::cell::RefCell;
use std::rc::Rc;

use safeview::{
    render, validate_raw, ActionKind, Card, ErrorCode, HostFactory, HostStyle, Limits, NodeKind,
    RenderOutput, RenderRequest, ValidationError,
};
use serde_json::json;

#[derive(Debug, Clone, PartialEq)]
enum HostNode {
    Sandbox(Box<HostNode>),
    Layout(Vec<HostNode>),
    Text(String),
    Button(String),
    Empty,
}

struct HostFactoryImpl;

impl HostFactory for HostFactoryImpl {
    type Node = HostNode;

    fn sandbox(&self, _style: HostStyle, child: Self::Node) -> Self::Node {
        HostNode::Sandbox(Box::new(child))
    }

    fn layout(&self, _kind: NodeKind, _style: HostStyle, children: Vec<Self::Node>) -> Self::Node {
        HostNode::Layout(children)
    }

    fn text(&self, _style: HostStyle, content: &str) -> Self::Node {
        HostNode::Text(content.to_string())
    }

    fn image(&self, _style: HostStyle, _url: &str, _alt: Option<&str>) -> Self::Node {
        HostNode::Empty
    }

    fn avatar(&self, _style: HostStyle, _url: Option<&str>) -> Self::Node {
        HostNode::Empty
    }

    fn icon(&self, _style: HostStyle, glyph: Self::Node) -> Self::Node {
        glyph
    }

    fn progress_bar(&self, _style: HostStyle, _percent: f64) -> Self::Node {
        HostNode::Empty
    }

    fn badge(&self, _style: HostStyle, label: &str) -> Self::Node {
        HostNode::Text(label.to_string())
    }

    fn chip(&self, _style: HostStyle, label: &str) -> Self::Node {
        HostNode::Text(label.to_string())
    }

    fn divider(&self, _style: HostStyle, _thickness: &str) -> Self::Node {
        HostNode::Empty
    }

    fn spacer(&self, _style: HostStyle) -> Self::Node {
        HostNode::Empty
    }

    fn button(&self, _style: HostStyle, label: &str, on_click: Rc<dyn Fn()>) -> Self::Node {
        on_click();
        HostNode::Button(label.to_string())
    }

    fn toggle(&self, _style: HostStyle, value: bool, _on_change: Rc<dyn Fn(bool)>) -> Self::Node {
        HostNode::Text(value.to_string())
    }
}

fn request<'a>(card: &'a Card, on_action: Option<safeview::OnAction>) -> RenderRequest<'a, HostFactoryImpl> {
    RenderRequest {
        card,
        view_name: None,
        state: None,
        assets: None,
        styles: None,
        container_style: None,
        icon_resolver: None,
        on_action,
        limits: Limits::default(),
    }
}

/// A well-formed card survives raw-bytes validation and renders into a
/// sandboxed host tree in one pass, the way an embedding host would run
/// the whole pipeline.
#[test]
fn well_formed_document_validates_and_renders() {
    let bytes = br#"{
        "meta": {"name": "profile-card", "version": "1"},
        "state": {"username": "ferris"},
        "views": {"Main": {
            "type": "Column",
            "children": [
                {"type": "Text", "content": {"$ref": "$username"}},
                {"type": "Button", "label": "Follow", "action": "follow"}
            ]
        }}
    }"#;

    let result = validate_raw(bytes, &Limits::default()).expect("size/json gate passes");
    assert!(result.valid(), "unexpected errors: {:?}", result.errors);

    let card: Card = serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|json| Card::from_json(&json))
        .expect("card parses");

    let clicked = Rc::new(RefCell::new(None));
    let clicked_in_closure = clicked.clone();
    let on_action: safeview::OnAction = Rc::new(move |kind, action_id, _payload| {
        *clicked_in_closure.borrow_mut() = Some((kind, action_id.to_string()));
    });

    let output = render(&request(&card, Some(on_action)), &HostFactoryImpl, None);
    match output {
        RenderOutput::View(HostNode::Sandbox(inner)) => match *inner {
            HostNode::Layout(children) => {
                assert_eq!(children[0], HostNode::Text("ferris".to_string()));
                assert_eq!(children[1], HostNode::Button("Follow".to_string()));
            }
            other => panic!("expected a Column layout, got {other:?}"),
        },
        other => panic!("expected a sandboxed view, got {other:?}"),
    }
    assert_eq!(clicked.borrow().as_ref().map(|(k, _)| *k), Some(ActionKind::Button));
}

/// §8 Scenario 5: an expression using a forbidden keyword is caught by
/// validation before the document ever reaches the renderer.
#[test]
fn document_with_forbidden_expression_keyword_fails_validation() {
    let json = json!({
        "meta": {"name": "a", "version": "1"},
        "views": {"Main": {"type": "Text", "content": {"$expr": "typeof $x"}}}
    });
    let result = safeview::validate_json(&json, &Limits::default());
    assert!(!result.valid());
    assert!(result.has_code(ErrorCode::ExprForbiddenToken));
}

/// §8 Scenario 3: a node whose style computes `overflow: auto` while
/// already nested inside another `overflow: auto` ancestor is rejected,
/// even though each node's style is individually well-formed.
#[test]
fn nested_overflow_auto_is_rejected() {
    let json = json!({
        "meta": {"name": "a", "version": "1"},
        "views": {"Main": {
            "type": "Box",
            "style": {"overflow": "auto"},
            "children": [
                {"type": "Box", "style": {"overflow": "auto"}, "children": []}
            ]
        }}
    });
    let result = safeview::validate_json(&json, &Limits::default());
    assert!(result.has_code(ErrorCode::OverflowAutoNested));
}

/// A document that fails validation still renders *something* when the
/// host chooses to render anyway (e.g. during local development), and the
/// runtime defense-in-depth checks in the renderer still apply
/// independently: the image here never appears because its resolved URL
/// is external, regardless of whether validation ran first.
#[test]
fn renderer_drops_external_image_even_without_prior_validation() {
    let json = json!({
        "meta": {"name": "a", "version": "1"},
        "state": {"u": "https://evil.example/payload.png"},
        "views": {"Main": {"type": "Image", "src": {"$ref": "$u"}}}
    });
    let card = Card::from_json(&json).unwrap();

    let mut captured: Vec<ValidationError> = Vec::new();
    let mut on_error = |errors: &[ValidationError]| captured.extend_from_slice(errors);
    let output = render(&request(&card, None), &HostFactoryImpl, Some(&mut on_error));
    assert!(matches!(output, RenderOutput::Empty));
}

/// `validate_raw` rejects an oversized document before it ever reaches a
/// JSON parser, per the §4.1 pre-parse size gate.
#[test]
fn oversized_document_is_rejected_before_parsing() {
    let huge = vec![b' '; 2_000_000];
    let err = validate_raw(&huge, &Limits::default()).unwrap_err();
    assert!(matches!(err, safeview::FoundationError::InputTooLarge { .. }));
}
