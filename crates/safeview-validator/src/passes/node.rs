//! Node Pass (§4.3): known-type + required-field checks, and `ForLoop`
//! shape validation. Runs over the already-typed [`Card`]; by this point
//! the Schema Pass has already guaranteed every `type` is recognized, so
//! the "known type" half of this pass is defense in depth rather than a
//! normally reachable check — it exists so the pass is independently
//! testable and behaves correctly if ever run on its own.

use safeview_types::{Card, Children, ForLoop, Node};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::walk::{walk_card, VisitResult, Visitor};

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = NodePass::default();
    walk_card(card, &mut pass);
    pass.result
}

#[derive(Default)]
struct NodePass {
    result: ValidationResult,
}

impl NodePass {
    fn require(&mut self, present: bool, ctx: &Context, field: &str) {
        if !present {
            self.result.push(ValidationError::new(
                ErrorCode::MissingField,
                format!("{field} is required"),
                &ctx.path.field(field),
            ));
        }
    }

    fn check_for_loop(&mut self, for_loop: &ForLoop, ctx: &Context) {
        let children_path = ctx.path.field("children");

        match &for_loop.for_ident {
            Some(ident) if !ident.is_empty() => {}
            _ => self.result.push(ValidationError::new(
                ErrorCode::MissingField,
                "for must be a non-empty identifier",
                &children_path.field("for"),
            )),
        }

        match &for_loop.in_path {
            Some(path) if path.starts_with('$') => {}
            _ => self.result.push(ValidationError::new(
                ErrorCode::InvalidValue,
                "in must be a string starting with \"$\"",
                &children_path.field("in"),
            )),
        }

        if for_loop.template.is_none() {
            self.result.push(ValidationError::new(
                ErrorCode::MissingField,
                "template is required and must be a node with a type",
                &children_path.field("template"),
            ));
        }
    }
}

impl Visitor for NodePass {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        match node {
            Node::Text(f) => self.require(f.content.is_some(), ctx, "content"),
            Node::Image(f) => self.require(f.src.is_some(), ctx, "src"),
            Node::Avatar(f) => self.require(f.src.is_some(), ctx, "src"),
            Node::Icon(f) => self.require(f.name.is_some(), ctx, "name"),
            Node::ProgressBar(f) => {
                self.require(f.value.is_some(), ctx, "value");
                self.require(f.max.is_some(), ctx, "max");
            }
            Node::Badge(f) | Node::Chip(f) => self.require(f.label.is_some(), ctx, "label"),
            Node::Button(f) => {
                self.require(f.label.is_some(), ctx, "label");
                self.require(f.action.is_some(), ctx, "action");
            }
            Node::Toggle(f) => {
                self.require(f.value.is_some(), ctx, "value");
                self.require(f.on_toggle.is_some(), ctx, "onToggle");
            }
            Node::Box(_) | Node::Row(_) | Node::Column(_) | Node::Stack(_) | Node::Grid(_)
            | Node::Divider(_) | Node::Spacer(_) => {}
        }

        if let Some(Children::ForLoop(for_loop)) = node.children() {
            self.check_for_loop(for_loop, ctx);
        }

        VisitResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_text_content_is_reported() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text"}}
        }))
        .unwrap();
        let result = run(&card);
        assert!(result.has_code(ErrorCode::MissingField));
        assert_eq!(result.errors[0].path, "views.Main.content");
    }

    #[test]
    fn complete_button_passes() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Button", "label": "Go", "action": {"$expr": "\"go\""}}}
        }))
        .unwrap();
        assert!(run(&card).valid());
    }

    #[test]
    fn for_loop_missing_in_path_is_reported() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {
                "type": "Box",
                "children": {"for": "item", "template": {"type": "Text", "content": "x"}}
            }}
        }))
        .unwrap();
        let result = run(&card);
        assert!(result.errors.iter().any(|e| e.path == "views.Main.children.in"));
    }

    #[test]
    fn layout_kind_has_no_required_fields() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Row", "children": []}}
        }))
        .unwrap();
        assert!(run(&card).valid());
    }
}
