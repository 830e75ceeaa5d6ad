//! Value-Type Pass (§4.4): enforces the per-field dynamic-value permission
//! table (*Dynamic* / *RefOnly* / *Static*).

use safeview_types::{Card, Node, StyleObject, Value, STATIC_ONLY_STYLE_PROPERTIES};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::walk::{walk_card, VisitResult, Visitor};

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = ValueTypePass::default();
    for (name, style) in &card.styles {
        pass.check_style_object(style, &safeview_types::PointerPath::root().field("styles").field(name));
    }
    walk_card(card, &mut pass);
    pass.result
}

#[derive(Default)]
struct ValueTypePass {
    result: ValidationResult,
}

impl ValueTypePass {
    /// `Image.src`/`Avatar.src`: literal or `$ref`, never `$expr`.
    fn check_ref_only(&mut self, value: &Value, path: &safeview_types::PointerPath) {
        if matches!(value, Value::Expr(_)) {
            self.result.push(ValidationError::new(
                ErrorCode::ExprNotAllowed,
                "$expr is not allowed here; use a literal or $ref",
                path,
            ));
        }
    }

    /// `Icon.name`, `Button.action`, `Toggle.onToggle`, and the
    /// static-only style properties: literal only.
    fn check_static(&mut self, value: &Value, path: &safeview_types::PointerPath) {
        match value {
            Value::Literal(_) => {}
            Value::Ref(_) => self.result.push(ValidationError::new(
                ErrorCode::RefNotAllowed,
                "$ref is not allowed here; a literal value is required",
                path,
            )),
            Value::Expr(_) => self.result.push(ValidationError::new(
                ErrorCode::ExprNotAllowed,
                "$expr is not allowed here; a literal value is required",
                path,
            )),
        }
    }

    fn check_style_object(&mut self, style: &StyleObject, path: &safeview_types::PointerPath) {
        for property in STATIC_ONLY_STYLE_PROPERTIES {
            if let Some(value) = style.get(property) {
                self.check_static(value, &path.field(*property));
            }
        }
    }
}

impl Visitor for ValueTypePass {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        match node {
            Node::Image(f) => {
                if let Some(src) = &f.src {
                    self.check_ref_only(src, &ctx.path.field("src"));
                }
            }
            Node::Avatar(f) => {
                if let Some(src) = &f.src {
                    self.check_ref_only(src, &ctx.path.field("src"));
                }
            }
            Node::Icon(f) => {
                if let Some(name) = &f.name {
                    self.check_static(name, &ctx.path.field("name"));
                }
            }
            Node::Button(f) => {
                if let Some(action) = &f.action {
                    self.check_static(action, &ctx.path.field("action"));
                }
            }
            Node::Toggle(f) => {
                if let Some(on_toggle) = &f.on_toggle {
                    self.check_static(on_toggle, &ctx.path.field("onToggle"));
                }
            }
            _ => {}
        }

        if let Some(style) = &node.common().style {
            self.check_style_object(style, &ctx.path.field("style"));
        }

        VisitResult::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_src_rejects_expr() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Image", "src": {"$expr": "\"x\""}}}
        }))
        .unwrap();
        let result = run(&card);
        assert!(result.has_code(ErrorCode::ExprNotAllowed));
    }

    #[test]
    fn image_src_allows_ref() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Image", "src": {"$ref": "$u"}}}
        }))
        .unwrap();
        assert!(run(&card).valid());
    }

    #[test]
    fn button_action_rejects_ref() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Button", "label": "Go", "action": {"$ref": "$a"}}}
        }))
        .unwrap();
        assert!(run(&card).has_code(ErrorCode::RefNotAllowed));
    }

    #[test]
    fn static_only_style_property_rejects_ref() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Box", "style": {"position": {"$ref": "$p"}}, "children": []}}
        }))
        .unwrap();
        assert!(run(&card).has_code(ErrorCode::RefNotAllowed));
    }

    #[test]
    fn color_and_length_properties_allow_dynamic_values() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Box", "style": {"color": {"$ref": "$c"}, "width": {"$expr": "$w"}}, "children": []}}
        }))
        .unwrap();
        assert!(run(&card).valid());
    }
}
