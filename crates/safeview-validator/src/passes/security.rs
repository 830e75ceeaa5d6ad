//! Security Pass (§4.6): asset-path rule, external-URL check, position
//! rules, nested-overflow rule, prototype-pollution scan, style URL
//! function check.

use safeview_types::{Card, Node, NodeKind, PointerPath, RefPath, Segment, StyleObject, Value};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::merge::merged_style_or_inline;
use crate::walk::{walk_card, VisitResult, Visitor};

const EXTERNAL_URL_PREFIXES: &[&str] = &["http://", "https://", "//", "data:", "javascript:"];

/// A path is a valid asset reference iff it starts with `@assets/` and
/// contains no `../` traversal segment.
#[must_use]
pub fn is_valid_asset_path(path: &str) -> bool {
    path.starts_with("@assets/") && !path.contains("../")
}

/// Classifies a would-be URL literal against the external-URL prefixes
/// (§4.6), case-insensitively, after trimming.
#[must_use]
pub fn is_external_url(text: &str) -> bool {
    let lower = text.trim().to_ascii_lowercase();
    EXTERNAL_URL_PREFIXES.iter().any(|p| lower.starts_with(p))
}

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = SecurityPass {
        card,
        result: ValidationResult::default(),
    };

    for (key, path) in &card.assets {
        pass.check_asset_value(path, &PointerPath::root().field("assets").field(key));
    }

    walk_card(card, &mut pass);
    pass.result
}

struct SecurityPass<'a> {
    card: &'a Card,
    result: ValidationResult,
}

impl SecurityPass<'_> {
    fn check_asset_value(&mut self, path: &str, error_path: &PointerPath) {
        if !path.starts_with("@assets/") {
            self.result.push(ValidationError::new(
                ErrorCode::InvalidAssetPath,
                format!("{path:?} must start with \"@assets/\""),
                error_path,
            ));
        } else if path.contains("../") {
            self.result.push(ValidationError::new(
                ErrorCode::AssetPathTraversal,
                format!("{path:?} must not contain \"../\""),
                error_path,
            ));
        }
    }

    fn check_src(&mut self, value: &Value, path: &PointerPath) {
        match value {
            Value::Literal(json) => {
                if let Some(text) = json.as_str() {
                    self.check_url_string(text, path);
                }
            }
            Value::Ref(r) => {
                if let Some(text) = resolve_ref_literal_str(r, &self.card.state) {
                    self.check_url_string(&text, path);
                }
                // Unresolvable (e.g. a loop-local) is skipped; the
                // renderer re-checks once the value is actually resolved.
            }
            Value::Expr(_) => {}
        }
    }

    fn check_url_string(&mut self, text: &str, path: &PointerPath) {
        if is_external_url(text) {
            self.result.push(ValidationError::new(
                ErrorCode::ExternalUrl,
                format!("{text:?} is an external URL"),
                path,
            ));
            return;
        }
        self.check_asset_value(text, path);
    }

    fn check_position(&mut self, merged: &StyleObject, parent_kind: Option<NodeKind>, path: &PointerPath) {
        let Some(position) = merged.get("position").and_then(Value::as_literal_str) else {
            return;
        };
        match position {
            "fixed" => self.result.push(ValidationError::new(
                ErrorCode::PositionFixedForbidden,
                "position: fixed is not permitted",
                &path.field("position"),
            )),
            "sticky" => self.result.push(ValidationError::new(
                ErrorCode::PositionStickyForbidden,
                "position: sticky is not permitted",
                &path.field("position"),
            )),
            "absolute" if parent_kind != Some(NodeKind::Stack) => {
                self.result.push(ValidationError::new(
                    ErrorCode::PositionAbsoluteNotInStack,
                    "position: absolute is only permitted inside a Stack",
                    &path.field("position"),
                ));
            }
            _ => {}
        }
    }

    fn check_nested_overflow(&mut self, merged: &StyleObject, ctx: &Context, path: &PointerPath) {
        let is_auto = merged
            .get("overflow")
            .and_then(Value::as_literal_str)
            .is_some_and(|v| v == "auto");
        if is_auto && ctx.overflow_auto_ancestor {
            self.result.push(ValidationError::new(
                ErrorCode::OverflowAutoNested,
                "overflow: auto is not permitted inside another overflow:auto ancestor",
                &path.field("overflow"),
            ));
        }
    }

    fn check_style_urls(&mut self, style: &StyleObject, path: &PointerPath) {
        for (property, value) in &style.props {
            if let Some(json) = value.as_literal() {
                self.scan_style_url(json, &path.field(property));
            }
        }
    }

    /// Recurses into structured style values (`border*.color`,
    /// `backgroundGradient.stops[].color`, `boxShadow[].color`, …) so a
    /// `url(...)` hidden inside a nested color field is caught the same
    /// as one authored directly on the property (§4.6).
    fn scan_style_url(&mut self, json: &serde_json::Value, path: &PointerPath) {
        match json {
            serde_json::Value::String(text) => {
                if text.to_ascii_lowercase().contains("url(") {
                    self.result.push(ValidationError::new(
                        ErrorCode::ForbiddenCssFunction,
                        "url(...) is not permitted in a style value",
                        path,
                    ));
                }
            }
            serde_json::Value::Object(map) => {
                for (key, nested) in map {
                    self.scan_style_url(nested, &path.field(key));
                }
            }
            serde_json::Value::Array(items) => {
                for (i, nested) in items.iter().enumerate() {
                    self.scan_style_url(nested, &path.index(i));
                }
            }
            _ => {}
        }
    }

    fn scan_pollution(&mut self, value: &Value, path: &PointerPath) {
        if let Value::Ref(r) = value {
            if r.contains_pollution_segment() {
                self.result.push(ValidationError::new(
                    ErrorCode::PrototypePollution,
                    format!("{:?} contains a pollution segment", r.raw()),
                    path,
                ));
            }
        }
    }
}

impl Visitor for SecurityPass<'_> {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        let style_path = ctx.path.field("style");
        let merged = merged_style_or_inline(node.common().style.as_ref(), &self.card.styles);

        if let Some(merged) = &merged {
            self.check_position(merged, ctx.parent_type, &style_path);
            self.check_nested_overflow(merged, ctx, &style_path);
        }
        if let Some(style) = &node.common().style {
            self.check_style_urls(style, &style_path);
            for value in style.props.values() {
                self.scan_pollution(value, &style_path);
            }
        }
        if let Some(condition) = &node.common().condition {
            self.scan_pollution(condition, &ctx.path.field("condition"));
        }

        match node {
            Node::Image(f) => {
                if let Some(src) = &f.src {
                    self.check_src(src, &ctx.path.field("src"));
                }
            }
            Node::Avatar(f) => {
                if let Some(src) = &f.src {
                    self.check_src(src, &ctx.path.field("src"));
                }
            }
            _ => {}
        }

        // Pollution scanning is recursive over every field a node carries
        // (§4.6), not just the handful inspected above for other checks.
        for (value, field) in super::expression::node_scalar_values(node) {
            self.scan_pollution(value, &ctx.path.field(field));
        }

        VisitResult::Continue
    }
}

/// Best-effort literal-string resolution of a `$ref` against the top-level
/// `state` map only (no locals) — used by the security pass's pre-render
/// external-URL check, which only needs to catch the case the ref resolves
/// to a plain string here and now.
fn resolve_ref_literal_str(path: &RefPath, state: &serde_json::Value) -> Option<String> {
    let segments = path.segments()?;
    let mut current = state;
    for segment in segments {
        current = match segment {
            Segment::Name(name) => current.as_object()?.get(&name)?,
            Segment::Index(idx) => current.as_array()?.get(idx)?,
        };
    }
    current.as_str().map(str::to_string)
}
