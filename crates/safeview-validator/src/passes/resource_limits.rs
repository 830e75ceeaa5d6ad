//! Resource-Limits Pass (§4.7): counters with a loop-expansion multiplier,
//! checked against the [`Limits`](crate::limits::Limits) table.

use serde_json::Value as Json;

use safeview_types::{Card, Children, ForLoop, Node, NodeKind, PointerPath, RefPath, Segment, Value};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::limits::Limits;
use crate::merge::merged_style_or_inline;
use crate::walk::{walk_card, VisitResult, Visitor};

#[must_use]
pub fn run(card: &Card, limits: &Limits) -> ValidationResult {
    let mut pass = LimitsPass {
        card,
        limits,
        totals: Metrics::default(),
        result: ValidationResult::default(),
    };
    walk_card(card, &mut pass);
    pass.finish()
}

#[derive(Debug, Default, Clone, Copy)]
struct Metrics {
    nodes: u64,
    text_bytes: u64,
    style_bytes: u64,
    overflow_count: u64,
}

impl Metrics {
    fn add(&mut self, other: Metrics) {
        self.nodes += other.nodes;
        self.text_bytes += other.text_bytes;
        self.style_bytes += other.style_bytes;
        self.overflow_count += other.overflow_count;
    }

    fn scaled(self, factor: u64) -> Metrics {
        Metrics {
            nodes: self.nodes.saturating_mul(factor),
            text_bytes: self.text_bytes.saturating_mul(factor),
            style_bytes: self.style_bytes.saturating_mul(factor),
            overflow_count: self.overflow_count.saturating_mul(factor),
        }
    }
}

struct LimitsPass<'a> {
    card: &'a Card,
    limits: &'a Limits,
    totals: Metrics,
    result: ValidationResult,
}

impl LimitsPass<'_> {
    fn finish(mut self) -> ValidationResult {
        if self.totals.nodes > self.limits.node_count as u64 {
            self.result.push(ValidationError::document(
                ErrorCode::NodeCountExceeded,
                format!(
                    "{} nodes exceeds the {} node limit",
                    self.totals.nodes, self.limits.node_count
                ),
            ));
        }
        if self.totals.text_bytes > self.limits.text_content_bytes as u64 {
            self.result.push(ValidationError::document(
                ErrorCode::TextContentSizeExceeded,
                format!(
                    "{} text bytes exceeds the {} byte limit",
                    self.totals.text_bytes, self.limits.text_content_bytes
                ),
            ));
        }
        if self.totals.style_bytes > self.limits.style_bytes as u64 {
            self.result.push(ValidationError::document(
                ErrorCode::StyleSizeExceeded,
                format!(
                    "{} style bytes exceeds the {} byte limit",
                    self.totals.style_bytes, self.limits.style_bytes
                ),
            ));
        }
        if self.totals.overflow_count > self.limits.overflow_auto_count as u64 {
            self.result.push(ValidationError::document(
                ErrorCode::OverflowAutoCountExceeded,
                format!(
                    "{} overflow:auto nodes exceeds the {} limit",
                    self.totals.overflow_count, self.limits.overflow_auto_count
                ),
            ));
        }
        self.result
    }

    fn node_metrics(&self, node: &Node) -> Metrics {
        let mut m = Metrics {
            nodes: 1,
            ..Metrics::default()
        };
        if let Node::Text(f) = node {
            if let Some(Value::Literal(Json::String(s))) = &f.content {
                m.text_bytes = s.len() as u64;
            }
        }
        if let Some(style) = merged_style_or_inline(node.common().style.as_ref(), &self.card.styles) {
            let bytes = serde_json::to_vec(&style.to_json()).map(|b| b.len()).unwrap_or(0);
            m.style_bytes = bytes as u64;
            if style.get("overflow").and_then(Value::as_literal_str) == Some("auto") {
                m.overflow_count = 1;
            }
        }
        m
    }

    /// Sums the metrics of `node`'s whole subtree, recursively applying
    /// loop-expansion multipliers — used only to compute the "extra
    /// copies" added for a `ForLoop`, never for the live, error-emitting
    /// traversal (that's [`Visitor::visit`]).
    fn subtree_metrics(&self, node: &Node) -> Metrics {
        let mut m = self.node_metrics(node);
        if let Some(children) = node.children() {
            match children {
                Children::List(items) => {
                    for child in items {
                        m.add(self.subtree_metrics(child));
                    }
                }
                Children::ForLoop(for_loop) => {
                    if let Some(template) = &for_loop.template {
                        m.add(self.subtree_metrics(template));
                        m.add(self.extra_loop_copies(for_loop, template));
                    }
                }
            }
        }
        m
    }

    /// `(N - 1) × template_metrics`, capped so a pathological iteration
    /// count can't make this recursion itself a resource-exhaustion vector.
    fn extra_loop_copies(&self, for_loop: &ForLoop, template: &Node) -> Metrics {
        let Some(n) = self.resolve_loop_length(for_loop) else {
            return Metrics::default();
        };
        if n <= 1 {
            return Metrics::default();
        }
        let capped = n.min(self.limits.loop_iterations.saturating_mul(2));
        self.subtree_metrics(template).scaled((capped - 1) as u64)
    }

    fn resolve_loop_length(&self, for_loop: &ForLoop) -> Option<usize> {
        let in_path = for_loop.in_path.as_ref()?;
        resolve_state_array_len(in_path, &self.card.state)
    }
}

impl Visitor for LimitsPass<'_> {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        self.totals.add(self.node_metrics(node));

        if node.kind() == NodeKind::Stack && ctx.stack_depth >= self.limits.stack_nesting_depth {
            self.result.push(ValidationError::new(
                ErrorCode::StackNestingExceeded,
                format!(
                    "Stack nesting depth exceeds the {} level limit",
                    self.limits.stack_nesting_depth
                ),
                &ctx.path,
            ));
        }

        if let Some(Children::ForLoop(for_loop)) = node.children() {
            let children_path = ctx.path.field("children");

            if ctx.loop_depth >= self.limits.nested_loop_depth {
                self.result.push(ValidationError::new(
                    ErrorCode::NestedLoopsExceeded,
                    format!(
                        "loop nesting depth exceeds the {} level limit",
                        self.limits.nested_loop_depth
                    ),
                    &children_path,
                ));
            }

            if let Some(in_path) = &for_loop.in_path {
                match resolve_state_value(in_path, &self.card.state) {
                    Some(Json::Array(items)) => {
                        let n = items.len();
                        if n > self.limits.loop_iterations {
                            self.result.push(ValidationError::new(
                                ErrorCode::LoopIterationsExceeded,
                                format!(
                                    "loop resolves to {n} iterations, exceeding the {} limit",
                                    self.limits.loop_iterations
                                ),
                                &children_path.field("in"),
                            ));
                        } else if let Some(template) = &for_loop.template {
                            self.totals.add(self.extra_loop_copies(for_loop, template));
                        }
                    }
                    Some(_) => self.result.push(ValidationError::new(
                        ErrorCode::LoopSourceNotArray,
                        format!("{in_path:?} does not resolve to an array"),
                        &children_path.field("in"),
                    )),
                    None => {
                        // Unresolvable (e.g. a loop-local source) — skip
                        // silently, per §4.7; the source may only exist
                        // during an outer iteration.
                    }
                }
            }
        }

        VisitResult::Continue
    }
}

/// Resolves a dotted/bracketed path (e.g. `$items[0].name`) against a JSON
/// value, reusing [`RefPath`]'s segment parser.
fn resolve_state_value(path_str: &str, state: &Json) -> Option<Json> {
    let segments = RefPath::new(path_str).segments()?;
    let mut current = state;
    for segment in segments {
        current = match segment {
            Segment::Name(name) => current.as_object()?.get(&name)?,
            Segment::Index(idx) => current.as_array()?.get(idx)?,
        };
    }
    Some(current.clone())
}

fn resolve_state_array_len(path_str: &str, state: &Json) -> Option<usize> {
    resolve_state_value(path_str, state).and_then(|v| v.as_array().map(Vec::len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_card_under_every_limit_is_valid() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hi"}}
        }))
        .unwrap();
        assert!(run(&card, &Limits::default()).valid());
    }

    #[test]
    fn loop_expansion_over_counts_nodes() {
        let items: Vec<Json> = (0..1000).map(|_| json!(1)).collect();
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"items": items},
            "views": {"Main": {
                "type": "Box",
                "children": {
                    "for": "item",
                    "in": "$items",
                    "template": {
                        "type": "Box",
                        "children": [
                            {"type": "Text", "content": "1"}, {"type": "Text", "content": "2"},
                            {"type": "Text", "content": "3"}, {"type": "Text", "content": "4"},
                            {"type": "Text", "content": "5"}, {"type": "Text", "content": "6"},
                            {"type": "Text", "content": "7"}, {"type": "Text", "content": "8"},
                            {"type": "Text", "content": "9"}, {"type": "Text", "content": "10"}
                        ]
                    }
                }
            }}
        }))
        .unwrap();
        let result = run(&card, &Limits::default());
        assert!(result.has_code(ErrorCode::NodeCountExceeded));
    }

    #[test]
    fn loop_iterations_over_limit_is_reported() {
        let items: Vec<Json> = (0..1001).map(|_| json!(1)).collect();
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"items": items},
            "views": {"Main": {
                "type": "Box",
                "children": {"for": "item", "in": "$items", "template": {"type": "Text", "content": "x"}}
            }}
        }))
        .unwrap();
        assert!(run(&card, &Limits::default()).has_code(ErrorCode::LoopIterationsExceeded));
    }

    #[test]
    fn non_array_loop_source_is_reported() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "state": {"items": "not-an-array"},
            "views": {"Main": {
                "type": "Box",
                "children": {"for": "item", "in": "$items", "template": {"type": "Text", "content": "x"}}
            }}
        }))
        .unwrap();
        assert!(run(&card, &Limits::default()).has_code(ErrorCode::LoopSourceNotArray));
    }

    #[test]
    fn unresolvable_loop_source_is_skipped_silently() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {
                "type": "Box",
                "children": {
                    "for": "outer", "in": "$items",
                    "template": {
                        "type": "Box",
                        "children": {"for": "inner", "in": "$outer.items", "template": {"type": "Text", "content": "x"}}
                    }
                }
            }}
        }))
        .unwrap();
        assert!(run(&card, &Limits::default()).valid());
    }

    #[test]
    fn stack_nesting_beyond_limit_is_reported() {
        let mut stack = json!({"type": "Text", "content": "leaf"});
        for _ in 0..4 {
            stack = json!({"type": "Stack", "children": [stack]});
        }
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": stack}
        }))
        .unwrap();
        assert!(run(&card, &Limits::default()).has_code(ErrorCode::StackNestingExceeded));
    }
}
