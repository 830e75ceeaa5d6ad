//! The single generic tree walker shared by every pass (§4.1).
//!
//! A pass implements [`Visitor`] and drives itself with [`walk_view`] /
//! [`walk_card`]; the walker owns path/depth/ancestor bookkeeping so no pass
//! has to re-derive it. A `ForLoop`'s `template` is visited exactly once —
//! loop-expansion accounting (§4.7) is the Resource-Limits Pass's own
//! concern, not something the shared walker does.

use safeview_types::{Card, Children, Node};

use crate::context::Context;

/// What a visitor wants to happen to a node's subtree after visiting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitResult {
    Continue,
    SkipSubtree,
}

/// Implemented by each pass to receive every node in a card, in document
/// order, pre-order.
pub trait Visitor {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult;
}

/// Walks every view in `card`, in `view_order`, calling `visitor` for each
/// node.
pub fn walk_card(card: &Card, visitor: &mut impl Visitor) {
    for name in &card.view_order {
        if let Some(root) = card.views.get(name) {
            let ctx = Context::view_root(name);
            walk_node(root, ctx, visitor);
        }
    }
}

/// Walks a single node and its descendants, starting from `ctx` (the
/// context already describing `node`'s own position).
pub fn walk_node(node: &Node, ctx: Context, visitor: &mut impl Visitor) {
    if visitor.visit(node, &ctx) == VisitResult::SkipSubtree {
        return;
    }
    let Some(children) = node.children() else {
        return;
    };
    // The sticky flag is seeded from `node`'s own overflow, not the
    // child's — it's the node being descended *from* that makes every
    // descendant an overflow:auto descendant, not the descendant itself.
    let overflow_auto = node_overflow_auto(node);
    match children {
        Children::List(items) => {
            for (i, child) in items.iter().enumerate() {
                let child_ctx = ctx.child_index(i, node.kind(), overflow_auto);
                walk_node(child, child_ctx, visitor);
            }
        }
        Children::ForLoop(for_loop) => {
            if let Some(template) = &for_loop.template {
                let child_ctx = ctx.loop_template(node.kind(), overflow_auto);
                walk_node(template, child_ctx, visitor);
            }
        }
    }
}

/// Whether `node`'s own inline style carries `overflow: "auto"` — used to
/// keep [`Context::overflow_auto_ancestor`] sticky as the walker descends.
///
/// This only looks at the node's *inline* `style`, not a `$style` base it
/// may reference — resolving the base requires the card's style map, which
/// the shared walker doesn't have access to. Passes that need the fully
/// merged style (Security Pass's nested-overflow rule, in particular) do
/// that resolution themselves and track it in their own visitor state; this
/// cheap inline check is enough to seed the common case.
fn node_overflow_auto(node: &Node) -> bool {
    node.common()
        .style
        .as_ref()
        .and_then(|s| s.get("overflow"))
        .and_then(|v| v.as_literal_str())
        .is_some_and(|v| v == "auto")
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeview_types::NodeKind;
    use serde_json::json;

    struct CountingVisitor {
        visited: Vec<(NodeKind, usize)>,
    }

    impl Visitor for CountingVisitor {
        fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
            self.visited.push((node.kind(), ctx.depth));
            VisitResult::Continue
        }
    }

    #[test]
    fn walks_list_children_in_document_order() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {
                "Main": {
                    "type": "Column",
                    "children": [
                        {"type": "Text", "content": "a"},
                        {"type": "Text", "content": "b"}
                    ]
                }
            }
        }))
        .unwrap();

        let mut visitor = CountingVisitor { visited: Vec::new() };
        walk_card(&card, &mut visitor);
        assert_eq!(
            visitor.visited,
            vec![(NodeKind::Column, 1), (NodeKind::Text, 2), (NodeKind::Text, 2)]
        );
    }

    #[test]
    fn for_loop_template_is_visited_once_at_increased_loop_depth() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {
                "Main": {
                    "type": "Box",
                    "children": {"for": "item", "in": "$items", "template": {"type": "Text", "content": "x"}}
                }
            }
        }))
        .unwrap();

        struct LoopDepthVisitor {
            depths: Vec<usize>,
        }
        impl Visitor for LoopDepthVisitor {
            fn visit(&mut self, _node: &Node, ctx: &Context) -> VisitResult {
                self.depths.push(ctx.loop_depth);
                VisitResult::Continue
            }
        }

        let mut visitor = LoopDepthVisitor { depths: Vec::new() };
        walk_card(&card, &mut visitor);
        assert_eq!(visitor.depths, vec![0, 1]);
    }

    #[test]
    fn skip_subtree_stops_descent() {
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {
                "Main": {
                    "type": "Column",
                    "children": [{"type": "Text", "content": "a"}]
                }
            }
        }))
        .unwrap();

        struct StopAtRoot {
            count: usize,
        }
        impl Visitor for StopAtRoot {
            fn visit(&mut self, _node: &Node, _ctx: &Context) -> VisitResult {
                self.count += 1;
                VisitResult::SkipSubtree
            }
        }

        let mut visitor = StopAtRoot { count: 0 };
        walk_card(&card, &mut visitor);
        assert_eq!(visitor.count, 1);
    }
}
