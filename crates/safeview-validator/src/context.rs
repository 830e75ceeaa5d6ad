//! The traversal context threaded through every node visit (§4.1).

use safeview_types::{NodeKind, PointerPath};

/// Everything a visitor needs to know about *where* it is in the tree,
/// independent of which pass is running.
#[derive(Debug, Clone)]
pub struct Context {
    pub path: PointerPath,
    pub depth: usize,
    pub parent_type: Option<NodeKind>,
    /// Incremented only when entering a `ForLoop`'s `template`.
    pub loop_depth: usize,
    /// Sticky: once any ancestor's merged style carries `overflow:"auto"`,
    /// this stays `true` for the rest of the subtree.
    pub overflow_auto_ancestor: bool,
    /// Count of `Stack` ancestors (and self, once entered), for §4.7's
    /// `STACK_NESTING_EXCEEDED` and the renderer's mirrored limit.
    pub stack_depth: usize,
}

impl Context {
    /// The context for a view's root node (§4.1): no parent, no inherited
    /// Stack nesting or `overflow:auto` ancestry — a view root is exactly
    /// as unconstrained as the spec says, not its own parent.
    #[must_use]
    pub fn view_root(name: &str) -> Self {
        Self {
            path: PointerPath::root().field("views").field(name),
            depth: 1,
            parent_type: None,
            loop_depth: 0,
            overflow_auto_ancestor: false,
            stack_depth: 0,
        }
    }

    /// The context for the `n`th element of an ordered child list.
    #[must_use]
    pub fn child_index(&self, index: usize, parent_kind: NodeKind, overflow_auto: bool) -> Self {
        Self {
            path: self.path.field("children").index(index),
            depth: self.depth + 1,
            parent_type: Some(parent_kind),
            loop_depth: self.loop_depth,
            overflow_auto_ancestor: self.overflow_auto_ancestor || overflow_auto,
            stack_depth: self.stack_depth + usize::from(parent_kind == NodeKind::Stack),
        }
    }

    /// The context for a `ForLoop`'s `template`, one loop level deeper.
    #[must_use]
    pub fn loop_template(&self, parent_kind: NodeKind, overflow_auto: bool) -> Self {
        Self {
            path: self.path.field("children").field("template"),
            depth: self.depth + 1,
            parent_type: Some(parent_kind),
            loop_depth: self.loop_depth + 1,
            overflow_auto_ancestor: self.overflow_auto_ancestor || overflow_auto,
            stack_depth: self.stack_depth + usize::from(parent_kind == NodeKind::Stack),
        }
    }
}
