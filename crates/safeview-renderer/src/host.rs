//! The trait boundary standing in for an actual host UI toolkit — the
//! renderer's Non-goal is exactly this: no concrete widget set, no
//! painting. Every validated node is dispatched to a `HostFactory`
//! implementation the embedding application supplies, the way a
//! render-tree library dispatches to a render-object type the host
//! framework owns rather than constructing pixels itself.

use std::fmt;
use std::rc::Rc;

use safeview_types::NodeKind;

use crate::style::HostStyle;

/// One method per node kind (§4.9's per-kind render contracts), each
/// taking the node's already-resolved [`HostStyle`] plus whatever
/// kind-specific content the contract describes. Every method returns a
/// `Self::Node` unconditionally — callers that would have rendered
/// nothing for a kind (failed asset lookup, missing `iconResolver`, …)
/// never call the corresponding method at all.
pub trait HostFactory {
    /// The concrete view-tree node type this host produces.
    type Node: fmt::Debug;

    /// Wraps `child` in the non-negotiable sandbox container (§4.9):
    /// `overflow:hidden`, `isolation:isolate`, `contain:content`,
    /// `position:relative`, merged with any caller-supplied
    /// `containerStyle`. Applied exactly once, around the whole output.
    fn sandbox(&self, style: HostStyle, child: Self::Node) -> Self::Node;

    /// A layout kind (`Box`/`Row`/`Column`/`Stack`/`Grid`) with its
    /// already-rendered children, in order.
    fn layout(&self, kind: NodeKind, style: HostStyle, children: Vec<Self::Node>) -> Self::Node;

    /// `Text`'s resolved string content, rendered as a text node — never
    /// spliced in as raw HTML.
    fn text(&self, style: HostStyle, content: &str) -> Self::Node;

    /// `Image`, given its already-resolved, asset-map-looked-up URL.
    fn image(&self, style: HostStyle, url: &str, alt: Option<&str>) -> Self::Node;

    /// `Avatar`, given its already-resolved URL, if resolution succeeded.
    fn avatar(&self, style: HostStyle, url: Option<&str>) -> Self::Node;

    /// `Icon`, wrapping whatever `iconResolver` returned.
    fn icon(&self, style: HostStyle, glyph: Self::Node) -> Self::Node;

    /// `ProgressBar`, given a percentage already clamped to `0.0..=100.0`.
    fn progress_bar(&self, style: HostStyle, percent: f64) -> Self::Node;

    /// `Badge`'s resolved label text.
    fn badge(&self, style: HostStyle, label: &str) -> Self::Node;

    /// `Chip`'s resolved label text.
    fn chip(&self, style: HostStyle, label: &str) -> Self::Node;

    /// `Divider`, given its thickness already formatted as a CSS length.
    fn divider(&self, style: HostStyle, thickness: &str) -> Self::Node;

    /// `Spacer` carries no content at all.
    fn spacer(&self, style: HostStyle) -> Self::Node;

    /// `Button`: `on_click` invokes `onAction("button", actionId, None)`
    /// when the host's own widget reports an activation.
    fn button(&self, style: HostStyle, label: &str, on_click: Rc<dyn Fn()>) -> Self::Node;

    /// `Toggle`: `on_change` invokes `onAction("toggle", actionId,
    /// Some({"value": bool}))` with the new value the host widget reports.
    fn toggle(&self, style: HostStyle, value: bool, on_change: Rc<dyn Fn(bool)>) -> Self::Node;
}
