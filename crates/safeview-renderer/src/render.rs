//! The render pipeline itself (§4.9): per node, merge style, compute
//! budget deltas, check them all-or-nothing, commit, resolve style,
//! dispatch to the host by kind, then recurse into children.
//!
//! `condition` is deliberately never consulted here: §3 types it as a
//! general [`Value`] but this renderer has no expression evaluator (a
//! stated Non-goal), so an `Expr` condition could never resolve to
//! anything regardless. Every node the validator accepted renders
//! unconditionally; `condition` exists in the data model for a future,
//! bounded evaluator to consume.

use std::collections::BTreeMap;
use std::rc::Rc;

use safeview_types::node::{
    AvatarFields, ButtonFields, DividerFields, IconFields, ImageFields, LabelFields,
    ProgressBarFields, ToggleFields,
};
use safeview_types::{Children, ForLoop, Node, NodeKind, PointerPath, RefPath, StyleObject, Value};
use safeview_validator::passes::security::is_valid_asset_path;
use safeview_validator::{ErrorCode, ValidationError};
use serde_json::Value as Json;

use crate::budget::{BudgetDelta, RuntimeBudget};
use crate::callbacks::ActionKind;
use crate::host::HostFactory;
use crate::resolver::{resolve_ref, resolve_value};
use crate::scope::Locals;
use crate::style::{resolve_style, HostStyle};
use crate::{RenderOutput, RenderRequest};

/// Path-tracking context threaded through the recursion, used only to
/// stamp runtime errors with a location (§7's `{code, message, path}`).
struct RenderCtx {
    path: PointerPath,
}

impl RenderCtx {
    fn root(view_name: &str) -> Self {
        Self {
            path: PointerPath::root().field("views").field(view_name),
        }
    }

    fn child_index(&self, idx: usize) -> Self {
        Self {
            path: self.path.field("children").index(idx),
        }
    }

    fn loop_item(&self, idx: usize) -> Self {
        Self {
            path: self.path.field("children").field("template").index(idx),
        }
    }

    fn field(&self, name: &str) -> PointerPath {
        self.path.field(name)
    }
}

pub(crate) fn run<F: HostFactory>(
    request: &RenderRequest<'_, F>,
    factory: &F,
    mut on_error: Option<&mut dyn FnMut(&[ValidationError])>,
) -> RenderOutput<F::Node> {
    let Some((view_name, root)) = select_view(request) else {
        tracing::debug!(view = request.view_name, "no matching view; rendering nothing");
        return RenderOutput::Empty;
    };

    let span = tracing::info_span!("render", view = view_name);
    let _enter = span.enter();

    let state = request.state.unwrap_or(&request.card.state);
    let named_styles = request.styles.unwrap_or(&request.card.styles);
    let empty_assets = BTreeMap::new();
    let assets = request.assets.unwrap_or(&empty_assets);

    let mut budget = RuntimeBudget::new(request.limits);
    let mut errors = Vec::new();
    let ctx = RenderCtx::root(view_name);
    let locals = Locals::root();

    let rendered = render_node(
        root,
        &ctx,
        state,
        &locals,
        named_styles,
        assets,
        factory,
        request,
        &mut budget,
        &mut errors,
    );

    if !errors.is_empty() {
        tracing::warn!(count = errors.len(), "render produced runtime errors");
        if let Some(on_error) = on_error.as_deref_mut() {
            on_error(&errors);
        }
    }

    match rendered {
        Some(node) => RenderOutput::View(wrap_sandbox(factory, request.container_style, node, state, &locals)),
        None => RenderOutput::Empty,
    }
}

fn select_view<'a, F: HostFactory>(request: &RenderRequest<'a, F>) -> Option<(&'a str, &'a Node)> {
    let name = request.view_name.or_else(|| request.card.default_view_name())?;
    let node = request.card.views.get(name)?;
    Some((name, node))
}

fn wrap_sandbox<F: HostFactory>(
    factory: &F,
    container_style: Option<&StyleObject>,
    child: F::Node,
    state: &Json,
    locals: &Locals,
) -> F::Node {
    let mut style = container_style
        .map(|s| resolve_style(s, state, locals))
        .unwrap_or_default();
    style.properties.insert("overflow".to_string(), "hidden".to_string());
    style.properties.insert("isolation".to_string(), "isolate".to_string());
    style.properties.insert("contain".to_string(), "content".to_string());
    style.properties.insert("position".to_string(), "relative".to_string());
    factory.sandbox(style, child)
}

/// Resolves a node's own `$style` inheritance chain (§4.10's "Merged
/// style"). This mirrors `safeview-validator`'s internal merge logic but
/// is reimplemented here rather than shared: that module is private to
/// the validator crate, and a render only ever sees already-validated
/// input, so it doesn't need that pass's cycle *reporting* — only a
/// depth cap so a pathological named-style graph can't loop forever.
fn merge_style(style: Option<&StyleObject>, named: &BTreeMap<String, StyleObject>) -> Option<StyleObject> {
    let style = style?;
    match &style.base {
        Some(base_name) => {
            let base = resolve_named_style(base_name, named, 0).unwrap_or_default();
            Some(style.merge_over(&base))
        }
        None => Some(style.clone()),
    }
}

fn resolve_named_style(name: &str, named: &BTreeMap<String, StyleObject>, depth: usize) -> Option<StyleObject> {
    if depth > 16 {
        return None;
    }
    let style = named.get(name)?;
    match &style.base {
        Some(base_name) => {
            let base = resolve_named_style(base_name, named, depth + 1)?;
            Some(style.merge_over(&base))
        }
        None => Some(style.clone()),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_node<F: HostFactory>(
    node: &Node,
    ctx: &RenderCtx,
    state: &Json,
    locals: &Locals,
    named_styles: &BTreeMap<String, StyleObject>,
    assets: &BTreeMap<String, String>,
    factory: &F,
    request: &RenderRequest<'_, F>,
    budget: &mut RuntimeBudget,
    errors: &mut Vec<ValidationError>,
) -> Option<F::Node> {
    let merged = merge_style(node.common().style.as_ref(), named_styles);

    let style_bytes = merged
        .as_ref()
        .map(StyleObject::to_json)
        .and_then(|j| serde_json::to_vec(&j).ok())
        .map_or(0, |bytes| bytes.len()) as u64;

    let overflow_auto = merged
        .as_ref()
        .and_then(|s| s.get("overflow"))
        .and_then(Value::as_literal_str)
        == Some("auto");

    let resolved_text = match node {
        Node::Text(f) => f.content.as_ref().and_then(|v| resolve_value(v, state, locals)),
        _ => None,
    };
    let text_bytes = resolved_text
        .as_ref()
        .and_then(Json::as_str)
        .map(str::len)
        .unwrap_or(0) as u64;

    let delta = BudgetDelta {
        nodes: 1,
        style_bytes,
        overflow: u64::from(overflow_auto),
        text_bytes,
    };

    if let Err(limit) = budget.check(delta) {
        errors.push(ValidationError::new(
            limit.error_code(),
            format!("runtime budget exceeded rendering a {}", node.kind()),
            &ctx.path,
        ));
        return None;
    }
    budget.commit(delta);

    let host_style = merged
        .as_ref()
        .map(|s| resolve_style(s, state, locals))
        .unwrap_or_default();

    dispatch(
        node,
        ctx,
        &host_style,
        resolved_text.as_ref(),
        state,
        locals,
        named_styles,
        assets,
        factory,
        request,
        budget,
        errors,
    )
}

#[allow(clippy::too_many_arguments)]
fn dispatch<F: HostFactory>(
    node: &Node,
    ctx: &RenderCtx,
    style: &HostStyle,
    resolved_text: Option<&Json>,
    state: &Json,
    locals: &Locals,
    named_styles: &BTreeMap<String, StyleObject>,
    assets: &BTreeMap<String, String>,
    factory: &F,
    request: &RenderRequest<'_, F>,
    budget: &mut RuntimeBudget,
    errors: &mut Vec<ValidationError>,
) -> Option<F::Node> {
    macro_rules! children_of {
        ($f:expr) => {
            render_children(
                $f.children.as_ref(),
                ctx,
                state,
                locals,
                named_styles,
                assets,
                factory,
                request,
                budget,
                errors,
            )
        };
    }

    match node {
        Node::Box(f) => Some(factory.layout(NodeKind::Box, style.clone(), children_of!(f))),
        Node::Row(f) => Some(factory.layout(NodeKind::Row, style.clone(), children_of!(f))),
        Node::Column(f) => Some(factory.layout(NodeKind::Column, style.clone(), children_of!(f))),
        Node::Stack(f) => Some(factory.layout(NodeKind::Stack, style.clone(), children_of!(f))),
        Node::Grid(f) => Some(factory.layout(NodeKind::Grid, style.clone(), children_of!(f))),
        Node::Text(_) => Some(factory.text(style.clone(), &value_as_text(resolved_text))),
        Node::Image(f) => render_image(f, style, state, locals, assets, factory),
        Node::Avatar(f) => render_avatar(f, style, state, locals, assets, factory),
        Node::Icon(f) => render_icon(f, style, request, factory),
        Node::Badge(f) => render_label(f, style, state, locals, factory, F::badge),
        Node::Chip(f) => render_label(f, style, state, locals, factory, F::chip),
        Node::Divider(f) => render_divider(f, style, state, locals, factory),
        Node::Spacer(_) => Some(factory.spacer(style.clone())),
        Node::Button(f) => render_button(f, style, state, locals, request, factory),
        Node::Toggle(f) => render_toggle(f, style, state, locals, request, factory),
        Node::ProgressBar(f) => render_progress_bar(f, style, state, locals, factory),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_children<F: HostFactory>(
    children: Option<&Children>,
    ctx: &RenderCtx,
    state: &Json,
    locals: &Locals,
    named_styles: &BTreeMap<String, StyleObject>,
    assets: &BTreeMap<String, String>,
    factory: &F,
    request: &RenderRequest<'_, F>,
    budget: &mut RuntimeBudget,
    errors: &mut Vec<ValidationError>,
) -> Vec<F::Node> {
    let Some(children) = children else {
        return Vec::new();
    };
    match children {
        Children::List(items) => items
            .iter()
            .enumerate()
            .filter_map(|(i, child)| {
                render_node(
                    child,
                    &ctx.child_index(i),
                    state,
                    locals,
                    named_styles,
                    assets,
                    factory,
                    request,
                    budget,
                    errors,
                )
            })
            .collect(),
        Children::ForLoop(for_loop) => render_for_loop(
            for_loop, ctx, state, locals, named_styles, assets, factory, request, budget, errors,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn render_for_loop<F: HostFactory>(
    for_loop: &ForLoop,
    ctx: &RenderCtx,
    state: &Json,
    locals: &Locals,
    named_styles: &BTreeMap<String, StyleObject>,
    assets: &BTreeMap<String, String>,
    factory: &F,
    request: &RenderRequest<'_, F>,
    budget: &mut RuntimeBudget,
    errors: &mut Vec<ValidationError>,
) -> Vec<F::Node> {
    let (Some(for_ident), Some(in_path), Some(template)) =
        (&for_loop.for_ident, &for_loop.in_path, &for_loop.template)
    else {
        return Vec::new();
    };

    let source = resolve_ref(&RefPath::new(in_path.as_str()), state, locals);
    let items = match source {
        None => return Vec::new(),
        Some(Json::Array(items)) => items,
        Some(_) => {
            errors.push(ValidationError::new(
                ErrorCode::RuntimeLoopSourceInvalid,
                format!("{in_path:?} does not resolve to an array"),
                &ctx.field("in"),
            ));
            return Vec::new();
        }
    };

    items
        .into_iter()
        .take(request.limits.loop_iterations)
        .enumerate()
        .filter_map(|(i, item)| {
            let item_locals = locals.push(for_ident.clone(), item, i);
            render_node(
                template,
                &ctx.loop_item(i),
                state,
                &item_locals,
                named_styles,
                assets,
                factory,
                request,
                budget,
                errors,
            )
        })
        .collect()
}

fn value_as_text(value: Option<&Json>) -> String {
    match value {
        Some(Json::String(s)) => s.clone(),
        Some(Json::Number(n)) => n.to_string(),
        Some(Json::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn format_thickness(value: Option<&Json>) -> String {
    match value {
        Some(Json::Number(n)) => format!("{n}px"),
        Some(Json::String(s)) => {
            let trimmed = s.trim();
            if trimmed.parse::<f64>().is_ok() {
                format!("{trimmed}px")
            } else {
                s.clone()
            }
        }
        _ => "1px".to_string(),
    }
}

fn resolve_src(value: &Option<Value>, state: &Json, locals: &Locals) -> Option<String> {
    let resolved = resolve_value(value.as_ref()?, state, locals)?;
    resolved.as_str().map(str::to_string)
}

fn resolve_asset_url(path: &str, assets: &BTreeMap<String, String>) -> Option<String> {
    if let Some(url) = assets.get(path) {
        return Some(url.clone());
    }
    let suffix = path.strip_prefix("@assets/")?;
    assets.get(suffix).cloned()
}

fn is_javascript_url(text: &str) -> bool {
    text.trim().to_ascii_lowercase().starts_with("javascript:")
}

fn render_image<F: HostFactory>(
    f: &ImageFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    assets: &BTreeMap<String, String>,
    factory: &F,
) -> Option<F::Node> {
    let path = resolve_src(&f.src, state, locals)?;
    if !is_valid_asset_path(&path) {
        return None;
    }
    let url = resolve_asset_url(&path, assets)?;
    if is_javascript_url(&url) {
        return None;
    }
    let alt = f.alt.as_ref().and_then(|v| resolve_value(v, state, locals));
    Some(factory.image(style.clone(), &url, alt.as_ref().and_then(Json::as_str)))
}

fn render_avatar<F: HostFactory>(
    f: &AvatarFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    assets: &BTreeMap<String, String>,
    factory: &F,
) -> Option<F::Node> {
    let resolved_url = resolve_src(&f.src, state, locals).and_then(|path| {
        if !is_valid_asset_path(&path) {
            return None;
        }
        let url = resolve_asset_url(&path, assets)?;
        if is_javascript_url(&url) {
            None
        } else {
            Some(url)
        }
    });

    let mut style = style.clone();
    if let Some(size) = f.size.as_ref().and_then(|v| resolve_value(v, state, locals)).and_then(|j| j.as_f64()) {
        style.properties.insert("size".to_string(), format!("{size}px"));
    }
    Some(factory.avatar(style, resolved_url.as_deref()))
}

fn render_icon<F: HostFactory>(f: &IconFields, style: &HostStyle, request: &RenderRequest<'_, F>, factory: &F) -> Option<F::Node> {
    let resolver = request.icon_resolver.as_ref()?;
    let name = f.name.as_ref()?.as_literal_str()?;
    let glyph = resolver(name)?;
    Some(factory.icon(style.clone(), glyph))
}

fn render_label<F: HostFactory>(
    f: &LabelFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    factory: &F,
    build: fn(&F, HostStyle, &str) -> F::Node,
) -> Option<F::Node> {
    let label = f.label.as_ref().and_then(|v| resolve_value(v, state, locals));
    Some(build(factory, style.clone(), &value_as_text(label.as_ref())))
}

fn render_divider<F: HostFactory>(f: &DividerFields, style: &HostStyle, state: &Json, locals: &Locals, factory: &F) -> Option<F::Node> {
    let thickness = f.thickness.as_ref().and_then(|v| resolve_value(v, state, locals));
    Some(factory.divider(style.clone(), &format_thickness(thickness.as_ref())))
}

fn render_progress_bar<F: HostFactory>(
    f: &ProgressBarFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    factory: &F,
) -> Option<F::Node> {
    let value = f
        .value
        .as_ref()
        .and_then(|v| resolve_value(v, state, locals))
        .and_then(|j| j.as_f64())
        .unwrap_or(0.0);
    let max = f
        .max
        .as_ref()
        .and_then(|v| resolve_value(v, state, locals))
        .and_then(|j| j.as_f64())
        .unwrap_or(100.0);
    let percent = if max == 0.0 { 0.0 } else { (value / max * 100.0).clamp(0.0, 100.0) };
    Some(factory.progress_bar(style.clone(), percent))
}

fn render_button<F: HostFactory>(
    f: &ButtonFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    request: &RenderRequest<'_, F>,
    factory: &F,
) -> Option<F::Node> {
    let label = f.label.as_ref().and_then(|v| resolve_value(v, state, locals));
    let action_id = f.action.as_ref().and_then(Value::as_literal_str).map(str::to_string);
    let on_action = request.on_action.clone();
    let on_click: Rc<dyn Fn()> = match (action_id, on_action) {
        (Some(action_id), Some(on_action)) => Rc::new(move || on_action(ActionKind::Button, &action_id, None)),
        _ => Rc::new(|| {}),
    };
    Some(factory.button(style.clone(), &value_as_text(label.as_ref()), on_click))
}

fn render_toggle<F: HostFactory>(
    f: &ToggleFields,
    style: &HostStyle,
    state: &Json,
    locals: &Locals,
    request: &RenderRequest<'_, F>,
    factory: &F,
) -> Option<F::Node> {
    let value = f
        .value
        .as_ref()
        .and_then(|v| resolve_value(v, state, locals))
        .and_then(|j| j.as_bool())
        .unwrap_or(false);
    let action_id = f.on_toggle.as_ref().and_then(Value::as_literal_str).map(str::to_string);
    let on_action = request.on_action.clone();
    let on_change: Rc<dyn Fn(bool)> = match (action_id, on_action) {
        (Some(action_id), Some(on_action)) => Rc::new(move |new_value: bool| {
            on_action(ActionKind::Toggle, &action_id, Some(serde_json::json!({"value": new_value})));
        }),
        _ => Rc::new(|_| {}),
    };
    Some(factory.toggle(style.clone(), value, on_change))
}
