//! Style Resolver / Mapper (§4.10): translates a validated [`StyleObject`]
//! into the flat property→string map a host toolkit consumes, resolving
//! `$ref`/`$expr` values and lowering a handful of structured properties
//! to their CSS shorthand.

use std::collections::BTreeMap;

use safeview_types::{StyleObject, Value};
use serde_json::Value as Json;

use crate::resolver::resolve_value;
use crate::scope::Locals;

/// Flexbox alignment properties whose `start`/`end` values translate to
/// `flex-start`/`flex-end` (§4.10).
const FLEX_ALIGN_PROPERTIES: &[&str] = &["justifyContent", "alignItems", "alignSelf", "alignContent"];

const STRUCTURED_PROPERTIES: &[&str] = &[
    "transform",
    "boxShadow",
    "backgroundGradient",
    "border",
    "borderTop",
    "borderRight",
    "borderBottom",
    "borderLeft",
];

/// A resolved style, ready for a [`crate::host::HostFactory`] to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStyle {
    pub properties: BTreeMap<String, String>,
}

impl HostStyle {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[must_use]
pub fn resolve_style(style: &StyleObject, state: &Json, locals: &Locals) -> HostStyle {
    let mut out = HostStyle::default();
    for (property, value) in &style.props {
        if STRUCTURED_PROPERTIES.contains(&property.as_str()) {
            if let Some(rendered) = render_structured(property, value, state, locals) {
                out.properties.insert(property.clone(), rendered);
            }
            continue;
        }
        let Some(resolved) = resolve_value(value, state, locals) else {
            continue;
        };
        let Some(text) = scalar_to_css(&resolved) else {
            continue;
        };
        let text = if FLEX_ALIGN_PROPERTIES.contains(&property.as_str()) {
            translate_flex_align(&text)
        } else {
            text
        };
        out.properties.insert(property.clone(), text);
    }
    out
}

fn translate_flex_align(value: &str) -> String {
    match value {
        "start" => "flex-start".to_string(),
        "end" => "flex-end".to_string(),
        other => other.to_string(),
    }
}

fn scalar_to_css(value: &Json) -> Option<String> {
    match value {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn render_structured(property: &str, value: &Value, state: &Json, locals: &Locals) -> Option<String> {
    match property {
        "transform" => render_transform(value, state, locals),
        "boxShadow" => render_box_shadow(value, state, locals),
        "backgroundGradient" => render_gradient(value, state, locals),
        "border" | "borderTop" | "borderRight" | "borderBottom" | "borderLeft" => {
            render_border_shorthand(value, state, locals)
        }
        _ => None,
    }
}

fn render_transform(value: &Value, state: &Json, locals: &Locals) -> Option<String> {
    let resolved = resolve_value(value, state, locals)?;
    if let Json::String(s) = &resolved {
        return Some(s.clone());
    }
    let obj = resolved.as_object()?;
    let mut functions = Vec::new();
    if let Some(scale) = obj.get("scale").and_then(Json::as_f64) {
        functions.push(format!("scale({scale})"));
    }
    if let Some(x) = obj.get("translateX").and_then(Json::as_f64) {
        functions.push(format!("translateX({x}px)"));
    }
    if let Some(y) = obj.get("translateY").and_then(Json::as_f64) {
        functions.push(format!("translateY({y}px)"));
    }
    if functions.is_empty() {
        None
    } else {
        Some(functions.join(" "))
    }
}

fn render_box_shadow(value: &Value, state: &Json, locals: &Locals) -> Option<String> {
    let resolved = resolve_value(value, state, locals)?;
    let entries = resolved.as_array()?;
    let shadows: Vec<String> = entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            let ox = entry.get("offsetX").and_then(Json::as_f64).unwrap_or(0.0);
            let oy = entry.get("offsetY").and_then(Json::as_f64).unwrap_or(0.0);
            let blur = entry.get("blur").and_then(Json::as_f64).unwrap_or(0.0);
            let spread = entry.get("spread").and_then(Json::as_f64).unwrap_or(0.0);
            let color = entry.get("color").and_then(Json::as_str).unwrap_or("currentcolor");
            Some(format!("{ox}px {oy}px {blur}px {spread}px {color}"))
        })
        .collect();
    if shadows.is_empty() {
        None
    } else {
        Some(shadows.join(", "))
    }
}

fn render_gradient(value: &Value, state: &Json, locals: &Locals) -> Option<String> {
    let resolved = resolve_value(value, state, locals)?;
    let obj = resolved.as_object()?;
    let stops_json = obj.get("stops").and_then(Json::as_array)?;
    let stops: Vec<String> = stops_json
        .iter()
        .filter_map(|stop| {
            let stop = stop.as_object()?;
            let color = stop.get("color").and_then(Json::as_str)?;
            Some(match stop.get("position").and_then(Json::as_str) {
                Some(position) => format!("{color} {position}"),
                None => color.to_string(),
            })
        })
        .collect();
    if stops.is_empty() {
        return None;
    }
    let is_radial = obj.get("kind").and_then(Json::as_str) == Some("radial");
    if is_radial {
        Some(format!("radial-gradient(circle, {})", stops.join(", ")))
    } else {
        let direction = obj.get("direction").and_then(Json::as_str).unwrap_or("to bottom");
        Some(format!("linear-gradient({direction}, {})", stops.join(", ")))
    }
}

fn render_border_shorthand(value: &Value, state: &Json, locals: &Locals) -> Option<String> {
    let resolved = resolve_value(value, state, locals)?;
    if let Json::String(s) = &resolved {
        return Some(s.clone());
    }
    let obj = resolved.as_object()?;
    let width = obj.get("width").and_then(Json::as_f64).unwrap_or(1.0);
    let style = obj.get("style").and_then(Json::as_str).unwrap_or("solid");
    let color = obj.get("color").and_then(Json::as_str).unwrap_or("currentcolor");
    Some(format!("{width}px {style} {color}"))
}
