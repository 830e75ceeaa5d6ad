//! Style Pass (§4.5): forbidden properties, numeric ranges, color/length
//! literal validation, and forbidden CSS function token scanning.

use once_cell::sync::Lazy;
use regex::Regex;
use safeview_types::{
    accepts_auto_length, Card, Node, PointerPath, StyleObject, Value, COLOR_PROPERTIES,
    FORBIDDEN_STYLE_PROPERTIES, LENGTH_PROPERTIES,
};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::walk::{walk_card, VisitResult, Visitor};

const FORBIDDEN_CSS_FUNCTIONS: &[&str] =
    &["calc(", "var(", "url(", "env(", "expression("];

static COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        ^(
            \#[0-9a-f]{3}
            | \#[0-9a-f]{6}
            | \#[0-9a-f]{8}
            | (rgb|rgba|hsl|hsla)\([^)]*\)
            | transparent
            | currentcolor
            | [a-z]+
        )$",
    )
    .expect("static color regex is valid")
});

static LENGTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?(px|%|em|rem)?$").expect("static length regex is valid"));

static NUMERIC_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?").expect("static numeric-prefix regex is valid"));

/// Pulls the leading numeric portion out of a string like `"16px"` or
/// `"-10"`, for the properties whose range is checked whether authored as
/// a bare number or a unit-bearing string (§4.5).
fn parse_numeric_prefix(text: &str) -> Option<f64> {
    NUMERIC_PREFIX_RE.find(text.trim())?.as_str().parse().ok()
}

/// A property's literal value as an f64, accepting either a JSON number or
/// a numeric-prefixed string.
fn numeric_literal(value: &Value) -> Option<f64> {
    value
        .as_literal_f64()
        .or_else(|| value.as_literal_str().and_then(parse_numeric_prefix))
}

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = StylePass::default();
    for (name, style) in &card.styles {
        pass.check(style, &PointerPath::root().field("styles").field(name));
    }
    walk_card(card, &mut pass);
    pass.result
}

#[derive(Default)]
struct StylePass {
    result: ValidationResult,
}

impl StylePass {
    fn check(&mut self, style: &StyleObject, path: &PointerPath) {
        for (property, value) in &style.props {
            let prop_path = path.field(property);

            if FORBIDDEN_STYLE_PROPERTIES.contains(&property.as_str()) {
                self.result.push(ValidationError::new(
                    ErrorCode::ForbiddenStyleProperty,
                    format!("{property} is not permitted in a style object"),
                    &prop_path,
                ));
            }

            if let Some(json) = value.as_literal() {
                self.scan_forbidden_functions(json, &prop_path);
            }

            self.check_range(property, value, &prop_path);

            if COLOR_PROPERTIES.contains(&property.as_str())
                || property == "borderColor"
                || property.ends_with("Color")
            {
                if let Some(text) = value.as_literal_str() {
                    self.check_color_literal(text, &prop_path);
                }
            } else if LENGTH_PROPERTIES.contains(&property.as_str()) {
                if let Some(text) = value.as_literal_str() {
                    let ok = (text == "auto" && accepts_auto_length(property))
                        || LENGTH_RE.is_match(text.trim());
                    if !ok {
                        self.result.push(ValidationError::new(
                            ErrorCode::InvalidLength,
                            format!("{text:?} is not a valid length"),
                            &prop_path,
                        ));
                    }
                }
            }

            if property == "overflow" {
                if let Some(text) = value.as_literal_str() {
                    if !matches!(text, "visible" | "hidden" | "auto") {
                        self.result.push(ValidationError::new(
                            ErrorCode::ForbiddenOverflowValue,
                            format!("overflow: {text:?} is not permitted"),
                            &prop_path,
                        ));
                    }
                }
            }

            if property == "transform" {
                self.check_transform(value, &prop_path);
            }

            if property == "boxShadow" {
                self.check_box_shadow(value, &prop_path);
            }

            if matches!(
                property.as_str(),
                "border" | "borderTop" | "borderRight" | "borderBottom" | "borderLeft"
            ) {
                self.check_border_color(value, &prop_path);
            }

            if property == "backgroundGradient" {
                self.check_gradient_colors(value, &prop_path);
            }
        }
    }

    /// §4.5's color-format check, factored out so it can be applied both
    /// at a property's own value and at colors nested inside structured
    /// properties (`border*.color`, `backgroundGradient.stops[].color`,
    /// `boxShadow[].color`).
    fn check_color_literal(&mut self, text: &str, path: &PointerPath) {
        if !COLOR_RE.is_match(text.trim()) {
            self.result.push(ValidationError::new(
                ErrorCode::InvalidColor,
                format!("{text:?} is not a valid color"),
                path,
            ));
        }
    }

    /// `border`/`border{Top,Right,Bottom,Left}` are structured objects
    /// carrying their own `color` field (§4.5's "nested border color").
    fn check_border_color(&mut self, value: &Value, path: &PointerPath) {
        let Some(obj) = value.as_literal().and_then(serde_json::Value::as_object) else {
            return;
        };
        if let Some(color) = obj.get("color").and_then(serde_json::Value::as_str) {
            self.check_color_literal(color, &path.field("color"));
        }
    }

    /// `backgroundGradient.stops[].color` (§4.5's "gradient stop color").
    fn check_gradient_colors(&mut self, value: &Value, path: &PointerPath) {
        let Some(obj) = value.as_literal().and_then(serde_json::Value::as_object) else {
            return;
        };
        let Some(stops) = obj.get("stops").and_then(serde_json::Value::as_array) else {
            return;
        };
        let stops_path = path.field("stops");
        for (i, stop) in stops.iter().enumerate() {
            let Some(stop) = stop.as_object() else {
                continue;
            };
            if let Some(color) = stop.get("color").and_then(serde_json::Value::as_str) {
                self.check_color_literal(color, &stops_path.index(i).field("color"));
            }
        }
    }

    /// `transform` is a structured object with optional `scale`,
    /// `translateX`/`translateY`, and (forbidden) `skew*` keys, or a raw
    /// CSS-like string an author wrote directly — either shape is scanned.
    fn check_transform(&mut self, value: &Value, path: &PointerPath) {
        if let Some(text) = value.as_literal_str() {
            if text.contains("skew") {
                self.result.push(ValidationError::new(
                    ErrorCode::TransformSkewForbidden,
                    "transform: skew is not permitted",
                    path,
                ));
            }
            return;
        }
        let Some(obj) = value.as_literal().and_then(serde_json::Value::as_object) else {
            return;
        };
        if obj.keys().any(|k| k.starts_with("skew")) {
            self.result.push(ValidationError::new(
                ErrorCode::TransformSkewForbidden,
                "transform: skew is not permitted",
                path,
            ));
        }
        if let Some(scale) = obj.get("scale").and_then(serde_json::Value::as_f64) {
            if !(0.1..=1.5).contains(&scale) {
                self.result.push(ValidationError::new(
                    ErrorCode::StyleValueOutOfRange,
                    format!("transform.scale: {scale} is out of range"),
                    &path.field("scale"),
                ));
            }
        }
        for axis in ["translateX", "translateY"] {
            if let Some(n) = obj.get(axis).and_then(serde_json::Value::as_f64) {
                if !(-500.0..=500.0).contains(&n) {
                    self.result.push(ValidationError::new(
                        ErrorCode::StyleValueOutOfRange,
                        format!("transform.{axis}: {n} is out of range"),
                        &path.field(axis),
                    ));
                }
            }
        }
    }

    /// `boxShadow` is an array of `{offsetX, offsetY, blur, spread, color}`
    /// entries: at most 5, each with `blur ≤ 100` and `spread ≤ 50`.
    fn check_box_shadow(&mut self, value: &Value, path: &PointerPath) {
        let Some(entries) = value.as_literal().and_then(serde_json::Value::as_array) else {
            return;
        };
        if entries.len() > 5 {
            self.result.push(ValidationError::new(
                ErrorCode::StyleValueOutOfRange,
                format!("boxShadow has {} entries, at most 5 are allowed", entries.len()),
                path,
            ));
        }
        for (i, entry) in entries.iter().enumerate() {
            let Some(entry) = entry.as_object() else {
                continue;
            };
            let entry_path = path.index(i);
            if let Some(blur) = entry.get("blur").and_then(serde_json::Value::as_f64) {
                if blur > 100.0 {
                    self.result.push(ValidationError::new(
                        ErrorCode::StyleValueOutOfRange,
                        format!("boxShadow.blur: {blur} exceeds 100"),
                        &entry_path.field("blur"),
                    ));
                }
            }
            if let Some(spread) = entry.get("spread").and_then(serde_json::Value::as_f64) {
                if spread > 50.0 {
                    self.result.push(ValidationError::new(
                        ErrorCode::StyleValueOutOfRange,
                        format!("boxShadow.spread: {spread} exceeds 50"),
                        &entry_path.field("spread"),
                    ));
                }
            }
            if let Some(color) = entry.get("color").and_then(serde_json::Value::as_str) {
                self.check_color_literal(color, &entry_path.field("color"));
            }
        }
    }

    /// Scans every string value in `json` for a forbidden CSS function
    /// token (§4.5) — recursively, so a function hidden inside a
    /// structured property like `border.color` or
    /// `backgroundGradient.stops[].color` is caught the same as a
    /// top-level string value.
    fn scan_forbidden_functions(&mut self, json: &serde_json::Value, path: &PointerPath) {
        match json {
            serde_json::Value::String(text) => {
                let lower = text.to_ascii_lowercase();
                for function in FORBIDDEN_CSS_FUNCTIONS {
                    if lower.contains(function) {
                        self.result.push(ValidationError::new(
                            ErrorCode::ForbiddenCssFunction,
                            format!("{function} is not permitted in a style value"),
                            path,
                        ));
                    }
                }
            }
            serde_json::Value::Object(map) => {
                for (key, nested) in map {
                    self.scan_forbidden_functions(nested, &path.field(key));
                }
            }
            serde_json::Value::Array(items) => {
                for (i, nested) in items.iter().enumerate() {
                    self.scan_forbidden_functions(nested, &path.index(i));
                }
            }
            _ => {}
        }
    }

    fn check_range(&mut self, property: &str, value: &Value, path: &PointerPath) {
        // zIndex/opacity are checked only when authored as a bare JSON
        // number; fontSize/letterSpacing/borderRadius also accept a
        // unit-bearing string (§4.5).
        let (n, applies) = match property {
            "zIndex" | "opacity" => (value.as_literal_f64(), true),
            "fontSize" | "letterSpacing" | "borderRadius" => (numeric_literal(value), true),
            _ => (None, false),
        };
        if !applies {
            return;
        }
        let Some(n) = n else {
            return;
        };
        let out_of_range = match property {
            "zIndex" => !(0.0..=100.0).contains(&n),
            "opacity" => !(0.0..=1.0).contains(&n),
            "fontSize" => !(8.0..=72.0).contains(&n),
            "letterSpacing" => !(-10.0..=50.0).contains(&n),
            "borderRadius" => !(0.0..=9999.0).contains(&n),
            _ => false,
        };
        if out_of_range {
            self.result.push(ValidationError::new(
                ErrorCode::StyleValueOutOfRange,
                format!("{property}: {n} is out of range"),
                path,
            ));
        }
    }
}

impl Visitor for StylePass {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        if let Some(style) = &node.common().style {
            self.check(style, &ctx.path.field("style"));
        }
        VisitResult::Continue
    }
}
