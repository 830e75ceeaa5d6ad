//! Schema Pass (§4.2): the early structural gate. Operates directly on the
//! raw [`serde_json::Value`], not the already-parsed [`Card`]/[`Node`]
//! types — those parse permissively and would have already swallowed the
//! very defects this pass exists to report.

use serde_json::Value as Json;

use safeview_types::{NodeKind, PointerPath};

use crate::error::{ErrorCode, ValidationError, ValidationResult};

/// Runs the Schema Pass over a raw card document.
///
/// Checks the top-level shape first (object, `meta`, non-empty `views`); if
/// any of that fails, returns immediately without descending into the tree.
/// Otherwise walks every view checking that each node is an object with a
/// recognized `type` and not the legacy `{props: {...}}` shape.
#[must_use]
pub fn run(json: &Json) -> ValidationResult {
    let mut result = ValidationResult::default();

    let Some(map) = json.as_object() else {
        result.push(ValidationError::document(
            ErrorCode::SchemaError,
            "card document must be a JSON object",
        ));
        return result;
    };

    check_meta(map, &mut result);
    let views = check_views_present(map, &mut result);

    if !result.valid() {
        return result;
    }

    // `views` is guaranteed present and non-empty by `check_views_present`.
    let views = views.expect("views checked present above");
    for (name, node_json) in views {
        check_node(node_json, &PointerPath::root().field("views").field(name), &mut result);
    }

    result
}

fn check_meta(map: &serde_json::Map<String, Json>, result: &mut ValidationResult) {
    let meta_path = PointerPath::root().field("meta");
    let Some(meta) = map.get("meta").and_then(Json::as_object) else {
        result.push(ValidationError::new(
            ErrorCode::MissingField,
            "meta must be an object with name and version",
            &meta_path,
        ));
        return;
    };

    match meta.get("name").and_then(Json::as_str) {
        Some(name) if !name.is_empty() => {}
        Some(_) => result.push(ValidationError::new(
            ErrorCode::InvalidValue,
            "meta.name must be non-empty",
            &meta_path.field("name"),
        )),
        None => result.push(ValidationError::new(
            ErrorCode::MissingField,
            "meta.name is required",
            &meta_path.field("name"),
        )),
    }

    match meta.get("version").and_then(Json::as_str) {
        Some(version) if !version.is_empty() => {}
        Some(_) => result.push(ValidationError::new(
            ErrorCode::InvalidValue,
            "meta.version must be non-empty",
            &meta_path.field("version"),
        )),
        None => result.push(ValidationError::new(
            ErrorCode::MissingField,
            "meta.version is required",
            &meta_path.field("version"),
        )),
    }
}

fn check_views_present<'a>(
    map: &'a serde_json::Map<String, Json>,
    result: &mut ValidationResult,
) -> Option<&'a serde_json::Map<String, Json>> {
    let views_path = PointerPath::root().field("views");
    match map.get("views").and_then(Json::as_object) {
        Some(views) if !views.is_empty() => Some(views),
        Some(_) => {
            result.push(ValidationError::new(
                ErrorCode::MissingField,
                "views must contain at least one entry",
                &views_path,
            ));
            None
        }
        None => {
            result.push(ValidationError::new(
                ErrorCode::MissingField,
                "views is required and must be an object",
                &views_path,
            ));
            None
        }
    }
}

fn check_node(json: &Json, path: &PointerPath, result: &mut ValidationResult) {
    let Some(map) = json.as_object() else {
        result.push(ValidationError::new(
            ErrorCode::SchemaError,
            "node must be a JSON object",
            path,
        ));
        return;
    };

    if map.get("props").is_some_and(Json::is_object) {
        result.push(ValidationError::new(
            ErrorCode::SchemaError,
            "nested {props: {...}} node shape is not supported; use flat fields",
            path,
        ));
    }

    let Some(type_str) = map.get("type").and_then(Json::as_str) else {
        result.push(ValidationError::new(
            ErrorCode::SchemaError,
            "node is missing a \"type\" field",
            path,
        ));
        return;
    };

    let Some(kind) = NodeKind::from_type_str(type_str) else {
        result.push(ValidationError::new(
            ErrorCode::SchemaError,
            format!("unknown node type \"{type_str}\""),
            path,
        ));
        return;
    };

    if kind.is_layout() {
        if let Some(children_json) = map.get("children") {
            check_children(children_json, &path.field("children"), result);
        }
    }
}

fn check_children(json: &Json, path: &PointerPath, result: &mut ValidationResult) {
    match json {
        Json::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                check_node(item, &path.index(i), result);
            }
        }
        Json::Object(map) => {
            if let Some(template) = map.get("template") {
                check_node(template, &path.field("template"), result);
            }
        }
        _ => result.push(ValidationError::new(
            ErrorCode::SchemaError,
            "children must be an array of nodes or a {for, in, template} object",
            path,
        )),
    }
}
