//! Value Resolver with Scoped Locals (§4.11): resolves a value against
//! `(state, locals)`, re-applying the pollution-segment and depth guards
//! at render time as a second, independent check (§9) — the security
//! pass already rejects these statically, but a render should never
//! trust that every card it sees has passed validation first.

use safeview_types::{RefPath, Segment, Value};
use serde_json::Value as Json;

use crate::scope::Locals;

const MAX_REF_SEGMENT_DEPTH: usize = safeview_validator::limits::expr::MAX_REF_SEGMENT_DEPTH;

/// Resolves a `$ref` path against `(state, locals)`.
///
/// The first segment is looked up in `locals` first; every other pass in
/// this crate resolves only against `state`, so a ref whose first segment
/// names a loop variable shadows any same-named top-level state field —
/// matching the `for` binding's scoping rule, not state's.
#[must_use]
pub fn resolve_ref(path: &RefPath, state: &Json, locals: &Locals) -> Option<Json> {
    if path.contains_pollution_segment() {
        return None;
    }
    let segments = path.segments()?;
    if segments.is_empty() || segments.len() > MAX_REF_SEGMENT_DEPTH {
        return None;
    }

    let mut iter = segments.into_iter();
    let first = iter.next()?;
    let mut current = match &first {
        Segment::Name(name) => match locals.get(name) {
            Some(v) => v.clone(),
            None => state.as_object()?.get(name)?.clone(),
        },
        Segment::Index(idx) => state.as_array()?.get(*idx)?.clone(),
    };

    for segment in iter {
        current = match segment {
            Segment::Name(name) => current.as_object()?.get(&name)?.clone(),
            Segment::Index(idx) => current.as_array()?.get(idx)?.clone(),
        };
    }
    Some(current)
}

/// Dispatches a [`Value`] to its resolved JSON, per §4.11: a literal
/// resolves to itself, a ref resolves via [`resolve_ref`], and an
/// expression never resolves — no evaluator exists in this renderer.
#[must_use]
pub fn resolve_value(value: &Value, state: &Json, locals: &Locals) -> Option<Json> {
    match value {
        Value::Literal(json) => Some(json.clone()),
        Value::Ref(path) => resolve_ref(path, state, locals),
        Value::Expr(_) => None,
    }
}
