//! Resolving a node's "merged style" (Glossary): base-from-`$style` ∪
//! inline overrides. Shared by the Style, Security, and Resource-Limits
//! passes so cycle/lookup handling lives in exactly one place.

use std::collections::BTreeMap;

use safeview_types::StyleObject;

/// Why a `$style` chain could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    NotFound(String),
    /// The chain of names visited before the cycle was detected.
    Circular(Vec<String>),
}

/// Resolves a named entry in the card's `styles` table, following its own
/// `$style` chain (a named style may itself have a base) and failing on a
/// cycle or a dangling name.
pub fn resolve_named(
    name: &str,
    named: &BTreeMap<String, StyleObject>,
    seen: &mut Vec<String>,
) -> Result<StyleObject, MergeError> {
    if seen.iter().any(|s| s == name) {
        seen.push(name.to_string());
        return Err(MergeError::Circular(seen.clone()));
    }
    seen.push(name.to_string());
    let style = named
        .get(name)
        .ok_or_else(|| MergeError::NotFound(name.to_string()))?;
    match &style.base {
        Some(base_name) => {
            let base = resolve_named(base_name, named, seen)?;
            Ok(style.merge_over(&base))
        }
        None => Ok(style.clone()),
    }
}

/// Resolves `style`'s own `$style` base (if any) against `named`, returning
/// the merged result. `None` in, `None` out.
pub fn merged_style(
    style: Option<&StyleObject>,
    named: &BTreeMap<String, StyleObject>,
) -> Result<Option<StyleObject>, MergeError> {
    let Some(style) = style else {
        return Ok(None);
    };
    match &style.base {
        Some(base_name) => {
            let mut seen = Vec::new();
            let base = resolve_named(base_name, named, &mut seen)?;
            Ok(Some(style.merge_over(&base)))
        }
        None => Ok(Some(style.clone())),
    }
}

/// [`merged_style`], falling back to the style's own inline props when the
/// base can't be resolved — the dangling/circular reference itself is
/// reported once by the style-ref pass; downstream passes just need
/// *something* to check rather than re-reporting the same defect.
#[must_use]
pub fn merged_style_or_inline(
    style: Option<&StyleObject>,
    named: &BTreeMap<String, StyleObject>,
) -> Option<StyleObject> {
    match merged_style(style, named) {
        Ok(merged) => merged,
        Err(_) => style.cloned(),
    }
}
