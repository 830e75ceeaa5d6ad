//! # safeview-validator
//!
//! The multi-pass static analyzer (§2, §4): a card document is size-gated,
//! parsed as JSON, checked by the Schema Pass against the raw JSON (before
//! the permissive typed parse can swallow the very defects that pass has
//! to report), and — once a typed [`Card`] exists — walked by every
//! remaining pass, each accumulating [`ValidationError`]s into one
//! [`ValidationResult`].
//!
//! Passes never short-circuit each other (a bad `$ref` in one node doesn't
//! stop the next node's style from being checked) except for the Schema
//! Pass itself, which returns early: nothing downstream can be trusted to
//! walk a tree whose shape is this broken.

mod context;
pub mod error;
pub mod limits;
mod merge;
pub mod passes;
mod walk;

use safeview_foundation::FoundationError;
use safeview_types::Card;

pub use error::{ErrorCode, ValidationError, ValidationResult};
pub use limits::{Limits, LimitsBuilder};

/// Validates an already-parsed card document against every pass (§4.3-§4.8).
///
/// Unlike [`validate_raw`], this never fails outright — a [`Card`] always
/// parsed successfully from *some* JSON shape, so there's nothing left to
/// gate on.
#[must_use]
pub fn validate(card: &Card, limits: &Limits) -> ValidationResult {
    let mut result = ValidationResult::default();
    result.extend(passes::node::run(card).errors);
    result.extend(passes::value_type::run(card).errors);
    result.extend(passes::style::run(card).errors);
    result.extend(passes::style_ref::run(card).errors);
    result.extend(passes::security::run(card).errors);
    result.extend(passes::resource_limits::run(card, limits).errors);
    result.extend(passes::expression::run(card).errors);
    result
}

/// Validates a raw JSON document, short-circuiting after the Schema Pass
/// if the document's shape is too broken for the remaining passes to walk
/// meaningfully.
#[must_use]
pub fn validate_json(json: &serde_json::Value, limits: &Limits) -> ValidationResult {
    let schema_result = passes::schema::run(json);
    if !schema_result.valid() {
        return schema_result;
    }
    // The Schema Pass having passed means `Card::from_json` parsing the
    // same document can only fail if it isn't a JSON object at all, which
    // the Schema Pass already checked.
    let Some(card) = Card::from_json(json) else {
        return schema_result;
    };
    validate(&card, limits)
}

/// Size-gates, parses, and validates raw request bytes (§2's full data
/// flow): the one entry point a host embedding safeview actually calls.
///
/// # Errors
///
/// Returns [`FoundationError::InputTooLarge`] if `bytes` exceeds
/// `limits.card_bytes` before JSON parsing is even attempted, or
/// [`FoundationError::InvalidJson`] if the bytes don't parse as JSON at
/// all. Once bytes are valid JSON, every further defect — however
/// severe — is reported as an accumulated [`ValidationError`], not a
/// [`FoundationError`]: a malformed UGC document is an expected outcome,
/// not a failure of the host program.
pub fn validate_raw(bytes: &[u8], limits: &Limits) -> Result<ValidationResult, FoundationError> {
    if bytes.len() > limits.card_bytes {
        return Err(FoundationError::input_too_large(bytes.len(), limits.card_bytes));
    }
    let json: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| FoundationError::invalid_json(e.to_string()))?;
    Ok(validate_json(&json, limits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn end_to_end_valid_card_has_no_errors() {
        let card = Card::from_json(&json!({
            "meta": {"name": "demo", "version": "1"},
            "views": {"Main": {"type": "Text", "content": "hello"}}
        }))
        .unwrap();
        assert!(validate(&card, &Limits::default()).valid());
    }

    #[test]
    fn validate_raw_rejects_oversized_input() {
        let limits = Limits::builder().card_bytes(10).build();
        let err = validate_raw(b"{\"meta\":{}}", &limits).unwrap_err();
        assert!(matches!(err, FoundationError::InputTooLarge { .. }));
    }

    #[test]
    fn validate_raw_reports_invalid_json() {
        let err = validate_raw(b"not json", &Limits::default()).unwrap_err();
        assert!(matches!(err, FoundationError::InvalidJson { .. }));
    }

    #[test]
    fn validate_json_short_circuits_on_schema_failure() {
        let result = validate_json(&json!("not an object"), &Limits::default());
        assert!(!result.valid());
        assert!(result.has_code(ErrorCode::SchemaError));
    }

    #[test]
    fn validate_json_runs_every_remaining_pass_on_a_valid_shape() {
        let result = validate_json(
            &json!({
                "meta": {"name": "demo", "version": "1"},
                "views": {"Main": {"type": "Image", "src": {"$expr": "\"x\""}}}
            }),
            &Limits::default(),
        );
        // Caught by the Value-Type Pass, which only runs once the Schema
        // Pass has already accepted the document's shape.
        assert!(result.has_code(ErrorCode::ExprNotAllowed));
    }
}
