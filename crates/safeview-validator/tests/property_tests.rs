//! Property-based coverage for the two places in the validator that parse
//! attacker-controlled strings by hand: the ref-path pollution-segment
//! guard and the expression tokenizer's forbidden-token detection. The
//! boundary table pins down specific edges; these search a wider input
//! space for the same invariants.

use proptest::prelude::*;
use safeview_types::{Card, RefPath};
use safeview_validator::{validate, ErrorCode, Limits};
use serde_json::json;

fn arb_segment_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9]{0,8}".prop_map(String::from)
}

fn arb_clean_path(segments: Vec<String>) -> String {
    format!("${}", segments.join("."))
}

proptest! {
    /// A ref path built entirely from segments that are never one of the
    /// three pollution names never trips the pollution guard.
    #[test]
    fn clean_ref_paths_never_flag_pollution(segments in proptest::collection::vec(arb_segment_name(), 1..5)) {
        let path = RefPath::new(arb_clean_path(segments));
        prop_assert!(!path.contains_pollution_segment());
    }

    /// Inserting a pollution segment anywhere in an otherwise well-formed
    /// path always trips the guard, regardless of position or how many
    /// other segments surround it.
    #[test]
    fn a_pollution_segment_anywhere_is_always_caught(
        before in proptest::collection::vec(arb_segment_name(), 0..3),
        after in proptest::collection::vec(arb_segment_name(), 0..3),
        pollution_index in 0usize..3,
    ) {
        let pollution = ["__proto__", "constructor", "prototype"][pollution_index];
        let mut segments = before;
        segments.push(pollution.to_string());
        segments.extend(after);
        let path = RefPath::new(arb_clean_path(segments));
        prop_assert!(path.contains_pollution_segment());
    }

    /// A card whose state-ref path contains a pollution segment is always
    /// rejected end to end by the Security Pass, not just by the ref-path
    /// parser in isolation.
    #[test]
    fn cards_referencing_a_pollution_segment_always_fail_validation(
        pollution_index in 0usize..3,
        tail in arb_segment_name(),
    ) {
        let pollution = ["__proto__", "constructor", "prototype"][pollution_index];
        let path = format!("${pollution}.{tail}");
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": {"$ref": path}}}
        }))
        .unwrap();
        let result = validate(&card, &Limits::default());
        prop_assert!(result.has_code(ErrorCode::PrototypePollution));
    }

    /// An expression built from only digits, `$`-prefixed identifier
    /// chains, and the four arithmetic operators never trips forbidden-
    /// token detection — the tokenizer's allowlist is supposed to admit
    /// exactly this grammar.
    #[test]
    fn arithmetic_only_expressions_never_trip_forbidden_token(
        a in 0u32..1000,
        b in 0u32..1000,
        ident in arb_segment_name(),
    ) {
        let expr = format!("${ident} + {a} - {b}");
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": {"$expr": expr}}}
        }))
        .unwrap();
        let result = validate(&card, &Limits::default());
        prop_assert!(!result.has_code(ErrorCode::ExprForbiddenToken));
    }

    /// Any of the reserved JS-ish keywords appearing as a bare word in an
    /// expression is always caught, no matter what arithmetic surrounds it.
    #[test]
    fn forbidden_keywords_are_always_caught_regardless_of_surrounding_arithmetic(
        keyword_index in 0usize..9,
        a in 0u32..100,
    ) {
        let keyword = [
            "typeof", "instanceof", "new", "delete", "function", "return", "var", "let", "const",
        ][keyword_index];
        let expr = format!("{a} + {keyword} $x");
        let card = Card::from_json(&json!({
            "meta": {"name": "a", "version": "1"},
            "views": {"Main": {"type": "Text", "content": {"$expr": expr}}}
        }))
        .unwrap();
        let result = validate(&card, &Limits::default());
        prop_assert!(result.has_code(ErrorCode::ExprForbiddenToken));
    }
}
