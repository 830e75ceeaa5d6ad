//! Style-Ref Pass: checks every `$style` pointer — both a named entry's own
//! base and a node's inline `$style` — for a well-formed name, a resolvable
//! target, and no cycle. Named-style resolution (`$style` chains, not
//! individual node overrides) is shared with the Style/Security/Limits
//! passes via [`crate::merge`]; this pass is the one that actually reports
//! what those passes silently fall back on.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use safeview_types::{Card, Node, PointerPath, StyleObject};

use crate::context::Context;
use crate::error::{ErrorCode, ValidationError, ValidationResult};
use crate::merge::{resolve_named, MergeError};
use crate::walk::{walk_card, VisitResult, Visitor};

static STYLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static style-name regex is valid"));

#[must_use]
fn is_valid_style_name(name: &str) -> bool {
    STYLE_NAME_RE.is_match(name)
}

#[must_use]
pub fn run(card: &Card) -> ValidationResult {
    let mut pass = StyleRefPass {
        card,
        result: ValidationResult::default(),
        reported_cycles: HashSet::new(),
    };

    for (name, style) in &card.styles {
        let path = PointerPath::root().field("styles").field(name);
        if !is_valid_style_name(name) {
            pass.result.push(ValidationError::new(
                ErrorCode::InvalidStyleName,
                format!("{name:?} is not a valid style name"),
                &path,
            ));
        }
        pass.check_base(style, &path);
    }

    walk_card(card, &mut pass);
    pass.result
}

struct StyleRefPass<'a> {
    card: &'a Card,
    result: ValidationResult,
    /// One canonical member per already-reported cycle, so a 3-style cycle
    /// doesn't produce three identical `STYLE_CIRCULAR_REF` errors.
    reported_cycles: HashSet<String>,
}

impl StyleRefPass<'_> {
    fn check_base(&mut self, style: &StyleObject, path: &PointerPath) {
        let Some(base_name) = &style.base else {
            return;
        };
        let base_path = path.field("$style");

        if !is_valid_style_name(base_name) {
            self.result.push(ValidationError::new(
                ErrorCode::InvalidStyleName,
                format!("{base_name:?} is not a valid style name"),
                &base_path,
            ));
            return;
        }

        match resolve_named(base_name, &self.card.styles, &mut Vec::new()) {
            Ok(_) => {}
            Err(MergeError::NotFound(name)) => self.result.push(ValidationError::new(
                ErrorCode::StyleRefNotFound,
                format!("style {name:?} is not defined"),
                &base_path,
            )),
            Err(MergeError::Circular(chain)) => {
                let canonical = chain.iter().min().cloned().unwrap_or_default();
                if self.reported_cycles.insert(canonical) {
                    self.result.push(ValidationError::new(
                        ErrorCode::StyleCircularRef,
                        format!("circular $style chain: {}", chain.join(" -> ")),
                        &base_path,
                    ));
                }
            }
        }
    }
}

impl Visitor for StyleRefPass<'_> {
    fn visit(&mut self, node: &Node, ctx: &Context) -> VisitResult {
        if let Some(style) = &node.common().style {
            self.check_base(style, &ctx.path.field("style"));
        }
        VisitResult::Continue
    }
}
