//! Aggregate resource limits (§4.7) as an overridable, constructible
//! config object. The field values below are the spec's defaults; a host
//! builds a [`Limits`] once (via [`Limits::builder`]) and passes it to
//! [`crate::validate`] / [`crate::validate_raw`] and to the renderer's
//! `RuntimeBudget`, so both sides of a render agree on the same numbers.

/// Per-card resource limits. Every field defaults to the §4.7 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub card_bytes: usize,
    pub text_content_bytes: usize,
    pub style_bytes: usize,
    pub node_count: usize,
    pub loop_iterations: usize,
    pub nested_loop_depth: usize,
    pub overflow_auto_count: usize,
    pub stack_nesting_depth: usize,
    pub single_asset_bytes: usize,
    pub total_asset_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            card_bytes: 1_000_000,
            text_content_bytes: 200_000,
            style_bytes: 100_000,
            node_count: 10_000,
            loop_iterations: 1_000,
            nested_loop_depth: 2,
            overflow_auto_count: 2,
            stack_nesting_depth: 3,
            single_asset_bytes: 5_000_000,
            total_asset_bytes: 50_000_000,
        }
    }
}

impl Limits {
    /// Starts building a [`Limits`] from the spec defaults.
    #[must_use]
    pub fn builder() -> LimitsBuilder {
        LimitsBuilder(Limits::default())
    }
}

/// Builder for [`Limits`], following the workspace's builder-method
/// convention: each setter takes and returns `Self` by value.
#[derive(Debug, Clone, Copy)]
pub struct LimitsBuilder(Limits);

impl LimitsBuilder {
    #[must_use]
    pub const fn card_bytes(mut self, v: usize) -> Self {
        self.0.card_bytes = v;
        self
    }

    #[must_use]
    pub const fn text_content_bytes(mut self, v: usize) -> Self {
        self.0.text_content_bytes = v;
        self
    }

    #[must_use]
    pub const fn style_bytes(mut self, v: usize) -> Self {
        self.0.style_bytes = v;
        self
    }

    #[must_use]
    pub const fn node_count(mut self, v: usize) -> Self {
        self.0.node_count = v;
        self
    }

    #[must_use]
    pub const fn loop_iterations(mut self, v: usize) -> Self {
        self.0.loop_iterations = v;
        self
    }

    #[must_use]
    pub const fn nested_loop_depth(mut self, v: usize) -> Self {
        self.0.nested_loop_depth = v;
        self
    }

    #[must_use]
    pub const fn overflow_auto_count(mut self, v: usize) -> Self {
        self.0.overflow_auto_count = v;
        self
    }

    #[must_use]
    pub const fn stack_nesting_depth(mut self, v: usize) -> Self {
        self.0.stack_nesting_depth = v;
        self
    }

    #[must_use]
    pub const fn single_asset_bytes(mut self, v: usize) -> Self {
        self.0.single_asset_bytes = v;
        self
    }

    #[must_use]
    pub const fn total_asset_bytes(mut self, v: usize) -> Self {
        self.0.total_asset_bytes = v;
        self
    }

    #[must_use]
    pub const fn build(self) -> Limits {
        self.0
    }
}

/// Limits on the expression/ref-path grammar (§4.8). These are not part of
/// the overridable [`Limits`] struct — they describe the fixed structural
/// contract of the expression language itself, not a per-deployment
/// resource budget.
pub mod expr {
    pub const MAX_REF_PATH_LEN: usize = 500;
    pub const MAX_REF_SEGMENT_DEPTH: usize = 5;
    pub const MAX_BRACKET_INDEX: usize = 9999;

    pub const MAX_EXPR_LEN: usize = 500;
    pub const MAX_EXPR_TOKENS: usize = 50;
    pub const MAX_STRING_LITERAL_LEN: usize = 1000;
    pub const MAX_PAREN_DEPTH: usize = 10;
    pub const MAX_IF_COUNT: usize = 3;
    pub const MAX_VAR_CHAIN_DEPTH: usize = 5;
    pub const MAX_FRACTIONAL_DIGITS: usize = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_spec_table() {
        let limits = Limits::default();
        assert_eq!(limits.card_bytes, 1_000_000);
        assert_eq!(limits.node_count, 10_000);
        assert_eq!(limits.loop_iterations, 1_000);
        assert_eq!(limits.nested_loop_depth, 2);
        assert_eq!(limits.overflow_auto_count, 2);
        assert_eq!(limits.stack_nesting_depth, 3);
    }

    #[test]
    fn builder_overrides_individual_fields() {
        let limits = Limits::builder().node_count(5).build();
        assert_eq!(limits.node_count, 5);
        assert_eq!(limits.card_bytes, Limits::default().card_bytes);
    }
}
