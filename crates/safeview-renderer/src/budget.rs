//! Runtime resource budget (§4.7, §4.9, §9): a mutable counter struct
//! threaded by reference through one render, enforcing the same four
//! aggregate limits the Resource-Limits Pass checks statically — but
//! against what the render actually emits, one node at a time.

use safeview_validator::{ErrorCode, Limits};

/// The per-node deltas a node would add to the running totals, computed
/// before anything is committed (§4.9 step 2).
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetDelta {
    pub nodes: u64,
    pub style_bytes: u64,
    pub overflow: u64,
    pub text_bytes: u64,
}

/// Which counter would have tripped, so the caller can report the
/// matching `RUNTIME_*_LIMIT` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetLimit {
    Nodes,
    StyleBytes,
    Overflow,
    TextBytes,
}

impl BudgetLimit {
    #[must_use]
    pub const fn error_code(self) -> ErrorCode {
        match self {
            BudgetLimit::Nodes => ErrorCode::RuntimeNodeLimit,
            BudgetLimit::StyleBytes => ErrorCode::RuntimeStyleLimit,
            BudgetLimit::Overflow => ErrorCode::RuntimeOverflowLimit,
            BudgetLimit::TextBytes => ErrorCode::RuntimeTextLimit,
        }
    }
}

/// Owned for the lifetime of one render call (§5): never shared across
/// renders, never reset mid-render. `check` and `commit` are kept
/// separate so a node that would blow the budget never leaves a partial
/// trace in the totals (the "all-or-nothing commit" discipline, §9).
#[derive(Debug, Clone)]
pub struct RuntimeBudget {
    limits: Limits,
    nodes: u64,
    style_bytes: u64,
    overflow: u64,
    text_bytes: u64,
}

impl RuntimeBudget {
    #[must_use]
    pub fn new(limits: Limits) -> Self {
        Self {
            limits,
            nodes: 0,
            style_bytes: 0,
            overflow: 0,
            text_bytes: 0,
        }
    }

    /// Reports the first counter `delta` would push over its limit, if
    /// any. Never mutates `self`.
    #[must_use]
    pub fn check(&self, delta: BudgetDelta) -> Result<(), BudgetLimit> {
        if self.nodes + delta.nodes > self.limits.node_count as u64 {
            return Err(BudgetLimit::Nodes);
        }
        if self.style_bytes + delta.style_bytes > self.limits.style_bytes as u64 {
            return Err(BudgetLimit::StyleBytes);
        }
        if self.overflow + delta.overflow > self.limits.overflow_auto_count as u64 {
            return Err(BudgetLimit::Overflow);
        }
        if self.text_bytes + delta.text_bytes > self.limits.text_content_bytes as u64 {
            return Err(BudgetLimit::TextBytes);
        }
        Ok(())
    }

    /// Commits `delta`, which the caller must already have passed through
    /// [`Self::check`].
    pub fn commit(&mut self, delta: BudgetDelta) {
        self.nodes += delta.nodes;
        self.style_bytes += delta.style_bytes;
        self.overflow += delta.overflow;
        self.text_bytes += delta.text_bytes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_rejects_without_committing() {
        let limits = Limits::builder().node_count(1).build();
        let budget = RuntimeBudget::new(limits);
        let delta = BudgetDelta {
            nodes: 2,
            ..Default::default()
        };
        assert_eq!(budget.check(delta), Err(BudgetLimit::Nodes));
    }

    #[test]
    fn commit_accumulates_across_calls() {
        let mut budget = RuntimeBudget::new(Limits::default());
        let delta = BudgetDelta {
            nodes: 1,
            text_bytes: 10,
            ..Default::default()
        };
        budget.check(delta).unwrap();
        budget.commit(delta);
        budget.check(delta).unwrap();
        budget.commit(delta);
        assert_eq!(budget.nodes, 2);
        assert_eq!(budget.text_bytes, 20);
    }

    #[test]
    fn overflow_counter_trips_independently_of_nodes() {
        let limits = Limits::builder().overflow_auto_count(0).build();
        let budget = RuntimeBudget::new(limits);
        let delta = BudgetDelta {
            nodes: 1,
            overflow: 1,
            ..Default::default()
        };
        assert_eq!(budget.check(delta), Err(BudgetLimit::Overflow));
    }

    #[test]
    fn limit_maps_to_its_matching_runtime_error_code() {
        assert_eq!(BudgetLimit::Nodes.error_code(), ErrorCode::RuntimeNodeLimit);
        assert_eq!(BudgetLimit::TextBytes.error_code(), ErrorCode::RuntimeTextLimit);
    }
}
