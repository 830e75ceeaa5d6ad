//! Callback types a host supplies to a render (§6). `OnAction` and
//! `IconResolver` are owned, reference-counted closures rather than
//! borrowed `&dyn Fn` — consistent with §5's single-threaded, synchronous
//! model (no `Send`/`Sync` bound is needed), and it lets a rendered
//! node's `on_click`/`on_change` closure outlive the `render` call that
//! built it.

use std::rc::Rc;

use safeview_validator::ValidationError;
use serde_json::Value as Json;

/// Which kind of interaction fired (§6): `onAction`'s first argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Button,
    Toggle,
}

impl ActionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionKind::Button => "button",
            ActionKind::Toggle => "toggle",
        }
    }
}

/// `onAction(kind, actionId, payload?)` (§6): invoked once per user
/// activation of a rendered `Button` or `Toggle`.
pub type OnAction = Rc<dyn Fn(ActionKind, &str, Option<Json>)>;

/// `iconResolver(name) -> HostNode` (§6): given an icon name that already
/// passed static validation, returns the glyph to splice in, or `None` to
/// render nothing.
pub type IconResolver<N> = Rc<dyn Fn(&str) -> Option<N>>;

/// `onError(errors)` (§6): called at most once per render, only if at
/// least one runtime error accumulated. Borrowed, not owned — it runs
/// synchronously inside the `render` call and is never stored past it.
pub type OnError<'a> = dyn FnMut(&[ValidationError]) + 'a;
