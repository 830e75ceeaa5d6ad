//! # safeview-types
//!
//! The data model for a safeview card: the closed [`Node`] kind set, the
//! three-way [`Value`] tagged union (literal / `$ref` / `$expr`), and the
//! [`StyleObject`] schema.
//!
//! This crate defines *shape*, not *policy*. Whether a given field may hold
//! a `$ref` or a `$expr`, whether a color string is well-formed, whether a
//! style property is forbidden — all of that lives in `safeview-validator`.
//! This crate only has to be able to parse a card document into a typed
//! tree without losing information a later pass needs, including
//! information describing *why* a document is malformed.
//!
//! Parsing is deliberately permissive: a missing required field, an unknown
//! node kind, or a malformed dynamic value does not fail parsing outright.
//! Building the typed tree from a [`serde_json::Value`] accumulates
//! [`NodeParseError`]s with paths instead, the same way the validator passes
//! that run afterward accumulate their own errors. This mirrors the spec's
//! two-stage data flow: a permissive structural parse, then layered
//! validation passes over the resulting tree.

pub mod card;
pub mod node;
pub mod path;
pub mod style;
pub mod value;

pub use card::{Card, CardMeta};
pub use node::{Children, ForLoop, Node, NodeKind, NodeParseError};
pub use path::PointerPath;
pub use style::{
    accepts_auto_length, StyleObject, COLOR_PROPERTIES, FORBIDDEN_STYLE_PROPERTIES,
    LENGTH_PROPERTIES, STATIC_ONLY_STYLE_PROPERTIES,
};
pub use value::{ExprString, RefOnlyValue, RefPath, Segment, StaticValue, Value};
