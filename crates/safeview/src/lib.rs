//! # safeview
//!
//! The root crate of the Safe UGC UI framework: re-exports the public API
//! of `safeview-validator` and `safeview-renderer` behind one facade,
//! composing them into a single application-facing surface.
//!
//! A host embedding safeview typically only needs this crate: [`validate`]
//! / [`validate_raw`] for the Validator (§4.2-§4.8), and [`render`] for the
//! sandboxed Renderer (§4.9-§4.11). The lower-level crates remain directly
//! usable for callers that want finer control (e.g. validating once and
//! rendering many times against different `state`).

pub use safeview_foundation::{ErrorContext, FoundationError};
pub use safeview_renderer::{
    render, ActionKind, HostFactory, HostStyle, IconResolver, OnAction, OnError, RenderOutput,
    RenderRequest,
};
pub use safeview_types::{Card, CardMeta, Node, NodeKind, StyleObject};
pub use safeview_validator::{
    validate, validate_json, validate_raw, ErrorCode, Limits, LimitsBuilder, ValidationError,
    ValidationResult,
};
