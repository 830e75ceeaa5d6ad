//! # safeview-foundation
//!
//! Shared plumbing for the `safeview` workspace: the crate-spanning
//! [`FoundationError`] type used for fallible I/O-adjacent operations (size
//! gating, JSON parsing, asset lookups), and an optional `tracing`
//! bootstrap for hosts that want a default subscriber.
//!
//! This crate intentionally knows nothing about cards, nodes, or styles —
//! it is the bottom of the dependency graph, depended on by
//! `safeview-types`, `safeview-validator`, and `safeview-renderer`.

mod error;
#[cfg(feature = "logging-init")]
mod logging;

pub use error::{ErrorContext, FoundationError, Result};
#[cfg(feature = "logging-init")]
pub use logging::init;
