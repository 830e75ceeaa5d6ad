//! One module per validation pass (§4.2-§4.8). Each module exposes a
//! `run(&Card) -> ValidationResult` (the resource-limits pass also takes a
//! [`crate::limits::Limits`]); [`crate::validate`] drives them in spec
//! order and merges their results.

pub mod expression;
pub mod node;
pub mod resource_limits;
pub mod schema;
pub mod security;
pub mod style;
pub mod style_ref;
pub mod value_type;
