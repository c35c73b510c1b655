//! Shared engine core: configuration contracts and error types.
//!
//! Nothing in here touches pixels; painters consume these types read-only.

pub mod brush_model;
pub mod contracts;
pub mod errors;
