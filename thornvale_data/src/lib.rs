//! Shared data model for Thornvale world content.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_tables};
