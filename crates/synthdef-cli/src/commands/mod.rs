//! CLI command implementations.

pub mod compile;
pub mod inspect;
pub mod list;
pub mod ugens;
