//! Shared infrastructure for the topdown crates.
//!
//! - [`debug`] - named loggers controlled by `TOPDOWN_DEBUG`
//! - [`intern`] - arena backed string interning

pub mod debug;
pub mod intern;

pub use debug::{create_logger, Logger};
pub use intern::StringInterner;
