//! Topdown
//!
//! Script driver for the topdown meta-grammar engine. A script is a series
//! of lines fed to one [`Session`]: grammar definitions in one of the meta
//! dialects, commands, and input for whichever rule is the active root.

pub mod driver;

// Re-export parser types for convenience
pub use topdown_parser::{
    ExecError, LineStatus, ParseFailure, Session, SessionConfig, SymbolId, ThawError, Value,
    ValueKind,
};

// Re-export driver
pub use driver::{Driver, DriverConfig, RunSummary};
