//! Topdown Parser
//!
//! A top-down backtracking parse engine whose grammars are data that can
//! be extended while parsing.
//!
//! # Overview
//!
//! A [`Session`] holds a symbol store, an ordered dictionary of the symbols
//! visible to grammars, and an active root symbol. Each input line is parsed
//! against the root; a successful parse produces bytecode (bound values and
//! semantic action references) which a small stack VM then executes.
//!
//! The session starts with the built-in leaf matchers, arithmetic semantics
//! and four meta grammars (`bnf`, `ebnf`, `xbnf`, `yacc`). Their semantic
//! actions add rules to the same session, so a line like
//!
//! ```text
//! <sum> ::= <integer> '+' <integer> @ add
//! ```
//!
//! defines a rule that later lines (after `!sum`) are parsed with.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use topdown_parser::{LineStatus, Session, SessionConfig, Value};
//!
//! let arena = Bump::new();
//! let config = SessionConfig { echo: false, ..Default::default() };
//! let mut session = Session::with_config(&arena, config);
//! assert_eq!(session.run_line("<sum> ::= <integer> '+' <integer> @ add"), LineStatus::Executed);
//!
//! let sum = session.lookup("sum").unwrap();
//! let code = session.parse_line(sum, "3 + 4").unwrap();
//! assert_eq!(session.execute(&code, 64).unwrap(), vec![Value::Integer(7)]);
//! ```
//!
//! # Public API
//!
//! - [`Session::run_line`] - Parse a line against the active root and execute it
//! - [`Session::parse_line`] / [`Session::execute`] - The two halves separately
//! - [`Session::define_syntax`], [`Session::register_native_symbol`],
//!   [`Session::bind_semantic`] - Extend the grammar from the host
//! - [`Session::render`], [`Session::list`] - Inspect rules and the dictionary
//! - [`Session::freeze`], [`Session::thaw`] - Save and reload user grammars

mod engine;
pub mod error;
pub mod leaf;
pub mod meta;
pub mod scan;
pub mod session;
pub mod symbol;
pub mod value;
pub mod vm;

// Re-export from topdown-common
pub use common::{debug, intern};
pub use common::{create_logger, Logger};

pub use error::{ExecError, Outcome, ParseFailure, ThawError};
pub use scan::Input;
pub use session::{LineStatus, Session, SessionConfig};
pub use symbol::{
    Dictionary, Matcher, NativeMatcher, Product, Semantic, Symbol, SymbolId, Term, TermKind,
};
pub use value::{Value, ValueKind};
pub use vm::{Machine, SemanticFn};
