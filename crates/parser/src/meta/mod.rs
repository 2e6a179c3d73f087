//! Meta-grammar compiler.
//!
//! The four dialects (`bnf`, `ebnf`, `xbnf`, `yacc`) are ordinary grammar
//! data whose semantic actions build new rules in the session they parse
//! in. All four share the rule builder and the command layer.

pub(crate) mod actions;
mod dialects;
pub mod freeze;
pub mod render;

pub(crate) use actions::RuleBuilder;
pub(crate) use dialects::install;
