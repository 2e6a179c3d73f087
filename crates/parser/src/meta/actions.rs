//! Semantic actions of the meta grammars.
//!
//! Term actions run in source order, each popping the name its term bound,
//! so by the time a rule's first/next product action runs only the rule
//! name (if any) is left on the stack.

use std::mem;
use std::rc::Rc;

use common::debug::{create_logger, Logger};
use common::{log, log_detail};

use crate::error::ExecError;
use crate::symbol::{Matcher, Product, Semantic, SymbolId, Term, TermKind};
use crate::vm::Machine;

/// The product being assembled for the rule currently being defined.
#[derive(Debug, Default)]
pub(crate) struct RuleBuilder {
    current: Option<SymbolId>,
    terms: Vec<Term>,
    action: Option<SymbolId>,
}

impl RuleBuilder {
    /// Terms after an end action belong to no product.
    fn push(&mut self, term: Term) {
        if self.action.is_none() {
            self.terms.push(term);
        }
    }

    fn close(&mut self, action: SymbolId) {
        if self.action.is_none() {
            self.action = Some(action);
        }
    }

    fn take_product(&mut self) -> Product {
        Product::new(mem::take(&mut self.terms), self.action.take())
    }

    /// The rule that `|` alternatives are appended to.
    pub(crate) fn current(&self) -> Option<SymbolId> {
        self.current
    }
}

// =============================================================================
// Rule construction
// =============================================================================

fn meta_log() -> Logger {
    create_logger("meta")
}

/// `<name> ::= ...`: start (or restart) the rule called `name`.
pub(crate) fn first_product(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let name = m.pop_name()?;
    let session = &mut *m.session;
    let id = session.lookup_or_insert(name);
    let product = session.rule.take_product();

    if session.refuse_builtin(id) {
        session.rule.current = None;
        return Ok(());
    }
    if session.symbol(id).syntax.is_some() {
        session.warn(format!("{}: syntax redefined", name));
    }

    log!(meta_log(), "rule {}", name);
    let symbol = session.symbol_mut(id);
    symbol.syntax = Some(Rc::new(vec![product]));
    symbol.matcher = Matcher::Syntax;
    session.rule.current = Some(id);
    Ok(())
}

/// `| ...`: append an alternative to the current rule.
pub(crate) fn next_product(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let session = &mut *m.session;
    let product = session.rule.take_product();
    let Some(id) = session.rule.current() else {
        return Ok(());
    };

    log_detail!(meta_log(), "alternative for {}", session.symbol(id).name);
    let symbol = session.symbol_mut(id);
    match &mut symbol.syntax {
        Some(syntax) => Rc::make_mut(syntax).push(product),
        None => symbol.syntax = Some(Rc::new(vec![product])),
    }
    symbol.matcher = Matcher::Syntax;
    Ok(())
}

fn record(m: &mut Machine<'_, '_, '_>, kind: TermKind) -> Result<(), ExecError> {
    let name = m.pop_name()?;
    let session = &mut *m.session;
    let id = session.lookup_or_insert(name);
    if kind != TermKind::Terminal
        && !session.is_builtin(id)
        && matches!(session.symbol(id).matcher, Matcher::None)
    {
        session.symbol_mut(id).matcher = Matcher::Undefined;
    }
    session.rule.push(Term::new(kind, id));
    Ok(())
}

pub(crate) fn terminal(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    record(m, TermKind::Terminal)
}

pub(crate) fn nonterminal(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    record(m, TermKind::NonTerminal)
}

pub(crate) fn zero_or_one(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    record(m, TermKind::ZeroOrOne)
}

pub(crate) fn zero_or_many(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    record(m, TermKind::ZeroOrMany)
}

pub(crate) fn one_or_many(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    record(m, TermKind::OneOrMany)
}

/// `@ name`: end the product with an action.
pub(crate) fn semantic(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let name = m.pop_name()?;
    let session = &mut *m.session;
    let id = session.lookup_or_insert(name);
    if !session.symbol(id).semantic.is_present() && !session.refuse_builtin(id) {
        session.symbol_mut(id).semantic = Semantic::Declared;
    }
    session.rule.close(id);
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

/// `!name`: switch the active grammar; `!shell` asks the host to stop.
pub(crate) fn switch_root(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let name = m.pop_name()?;
    let session = &mut *m.session;
    if name == "shell" {
        session.request_exit();
    } else {
        let id = session.lookup_or_insert(name);
        session.set_root(id);
    }
    Ok(())
}

/// `?name`: render one rule.
pub(crate) fn display(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let name = m.pop_name()?;
    let session = &mut *m.session;
    match session.lookup(name) {
        Some(id) => {
            for line in session.render(id) {
                session.emit(line);
            }
        }
        None => session.warn(format!("{}: unknown", name)),
    }
    Ok(())
}

/// `??`
pub(crate) fn list(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let session = &mut *m.session;
    for line in session.list() {
        session.emit(line);
    }
    Ok(())
}

/// `compile`
pub(crate) fn compile(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    let session = &mut *m.session;
    let frozen = session.freeze();
    for line in frozen.lines() {
        session.emit(line);
    }
    Ok(())
}

pub(crate) fn trace_on(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    m.session.set_trace(true);
    Ok(())
}

pub(crate) fn trace_off(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    m.session.set_trace(false);
    Ok(())
}

pub(crate) fn timing_on(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    m.session.set_timing(true);
    Ok(())
}

pub(crate) fn timing_off(m: &mut Machine<'_, '_, '_>) -> Result<(), ExecError> {
    m.session.set_timing(false);
    Ok(())
}
