//! Backtracking interpreter over symbol syntax.
//!
//! One `Engine` lives for one top-level parse. It walks products in order,
//! restoring the input cursor and the bytecode length whenever a product
//! fails, and tracks the furthest failed term for diagnostics.

use std::time::Instant;

use common::debug::{create_logger, Logger};
use common::{log, log_detail, log_fail, log_success};
use hashbrown::HashSet;

use crate::error::{Outcome, ParseFailure};
use crate::meta::render::format_term;
use crate::scan::Input;
use crate::session::Session;
use crate::symbol::{Matcher, Product, SymbolId, Term, TermKind};
use crate::value::Value;
use crate::vm;

/// Result of one term within a product walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Matched,
    Failed,
    /// A term referenced a symbol with no matcher; give up on the whole
    /// enclosing symbol.
    Abandon,
    Aborted,
}

impl From<Outcome> for Flow {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Matched => Flow::Matched,
            Outcome::Failed => Flow::Failed,
            Outcome::Aborted => Flow::Aborted,
        }
    }
}

/// Backtracking checkpoint.
#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    pos: usize,
    /// Bytecode length counting values already run by `execute`.
    code_len: usize,
}

pub(crate) struct Engine<'s, 'a, 'src> {
    session: &'s mut Session<'a>,
    input: Input<'src>,
    code: Vec<Value<'src>>,
    // Values already run and dropped by `execute`.
    flushed: usize,

    // Furthest failed term: position after the attempt, symbol, term kind.
    furthest: Option<(usize, SymbolId, TermKind)>,

    cutting: bool,
    depth: usize,
    reported: HashSet<SymbolId>,
    trace: bool,
    log: Logger,
}

/// Parse `line` starting at `root`.
///
/// On success the bytecode ends with the `Undefined` sentinel.
pub(crate) fn parse_line<'a, 'src>(
    session: &mut Session<'a>,
    root: SymbolId,
    line: &'src str,
) -> Result<Vec<Value<'src>>, ParseFailure> {
    let started = session.timing().then(Instant::now);
    session.clear_warning();

    let mut engine = Engine::new(session, line);
    let outcome = engine.invoke(root);
    let result = engine.finish(root, outcome);

    if let Some(start) = started {
        session.emit(format!("parse: {} ms", start.elapsed().as_millis()));
    }
    result
}

impl<'s, 'a, 'src> Engine<'s, 'a, 'src> {
    fn new(session: &'s mut Session<'a>, line: &'src str) -> Self {
        let trace = session.trace();
        Self {
            session,
            input: Input::new(line),
            code: Vec::new(),
            flushed: 0,
            furthest: None,
            cutting: false,
            depth: 0,
            reported: HashSet::new(),
            trace,
            log: create_logger("engine"),
        }
    }

    fn finish(
        mut self,
        root: SymbolId,
        outcome: Outcome,
    ) -> Result<Vec<Value<'src>>, ParseFailure> {
        match outcome {
            Outcome::Matched => {
                log_success!(self.log, "line accepted, {} values", self.code.len());
                self.code.push(Value::Undefined);
                Ok(self.code)
            }
            Outcome::Failed => {
                let (position, expected) = match self.furthest {
                    Some((pos, symbol, kind)) => (pos, self.expected(symbol, kind)),
                    None => (0, self.expected(root, TermKind::NonTerminal)),
                };
                log_fail!(self.log, "line rejected at {}: {} expected", position, expected);
                Err(ParseFailure::NoMatch { position, expected })
            }
            Outcome::Aborted => {
                log_fail!(self.log, "line aborted at {}", self.input.pos());
                Err(ParseFailure::Aborted { position: self.input.pos() })
            }
        }
    }

    fn expected(&self, symbol: SymbolId, kind: TermKind) -> String {
        let name = self.session.symbol(symbol).name;
        match kind {
            TermKind::Terminal => format!("\"{}\"", name),
            _ => format!("<{}>", name),
        }
    }

    fn save(&self) -> Checkpoint {
        Checkpoint {
            pos: self.input.pos(),
            code_len: self.flushed + self.code.len(),
        }
    }

    fn restore(&mut self, cp: Checkpoint) {
        self.input.set_pos(cp.pos);
        self.code.truncate(cp.code_len.saturating_sub(self.flushed));
    }

    fn record_failure(&mut self, term: &Term) {
        let pos = self.input.pos();
        match self.furthest {
            Some((furthest, _, _)) if pos < furthest => {}
            _ => self.furthest = Some((pos, term.symbol, term.kind)),
        }
    }

    // =========================================================================
    // Symbol dispatch
    // =========================================================================

    /// Match `symbol` as a nonterminal.
    fn invoke(&mut self, symbol: SymbolId) -> Outcome {
        let matcher = self.session.symbol(symbol).matcher;
        match matcher {
            Matcher::Syntax => self.parse_syntax(symbol),
            Matcher::Native(matcher) => Outcome::from(matcher(&mut self.input, &mut self.code)),
            Matcher::None | Matcher::Undefined => {
                self.report(symbol, "undefined");
                Outcome::Failed
            }
            Matcher::Cut => {
                self.cutting = true;
                Outcome::Matched
            }
            Matcher::Throw => Outcome::Aborted,
            Matcher::Execute => self.execute_now(),
        }
    }

    fn parse_syntax(&mut self, symbol: SymbolId) -> Outcome {
        let Some(syntax) = self.session.symbol(symbol).syntax.clone() else {
            self.report(symbol, "undefined");
            return Outcome::Failed;
        };

        log!(self.log, "parse <{}> at {}", self.session.symbol(symbol).name, self.input.pos());
        self.log.push_indent();
        self.depth += 1;

        let mut committed = false;
        let mut outcome = Outcome::Failed;
        for (n, product) in syntax.iter().enumerate() {
            if committed {
                log_detail!(self.log, "cut, skipping remaining products");
                break;
            }
            let start = self.save();
            log_detail!(self.log, "try product {}", n + 1);
            match self.walk(product, &mut committed) {
                Flow::Matched => {
                    if let Some(action) = product.action {
                        self.code.push(Value::Symbol(action));
                    }
                    outcome = Outcome::Matched;
                    break;
                }
                Flow::Failed => self.restore(start),
                Flow::Abandon => {
                    self.restore(start);
                    break;
                }
                Flow::Aborted => {
                    outcome = Outcome::Aborted;
                    break;
                }
            }
        }

        self.depth -= 1;
        self.log.pop_indent();
        if outcome.matched() {
            log_success!(self.log, "<{}>", self.session.symbol(symbol).name);
        }
        outcome
    }

    /// Walk the terms of one product.
    fn walk(&mut self, product: &Product, committed: &mut bool) -> Flow {
        for term in &product.terms {
            if self.trace {
                self.trace_term(term);
            }
            let flow = self.match_term(term);
            if std::mem::take(&mut self.cutting) {
                *committed = true;
            }
            match flow {
                Flow::Matched => {}
                Flow::Failed => {
                    self.record_failure(term);
                    return Flow::Failed;
                }
                other => return other,
            }
        }
        Flow::Matched
    }

    fn match_term(&mut self, term: &Term) -> Flow {
        let symbol = term.symbol;
        if term.kind != TermKind::Terminal
            && matches!(self.session.symbol(symbol).matcher, Matcher::None)
        {
            if term.kind == TermKind::ZeroOrOne {
                return Flow::Matched;
            }
            self.report(symbol, "no matcher");
            return Flow::Abandon;
        }

        match term.kind {
            TermKind::Terminal => Flow::from(Outcome::from(self.match_terminal(symbol))),
            TermKind::NonTerminal => Flow::from(self.invoke(symbol)),
            TermKind::ZeroOrOne => {
                let before = self.save();
                match self.invoke(symbol) {
                    Outcome::Aborted => Flow::Aborted,
                    Outcome::Failed => {
                        self.restore(before);
                        Flow::Matched
                    }
                    Outcome::Matched => Flow::Matched,
                }
            }
            TermKind::ZeroOrMany => self.repeat(symbol),
            TermKind::OneOrMany => match self.invoke(symbol) {
                Outcome::Matched => self.repeat(symbol),
                other => Flow::from(other),
            },
        }
    }

    /// Match `symbol` until it fails or stops consuming input.
    fn repeat(&mut self, symbol: SymbolId) -> Flow {
        loop {
            let before = self.save();
            match self.invoke(symbol) {
                Outcome::Matched if self.input.pos() == before.pos => return Flow::Matched,
                Outcome::Matched => {}
                Outcome::Failed => {
                    self.restore(before);
                    return Flow::Matched;
                }
                Outcome::Aborted => return Flow::Aborted,
            }
        }
    }

    fn match_terminal(&mut self, symbol: SymbolId) -> bool {
        let text = self.session.symbol(symbol).name;
        self.input.skip_space();
        !self.input.at_end() && self.input.eat(text)
    }

    /// Run the bytecode built so far, then drop it.
    fn execute_now(&mut self) -> Outcome {
        let mut code = std::mem::take(&mut self.code);
        self.flushed += code.len();
        code.push(Value::Undefined);
        let capacity = self.session.config().stack_capacity;
        log!(self.log, "execute {} values", code.len());
        match vm::execute(self.session, &code, capacity) {
            Ok(_) => Outcome::Matched,
            Err(err) => {
                self.session.warn(format!("execute: {}", err));
                Outcome::Failed
            }
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    fn report(&mut self, symbol: SymbolId, what: &str) {
        if self.reported.insert(symbol) {
            let name = self.session.symbol(symbol).name;
            self.session.warn(format!("<{}>: {}", name, what));
        }
    }

    fn trace_term(&mut self, term: &Term) {
        let line = format!("{}{}", "  ".repeat(self.depth), format_term(self.session, term));
        self.session.emit(line);
    }
}
