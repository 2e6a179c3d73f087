//! The session: symbol store, dictionary, mode flags and output.
//!
//! Everything a parse reads or a semantic action mutates lives here, so
//! independent sessions never share grammar state.

use bumpalo::Bump;
use common::debug::{create_logger, Logger};
use common::intern::StringInterner;
use common::{log, log_detail};

use crate::engine;
use crate::error::{ExecError, ParseFailure, ThawError};
use crate::leaf;
use crate::meta::{self, RuleBuilder};
use crate::symbol::{
    is_identifier_like, Dictionary, Matcher, NativeMatcher, Product, Semantic, Symbol, SymbolId,
    FIRST_TOKEN_ID,
};
use crate::value::Value;
use crate::vm::{self, SemanticFn};

/// Session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Operand stack slots for each VM run.
    pub stack_capacity: usize,
    /// Line width for `??` listings.
    pub list_width: usize,
    pub trace: bool,
    pub timing: bool,
    /// Mirror output lines to stdout as they are produced.
    pub echo: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stack_capacity: 64,
            list_width: 80,
            trace: false,
            timing: false,
            echo: true,
        }
    }
}

/// What `run_line` did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStatus {
    /// Parsed and executed.
    Executed,
    /// Not accepted by the active grammar.
    Rejected,
    /// The host should stop.
    Exit,
}

pub struct Session<'a> {
    strings: StringInterner<'a>,
    symbols: Vec<Symbol<'a>>,
    dictionary: Dictionary<'a>,
    next_token_id: u32,
    builtin_symbols: usize,

    root: SymbolId,
    bnf: SymbolId,

    config: SessionConfig,
    warning: bool,
    exit_requested: bool,
    output: Vec<String>,

    pub(crate) rule: RuleBuilder,
    log: Logger,
}

impl<'a> Session<'a> {
    pub fn new(arena: &'a Bump) -> Self {
        Self::with_config(arena, SessionConfig::default())
    }

    /// A session holding the built-in primitives and the four meta
    /// grammars, with `bnf` as the active root.
    pub fn with_config(arena: &'a Bump, config: SessionConfig) -> Self {
        let mut session = Self {
            strings: StringInterner::new(arena),
            symbols: Vec::new(),
            dictionary: Dictionary::new(),
            next_token_id: FIRST_TOKEN_ID,
            builtin_symbols: 0,
            root: SymbolId(0),
            bnf: SymbolId(0),
            config,
            warning: false,
            exit_requested: false,
            output: Vec::new(),
            rule: RuleBuilder::default(),
            log: create_logger("session"),
        };

        session.install_primitives();
        let bnf = meta::install(&mut session);
        session.bnf = bnf;
        session.root = bnf;
        session.dictionary.seal();
        session.builtin_symbols = session.symbols.len();
        log!(
            session.log,
            "session ready: {} symbols, {} in dictionary",
            session.symbols.len(),
            session.dictionary.len()
        );
        session
    }

    fn install_primitives(&mut self) {
        let leaves: [(&str, Matcher); 13] = [
            ("empty", Matcher::Native(leaf::empty)),
            ("eoln", Matcher::Native(leaf::eoln)),
            ("integer", Matcher::Native(leaf::integer)),
            ("float", Matcher::Native(leaf::float)),
            ("string", Matcher::Native(leaf::string)),
            ("token", Matcher::Native(leaf::token)),
            ("identifier", Matcher::Native(leaf::identifier)),
            ("nospace", Matcher::Native(leaf::nospace)),
            ("space", Matcher::Native(leaf::space)),
            ("cut", Matcher::Cut),
            ("throw", Matcher::Throw),
            ("execute", Matcher::Execute),
            ("pos", Matcher::Native(leaf::pos)),
        ];
        for (name, matcher) in leaves {
            let id = self.lookup_or_insert(name);
            self.symbols[id.index()].matcher = matcher;
        }

        let semantics: [(&str, SemanticFn<'a>); 9] = [
            ("add", vm::add),
            ("sub", vm::sub),
            ("mul", vm::mul),
            ("div", vm::div),
            ("mod", vm::modulo),
            ("typeof", vm::type_of),
            ("asinteger", vm::as_integer),
            ("asfloat", vm::as_float),
            ("print", vm::print),
        ];
        for (name, semantic) in semantics {
            let id = self.lookup_or_insert(name);
            self.symbols[id.index()].semantic = Semantic::Bound(semantic);
        }
    }

    // =========================================================================
    // Symbol table
    // =========================================================================

    pub fn symbol(&self, id: SymbolId) -> &Symbol<'a> {
        &self.symbols[id.index()]
    }

    pub(crate) fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol<'a> {
        &mut self.symbols[id.index()]
    }

    pub fn dictionary(&self) -> &Dictionary<'a> {
        &self.dictionary
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.dictionary.lookup(name)
    }

    /// Find `name` in the dictionary or add it as the newest entry.
    ///
    /// New identifier-like names get id 0, anything else the next token id.
    pub fn lookup_or_insert(&mut self, name: &str) -> SymbolId {
        if let Some(id) = self.dictionary.lookup(name) {
            return id;
        }
        let token_id = if is_identifier_like(name) {
            0
        } else {
            let id = self.next_token_id;
            self.next_token_id += 1;
            id
        };
        self.insert_symbol(name, token_id)
    }

    /// Insert a symbol with a known id, keeping the token counter ahead of
    /// it. `name` must not be in the dictionary yet.
    pub(crate) fn insert_symbol(&mut self, name: &str, token_id: u32) -> SymbolId {
        let name = self.strings.intern(name);
        let id = self.push_symbol(Symbol::new(name, token_id));
        self.dictionary.insert(name, id);
        if token_id >= self.next_token_id {
            self.next_token_id = token_id + 1;
        }
        log_detail!(self.log, "new symbol {} ({})", name, token_id);
        id
    }

    /// A symbol kept out of the dictionary, used by the meta grammars for
    /// their own tokens, rules and actions.
    pub(crate) fn add_internal(&mut self, name: &str, token_id: u32) -> SymbolId {
        let name = self.strings.intern(name);
        self.push_symbol(Symbol::new(name, token_id))
    }

    fn push_symbol(&mut self, symbol: Symbol<'a>) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    /// True for symbols created while the session was being built.
    pub fn is_builtin(&self, id: SymbolId) -> bool {
        id.index() < self.builtin_symbols
    }

    pub fn next_token_id(&self) -> u32 {
        self.next_token_id
    }

    /// Install a host leaf matcher under `name`.
    pub fn register_native_symbol(&mut self, name: &str, matcher: NativeMatcher) -> SymbolId {
        let id = self.lookup_or_insert(name);
        if self.refuse_builtin(id) {
            return id;
        }
        self.symbols[id.index()].matcher = Matcher::Native(matcher);
        id
    }

    /// Give `symbol` a complete syntax, replacing any previous one.
    pub fn define_syntax(&mut self, symbol: SymbolId, products: Vec<Product>) {
        if self.refuse_builtin(symbol) {
            return;
        }
        let entry = &mut self.symbols[symbol.index()];
        entry.syntax = Some(products.into());
        entry.matcher = Matcher::Syntax;
    }

    /// Give an internal meta-grammar symbol its syntax while the session is
    /// being built.
    pub(crate) fn define_internal(&mut self, symbol: SymbolId, products: Vec<Product>) {
        let entry = &mut self.symbols[symbol.index()];
        entry.syntax = Some(products.into());
        entry.matcher = Matcher::Syntax;
    }

    /// Bind a semantic function to `symbol`.
    pub fn bind_semantic(&mut self, symbol: SymbolId, semantic: SemanticFn<'a>) {
        if self.refuse_builtin(symbol) {
            return;
        }
        self.symbols[symbol.index()].semantic = Semantic::Bound(semantic);
    }

    /// Warn and return true if `id` is built-in and the session is sealed.
    pub(crate) fn refuse_builtin(&mut self, id: SymbolId) -> bool {
        if self.builtin_symbols > 0 && self.is_builtin(id) {
            let name = self.symbols[id.index()].name;
            self.warn(format!("{}: built-in, not modified", name));
            true
        } else {
            false
        }
    }

    // =========================================================================
    // Modes and output
    // =========================================================================

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    pub fn set_root(&mut self, root: SymbolId) {
        self.root = root;
    }

    /// The basic dialect's root symbol.
    pub fn bnf(&self) -> SymbolId {
        self.bnf
    }

    pub fn trace(&self) -> bool {
        self.config.trace
    }

    pub fn set_trace(&mut self, on: bool) {
        self.config.trace = on;
    }

    pub fn timing(&self) -> bool {
        self.config.timing
    }

    pub fn set_timing(&mut self, on: bool) {
        self.config.timing = on;
    }

    /// True if a diagnostic was reported since the last parse started.
    pub fn warning(&self) -> bool {
        self.warning
    }

    pub(crate) fn clear_warning(&mut self) {
        self.warning = false;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(crate) fn request_exit(&mut self) {
        self.exit_requested = true;
    }

    /// Append one line of output.
    pub fn emit(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.config.echo {
            println!("{}", line);
        }
        self.output.push(line);
    }

    /// Emit an advisory diagnostic and raise the warning flag.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warning = true;
        self.emit(message);
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Drain the output collected so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    // =========================================================================
    // Parse and execute
    // =========================================================================

    /// Parse one line against `root`, returning its bytecode.
    pub fn parse_line<'src>(
        &mut self,
        root: SymbolId,
        line: &'src str,
    ) -> Result<Vec<Value<'src>>, ParseFailure> {
        engine::parse_line(self, root, line)
    }

    /// Run bytecode on a fresh stack of `capacity` slots.
    pub fn execute<'src>(
        &mut self,
        code: &[Value<'src>],
        capacity: usize,
    ) -> Result<Vec<Value<'src>>, ExecError> {
        vm::execute(self, code, capacity)
    }

    /// Parse `line` against the active root and execute it.
    ///
    /// Rejected lines are echoed with a caret under the furthest failure.
    /// `!shell` and `!bnf` are understood even when the active grammar
    /// rejects them.
    pub fn run_line(&mut self, line: &str) -> LineStatus {
        let root = self.root;
        match self.parse_line(root, line) {
            Ok(code) => {
                let capacity = self.config.stack_capacity;
                if let Err(err) = self.execute(&code, capacity) {
                    self.warn(format!("execute: {}", err));
                }
                if self.exit_requested {
                    LineStatus::Exit
                } else {
                    LineStatus::Executed
                }
            }
            Err(failure) => match line.trim() {
                "!shell" => {
                    self.request_exit();
                    LineStatus::Exit
                }
                "!bnf" => {
                    self.root = self.bnf;
                    LineStatus::Executed
                }
                _ => {
                    self.emit(line);
                    self.emit(failure.caret());
                    LineStatus::Rejected
                }
            },
        }
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Render the syntax and declarations of `symbol`.
    pub fn render(&self, symbol: SymbolId) -> Vec<String> {
        meta::render::render(self, symbol)
    }

    /// Dictionary names, newest first, in columns.
    pub fn list(&self) -> Vec<String> {
        meta::render::list(self, self.config.list_width)
    }

    /// The non-built-in dictionary as frozen declarations.
    pub fn freeze(&self) -> String {
        meta::freeze::freeze(self)
    }

    /// Load frozen declarations produced by [`Session::freeze`].
    pub fn thaw(&mut self, text: &str) -> Result<(), ThawError> {
        meta::freeze::thaw(self, text)
    }
}
