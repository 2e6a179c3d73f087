//! Grammar data model: symbols, products, terms and the dictionary.

use std::fmt;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::scan::Input;
use crate::value::Value;
use crate::vm::SemanticFn;

/// First id handed out to non identifier-like symbol names.
pub const FIRST_TOKEN_ID: u32 = 256;

/// Index of a symbol in its session's symbol store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A leaf matcher supplied by the host or by the built-in set.
///
/// Matchers get the input cursor and the bytecode being built; on success
/// they consume input and may bind values.
pub type NativeMatcher = for<'src> fn(&mut Input<'src>, &mut Vec<Value<'src>>) -> bool;

/// How the engine matches a symbol used as a nonterminal.
#[derive(Clone, Copy)]
pub enum Matcher {
    /// Nothing to match with.
    None,
    /// Forward reference waiting for its defining rule.
    Undefined,
    /// Walk the symbol's products.
    Syntax,
    Native(NativeMatcher),
    Cut,
    Throw,
    Execute,
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Matcher::None => "None",
            Matcher::Undefined => "Undefined",
            Matcher::Syntax => "Syntax",
            Matcher::Native(_) => "Native",
            Matcher::Cut => "Cut",
            Matcher::Throw => "Throw",
            Matcher::Execute => "Execute",
        })
    }
}

/// Semantic action attached to a symbol.
#[derive(Clone, Copy)]
pub enum Semantic<'a> {
    None,
    /// Named by a grammar (`@ name`) but not implemented.
    Declared,
    Bound(SemanticFn<'a>),
}

impl<'a> Semantic<'a> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Semantic::None)
    }
}

impl fmt::Debug for Semantic<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Semantic::None => "None",
            Semantic::Declared => "Declared",
            Semantic::Bound(_) => "Bound",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Terminal,
    NonTerminal,
    ZeroOrOne,
    ZeroOrMany,
    OneOrMany,
}

/// One element of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub kind: TermKind,
    pub symbol: SymbolId,
}

impl Term {
    pub fn new(kind: TermKind, symbol: SymbolId) -> Self {
        Self { kind, symbol }
    }

    pub fn terminal(symbol: SymbolId) -> Self {
        Self::new(TermKind::Terminal, symbol)
    }

    pub fn nonterminal(symbol: SymbolId) -> Self {
        Self::new(TermKind::NonTerminal, symbol)
    }

    pub fn zero_or_one(symbol: SymbolId) -> Self {
        Self::new(TermKind::ZeroOrOne, symbol)
    }

    pub fn zero_or_many(symbol: SymbolId) -> Self {
        Self::new(TermKind::ZeroOrMany, symbol)
    }

    pub fn one_or_many(symbol: SymbolId) -> Self {
        Self::new(TermKind::OneOrMany, symbol)
    }
}

/// One alternative of a symbol's syntax. The end marker is implicit: a
/// product ends after its last term and binds `action`, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub terms: Vec<Term>,
    pub action: Option<SymbolId>,
}

impl Product {
    pub fn new(terms: Vec<Term>, action: Option<SymbolId>) -> Self {
        Self { terms, action }
    }
}

/// Ordered alternatives of a symbol. Shared so a running parse keeps its
/// snapshot while semantic actions replace or extend the rule.
pub type Syntax = Rc<Vec<Product>>;

#[derive(Debug, Clone)]
pub struct Symbol<'a> {
    pub name: &'a str,
    pub id: u32,
    pub syntax: Option<Syntax>,
    pub matcher: Matcher,
    pub semantic: Semantic<'a>,
}

impl<'a> Symbol<'a> {
    pub fn new(name: &'a str, id: u32) -> Self {
        Self {
            name,
            id,
            syntax: None,
            matcher: Matcher::None,
            semantic: Semantic::None,
        }
    }

    /// Variable name used for this symbol in frozen output.
    pub fn var_name(&self) -> String {
        if self.id == 0 {
            format!("symbol_{}", self.name)
        } else {
            format!("symbol_token_{}", self.id)
        }
    }

    pub fn product_count(&self) -> usize {
        self.syntax.as_ref().map_or(0, |s| s.len())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier_like(name: &str) -> bool {
    let mut bytes = name.bytes();
    match bytes.next() {
        Some(b) if b.is_ascii_alphabetic() || b == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Ordered registry of the symbols visible to grammars.
///
/// Entries are kept oldest first; iteration for display and freezing runs
/// newest first. The first `sealed` entries are built-in.
pub struct Dictionary<'a> {
    entries: Vec<SymbolId>,
    index: HashMap<&'a str, SymbolId>,
    sealed: usize,
}

impl<'a> Dictionary<'a> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            sealed: 0,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.index.get(name).copied()
    }

    pub(crate) fn insert(&mut self, name: &'a str, id: SymbolId) {
        debug_assert!(!self.index.contains_key(name));
        self.index.insert(name, id);
        self.entries.push(id);
    }

    /// Mark every current entry as built-in.
    pub(crate) fn seal(&mut self) {
        self.sealed = self.entries.len();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries, newest first.
    pub fn newest_first(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries.iter().rev().copied()
    }

    /// Entries added after sealing, newest first.
    pub fn user_entries(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries[self.sealed..].iter().rev().copied()
    }
}

impl Default for Dictionary<'_> {
    fn default() -> Self {
        Self::new()
    }
}
