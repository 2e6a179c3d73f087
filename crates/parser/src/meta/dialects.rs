//! The meta grammars as grammar data.
//!
//! Tokens, keywords, helper rules and actions are internal symbols; only
//! the four dialect roots enter the dictionary.

use crate::session::Session;
use crate::symbol::{Product, Semantic, SymbolId, Term};
use crate::vm::SemanticFn;

use super::actions;

// Slots into `TOKENS`.
const DEFINE: usize = 0;
const BAR: usize = 1;
const LT: usize = 2;
const GT: usize = 3;
const AT: usize = 4;
const QUOTE: usize = 5;
const QUESTION: usize = 6;
const PLUS: usize = 7;
const STAR: usize = 8;
const BANG: usize = 9;
const HASH: usize = 10;
const LBRACKET: usize = 11;
const RBRACKET: usize = 12;
const LBRACE: usize = 13;
const RBRACE: usize = 14;
const COLON: usize = 15;
const SEMICOLON: usize = 16;

const TOKENS: [(&str, u32); 17] = [
    ("::=", 128),
    ("|", 129),
    ("<", 130),
    (">", 131),
    ("@", 132),
    ("'", 133),
    ("?", 134),
    ("+", 135),
    ("*", 136),
    ("!", 137),
    ("#", 138),
    ("[", 139),
    ("]", 140),
    ("{", 141),
    ("}", 142),
    (":", 143),
    (";", 144),
];

/// Symbols the dialect tables are written in terms of.
struct Meta {
    tok: [SymbolId; 17],
    trace: SymbolId,
    timing: SymbolId,
    on: SymbolId,
    off: SymbolId,
    compile: SymbolId,

    identifier: SymbolId,
    token: SymbolId,
    string: SymbolId,
    eoln: SymbolId,
    space: SymbolId,

    first_product: SymbolId,
    next_product: SymbolId,
    terminal: SymbolId,
    nonterminal: SymbolId,
    zero_or_one: SymbolId,
    zero_or_many: SymbolId,
    one_or_many: SymbolId,
    semantic: SymbolId,
    execute: SymbolId,
    display: SymbolId,
    list: SymbolId,
    compile_action: SymbolId,
    trace_on: SymbolId,
    trace_off: SymbolId,
    timing_on: SymbolId,
    timing_off: SymbolId,
}

impl Meta {
    fn tok(&self, slot: usize) -> Term {
        Term::terminal(self.tok[slot])
    }
}

fn action<'a>(session: &mut Session<'a>, name: &str, semantic: SemanticFn<'a>) -> SymbolId {
    let id = session.add_internal(name, 0);
    session.symbol_mut(id).semantic = Semantic::Bound(semantic);
    id
}

/// Create the meta symbols and the four dialects. Returns `bnf`.
pub(crate) fn install(session: &mut Session<'_>) -> SymbolId {
    let mut tok = [SymbolId(0); 17];
    for (slot, (text, id)) in TOKENS.iter().enumerate() {
        tok[slot] = session.add_internal(text, *id);
    }

    let m = Meta {
        tok,
        trace: session.add_internal("trace", 0),
        timing: session.add_internal("timing", 0),
        on: session.add_internal("on", 0),
        off: session.add_internal("off", 0),
        compile: session.add_internal("compile", 0),

        identifier: session.lookup_or_insert("identifier"),
        token: session.lookup_or_insert("token"),
        string: session.lookup_or_insert("string"),
        eoln: session.lookup_or_insert("eoln"),
        space: session.lookup_or_insert("space"),

        first_product: action(session, "bnf_first_product", actions::first_product),
        next_product: action(session, "bnf_next_product", actions::next_product),
        terminal: action(session, "bnf_terminal", actions::terminal),
        nonterminal: action(session, "bnf_non_terminal", actions::nonterminal),
        zero_or_one: action(session, "bnf_zero_or_one", actions::zero_or_one),
        zero_or_many: action(session, "bnf_zero_or_many", actions::zero_or_many),
        one_or_many: action(session, "bnf_one_or_many", actions::one_or_many),
        semantic: action(session, "bnf_semantic", actions::semantic),
        execute: action(session, "bnf_execute", actions::switch_root),
        display: action(session, "bnf_display", actions::display),
        list: action(session, "bnf_list", actions::list),
        compile_action: action(session, "bnf_compile", actions::compile),
        trace_on: action(session, "bnf_trace_on", actions::trace_on),
        trace_off: action(session, "bnf_trace_off", actions::trace_off),
        timing_on: action(session, "bnf_timing_on", actions::timing_on),
        timing_off: action(session, "bnf_timing_off", actions::timing_off),
    };

    let rule = |session: &mut Session<'_>, name: &str| session.add_internal(name, 0);
    let bnf_break = rule(session, "bnf_break");
    let bnf_cmd = rule(session, "bnf_cmd");
    let bnf_product = rule(session, "bnf_product");
    let bnf_term = rule(session, "bnf_term");
    let ebnf_product = rule(session, "ebnf_product");
    let ebnf_term = rule(session, "ebnf_term");
    let xbnf_product = rule(session, "xbnf_product");
    let xbnf_term = rule(session, "xbnf_term");
    let yacc_product = rule(session, "yacc_product");
    let yacc_term = rule(session, "yacc_term");

    let yacc = session.lookup_or_insert("yacc");
    let xbnf = session.lookup_or_insert("xbnf");
    let ebnf = session.lookup_or_insert("ebnf");
    let bnf = session.lookup_or_insert("bnf");

    let lit = |slot: usize| m.tok(slot);
    let kw = Term::terminal;
    let nt = Term::nonterminal;
    let p = |terms: Vec<Term>, action: Option<SymbolId>| Product::new(terms, action);

    // `'name` followed by whitespace or the end of the line, so `'x'` is
    // left for the string alternative.
    session.define_internal(bnf_break, vec![p(vec![nt(m.space)], None), p(vec![nt(m.eoln)], None)]);

    session.define_internal(
        bnf_cmd,
        vec![
            p(vec![lit(BANG), nt(m.identifier)], Some(m.execute)),
            p(vec![lit(QUESTION), nt(m.identifier)], Some(m.display)),
            p(vec![kw(m.trace), kw(m.on)], Some(m.trace_on)),
            p(vec![kw(m.trace), kw(m.off)], Some(m.trace_off)),
            p(vec![kw(m.timing), kw(m.on)], Some(m.timing_on)),
            p(vec![kw(m.timing), kw(m.off)], Some(m.timing_off)),
            p(vec![kw(m.compile)], Some(m.compile_action)),
            p(vec![lit(QUESTION), lit(QUESTION)], Some(m.list)),
        ],
    );

    // Terminal forms every bracketed dialect shares, tried after its
    // nonterminal forms.
    let plain_terms = || {
        vec![
            p(vec![lit(QUOTE), nt(m.identifier), nt(bnf_break)], Some(m.terminal)),
            p(vec![nt(m.string)], Some(m.terminal)),
            p(vec![nt(m.identifier)], Some(m.terminal)),
            p(vec![lit(AT), nt(m.identifier)], Some(m.semantic)),
            p(vec![lit(QUOTE), nt(m.token)], Some(m.terminal)),
            p(vec![nt(m.token)], Some(m.terminal)),
        ]
    };
    let bracketed = p(vec![lit(LT), nt(m.identifier), lit(GT)], Some(m.nonterminal));

    // Rule lines of the bracketed dialects.
    let root = |product: SymbolId| {
        vec![
            p(
                vec![lit(LT), nt(m.identifier), lit(GT), lit(DEFINE), nt(product), nt(m.eoln)],
                Some(m.first_product),
            ),
            p(vec![lit(BAR), nt(product), nt(m.eoln)], Some(m.next_product)),
            p(vec![nt(bnf_cmd), nt(m.eoln)], None),
            p(vec![lit(HASH)], None),
        ]
    };

    // bnf
    let mut terms = vec![bracketed.clone()];
    terms.extend(plain_terms());
    session.define_internal(bnf_term, terms);
    session.define_internal(bnf_product, vec![p(vec![Term::one_or_many(bnf_term)], None)]);
    session.define_internal(bnf, root(bnf_product));

    // ebnf: [<x>] and {<x>}
    let mut terms = vec![
        bracketed.clone(),
        p(
            vec![lit(LBRACKET), lit(LT), nt(m.identifier), lit(GT), lit(RBRACKET)],
            Some(m.zero_or_one),
        ),
        p(
            vec![lit(LBRACE), lit(LT), nt(m.identifier), lit(GT), lit(RBRACE)],
            Some(m.zero_or_many),
        ),
    ];
    terms.extend(plain_terms());
    session.define_internal(ebnf_term, terms);
    session.define_internal(ebnf_product, vec![p(vec![Term::one_or_many(ebnf_term)], None)]);
    session.define_internal(ebnf, root(ebnf_product));

    // xbnf: <x?>, <x*> and <x+>
    let mut terms = vec![bracketed];
    let quantifiers = [(QUESTION, m.zero_or_one), (STAR, m.zero_or_many), (PLUS, m.one_or_many)];
    for (mark, action) in quantifiers {
        terms.push(p(vec![lit(LT), nt(m.identifier), lit(mark), lit(GT)], Some(action)));
    }
    terms.extend(plain_terms());
    session.define_internal(xbnf_term, terms);
    session.define_internal(xbnf_product, vec![p(vec![Term::one_or_many(xbnf_term)], None)]);
    session.define_internal(xbnf, root(xbnf_product));

    // yacc: bare names are nonterminals, terminals are quoted.
    session.define_internal(
        yacc_term,
        vec![
            p(vec![nt(m.string)], Some(m.terminal)),
            p(vec![lit(AT), nt(m.identifier)], Some(m.semantic)),
            p(vec![nt(m.identifier), lit(QUESTION)], Some(m.zero_or_one)),
            p(vec![nt(m.identifier), lit(STAR)], Some(m.zero_or_many)),
            p(vec![nt(m.identifier), lit(PLUS)], Some(m.one_or_many)),
            p(vec![nt(m.identifier)], Some(m.nonterminal)),
        ],
    );
    session.define_internal(yacc_product, vec![p(vec![Term::one_or_many(yacc_term)], None)]);
    session.define_internal(
        yacc,
        vec![
            p(
                vec![nt(m.identifier), lit(COLON), nt(yacc_product), nt(m.eoln)],
                Some(m.first_product),
            ),
            p(vec![lit(BAR), nt(yacc_product), nt(m.eoln)], Some(m.next_product)),
            p(vec![lit(SEMICOLON), nt(m.eoln)], None),
            p(vec![nt(bnf_cmd), nt(m.eoln)], None),
            p(vec![lit(HASH)], None),
        ],
    );

    bnf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionConfig;
    use bumpalo::Bump;

    fn quiet(arena: &Bump) -> Session<'_> {
        Session::with_config(arena, SessionConfig { echo: false, ..SessionConfig::default() })
    }

    #[test]
    fn test_token_slots() {
        let slots = [
            (DEFINE, "::="),
            (BAR, "|"),
            (LT, "<"),
            (GT, ">"),
            (AT, "@"),
            (QUOTE, "'"),
            (QUESTION, "?"),
            (PLUS, "+"),
            (STAR, "*"),
            (BANG, "!"),
            (HASH, "#"),
            (LBRACKET, "["),
            (RBRACKET, "]"),
            (LBRACE, "{"),
            (RBRACE, "}"),
            (COLON, ":"),
            (SEMICOLON, ";"),
        ];
        for (slot, text) in slots {
            assert_eq!(TOKENS[slot].0, text);
            assert_eq!(TOKENS[slot].1, 128 + slot as u32);
        }
    }

    #[test]
    fn test_bnf_renders_its_own_rules() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("? bnf");
        assert_eq!(
            s.take_output(),
            vec![
                concat!(
                    "<bnf> ::= \"<\" <identifier> \">\" \"::=\" <bnf_product> <eoln>",
                    " @ bnf_first_product"
                ),
                "      | \"|\" <bnf_product> <eoln> @ bnf_next_product",
                "      | <bnf_cmd> <eoln>",
                "      | \"#\"",
            ]
        );
    }

    #[test]
    fn test_quoted_terminal_forms() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<q> ::= 'x 'y '+' \"-\" 'hello' ' ::=");
        s.run_line("? q");
        assert_eq!(
            s.take_output(),
            vec!["<q> ::= \"x\" \"y\" \"+\" \"-\" \"hello\" \"::=\""]
        );
    }

    #[test]
    fn test_ebnf_quantifiers() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("!ebnf");
        s.run_line("<list> ::= [<sign>] <integer> {<more>}");
        s.run_line("? list");
        assert_eq!(s.take_output(), vec!["<list> ::= <sign?> <integer> <more*>"]);
    }

    #[test]
    fn test_yacc_rules() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("!yacc");
        s.run_line("sum : integer '+' integer @ add");
        s.run_line("| integer");
        s.run_line(";");
        s.run_line("? sum");
        assert_eq!(
            s.take_output(),
            vec!["<sum> ::= <integer> \"+\" <integer> @ add", "      | <integer>"]
        );
    }
}
