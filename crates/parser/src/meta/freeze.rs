//! Frozen grammar text: `compile` output and its reader.
//!
//! ```text
//! // frozen grammar
//! extern symbol symbol_g;
//! extern symbol symbol_go;
//! extern syntax syntax_g;
//! extern product product_g_1;
//! symbol symbol_g = { "g", 0, syntax_g, parse_syntax, none };
//! symbol symbol_go = { "go", 0, none, none, none };
//! syntax syntax_g = { product_g_1 };
//! product product_g_1 = { terminal symbol_go, end none };
//! ```
//!
//! Symbols are listed newest first, like the dictionary.

use std::fmt::Write;
use std::rc::Rc;

use hashbrown::{HashMap, HashSet};

use crate::error::ThawError;
use crate::session::Session;
use crate::symbol::{Matcher, Product, Semantic, Symbol, SymbolId, Term, TermKind};

const HEADER: &str = "// frozen grammar";

/// Stem used in syntax, product, parse and semantic names.
fn stem(symbol: &Symbol<'_>) -> String {
    if symbol.id == 0 {
        symbol.name.to_string()
    } else {
        format!("token_{}", symbol.id)
    }
}

fn kind_name(kind: TermKind) -> &'static str {
    match kind {
        TermKind::Terminal => "terminal",
        TermKind::NonTerminal => "nonterminal",
        TermKind::ZeroOrOne => "zero_or_one",
        TermKind::ZeroOrMany => "zero_or_many",
        TermKind::OneOrMany => "one_or_many",
    }
}

fn parse_kind(text: &str) -> Option<TermKind> {
    Some(match text {
        "terminal" => TermKind::Terminal,
        "nonterminal" => TermKind::NonTerminal,
        "zero_or_one" => TermKind::ZeroOrOne,
        "zero_or_many" => TermKind::ZeroOrMany,
        "one_or_many" => TermKind::OneOrMany,
        _ => return None,
    })
}

/// Host matchers and forward references keep a named parse function.
fn has_parse(symbol: &Symbol<'_>) -> bool {
    !matches!(symbol.matcher, Matcher::None | Matcher::Syntax)
}

fn quote(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

pub fn freeze(session: &Session<'_>) -> String {
    let symbols: Vec<&Symbol<'_>> = session
        .dictionary()
        .user_entries()
        .map(|id| session.symbol(id))
        .collect();
    let mut out = String::new();
    let _ = writeln!(out, "{}", HEADER);

    for symbol in &symbols {
        let _ = writeln!(out, "extern symbol {};", symbol.var_name());
    }
    for symbol in &symbols {
        if let Some(syntax) = &symbol.syntax {
            let stem = stem(symbol);
            let _ = writeln!(out, "extern syntax syntax_{};", stem);
            for n in 1..=syntax.len() {
                let _ = writeln!(out, "extern product product_{}_{};", stem, n);
            }
        }
    }
    for symbol in symbols.iter().filter(|s| has_parse(s)) {
        let _ = writeln!(out, "extern parse parse_{};", stem(symbol));
    }
    for symbol in symbols.iter().filter(|s| s.semantic.is_present()) {
        let _ = writeln!(out, "extern semantic semantic_{};", stem(symbol));
    }

    for symbol in &symbols {
        let stem = stem(symbol);
        let syntax = match symbol.syntax {
            Some(_) => format!("syntax_{}", stem),
            None => "none".to_string(),
        };
        let parse = match symbol.matcher {
            Matcher::Syntax => "parse_syntax".to_string(),
            Matcher::None => "none".to_string(),
            _ => format!("parse_{}", stem),
        };
        let semantic = if symbol.semantic.is_present() {
            format!("semantic_{}", stem)
        } else {
            "none".to_string()
        };
        let _ = writeln!(
            out,
            "symbol {} = {{ {}, {}, {}, {}, {} }};",
            symbol.var_name(),
            quote(symbol.name),
            symbol.id,
            syntax,
            parse,
            semantic
        );
    }

    for symbol in &symbols {
        let Some(syntax) = &symbol.syntax else {
            continue;
        };
        let stem = stem(symbol);
        let names: Vec<String> =
            (1..=syntax.len()).map(|n| format!("product_{}_{}", stem, n)).collect();
        let _ = writeln!(out, "syntax syntax_{} = {{ {} }};", stem, names.join(", "));

        for (name, product) in names.iter().zip(syntax.iter()) {
            let mut fields: Vec<String> = product
                .terms
                .iter()
                .map(|t| format!("{} {}", kind_name(t.kind), session.symbol(t.symbol).var_name()))
                .collect();
            fields.push(match product.action {
                Some(action) => format!("end {}", session.symbol(action).var_name()),
                None => "end none".to_string(),
            });
            let _ = writeln!(out, "product {} = {{ {} }};", name, fields.join(", "));
        }
    }
    out
}

// =============================================================================
// Reading
// =============================================================================

struct SymbolDecl {
    var: String,
    name: String,
    id: u32,
    syntax: Option<String>,
    parse: Option<String>,
    semantic: bool,
}

/// `<keyword> <name> = { <body> };`
fn split_definition<'t>(keyword: &str, text: &'t str) -> Option<(&'t str, &'t str)> {
    let rest = text.strip_prefix(keyword)?.strip_prefix(' ')?;
    let (name, body) = rest.split_once(" = {")?;
    let body = body.strip_suffix("};")?.trim();
    Some((name.trim(), body))
}

fn unquote(text: &str) -> Option<(String, &str)> {
    let text = text.strip_prefix('"')?;
    let mut name = String::new();
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => name.push(chars.next()?.1),
            '"' => return Some((name, &text[i + 1..])),
            c => name.push(c),
        }
    }
    None
}

fn parse_symbol(text: &str) -> Option<SymbolDecl> {
    let (var, body) = split_definition("symbol", text)?;
    let (name, rest) = unquote(body)?;
    let fields: Vec<&str> = rest.strip_prefix(',')?.split(',').map(str::trim).collect();
    let [id, syntax, parse, semantic] = fields.as_slice() else {
        return None;
    };
    let optional = |field: &str| (field != "none").then(|| field.to_string());
    Some(SymbolDecl {
        var: var.to_string(),
        name,
        id: id.parse().ok()?,
        syntax: optional(*syntax),
        parse: optional(*parse),
        semantic: *semantic != "none",
    })
}

/// One `product` line with its references still unresolved.
struct ProductDecl<'t> {
    line: usize,
    terms: Vec<(TermKind, &'t str)>,
    action: Option<&'t str>,
}

impl<'t> ProductDecl<'t> {
    fn vars(&self) -> impl Iterator<Item = &'t str> + '_ {
        self.terms.iter().map(|(_, var)| *var).chain(self.action)
    }

    fn resolve(&self, vars: &HashMap<String, SymbolId>) -> Result<Product, ThawError> {
        let lookup = |var: &str| {
            vars.get(var).copied().ok_or_else(|| ThawError::UnknownReference {
                line: self.line,
                name: var.to_string(),
            })
        };
        let mut terms = Vec::with_capacity(self.terms.len());
        for (kind, var) in &self.terms {
            terms.push(Term::new(*kind, lookup(*var)?));
        }
        let action = self.action.map(lookup).transpose()?;
        Ok(Product::new(terms, action))
    }
}

fn read_product(line: usize, body: &str) -> Result<ProductDecl<'_>, ThawError> {
    let malformed = || ThawError::Malformed { line, text: body.to_string() };

    let mut terms = Vec::new();
    let mut action = None;
    let mut ended = false;
    for field in body.split(',').map(str::trim) {
        let (kind, var) = field.split_once(' ').ok_or_else(malformed)?;
        if ended {
            return Err(malformed());
        }
        if kind == "end" {
            ended = true;
            action = (var != "none").then_some(var);
        } else {
            terms.push((parse_kind(kind).ok_or_else(malformed)?, var));
        }
    }
    if !ended {
        return Err(malformed());
    }
    Ok(ProductDecl { line, terms, action })
}

/// Load frozen text into `session`.
///
/// Names already in the dictionary are reused; built-in symbols are left
/// untouched. The text is checked in full before the session changes, so
/// an error leaves the session as it was.
pub fn thaw(session: &mut Session<'_>, text: &str) -> Result<(), ThawError> {
    let mut decls = Vec::new();
    let mut syntaxes: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut products: HashMap<&str, ProductDecl<'_>> = HashMap::new();

    for (n, raw) in text.lines().enumerate() {
        let line = n + 1;
        let text = raw.trim();
        let malformed = || ThawError::Malformed { line, text: text.to_string() };
        if text.is_empty() || text.starts_with("//") || text.starts_with("extern ") {
            continue;
        }
        if text.starts_with("symbol ") {
            decls.push(parse_symbol(text).ok_or_else(malformed)?);
        } else if text.starts_with("syntax ") {
            let (name, body) = split_definition("syntax", text).ok_or_else(malformed)?;
            let names = body.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
            syntaxes.insert(name, names);
        } else if text.starts_with("product ") {
            let (name, body) = split_definition("product", text).ok_or_else(malformed)?;
            products.insert(name, read_product(line, body)?);
        } else {
            return Err(malformed());
        }
    }

    // Every name a product may refer to, built-ins included.
    let mut vars: HashMap<String, SymbolId> = session
        .dictionary()
        .newest_first()
        .map(|id| (session.symbol(id).var_name(), id))
        .collect();
    let known: HashSet<&str> = vars
        .keys()
        .map(String::as_str)
        .chain(decls.iter().map(|d| d.var.as_str()))
        .collect();

    let mut rules = Vec::with_capacity(decls.len());
    for decl in &decls {
        let Some(syntax_name) = &decl.syntax else {
            rules.push(None);
            continue;
        };
        let names = syntaxes
            .get(syntax_name.as_str())
            .ok_or_else(|| ThawError::MissingDefinition { name: syntax_name.clone() })?;
        let mut rule = Vec::with_capacity(names.len());
        for name in names {
            let product = products
                .get(name)
                .ok_or_else(|| ThawError::MissingDefinition { name: name.to_string() })?;
            if let Some(var) = product.vars().find(|var| !known.contains(var)) {
                let name = var.to_string();
                return Err(ThawError::UnknownReference { line: product.line, name });
            }
            rule.push(product);
        }
        rules.push(Some(rule));
    }
    drop(known);

    // Declarations are newest first; create oldest first.
    let mut ids = Vec::with_capacity(decls.len());
    for decl in decls.iter().rev() {
        let id = match session.lookup(&decl.name) {
            Some(id) => id,
            None => session.insert_symbol(&decl.name, decl.id),
        };
        vars.insert(decl.var.clone(), id);
        ids.push(id);
    }

    for ((decl, rule), &id) in decls.iter().zip(&rules).rev().zip(&ids) {
        if session.refuse_builtin(id) {
            continue;
        }

        if let Some(rule) = rule {
            let mut syntax = Vec::with_capacity(rule.len());
            for product in rule {
                syntax.push(product.resolve(&vars)?);
            }
            session.symbol_mut(id).syntax = Some(Rc::new(syntax));
        }

        let symbol = session.symbol_mut(id);
        symbol.matcher = match decl.parse.as_deref() {
            Some("parse_syntax") => Matcher::Syntax,
            Some(_) => match symbol.matcher {
                Matcher::Native(f) => Matcher::Native(f),
                _ => Matcher::Undefined,
            },
            None => symbol.matcher,
        };
        if decl.semantic && !symbol.semantic.is_present() {
            symbol.semantic = Semantic::Declared;
        }
    }
    Ok(())
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
    fn test_freeze_format() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<sum> ::= <integer> '+' <integer> @ add");

        let frozen = freeze(&s);
        let lines: Vec<&str> = frozen.lines().collect();
        assert_eq!(
            lines,
            vec![
                "// frozen grammar",
                "extern symbol symbol_sum;",
                "extern symbol symbol_token_256;",
                "extern syntax syntax_sum;",
                "extern product product_sum_1;",
                "symbol symbol_sum = { \"sum\", 0, syntax_sum, parse_syntax, none };",
                "symbol symbol_token_256 = { \"+\", 256, none, none, none };",
                "syntax syntax_sum = { product_sum_1 };",
                concat!(
                    "product product_sum_1 = { nonterminal symbol_integer, ",
                    "terminal symbol_token_256, nonterminal symbol_integer, end symbol_add };"
                ),
            ]
        );
    }

    #[test]
    fn test_thaw_into_fresh_session_reproduces_freeze() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<expr> ::= <term> '+' <expr> @ add");
        s.run_line("| <term>");
        s.run_line("<term> ::= <integer>");
        s.run_line("| <missing>");
        s.run_line("<x> ::= \"quote\\\"d\" @ act");
        let frozen = freeze(&s);

        let other_arena = Bump::new();
        let mut t = quiet(&other_arena);
        t.thaw(&frozen).expect("thaws");
        assert_eq!(freeze(&t), frozen);
        assert_eq!(t.next_token_id(), s.next_token_id());

        let missing = t.lookup("missing").expect("thawed");
        assert!(matches!(t.symbol(missing).matcher, Matcher::Undefined));
        let act = t.lookup("act").expect("thawed");
        assert!(matches!(t.symbol(act).semantic, Semantic::Declared));
    }

    #[test]
    fn test_thawed_grammar_parses() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<sum> ::= <integer> '+' <integer> @ add");
        let frozen = freeze(&s);

        let other_arena = Bump::new();
        let mut t = quiet(&other_arena);
        t.thaw(&frozen).expect("thaws");
        let sum = t.lookup("sum").expect("thawed");
        let code = t.parse_line(sum, "3 + 4").expect("parses");
        let stack = t.execute(&code, 64).expect("executes");
        assert_eq!(stack, vec![crate::value::Value::Integer(7)]);
    }

    #[test]
    fn test_thaw_errors() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        assert_eq!(
            s.thaw("bogus line"),
            Err(ThawError::Malformed { line: 1, text: "bogus line".to_string() })
        );
        assert_eq!(
            s.thaw("symbol symbol_a = { \"a\", 0, syntax_a, parse_syntax, none };"),
            Err(ThawError::MissingDefinition { name: "syntax_a".to_string() })
        );
        let text = "symbol symbol_b = { \"b\", 0, syntax_b, parse_syntax, none };\n\
                    syntax syntax_b = { product_b_1 };\n\
                    product product_b_1 = { nonterminal symbol_nowhere, end none };";
        assert_eq!(
            s.thaw(text),
            Err(ThawError::UnknownReference { line: 3, name: "symbol_nowhere".to_string() })
        );
    }

    #[test]
    fn test_failed_thaw_leaves_session_unchanged() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<kept> ::= k");
        let before = freeze(&s);
        let entries = s.dictionary().len();
        let next_token = s.next_token_id();

        let text = "symbol symbol_a = { \"a\", 0, syntax_a, parse_syntax, none };\n\
                    symbol symbol_token_300 = { \"%\", 300, none, none, none };\n\
                    syntax syntax_a = { product_a_1 };\n\
                    product product_a_1 = { terminal symbol_token_300, \
                    nonterminal symbol_gone, end none };";
        assert!(matches!(s.thaw(text), Err(ThawError::UnknownReference { line: 4, .. })));
        assert!(s.thaw("symbol symbol_b = { \"b\", 0, syntax_b, parse_syntax, none };").is_err());

        assert!(s.lookup("a").is_none());
        assert!(s.lookup("b").is_none());
        assert!(s.lookup("%").is_none());
        assert_eq!(s.dictionary().len(), entries);
        assert_eq!(s.next_token_id(), next_token);
        assert_eq!(freeze(&s), before);
    }
}
