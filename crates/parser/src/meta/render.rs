//! Human-readable rendering of rules and the dictionary listing.

use std::fmt::Write;

use crate::session::Session;
use crate::symbol::{Matcher, Product, SymbolId, Term, TermKind};

pub fn format_term(session: &Session<'_>, term: &Term) -> String {
    let name = session.symbol(term.symbol).name;
    match term.kind {
        TermKind::Terminal => format!("\"{}\"", name),
        TermKind::NonTerminal => format!("<{}>", name),
        TermKind::ZeroOrOne => format!("<{}?>", name),
        TermKind::ZeroOrMany => format!("<{}*>", name),
        TermKind::OneOrMany => format!("<{}+>", name),
    }
}

fn format_product(session: &Session<'_>, product: &Product, out: &mut String) {
    for term in &product.terms {
        out.push(' ');
        out.push_str(&format_term(session, term));
    }
    if let Some(action) = product.action {
        let _ = write!(out, " @ {}", session.symbol(action).name);
    }
}

/// Syntax of `id` followed by its host declarations, one line each.
pub fn render(session: &Session<'_>, id: SymbolId) -> Vec<String> {
    let symbol = session.symbol(id);
    let mut lines = Vec::new();

    if let Some(syntax) = &symbol.syntax {
        let indent = " ".repeat(symbol.name.len() + 3);
        for (n, product) in syntax.iter().enumerate() {
            let mut line = if n == 0 {
                format!("<{}> ::=", symbol.name)
            } else {
                format!("{}|", indent)
            };
            format_product(session, product, &mut line);
            lines.push(line);
        }
    }

    if symbol.semantic.is_present() {
        lines.push(format!("extern semantic semantic_{};", symbol.name));
    }
    if !matches!(symbol.matcher, Matcher::Syntax | Matcher::None) {
        lines.push(format!("extern parse parse_{};", symbol.name));
    }
    lines
}

/// Dictionary names, newest first, laid out in columns.
pub fn list(session: &Session<'_>, width: usize) -> Vec<String> {
    let names: Vec<&str> = session
        .dictionary()
        .newest_first()
        .map(|id| session.symbol(id).name)
        .collect();
    let column = names.iter().map(|n| n.len()).max().unwrap_or(0) + 2;
    let columns = (width / column).max(1);

    names
        .chunks(columns)
        .map(|row| {
            let mut line = String::new();
            for name in row {
                let _ = write!(line, "{:<column$}", name, column = column);
            }
            line.truncate(line.trim_end().len());
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::session::{Session, SessionConfig};
    use bumpalo::Bump;

    fn quiet(arena: &Bump) -> Session<'_> {
        Session::with_config(arena, SessionConfig { echo: false, ..SessionConfig::default() })
    }

    #[test]
    fn test_render_alternatives_and_declarations() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<expr> ::= <integer> '+' <expr> @ add");
        s.run_line("| <integer>");
        s.run_line("<calc> ::= <expr> @ show");

        let expr = s.lookup("expr").unwrap();
        assert_eq!(
            s.render(expr),
            vec!["<expr> ::= <integer> \"+\" <expr> @ add", "       | <integer>"]
        );
        let show = s.lookup("show").unwrap();
        assert_eq!(s.render(show), vec!["extern semantic semantic_show;"]);
        let integer = s.lookup("integer").unwrap();
        assert_eq!(s.render(integer), vec!["extern parse parse_integer;"]);
    }

    #[test]
    fn test_undefined_reference_renders_parse_declaration() {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        s.run_line("<a> ::= <b>");
        let b = s.lookup("b").unwrap();
        assert_eq!(s.render(b), vec!["extern parse parse_b;"]);
    }

    #[test]
    fn test_list_columns() {
        let arena = Bump::new();
        let s = Session::with_config(
            &arena,
            SessionConfig { echo: false, list_width: 30, ..SessionConfig::default() },
        );
        // longest built-in name is "identifier" (10), so 12 wide, 2 per row
        let rows = s.list();
        assert_eq!(rows[0], "bnf         ebnf");
        assert_eq!(rows[1], "xbnf        yacc");
        assert_eq!(rows.len(), 13);
        assert_eq!(rows[12], "eoln        empty");
    }
}
