//! End-to-end behavior of a session: meta grammars defining rules, parsing
//! with them, and executing the resulting bytecode.

use bumpalo::Bump;
use topdown_parser::{LineStatus, ParseFailure, Session, SessionConfig, Value, ValueKind};

fn quiet(arena: &Bump) -> Session<'_> {
    Session::with_config(arena, SessionConfig { echo: false, ..SessionConfig::default() })
}

/// Run each line, asserting it was accepted, and return the session output.
fn run_all(s: &mut Session<'_>, lines: &[&str]) -> Vec<String> {
    for line in lines {
        let status = s.run_line(line);
        assert_ne!(status, LineStatus::Rejected, "rejected: {}", line);
    }
    s.take_output()
}

fn rendered(s: &Session<'_>, name: &str) -> Vec<String> {
    s.render(s.lookup(name).expect("symbol exists"))
}

#[test]
fn test_sum_rule_builds_and_runs_bytecode() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<sum> ::= <integer> '+' <integer> @ add"]);

    let sum = s.lookup("sum").unwrap();
    let add = s.lookup("add").unwrap();
    let code = s.parse_line(sum, "3 + 4").unwrap();
    assert_eq!(
        code,
        vec![Value::Integer(3), Value::Integer(4), Value::Symbol(add), Value::Undefined]
    );
    assert_eq!(s.execute(&code, 64).unwrap(), vec![Value::Integer(7)]);

    let out = run_all(&mut s, &["? sum"]);
    assert_eq!(out, vec!["<sum> ::= <integer> \"+\" <integer> @ add"]);
}

#[test]
fn test_dialects_build_the_same_rule() {
    let scripts: [&[&str]; 3] = [
        &["!ebnf", "<list> ::= <integer> {<item>} [<tail>] @ f"],
        &["!xbnf", "<list> ::= <integer> <item*> <tail?> @ f"],
        &["!yacc", "list : integer item* tail? @ f", ";"],
    ];
    for script in scripts {
        let arena = Bump::new();
        let mut s = quiet(&arena);
        run_all(&mut s, script);
        assert_eq!(rendered(&s, "list"), vec!["<list> ::= <integer> <item*> <tail?> @ f"]);
    }

    let arena = Bump::new();
    let mut bnf = quiet(&arena);
    run_all(&mut bnf, &["<pair> ::= <integer> ',' <float>", "| <integer>"]);
    let arena = Bump::new();
    let mut yacc = quiet(&arena);
    run_all(&mut yacc, &["!yacc", "pair : integer ',' float", "| integer", ";"]);
    assert_eq!(rendered(&bnf, "pair"), rendered(&yacc, "pair"));
}

#[test]
fn test_one_or_many_needs_one_match() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["!xbnf", "<nums> ::= <integer+>"]);

    let nums = s.lookup("nums").unwrap();
    assert_eq!(
        s.parse_line(nums, "1 2 3").unwrap(),
        vec![Value::Integer(1), Value::Integer(2), Value::Integer(3), Value::Undefined]
    );
    assert_eq!(s.parse_line(nums, "5").unwrap(), vec![Value::Integer(5), Value::Undefined]);
    assert!(s.parse_line(nums, "").is_err());
}

#[test]
fn test_cut_commits_to_a_product() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<plain> ::= x y", "| x z", "<committed> ::= x <cut> y", "| x z"]);

    let plain = s.lookup("plain").unwrap();
    let committed = s.lookup("committed").unwrap();
    assert!(s.parse_line(plain, "x z").is_ok());
    assert!(s.parse_line(committed, "x z").is_err());
    assert!(s.parse_line(committed, "x y").is_ok());
}

#[test]
fn test_throw_aborts_the_parse() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<t> ::= a <throw>", "| a b", "!t"]);

    let t = s.lookup("t").unwrap();
    assert_eq!(s.parse_line(t, "a b"), Err(ParseFailure::Aborted { position: 1 }));

    assert_eq!(s.run_line("a b"), LineStatus::Rejected);
    assert_eq!(s.take_output(), vec!["a b", " ^- parse aborted"]);
}

#[test]
fn test_execute_runs_code_so_far() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(
        &mut s,
        &[
            "<show> ::= <integer> @ print",
            "<both> ::= <show> <execute> <show>",
            "<broken> ::= <show> <execute> never",
        ],
    );

    let out = run_all(&mut s, &["!both", "1 2"]);
    assert_eq!(out, vec!["1", "2"]);

    s.set_root(s.lookup("broken").unwrap());
    assert_eq!(s.run_line("5 oops"), LineStatus::Rejected);
    assert_eq!(s.take_output(), vec!["5", "5 oops", "  ^- \"never\" expected"]);
}

#[test]
fn test_undefined_symbol_is_reported_once() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<a> ::= <b>", "| <b>", "!a"]);

    assert_eq!(s.run_line("x"), LineStatus::Rejected);
    assert!(s.warning());
    assert_eq!(s.take_output(), vec!["<b>: undefined", "x", "^- <b> expected"]);
}

#[test]
fn test_unknown_semantic_warns_and_continues() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<g> ::= <integer> @ nothing_here", "!g"]);

    assert_eq!(s.run_line("5"), LineStatus::Executed);
    assert!(s.warning());
    assert_eq!(s.take_output(), vec!["nothing_here: undefined semantic"]);
}

#[test]
fn test_numeric_semantics() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(
        &mut s,
        &[
            "<scale> ::= <float> '*' <integer> @ mul",
            "<show> ::= <scale> @ print",
            "| <integer> '%' <integer> @ mod",
            "<kind> ::= <string> @ typeof",
        ],
    );

    let scale = s.lookup("scale").unwrap();
    let code = s.parse_line(scale, "1.5 * 2").unwrap();
    assert_eq!(s.execute(&code, 64).unwrap(), vec![Value::Float(3.0)]);

    let show = s.lookup("show").unwrap();
    s.set_root(show);
    let out = run_all(&mut s, &["0.5 * 3"]);
    assert_eq!(out, vec!["1.500000"]);

    let code = s.parse_line(show, "7 % 0").unwrap();
    assert_eq!(s.execute(&code, 64).unwrap(), vec![Value::Undefined]);

    let kind = s.lookup("kind").unwrap();
    let code = s.parse_line(kind, "'text'").unwrap();
    assert_eq!(s.execute(&code, 64).unwrap(), vec![Value::Type(ValueKind::String)]);
}

#[test]
fn test_trace_shows_terms() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["!xbnf", "<ab> ::= a <opt?>", "<opt> ::= b", "!ab"]);

    s.set_trace(true);
    let out = run_all(&mut s, &["a b"]);
    assert_eq!(out, vec!["  \"a\"", "  <opt?>", "    \"b\""]);
}

#[test]
fn test_compile_prints_frozen_grammar() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<greet> ::= hello <identifier> @ print"]);

    let out = run_all(&mut s, &["compile"]);
    assert_eq!(out, s.freeze().lines().collect::<Vec<_>>());
    assert_eq!(out[0], "// frozen grammar");
    assert_eq!(s.freeze(), s.freeze());
}

#[test]
fn test_list_starts_with_newest() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    run_all(&mut s, &["<zzz> ::= q"]);
    let out = run_all(&mut s, &["??"]);
    assert!(out[0].starts_with("zzz"), "{:?}", out);
}

#[test]
fn test_shell_requests_exit() {
    let arena = Bump::new();
    let mut s = quiet(&arena);
    assert_eq!(s.run_line("!shell"), LineStatus::Exit);
    assert!(s.exit_requested());
}
