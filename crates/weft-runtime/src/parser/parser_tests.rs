use indoc::indoc;
use weft_core::{LexModeId, LexStateId, ProductionId, StateId, SymbolId};
use weft_table::{
    Action, LexStateData, ProductionData, StateData, SymbolData, SymbolFlags, TableData,
};

use crate::error::{EditError, ParseError};
use crate::options::{CancellationFlag, ConflictPolicy, ParseOptions};
use crate::test_utils::{
    ambiguous_grammar, declarations_grammar, leaves_tile, load, parse, sexp, statements,
    statements_grammar,
};
use crate::{Edit, Language, Parser};

#[test]
fn precedence_and_associativity() {
    let language = statements();

    insta::assert_snapshot!(sexp(&language, "a = 1 + 2 * 3;"), @r#"(program (statement (identifier) "=" (binary (number) "+" (binary (number) "*" (number))) ";"))"#);
    insta::assert_snapshot!(sexp(&language, "a = 1 + 2 + 3;"), @r#"(program (statement (identifier) "=" (binary (binary (number) "+" (number)) "+" (number)) ";"))"#);
}

#[test]
fn groups_override_precedence() {
    insta::assert_snapshot!(sexp(&statements(), "a = (1 + 2) * 3;"), @r#"(program (statement (identifier) "=" (binary (group "(" (binary (number) "+" (number)) ")") "*" (number)) ";"))"#);
}

#[test]
fn several_statements_with_layout() {
    let text = indoc! {"
        total = base * 2;

        rest = (total + 1);
    "};
    let tree = parse(&statements(), text);

    insta::assert_snapshot!(tree.to_sexp(), @r#"(program (statement (identifier) "=" (binary (identifier) "*" (number)) ";") (statement (identifier) "=" (group "(" (binary (identifier) "+" (number)) ")") ";"))"#);
    assert!(!tree.root().has_error());
    assert!(leaves_tile(&tree, text));
}

#[test]
fn empty_input() {
    let tree = parse(&statements(), "");

    assert_eq!(tree.to_sexp(), "(program)");
    assert!(tree.is_empty());
}

#[test]
fn only_extras() {
    let tree = parse(&statements(), "  \n ");

    assert_eq!(tree.to_sexp(), "(program)");
    assert_eq!(tree.len(), 4);
    assert!(!tree.root().has_error());
}

#[test]
fn ambiguity_resolved_by_first_declared_action() {
    let language = load(&ambiguous_grammar(false));

    assert_eq!(sexp(&language, "ab"), r#"(start (left "a" "b"))"#);
}

#[test]
fn ambiguity_resolved_by_last_declared_action() {
    let language = load(&ambiguous_grammar(false));
    let options = ParseOptions::new().conflict_policy(ConflictPolicy::LastDeclared);

    let tree = Parser::with_options(language, options).parse("ab").unwrap();

    assert_eq!(tree.to_sexp(), r#"(start (right "a" "b"))"#);
}

#[test]
fn dynamic_precedence_beats_declaration_order() {
    let language = load(&ambiguous_grammar(true));

    assert_eq!(sexp(&language, "ab"), r#"(start (right "a" "b"))"#);
}

#[test]
fn single_version_limit_still_parses() {
    let language = load(&ambiguous_grammar(false));
    let options = ParseOptions::new().max_versions(1);

    let tree = Parser::with_options(language, options).parse("ab").unwrap();

    assert!(!tree.root().has_error());
    assert_eq!(tree.len(), 2);
}

#[test]
fn ambiguous_nodes_are_fragile() {
    let language = load(&ambiguous_grammar(false));
    let tree = parse(&language, "ab");

    let left = &tree.root().children()[0];
    assert!(left.is_fragile());
}

#[test]
fn fork_spanning_several_tokens_settled_by_initializer() {
    let language = load(&declarations_grammar());

    insta::assert_snapshot!(sexp(&language, "a * b = c;"), @r#"(program (declaration (pointer_type (type_name (identifier)) "*") (identifier) "=" (identifier) ";"))"#);
    insta::assert_snapshot!(sexp(&language, "a * b * c;"), @r#"(program (expression_statement (product (product (identifier) "*" (identifier)) "*" (identifier)) ";"))"#);
}

#[test]
fn fork_spanning_several_tokens_left_ambiguous() {
    let language = load(&declarations_grammar());
    let text = "a * b;\nb c;\nd e;";
    let tree = parse(&language, text);

    let fragile: Vec<bool> = tree
        .root_node()
        .children()
        .map(|c| c.raw().is_fragile())
        .collect();
    assert!(!tree.root().has_error());
    assert!(leaves_tile(&tree, text));
    // Versions merge on the shift of `b`, which is itself fragile.
    assert_eq!(fragile, [true, true, false]);
}

#[test]
fn fuel_exhaustion() {
    let options = ParseOptions::new().exec_fuel(5);

    let err = Parser::with_options(statements(), options).parse("a = 1;").unwrap_err();

    assert_eq!(err, ParseError::FuelExhausted);
}

#[test]
fn enough_fuel_succeeds() {
    let options = ParseOptions::new().exec_fuel(10_000);

    let tree = Parser::with_options(statements(), options).parse("a = 1;").unwrap();

    assert!(!tree.root().has_error());
}

#[test]
fn cancelled_before_start() {
    let flag = CancellationFlag::new();
    let options = ParseOptions::new().cancellation(flag.clone());
    flag.cancel();

    let err = Parser::with_options(statements(), options).parse("a = 1;").unwrap_err();

    assert_eq!(err, ParseError::Cancelled);
}

#[test]
fn reparse_rejects_other_language() {
    let first = statements();
    let second = load(&statements_grammar());
    let tree = parse(&first, "a = 1;");

    let err = Parser::new(second).reparse(&tree, &[], "a = 1;").unwrap_err();

    assert!(matches!(err, ParseError::LanguageMismatch { .. }));
}

#[test]
fn reparse_rejects_malformed_edits() {
    let language = statements();
    let tree = parse(&language, "a = 1;");

    let err = Parser::new(language)
        .reparse(&tree, &[Edit::insert(2, 3)], "a = 12;")
        .unwrap_err();

    assert_eq!(
        err,
        ParseError::MalformedEdit(EditError::LengthMismatch { expected: 9, found: 7 })
    );
}

#[test]
fn reparse_without_reuse_parses_from_scratch() {
    let language = statements();
    let old = parse(&language, "a = 1;");
    let parser = Parser::with_options(language.clone(), ParseOptions::new().reuse(false));

    let tree = parser.reparse(&old, &[Edit::new(4..5, 2)], "a = 12;").unwrap();

    assert_eq!(tree, parse(&language, "a = 12;"));
    assert!(!crate::Node::ptr_eq(tree.root(), old.root()));
}

#[test]
fn parser_accessors() {
    let language = statements();
    let parser = Parser::with_options(language.clone(), ParseOptions::new().max_versions(0));

    assert_eq!(parser.language().name(), "statements");
    assert_eq!(parser.options().get_max_versions(), 1);
    assert_eq!(parser.options().get_exec_fuel(), None);
    assert_eq!(parser.options().get_conflict_policy(), ConflictPolicy::FirstDeclared);
}

#[test]
fn builder_sets_options() {
    let flag = CancellationFlag::new();
    let parser = Parser::builder(statements())
        .exec_fuel(500)
        .max_versions(2)
        .conflict_policy(ConflictPolicy::LastDeclared)
        .cancellation(flag)
        .reuse(false)
        .build();

    assert_eq!(parser.options().get_exec_fuel(), Some(500));
    assert_eq!(parser.options().get_max_versions(), 2);
    assert_eq!(parser.options().get_conflict_policy(), ConflictPolicy::LastDeclared);
    assert!(parser.parse("a = 1;").is_ok());
}

/// `pair: "a"` whose start state lacks the goto on `pair`.
fn table_without_goto() -> TableData {
    let term = SymbolFlags::TERMINAL;
    TableData {
        name: "broken".into(),
        symbols: vec![
            SymbolData {
                name: "end".into(),
                flags: term,
            },
            SymbolData {
                name: "a".into(),
                flags: term | SymbolFlags::VISIBLE | SymbolFlags::LITERAL,
            },
            SymbolData {
                name: "pair".into(),
                flags: SymbolFlags::NAMED | SymbolFlags::VISIBLE,
            },
        ],
        terminal_count: 2,
        start_symbol: SymbolId(2),
        productions: vec![ProductionData {
            lhs: SymbolId(2),
            rhs_len: 1,
            precedence: 0,
            dynamic_precedence: 0,
        }],
        states: vec![
            StateData {
                lex_mode: LexModeId(1),
                entries: vec![(SymbolId(1), vec![Action::Shift(StateId(1))])],
            },
            StateData {
                lex_mode: LexModeId(2),
                entries: vec![(SymbolId::END, vec![Action::Reduce(ProductionId(0))])],
            },
        ],
        lex_modes: vec![vec![SymbolId(1)], vec![SymbolId(1)], vec![]],
        lex_states: vec![
            LexStateData {
                transitions: vec![(b'a', b'a', LexStateId(1))],
                accepts: vec![],
            },
            LexStateData {
                transitions: vec![],
                accepts: vec![SymbolId(1)],
            },
        ],
    }
}

#[test]
#[should_panic(expected = "no goto on `pair` from state 0")]
fn missing_goto_after_reduce_panics() {
    let bytes = weft_table::write(&table_without_goto()).unwrap();
    let language = Language::from_bytes(bytes).unwrap();

    let _ = Parser::new(language).parse("a");
}
