use weft_core::grammar::dsl::*;
use weft_core::{Grammar, SymbolId};
use weft_table::{Action, TableData};

use crate::error::CompileError;
use crate::test_utils::{ambiguous_grammar, arith_grammar, reductions, symbol};
use crate::build_table;

fn tokens(data: &TableData, text: &str) -> Vec<SymbolId> {
    text.chars()
        .map(|c| match c {
            '0'..='9' => symbol(data, "number"),
            other => symbol(data, &other.to_string()),
        })
        .collect()
}

fn reduce_order(grammar: &Grammar, text: &str) -> Vec<u16> {
    let data = build_table(grammar).unwrap();
    reductions(&data, &tokens(&data, text)).unwrap()
}

#[test]
fn precedence_orders_reductions() {
    let arith = arith_grammar();

    // P0 number, P1 sum, P2 product, P3 parens.
    assert_eq!(reduce_order(&arith, "1+2*3"), [0, 0, 0, 2, 1]);
    assert_eq!(reduce_order(&arith, "1*2+3"), [0, 0, 2, 0, 1]);
    assert_eq!(reduce_order(&arith, "1+2+3"), [0, 0, 1, 0, 1]);
    assert_eq!(reduce_order(&arith, "(1+2)*3"), [0, 0, 1, 3, 0, 2]);
}

#[test]
fn right_associativity_shifts() {
    let grammar = GrammarBuilder::new("pow")
        .rule(
            "expr",
            choice([
                sym("number"),
                prec_right(1, seq([sym("expr"), string("^"), sym("expr")])),
            ]),
        )
        .rule("number", pattern(r"\d"))
        .build();

    assert_eq!(reduce_order(&grammar, "1^2^3"), [0, 0, 0, 1, 1]);
}

#[test]
fn syntax_errors_have_no_action() {
    let data = build_table(&arith_grammar()).unwrap();
    assert_eq!(reductions(&data, &tokens(&data, "1+")), None);
    assert_eq!(reductions(&data, &tokens(&data, "(1")), None);
}

#[test]
fn nullable_start_accepts_empty_input() {
    let grammar = GrammarBuilder::new("list")
        .rule("list", repeat(string("a")))
        .build();

    // P0 helper -> helper "a", P1 helper -> "a", P2 list -> <empty>, P3 list -> helper.
    assert_eq!(reduce_order(&grammar, ""), [2]);
    assert_eq!(reduce_order(&grammar, "aa"), [1, 0, 3]);
}

#[test]
fn unresolved_conflict_is_reported() {
    let grammar = GrammarBuilder::new("sum")
        .rule(
            "expr",
            choice([sym("number"), seq([sym("expr"), string("+"), sym("expr")])]),
        )
        .rule("number", pattern(r"\d"))
        .build();

    let err = build_table(&grammar).unwrap_err();
    let CompileError::Conflict {
        symbol,
        description,
        ..
    } = err
    else {
        panic!("expected a conflict, got {err:?}");
    };
    assert_eq!(symbol, r#""+""#);
    assert_eq!(description, r#"shift or reduce `expr -> expr "+" expr`"#);
}

#[test]
fn declared_conflict_becomes_fork() {
    let data = build_table(&ambiguous_grammar(true)).unwrap();

    let forks: Vec<_> = data
        .states
        .iter()
        .flat_map(|s| &s.entries)
        .filter(|(_, actions)| actions.len() > 1)
        .collect();
    assert_eq!(forks.len(), 1);
    let (on, actions) = forks[0];
    assert_eq!(*on, SymbolId::END);
    assert!(actions.iter().all(|a| matches!(a, Action::Reduce(_))));
}

#[test]
fn undeclared_reduce_conflict_is_reported() {
    let err = build_table(&ambiguous_grammar(false)).unwrap_err();
    insta::assert_snapshot!(err, @r#"unresolved conflict in state 5 on end: reduce `left -> "a" "b"` or reduce `right -> "a" "b"`"#);
}

#[test]
fn dynamic_precedence_reaches_productions() {
    let grammar = GrammarBuilder::new("dyn")
        .rule(
            "start",
            choice([prec_dynamic(3, seq([string("x")])), seq([string("y")])]),
        )
        .build();
    let data = build_table(&grammar).unwrap();

    assert_eq!(data.productions[0].dynamic_precedence, 3);
    assert_eq!(data.productions[1].dynamic_precedence, 0);
}
