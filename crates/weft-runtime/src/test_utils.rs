//! Fixture languages and helpers for runtime tests.

use std::ops::Range;

use weft_core::Grammar;
use weft_core::grammar::dsl::*;

use crate::{Edit, Language, Parser, Tree};

/// `name = expr;` statements over identifiers, numbers, sums, products and
/// parentheses. `_expression` is hidden, the statement list is a repeat.
pub fn statements_grammar() -> Grammar {
    GrammarBuilder::new("statements")
        .rule("program", repeat(sym("statement")))
        .rule(
            "statement",
            seq([sym("identifier"), string("="), sym("_expression"), string(";")]),
        )
        .rule(
            "_expression",
            choice([sym("identifier"), sym("number"), sym("binary"), sym("group")]),
        )
        .rule(
            "binary",
            choice([
                prec_left(1, seq([sym("_expression"), string("+"), sym("_expression")])),
                prec_left(2, seq([sym("_expression"), string("*"), sym("_expression")])),
            ]),
        )
        .rule("group", seq([string("("), sym("_expression"), string(")")]))
        .rule("identifier", pattern("[a-z_]+"))
        .rule("number", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .build()
}

/// A single `a + b` or `a * b` over a hidden operand rule.
pub fn operation_grammar() -> Grammar {
    GrammarBuilder::new("operation")
        .rule(
            "operation",
            seq([sym("_operand"), choice([string("+"), string("*")]), sym("_operand")]),
        )
        .rule("_operand", sym("identifier"))
        .rule("identifier", pattern("[a-z]+"))
        .extra(pattern(r"\s"))
        .build()
}

/// `ab` derivable as `left` or `right`; `dynamic` favors `right` at runtime.
pub fn ambiguous_grammar(dynamic: bool) -> Grammar {
    let right = seq([string("a"), string("b")]);
    let right = if dynamic { prec_dynamic(1, right) } else { right };
    GrammarBuilder::new("ambiguous")
        .rule("start", choice([sym("left"), sym("right")]))
        .rule("left", seq([string("a"), string("b")]))
        .rule("right", right)
        .conflict(["left", "right"])
        .build()
}

/// C-style statements where `a * b;` is both a pointer declaration and a
/// product. The fork opens at `*` and lives until `;` or `=` settles it.
pub fn declarations_grammar() -> Grammar {
    GrammarBuilder::new("declarations")
        .rule("program", repeat(sym("_statement")))
        .rule("_statement", choice([sym("declaration"), sym("expression_statement")]))
        .rule(
            "declaration",
            seq([
                sym("_type"),
                sym("identifier"),
                optional(seq([string("="), sym("_expression")])),
                string(";"),
            ]),
        )
        .rule("_type", choice([sym("type_name"), sym("pointer_type")]))
        .rule("pointer_type", seq([sym("_type"), string("*")]))
        .rule("type_name", sym("identifier"))
        .rule("expression_statement", seq([sym("_expression"), string(";")]))
        .rule("_expression", choice([sym("identifier"), sym("number"), sym("product")]))
        .rule(
            "product",
            prec_left(1, seq([sym("_expression"), string("*"), sym("_expression")])),
        )
        .rule("identifier", pattern("[a-z]+"))
        .rule("number", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .conflict(["type_name", "_expression"])
        .build()
}

pub fn load(grammar: &Grammar) -> Language {
    let bytes = weft_compiler::compile(grammar).expect("fixture grammar compiles");
    Language::from_bytes(bytes).expect("compiled table loads")
}

pub fn statements() -> Language {
    load(&statements_grammar())
}

pub fn operation() -> Language {
    load(&operation_grammar())
}

pub fn parse(language: &Language, text: &str) -> Tree {
    Parser::new(language.clone()).parse(text).expect("parse succeeds")
}

pub fn sexp(language: &Language, text: &str) -> String {
    parse(language, text).to_sexp()
}

/// Replaces `range` of `text` with `with`.
pub fn splice(text: &str, range: Range<usize>, with: &str) -> (String, Edit) {
    let mut edited = String::with_capacity(text.len() + with.len());
    edited.push_str(&text[..range.start]);
    edited.push_str(with);
    edited.push_str(&text[range.end..]);
    (edited, Edit::new(range, with.len()))
}

/// Whether the leaves of `tree` cover its text exactly, in order.
pub fn leaves_tile(tree: &Tree, text: &str) -> bool {
    let mut expected = 0;
    for (leaf, start) in tree.root().leaves() {
        if start != expected {
            return false;
        }
        expected += leaf.len();
    }
    expected == text.len() && tree.len() == text.len()
}
