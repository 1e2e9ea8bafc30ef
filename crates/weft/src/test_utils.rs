use std::ops::Range;

use crate::dsl::*;
use crate::{Edit, Grammar, Language, Parser, Tree};

/// `ident + ident` or `ident * ident`, no extras.
pub fn expr_grammar() -> Grammar {
    GrammarBuilder::new("expr")
        .rule(
            "expr",
            seq([sym("ident"), choice([string("+"), string("*")]), sym("ident")]),
        )
        .rule("ident", pattern("[a-z]+"))
        .build()
}

/// Lines of `name = value;` where values nest in brackets.
pub fn config_grammar() -> Grammar {
    GrammarBuilder::new("config")
        .rule("document", repeat(sym("setting")))
        .rule(
            "setting",
            seq([sym("key"), string("="), sym("_value"), string(";")]),
        )
        .rule("_value", choice([sym("key"), sym("number"), sym("list")]))
        .rule(
            "list",
            seq([string("["), sep_by(string(","), sym("_value")), string("]")]),
        )
        .rule("key", pattern("[a-z]+"))
        .rule("number", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .build()
}

pub fn load(grammar: &Grammar) -> Language {
    crate::language(grammar).expect("fixture grammar compiles")
}

pub fn parse(language: &Language, text: &str) -> Tree {
    Parser::new(language.clone()).parse(text).expect("parse succeeds")
}

pub fn splice(text: &str, range: Range<usize>, with: &str) -> (String, Edit) {
    let mut edited = String::with_capacity(text.len() + with.len());
    edited.push_str(&text[..range.start]);
    edited.push_str(with);
    edited.push_str(&text[range.end..]);
    (edited, Edit::new(range, with.len()))
}

/// Whether the leaves of `tree` cover `text` exactly, in order.
pub fn leaves_tile(tree: &Tree, text: &str) -> bool {
    let mut expected = 0;
    for (leaf, start) in tree.root().leaves() {
        if start != expected {
            return false;
        }
        expected += leaf.len();
    }
    expected == text.len() && tree.root_node().byte_range() == (0..text.len())
}
