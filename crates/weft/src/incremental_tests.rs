use std::collections::HashMap;
use std::sync::OnceLock;

use proptest::prelude::*;
use weft_core::{ProductionId, StateId};

use crate::test_utils::{config_grammar, expr_grammar, leaves_tile, load, parse, splice};
use crate::{
    CancellationFlag, Edit, Language, Node, ParseError, ParseOptions, Parser, Recovery,
    StatsTracer, SymbolId, Token, Tracer, Tree,
};

fn config() -> &'static Language {
    static LANGUAGE: OnceLock<Language> = OnceLock::new();
    LANGUAGE.get_or_init(|| load(&config_grammar()))
}

fn reparse(old: &Tree, edits: &[Edit], text: &str) -> (Tree, StatsTracer) {
    let mut stats = StatsTracer::new();
    let tree = Parser::new(old.language().clone())
        .reparse_with(old, edits, text, &mut stats)
        .unwrap();
    (tree, stats)
}

/// `count` settings, one per line, with distinct keys.
fn document(count: usize) -> String {
    let mut text = String::new();
    for i in 0..count {
        let key: String = format!("{i:04}")
            .bytes()
            .map(|d| char::from(b'a' + (d - b'0')))
            .collect();
        text.push_str(&format!("{key} = [{}, {key}];\n", i % 10));
    }
    text
}

/// Nodes of `new` that are not the very objects of `old`. Assumes the edit
/// kept every offset in place.
fn fresh_nodes(old: &Tree, new: &Tree) -> usize {
    let mut known: HashMap<(usize, SymbolId, usize), Vec<&Node>> = HashMap::new();
    let mut stack = vec![(old.root(), 0)];
    while let Some((node, start)) = stack.pop() {
        known.entry((start, node.kind(), node.len())).or_default().push(node);
        let mut offset = start;
        for child in node.children() {
            stack.push((child, offset));
            offset += child.len();
        }
    }

    let mut fresh = 0;
    let mut stack = vec![(new.root(), 0)];
    while let Some((node, start)) = stack.pop() {
        let shared = known
            .get(&(start, node.kind(), node.len()))
            .is_some_and(|nodes| nodes.iter().any(|n| Node::ptr_eq(n, node)));
        if shared {
            continue;
        }
        fresh += 1;
        let mut offset = start;
        for child in node.children() {
            stack.push((child, offset));
            offset += child.len();
        }
    }
    fresh
}

#[test]
fn operator_replacement_keeps_operand_leaves() {
    let language = load(&expr_grammar());
    let old = parse(&language, "a+b");
    assert_eq!(old.to_sexp(), r#"(expr (ident) "+" (ident))"#);
    assert_eq!(old.root_node().byte_range(), 0..3);

    let (tree, _) = reparse(&old, &[Edit::new(1..2, 1)], "a*b");

    assert_eq!(tree.to_sexp(), r#"(expr (ident) "*" (ident))"#);
    let old_root = old.root_node();
    let new_root = tree.root_node();
    for index in [0, 2] {
        let before = old_root.child(index).unwrap();
        let after = new_root.child(index).unwrap();
        assert!(Node::ptr_eq(before.raw(), after.raw()));
    }
}

#[test]
fn parsing_is_idempotent() {
    let text = document(50);

    assert_eq!(parse(config(), &text), parse(config(), &text));
}

#[test]
fn one_byte_edit_builds_few_nodes() {
    let text = document(2000);
    let old = parse(config(), &text);
    let at = text.len() - 10;
    assert!(text.as_bytes()[at].is_ascii_digit());
    let (new_text, edit) = splice(&text, at..at + 1, "7");

    let (tree, stats) = reparse(&old, &[edit], &new_text);

    assert_eq!(tree, parse(config(), &new_text));
    assert!(old.root().descendant_count() > 20_000);
    assert!(fresh_nodes(&old, &tree) < 32);
    assert!(stats.stats.reused_bytes > text.len() - 64);
}

#[test]
fn chained_reparses_stay_equal_to_fresh_parses() {
    let text = document(20);
    let mut tree = parse(config(), &text);
    let mut current = text.clone();
    let steps = [(5, 5, "[1, 2]"), (40, 44, ""), (0, 0, "x = 9;\n"), (30, 31, "]]")];

    for (start, end, with) in steps {
        let (next, edit) = splice(&current, start..end, with);
        tree = reparse(&tree, &[edit], &next).0;
        current = next;
        assert_eq!(tree, parse(config(), &current));
        assert!(leaves_tile(&tree, &current));
    }
}

#[test]
fn leaves_tile_edge_inputs() {
    let deep = format!("a = {}1{};", "[".repeat(300), "]".repeat(300));
    for text in ["", "#", "\u{E9}", " \n ", deep.as_str()] {
        let tree = parse(config(), text);

        assert!(leaves_tile(&tree, text), "{text:?}");
        assert_eq!(tree.len(), text.len());
    }
    assert!(!parse(config(), &deep).root().has_error());
}

#[test]
fn recovery_finishes_within_linear_fuel() {
    let inputs = [
        "]".repeat(400),
        "[".repeat(400),
        "= ; , ".repeat(100),
        "a = [1, ; b = ]]; ".repeat(40),
        "#$%^&*".repeat(60),
        format!("a = {};", "[1,".repeat(150)),
    ];
    for text in &inputs {
        let fuel = 64 * (text.len() as u64 + 1);
        let options = ParseOptions::new().exec_fuel(fuel);

        let tree = Parser::with_options(config().clone(), options).parse(text).unwrap();

        assert!(tree.root().has_error(), "{text:?}");
        assert!(leaves_tile(&tree, text), "{text:?}");
    }
}

#[test]
fn reparse_rejects_tree_of_another_language() {
    let tree = parse(config(), "a = 1;");
    let other = load(&config_grammar());

    let err = Parser::new(other).reparse(&tree, &[], "a = 1;").unwrap_err();

    assert!(matches!(err, ParseError::LanguageMismatch { .. }));
}

/// Cancels its flag on the first shift.
struct CancelOnShift(CancellationFlag);

impl Tracer for CancelOnShift {
    fn trace_lex(&mut self, _token: &Token) {}

    fn trace_shift(&mut self, _kind: SymbolId, _state: StateId) {
        self.0.cancel();
    }

    fn trace_extra(&mut self, _kind: SymbolId) {}
    fn trace_reduce(
        &mut self,
        _production: ProductionId,
        _lhs: SymbolId,
        _child_count: usize,
        _state: StateId,
    ) {
    }
    fn trace_fork(&mut self, _state: StateId, _kind: SymbolId, _count: usize) {}
    fn trace_merge(&mut self, _remaining: usize) {}
    fn trace_reuse(&mut self, _kind: SymbolId, _start: usize, _len: usize) {}
    fn trace_reuse_leaf(&mut self, _kind: SymbolId, _start: usize) {}
    fn trace_recover(&mut self, _at: usize, _recovery: Recovery) {}
    fn trace_accept(&mut self) {}
}

#[test]
fn cancellation_stops_a_running_parse() {
    let flag = CancellationFlag::new();
    let parser = Parser::builder(config().clone()).cancellation(flag.clone()).build();
    let mut tracer = CancelOnShift(flag);

    let err = parser.parse_with(&document(10), &mut tracer).unwrap_err();

    assert_eq!(err, ParseError::Cancelled);
}

fn config_text() -> impl Strategy<Value = String> {
    let setting = "[a-c] = (\\[[0-9a-c](, [0-9])?\\]|[0-9]);\n";
    prop::collection::vec(setting, 0..6).prop_map(|s| s.concat())
}

fn edit_of(text: &str, start: prop::sample::Index, len: usize, insert: &str) -> (String, Edit) {
    let start = start.index(text.len() + 1);
    let end = (start + len).min(text.len());
    splice(text, start..end, insert)
}

proptest! {
    #[test]
    fn two_successive_edits_match_fresh_parse(
        text in config_text(),
        first in (any::<prop::sample::Index>(), 0usize..6, "[ab1,=;\\[\\] \n]{0,5}"),
        second in (any::<prop::sample::Index>(), 0usize..6, "[ab1,=;\\[\\] \n]{0,5}"),
    ) {
        let old = parse(config(), &text);
        let (middle, edit) = edit_of(&text, first.0, first.1, &first.2);
        let (tree, _) = reparse(&old, &[edit], &middle);
        prop_assert_eq!(&tree, &parse(config(), &middle));

        let (last, edit) = edit_of(&middle, second.0, second.1, &second.2);
        let (tree, _) = reparse(&tree, &[edit], &last);
        prop_assert_eq!(&tree, &parse(config(), &last));
        prop_assert!(leaves_tile(&tree, &last));
    }
}
