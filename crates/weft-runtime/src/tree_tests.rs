use crate::test_utils::{leaves_tile, parse, statements};
use crate::tree::TreePrinter;

#[test]
fn sexp_hides_hidden_rules_and_extras() {
    let tree = parse(&statements(), "a = 1 + 2;");

    insta::assert_snapshot!(tree.to_sexp(), @r#"(program (statement (identifier) "=" (binary (number) "+" (number)) ";"))"#);
}

#[test]
fn positions_and_text() {
    let text = "a = 1 + 2;";
    let tree = parse(&statements(), text);
    let root = tree.root_node();
    let statement = root.child(0).unwrap();
    let binary = statement.child(2).unwrap();

    assert_eq!(root.byte_range(), 0..10);
    assert_eq!(statement.kind_name(), "statement");
    assert_eq!(statement.child_count(), 4);
    assert_eq!(binary.kind_name(), "binary");
    assert_eq!(binary.byte_range(), 4..9);
    assert_eq!(binary.text(text), "1 + 2");
    assert!(binary.is_named());
    assert!(!statement.child(1).unwrap().is_named());
}

#[test]
fn named_children_skip_anonymous_tokens() {
    let tree = parse(&statements(), "x = (y);");
    let statement = tree.root_node().child(0).unwrap();

    let kinds: Vec<_> = statement.named_children().map(|c| c.kind_name()).collect();

    assert_eq!(kinds, ["identifier", "group"]);
}

#[test]
fn range_overlaps() {
    let tree = parse(&statements(), "a = 1 + 2;");
    let binary = tree.root_node().child(0).unwrap().child(2).unwrap();

    assert!(binary.range_overlaps(8..12));
    assert!(binary.range_overlaps(4..4));
    assert!(!binary.range_overlaps(9..12));
    assert!(!binary.range_overlaps(9..9));
    assert!(!binary.range_overlaps(0..4));
}

#[test]
fn leaves_cover_text() {
    let text = "a = (1 + b) * 2;\n\nc = d;\n";
    let tree = parse(&statements(), text);

    assert!(leaves_tile(&tree, text));
    assert_eq!(tree.len(), text.len());
}

#[test]
fn cursor_walks_visible_nodes() {
    let tree = parse(&statements(), "a = 1 + 2;");
    let mut cursor = tree.walk();

    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind_name(), "statement");
    assert!(cursor.goto_first_child());
    assert_eq!(cursor.node().kind_name(), "identifier");
    assert!(cursor.goto_next_sibling());
    assert_eq!(cursor.node().kind_name(), "=");
    assert_eq!(cursor.depth(), 2);
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_next_sibling());
    assert!(cursor.goto_parent());
    assert!(!cursor.goto_parent());
    assert_eq!(cursor.node().kind_name(), "program");
}

#[test]
fn cursor_descends_by_byte() {
    let tree = parse(&statements(), "a = 1 + 2;");
    let mut cursor = tree.walk();

    assert_eq!(cursor.goto_first_child_for_byte(5), Some(0));
    assert_eq!(cursor.goto_first_child_for_byte(5), Some(2));
    assert_eq!(cursor.node().kind_name(), "binary");
    assert_eq!(cursor.goto_first_child_for_byte(20), None);

    cursor.reset();
    assert_eq!(cursor.depth(), 0);
}

#[test]
fn preorder() {
    let tree = parse(&statements(), "a = b;");

    let kinds: Vec<_> = tree.walk().preorder().map(|n| n.kind_name()).collect();

    assert_eq!(kinds, ["program", "statement", "identifier", "=", "identifier", ";"]);
}

#[test]
fn dump_with_spans_and_source() {
    let text = "a = 1 + 2;";
    let tree = parse(&statements(), text);

    let dump = TreePrinter::new(&tree).with_spans(true).with_source(text).dump();

    insta::assert_snapshot!(dump, @r#"
    program 0..10
      statement 0..10
        identifier 0..1 "a"
        "=" 2..3
        binary 4..9
          number 4..5 "1"
          "+" 6..7
          number 8..9 "2"
        ";" 9..10
    "#);
}

#[test]
fn raw_dump_shows_hidden_nodes() {
    let tree = parse(&statements(), "a=1;");

    let dump = TreePrinter::new(&tree).raw(true).dump();

    insta::assert_snapshot!(dump, @r#"
    program
      program_repeat1
        statement
          identifier
          "="
          _expression
            number
          ";"
    "#);
}

#[test]
fn equal_parses_are_equal_trees() {
    let language = statements();
    let first = parse(&language, "a = 1;\nb = a * 2;");
    let second = parse(&language, "a = 1;\nb = a * 2;");
    let other = parse(&language, "a = 1;\nb = a + 2;");

    assert_eq!(first, second);
    assert!(!crate::Node::ptr_eq(first.root(), second.root()));
    assert_ne!(first, other);
}

#[test]
fn long_lists_drop_without_overflow() {
    let text = "a = 1;\n".repeat(20_000);
    let tree = parse(&statements(), &text);

    assert_eq!(tree.root_node().child_count(), 20_000);
    assert!(tree.root().descendant_count() > 20_000);
    drop(tree);
}

#[test]
fn errors_lists_missing_nodes() {
    let text = "a = 1\nb = 2;";
    let tree = parse(&statements(), text);

    insta::assert_snapshot!(tree.to_sexp(), @r#"(program (statement (identifier) "=" (number) (MISSING ";")) (statement (identifier) "=" (number) ";"))"#);
    let errors = tree.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].is_missing());
    assert_eq!(errors[0].byte_range(), 6..6);
}
