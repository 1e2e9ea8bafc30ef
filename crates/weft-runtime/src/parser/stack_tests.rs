use weft_core::{LexModeId, StateId, SymbolId};

use super::stack::Stack;
use crate::tree::{Node, NodeFlags};

fn token(kind: u16, len: usize) -> Node {
    Node::leaf(SymbolId(kind), len, 0, LexModeId(1), NodeFlags::default())
}

fn space() -> Node {
    Node::leaf(SymbolId(9), 1, 0, LexModeId(1), NodeFlags::EXTRA)
}

fn kinds(nodes: &[Node]) -> Vec<u16> {
    nodes.iter().map(|n| n.kind().0).collect()
}

#[test]
fn pop_collects_interior_extras() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let s = stack.push(a, StateId(1), space(), true, false);
    let b = stack.push(s, StateId(2), token(2, 1), false, false);

    let popped = stack.pop(b, 2);

    assert_eq!(popped.base, bottom);
    assert_eq!(kinds(&popped.children), [1, 9, 2]);
    assert!(popped.trailing.is_empty());
}

#[test]
fn pop_sets_trailing_extras_aside() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let s1 = stack.push(a, StateId(1), space(), true, false);
    let s2 = stack.push(s1, StateId(1), space(), true, false);

    let popped = stack.pop(s2, 1);

    assert_eq!(popped.base, bottom);
    assert_eq!(kinds(&popped.children), [1]);
    assert_eq!(popped.trailing.len(), 2);
}

#[test]
fn pop_nothing_keeps_head() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let s = stack.push(a, StateId(1), space(), true, false);

    let popped = stack.pop(s, 0);

    assert_eq!(popped.base, s);
    assert!(popped.children.is_empty());
    assert!(popped.trailing.is_empty());
}

#[test]
fn pop_reports_fragile_entries() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, true);
    let b = stack.push(a, StateId(2), token(2, 1), false, false);

    assert!(stack.pop(b, 2).fragile);
    assert!(!stack.pop(b, 1).fragile);
}

#[test]
fn versions_share_entries_below_fork() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let left = stack.push(a, StateId(2), token(2, 1), false, false);
    let right = stack.push(a, StateId(3), token(3, 1), false, false);

    assert_eq!(stack.len(), 4);
    assert_eq!(stack.states(left), [StateId(2), StateId(1), StateId::START]);
    assert_eq!(stack.states(right), [StateId(3), StateId(1), StateId::START]);
    assert_eq!(kinds(&stack.nodes_above(right, bottom)), [1, 3]);
}

#[test]
fn same_states_compares_below_the_fork() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let left = stack.push(a, StateId(2), token(2, 1), false, false);
    let right = stack.push(a, StateId(2), token(3, 1), false, false);
    let spaced = stack.push(right, StateId(2), space(), true, false);
    let other = stack.push(a, StateId(3), token(3, 1), false, false);
    let b = stack.push(bottom, StateId(4), token(1, 1), false, false);
    let deeper = stack.push(b, StateId(2), token(2, 1), false, false);

    assert!(stack.same_states(left, right));
    assert!(stack.same_states(left, spaced));
    assert!(!stack.same_states(left, other));
    assert!(!stack.same_states(left, deeper));
    assert!(stack.same_states(bottom, bottom));
}

#[test]
#[should_panic(expected = "popped 1 of 2 entries")]
fn pop_past_bottom_panics() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);

    stack.pop(a, 2);
}

#[test]
fn states_skip_extras() {
    let (mut stack, bottom) = Stack::new();
    let a = stack.push(bottom, StateId(1), token(1, 1), false, false);
    let s = stack.push(a, StateId(1), space(), true, false);

    assert_eq!(stack.states(s), [StateId(1), StateId::START]);
    let nodes = stack.nodes(s);
    assert_eq!(nodes.len(), 2);
    assert!(nodes[1].1);
    assert_eq!(stack.ancestors(s).count(), 3);
}
