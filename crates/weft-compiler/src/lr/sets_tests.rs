use weft_core::grammar::dsl::*;

use super::{FirstSets, TerminalSet};
use crate::lower::{Sym, lower};

#[test]
fn terminal_set_grows_and_iterates_in_order() {
    let mut set = TerminalSet::new(130);
    assert!(set.insert(129));
    assert!(set.insert(3));
    assert!(!set.insert(3));

    let mut other = TerminalSet::new(130);
    other.insert(64);
    assert!(set.union_with(&other));
    assert!(!set.union_with(&other));

    assert_eq!(set.iter().collect::<Vec<_>>(), [3, 64, 129]);
}

#[test]
fn first_sets_see_through_nullable_rules() {
    let grammar = GrammarBuilder::new("first")
        .rule("start", seq([sym("opt"), string("b")]))
        .rule("opt", optional(string("a")))
        .build();
    let lowered = lower(&grammar).unwrap();
    let first = FirstSets::compute(&lowered);
    let mut end = TerminalSet::new(first.slots());
    end.insert(0);

    // Slots: 0 end, 1 "b", 2 "a".
    let opt = first.sequence(&[Sym::Nonterminal(1)], &end);
    assert_eq!(opt.iter().collect::<Vec<_>>(), [0, 2]);

    let start = first.sequence(&[Sym::Nonterminal(0)], &end);
    assert_eq!(start.iter().collect::<Vec<_>>(), [1, 2]);

    let terminal_first = first.sequence(&[Sym::Terminal(0), Sym::Nonterminal(1)], &end);
    assert_eq!(terminal_first.iter().collect::<Vec<_>>(), [1]);
}
