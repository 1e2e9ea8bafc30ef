//! Terminal sets and FIRST sets.

use crate::lower::{LoweredGrammar, Sym};

/// Bitset over terminal slots: slot 0 is end of input, slot `t + 1` is
/// terminal `t`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TerminalSet(Vec<u64>);

impl TerminalSet {
    pub fn new(slots: usize) -> Self {
        Self(vec![0; slots.div_ceil(64)])
    }

    pub fn insert(&mut self, slot: usize) -> bool {
        let (word, bit) = (slot / 64, 1u64 << (slot % 64));
        let added = self.0[word] & bit == 0;
        self.0[word] |= bit;
        added
    }

    /// Returns true when `self` grew.
    pub fn union_with(&mut self, other: &TerminalSet) -> bool {
        let mut changed = false;
        for (a, b) in self.0.iter_mut().zip(&other.0) {
            let merged = *a | *b;
            changed |= merged != *a;
            *a = merged;
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().enumerate().flat_map(|(i, &word)| {
            (0..64).filter(move |bit| word & (1u64 << bit) != 0).map(move |bit| i * 64 + bit)
        })
    }
}

pub struct FirstSets {
    slots: usize,
    first: Vec<TerminalSet>,
    nullable: Vec<bool>,
}

impl FirstSets {
    pub fn compute(grammar: &LoweredGrammar) -> Self {
        let slots = grammar.terminals.len() + 1;
        let count = grammar.nonterminals.len();
        let mut sets = Self {
            slots,
            first: vec![TerminalSet::new(slots); count],
            nullable: vec![false; count],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for production in &grammar.productions {
                let lhs = production.lhs;
                let mut all_nullable = true;
                for &sym in &production.alternative.symbols {
                    match sym {
                        Sym::Terminal(t) => {
                            changed |= sets.first[lhs].insert(t + 1);
                            all_nullable = false;
                        }
                        Sym::Nonterminal(n) => {
                            if n != lhs {
                                let other = sets.first[n].clone();
                                changed |= sets.first[lhs].union_with(&other);
                            }
                            if !sets.nullable[n] {
                                all_nullable = false;
                            }
                        }
                    }
                    if !all_nullable {
                        break;
                    }
                }
                if all_nullable && !sets.nullable[lhs] {
                    sets.nullable[lhs] = true;
                    changed = true;
                }
            }
        }
        sets
    }

    pub fn slots(&self) -> usize {
        self.slots
    }

    /// FIRST of `symbols` followed by any of `follow`.
    pub fn sequence(&self, symbols: &[Sym], follow: &TerminalSet) -> TerminalSet {
        let mut out = TerminalSet::new(self.slots);
        for &sym in symbols {
            match sym {
                Sym::Terminal(t) => {
                    out.insert(t + 1);
                    return out;
                }
                Sym::Nonterminal(n) => {
                    out.union_with(&self.first[n]);
                    if !self.nullable[n] {
                        return out;
                    }
                }
            }
        }
        out.union_with(follow);
        out
    }
}
