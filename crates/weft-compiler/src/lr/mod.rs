//! Canonical LR(1) automaton.
//!
//! States are sets of LR(1) items keyed by their kernel, so two states are
//! the same exactly when their kernels (items and lookaheads) coincide. The
//! start state holds the augmented item `start' -> . start` with end of
//! input as lookahead; the augmented production itself is never emitted.

mod conflicts;
mod sets;

#[cfg(test)]
mod lr_tests;
#[cfg(test)]
mod sets_tests;

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use weft_core::StateId;
use weft_table::Action;

use crate::error::{CompileError, CompileResult};
use crate::lower::{LoweredGrammar, Sym};

pub use sets::{FirstSets, TerminalSet};

/// `(production, dot)`.
type Item = (usize, usize);
/// Items with their lookahead sets.
type ItemSet = BTreeMap<Item, TerminalSet>;

#[derive(Debug, Default)]
pub struct LrState {
    /// Actions keyed by terminal slot (0 is end of input, `t + 1` is
    /// terminal `t`). More than one action is a GLR fork.
    pub actions: BTreeMap<usize, Vec<Action>>,
    /// Targets keyed by nonterminal index.
    pub gotos: BTreeMap<usize, usize>,
}

#[derive(Debug)]
pub struct LrAutomaton {
    pub states: Vec<LrState>,
}

struct Builder<'g> {
    grammar: &'g LoweredGrammar,
    first: FirstSets,
    /// Productions per nonterminal.
    by_lhs: Vec<Vec<usize>>,
    augmented: usize,
    augmented_rhs: [Sym; 1],
}

pub fn build(grammar: &LoweredGrammar) -> CompileResult<LrAutomaton> {
    if grammar.productions.len() >= u16::MAX as usize {
        return Err(CompileError::TooManyAlternatives(grammar.name.clone()));
    }

    let mut by_lhs = vec![Vec::new(); grammar.nonterminals.len()];
    for (p, production) in grammar.productions.iter().enumerate() {
        by_lhs[production.lhs].push(p);
    }
    let builder = Builder {
        grammar,
        first: FirstSets::compute(grammar),
        by_lhs,
        augmented: grammar.productions.len(),
        augmented_rhs: [Sym::Nonterminal(0)],
    };
    let slots = builder.first.slots();

    let mut kernels: IndexSet<ItemSet> = IndexSet::new();
    let mut end = TerminalSet::new(slots);
    end.insert(0);
    kernels.insert(BTreeMap::from([((builder.augmented, 0), end)]));

    let mut states = Vec::new();
    while let Some(kernel) = kernels.get_index(states.len()).cloned() {
        let index = states.len();
        let items = builder.closure(&kernel);

        let mut successors: BTreeMap<Sym, ItemSet> = BTreeMap::new();
        let mut reduces: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut accept = false;
        for (&(p, dot), lookahead) in &items {
            if let Some(&sym) = builder.rhs(p).get(dot) {
                successors
                    .entry(sym)
                    .or_default()
                    .entry((p, dot + 1))
                    .or_insert_with(|| TerminalSet::new(slots))
                    .union_with(lookahead);
            } else if p == builder.augmented {
                accept = true;
            } else {
                for slot in lookahead.iter() {
                    reduces.entry(slot).or_default().push(p);
                }
            }
        }

        let mut state = LrState::default();
        let mut shifts: BTreeMap<usize, usize> = BTreeMap::new();
        for (sym, successor) in successors {
            let (target, _) = kernels.insert_full(successor);
            if target >= u16::MAX as usize {
                return Err(CompileError::TooManyStates(target + 1));
            }
            match sym {
                Sym::Terminal(t) => {
                    shifts.insert(t + 1, target);
                }
                Sym::Nonterminal(n) => {
                    state.gotos.insert(n, target);
                }
            }
        }

        if accept {
            state.actions.insert(0, vec![Action::Accept]);
        }
        let slots_with_actions: BTreeSet<usize> =
            shifts.keys().chain(reduces.keys()).copied().collect();
        for slot in slots_with_actions {
            if accept && slot == 0 {
                continue;
            }
            let shift = shifts.get(&slot).copied();
            let candidates = reduces.get(&slot).map(Vec::as_slice).unwrap_or_default();
            let actions = builder.resolve(index, slot, shift, candidates, &items)?;
            if !actions.is_empty() {
                state.actions.insert(slot, actions);
            }
        }

        states.push(state);
    }

    tracing::debug!(states = states.len(), "built LR(1) automaton");
    Ok(LrAutomaton { states })
}

impl Builder<'_> {
    fn rhs(&self, production: usize) -> &[Sym] {
        if production == self.augmented {
            &self.augmented_rhs
        } else {
            &self.grammar.productions[production].alternative.symbols
        }
    }

    fn closure(&self, kernel: &ItemSet) -> ItemSet {
        let mut items = kernel.clone();
        let mut work: Vec<Item> = items.keys().copied().collect();

        while let Some(item @ (p, dot)) = work.pop() {
            let rhs = self.rhs(p);
            let Some(&Sym::Nonterminal(n)) = rhs.get(dot) else {
                continue;
            };
            let follow = self.first.sequence(&rhs[dot + 1..], &items[&item]);
            for &q in &self.by_lhs[n] {
                let entry = items
                    .entry((q, 0))
                    .or_insert_with(|| TerminalSet::new(self.first.slots()));
                if entry.union_with(&follow) {
                    work.push((q, 0));
                }
            }
        }
        items
    }

    fn slot_name(&self, slot: usize) -> String {
        if slot == 0 {
            "end".to_owned()
        } else {
            let terminal = &self.grammar.terminals[slot - 1];
            if terminal.named {
                terminal.name.clone()
            } else {
                format!("{:?}", terminal.name)
            }
        }
    }
}

/// Table action for a shift to `target`.
pub(crate) fn shift(target: usize) -> Action {
    Action::Shift(StateId(target as u16))
}
