//! Shift/reduce and reduce/reduce resolution.
//!
//! Precedence decides first, associativity breaks precedence ties between a
//! shift and a single reduce. Whatever remains is either kept as a GLR fork
//! (when one declared conflict set names every rule involved) or reported.

use std::cmp::Ordering;

use weft_core::ProductionId;
use weft_table::Action;

use super::{Builder, ItemSet, shift};
use crate::error::{CompileError, CompileResult};
use crate::lower::{Assoc, Sym};

impl Builder<'_> {
    fn precedence(&self, production: usize) -> i32 {
        if production == self.augmented {
            return 0;
        }
        self.grammar.productions[production]
            .alternative
            .precedence
            .unwrap_or(0)
    }

    fn origin(&self, production: usize) -> Option<usize> {
        (production != self.augmented).then(|| {
            let lhs = self.grammar.productions[production].lhs;
            self.grammar.nonterminals[lhs].origin
        })
    }

    /// Productions of the items that would shift terminal `slot`.
    fn shift_items<'a>(
        &'a self,
        slot: usize,
        items: &'a ItemSet,
    ) -> impl Iterator<Item = usize> + 'a {
        items.keys().filter_map(move |&(p, dot)| {
            (self.rhs(p).get(dot) == Some(&Sym::Terminal(slot - 1))).then_some(p)
        })
    }

    pub(super) fn resolve(
        &self,
        state: usize,
        slot: usize,
        shift_target: Option<usize>,
        candidates: &[usize],
        items: &ItemSet,
    ) -> CompileResult<Vec<Action>> {
        let mut reduces = candidates.to_vec();
        reduces.sort_unstable();
        reduces.dedup();

        if reduces.len() > 1
            && let Some(best) = reduces.iter().map(|&p| self.precedence(p)).max()
        {
            reduces.retain(|&p| self.precedence(p) == best);
        }

        let mut keep_shift = shift_target.is_some();
        if keep_shift && !reduces.is_empty() {
            let shift_prec = self
                .shift_items(slot, items)
                .map(|p| self.precedence(p))
                .max()
                .unwrap_or(0);
            let reduce_prec = self.precedence(reduces[0]);
            let assoc = self.grammar.productions[reduces[0]].alternative.assoc;
            match reduce_prec.cmp(&shift_prec) {
                Ordering::Greater => keep_shift = false,
                Ordering::Less => reduces.clear(),
                Ordering::Equal if reduces.len() == 1 && assoc == Assoc::Left => keep_shift = false,
                Ordering::Equal if reduces.len() == 1 && assoc == Assoc::Right => reduces.clear(),
                Ordering::Equal => {}
            }
        }

        let mut actions = Vec::with_capacity(reduces.len() + 1);
        if keep_shift && let Some(target) = shift_target {
            actions.push(shift(target));
        }
        actions.extend(reduces.iter().map(|&p| Action::Reduce(ProductionId(p as u16))));

        if actions.len() > 1 {
            self.check_declared(state, slot, keep_shift, &reduces, items)?;
            tracing::trace!(
                state,
                symbol = %self.slot_name(slot),
                actions = actions.len(),
                "kept declared conflict"
            );
        }
        Ok(actions)
    }

    fn check_declared(
        &self,
        state: usize,
        slot: usize,
        with_shift: bool,
        reduces: &[usize],
        items: &ItemSet,
    ) -> CompileResult<()> {
        let mut involved: Vec<usize> = reduces.iter().filter_map(|&p| self.origin(p)).collect();
        if with_shift {
            involved.extend(self.shift_items(slot, items).filter_map(|p| self.origin(p)));
        }
        involved.sort_unstable();
        involved.dedup();

        let declared = self
            .grammar
            .conflicts
            .iter()
            .any(|set| involved.iter().all(|rule| set.contains(rule)));
        if declared {
            return Ok(());
        }

        let mut choices = Vec::new();
        if with_shift {
            choices.push("shift".to_owned());
        }
        for &p in reduces {
            choices.push(format!("reduce `{}`", self.production_label(p)));
        }
        Err(CompileError::Conflict {
            state,
            symbol: self.slot_name(slot),
            description: choices.join(" or "),
        })
    }

    fn production_label(&self, production: usize) -> String {
        let p = &self.grammar.productions[production];
        let mut label = format!("{} ->", self.grammar.nonterminals[p.lhs].name);
        if p.alternative.symbols.is_empty() {
            label.push_str(" <empty>");
        }
        for &sym in &p.alternative.symbols {
            label.push(' ');
            match sym {
                Sym::Terminal(t) if !self.grammar.terminals[t].named => {
                    label.push_str(&format!("{:?}", self.grammar.terminals[t].name));
                }
                _ => label.push_str(self.grammar.sym_name(sym)),
            }
        }
        label
    }
}
