//! Stack versions: forking on multi-action entries, merging, pruning.

use std::cmp::Ordering;
use std::collections::VecDeque;

use weft_core::{LexModeId, ProductionId, StateId, SymbolId};
use weft_table::Action;

use super::stack::EntryId;
use super::{Lookahead, Parse};
use crate::error::ParseResult;
use crate::options::ConflictPolicy;
use crate::trace::Tracer;
use crate::tree::{Node, ReduceSite};

/// One live parse: a stack top plus what the preference order looks at.
#[derive(Clone, Debug)]
pub(crate) struct Version {
    pub(crate) head: EntryId,
    /// Error cost of the nodes on the stack.
    pub(crate) error_cost: u32,
    /// Dynamic precedence summed over every reduction so far.
    pub(crate) dynamic_precedence: i32,
    /// Action index taken at each fork, oldest first.
    pub(crate) choices: Vec<u16>,
}

impl Version {
    pub(crate) fn new(head: EntryId) -> Self {
        Self {
            head,
            error_cost: 0,
            dynamic_precedence: 0,
            choices: Vec::new(),
        }
    }
}

/// Outcome of feeding one lookahead to every version.
pub(crate) enum Round {
    Shifted,
    Accepted(Version),
    /// No version could act on the lookahead; the best of them.
    Failed(Version),
}

impl<T: Tracer> Parse<'_, T> {
    /// Runs every version until it shifts `lookahead`, accepts or fails.
    /// Reductions re-enter the queue with the same lookahead.
    pub(crate) fn advance(&mut self, lookahead: &Lookahead) -> ParseResult<Round> {
        let table = self.table;
        let kind = lookahead.kind();
        let mut queue: VecDeque<Version> = self.versions.drain(..).collect();
        let mut shifted = Vec::new();
        let mut accepted = Vec::new();
        let mut failed = Vec::new();

        while let Some(version) = queue.pop_front() {
            self.tick()?;
            let state = self.stack.state(version.head);
            let actions = table.actions(state, kind);
            if actions.is_empty() {
                failed.push(version);
                continue;
            }

            let count = actions.len();
            if count > 1 {
                self.tracer.trace_fork(state, kind, count);
                tracing::debug!(state = state.0, symbol = table.symbol_name(kind), count, "fork");
            }
            let alive = queue.len() + shifted.len() + accepted.len() + count;
            let fragile = lookahead.fragile || alive > 1;

            for (i, action) in actions.iter().enumerate() {
                let mut next = version.clone();
                if count > 1 {
                    next.choices.push(i as u16);
                }
                match action {
                    Action::Shift(target) => {
                        self.shift(&mut next, target, lookahead, fragile);
                        shifted.push(next);
                    }
                    Action::Reduce(production) => {
                        let follow = (kind, lookahead.mode());
                        self.reduce(&mut next, production, follow, fragile);
                        queue.push_back(next);
                    }
                    Action::Accept => accepted.push(next),
                }
            }
        }

        if let Some(best) = self.best(accepted) {
            return Ok(Round::Accepted(best));
        }
        if !shifted.is_empty() {
            self.versions = self.condense(shifted);
            return Ok(Round::Shifted);
        }
        match self.best(failed) {
            Some(best) => Ok(Round::Failed(best)),
            None => unreachable!("advance started without a live version"),
        }
    }

    pub(crate) fn shift(
        &mut self,
        version: &mut Version,
        target: StateId,
        lookahead: &Lookahead,
        fragile: bool,
    ) {
        let leaf = lookahead.leaf.clone();
        version.error_cost += leaf.error_cost();
        let fragile = fragile || lookahead.fragile;
        version.head = self.stack.push(version.head, target, leaf, false, fragile);
        self.tracer.trace_shift(lookahead.kind(), target);
    }

    /// Pushes an extra on every version without changing state.
    pub(crate) fn push_extra(&mut self, lookahead: &Lookahead) {
        let fragile = lookahead.fragile || self.versions.len() > 1;
        for version in &mut self.versions {
            let state = self.stack.state(version.head);
            let leaf = lookahead.leaf.clone();
            version.head = self.stack.push(version.head, state, leaf, true, fragile);
            version.error_cost += lookahead.leaf.error_cost();
        }
        self.tracer.trace_extra(lookahead.kind());
    }

    /// Reduces `production` on `version`. `follow` is the lookahead kind and
    /// the lex mode it was scanned in.
    ///
    /// # Panics
    ///
    /// If the table has no goto for the result. Only an inconsistent table
    /// that still passed loading can cause it.
    pub(crate) fn reduce(
        &mut self,
        version: &mut Version,
        production: ProductionId,
        follow: (SymbolId, LexModeId),
        fragile: bool,
    ) {
        let p = self.table.production(production);
        let popped = self.stack.pop(version.head, p.rhs_len as usize);
        let exposed = self.stack.state(popped.base);
        let Some(target) = self.table.goto(exposed, p.lhs) else {
            panic!(
                "ParseTable: no goto on `{}` from state {} after reducing P{}",
                self.table.symbol_name(p.lhs),
                exposed.0,
                production.0
            );
        };

        let site = ReduceSite {
            parse_state: exposed,
            follow_kind: follow.0,
            follow_mode: follow.1,
        };
        let child_count = popped.children.len();
        let node = Node::branch(
            p.lhs,
            popped.children,
            site,
            p.dynamic_precedence as i32,
            fragile || popped.fragile,
        );
        let node_fragile = node.is_fragile();
        let mut head = self.stack.push(popped.base, target, node, false, node_fragile);
        for extra in popped.trailing {
            head = self.stack.push(head, target, extra, true, fragile);
        }
        version.head = head;
        version.dynamic_precedence += p.dynamic_precedence as i32;
        self.tracer.trace_reduce(production, p.lhs, child_count, target);
    }

    /// Lower is better: error cost, then dynamic precedence, then the
    /// conflict policy at the first fork where the versions differ.
    pub(crate) fn compare(&self, a: &Version, b: &Version) -> Ordering {
        a.error_cost
            .cmp(&b.error_cost)
            .then_with(|| b.dynamic_precedence.cmp(&a.dynamic_precedence))
            .then_with(|| match self.options.conflict_policy {
                ConflictPolicy::FirstDeclared => a.choices.cmp(&b.choices),
                ConflictPolicy::LastDeclared => b.choices.cmp(&a.choices),
            })
    }

    fn best(&self, versions: Vec<Version>) -> Option<Version> {
        versions.into_iter().min_by(|a, b| self.compare(a, b))
    }

    /// Merges versions with identical state stacks, keeping the preferred
    /// one, then prunes down to the version limit.
    fn condense(&mut self, versions: Vec<Version>) -> Vec<Version> {
        if versions.len() == 1 {
            return versions;
        }

        let before = versions.len();
        let mut kept: Vec<Version> = Vec::with_capacity(before);
        for version in versions {
            let same = kept
                .iter_mut()
                .find(|existing| self.stack.same_states(existing.head, version.head));
            match same {
                Some(existing) => {
                    if self.compare(&version, existing) == Ordering::Less {
                        *existing = version;
                    }
                }
                None => kept.push(version),
            }
        }
        if kept.len() < before {
            self.tracer.trace_merge(kept.len());
        }

        let mut versions = kept;
        versions.sort_by(|a, b| self.compare(a, b));
        let max = self.options.max_versions;
        if versions.len() > max {
            tracing::warn!(
                versions = versions.len(),
                max,
                position = self.position,
                "pruning stack versions"
            );
            versions.truncate(max);
        }
        versions
    }
}
