//! Error recovery.
//!
//! When no version can act on the lookahead, the best failed version is
//! kept alone and recovery tries, in order:
//!
//! 1. inserting a zero-width missing token, at most once per position;
//! 2. wrapping the top of the stack into an error node down to the
//!    shallowest depth that can act on the lookahead, at most once per
//!    position;
//! 3. skipping tokens (scanned with every terminal allowed) into an error
//!    node until some stack depth can act on the current one.
//!
//! Each step consumes input or is bounded per position, so recovery always
//! terminates. At end of input with nothing to resume, the whole stack
//! becomes an error root.

use weft_core::{ProductionId, StateId, SymbolId};
use weft_table::Action;

use super::glr::Version;
use super::stack::EntryId;
use super::{Lookahead, Mode, Parse};
use crate::error::ParseResult;
use crate::trace::{Recovery, Tracer};
use crate::tree::{Node, ReduceSite};

/// Bound on reductions simulated while looking for a missing token.
const MAX_SIMULATED_REDUCTIONS: usize = 256;

impl<T: Tracer> Parse<'_, T> {
    pub(super) fn handle_error(
        &mut self,
        version: Version,
        lookahead: Lookahead,
    ) -> ParseResult<Option<Node>> {
        let at = lookahead.token.start;
        tracing::debug!(
            position = at,
            symbol = self.table.symbol_name(lookahead.kind()),
            state = self.stack.state(version.head).0,
            "syntax error"
        );
        self.versions = vec![version];

        if self.missing_at != Some(at) {
            self.missing_at = Some(at);
            if self.insert_missing(&lookahead) {
                self.lookahead = Some(lookahead);
                return Ok(None);
            }
        }

        if self.popped_at != Some(at) {
            self.popped_at = Some(at);
            let head = self.versions[0].head;
            let resume = self
                .stack
                .ancestors(head)
                .skip(1)
                .find(|(_, e)| self.table.has_action(e.state, lookahead.kind()))
                .map(|(id, _)| id);
            if let Some(base) = resume {
                let entries = self.resume(base, Vec::new(), &lookahead);
                let state = self.stack.state(base);
                self.tracer.trace_recover(at, Recovery::Popped { state, entries });
                self.lookahead = Some(lookahead);
                return Ok(None);
            }
        }

        self.mode = Mode::Recovering { skipped: Vec::new() };
        if lookahead.kind().is_end() {
            return Ok(self.recover_at_end(lookahead));
        }
        self.skip(lookahead);
        Ok(None)
    }

    /// One step of the skipping phase.
    pub(super) fn recover_step(&mut self, lookahead: Lookahead) -> ParseResult<Option<Node>> {
        if lookahead.kind().is_end() {
            return Ok(self.recover_at_end(lookahead));
        }
        if !lookahead.is_extra()
            && let Some(base) = self.resumable(lookahead.kind())
        {
            self.resume_skipped(base, lookahead);
            return Ok(None);
        }
        self.skip(lookahead);
        Ok(None)
    }

    /// Resumes once at end of input if any depth can act on it; otherwise
    /// returns the error root.
    fn recover_at_end(&mut self, lookahead: Lookahead) -> Option<Node> {
        if !self.resumed_at_end
            && let Some(base) = self.resumable(SymbolId::END)
        {
            self.resumed_at_end = true;
            self.resume_skipped(base, lookahead);
            return None;
        }

        let at = lookahead.token.start;
        self.tracer.trace_recover(at, Recovery::Abandoned);
        tracing::debug!(position = at, "abandoning recovery at end of input");
        let skipped = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Recovering { skipped } => skipped,
            Mode::Normal => Vec::new(),
        };
        let mut children: Vec<Node> = self
            .stack
            .nodes(self.versions[0].head)
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        children.extend(skipped);
        Some(self.error_root(children))
    }

    fn skip(&mut self, lookahead: Lookahead) {
        let at = lookahead.token.start;
        self.tracer.trace_recover(at, Recovery::Skipped { kind: lookahead.kind() });
        self.position = lookahead.token.end;
        if let Mode::Recovering { skipped } = &mut self.mode {
            skipped.push(lookahead.leaf);
        }
    }

    /// Shallowest stack depth whose state can act on `kind`.
    fn resumable(&self, kind: SymbolId) -> Option<EntryId> {
        let head = self.versions[0].head;
        self.stack
            .ancestors(head)
            .find(|(_, e)| self.table.has_action(e.state, kind))
            .map(|(id, _)| id)
    }

    fn resume_skipped(&mut self, base: EntryId, lookahead: Lookahead) {
        let skipped = match std::mem::replace(&mut self.mode, Mode::Normal) {
            Mode::Recovering { skipped } => skipped,
            Mode::Normal => Vec::new(),
        };
        self.resume(base, skipped, &lookahead);
        let state = self.stack.state(base);
        self.tracer.trace_recover(lookahead.token.start, Recovery::Resumed { state });
        self.lookahead = Some(lookahead);
    }

    /// Wraps everything above `base` plus `skipped` into an error node and
    /// pushes it on `base` as an extra. Returns how many nodes were popped.
    fn resume(&mut self, base: EntryId, skipped: Vec<Node>, lookahead: &Lookahead) -> usize {
        let head = self.versions[0].head;
        let mut children = self.stack.nodes_above(head, base);
        let popped = children.len();
        let popped_cost: u32 = children.iter().map(Node::error_cost).sum();
        children.extend(skipped);
        if children.is_empty() {
            self.versions[0].head = base;
            return 0;
        }

        let state = self.stack.state(base);
        let error = Node::error(
            children,
            ReduceSite {
                parse_state: state,
                follow_kind: lookahead.kind(),
                follow_mode: lookahead.mode(),
            },
        );
        let version = &mut self.versions[0];
        version.error_cost = version.error_cost.saturating_sub(popped_cost) + error.error_cost();
        version.head = self.stack.push(base, state, error, true, true);
        popped
    }

    /// Inserts a missing terminal that lets the parse continue with
    /// `lookahead`: the first expected terminal (in symbol order) whose
    /// shift, after any reductions it triggers, leads to a state that can
    /// act on the lookahead.
    fn insert_missing(&mut self, lookahead: &Lookahead) -> bool {
        let table = self.table;
        let head = self.versions[0].head;
        let state = self.stack.state(head);
        let mut states = self.stack.states(head);
        states.reverse();

        for terminal in table.expected(state) {
            if terminal.is_end() || self.language.is_extra(terminal) {
                continue;
            }
            let Some((reductions, target)) = self.simulate(states.clone(), terminal) else {
                continue;
            };
            if !table.has_action(target, lookahead.kind()) {
                continue;
            }

            let mode = table.lex_mode(state);
            let mut version = self.versions[0].clone();
            for production in reductions {
                self.reduce(&mut version, production, (terminal, mode), true);
            }
            let missing = Node::missing(terminal, mode);
            version.error_cost += missing.error_cost();
            version.head = self.stack.push(version.head, target, missing, false, true);
            self.versions[0] = version;
            self.tracer.trace_recover(lookahead.token.start, Recovery::Missing { kind: terminal });
            return true;
        }
        false
    }

    /// Follows first actions on `terminal` over a copy of the state stack
    /// (bottom first) until it shifts. Returns the reductions taken and the
    /// shift target.
    fn simulate(
        &self,
        mut states: Vec<StateId>,
        terminal: SymbolId,
    ) -> Option<(Vec<ProductionId>, StateId)> {
        let mut reductions = Vec::new();
        for _ in 0..MAX_SIMULATED_REDUCTIONS {
            let top = *states.last()?;
            match self.table.actions(top, terminal).first()? {
                Action::Shift(target) => return Some((reductions, target)),
                Action::Reduce(production) => {
                    let p = self.table.production(production);
                    let keep = states.len().checked_sub(p.rhs_len as usize)?;
                    if keep == 0 {
                        return None;
                    }
                    states.truncate(keep);
                    let goto = self.table.goto(*states.last()?, p.lhs)?;
                    states.push(goto);
                    reductions.push(production);
                }
                Action::Accept => return None,
            }
        }
        None
    }
}
