//! Reuse of the previous tree during a reparse.
//!
//! A subtree of the previous tree can stand in for the work that would
//! rebuild it when all of these hold:
//!
//! - no edit touches the bytes it examined (its own plus its lookahead);
//! - it was built deterministically (not fragile) and holds no errors;
//! - the current state is the state it was reduced on top of;
//! - the lookahead that triggered its reduction scans the same again.
//!
//! The lexer and the LR automaton are deterministic in the state and the
//! bytes they read, so under those conditions a fresh parse performs exactly
//! the actions that built the subtree and ends in the same configuration.

use weft_core::LexModeId;
use weft_table::Action;

use super::{Lookahead, Parse};
use crate::edit::EditSet;
use crate::error::ParseResult;
use crate::trace::Tracer;
use crate::tree::{Node, NodeFlags};

/// Forward-only walk over the previous tree, in previous-text offsets.
pub(crate) struct ReuseCursor {
    /// Path from the root to the current node, with start offsets.
    path: Vec<(Node, usize)>,
}

impl ReuseCursor {
    pub(crate) fn new(root: Node) -> Self {
        Self {
            path: vec![(root, 0)],
        }
    }

    /// Nodes starting exactly at `offset`, outermost first. Amortized
    /// constant while offsets do not decrease between calls.
    pub(crate) fn seek(&mut self, offset: usize) -> Vec<Node> {
        while self.path.len() > 1 {
            let (node, start) = &self.path[self.path.len() - 1];
            if *start <= offset && offset < start + node.len() {
                break;
            }
            self.path.pop();
        }

        loop {
            let (node, start) = &self.path[self.path.len() - 1];
            let mut child_start = *start;
            let mut found = None;
            for child in node.children() {
                if child_start > offset {
                    break;
                }
                if !child.is_empty() && offset < child_start + child.len() {
                    found = Some((child.clone(), child_start));
                    break;
                }
                child_start += child.len();
            }
            match found {
                Some(frame) => self.path.push(frame),
                None => break,
            }
        }

        self.path
            .iter()
            .filter(|(node, start)| *start == offset && !node.is_empty())
            .map(|(node, _)| node.clone())
            .collect()
    }
}

pub(crate) struct Reuse {
    edits: EditSet,
    cursor: ReuseCursor,
}

impl Reuse {
    pub(crate) fn new(root: Node, edits: EditSet) -> Self {
        Self {
            edits,
            cursor: ReuseCursor::new(root),
        }
    }

    /// Previous-tree nodes starting at new-text offset `at`, outermost first.
    fn candidates(&mut self, at: usize) -> Option<(usize, Vec<Node>)> {
        let old = self.edits.to_old(at)?;
        Some((old, self.cursor.seek(old)))
    }

    /// The previous leaf starting at new-text offset `at`, if any.
    pub(crate) fn leaf_at(&mut self, at: usize) -> Option<Node> {
        let (_, candidates) = self.candidates(at)?;
        candidates.last().filter(|n| n.is_leaf()).cloned()
    }

    /// Whether `leaf`, found at new-text offset `at`, is what scanning in
    /// `mode` would produce there.
    pub(crate) fn leaf_reusable(&self, leaf: &Node, at: usize, mode: LexModeId) -> bool {
        let Some(old) = self.edits.to_old(at) else {
            return false;
        };
        !leaf.has_error()
            && leaf.lex_mode() == Some(mode)
            && !self.touched(leaf, old)
    }

    /// Whether an edit touches what `node`, at previous offset `old`,
    /// examined.
    fn touched(&self, node: &Node, old: usize) -> bool {
        self.edits
            .affects(old, old + node.len() + node.lookahead_bytes())
    }
}

impl<T: Tracer> Parse<'_, T> {
    /// Pushes the outermost reusable subtree starting at the lookahead, then
    /// the extras after it. Returns the lookahead that follows it.
    pub(super) fn reuse_subtree(
        &mut self,
        lookahead: &Lookahead,
    ) -> ParseResult<Option<Lookahead>> {
        if self.reuse.is_none() || self.versions.len() != 1 || lookahead.kind().is_end() {
            return Ok(None);
        }
        self.reduce_pending(lookahead)?;
        let position = self.position;
        let Some((old, candidates)) = self.reuse.as_mut().and_then(|r| r.candidates(position))
        else {
            return Ok(None);
        };

        let state = self.top_state();
        for node in candidates {
            if node.is_leaf()
                || node.is_fragile()
                || node.has_error()
                || node.flags().contains(NodeFlags::LEADING_EMPTY)
            {
                continue;
            }
            let Some(site) = node.reduce_site() else {
                continue;
            };
            if site.parse_state != state {
                continue;
            }
            if self
                .reuse
                .as_ref()
                .is_none_or(|r| r.touched(&node, old))
            {
                continue;
            }
            let Some((first, _)) = node.leaves().next() else {
                continue;
            };
            if first.kind() != lookahead.kind() || first.len() != lookahead.token.len() {
                continue;
            }
            let Some(target) = self.table.goto(state, node.kind()) else {
                continue;
            };

            let end = self.position + node.len();
            let (extras, follow) = self.scan_follow(end, site.follow_mode)?;
            if follow.kind() != site.follow_kind {
                continue;
            }

            self.tracer.trace_reuse(node.kind(), self.position, node.len());
            tracing::trace!(
                symbol = self.table.symbol_name(node.kind()),
                position = self.position,
                len = node.len(),
                "reused subtree"
            );
            let version = &mut self.versions[0];
            version.dynamic_precedence += node.dynamic_precedence();
            version.head = self.stack.push(version.head, target, node, false, false);
            for extra in extras {
                self.tracer.trace_extra(extra.kind());
                let version = &mut self.versions[0];
                version.head = self.stack.push(version.head, target, extra.leaf, true, false);
            }
            self.position = follow.token.start;
            return Ok(Some(follow));
        }
        Ok(None)
    }

    /// Performs the reductions the lookahead triggers while each is the only
    /// action, as `advance` would, so candidates are matched against the
    /// state the next shift happens in.
    fn reduce_pending(&mut self, lookahead: &Lookahead) -> ParseResult<()> {
        let follow = (lookahead.kind(), lookahead.mode());
        loop {
            let actions = self.table.actions(self.top_state(), lookahead.kind());
            let (1, Some(Action::Reduce(production))) = (actions.len(), actions.first()) else {
                return Ok(());
            };
            self.tick()?;
            let mut version = self.versions[0].clone();
            self.reduce(&mut version, production, follow, lookahead.fragile);
            self.versions[0] = version;
        }
    }

    /// Scans from `at` in `mode` up to the first token that is not an extra.
    fn scan_follow(
        &mut self,
        mut at: usize,
        mode: LexModeId,
    ) -> ParseResult<(Vec<Lookahead>, Lookahead)> {
        let mut extras = Vec::new();
        loop {
            self.tick()?;
            let lookahead = self.scan_single(at, mode);
            if !lookahead.is_extra() {
                return Ok((extras, lookahead));
            }
            at = lookahead.token.end;
            extras.push(lookahead);
        }
    }
}
