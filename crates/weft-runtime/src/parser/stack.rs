//! Graph-structured parse stack.
//!
//! Entries live in one append-only arena and point at their parent, so
//! every stack version is just the index of its top entry and versions
//! share everything below the point where they forked. Entries are never
//! freed during a parse; a dead version's entries simply become unreachable.

use weft_core::StateId;

use crate::tree::Node;

pub(crate) type EntryId = u32;

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) state: StateId,
    /// `None` only for the bottom entry.
    pub(crate) node: Option<Node>,
    pub(crate) parent: Option<EntryId>,
    /// Extras and error nodes: pushed without a state change and not counted
    /// as right-hand-side symbols.
    pub(crate) extra: bool,
    pub(crate) fragile: bool,
}

/// Entries removed by a reduction.
pub(crate) struct Popped {
    /// The entry left on top.
    pub(crate) base: EntryId,
    /// Popped nodes in document order, interior extras included.
    pub(crate) children: Vec<Node>,
    /// Extras that sat above the last right-hand-side symbol. They go back on
    /// the stack above the new node.
    pub(crate) trailing: Vec<Node>,
    pub(crate) fragile: bool,
}

#[derive(Debug)]
pub(crate) struct Stack {
    entries: Vec<Entry>,
}

impl Stack {
    /// A stack holding only the bottom entry, in the start state.
    pub(crate) fn new() -> (Self, EntryId) {
        let bottom = Entry {
            state: StateId::START,
            node: None,
            parent: None,
            extra: false,
            fragile: false,
        };
        (
            Self {
                entries: vec![bottom],
            },
            0,
        )
    }

    pub(crate) fn push(
        &mut self,
        parent: EntryId,
        state: StateId,
        node: Node,
        extra: bool,
        fragile: bool,
    ) -> EntryId {
        let id = self.entries.len() as EntryId;
        self.entries.push(Entry {
            state,
            node: Some(node),
            parent: Some(parent),
            extra,
            fragile,
        });
        id
    }

    pub(crate) fn get(&self, id: EntryId) -> &Entry {
        &self.entries[id as usize]
    }

    pub(crate) fn state(&self, id: EntryId) -> StateId {
        self.get(id).state
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries from `head` down to the bottom.
    pub(crate) fn ancestors(&self, head: EntryId) -> impl Iterator<Item = (EntryId, &Entry)> + '_ {
        std::iter::successors(Some(head), move |&id| self.get(id).parent)
            .map(move |id| (id, self.get(id)))
    }

    /// States of the non-extra entries, top first.
    pub(crate) fn states(&self, head: EntryId) -> Vec<StateId> {
        self.ancestors(head)
            .filter(|(_, e)| !e.extra)
            .map(|(_, e)| e.state)
            .collect()
    }

    /// Whether `a` and `b` hold the same states once extras are skipped.
    /// Walks both in step and stops at the first entry they share.
    pub(crate) fn same_states(&self, mut a: EntryId, mut b: EntryId) -> bool {
        loop {
            a = self.skip_extras(a);
            b = self.skip_extras(b);
            if a == b {
                return true;
            }
            let (left, right) = (self.get(a), self.get(b));
            if left.state != right.state {
                return false;
            }
            match (left.parent, right.parent) {
                (Some(pa), Some(pb)) => (a, b) = (pa, pb),
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    fn skip_extras(&self, mut id: EntryId) -> EntryId {
        while let Entry {
            extra: true,
            parent: Some(parent),
            ..
        } = self.get(id)
        {
            id = *parent;
        }
        id
    }

    /// Pops `count` right-hand-side entries off `head`.
    ///
    /// # Panics
    ///
    /// If fewer than `count` right-hand-side entries sit above the bottom.
    pub(crate) fn pop(&self, head: EntryId, count: usize) -> Popped {
        let mut children = Vec::new();
        let mut trailing = Vec::new();
        let mut fragile = false;
        let mut popped = 0;
        let mut id = head;

        while popped < count {
            let entry = self.get(id);
            let (Some(parent), Some(node)) = (entry.parent, &entry.node) else {
                panic!("stack: popped {popped} of {count} entries before the bottom");
            };
            if entry.extra && popped == 0 {
                trailing.push(node.clone());
            } else {
                fragile |= entry.fragile;
                children.push(node.clone());
                if !entry.extra {
                    popped += 1;
                }
            }
            id = parent;
        }

        children.reverse();
        trailing.reverse();
        Popped {
            base: id,
            children,
            trailing,
            fragile,
        }
    }

    /// Nodes strictly above `base` on the path to `head`, in document order.
    pub(crate) fn nodes_above(&self, head: EntryId, base: EntryId) -> Vec<Node> {
        let mut nodes: Vec<Node> = self
            .ancestors(head)
            .take_while(|&(id, _)| id != base)
            .filter_map(|(_, e)| e.node.clone())
            .collect();
        nodes.reverse();
        nodes
    }

    /// Every node on the path to `head`, with its extra flag, in document
    /// order.
    pub(crate) fn nodes(&self, head: EntryId) -> Vec<(Node, bool)> {
        let mut nodes: Vec<(Node, bool)> = self
            .ancestors(head)
            .filter_map(|(_, e)| e.node.clone().map(|n| (n, e.extra)))
            .collect();
        nodes.reverse();
        nodes
    }
}
