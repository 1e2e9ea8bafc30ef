//! Immutable, shareable syntax tree nodes.
//!
//! A node stores its byte length, never its offset, so an unchanged subtree
//! can be moved into a new tree as-is. Besides the structure that defines
//! equality, nodes carry reuse metadata: how many bytes past its end the
//! subtree looked at, and for branches the parse state and lookahead that
//! produced them.

use std::fmt;
use std::sync::Arc;

use weft_core::{LexModeId, StateId, SymbolId};

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const ERROR: Self = Self(1 << 0);
    pub const MISSING: Self = Self(1 << 1);
    pub const EXTRA: Self = Self(1 << 2);
    pub const HAS_ERROR: Self = Self(1 << 3);
    /// Built while more than one stack version was alive, during error
    /// recovery, or from tokens lexed for several states at once.
    pub const FRAGILE: Self = Self(1 << 4);
    /// First leaf is zero-width.
    pub const LEADING_EMPTY: Self = Self(1 << 5);

    /// Flags that take part in equality.
    const STRUCTURAL: Self =
        Self(Self::ERROR.0 | Self::MISSING.0 | Self::EXTRA.0 | Self::HAS_ERROR.0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    fn structural(self) -> Self {
        Self(self.0 & Self::STRUCTURAL.0)
    }
}

impl std::ops::BitOr for NodeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::ERROR, "ERROR"),
            (Self::MISSING, "MISSING"),
            (Self::EXTRA, "EXTRA"),
            (Self::HAS_ERROR, "HAS_ERROR"),
            (Self::FRAGILE, "FRAGILE"),
            (Self::LEADING_EMPTY, "LEADING_EMPTY"),
        ];
        let set: Vec<_> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "NodeFlags({})", set.join(" | "))
    }
}

/// Where a branch was reduced: the state exposed beneath it and the
/// lookahead that triggered the reduction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReduceSite {
    pub parse_state: StateId,
    pub follow_kind: SymbolId,
    pub follow_mode: LexModeId,
}

pub(crate) struct NodeData {
    kind: SymbolId,
    len: usize,
    flags: NodeFlags,
    lookahead: usize,
    error_cost: u32,
    dynamic_precedence: i32,
    detail: Detail,
}

enum Detail {
    Leaf { lex_mode: LexModeId },
    Branch { children: Vec<Node>, site: ReduceSite },
}

/// A syntax tree node. Cloning shares the node.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

/// Inputs for [`build_node`] beyond kind and children.
enum NodeSpec {
    Leaf {
        len: usize,
        lookahead: usize,
        lex_mode: LexModeId,
        flags: NodeFlags,
    },
    Branch {
        site: ReduceSite,
        dynamic_precedence: i32,
        fragile: bool,
    },
}

/// Cost charged to a version for each error or missing node it carries.
const ERROR_COST_PER_NODE: u32 = 100;
const ERROR_COST_PER_SKIPPED_LEAF: u32 = 10;

/// Builds any node, deriving length, error flags, error cost and the
/// examined extent of a branch from its children.
fn build_node(kind: SymbolId, children: Vec<Node>, spec: NodeSpec) -> Node {
    match spec {
        NodeSpec::Leaf {
            len,
            lookahead,
            lex_mode,
            mut flags,
        } => {
            debug_assert!(children.is_empty());
            let mut error_cost = 0;
            if flags.contains(NodeFlags::ERROR) || flags.contains(NodeFlags::MISSING) {
                flags = flags | NodeFlags::HAS_ERROR;
                error_cost = ERROR_COST_PER_NODE;
            }
            if len == 0 {
                flags = flags | NodeFlags::LEADING_EMPTY;
            }
            Node(Arc::new(NodeData {
                kind,
                len,
                flags,
                lookahead,
                error_cost,
                dynamic_precedence: 0,
                detail: Detail::Leaf { lex_mode },
            }))
        }
        NodeSpec::Branch {
            site,
            dynamic_precedence,
            fragile,
        } => {
            let mut flags = NodeFlags::default();
            let mut len = 0;
            let mut examined_end = 0;
            let mut error_cost = 0;
            let mut dynamic = dynamic_precedence;
            for child in &children {
                examined_end = examined_end.max(len + child.len() + child.lookahead_bytes());
                len += child.len();
                error_cost += child.0.error_cost;
                dynamic += child.0.dynamic_precedence;
                if child.has_error() {
                    flags = flags | NodeFlags::HAS_ERROR;
                }
                if child.is_fragile() {
                    flags = flags | NodeFlags::FRAGILE;
                }
            }
            if kind.is_error() {
                flags = flags | NodeFlags::ERROR | NodeFlags::HAS_ERROR | NodeFlags::FRAGILE;
                error_cost += ERROR_COST_PER_NODE;
                error_cost += ERROR_COST_PER_SKIPPED_LEAF * children.len() as u32;
            }
            if fragile {
                flags = flags | NodeFlags::FRAGILE;
            }
            if children
                .first()
                .is_none_or(|c| c.len() == 0 || c.flags().contains(NodeFlags::LEADING_EMPTY))
            {
                flags = flags | NodeFlags::LEADING_EMPTY;
            }
            Node(Arc::new(NodeData {
                kind,
                len,
                flags,
                lookahead: examined_end - len,
                error_cost,
                dynamic_precedence: dynamic,
                detail: Detail::Branch { children, site },
            }))
        }
    }
}

impl Node {
    pub(crate) fn leaf(
        kind: SymbolId,
        len: usize,
        lookahead: usize,
        lex_mode: LexModeId,
        flags: NodeFlags,
    ) -> Node {
        build_node(
            kind,
            Vec::new(),
            NodeSpec::Leaf {
                len,
                lookahead,
                lex_mode,
                flags,
            },
        )
    }

    /// Zero-width leaf standing in for a terminal the input lacks.
    pub(crate) fn missing(kind: SymbolId, lex_mode: LexModeId) -> Node {
        Self::leaf(kind, 0, 0, lex_mode, NodeFlags::MISSING)
    }

    pub(crate) fn branch(
        kind: SymbolId,
        children: Vec<Node>,
        site: ReduceSite,
        dynamic_precedence: i32,
        fragile: bool,
    ) -> Node {
        build_node(
            kind,
            children,
            NodeSpec::Branch {
                site,
                dynamic_precedence,
                fragile,
            },
        )
    }

    /// Error node wrapping skipped or popped material.
    pub(crate) fn error(children: Vec<Node>, site: ReduceSite) -> Node {
        Self::branch(SymbolId::ERROR, children, site, 0, true)
    }

    pub fn kind(&self) -> SymbolId {
        self.0.kind
    }

    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    pub fn flags(&self) -> NodeFlags {
        self.0.flags
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.0.detail, Detail::Leaf { .. })
    }

    /// An error node, or an error leaf produced by the lexer.
    pub fn is_error(&self) -> bool {
        self.0.flags.contains(NodeFlags::ERROR)
    }

    pub fn is_missing(&self) -> bool {
        self.0.flags.contains(NodeFlags::MISSING)
    }

    pub fn is_extra(&self) -> bool {
        self.0.flags.contains(NodeFlags::EXTRA)
    }

    pub fn has_error(&self) -> bool {
        self.0.flags.contains(NodeFlags::HAS_ERROR)
    }

    pub fn is_fragile(&self) -> bool {
        self.0.flags.contains(NodeFlags::FRAGILE)
    }

    /// Bytes examined beyond the node's end while building it.
    pub fn lookahead_bytes(&self) -> usize {
        self.0.lookahead
    }

    pub fn error_cost(&self) -> u32 {
        self.0.error_cost
    }

    pub fn dynamic_precedence(&self) -> i32 {
        self.0.dynamic_precedence
    }

    pub fn children(&self) -> &[Node] {
        match &self.0.detail {
            Detail::Leaf { .. } => &[],
            Detail::Branch { children, .. } => children,
        }
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children().get(index)
    }

    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// Lex mode a leaf was scanned in.
    pub fn lex_mode(&self) -> Option<LexModeId> {
        match self.0.detail {
            Detail::Leaf { lex_mode } => Some(lex_mode),
            Detail::Branch { .. } => None,
        }
    }

    pub fn reduce_site(&self) -> Option<ReduceSite> {
        match self.0.detail {
            Detail::Leaf { .. } => None,
            Detail::Branch { site, .. } => Some(site),
        }
    }

    /// Whether both handles point at the same allocation.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Leaves in document order, with their start offsets relative to this
    /// node.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves {
            stack: vec![(self, 0)],
        }
    }

    /// Number of nodes in the subtree, this one included.
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// Same metadata as `other`, so sharing one for the other cannot be
    /// observed.
    pub(crate) fn same_leaf(&self, other: &Node) -> bool {
        self.is_leaf()
            && other.is_leaf()
            && self.0.kind == other.0.kind
            && self.0.len == other.0.len
            && self.0.flags == other.0.flags
            && self.0.lookahead == other.0.lookahead
            && self.lex_mode() == other.lex_mode()
    }
}

pub struct Leaves<'a> {
    stack: Vec<(&'a Node, usize)>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (&'a Node, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, start)) = self.stack.pop() {
            if node.is_leaf() {
                return Some((node, start));
            }
            let mut offset = start + node.len();
            for child in node.children().iter().rev() {
                offset -= child.len();
                self.stack.push((child, offset));
            }
        }
        None
    }
}

/// Structural equality: kind, length, error/missing/extra flags and
/// children. Reuse metadata is ignored.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if Node::ptr_eq(a, b) {
                continue;
            }
            if a.0.kind != b.0.kind
                || a.0.len != b.0.len
                || a.0.flags.structural() != b.0.flags.structural()
                || a.is_leaf() != b.is_leaf()
                || a.child_count() != b.child_count()
            {
                return false;
            }
            stack.extend(a.children().iter().zip(b.children()));
        }
        true
    }
}

impl Eq for Node {}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.0.kind)
            .field("len", &self.0.len)
            .field("flags", &self.0.flags)
            .field("children", &self.child_count())
            .finish()
    }
}

// Iterative: left-recursive lists make trees as deep as they are long.
impl Drop for NodeData {
    fn drop(&mut self) {
        let Detail::Branch { children, .. } = &mut self.detail else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(node) = pending.pop() {
            if let Some(mut data) = Arc::into_inner(node.0)
                && let Detail::Branch { children, .. } = &mut data.detail
            {
                pending.append(children);
            }
        }
    }
}
