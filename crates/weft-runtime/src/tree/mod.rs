//! Parse trees.
//!
//! [`Node`] is the raw, position-free representation the parser builds and
//! shares between trees. [`SyntaxNode`] is the positioned view consumers
//! walk: it splices hidden nonterminals into their parents and skips hidden
//! terminals, so only visible nodes show up as children.

mod cursor;
mod node;
mod printer;

pub use cursor::TreeCursor;
pub use node::{Leaves, Node, NodeFlags, ReduceSite};
pub use printer::TreePrinter;

use std::fmt;
use std::ops::Range;

use weft_core::SymbolId;

use crate::language::Language;

/// Result of a parse: a root node covering the whole text.
#[derive(Clone)]
pub struct Tree {
    root: Node,
    language: Language,
}

impl Tree {
    pub(crate) fn new(root: Node, language: Language) -> Self {
        Self { root, language }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_node(&self) -> SyntaxNode<'_> {
        SyntaxNode {
            tree: self,
            node: &self.root,
            start: 0,
        }
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Length of the parsed text.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root_node())
    }

    pub fn to_sexp(&self) -> String {
        self.root_node().to_sexp()
    }

    /// Outermost error nodes and every missing node, in document order.
    pub fn errors(&self) -> Vec<SyntaxNode<'_>> {
        let mut errors = Vec::new();
        let mut stack = vec![self.root_node()];
        while let Some(node) = stack.pop() {
            if node.is_error() || node.is_missing() {
                errors.push(node);
                continue;
            }
            if node.has_error() {
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }
        errors
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("sexp", &self.to_sexp())
            .finish()
    }
}

/// A node positioned in its tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    tree: &'t Tree,
    node: &'t Node,
    start: usize,
}

impl<'t> SyntaxNode<'t> {
    pub fn raw(&self) -> &'t Node {
        self.node
    }

    pub fn tree(&self) -> &'t Tree {
        self.tree
    }

    pub fn kind(&self) -> SymbolId {
        self.node.kind()
    }

    pub fn kind_name(&self) -> &'t str {
        self.tree.language.symbol_name(self.node.kind())
    }

    pub fn is_named(&self) -> bool {
        self.tree.language.is_named(self.node.kind())
    }

    pub fn is_error(&self) -> bool {
        self.node.is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.node.is_missing()
    }

    pub fn is_extra(&self) -> bool {
        self.node.is_extra()
    }

    pub fn has_error(&self) -> bool {
        self.node.has_error()
    }

    pub fn start_byte(&self) -> usize {
        self.start
    }

    pub fn end_byte(&self) -> usize {
        self.start + self.node.len()
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start..self.end_byte()
    }

    /// Whether the node shares a byte with `range`. An empty range overlaps
    /// the node it points into.
    pub fn range_overlaps(&self, range: Range<usize>) -> bool {
        if range.is_empty() {
            return self.start <= range.start && range.start < self.end_byte();
        }
        self.start < range.end && range.start < self.end_byte()
    }

    /// Source text of the node. `source` must be the text this tree was
    /// parsed from.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.byte_range()]
    }

    /// Visible children, hidden nonterminals spliced in.
    pub fn children(&self) -> Children<'t> {
        let mut stack = Vec::new();
        push_children(&mut stack, self.node, self.start);
        Children {
            tree: self.tree,
            stack,
        }
    }

    pub fn named_children(&self) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
        self.children().filter(|c| c.is_named())
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'t>> {
        self.children().nth(index)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    /// Nested s-expression of visible nodes; anonymous tokens are quoted.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        self.write_sexp(&mut out);
        out
    }

    fn write_sexp(&self, out: &mut String) {
        let name = self.kind_name();
        if !self.is_named() {
            if self.is_missing() {
                out.push_str(&format!("(MISSING {name:?})"));
            } else {
                out.push_str(&format!("{name:?}"));
            }
            return;
        }
        out.push('(');
        if self.is_missing() {
            out.push_str("MISSING ");
        }
        out.push_str(name);
        for child in self.children() {
            out.push(' ');
            child.write_sexp(out);
        }
        out.push(')');
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree)
            && Node::ptr_eq(self.node, other.node)
            && self.start == other.start
    }
}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.kind_name(), self.byte_range())
    }
}

pub struct Children<'t> {
    tree: &'t Tree,
    /// Pending nodes with their start offsets, next one on top.
    stack: Vec<(&'t Node, usize)>,
}

impl<'t> Iterator for Children<'t> {
    type Item = SyntaxNode<'t>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, start)) = self.stack.pop() {
            if self.tree.language.is_visible(node.kind()) {
                return Some(SyntaxNode {
                    tree: self.tree,
                    node,
                    start,
                });
            }
            push_children(&mut self.stack, node, start);
        }
        None
    }
}

fn push_children<'t>(stack: &mut Vec<(&'t Node, usize)>, node: &'t Node, start: usize) {
    let mut offset = start + node.len();
    for child in node.children().iter().rev() {
        offset -= child.len();
        stack.push((child, offset));
    }
}
