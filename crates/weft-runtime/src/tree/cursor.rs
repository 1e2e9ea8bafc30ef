//! Stateful walk over the visible nodes of a tree.

use super::SyntaxNode;

struct Level<'t> {
    siblings: Vec<SyntaxNode<'t>>,
    index: usize,
}

/// Walks visible nodes. The cursor keeps its ancestry, so moving to the
/// parent never searches from the root.
pub struct TreeCursor<'t> {
    root: SyntaxNode<'t>,
    levels: Vec<Level<'t>>,
}

impl<'t> TreeCursor<'t> {
    pub(crate) fn new(root: SyntaxNode<'t>) -> Self {
        Self {
            root,
            levels: Vec::new(),
        }
    }

    pub fn node(&self) -> SyntaxNode<'t> {
        match self.levels.last() {
            Some(level) => level.siblings[level.index],
            None => self.root,
        }
    }

    /// Number of steps below the root.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn goto_first_child(&mut self) -> bool {
        let siblings: Vec<_> = self.node().children().collect();
        if siblings.is_empty() {
            return false;
        }
        self.levels.push(Level { siblings, index: 0 });
        true
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(level) = self.levels.last_mut() else {
            return false;
        };
        if level.index + 1 >= level.siblings.len() {
            return false;
        }
        level.index += 1;
        true
    }

    pub fn goto_parent(&mut self) -> bool {
        self.levels.pop().is_some()
    }

    /// Moves to the first child that ends after `byte` and returns its
    /// index.
    pub fn goto_first_child_for_byte(&mut self, byte: usize) -> Option<usize> {
        let siblings: Vec<_> = self.node().children().collect();
        let index = siblings.iter().position(|c| c.end_byte() > byte)?;
        self.levels.push(Level { siblings, index });
        Some(index)
    }

    /// Back to the root.
    pub fn reset(&mut self) {
        self.levels.clear();
    }

    /// Visible nodes in pre-order, starting from the cursor's node.
    pub fn preorder(mut self) -> impl Iterator<Item = SyntaxNode<'t>> {
        let base = self.depth();
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let current = self.node();
            if self.goto_first_child() {
                return Some(current);
            }
            loop {
                if self.depth() > base && self.goto_next_sibling() {
                    return Some(current);
                }
                if self.depth() <= base || !self.goto_parent() {
                    done = true;
                    return Some(current);
                }
            }
        })
    }
}
