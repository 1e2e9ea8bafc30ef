use std::fmt::Write;

use super::{Node, Tree};

/// Indented dump of a tree, one node per line.
///
/// By default only visible nodes are shown. `raw` shows the tree as built,
/// hidden nonterminals and terminals included.
pub struct TreePrinter<'t, 's> {
    tree: &'t Tree,
    source: Option<&'s str>,
    raw: bool,
    spans: bool,
}

impl<'t, 's> TreePrinter<'t, 's> {
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            source: None,
            raw: false,
            spans: false,
        }
    }

    pub fn raw(mut self, value: bool) -> Self {
        self.raw = value;
        self
    }

    pub fn with_spans(mut self, value: bool) -> Self {
        self.spans = value;
        self
    }

    /// Prints leaf text taken from `source`.
    pub fn with_source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        self.format_node(self.tree.root(), 0, 0, w)
    }

    fn format_node(
        &self,
        node: &Node,
        start: usize,
        indent: usize,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let language = self.tree.language();
        let prefix = "  ".repeat(indent);
        let name = language.symbol_name(node.kind());
        let label = if language.is_named(node.kind()) {
            name.to_owned()
        } else {
            format!("{name:?}")
        };

        write!(w, "{prefix}")?;
        if node.is_missing() {
            write!(w, "MISSING ")?;
        }
        write!(w, "{label}")?;
        if self.spans {
            write!(w, " {}..{}", start, start + node.len())?;
        }
        if node.is_leaf()
            && language.is_named(node.kind())
            && let Some(source) = self.source
            && let Some(text) = source.get(start..start + node.len())
        {
            write!(w, " {text:?}")?;
        }
        writeln!(w)?;

        let mut offset = start;
        for child in node.children() {
            if self.raw || language.is_visible(child.kind()) {
                self.format_node(child, offset, indent + 1, w)?;
            } else if !child.is_leaf() {
                self.format_spliced(child, offset, indent + 1, w)?;
            }
            offset += child.len();
        }
        Ok(())
    }

    /// Children of a hidden nonterminal, printed at its parent's level.
    fn format_spliced(
        &self,
        node: &Node,
        start: usize,
        indent: usize,
        w: &mut impl Write,
    ) -> std::fmt::Result {
        let language = self.tree.language();
        let mut offset = start;
        for child in node.children() {
            if language.is_visible(child.kind()) {
                self.format_node(child, offset, indent, w)?;
            } else if !child.is_leaf() {
                self.format_spliced(child, offset, indent, w)?;
            }
            offset += child.len();
        }
        Ok(())
    }
}
