//! Syntax errors of a tree as renderable diagnostics.
//!
//! Recovery never fails a parse; it leaves `ERROR` and `MISSING` nodes in
//! the tree. [`Diagnostics::from_tree`] turns them into messages and
//! [`DiagnosticsPrinter`] renders them against the source.

use std::fmt::{self, Write};
use std::ops::Range;

use annotate_snippets::{AnnotationKind, Level, Renderer, Snippet};
use weft_runtime::{SyntaxNode, Tree};

/// Longest error text quoted verbatim in a message.
const MAX_QUOTED: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// Input the parser skipped, wrapped in an `ERROR` node.
    Unexpected,
    /// A token the parser inserted with zero width.
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub range: Range<usize>,
    pub message: String,
}

impl Diagnostic {
    fn from_node(node: &SyntaxNode<'_>, source: &str) -> Self {
        let range = node.byte_range();
        if node.is_missing() {
            return Self {
                kind: DiagnosticKind::Missing,
                message: format!("missing {}", describe_kind(node)),
                range,
            };
        }

        let text = source.get(range.clone()).unwrap_or_default();
        let message = if text.is_empty() || text.len() > MAX_QUOTED || text.contains('\n') {
            "unexpected input".to_owned()
        } else {
            format!("unexpected `{text}`")
        };
        Self {
            kind: DiagnosticKind::Unexpected,
            range,
            message,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            self.range.start, self.range.end, self.message
        )
    }
}

fn describe_kind(node: &SyntaxNode<'_>) -> String {
    if node.is_named() {
        node.kind_name().to_owned()
    } else {
        format!("`{}`", node.kind_name())
    }
}

/// Syntax errors in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects one diagnostic per outermost `ERROR` node and per `MISSING`
    /// node of `tree`. `source` is the text `tree` was parsed from.
    pub fn from_tree(tree: &Tree, source: &str) -> Self {
        let messages = tree
            .errors()
            .iter()
            .map(|node| Diagnostic::from_node(node, source))
            .collect();
        Self { messages }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.messages.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.messages.iter()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.messages.iter().filter(|d| d.kind == kind).count()
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders diagnostics, annotated against the source when one is given.
pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    source: Option<&'s str>,
    path: Option<&'s str>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            source: None,
            path: None,
            colored: false,
        }
    }

    pub fn source(mut self, source: &'s str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn path(mut self, path: &'s str) -> Self {
        self.path = Some(path);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> fmt::Result {
        let Some(source) = self.source else {
            return self.format_plain(w);
        };

        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            let mut snippet = Snippet::source(source)
                .line_start(1)
                .annotation(AnnotationKind::Primary.span(widen(&diag.range, source.len())));
            if let Some(path) = self.path {
                snippet = snippet.path(path);
            }

            let report = [Level::ERROR.primary_title(&diag.message).element(snippet)];

            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{}", renderer.render(&report))?;
        }

        Ok(())
    }

    fn format_plain(&self, w: &mut impl Write) -> fmt::Result {
        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            write!(w, "{diag}")?;
        }
        Ok(())
    }
}

/// Zero-width spans point at the byte after them, if any.
fn widen(range: &Range<usize>, limit: usize) -> Range<usize> {
    if range.start == range.end {
        return range.start..(range.start + 1).min(limit);
    }
    range.clone()
}
