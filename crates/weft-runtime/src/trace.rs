//! Parser instrumentation.
//!
//! The parser is generic over a [`Tracer`]. With [`NoopTracer`] every hook is
//! an empty `#[inline(always)]` function and compiles away. [`PrintTracer`]
//! renders a readable log for debugging a grammar, and [`StatsTracer`]
//! counts what the parser did, which is what the reuse tests look at.
//!
//! Independently of the tracer, the parser emits `tracing` events for forks,
//! version pruning and error recovery.

use weft_core::{Colors, ProductionId, StateId, SymbolId};

use crate::language::Language;
use crate::lexer::Token;

/// What error recovery did at one point of the input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recovery {
    /// A zero-width node for `kind` was inserted.
    Missing { kind: SymbolId },
    /// Entries above a stack depth were wrapped into an error node and the
    /// parse resumed in `state`.
    Popped { state: StateId, entries: usize },
    /// A token was skipped into the pending error node.
    Skipped { kind: SymbolId },
    /// Skipping ended; parsing resumes in `state`.
    Resumed { state: StateId },
    /// Nothing could be resumed at end of input; the whole stack became
    /// the error root.
    Abandoned,
}

pub trait Tracer {
    /// A token was scanned (not taken from the previous tree).
    fn trace_lex(&mut self, token: &Token);

    /// A token was shifted, moving to `state`.
    fn trace_shift(&mut self, kind: SymbolId, state: StateId);

    /// An extra was pushed without changing state.
    fn trace_extra(&mut self, kind: SymbolId);

    /// `production` was reduced, popping `child_count` nodes; `state` is the
    /// goto target.
    fn trace_reduce(
        &mut self,
        production: ProductionId,
        lhs: SymbolId,
        child_count: usize,
        state: StateId,
    );

    /// A multi-action entry split a version into `count` versions.
    fn trace_fork(&mut self, state: StateId, kind: SymbolId, count: usize);

    /// Versions with equal state stacks were merged, leaving `remaining`.
    fn trace_merge(&mut self, remaining: usize);

    /// A subtree of the previous tree was pushed whole.
    fn trace_reuse(&mut self, kind: SymbolId, start: usize, len: usize);

    /// A leaf of the previous tree was used instead of scanning.
    fn trace_reuse_leaf(&mut self, kind: SymbolId, start: usize);

    fn trace_recover(&mut self, at: usize, recovery: Recovery);

    fn trace_accept(&mut self);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_lex(&mut self, _token: &Token) {}

    #[inline(always)]
    fn trace_shift(&mut self, _kind: SymbolId, _state: StateId) {}

    #[inline(always)]
    fn trace_extra(&mut self, _kind: SymbolId) {}

    #[inline(always)]
    fn trace_reduce(
        &mut self,
        _production: ProductionId,
        _lhs: SymbolId,
        _child_count: usize,
        _state: StateId,
    ) {
    }

    #[inline(always)]
    fn trace_fork(&mut self, _state: StateId, _kind: SymbolId, _count: usize) {}

    #[inline(always)]
    fn trace_merge(&mut self, _remaining: usize) {}

    #[inline(always)]
    fn trace_reuse(&mut self, _kind: SymbolId, _start: usize, _len: usize) {}

    #[inline(always)]
    fn trace_reuse_leaf(&mut self, _kind: SymbolId, _start: usize) {}

    #[inline(always)]
    fn trace_recover(&mut self, _at: usize, _recovery: Recovery) {}

    #[inline(always)]
    fn trace_accept(&mut self) {}
}

/// Counters over one parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    pub lexed: usize,
    pub shifts: usize,
    pub extras: usize,
    pub reductions: usize,
    pub forks: usize,
    pub merges: usize,
    pub reused_subtrees: usize,
    pub reused_bytes: usize,
    pub reused_leaves: usize,
    pub recoveries: usize,
}

/// Tracer that only counts.
#[derive(Debug, Default)]
pub struct StatsTracer {
    pub stats: ParseStats,
}

impl StatsTracer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tracer for StatsTracer {
    fn trace_lex(&mut self, _token: &Token) {
        self.stats.lexed += 1;
    }

    fn trace_shift(&mut self, _kind: SymbolId, _state: StateId) {
        self.stats.shifts += 1;
    }

    fn trace_extra(&mut self, _kind: SymbolId) {
        self.stats.extras += 1;
    }

    fn trace_reduce(
        &mut self,
        _production: ProductionId,
        _lhs: SymbolId,
        _child_count: usize,
        _state: StateId,
    ) {
        self.stats.reductions += 1;
    }

    fn trace_fork(&mut self, _state: StateId, _kind: SymbolId, _count: usize) {
        self.stats.forks += 1;
    }

    fn trace_merge(&mut self, _remaining: usize) {
        self.stats.merges += 1;
    }

    fn trace_reuse(&mut self, _kind: SymbolId, _start: usize, len: usize) {
        self.stats.reused_subtrees += 1;
        self.stats.reused_bytes += len;
    }

    fn trace_reuse_leaf(&mut self, _kind: SymbolId, _start: usize) {
        self.stats.reused_leaves += 1;
    }

    fn trace_recover(&mut self, _at: usize, _recovery: Recovery) {
        self.stats.recoveries += 1;
    }

    fn trace_accept(&mut self) {}
}

/// Tracer that collects one line per parser action.
pub struct PrintTracer {
    language: Language,
    lines: Vec<String>,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(language: &Language, colors: Colors) -> Self {
        Self {
            language: language.clone(),
            lines: Vec::new(),
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Print all trace lines.
    pub fn print(&self) {
        for line in &self.lines {
            println!("{}", line);
        }
    }

    /// Token kinds green, rule names blue; anonymous tokens quoted.
    fn symbol(&self, id: SymbolId) -> String {
        let c = self.colors;
        let name = self.language.symbol_name(id);
        if id.is_error() {
            c.paint(c.red, name)
        } else if self.language.table().is_terminal(id) {
            if self.language.is_named(id) {
                c.paint(c.green, name)
            } else {
                c.paint(c.green, &format!("{name:?}"))
            }
        } else {
            c.paint(c.blue, name)
        }
    }

    fn state(&self, state: StateId) -> String {
        self.colors.paint(self.colors.dim, &format!("S{}", state.0))
    }

    fn push(&mut self, verb: &str, content: String) {
        self.lines.push(format!("{verb:<8}{content}"));
    }
}

impl Tracer for PrintTracer {
    fn trace_lex(&mut self, token: &Token) {
        let range = self.colors.paint(self.colors.dim, &format!("{}..{}", token.start, token.end));
        let content = format!("{} {}", self.symbol(token.kind), range);
        self.push("lex", content);
    }

    fn trace_shift(&mut self, kind: SymbolId, state: StateId) {
        let content = format!("{} -> {}", self.symbol(kind), self.state(state));
        self.push("shift", content);
    }

    fn trace_extra(&mut self, kind: SymbolId) {
        let content = self.symbol(kind);
        self.push("extra", content);
    }

    fn trace_reduce(
        &mut self,
        production: ProductionId,
        lhs: SymbolId,
        child_count: usize,
        state: StateId,
    ) {
        let content = format!(
            "P{} {}/{} -> {}",
            production.0,
            self.symbol(lhs),
            child_count,
            self.state(state)
        );
        self.push("reduce", content);
    }

    fn trace_fork(&mut self, state: StateId, kind: SymbolId, count: usize) {
        let content = format!("{} on {} into {count}", self.state(state), self.symbol(kind));
        self.push("fork", content);
    }

    fn trace_merge(&mut self, remaining: usize) {
        self.push("merge", format!("{remaining} left"));
    }

    fn trace_reuse(&mut self, kind: SymbolId, start: usize, len: usize) {
        let range = self.colors.paint(self.colors.dim, &format!("{}..{}", start, start + len));
        let content = format!("{} {}", self.symbol(kind), range);
        self.push("reuse", content);
    }

    fn trace_reuse_leaf(&mut self, kind: SymbolId, start: usize) {
        let start = self.colors.paint(self.colors.dim, &start.to_string());
        let content = format!("{} {start}", self.symbol(kind));
        self.push("reuse", content);
    }

    fn trace_recover(&mut self, at: usize, recovery: Recovery) {
        let what = match recovery {
            Recovery::Missing { kind } => format!("missing {}", self.symbol(kind)),
            Recovery::Popped { state, entries } => {
                format!("pop {entries} to {}", self.state(state))
            }
            Recovery::Skipped { kind } => format!("skip {}", self.symbol(kind)),
            Recovery::Resumed { state } => format!("resume {}", self.state(state)),
            Recovery::Abandoned => "abandon".to_owned(),
        };
        let content = format!("{what} {}", self.colors.paint(self.colors.dim, &format!("@{at}")));
        self.push("recover", content);
    }

    fn trace_accept(&mut self) {
        self.lines.push("accept".to_owned());
    }
}
