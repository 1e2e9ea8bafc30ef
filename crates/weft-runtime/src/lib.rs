#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Incremental, table-driven parser runtime.
//!
//! A [`Language`] wraps a validated parse table. A [`Parser`] turns text into
//! a [`Tree`] and, given the previous tree and the edits since, reparses
//! while reusing every subtree the edits provably did not affect. The result
//! of a reparse is always equal to a fresh parse of the same text.
//!
//! - `lexer` - longest-match scanning over the table's byte DFA
//! - `parser` - LR driver with GLR forking, error recovery and reuse
//! - `tree` - shared immutable nodes and positioned views over them
//! - `edit` - edit validation and position mapping
//! - `trace` - parser instrumentation

pub mod edit;
pub mod error;
mod language;
pub mod lexer;
pub mod options;
mod parser;
pub mod trace;
pub mod tree;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
pub mod test_utils;
#[cfg(test)]
mod tree_tests;

pub use edit::{Edit, EditSet};
pub use error::{EditError, ParseError, ParseResult};
pub use language::Language;
pub use lexer::{Lexer, Token};
pub use options::{CancellationFlag, ConflictPolicy, ParseOptions};
pub use parser::{Parser, ParserBuilder};
pub use trace::{NoopTracer, ParseStats, PrintTracer, Recovery, StatsTracer, Tracer};
pub use tree::{Node, NodeFlags, SyntaxNode, Tree, TreeCursor, TreePrinter};
