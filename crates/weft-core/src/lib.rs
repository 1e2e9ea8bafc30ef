#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared vocabulary of the weft parsing engine.
//!
//! - **Grammar layer**: 1:1 mapping of tree-sitter `grammar.json`, plus a
//!   builder DSL for writing grammars in Rust.
//! - **Identifier layer**: index newtypes shared by the table format, the
//!   compiler and the runtime.

pub mod colors;
pub mod grammar;
mod ids;


pub use colors::Colors;
pub use grammar::{Grammar, GrammarError, Precedence, PrecedenceEntry, Rule};
pub use ids::{LexModeId, LexStateId, ProductionId, StateId, StringId, SymbolId};
