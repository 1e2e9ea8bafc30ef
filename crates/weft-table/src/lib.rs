#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Binary parse-table format.
//!
//! A table blob carries everything the runtime needs for one grammar: the
//! symbol table, productions, the LR action/goto table (with multi-action
//! entries for GLR forks) and the lexer automaton. [`TableData`] is the owned
//! form a table compiler fills in, [`write`] serializes it, and
//! [`ParseTable::from_bytes`] validates a blob before anything reads it.

mod action;
mod constants;
mod data;
pub mod dump;
mod header;
mod invariants;
mod table;
mod writer;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod test_utils;

pub use action::Action;
pub use constants::{MAGIC, SECTION_ALIGN, SymbolFlags, VERSION};
pub use data::{LexStateData, ProductionData, StateData, SymbolData, TableData};
pub use dump::dump;
pub use header::{Header, SectionOffsets};
pub use table::{ActionsView, Entry, ParseTable, Production, StringsView, Symbol, TableError};
pub use writer::write;
