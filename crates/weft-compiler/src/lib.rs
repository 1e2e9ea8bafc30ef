#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Reference grammar compiler for weft.
//!
//! Turns a [`Grammar`] into a parse-table blob:
//! - `lower` - rules to terminals and flat productions
//! - `lex` - one lexer DFA for every terminal, with ordered accept lists
//! - `lr` - canonical LR(1) automaton, precedence and declared conflicts
//! - `emit` - [`TableData`] assembly, one lex mode per distinct terminal set

mod emit;
mod error;
mod lex;
mod lower;
mod lr;

#[cfg(test)]
pub mod test_utils;

use weft_core::Grammar;
use weft_table::TableData;

pub use error::{CompileError, CompileResult};

/// Compiles `grammar` into the owned table form.
pub fn build_table(grammar: &Grammar) -> CompileResult<TableData> {
    let lowered = lower::lower(grammar)?;
    let lex_states = lex::build_lexer(&lowered.terminals)?;
    let automaton = lr::build(&lowered)?;
    let data = emit::table_data(&lowered, &automaton, lex_states)?;

    tracing::debug!(
        grammar = %grammar.name,
        terminals = lowered.terminals.len(),
        nonterminals = lowered.nonterminals.len(),
        productions = lowered.productions.len(),
        states = data.states.len(),
        lex_states = data.lex_states.len(),
        lex_modes = data.lex_modes.len(),
        "compiled grammar"
    );
    Ok(data)
}

/// Compiles `grammar` into a table blob ready for
/// [`weft_table::ParseTable::from_bytes`].
pub fn compile(grammar: &Grammar) -> CompileResult<Vec<u8>> {
    Ok(weft_table::write(&build_table(grammar)?)?)
}
