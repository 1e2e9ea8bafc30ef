//! Owned table form, filled by a table compiler and serialized by
//! [`crate::write`].

use weft_core::{LexModeId, LexStateId, SymbolId};

use crate::action::Action;
use crate::constants::SymbolFlags;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableData {
    /// Grammar name.
    pub name: String,
    /// `END` first, then terminals, then nonterminals.
    pub symbols: Vec<SymbolData>,
    /// Number of terminals, `END` included.
    pub terminal_count: u16,
    pub start_symbol: SymbolId,
    pub productions: Vec<ProductionData>,
    /// State 0 is the initial state.
    pub states: Vec<StateData>,
    /// Valid terminal sets. Mode 0 must hold every terminal.
    pub lex_modes: Vec<Vec<SymbolId>>,
    /// Lexer DFA. State 0 is the start state.
    pub lex_states: Vec<LexStateData>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolData {
    pub name: String,
    pub flags: SymbolFlags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProductionData {
    pub lhs: SymbolId,
    pub rhs_len: u16,
    pub precedence: i16,
    pub dynamic_precedence: i16,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateData {
    pub lex_mode: LexModeId,
    /// Actions per symbol. More than one action is a GLR fork, tried in the
    /// listed order.
    pub entries: Vec<(SymbolId, Vec<Action>)>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexStateData {
    /// Inclusive byte ranges, disjoint.
    pub transitions: Vec<(u8, u8, LexStateId)>,
    /// Terminals accepted here, best first.
    pub accepts: Vec<SymbolId>,
}
