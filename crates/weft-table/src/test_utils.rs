//! Hand-built tables for tests.

use weft_core::{LexModeId, LexStateId, ProductionId, StateId, SymbolId};

use crate::{Action, LexStateData, ProductionData, StateData, SymbolData, SymbolFlags, TableData};

/// Table for `pair: "a" "a"?` over the alphabet `{a, ' '}`, with spaces as
/// extras.
///
/// Symbols: 0 end, 1 "a", 2 space (extra), 3 pair.
pub(crate) fn pair_table() -> TableData {
    let term = SymbolFlags::TERMINAL;
    TableData {
        name: "pair".into(),
        symbols: vec![
            SymbolData {
                name: "end".into(),
                flags: term,
            },
            SymbolData {
                name: "a".into(),
                flags: term | SymbolFlags::VISIBLE | SymbolFlags::LITERAL,
            },
            SymbolData {
                name: "_space".into(),
                flags: term | SymbolFlags::NAMED | SymbolFlags::EXTRA,
            },
            SymbolData {
                name: "pair".into(),
                flags: SymbolFlags::NAMED | SymbolFlags::VISIBLE,
            },
        ],
        terminal_count: 3,
        start_symbol: SymbolId(3),
        productions: vec![
            ProductionData {
                lhs: SymbolId(3),
                rhs_len: 1,
                precedence: 0,
                dynamic_precedence: 0,
            },
            ProductionData {
                lhs: SymbolId(3),
                rhs_len: 2,
                precedence: 0,
                dynamic_precedence: -1,
            },
        ],
        states: vec![
            // 0: expect "a"
            StateData {
                lex_mode: LexModeId(1),
                entries: vec![
                    (SymbolId(3), vec![Action::Shift(StateId(1))]),
                    (SymbolId(1), vec![Action::Shift(StateId(2))]),
                ],
            },
            // 1: pair reduced
            StateData {
                lex_mode: LexModeId(2),
                entries: vec![(SymbolId::END, vec![Action::Accept])],
            },
            // 2: after the first "a"
            StateData {
                lex_mode: LexModeId(1),
                entries: vec![
                    (SymbolId::END, vec![Action::Reduce(ProductionId(0))]),
                    (SymbolId(1), vec![Action::Shift(StateId(3))]),
                ],
            },
            // 3: after the second "a"
            StateData {
                lex_mode: LexModeId(2),
                entries: vec![(SymbolId::END, vec![Action::Reduce(ProductionId(1))])],
            },
        ],
        lex_modes: vec![
            vec![SymbolId(1), SymbolId(2)],
            vec![SymbolId(1)],
            vec![],
        ],
        lex_states: vec![
            LexStateData {
                transitions: vec![(b' ', b' ', LexStateId(2)), (b'a', b'a', LexStateId(1))],
                accepts: vec![],
            },
            LexStateData {
                transitions: vec![],
                accepts: vec![SymbolId(1)],
            },
            LexStateData {
                transitions: vec![(b' ', b' ', LexStateId(2))],
                accepts: vec![SymbolId(2)],
            },
        ],
    }
}
