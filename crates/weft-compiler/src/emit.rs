//! Assembly of [`TableData`] from the lowered grammar, the LR automaton and
//! the lexer states.

use indexmap::IndexSet;
use weft_core::{LexModeId, SymbolId};
use weft_table::{LexStateData, ProductionData, StateData, SymbolData, SymbolFlags, TableData};

use crate::error::{CompileError, CompileResult};
use crate::lower::LoweredGrammar;
use crate::lr::{LrAutomaton, shift};

pub fn table_data(
    grammar: &LoweredGrammar,
    automaton: &LrAutomaton,
    lex_states: Vec<LexStateData>,
) -> CompileResult<TableData> {
    let terminal_count = grammar.terminals.len() + 1;
    let symbol_count = terminal_count + grammar.nonterminals.len();
    if symbol_count >= u16::MAX as usize {
        return Err(CompileError::TooManySymbols(symbol_count));
    }
    let nonterminal = |n: usize| SymbolId((terminal_count + n) as u16);

    let mut symbols = Vec::with_capacity(symbol_count);
    symbols.push(SymbolData {
        name: "end".into(),
        flags: SymbolFlags::TERMINAL,
    });
    for terminal in &grammar.terminals {
        let mut flags = SymbolFlags::TERMINAL;
        if terminal.named {
            flags = flags | SymbolFlags::NAMED;
        }
        if terminal.visible {
            flags = flags | SymbolFlags::VISIBLE;
        }
        if terminal.literal {
            flags = flags | SymbolFlags::LITERAL;
        }
        if terminal.extra {
            flags = flags | SymbolFlags::EXTRA;
        }
        symbols.push(SymbolData {
            name: terminal.name.clone(),
            flags,
        });
    }
    for n in &grammar.nonterminals {
        let flags = if n.visible {
            SymbolFlags::NAMED | SymbolFlags::VISIBLE
        } else {
            SymbolFlags::NAMED
        };
        symbols.push(SymbolData {
            name: n.name.clone(),
            flags,
        });
    }

    let productions = grammar
        .productions
        .iter()
        .map(|p| ProductionData {
            lhs: nonterminal(p.lhs),
            rhs_len: p.alternative.symbols.len() as u16,
            precedence: clamp(p.alternative.precedence.unwrap_or(0)),
            dynamic_precedence: clamp(p.alternative.dynamic_precedence),
        })
        .collect();

    let mut lex_modes: IndexSet<Vec<SymbolId>> = IndexSet::new();
    lex_modes.insert((1..terminal_count).map(|t| SymbolId(t as u16)).collect());

    let mut states = Vec::with_capacity(automaton.states.len());
    for state in &automaton.states {
        let valid: Vec<SymbolId> = state
            .actions
            .keys()
            .filter(|&&slot| slot != 0 && !grammar.terminals[slot - 1].extra)
            .map(|&slot| SymbolId(slot as u16))
            .collect();
        let (mode, _) = lex_modes.insert_full(valid);
        if mode >= u16::MAX as usize {
            return Err(CompileError::TooManyStates(mode + 1));
        }

        let mut entries: Vec<_> = state
            .actions
            .iter()
            .map(|(&slot, actions)| (SymbolId(slot as u16), actions.clone()))
            .collect();
        entries.extend(
            state
                .gotos
                .iter()
                .map(|(&n, &target)| (nonterminal(n), vec![shift(target)])),
        );

        states.push(StateData {
            lex_mode: LexModeId(mode as u16),
            entries,
        });
    }

    Ok(TableData {
        name: grammar.name.clone(),
        symbols,
        terminal_count: terminal_count as u16,
        start_symbol: nonterminal(0),
        productions,
        states,
        lex_modes: lex_modes.into_iter().collect(),
        lex_states,
    })
}

fn clamp(value: i32) -> i16 {
    value.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
