//! Serialization of [`TableData`] into a table blob.

use indexmap::IndexSet;

use crate::constants::{HEADER_SIZE, lex_mode_size};
use crate::data::TableData;
use crate::header::{Header, align_up};
use crate::table::TableError;

/// Serialize a table. Entries are sorted by symbol on the way out.
///
/// Only sizes are checked here; semantic consistency is checked when the
/// blob is loaded.
pub fn write(data: &TableData) -> Result<Vec<u8>, TableError> {
    let strings = intern_strings(data);

    let mut str_blob = Vec::new();
    let mut str_table = Vec::with_capacity((strings.len() + 1) * 4);
    for s in &strings {
        str_table.extend_from_slice(&count_u32(str_blob.len(), "string blob")?.to_le_bytes());
        str_blob.extend_from_slice(s.as_bytes());
    }
    str_table.extend_from_slice(&count_u32(str_blob.len(), "string blob")?.to_le_bytes());

    let mut symbols = Vec::with_capacity(data.symbols.len() * 4);
    for sym in &data.symbols {
        let name = string_id(&strings, &sym.name);
        symbols.extend_from_slice(&name.to_le_bytes());
        symbols.push(sym.flags.0);
        symbols.push(0);
    }

    let mut productions = Vec::with_capacity(data.productions.len() * 8);
    for p in &data.productions {
        productions.extend_from_slice(&p.lhs.0.to_le_bytes());
        productions.extend_from_slice(&p.rhs_len.to_le_bytes());
        productions.extend_from_slice(&p.precedence.to_le_bytes());
        productions.extend_from_slice(&p.dynamic_precedence.to_le_bytes());
    }

    let mut states = Vec::with_capacity(data.states.len() * 8);
    let mut entries = Vec::new();
    let mut actions = Vec::new();
    let mut entry_count = 0usize;
    let mut action_count = 0usize;
    for state in &data.states {
        let mut sorted: Vec<_> = state.entries.iter().collect();
        sorted.sort_by_key(|(symbol, _)| *symbol);

        states.extend_from_slice(&count_u32(entry_count, "entries")?.to_le_bytes());
        states.extend_from_slice(&count_u16(sorted.len(), "entries per state")?.to_le_bytes());
        states.extend_from_slice(&state.lex_mode.0.to_le_bytes());

        for (symbol, list) in sorted {
            entries.extend_from_slice(&symbol.0.to_le_bytes());
            entries.extend_from_slice(&count_u16(list.len(), "actions per entry")?.to_le_bytes());
            entries.extend_from_slice(&count_u32(action_count, "actions")?.to_le_bytes());
            for action in list {
                actions.extend_from_slice(&action.to_bytes());
            }
            action_count += list.len();
        }
        entry_count += state.entries.len();
    }

    let mode_size = lex_mode_size(data.terminal_count);
    let mut lex_modes = vec![0u8; data.lex_modes.len() * mode_size];
    for (i, mode) in data.lex_modes.iter().enumerate() {
        for terminal in mode {
            let bit = terminal.index();
            if bit >= data.terminal_count as usize {
                return Err(TableError::Overflow("lex mode terminal"));
            }
            lex_modes[i * mode_size + bit / 8] |= 1 << (bit % 8);
        }
    }

    let mut lex_states = Vec::with_capacity(data.lex_states.len() * 12);
    let mut lex_transitions = Vec::new();
    let mut lex_accepts = Vec::new();
    let mut transition_count = 0usize;
    let mut accept_count = 0usize;
    for ls in &data.lex_states {
        let mut sorted = ls.transitions.clone();
        sorted.sort_by_key(|(lo, _, _)| *lo);

        let first_transition = count_u32(transition_count, "lex transitions")?;
        lex_states.extend_from_slice(&first_transition.to_le_bytes());
        lex_states.extend_from_slice(&count_u16(sorted.len(), "lex transitions")?.to_le_bytes());
        lex_states.extend_from_slice(&count_u16(ls.accepts.len(), "lex accepts")?.to_le_bytes());
        lex_states.extend_from_slice(&count_u32(accept_count, "lex accepts")?.to_le_bytes());

        for (lo, hi, target) in sorted {
            lex_transitions.push(lo);
            lex_transitions.push(hi);
            lex_transitions.extend_from_slice(&target.0.to_le_bytes());
        }
        for terminal in &ls.accepts {
            lex_accepts.extend_from_slice(&terminal.0.to_le_bytes());
        }
        transition_count += ls.transitions.len();
        accept_count += ls.accepts.len();
    }

    let mut header = Header {
        str_blob_size: count_u32(str_blob.len(), "string blob")?,
        entry_count: count_u32(entry_count, "entries")?,
        action_count: count_u32(action_count, "actions")?,
        lex_transition_count: count_u32(transition_count, "lex transitions")?,
        lex_accept_count: count_u32(accept_count, "lex accepts")?,
        str_table_count: count_u16(strings.len(), "strings")?,
        symbol_count: count_u16(data.symbols.len(), "symbols")?,
        terminal_count: data.terminal_count,
        production_count: count_u16(data.productions.len(), "productions")?,
        state_count: count_u16(data.states.len(), "states")?,
        lex_mode_count: count_u16(data.lex_modes.len(), "lex modes")?,
        lex_state_count: count_u16(data.lex_states.len(), "lex states")?,
        start_symbol: data.start_symbol.0,
        ..Default::default()
    };

    let mut output = vec![0u8; HEADER_SIZE];
    for section in [
        &str_blob,
        &str_table,
        &symbols,
        &productions,
        &states,
        &entries,
        &actions,
        &lex_modes,
        &lex_states,
        &lex_transitions,
        &lex_accepts,
    ] {
        emit_section(&mut output, section);
    }

    header.total_size = count_u32(output.len(), "file")?;
    header.checksum = crc32fast::hash(&output[HEADER_SIZE..]);
    output[..HEADER_SIZE].copy_from_slice(&header.to_bytes());

    Ok(output)
}

/// String 0 is the grammar name; symbol names follow, deduplicated.
fn intern_strings(data: &TableData) -> IndexSet<&str> {
    let mut strings = IndexSet::new();
    strings.insert(data.name.as_str());
    for sym in &data.symbols {
        strings.insert(sym.name.as_str());
    }
    strings
}

fn string_id(strings: &IndexSet<&str>, s: &str) -> u16 {
    // Interned from the same data a moment ago, and the count was checked
    // against u16 before the header is written.
    strings.get_index_of(s).map_or(0, |i| i as u16)
}

fn emit_section(output: &mut Vec<u8>, section: &[u8]) {
    output.extend_from_slice(section);
    let padded = align_up(output.len() as u64) as usize;
    output.resize(padded, 0);
}

fn count_u16(n: usize, what: &'static str) -> Result<u16, TableError> {
    u16::try_from(n).map_err(|_| TableError::Overflow(what))
}

fn count_u32(n: usize, what: &'static str) -> Result<u32, TableError> {
    u32::try_from(n).map_err(|_| TableError::Overflow(what))
}
