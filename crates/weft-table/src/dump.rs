//! Human-readable table listing for debugging and snapshot tests.

use std::fmt::Write as _;

use weft_core::{LexModeId, LexStateId, ProductionId, StateId, SymbolId};

use crate::action::Action;
use crate::table::ParseTable;

pub fn dump(table: &ParseTable) -> String {
    let mut out = String::new();

    dump_header(&mut out, table);
    dump_symbols(&mut out, table);
    dump_productions(&mut out, table);
    dump_states(&mut out, table);
    dump_lex_modes(&mut out, table);
    dump_lexer(&mut out, table);

    out
}

/// Digits needed for indices below `count`.
fn width_for_count(count: usize) -> usize {
    count.saturating_sub(1).max(1).ilog10() as usize + 1
}

/// Literals in quotes, named symbols bare.
pub fn symbol_label(table: &ParseTable, id: SymbolId) -> String {
    let name = table.symbol_name(id);
    if id.is_error() || id.is_end() || table.symbol_flags(id).is_named() {
        name.to_owned()
    } else {
        format!("{name:?}")
    }
}

fn dump_header(out: &mut String, table: &ParseTable) {
    let h = table.header();
    out.push_str("[table]\n");
    writeln!(out, "name = {}", table.name()).unwrap();
    writeln!(out, "version = {}", h.version).unwrap();
    writeln!(out, "start = {}", symbol_label(table, table.start_symbol())).unwrap();
    out.push('\n');
}

fn dump_symbols(out: &mut String, table: &ParseTable) {
    let w = width_for_count(table.symbol_count());
    out.push_str("[symbols]\n");
    for i in 0..table.symbol_count() {
        let id = SymbolId(i as u16);
        let flags = table.symbol(id).flags;
        let mut tags = Vec::new();
        if flags.is_terminal() {
            tags.push("terminal");
        }
        if !flags.is_visible() && !id.is_end() {
            tags.push("hidden");
        }
        if flags.is_extra() {
            tags.push("extra");
        }
        let label = symbol_label(table, id);
        if tags.is_empty() {
            writeln!(out, "{i:0w$} {label}").unwrap();
        } else {
            writeln!(out, "{i:0w$} {label}  ; {}", tags.join(" ")).unwrap();
        }
    }
    out.push('\n');
}

fn dump_productions(out: &mut String, table: &ParseTable) {
    let w = width_for_count(table.production_count());
    out.push_str("[productions]\n");
    for i in 0..table.production_count() {
        let p = table.production(ProductionId(i as u16));
        write!(out, "P{i:0w$} {} / {}", symbol_label(table, p.lhs), p.rhs_len).unwrap();
        if p.precedence != 0 {
            write!(out, "  prec={}", p.precedence).unwrap();
        }
        if p.dynamic_precedence != 0 {
            write!(out, "  dynamic={}", p.dynamic_precedence).unwrap();
        }
        out.push('\n');
    }
    out.push('\n');
}

fn dump_states(out: &mut String, table: &ParseTable) {
    let w = width_for_count(table.state_count());
    out.push_str("[states]\n");
    for i in 0..table.state_count() {
        let id = StateId(i as u16);
        writeln!(out, "S{i:0w$} M{}", table.lex_mode(id).0).unwrap();
        for entry in table.entries(id) {
            let actions: Vec<_> = entry
                .actions
                .iter()
                .map(|a| format_action(a, table.is_terminal(entry.symbol)))
                .collect();
            writeln!(
                out,
                "  {} => {}",
                symbol_label(table, entry.symbol),
                actions.join(" | ")
            )
            .unwrap();
        }
    }
    out.push('\n');
}

fn format_action(action: Action, on_terminal: bool) -> String {
    match action {
        Action::Shift(s) if on_terminal => format!("shift S{}", s.0),
        Action::Shift(s) => format!("goto S{}", s.0),
        Action::Reduce(p) => format!("reduce P{}", p.0),
        Action::Accept => "accept".to_owned(),
    }
}

fn dump_lex_modes(out: &mut String, table: &ParseTable) {
    out.push_str("[lex.modes]\n");
    for m in 0..table.lex_mode_count() {
        let mode = LexModeId(m as u16);
        let members: Vec<_> = (1..table.terminal_count())
            .map(|t| SymbolId(t as u16))
            .filter(|&t| !table.symbol(t).flags.is_extra() && table.mode_allows(mode, t))
            .map(|t| symbol_label(table, t))
            .collect();
        writeln!(out, "M{m} = {{{}}}", members.join(", ")).unwrap();
    }
    out.push('\n');
}

fn dump_lexer(out: &mut String, table: &ParseTable) {
    let w = width_for_count(table.lex_state_count());
    out.push_str("[lex.states]\n");
    for i in 0..table.lex_state_count() {
        let id = LexStateId(i as u16);
        let edges: Vec<_> = table
            .lex_transitions(id)
            .map(|(lo, hi, target)| {
                if lo == hi {
                    format!("{} -> L{}", format_byte(lo), target.0)
                } else {
                    format!("{}-{} -> L{}", format_byte(lo), format_byte(hi), target.0)
                }
            })
            .collect();
        let accepts: Vec<_> = table
            .lex_accepts(id)
            .map(|t| symbol_label(table, t))
            .collect();
        write!(out, "L{i:0w$}").unwrap();
        if !edges.is_empty() {
            write!(out, " {}", edges.join(", ")).unwrap();
        }
        if !accepts.is_empty() {
            write!(out, "  ; accept {}", accepts.join(" ")).unwrap();
        }
        out.push('\n');
    }
}

fn format_byte(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("{b:#04x}")
    }
}
