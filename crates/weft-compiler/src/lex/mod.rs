//! Lexer automaton construction.
//!
//! Every terminal is one pattern of a single anchored multi-pattern DFA
//! (`regex-automata`, all-matches semantics). The DFA is then walked byte by
//! byte into the table's own representation: range transitions plus an
//! ordered accept list per state. A state accepts a terminal when the DFA
//! reports that terminal's match at end of input from it, so the accept list
//! describes matches ending exactly at the current position.


use std::cmp::Reverse;
use std::collections::HashMap;
use std::collections::VecDeque;

use regex_automata::dfa::{Automaton, StartKind, dense};
use regex_automata::util::primitives::StateID;
use regex_automata::{Anchored, Input, MatchKind};
use weft_core::{LexStateId, SymbolId};
use weft_table::LexStateData;

use crate::error::{CompileError, CompileResult};
use crate::lower::Terminal;

/// Builds the lexer states for `terminals`. Terminal `i` gets symbol id
/// `i + 1`.
pub fn build_lexer(terminals: &[Terminal]) -> CompileResult<Vec<LexStateData>> {
    for terminal in terminals {
        check_pattern(terminal)?;
    }

    let patterns: Vec<&str> = terminals.iter().map(|t| t.regex.as_str()).collect();
    let dfa = dense::Builder::new()
        .configure(
            dense::Config::new()
                .match_kind(MatchKind::All)
                .start_kind(StartKind::Anchored)
                .minimize(true),
        )
        .build_many(&patterns)
        .map_err(|e| CompileError::Regex {
            name: "lexer".into(),
            message: e.to_string(),
        })?;

    let start = dfa
        .start_state_forward(&Input::new("").anchored(Anchored::Yes))
        .map_err(|e| CompileError::Regex {
            name: "lexer".into(),
            message: e.to_string(),
        })?;

    let raw = explore(&dfa, start);
    let live = live_states(&raw);
    let states = renumber(&raw, &live, terminals)?;
    tracing::debug!(
        dfa_states = raw.len(),
        lex_states = states.len(),
        "built lexer automaton"
    );
    Ok(states)
}

fn check_pattern(terminal: &Terminal) -> CompileResult<()> {
    let hir = regex_syntax::Parser::new()
        .parse(&terminal.regex)
        .map_err(|e| CompileError::Regex {
            name: terminal.name.clone(),
            message: e.to_string(),
        })?;
    let props = hir.properties();
    if !props.look_set().is_empty() {
        return Err(CompileError::Unsupported(format!(
            "anchors or word boundaries in token `{}`",
            terminal.name
        )));
    }
    if props.minimum_len() == Some(0) {
        return Err(CompileError::EmptyToken(terminal.name.clone()));
    }
    Ok(())
}

/// A DFA state as found by the walk.
struct RawState {
    edges: Vec<(u8, usize)>,
    /// Pattern indices, unordered.
    accepts: Vec<usize>,
}

/// Breadth-first walk over every state reachable from `start`.
fn explore(dfa: &dense::DFA<Vec<u32>>, start: StateID) -> Vec<RawState> {
    let mut index: HashMap<StateID, usize> = HashMap::new();
    let mut queue = VecDeque::new();
    let mut states = Vec::new();

    index.insert(start, 0);
    queue.push_back(start);

    while let Some(id) = queue.pop_front() {
        let mut accepts = Vec::new();
        let eoi = dfa.next_eoi_state(id);
        if dfa.is_match_state(eoi) {
            for i in 0..dfa.match_len(eoi) {
                accepts.push(dfa.match_pattern(eoi, i).as_usize());
            }
        }

        let mut edges = Vec::new();
        for byte in 0..=u8::MAX {
            let next = dfa.next_state(id, byte);
            if dfa.is_dead_state(next) || dfa.is_quit_state(next) {
                continue;
            }
            let target = match index.get(&next) {
                Some(&target) => target,
                None => {
                    let target = index.len();
                    index.insert(next, target);
                    queue.push_back(next);
                    target
                }
            };
            edges.push((byte, target));
        }

        states.push(RawState { edges, accepts });
    }

    states
}

/// States from which some accepting state is reachable.
fn live_states(states: &[RawState]) -> Vec<bool> {
    let mut live: Vec<bool> = states.iter().map(|s| !s.accepts.is_empty()).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for (i, state) in states.iter().enumerate() {
            if !live[i] && state.edges.iter().any(|&(_, t)| live[t]) {
                live[i] = true;
                changed = true;
            }
        }
    }
    live
}

/// Drops dead states, merges byte edges into ranges and orders accept lists.
fn renumber(
    raw: &[RawState],
    live: &[bool],
    terminals: &[Terminal],
) -> CompileResult<Vec<LexStateData>> {
    // The start state stays even when nothing can be lexed.
    let mut ids = vec![None; raw.len()];
    let mut order = vec![0];
    ids[0] = Some(0u16);
    let mut cursor = 0;
    while cursor < order.len() {
        for &(_, target) in &raw[order[cursor]].edges {
            if live[target] && ids[target].is_none() {
                if order.len() >= u16::MAX as usize {
                    return Err(CompileError::TooManyStates(order.len() + 1));
                }
                ids[target] = Some(order.len() as u16);
                order.push(target);
            }
        }
        cursor += 1;
    }

    let mut states = Vec::with_capacity(order.len());
    for &old in &order {
        let state = &raw[old];

        let mut transitions: Vec<(u8, u8, LexStateId)> = Vec::new();
        for &(byte, target) in &state.edges {
            let Some(target) = ids[target] else { continue };
            let target = LexStateId(target);
            match transitions.last_mut() {
                Some((_, hi, t)) if *t == target && *hi as u16 + 1 == byte as u16 => *hi = byte,
                _ => transitions.push((byte, byte, target)),
            }
        }

        let mut accepts = state.accepts.clone();
        accepts.sort_by_key(|&p| {
            let t = &terminals[p];
            (Reverse(t.precedence), !t.literal, p)
        });

        states.push(LexStateData {
            transitions,
            accepts: accepts.into_iter().map(|p| SymbolId(p as u16 + 1)).collect(),
        });
    }
    Ok(states)
}
