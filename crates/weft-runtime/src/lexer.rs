//! Table-driven longest-match lexer.
//!
//! The table carries one byte DFA for every terminal of the grammar. A lex
//! mode restricts which accepts count, so one automaton serves every parse
//! state. Besides the token, the lexer reports how far it looked: a token is
//! only valid as long as none of the bytes it examined change, including the
//! ones past its end and end of input itself.

use weft_core::{LexModeId, LexStateId, StateId, SymbolId};
use weft_table::ParseTable;

/// One lexed token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: SymbolId,
    pub start: usize,
    pub end: usize,
    /// One past the last byte the automaton read. Observing end of input
    /// counts as reading the byte at `text.len()`.
    pub examined_end: usize,
}

impl Token {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Bytes examined beyond the token's end.
    pub fn lookahead_bytes(&self) -> usize {
        self.examined_end - self.end
    }

    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}

pub struct Lexer<'a> {
    table: &'a ParseTable,
    text: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(table: &'a ParseTable, text: &'a str) -> Self {
        Self { table, text }
    }

    /// Next token at `offset` for the union of the lex modes of `states`.
    pub fn next_token(&self, offset: usize, states: &[StateId]) -> Token {
        let modes: Vec<LexModeId> = states.iter().map(|&s| self.table.lex_mode(s)).collect();
        self.next_token_in(offset, &modes)
    }

    /// Next token at `offset`, taking the longest match among the terminals
    /// any of `modes` allows (extras always count).
    ///
    /// When nothing eligible matches but some other terminal does, that
    /// terminal is returned so the parser can report it. When nothing matches
    /// at all, one character becomes an error token.
    pub fn next_token_in(&self, offset: usize, modes: &[LexModeId]) -> Token {
        let bytes = self.text.as_bytes();
        assert!(offset <= bytes.len(), "lex offset {offset} past end of text");
        if offset == bytes.len() {
            return Token {
                kind: SymbolId::END,
                start: offset,
                end: offset,
                examined_end: offset + 1,
            };
        }

        let mut state = LexStateId::START;
        let mut pos = offset;
        let mut examined_end = offset;
        let mut eligible: Option<(SymbolId, usize)> = None;
        let mut any: Option<(SymbolId, usize)> = None;

        while self.table.lex_has_transitions(state) {
            if pos == bytes.len() {
                examined_end = bytes.len() + 1;
                break;
            }
            examined_end = pos + 1;
            let Some(next) = self.table.lex_step(state, bytes[pos]) else {
                break;
            };
            state = next;
            pos += 1;

            let mut accepts = self.table.lex_accepts(state).peekable();
            if let Some(&best) = accepts.peek() {
                any = Some((best, pos));
            }
            if let Some(kind) = accepts.find(|&t| self.allowed(modes, t)) {
                eligible = Some((kind, pos));
            }
        }

        if let Some((kind, end)) = eligible.or(any) {
            return Token {
                kind,
                start: offset,
                end,
                examined_end,
            };
        }

        let end = offset + char_width(self.text, offset);
        Token {
            kind: SymbolId::ERROR,
            start: offset,
            end,
            examined_end: examined_end.max(end),
        }
    }

    fn allowed(&self, modes: &[LexModeId], terminal: SymbolId) -> bool {
        modes.iter().any(|&m| self.table.mode_allows(m, terminal))
    }
}

/// Width of the character starting at `offset`, or 1 when `offset` is not
/// on a character boundary.
fn char_width(text: &str, offset: usize) -> usize {
    text.get(offset..)
        .and_then(|rest| rest.chars().next())
        .map_or(1, char::len_utf8)
}
