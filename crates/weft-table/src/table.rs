//! Validated, read-only parse table.
//!
//! [`ParseTable`] owns the blob and decodes records lazily. Every index the
//! runtime follows is checked once at load time by `verify`, so the
//! accessors below only panic on defects of this crate itself.

use std::io;
use std::ops::Deref;
use std::path::Path;

use weft_core::{LexModeId, LexStateId, ProductionId, StateId, StringId, SymbolId};

use crate::action::Action;
use crate::constants::{
    ACTION_SIZE, ENTRY_SIZE, HEADER_SIZE, LEX_ACCEPT_SIZE, LEX_STATE_SIZE, LEX_TRANSITION_SIZE,
    PRODUCTION_SIZE, STATE_SIZE, SYMBOL_SIZE, SymbolFlags, VERSION, lex_mode_size,
};
use crate::header::{Header, SectionOffsets};

#[inline]
pub(crate) fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
pub(crate) fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Owned table bytes.
#[derive(Debug)]
pub struct ByteStorage(Vec<u8>);

impl Deref for ByteStorage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Table load error.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("invalid magic: expected WFTB")]
    InvalidMagic,
    #[error("grammar table version {found} is not supported (expected {expected})")]
    GrammarVersionMismatch { found: u32, expected: u32 },
    #[error("file too small: {0} bytes (minimum 64)")]
    TooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {header:#010x}, content hashes to {actual:#010x}")]
    ChecksumMismatch { header: u32, actual: u32 },
    #[error("corrupt table: {0}")]
    Corrupt(&'static str),
    #[error("table too large: {0} exceeds the format limit")]
    Overflow(&'static str),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: StringId,
    pub flags: SymbolFlags,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: SymbolId,
    pub rhs_len: u16,
    pub precedence: i16,
    pub dynamic_precedence: i16,
}

#[derive(Clone, Copy, Debug)]
struct StateRecord {
    entry_start: u32,
    entry_count: u16,
    lex_mode: LexModeId,
}

#[derive(Clone, Copy, Debug)]
struct LexStateRecord {
    transition_start: u32,
    transition_count: u16,
    accept_count: u16,
    accept_start: u32,
}

/// A compiled grammar table.
#[derive(Debug)]
pub struct ParseTable {
    storage: ByteStorage,
    header: Header,
    offsets: SectionOffsets,
}

impl ParseTable {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TableError> {
        Self::from_storage(ByteStorage(bytes))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes)
    }

    fn from_storage(storage: ByteStorage) -> Result<Self, TableError> {
        if storage.len() < HEADER_SIZE {
            return Err(TableError::TooSmall(storage.len()));
        }

        let header = Header::from_bytes(&storage[..HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(TableError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(TableError::GrammarVersionMismatch {
                found: header.version,
                expected: VERSION,
            });
        }
        if header.total_size as usize != storage.len() {
            return Err(TableError::SizeMismatch {
                header: header.total_size,
                actual: storage.len(),
            });
        }
        let actual = crc32fast::hash(&storage[HEADER_SIZE..]);
        if actual != header.checksum {
            return Err(TableError::ChecksumMismatch {
                header: header.checksum,
                actual,
            });
        }

        let offsets = header
            .compute_offsets()
            .ok_or(TableError::Corrupt("section layout overflows"))?;
        if offsets.end as usize != storage.len() {
            return Err(TableError::Corrupt("section layout does not match file size"));
        }

        let table = Self {
            storage,
            header,
            offsets,
        };
        table.verify()?;
        Ok(table)
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    pub fn strings(&self) -> StringsView<'_> {
        let table_at = self.offsets.str_table as usize;
        let count = self.header.str_table_count as usize;
        StringsView {
            blob: &self.storage[self.offsets.str_blob as usize..],
            table: &self.storage[table_at..table_at + (count + 1) * 4],
        }
    }

    /// Grammar name.
    pub fn name(&self) -> &str {
        self.strings().get(StringId(0))
    }

    pub fn symbol_count(&self) -> usize {
        self.header.symbol_count as usize
    }

    /// Number of terminals, `END` included.
    pub fn terminal_count(&self) -> usize {
        self.header.terminal_count as usize
    }

    pub fn state_count(&self) -> usize {
        self.header.state_count as usize
    }

    pub fn production_count(&self) -> usize {
        self.header.production_count as usize
    }

    pub fn lex_mode_count(&self) -> usize {
        self.header.lex_mode_count as usize
    }

    pub fn lex_state_count(&self) -> usize {
        self.header.lex_state_count as usize
    }

    pub fn start_symbol(&self) -> SymbolId {
        SymbolId(self.header.start_symbol)
    }

    #[inline]
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id.index() < self.terminal_count()
    }

    pub fn symbol(&self, id: SymbolId) -> Symbol {
        let at = self.ensure_index(id.index(), self.symbol_count(), "symbol");
        let base = self.offsets.symbols as usize + at * SYMBOL_SIZE;
        Symbol {
            name: StringId(read_u16_le(&self.storage, base)),
            flags: SymbolFlags(self.storage[base + 2]),
        }
    }

    /// Display name. `ERROR` has no table entry and is named here.
    pub fn symbol_name(&self, id: SymbolId) -> &str {
        if id.is_error() {
            return "ERROR";
        }
        self.strings().get(self.symbol(id).name)
    }

    /// Flags for any symbol the runtime may put in a tree, `ERROR` included.
    pub fn symbol_flags(&self, id: SymbolId) -> SymbolFlags {
        if id.is_error() {
            return SymbolFlags::NAMED | SymbolFlags::VISIBLE;
        }
        self.symbol(id).flags
    }

    /// Look up a symbol by display name and namedness.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SymbolId> {
        if name == "ERROR" && named {
            return Some(SymbolId::ERROR);
        }
        (0..self.symbol_count())
            .map(|i| SymbolId(i as u16))
            .find(|&id| self.symbol_name(id) == name && self.symbol(id).flags.is_named() == named)
    }

    pub fn production(&self, id: ProductionId) -> Production {
        let at = self.ensure_index(id.index(), self.production_count(), "production");
        let base = self.offsets.productions as usize + at * PRODUCTION_SIZE;
        Production {
            lhs: SymbolId(read_u16_le(&self.storage, base)),
            rhs_len: read_u16_le(&self.storage, base + 2),
            precedence: read_u16_le(&self.storage, base + 4) as i16,
            dynamic_precedence: read_u16_le(&self.storage, base + 6) as i16,
        }
    }

    fn state_record(&self, id: StateId) -> StateRecord {
        let at = self.ensure_index(id.index(), self.state_count(), "state");
        let base = self.offsets.states as usize + at * STATE_SIZE;
        StateRecord {
            entry_start: read_u32_le(&self.storage, base),
            entry_count: read_u16_le(&self.storage, base + 4),
            lex_mode: LexModeId(read_u16_le(&self.storage, base + 6)),
        }
    }

    pub fn lex_mode(&self, state: StateId) -> LexModeId {
        self.state_record(state).lex_mode
    }

    /// Every entry of a state, in symbol order.
    pub fn entries(&self, state: StateId) -> impl Iterator<Item = Entry<'_>> + '_ {
        let record = self.state_record(state);
        let start = record.entry_start as usize;
        (0..record.entry_count as usize).map(move |i| self.entry_at(start + i))
    }

    fn entry_at(&self, index: usize) -> Entry<'_> {
        let base = self.offsets.entries as usize + index * ENTRY_SIZE;
        let symbol = SymbolId(read_u16_le(&self.storage, base));
        let count = read_u16_le(&self.storage, base + 2) as usize;
        let start = read_u32_le(&self.storage, base + 4) as usize;
        let at = self.offsets.actions as usize + start * ACTION_SIZE;
        Entry {
            symbol,
            actions: ActionsView {
                bytes: &self.storage[at..at + count * ACTION_SIZE],
            },
        }
    }

    /// Actions of `state` on `symbol`; empty when there are none.
    pub fn actions(&self, state: StateId, symbol: SymbolId) -> ActionsView<'_> {
        let record = self.state_record(state);
        let (mut lo, mut hi) = (0usize, record.entry_count as usize);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let entry = self.entry_at(record.entry_start as usize + mid);
            match entry.symbol.cmp(&symbol) {
                std::cmp::Ordering::Less => lo = mid + 1,
                std::cmp::Ordering::Greater => hi = mid,
                std::cmp::Ordering::Equal => return entry.actions,
            }
        }
        ActionsView { bytes: &[] }
    }

    pub fn has_action(&self, state: StateId, symbol: SymbolId) -> bool {
        !self.actions(state, symbol).is_empty()
    }

    /// Goto target after reducing to `nonterminal` with `state` exposed.
    pub fn goto(&self, state: StateId, nonterminal: SymbolId) -> Option<StateId> {
        match self.actions(state, nonterminal).first() {
            Some(Action::Shift(target)) => Some(target),
            _ => None,
        }
    }

    /// Terminals with an action in `state`, in symbol order.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = SymbolId> + '_ {
        self.entries(state)
            .map(|e| e.symbol)
            .filter(move |&s| self.is_terminal(s))
    }

    /// Whether `terminal` is valid in `mode`. Extras are valid everywhere.
    pub fn mode_allows(&self, mode: LexModeId, terminal: SymbolId) -> bool {
        let bit = terminal.index();
        if bit >= self.terminal_count() {
            return false;
        }
        if self.symbol(terminal).flags.is_extra() {
            return true;
        }
        let at = self.ensure_index(mode.index(), self.lex_mode_count(), "lex mode");
        let base =
            self.offsets.lex_modes as usize + at * lex_mode_size(self.header.terminal_count);
        self.storage[base + bit / 8] & (1 << (bit % 8)) != 0
    }

    fn lex_record(&self, id: LexStateId) -> LexStateRecord {
        let at = self.ensure_index(id.index(), self.lex_state_count(), "lex state");
        let base = self.offsets.lex_states as usize + at * LEX_STATE_SIZE;
        LexStateRecord {
            transition_start: read_u32_le(&self.storage, base),
            transition_count: read_u16_le(&self.storage, base + 4),
            accept_count: read_u16_le(&self.storage, base + 6),
            accept_start: read_u32_le(&self.storage, base + 8),
        }
    }

    /// Whether the lexer automaton can continue from `state` at all.
    pub fn lex_has_transitions(&self, state: LexStateId) -> bool {
        self.lex_record(state).transition_count > 0
    }

    /// Transitions of a lexer state as `(lo, hi, target)`, ascending.
    pub fn lex_transitions(
        &self,
        state: LexStateId,
    ) -> impl Iterator<Item = (u8, u8, LexStateId)> + '_ {
        let record = self.lex_record(state);
        let base = self.offsets.lex_transitions as usize
            + record.transition_start as usize * LEX_TRANSITION_SIZE;
        (0..record.transition_count as usize).map(move |i| {
            let at = base + i * LEX_TRANSITION_SIZE;
            (
                self.storage[at],
                self.storage[at + 1],
                LexStateId(read_u16_le(&self.storage, at + 2)),
            )
        })
    }

    /// Follow `byte` out of lexer state `state`.
    pub fn lex_step(&self, state: LexStateId, byte: u8) -> Option<LexStateId> {
        let record = self.lex_record(state);
        let base = self.offsets.lex_transitions as usize
            + record.transition_start as usize * LEX_TRANSITION_SIZE;
        let (mut lo, mut hi) = (0usize, record.transition_count as usize);
        while lo < hi {
            let mid = (lo + hi) / 2;
            let at = base + mid * LEX_TRANSITION_SIZE;
            let (from, to) = (self.storage[at], self.storage[at + 1]);
            if byte < from {
                hi = mid;
            } else if byte > to {
                lo = mid + 1;
            } else {
                return Some(LexStateId(read_u16_le(&self.storage, at + 2)));
            }
        }
        None
    }

    /// Terminals accepted in lexer state `state`, best first.
    pub fn lex_accepts(&self, state: LexStateId) -> impl Iterator<Item = SymbolId> + '_ {
        let record = self.lex_record(state);
        let base =
            self.offsets.lex_accepts as usize + record.accept_start as usize * LEX_ACCEPT_SIZE;
        (0..record.accept_count as usize)
            .map(move |i| SymbolId(read_u16_le(&self.storage, base + i * LEX_ACCEPT_SIZE)))
    }

    /// Check every cross-reference once, so that later reads stay in bounds.
    fn verify(&self) -> Result<(), TableError> {
        let h = &self.header;

        self.verify_strings()?;

        if h.terminal_count == 0 || h.terminal_count > h.symbol_count {
            return Err(TableError::Corrupt("terminal count"));
        }
        if h.start_symbol < h.terminal_count || h.start_symbol >= h.symbol_count {
            return Err(TableError::Corrupt("start symbol is not a nonterminal"));
        }
        for i in 0..self.symbol_count() {
            let sym = self.symbol(SymbolId(i as u16));
            if sym.name.0 >= h.str_table_count {
                return Err(TableError::Corrupt("symbol name out of range"));
            }
            if sym.flags.0 & !SymbolFlags::ALL != 0 {
                return Err(TableError::Corrupt("unknown symbol flags"));
            }
            if sym.flags.is_terminal() != (i < self.terminal_count()) {
                return Err(TableError::Corrupt("terminal flag disagrees with terminal count"));
            }
        }

        for i in 0..self.production_count() {
            let p = self.production(ProductionId(i as u16));
            if self.is_terminal(p.lhs) || p.lhs.index() >= self.symbol_count() {
                return Err(TableError::Corrupt("production lhs is not a nonterminal"));
            }
        }

        if h.state_count == 0 || h.lex_mode_count == 0 || h.lex_state_count == 0 {
            return Err(TableError::Corrupt("empty state tables"));
        }
        for i in 0..self.state_count() {
            self.verify_state(self.state_record(StateId(i as u16)))?;
        }

        for i in 0..self.lex_state_count() {
            let r = self.lex_record(LexStateId(i as u16));
            let t_end = r.transition_start as u64 + r.transition_count as u64;
            let a_end = r.accept_start as u64 + r.accept_count as u64;
            if t_end > h.lex_transition_count as u64 || a_end > h.lex_accept_count as u64 {
                return Err(TableError::Corrupt("lex state range out of bounds"));
            }
            let mut previous_hi: Option<u8> = None;
            for (lo, hi, target) in self.lex_transitions(LexStateId(i as u16)) {
                if lo > hi || previous_hi.is_some_and(|p| lo <= p) {
                    return Err(TableError::Corrupt("lex transitions not sorted and disjoint"));
                }
                if target.0 >= h.lex_state_count {
                    return Err(TableError::Corrupt("lex transition target out of range"));
                }
                previous_hi = Some(hi);
            }
            for terminal in self.lex_accepts(LexStateId(i as u16)) {
                if terminal.is_end() || !self.is_terminal(terminal) {
                    return Err(TableError::Corrupt("lex accept is not a terminal"));
                }
            }
        }

        Ok(())
    }

    fn verify_strings(&self) -> Result<(), TableError> {
        let count = self.header.str_table_count as usize;
        if count == 0 {
            return Err(TableError::Corrupt("missing grammar name"));
        }
        let table_at = self.offsets.str_table as usize;
        let blob_at = self.offsets.str_blob as usize;
        let blob_size = self.header.str_blob_size as usize;
        let mut previous = 0usize;
        for i in 0..=count {
            let offset = read_u32_le(&self.storage, table_at + i * 4) as usize;
            if offset < previous || offset > blob_size {
                return Err(TableError::Corrupt("string table offsets"));
            }
            let text = &self.storage[blob_at + previous..blob_at + offset];
            if i > 0 && std::str::from_utf8(text).is_err() {
                return Err(TableError::Corrupt("string is not UTF-8"));
            }
            previous = offset;
        }
        Ok(())
    }

    fn verify_state(&self, record: StateRecord) -> Result<(), TableError> {
        let h = &self.header;
        if record.entry_start as u64 + record.entry_count as u64 > h.entry_count as u64 {
            return Err(TableError::Corrupt("state entry range out of bounds"));
        }
        if record.lex_mode.0 >= h.lex_mode_count {
            return Err(TableError::Corrupt("state lex mode out of range"));
        }
        let mut previous: Option<SymbolId> = None;
        for i in 0..record.entry_count as usize {
            let index = record.entry_start as usize + i;
            let base = self.offsets.entries as usize + index * ENTRY_SIZE;
            let symbol = SymbolId(read_u16_le(&self.storage, base));
            let count = read_u16_le(&self.storage, base + 2) as u64;
            let start = read_u32_le(&self.storage, base + 4) as u64;
            if symbol.index() >= self.symbol_count() {
                return Err(TableError::Corrupt("entry symbol out of range"));
            }
            if previous.is_some_and(|p| p >= symbol) {
                return Err(TableError::Corrupt("entries not sorted by symbol"));
            }
            if count == 0 || start + count > h.action_count as u64 {
                return Err(TableError::Corrupt("action range out of bounds"));
            }
            previous = Some(symbol);

            for k in 0..count as usize {
                let at = self.offsets.actions as usize + (start as usize + k) * ACTION_SIZE;
                let raw = [
                    self.storage[at],
                    self.storage[at + 1],
                    self.storage[at + 2],
                    self.storage[at + 3],
                ];
                match Action::from_bytes(raw) {
                    Some(Action::Shift(s)) if s.0 < h.state_count => {}
                    Some(Action::Reduce(p)) if p.0 < h.production_count => {
                        if !self.is_terminal(symbol) {
                            return Err(TableError::Corrupt("reduce keyed by a nonterminal"));
                        }
                    }
                    Some(Action::Accept) if symbol.is_end() => {}
                    _ => return Err(TableError::Corrupt("invalid action")),
                }
            }
        }
        Ok(())
    }
}

/// One `(symbol, actions)` row of a state.
#[derive(Clone, Copy, Debug)]
pub struct Entry<'a> {
    pub symbol: SymbolId,
    pub actions: ActionsView<'a>,
}

/// Actions of one entry, in preference order.
#[derive(Clone, Copy, Debug)]
pub struct ActionsView<'a> {
    bytes: &'a [u8],
}

impl<'a> ActionsView<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len() / ACTION_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Action> {
        let at = index * ACTION_SIZE;
        let raw = self.bytes.get(at..at + ACTION_SIZE)?;
        Some(crate::invariants::ensure_action([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn first(&self) -> Option<Action> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Action> + 'a {
        let view = *self;
        (0..view.len()).filter_map(move |i| view.get(i))
    }
}

/// View into the string table.
pub struct StringsView<'a> {
    blob: &'a [u8],
    table: &'a [u8],
}

impl<'a> StringsView<'a> {
    pub fn len(&self) -> usize {
        self.table.len() / 4 - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// String `id`: bytes between its offset and the next one.
    pub fn get(&self, id: StringId) -> &'a str {
        let i = id.0 as usize;
        let start = read_u32_le(self.table, i * 4) as usize;
        let end = read_u32_le(self.table, (i + 1) * 4) as usize;
        crate::invariants::ensure_utf8(&self.blob[start..end])
    }
}
