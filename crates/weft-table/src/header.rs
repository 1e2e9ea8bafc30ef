//! Table file header (64 bytes).
//!
//! Offsets are not stored; they follow from the counts and
//! [`SECTION_ALIGN`]. Section order: Header → StringBlob → StringTable →
//! Symbols → Productions → States → Entries → Actions → LexModes →
//! LexStates → LexTransitions → LexAccepts.

use crate::constants::{
    ACTION_SIZE, ENTRY_SIZE, HEADER_SIZE, LEX_ACCEPT_SIZE, LEX_STATE_SIZE, LEX_TRANSITION_SIZE,
    MAGIC, PRODUCTION_SIZE, SECTION_ALIGN, STATE_SIZE, STR_TABLE_ENTRY_SIZE, SYMBOL_SIZE, VERSION,
    lex_mode_size,
};

/// Layout:
/// - 0-35: identity, sizes and u32 counts (magic + 8 × u32)
/// - 36-51: u16 counts and the start symbol (8 × u16)
/// - 52-63: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Header {
    pub magic: [u8; 4],
    pub version: u32,
    /// CRC32 of everything after the header.
    pub checksum: u32,
    pub total_size: u32,
    pub str_blob_size: u32,
    pub entry_count: u32,
    pub action_count: u32,
    pub lex_transition_count: u32,
    pub lex_accept_count: u32,

    pub str_table_count: u16,
    pub symbol_count: u16,
    /// Terminals are symbols `0..terminal_count`, `END` included.
    pub terminal_count: u16,
    pub production_count: u16,
    pub state_count: u16,
    pub lex_mode_count: u16,
    pub lex_state_count: u16,
    pub start_symbol: u16,

    pub _reserved: [u8; 12],
}

const _: () = assert!(std::mem::size_of::<Header>() == HEADER_SIZE);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            str_blob_size: 0,
            entry_count: 0,
            action_count: 0,
            lex_transition_count: 0,
            lex_accept_count: 0,
            str_table_count: 0,
            symbol_count: 0,
            terminal_count: 0,
            production_count: 0,
            state_count: 0,
            lex_mode_count: 0,
            lex_state_count: 0,
            start_symbol: 0,
            _reserved: [0; 12],
        }
    }
}

/// Section start offsets derived from header counts, plus the expected end.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub str_blob: u32,
    pub str_table: u32,
    pub symbols: u32,
    pub productions: u32,
    pub states: u32,
    pub entries: u32,
    pub actions: u32,
    pub lex_modes: u32,
    pub lex_states: u32,
    pub lex_transitions: u32,
    pub lex_accepts: u32,
    /// Aligned end of the last section, equal to the file size.
    pub end: u32,
}

#[inline]
fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[inline]
fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

impl Header {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        let mut reserved = [0u8; 12];
        reserved.copy_from_slice(&bytes[52..64]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32_at(bytes, 4),
            checksum: u32_at(bytes, 8),
            total_size: u32_at(bytes, 12),
            str_blob_size: u32_at(bytes, 16),
            entry_count: u32_at(bytes, 20),
            action_count: u32_at(bytes, 24),
            lex_transition_count: u32_at(bytes, 28),
            lex_accept_count: u32_at(bytes, 32),
            str_table_count: u16_at(bytes, 36),
            symbol_count: u16_at(bytes, 38),
            terminal_count: u16_at(bytes, 40),
            production_count: u16_at(bytes, 42),
            state_count: u16_at(bytes, 44),
            lex_mode_count: u16_at(bytes, 46),
            lex_state_count: u16_at(bytes, 48),
            start_symbol: u16_at(bytes, 50),
            _reserved: reserved,
        }
    }

    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..4].copy_from_slice(&self.magic);
        let words = [
            self.version,
            self.checksum,
            self.total_size,
            self.str_blob_size,
            self.entry_count,
            self.action_count,
            self.lex_transition_count,
            self.lex_accept_count,
        ];
        for (i, w) in words.iter().enumerate() {
            let at = 4 + i * 4;
            bytes[at..at + 4].copy_from_slice(&w.to_le_bytes());
        }
        let halves = [
            self.str_table_count,
            self.symbol_count,
            self.terminal_count,
            self.production_count,
            self.state_count,
            self.lex_mode_count,
            self.lex_state_count,
            self.start_symbol,
        ];
        for (i, h) in halves.iter().enumerate() {
            let at = 36 + i * 2;
            bytes[at..at + 2].copy_from_slice(&h.to_le_bytes());
        }
        bytes[52..64].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    /// Compute section offsets. Computed in u64 so that hostile counts
    /// cannot wrap; `None` means the layout does not fit in 4 GiB.
    pub fn compute_offsets(&self) -> Option<SectionOffsets> {
        let sizes = [
            self.str_blob_size as u64,
            (self.str_table_count as u64 + 1) * STR_TABLE_ENTRY_SIZE as u64,
            self.symbol_count as u64 * SYMBOL_SIZE as u64,
            self.production_count as u64 * PRODUCTION_SIZE as u64,
            self.state_count as u64 * STATE_SIZE as u64,
            self.entry_count as u64 * ENTRY_SIZE as u64,
            self.action_count as u64 * ACTION_SIZE as u64,
            self.lex_mode_count as u64 * lex_mode_size(self.terminal_count) as u64,
            self.lex_state_count as u64 * LEX_STATE_SIZE as u64,
            self.lex_transition_count as u64 * LEX_TRANSITION_SIZE as u64,
            self.lex_accept_count as u64 * LEX_ACCEPT_SIZE as u64,
        ];

        let mut starts = [0u32; 11];
        let mut cursor = HEADER_SIZE as u64;
        for (start, size) in starts.iter_mut().zip(sizes) {
            *start = u32::try_from(cursor).ok()?;
            cursor = align_up(cursor + size);
        }
        let end = u32::try_from(cursor).ok()?;

        let [
            str_blob,
            str_table,
            symbols,
            productions,
            states,
            entries,
            actions,
            lex_modes,
            lex_states,
            lex_transitions,
            lex_accepts,
        ] = starts;

        Some(SectionOffsets {
            str_blob,
            str_table,
            symbols,
            productions,
            states,
            entries,
            actions,
            lex_modes,
            lex_states,
            lex_transitions,
            lex_accepts,
            end,
        })
    }
}

pub(crate) fn align_up(value: u64) -> u64 {
    let align = SECTION_ALIGN as u64;
    value.div_ceil(align) * align
}
