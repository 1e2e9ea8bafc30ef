//! Format constants and record sizes.

/// Magic bytes at offset 0.
pub const MAGIC: [u8; 4] = *b"WFTB";

/// Format version. Bumped on any layout change; readers reject other values.
pub const VERSION: u32 = 1;

/// Every section starts on a multiple of this.
pub const SECTION_ALIGN: usize = 64;

pub(crate) const HEADER_SIZE: usize = 64;

pub(crate) const STR_TABLE_ENTRY_SIZE: usize = 4;
pub(crate) const SYMBOL_SIZE: usize = 4;
pub(crate) const PRODUCTION_SIZE: usize = 8;
pub(crate) const STATE_SIZE: usize = 8;
pub(crate) const ENTRY_SIZE: usize = 8;
pub(crate) const ACTION_SIZE: usize = 4;
pub(crate) const LEX_STATE_SIZE: usize = 12;
pub(crate) const LEX_TRANSITION_SIZE: usize = 4;
pub(crate) const LEX_ACCEPT_SIZE: usize = 2;

/// Bytes per lex mode: one bit per terminal, packed into u64 words.
pub(crate) fn lex_mode_size(terminal_count: u16) -> usize {
    (terminal_count as usize).div_ceil(64) * 8
}

/// Symbol flags byte.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct SymbolFlags(pub u8);

impl SymbolFlags {
    /// Named node (rule or named token) rather than a literal.
    pub const NAMED: Self = Self(1);
    /// Appears in trees. Hidden rules are spliced into their parent.
    pub const VISIBLE: Self = Self(1 << 1);
    pub const TERMINAL: Self = Self(1 << 2);
    /// Allowed anywhere, never part of a production.
    pub const EXTRA: Self = Self(1 << 3);
    /// Terminal defined by a string literal.
    pub const LITERAL: Self = Self(1 << 4);

    pub(crate) const ALL: u8 = 0b1_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn with(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_named(self) -> bool {
        self.contains(Self::NAMED)
    }

    pub fn is_visible(self) -> bool {
        self.contains(Self::VISIBLE)
    }

    pub fn is_terminal(self) -> bool {
        self.contains(Self::TERMINAL)
    }

    pub fn is_extra(self) -> bool {
        self.contains(Self::EXTRA)
    }

    pub fn is_literal(self) -> bool {
        self.contains(Self::LITERAL)
    }
}

impl std::ops::BitOr for SymbolFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}
