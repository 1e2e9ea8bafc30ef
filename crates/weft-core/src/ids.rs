//! Table index newtypes.

/// Index into the symbol table.
///
/// Symbol 0 is the end-of-input marker. Terminals follow, then
/// nonterminals. [`SymbolId::ERROR`] never appears in a table; the runtime
/// uses it for error leaves and error nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct SymbolId(pub u16);

impl SymbolId {
    pub const END: Self = Self(0);
    pub const ERROR: Self = Self(u16::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_end(self) -> bool {
        self == Self::END
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }
}

/// Index into the parse state table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct StateId(pub u16);

impl StateId {
    /// Every parse starts here.
    pub const START: Self = Self(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the production table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct ProductionId(pub u16);

impl ProductionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the lex mode table.
///
/// A lex mode is the set of terminals a parse state can act on. Mode 0 holds
/// every terminal and is what the lexer falls back to while recovering.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct LexModeId(pub u16);

impl LexModeId {
    pub const ALL: Self = Self(0);
    /// Marks tokens scanned for a union of modes (several stack versions).
    pub const NONE: Self = Self(u16::MAX);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

/// Index into the lexer automaton states.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(transparent)]
pub struct LexStateId(pub u16);

impl LexStateId {
    pub const START: Self = Self(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index into the string table.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[repr(transparent)]
pub struct StringId(pub u16);
