//! Shared handle to a loaded parse table.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use weft_core::SymbolId;
use weft_table::{ParseTable, TableError};

/// A loaded parse table. Cheap to clone; trees keep one to name their nodes.
#[derive(Clone)]
pub struct Language(Arc<ParseTable>);

impl Language {
    pub fn new(table: ParseTable) -> Self {
        Self(Arc::new(table))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TableError> {
        Ok(Self::new(ParseTable::from_bytes(bytes)?))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        Ok(Self::new(ParseTable::from_path(path)?))
    }

    pub fn table(&self) -> &ParseTable {
        &self.0
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    pub fn symbol_name(&self, id: SymbolId) -> &str {
        self.0.symbol_name(id)
    }

    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<SymbolId> {
        self.0.symbol_for_name(name, named)
    }

    pub fn is_visible(&self, id: SymbolId) -> bool {
        self.0.symbol_flags(id).is_visible()
    }

    pub fn is_named(&self, id: SymbolId) -> bool {
        self.0.symbol_flags(id).is_named()
    }

    pub fn is_extra(&self, id: SymbolId) -> bool {
        self.0.symbol_flags(id).is_extra()
    }

    /// Whether both handles share one loaded table.
    pub fn same(a: &Language, b: &Language) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("states", &self.0.state_count())
            .finish()
    }
}
