//! Compact postcard encoding, used to embed grammars without a JSON parser.

use super::GrammarError;
use super::types::Grammar;

impl Grammar {
    pub fn from_binary(bytes: &[u8]) -> Result<Self, GrammarError> {
        Ok(postcard::from_bytes(bytes)?)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, GrammarError> {
        Ok(postcard::to_allocvec(self)?)
    }
}
