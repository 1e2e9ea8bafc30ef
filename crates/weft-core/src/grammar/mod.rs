//! Grammar descriptions.
//!
//! Mirrors tree-sitter's `grammar.json`, loadable from JSON or from the
//! compact postcard encoding, and constructible in Rust through [`dsl`].

mod binary;
pub mod dsl;
mod json;
mod types;


pub use types::{Grammar, Precedence, PrecedenceEntry, Rule};

/// Error while decoding a grammar description.
#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary codec error: {0}")]
    Binary(#[from] postcard::Error),
}
