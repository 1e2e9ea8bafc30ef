//! weft: incremental, table-driven parsing with error recovery.
//!
//! # Example
//!
//! ```
//! use weft::dsl::*;
//! use weft::{Diagnostics, Edit, Parser};
//!
//! let grammar = GrammarBuilder::new("expr")
//!     .rule("expr", seq([sym("ident"), choice([string("+"), string("*")]), sym("ident")]))
//!     .rule("ident", pattern("[a-z]+"))
//!     .build();
//! let language = weft::language(&grammar).expect("grammar compiles");
//! let parser = Parser::new(language);
//!
//! let tree = parser.parse("a+b").expect("no fuel limit");
//! let tree = parser.reparse(&tree, &[Edit::new(1..2, 1)], "a*b").expect("edits are valid");
//! assert_eq!(tree.to_sexp(), r#"(expr (ident) "*" (ident))"#);
//! assert!(Diagnostics::from_tree(&tree, "a*b").is_empty());
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod diagnostics;

#[cfg(test)]
mod incremental_tests;
#[cfg(test)]
mod lib_tests;
#[cfg(test)]
mod test_utils;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, DiagnosticsPrinter};
pub use weft_compiler::{CompileError, build_table, compile};
pub use weft_core::grammar::dsl;
pub use weft_core::{Colors, Grammar, GrammarError, SymbolId};
pub use weft_runtime::{
    CancellationFlag, ConflictPolicy, Edit, EditError, EditSet, Language, Lexer, Node, NodeFlags,
    NoopTracer, ParseError, ParseOptions, ParseResult, ParseStats, Parser, ParserBuilder,
    PrintTracer, Recovery, StatsTracer, SyntaxNode, Token, Tracer, Tree, TreeCursor, TreePrinter,
};
pub use weft_table::{ParseTable, TableError};

/// Errors raised while turning a grammar description into a [`Language`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Compiles `grammar` and loads the resulting table.
pub fn language(grammar: &Grammar) -> Result<Language> {
    let language = Language::from_bytes(compile(grammar)?)?;
    tracing::debug!(language = language.name(), "loaded language");
    Ok(language)
}

/// Like [`language`], from a tree-sitter `grammar.json` document.
pub fn language_from_json(json: &str) -> Result<Language> {
    language(&Grammar::from_json(json)?)
}
