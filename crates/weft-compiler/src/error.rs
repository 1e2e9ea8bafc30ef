use weft_table::TableError;

/// Errors raised while turning a grammar into a parse table.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("invalid grammar: {0}")]
    Grammar(String),

    #[error("undefined symbol `{0}`")]
    UndefinedSymbol(String),

    #[error("unsupported grammar feature: {0}")]
    Unsupported(String),

    #[error("token `{0}` matches the empty string")]
    EmptyToken(String),

    #[error("invalid pattern for `{name}`: {message}")]
    Regex { name: String, message: String },

    #[error("unresolved conflict in state {state} on {symbol}: {description}")]
    Conflict {
        state: usize,
        symbol: String,
        description: String,
    },

    #[error("automaton has too many states ({0})")]
    TooManyStates(usize),

    #[error("grammar has too many symbols ({0})")]
    TooManySymbols(usize),

    #[error("rule `{0}` expands to too many alternatives")]
    TooManyAlternatives(String),

    #[error(transparent)]
    Table(#[from] TableError),
}

pub type CompileResult<T> = Result<T, CompileError>;
