//! Grammar type definitions.

use serde::{Deserialize, Serialize};

/// Complete grammar description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grammar {
    pub name: String,
    /// Rules in definition order. The first rule is the start rule.
    pub rules: Vec<(String, Rule)>,
    /// Tokens allowed anywhere (whitespace, comments).
    #[serde(default)]
    pub extras: Vec<Rule>,
    /// Orderings of named precedences, highest first.
    #[serde(default)]
    pub precedences: Vec<Vec<PrecedenceEntry>>,
    /// Rule sets whose LR conflicts are intentional and resolved at parse
    /// time by forking.
    #[serde(default)]
    pub conflicts: Vec<Vec<String>>,
    #[serde(default)]
    pub externals: Vec<Rule>,
    #[serde(default)]
    pub inline: Vec<String>,
    #[serde(default)]
    pub supertypes: Vec<String>,
    /// Keyword identifier rule.
    #[serde(default)]
    pub word: Option<String>,
    #[serde(default)]
    pub reserved: Vec<(String, Vec<Rule>)>,
    #[serde(default)]
    pub inherits: Option<String>,
}

impl Grammar {
    /// Empty grammar, to be filled through [`super::dsl::GrammarBuilder`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            extras: Vec::new(),
            precedences: Vec::new(),
            conflicts: Vec::new(),
            externals: Vec::new(),
            inline: Vec::new(),
            supertypes: Vec::new(),
            word: None,
            reserved: Vec::new(),
            inherits: None,
        }
    }

    pub fn start_rule(&self) -> Option<&str> {
        self.rules.first().map(|(name, _)| name.as_str())
    }

    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

/// Grammar rule variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    /// Matches the empty string.
    Blank,
    /// Literal token.
    String(String),
    /// Regex token.
    Pattern {
        value: String,
        #[serde(default)]
        flags: Option<String>,
    },
    /// Reference to another rule.
    Symbol(String),
    Seq(Vec<Rule>),
    Choice(Vec<Rule>),
    /// Zero or more repetitions.
    Repeat(Box<Rule>),
    /// One or more repetitions.
    Repeat1(Box<Rule>),
    Field { name: String, content: Box<Rule> },
    Alias {
        content: Box<Rule>,
        value: String,
        named: bool,
    },
    /// Collapse the content into a single token.
    Token(Box<Rule>),
    /// Like `Token`, without leading extras.
    ImmediateToken(Box<Rule>),
    Prec {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecLeft {
        value: Precedence,
        content: Box<Rule>,
    },
    PrecRight {
        value: Precedence,
        content: Box<Rule>,
    },
    /// Priority between derivations that survive to the end of a GLR fork.
    PrecDynamic { value: i32, content: Box<Rule> },
    Reserved {
        context_name: String,
        content: Box<Rule>,
    },
}

impl Rule {
    /// True for rules that describe a single token.
    ///
    /// Precedence wrappers are looked through, since lexical rules are often
    /// written as `prec(1, /.../)`.
    pub fn is_lexical(&self) -> bool {
        match self {
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                true
            }
            Rule::Prec { content, .. }
            | Rule::PrecLeft { content, .. }
            | Rule::PrecRight { content, .. } => content.is_lexical(),
            _ => false,
        }
    }
}

/// Precedence value (numeric or named).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Precedence {
    Integer(i32),
    Name(String),
}

/// Entry in a precedence ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrecedenceEntry {
    Name(String),
    Symbol(String),
}
