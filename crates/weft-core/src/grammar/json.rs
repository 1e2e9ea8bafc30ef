//! `grammar.json` codec.
//!
//! Rules are internally tagged by an uppercase `type` field; the rule map
//! keeps definition order, which decides the start rule.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::GrammarError;
use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

impl Grammar {
    pub fn from_json(json: &str) -> Result<Self, GrammarError> {
        let raw: RawGrammar = serde_json::from_str(json)?;
        Ok(raw.into())
    }

    /// Render as pretty-printed `grammar.json`.
    pub fn to_json(&self) -> Result<String, GrammarError> {
        Ok(serde_json::to_string_pretty(&RawGrammar::from(self))?)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RawGrammar {
    name: String,
    rules: IndexMap<String, RawRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    extras: Vec<RawRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    precedences: Vec<Vec<RawPrecedenceEntry>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    conflicts: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    externals: Vec<RawRule>,
    #[serde(default, rename = "inline", skip_serializing_if = "Vec::is_empty")]
    inline_rules: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    supertypes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    word: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    reserved: IndexMap<String, Vec<RawRule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inherits: Option<String>,
}

fn convert<A, B: From<A>>(items: Vec<A>) -> Vec<B> {
    items.into_iter().map(Into::into).collect()
}

impl From<RawGrammar> for Grammar {
    fn from(raw: RawGrammar) -> Self {
        Self {
            name: raw.name,
            rules: raw.rules.into_iter().map(|(k, v)| (k, v.into())).collect(),
            extras: convert(raw.extras),
            precedences: raw.precedences.into_iter().map(convert).collect(),
            conflicts: raw.conflicts,
            externals: convert(raw.externals),
            inline: raw.inline_rules,
            supertypes: raw.supertypes,
            word: raw.word,
            reserved: raw
                .reserved
                .into_iter()
                .map(|(k, v)| (k, convert(v)))
                .collect(),
            inherits: raw.inherits,
        }
    }
}

impl From<&Grammar> for RawGrammar {
    fn from(g: &Grammar) -> Self {
        Self {
            name: g.name.clone(),
            rules: g
                .rules
                .iter()
                .map(|(k, v)| (k.clone(), RawRule::from(v)))
                .collect(),
            extras: g.extras.iter().map(RawRule::from).collect(),
            precedences: g
                .precedences
                .iter()
                .map(|level| level.iter().map(RawPrecedenceEntry::from).collect())
                .collect(),
            conflicts: g.conflicts.clone(),
            externals: g.externals.iter().map(RawRule::from).collect(),
            inline_rules: g.inline.clone(),
            supertypes: g.supertypes.clone(),
            word: g.word.clone(),
            reserved: g
                .reserved
                .iter()
                .map(|(k, v)| (k.clone(), v.iter().map(RawRule::from).collect()))
                .collect(),
            inherits: g.inherits.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms, non_camel_case_types)]
enum RawRule {
    BLANK,
    STRING {
        value: String,
    },
    PATTERN {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flags: Option<String>,
    },
    SYMBOL {
        name: String,
    },
    SEQ {
        members: Vec<RawRule>,
    },
    CHOICE {
        members: Vec<RawRule>,
    },
    REPEAT {
        content: Box<RawRule>,
    },
    REPEAT1 {
        content: Box<RawRule>,
    },
    FIELD {
        name: String,
        content: Box<RawRule>,
    },
    ALIAS {
        content: Box<RawRule>,
        value: String,
        named: bool,
    },
    TOKEN {
        content: Box<RawRule>,
    },
    IMMEDIATE_TOKEN {
        content: Box<RawRule>,
    },
    PREC {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_LEFT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_RIGHT {
        value: RawPrecedence,
        content: Box<RawRule>,
    },
    PREC_DYNAMIC {
        value: i32,
        content: Box<RawRule>,
    },
    RESERVED {
        context_name: String,
        content: Box<RawRule>,
    },
}

impl From<RawRule> for Rule {
    fn from(raw: RawRule) -> Self {
        #[allow(clippy::boxed_local)]
        fn inner(content: Box<RawRule>) -> Box<Rule> {
            Box::new(Rule::from(*content))
        }

        match raw {
            RawRule::BLANK => Rule::Blank,
            RawRule::STRING { value } => Rule::String(value),
            RawRule::PATTERN { value, flags } => Rule::Pattern { value, flags },
            RawRule::SYMBOL { name } => Rule::Symbol(name),
            RawRule::SEQ { members } => Rule::Seq(convert(members)),
            RawRule::CHOICE { members } => Rule::Choice(convert(members)),
            RawRule::REPEAT { content } => Rule::Repeat(inner(content)),
            RawRule::REPEAT1 { content } => Rule::Repeat1(inner(content)),
            RawRule::FIELD { name, content } => Rule::Field {
                name,
                content: inner(content),
            },
            RawRule::ALIAS {
                content,
                value,
                named,
            } => Rule::Alias {
                content: inner(content),
                value,
                named,
            },
            RawRule::TOKEN { content } => Rule::Token(inner(content)),
            RawRule::IMMEDIATE_TOKEN { content } => Rule::ImmediateToken(inner(content)),
            RawRule::PREC { value, content } => Rule::Prec {
                value: value.into(),
                content: inner(content),
            },
            RawRule::PREC_LEFT { value, content } => Rule::PrecLeft {
                value: value.into(),
                content: inner(content),
            },
            RawRule::PREC_RIGHT { value, content } => Rule::PrecRight {
                value: value.into(),
                content: inner(content),
            },
            RawRule::PREC_DYNAMIC { value, content } => Rule::PrecDynamic {
                value,
                content: inner(content),
            },
            RawRule::RESERVED {
                context_name,
                content,
            } => Rule::Reserved {
                context_name,
                content: inner(content),
            },
        }
    }
}

impl From<&Rule> for RawRule {
    fn from(rule: &Rule) -> Self {
        fn inner(content: &Rule) -> Box<RawRule> {
            Box::new(RawRule::from(content))
        }
        fn all(members: &[Rule]) -> Vec<RawRule> {
            members.iter().map(RawRule::from).collect()
        }

        match rule {
            Rule::Blank => RawRule::BLANK,
            Rule::String(value) => RawRule::STRING {
                value: value.clone(),
            },
            Rule::Pattern { value, flags } => RawRule::PATTERN {
                value: value.clone(),
                flags: flags.clone(),
            },
            Rule::Symbol(name) => RawRule::SYMBOL { name: name.clone() },
            Rule::Seq(members) => RawRule::SEQ {
                members: all(members),
            },
            Rule::Choice(members) => RawRule::CHOICE {
                members: all(members),
            },
            Rule::Repeat(content) => RawRule::REPEAT {
                content: inner(content),
            },
            Rule::Repeat1(content) => RawRule::REPEAT1 {
                content: inner(content),
            },
            Rule::Field { name, content } => RawRule::FIELD {
                name: name.clone(),
                content: inner(content),
            },
            Rule::Alias {
                content,
                value,
                named,
            } => RawRule::ALIAS {
                content: inner(content),
                value: value.clone(),
                named: *named,
            },
            Rule::Token(content) => RawRule::TOKEN {
                content: inner(content),
            },
            Rule::ImmediateToken(content) => RawRule::IMMEDIATE_TOKEN {
                content: inner(content),
            },
            Rule::Prec { value, content } => RawRule::PREC {
                value: value.into(),
                content: inner(content),
            },
            Rule::PrecLeft { value, content } => RawRule::PREC_LEFT {
                value: value.into(),
                content: inner(content),
            },
            Rule::PrecRight { value, content } => RawRule::PREC_RIGHT {
                value: value.into(),
                content: inner(content),
            },
            Rule::PrecDynamic { value, content } => RawRule::PREC_DYNAMIC {
                value: *value,
                content: inner(content),
            },
            Rule::Reserved {
                context_name,
                content,
            } => RawRule::RESERVED {
                context_name: context_name.clone(),
                content: inner(content),
            },
        }
    }
}

/// Precedence is either a number or a name from `precedences`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPrecedence {
    Integer(i32),
    Name(String),
}

impl From<RawPrecedence> for Precedence {
    fn from(raw: RawPrecedence) -> Self {
        match raw {
            RawPrecedence::Integer(n) => Precedence::Integer(n),
            RawPrecedence::Name(s) => Precedence::Name(s),
        }
    }
}

impl From<&Precedence> for RawPrecedence {
    fn from(value: &Precedence) -> Self {
        match value {
            Precedence::Integer(n) => RawPrecedence::Integer(*n),
            Precedence::Name(s) => RawPrecedence::Name(s.clone()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::upper_case_acronyms)]
enum RawPrecedenceEntry {
    STRING { value: String },
    SYMBOL { name: String },
}

impl From<RawPrecedenceEntry> for PrecedenceEntry {
    fn from(raw: RawPrecedenceEntry) -> Self {
        match raw {
            RawPrecedenceEntry::STRING { value } => PrecedenceEntry::Name(value),
            RawPrecedenceEntry::SYMBOL { name } => PrecedenceEntry::Symbol(name),
        }
    }
}

impl From<&PrecedenceEntry> for RawPrecedenceEntry {
    fn from(entry: &PrecedenceEntry) -> Self {
        match entry {
            PrecedenceEntry::Name(value) => RawPrecedenceEntry::STRING {
                value: value.clone(),
            },
            PrecedenceEntry::Symbol(name) => RawPrecedenceEntry::SYMBOL { name: name.clone() },
        }
    }
}
