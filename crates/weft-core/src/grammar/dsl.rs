//! Rust builder for grammars, shaped after tree-sitter's `grammar.js`.
//!
//! ```
//! use weft_core::grammar::dsl::*;
//!
//! let grammar = GrammarBuilder::new("arith")
//!     .rule("expr", choice([sym("number"), prec_left(1, seq([sym("expr"), string("+"), sym("expr")]))]))
//!     .rule("number", pattern(r"\d+"))
//!     .extra(pattern(r"\s"))
//!     .build();
//! assert_eq!(grammar.start_rule(), Some("expr"));
//! ```

use super::types::{Grammar, Precedence, PrecedenceEntry, Rule};

pub fn blank() -> Rule {
    Rule::Blank
}

pub fn string(value: impl Into<String>) -> Rule {
    Rule::String(value.into())
}

pub fn pattern(value: impl Into<String>) -> Rule {
    Rule::Pattern {
        value: value.into(),
        flags: None,
    }
}

pub fn sym(name: impl Into<String>) -> Rule {
    Rule::Symbol(name.into())
}

pub fn seq(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Seq(members.into_iter().collect())
}

pub fn choice(members: impl IntoIterator<Item = Rule>) -> Rule {
    Rule::Choice(members.into_iter().collect())
}

pub fn optional(content: Rule) -> Rule {
    Rule::Choice(vec![content, Rule::Blank])
}

pub fn repeat(content: Rule) -> Rule {
    Rule::Repeat(Box::new(content))
}

pub fn repeat1(content: Rule) -> Rule {
    Rule::Repeat1(Box::new(content))
}

/// `item (separator item)*`, possibly empty.
pub fn sep_by(separator: Rule, item: Rule) -> Rule {
    optional(sep_by1(separator, item))
}

pub fn sep_by1(separator: Rule, item: Rule) -> Rule {
    seq([item.clone(), repeat(seq([separator, item]))])
}

pub fn field(name: impl Into<String>, content: Rule) -> Rule {
    Rule::Field {
        name: name.into(),
        content: Box::new(content),
    }
}

pub fn token(content: Rule) -> Rule {
    Rule::Token(Box::new(content))
}

pub fn immediate_token(content: Rule) -> Rule {
    Rule::ImmediateToken(Box::new(content))
}

pub fn prec(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::Prec {
        value: value.into(),
        content: Box::new(content),
    }
}

pub fn prec_left(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::PrecLeft {
        value: value.into(),
        content: Box::new(content),
    }
}

pub fn prec_right(value: impl Into<Precedence>, content: Rule) -> Rule {
    Rule::PrecRight {
        value: value.into(),
        content: Box::new(content),
    }
}

pub fn prec_dynamic(value: i32, content: Rule) -> Rule {
    Rule::PrecDynamic {
        value,
        content: Box::new(content),
    }
}

impl From<i32> for Precedence {
    fn from(value: i32) -> Self {
        Precedence::Integer(value)
    }
}

impl From<&str> for Precedence {
    fn from(value: &str) -> Self {
        Precedence::Name(value.to_owned())
    }
}

/// Accumulates rules in definition order; the first rule is the start rule.
#[derive(Debug, Clone)]
pub struct GrammarBuilder {
    grammar: Grammar,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            grammar: Grammar::new(name),
        }
    }

    /// Define a rule. Redefining a name replaces the earlier body in place.
    pub fn rule(mut self, name: impl Into<String>, body: Rule) -> Self {
        let name = name.into();
        match self.grammar.rules.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = body,
            None => self.grammar.rules.push((name, body)),
        }
        self
    }

    pub fn extra(mut self, rule: Rule) -> Self {
        self.grammar.extras.push(rule);
        self
    }

    /// Declare that LR conflicts among `rules` are expected.
    pub fn conflict<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grammar
            .conflicts
            .push(rules.into_iter().map(Into::into).collect());
        self
    }

    /// Named precedence levels, highest first.
    pub fn precedences<I, S>(mut self, levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grammar.precedences.push(
            levels
                .into_iter()
                .map(|s| PrecedenceEntry::Name(s.into()))
                .collect(),
        );
        self
    }

    pub fn word(mut self, rule: impl Into<String>) -> Self {
        self.grammar.word = Some(rule.into());
        self
    }

    pub fn build(self) -> Grammar {
        self.grammar
    }
}
