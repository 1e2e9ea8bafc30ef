//! Lowering from grammar rules to flat terminals and productions.
//!
//! Rules whose body describes a single token become named terminals. String
//! literals and inline patterns inside syntactic rules become anonymous
//! terminals, shared between every rule that spells them the same way.
//! Syntactic rules become nonterminals whose bodies are expanded into plain
//! alternatives (sequences of symbols); repetitions turn into hidden
//! left-recursive helper rules.

mod expand;
mod token;


use std::collections::HashMap;

use indexmap::IndexMap;
use weft_core::{Grammar, Precedence, PrecedenceEntry, Rule};

use crate::error::{CompileError, CompileResult};

pub(crate) use token::token_regex;

/// Upper bound on alternatives a single rule may expand to.
pub const MAX_ALTERNATIVES: usize = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Sym {
    /// Index into [`LoweredGrammar::terminals`].
    Terminal(usize),
    /// Index into [`LoweredGrammar::nonterminals`].
    Nonterminal(usize),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terminal {
    pub name: String,
    /// Pattern in `regex-syntax` syntax.
    pub regex: String,
    pub named: bool,
    pub visible: bool,
    pub literal: bool,
    pub extra: bool,
    /// Lexical precedence, breaks ties between equally long matches.
    pub precedence: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nonterminal {
    pub name: String,
    pub visible: bool,
    /// The grammar rule this nonterminal was lowered from. Helper rules
    /// point at the rule that contains the repetition.
    pub origin: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alternative {
    pub symbols: Vec<Sym>,
    pub precedence: Option<i32>,
    pub assoc: Assoc,
    pub dynamic_precedence: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Production {
    pub lhs: usize,
    pub alternative: Alternative,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoweredGrammar {
    pub name: String,
    pub terminals: Vec<Terminal>,
    /// Nonterminal 0 is the start rule.
    pub nonterminals: Vec<Nonterminal>,
    pub productions: Vec<Production>,
    /// Declared conflict sets, as nonterminal indices of grammar rules.
    pub conflicts: Vec<Vec<usize>>,
}

impl LoweredGrammar {
    pub fn sym_name(&self, sym: Sym) -> &str {
        match sym {
            Sym::Terminal(t) => &self.terminals[t].name,
            Sym::Nonterminal(n) => &self.nonterminals[n].name,
        }
    }
}

/// Where a rule name resolves to.
#[derive(Clone, Copy, Debug)]
enum RuleKind {
    Token(usize),
    Syntax(usize),
}

pub(crate) struct Lowering<'g> {
    grammar: &'g Grammar,
    kinds: HashMap<&'g str, RuleKind>,
    precedences: HashMap<String, i32>,
    terminals: Vec<Terminal>,
    /// Anonymous terminals by `(literal, regex)`.
    anonymous: IndexMap<(bool, String), usize>,
    nonterminals: Vec<Nonterminal>,
    productions: Vec<Production>,
}

pub fn lower(grammar: &Grammar) -> CompileResult<LoweredGrammar> {
    if !grammar.externals.is_empty() {
        return Err(CompileError::Unsupported("external scanners".into()));
    }
    if !grammar.reserved.is_empty() {
        return Err(CompileError::Unsupported("reserved word sets".into()));
    }

    let Some((start, start_rule)) = grammar.rules.first() else {
        return Err(CompileError::Grammar("grammar has no rules".into()));
    };
    if start_rule.is_lexical() {
        return Err(CompileError::Grammar(format!(
            "start rule `{start}` must not be a token"
        )));
    }

    let mut lowering = Lowering {
        grammar,
        kinds: HashMap::new(),
        precedences: named_precedences(&grammar.precedences)?,
        terminals: Vec::new(),
        anonymous: IndexMap::new(),
        nonterminals: Vec::new(),
        productions: Vec::new(),
    };

    lowering.declare_rules()?;
    lowering.declare_extras()?;

    let syntax_rules: Vec<_> = grammar
        .rules
        .iter()
        .filter(|(name, _)| matches!(lowering.kinds.get(name.as_str()), Some(RuleKind::Syntax(_))))
        .collect();
    for (lhs, (name, body)) in syntax_rules.into_iter().enumerate() {
        let alternatives = lowering.expand_rule(name, lhs, body)?;
        lowering
            .productions
            .extend(alternatives.into_iter().map(|alternative| Production { lhs, alternative }));
    }

    lowering.check_extras_unused()?;
    let conflicts = lowering.resolve_conflicts()?;

    Ok(LoweredGrammar {
        name: grammar.name.clone(),
        terminals: lowering.terminals,
        nonterminals: lowering.nonterminals,
        productions: lowering.productions,
        conflicts,
    })
}

/// Each ordering ranks its names highest first.
fn named_precedences(levels: &[Vec<PrecedenceEntry>]) -> CompileResult<HashMap<String, i32>> {
    let mut values = HashMap::new();
    for level in levels {
        for (idx, entry) in level.iter().enumerate() {
            match entry {
                PrecedenceEntry::Name(name) => {
                    values.entry(name.clone()).or_insert((level.len() - idx) as i32);
                }
                PrecedenceEntry::Symbol(name) => {
                    return Err(CompileError::Unsupported(format!(
                        "rule `{name}` in a precedence ordering"
                    )));
                }
            }
        }
    }
    Ok(values)
}

impl<'g> Lowering<'g> {
    fn declare_rules(&mut self) -> CompileResult<()> {
        let grammar = self.grammar;
        for (name, body) in &grammar.rules {
            if self.kinds.contains_key(name.as_str()) {
                return Err(CompileError::Grammar(format!("rule `{name}` defined twice")));
            }
            let kind = if body.is_lexical() {
                let precedence = self.lexical_precedence(body)?;
                let literal = matches!(strip_precedence(body), Rule::String(_));
                self.terminals.push(Terminal {
                    name: name.clone(),
                    regex: token_regex(name, body)?,
                    named: true,
                    visible: !name.starts_with('_'),
                    literal,
                    extra: false,
                    precedence,
                });
                RuleKind::Token(self.terminals.len() - 1)
            } else {
                let inline = grammar.inline.iter().any(|n| n == name);
                self.nonterminals.push(Nonterminal {
                    name: name.clone(),
                    visible: !name.starts_with('_') && !inline,
                    origin: self.nonterminals.len(),
                });
                RuleKind::Syntax(self.nonterminals.len() - 1)
            };
            self.kinds.insert(name, kind);
        }
        Ok(())
    }

    fn declare_extras(&mut self) -> CompileResult<()> {
        let grammar = self.grammar;
        for extra in &grammar.extras {
            let terminal = match extra {
                Rule::Symbol(name) => match self.kinds.get(name.as_str()) {
                    Some(RuleKind::Token(t)) => *t,
                    Some(RuleKind::Syntax(_)) => {
                        return Err(CompileError::Unsupported(format!(
                            "nonterminal extra `{name}`"
                        )));
                    }
                    None => return Err(CompileError::UndefinedSymbol(name.clone())),
                },
                rule if rule.is_lexical() => self.anonymous_terminal(rule)?,
                _ => {
                    return Err(CompileError::Unsupported(
                        "extras must be tokens or token rules".into(),
                    ));
                }
            };
            self.terminals[terminal].extra = true;
        }
        Ok(())
    }

    /// Registers (or finds) the anonymous terminal spelled by `rule`.
    fn anonymous_terminal(&mut self, rule: &Rule) -> CompileResult<usize> {
        let regex = token_regex("anonymous token", rule)?;
        let (literal, name) = match strip_token(rule) {
            Rule::String(value) => (true, value.clone()),
            Rule::Pattern { value, .. } => (false, value.clone()),
            _ => (false, regex.clone()),
        };
        let key = (literal, regex);
        if let Some(&idx) = self.anonymous.get(&key) {
            return Ok(idx);
        }
        let precedence = self.lexical_precedence(rule)?;
        self.terminals.push(Terminal {
            name,
            regex: key.1.clone(),
            named: false,
            visible: literal,
            literal,
            extra: false,
            precedence,
        });
        let idx = self.terminals.len() - 1;
        self.anonymous.insert(key, idx);
        Ok(idx)
    }

    fn resolve_precedence(&self, value: &Precedence) -> CompileResult<i32> {
        match value {
            Precedence::Integer(n) => Ok(*n),
            Precedence::Name(name) => self
                .precedences
                .get(name)
                .copied()
                .ok_or_else(|| CompileError::Grammar(format!("undefined precedence `{name}`"))),
        }
    }

    /// First precedence found on the token's wrappers, outermost first.
    fn lexical_precedence(&self, rule: &Rule) -> CompileResult<i32> {
        match rule {
            Rule::Prec { value, .. }
            | Rule::PrecLeft { value, .. }
            | Rule::PrecRight { value, .. } => self.resolve_precedence(value),
            Rule::Token(content) | Rule::ImmediateToken(content) => {
                self.lexical_precedence(content)
            }
            _ => Ok(0),
        }
    }

    fn check_extras_unused(&self) -> CompileResult<()> {
        for production in &self.productions {
            for sym in &production.alternative.symbols {
                if let Sym::Terminal(t) = *sym
                    && self.terminals[t].extra
                {
                    return Err(CompileError::Unsupported(format!(
                        "extra `{}` used inside rule `{}`",
                        self.terminals[t].name, self.nonterminals[production.lhs].name
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve_conflicts(&self) -> CompileResult<Vec<Vec<usize>>> {
        let mut sets = Vec::new();
        for names in &self.grammar.conflicts {
            let mut set = Vec::with_capacity(names.len());
            for name in names {
                match self.kinds.get(name.as_str()) {
                    Some(RuleKind::Syntax(n)) => set.push(*n),
                    Some(RuleKind::Token(_)) => {
                        return Err(CompileError::Grammar(format!(
                            "conflict names token rule `{name}`"
                        )));
                    }
                    None => return Err(CompileError::UndefinedSymbol(name.clone())),
                }
            }
            set.sort_unstable();
            set.dedup();
            sets.push(set);
        }
        Ok(sets)
    }
}

fn strip_precedence(rule: &Rule) -> &Rule {
    match rule {
        Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. } => strip_precedence(content),
        other => other,
    }
}

/// Looks through precedence and token wrappers.
fn strip_token(rule: &Rule) -> &Rule {
    match rule {
        Rule::Token(content) | Rule::ImmediateToken(content) => strip_token(content),
        Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. } => strip_token(content),
        other => other,
    }
}
