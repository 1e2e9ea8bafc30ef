//! Rule bodies to flat alternatives.

use weft_core::{Precedence, Rule};

use super::{Alternative, Assoc, Lowering, MAX_ALTERNATIVES, Nonterminal, Production, RuleKind, Sym};
use crate::error::{CompileError, CompileResult};

struct RuleContext<'a> {
    name: &'a str,
    origin: usize,
    repeats: usize,
}

impl Alternative {
    fn single(sym: Sym) -> Self {
        Self {
            symbols: vec![sym],
            ..Self::default()
        }
    }

    /// Sequence of `self` then `other`. The first precedence found wins.
    fn concat(&self, other: &Alternative) -> Alternative {
        let mut symbols = Vec::with_capacity(self.symbols.len() + other.symbols.len());
        symbols.extend_from_slice(&self.symbols);
        symbols.extend_from_slice(&other.symbols);
        let (precedence, assoc) = if self.precedence.is_some() {
            (self.precedence, self.assoc)
        } else {
            (other.precedence, other.assoc)
        };
        Alternative {
            symbols,
            precedence,
            assoc,
            dynamic_precedence: self.dynamic_precedence + other.dynamic_precedence,
        }
    }
}

impl Lowering<'_> {
    pub(super) fn expand_rule(
        &mut self,
        name: &str,
        lhs: usize,
        body: &Rule,
    ) -> CompileResult<Vec<Alternative>> {
        let mut ctx = RuleContext {
            name,
            origin: lhs,
            repeats: 0,
        };
        self.expand(&mut ctx, body)
    }

    fn expand(
        &mut self,
        ctx: &mut RuleContext<'_>,
        rule: &Rule,
    ) -> CompileResult<Vec<Alternative>> {
        let alternatives = match rule {
            Rule::Blank => vec![Alternative::default()],
            Rule::String(_) | Rule::Pattern { .. } | Rule::Token(_) | Rule::ImmediateToken(_) => {
                let terminal = self.anonymous_terminal(rule)?;
                vec![Alternative::single(Sym::Terminal(terminal))]
            }
            Rule::Symbol(name) => match self.kinds.get(name.as_str()) {
                Some(RuleKind::Token(t)) => vec![Alternative::single(Sym::Terminal(*t))],
                Some(RuleKind::Syntax(n)) => vec![Alternative::single(Sym::Nonterminal(*n))],
                None => return Err(CompileError::UndefinedSymbol(name.clone())),
            },
            Rule::Seq(members) => {
                let mut acc = vec![Alternative::default()];
                for member in members {
                    let parts = self.expand(ctx, member)?;
                    if acc.len() * parts.len() > MAX_ALTERNATIVES {
                        return Err(CompileError::TooManyAlternatives(ctx.name.to_owned()));
                    }
                    acc = acc
                        .iter()
                        .flat_map(|a| parts.iter().map(move |b| a.concat(b)))
                        .collect();
                }
                acc
            }
            Rule::Choice(members) => {
                let mut acc = Vec::new();
                for member in members {
                    acc.extend(self.expand(ctx, member)?);
                }
                acc
            }
            Rule::Repeat(content) => {
                let helper = self.repeat_helper(ctx, content)?;
                vec![
                    Alternative::default(),
                    Alternative::single(Sym::Nonterminal(helper)),
                ]
            }
            Rule::Repeat1(content) => {
                let helper = self.repeat_helper(ctx, content)?;
                vec![Alternative::single(Sym::Nonterminal(helper))]
            }
            Rule::Field { content, .. } => self.expand(ctx, content)?,
            Rule::Prec { value, content } => {
                self.with_precedence(ctx, value, Assoc::None, content)?
            }
            Rule::PrecLeft { value, content } => {
                self.with_precedence(ctx, value, Assoc::Left, content)?
            }
            Rule::PrecRight { value, content } => {
                self.with_precedence(ctx, value, Assoc::Right, content)?
            }
            Rule::PrecDynamic { value, content } => {
                let mut alternatives = self.expand(ctx, content)?;
                for alt in &mut alternatives {
                    alt.dynamic_precedence += value;
                }
                alternatives
            }
            Rule::Alias { value, .. } => {
                return Err(CompileError::Unsupported(format!(
                    "alias `{value}` in rule `{}`",
                    ctx.name
                )));
            }
            Rule::Reserved { .. } => {
                return Err(CompileError::Unsupported(format!(
                    "reserved words in rule `{}`",
                    ctx.name
                )));
            }
        };

        if alternatives.len() > MAX_ALTERNATIVES {
            return Err(CompileError::TooManyAlternatives(ctx.name.to_owned()));
        }
        Ok(alternatives)
    }

    fn with_precedence(
        &mut self,
        ctx: &mut RuleContext<'_>,
        value: &Precedence,
        assoc: Assoc,
        content: &Rule,
    ) -> CompileResult<Vec<Alternative>> {
        let value = self.resolve_precedence(value)?;
        let mut alternatives = self.expand(ctx, content)?;
        for alt in &mut alternatives {
            if alt.precedence.is_none() {
                alt.precedence = Some(value);
                alt.assoc = assoc;
            }
        }
        Ok(alternatives)
    }

    /// `helper -> helper item | item` for every non-empty item alternative.
    fn repeat_helper(&mut self, ctx: &mut RuleContext<'_>, content: &Rule) -> CompileResult<usize> {
        ctx.repeats += 1;
        self.nonterminals.push(Nonterminal {
            name: format!("{}_repeat{}", ctx.name, ctx.repeats),
            visible: false,
            origin: ctx.origin,
        });
        let helper = self.nonterminals.len() - 1;

        let items = self.expand(ctx, content)?;
        for item in items.into_iter().filter(|item| !item.symbols.is_empty()) {
            let recursive = Alternative::single(Sym::Nonterminal(helper)).concat(&item);
            self.productions.push(Production {
                lhs: helper,
                alternative: recursive,
            });
            self.productions.push(Production {
                lhs: helper,
                alternative: item,
            });
        }
        Ok(helper)
    }
}
