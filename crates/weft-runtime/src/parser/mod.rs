//! Shift-reduce driver with GLR forking, error recovery and incremental
//! reuse.
//!
//! One [`Parse`] runs per call. Versions advance in lockstep: every round
//! feeds one lookahead to all of them, so they always sit at the same byte
//! position and share the token. With a single version the token is scanned
//! in that state's lex mode; with several, in the union of their modes.
//! Everything built while more than one version is alive is marked fragile
//! and never reused by a later reparse.

mod glr;
mod recovery;
mod reuse;
mod stack;

use weft_core::{LexModeId, StateId, SymbolId};
use weft_table::ParseTable;

use self::glr::{Round, Version};
use self::reuse::Reuse;
use self::stack::Stack;
use crate::edit::{Edit, EditSet};
use crate::error::{ParseError, ParseResult};
use crate::language::Language;
use crate::lexer::{Lexer, Token};
use crate::options::{CancellationFlag, ConflictPolicy, ParseOptions};
use crate::trace::{NoopTracer, Tracer};
use crate::tree::{Node, NodeFlags, ReduceSite, Tree};

/// Parses text with one language.
#[derive(Clone, Debug)]
pub struct Parser {
    language: Language,
    options: ParseOptions,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        Self::with_options(language, ParseOptions::default())
    }

    pub fn with_options(language: Language, options: ParseOptions) -> Self {
        Self { language, options }
    }

    pub fn builder(language: Language) -> ParserBuilder {
        ParserBuilder::new(language)
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, text: &str) -> ParseResult<Tree> {
        self.parse_with(text, &mut NoopTracer)
    }

    pub fn parse_with<T: Tracer>(&self, text: &str, tracer: &mut T) -> ParseResult<Tree> {
        tracing::debug!(language = self.language.name(), bytes = text.len(), "parse");
        let root = Parse::new(&self.language, &self.options, text, tracer, None).run()?;
        Ok(Tree::new(root, self.language.clone()))
    }

    /// Parses `text`, the result of applying `edits` to the text of `old`,
    /// reusing whatever `old` proves unaffected. The result equals
    /// [`Parser::parse`] on the same text.
    pub fn reparse(&self, old: &Tree, edits: &[Edit], text: &str) -> ParseResult<Tree> {
        self.reparse_with(old, edits, text, &mut NoopTracer)
    }

    pub fn reparse_with<T: Tracer>(
        &self,
        old: &Tree,
        edits: &[Edit],
        text: &str,
        tracer: &mut T,
    ) -> ParseResult<Tree> {
        if !Language::same(old.language(), &self.language) {
            return Err(ParseError::LanguageMismatch {
                expected: self.language.name().to_owned(),
                found: old.language().name().to_owned(),
            });
        }
        let edits = EditSet::new(edits, old.len(), text.len())?;
        tracing::debug!(
            language = self.language.name(),
            bytes = text.len(),
            edits = edits.edits().len(),
            reuse = self.options.reuse,
            "reparse"
        );
        let reuse = self.options.reuse.then(|| Reuse::new(old.root().clone(), edits));
        let root = Parse::new(&self.language, &self.options, text, tracer, reuse).run()?;
        Ok(Tree::new(root, self.language.clone()))
    }
}

/// Builder for [`Parser`], one setter per [`ParseOptions`] field.
pub struct ParserBuilder {
    language: Language,
    options: ParseOptions,
}

impl ParserBuilder {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            options: ParseOptions::default(),
        }
    }

    /// Replaces all options at once.
    pub fn options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn exec_fuel(mut self, fuel: u64) -> Self {
        self.options = self.options.exec_fuel(fuel);
        self
    }

    pub fn max_versions(mut self, max: usize) -> Self {
        self.options = self.options.max_versions(max);
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.options = self.options.conflict_policy(policy);
        self
    }

    pub fn cancellation(mut self, flag: CancellationFlag) -> Self {
        self.options = self.options.cancellation(flag);
        self
    }

    pub fn reuse(mut self, enabled: bool) -> Self {
        self.options = self.options.reuse(enabled);
        self
    }

    pub fn build(self) -> Parser {
        Parser::with_options(self.language, self.options)
    }
}

/// The current token together with the leaf that will be shifted for it.
#[derive(Clone, Debug)]
pub(crate) struct Lookahead {
    pub(crate) token: Token,
    pub(crate) leaf: Node,
    /// Scanned for several states at once, or while recovering.
    pub(crate) fragile: bool,
}

impl Lookahead {
    pub(crate) fn kind(&self) -> SymbolId {
        self.token.kind
    }

    pub(crate) fn mode(&self) -> LexModeId {
        self.leaf.lex_mode().unwrap_or(LexModeId::NONE)
    }

    pub(crate) fn is_extra(&self) -> bool {
        self.leaf.is_extra()
    }
}

enum Mode {
    Normal,
    /// Skipping tokens into an error node until some stack depth can act
    /// on the lookahead.
    Recovering { skipped: Vec<Node> },
}

pub(crate) struct Parse<'a, T: Tracer> {
    language: &'a Language,
    table: &'a ParseTable,
    lexer: Lexer<'a>,
    options: &'a ParseOptions,
    tracer: &'a mut T,
    stack: Stack,
    versions: Vec<Version>,
    /// Where the next token starts.
    position: usize,
    lookahead: Option<Lookahead>,
    mode: Mode,
    fuel: Option<u64>,
    reuse: Option<Reuse>,
    /// Positions where missing insertion and popping were already tried.
    missing_at: Option<usize>,
    popped_at: Option<usize>,
    resumed_at_end: bool,
}

impl<'a, T: Tracer> Parse<'a, T> {
    fn new(
        language: &'a Language,
        options: &'a ParseOptions,
        text: &'a str,
        tracer: &'a mut T,
        reuse: Option<Reuse>,
    ) -> Self {
        let table = language.table();
        let (stack, bottom) = Stack::new();
        Self {
            language,
            table,
            lexer: Lexer::new(table, text),
            options,
            tracer,
            stack,
            versions: vec![Version::new(bottom)],
            position: 0,
            lookahead: None,
            mode: Mode::Normal,
            fuel: options.exec_fuel,
            reuse,
            missing_at: None,
            popped_at: None,
            resumed_at_end: false,
        }
    }

    fn run(mut self) -> ParseResult<Node> {
        loop {
            self.tick()?;
            let lookahead = match self.lookahead.take() {
                Some(lookahead) => lookahead,
                None => self.next_lookahead()?,
            };

            if let Mode::Recovering { .. } = self.mode {
                if let Some(root) = self.recover_step(lookahead)? {
                    return Ok(root);
                }
                continue;
            }

            if lookahead.is_extra() {
                self.push_extra(&lookahead);
                self.position = lookahead.token.end;
                continue;
            }

            if let Some(follow) = self.reuse_subtree(&lookahead)? {
                self.lookahead = Some(follow);
                continue;
            }

            match self.advance(&lookahead)? {
                Round::Shifted => self.position = lookahead.token.end,
                Round::Accepted(version) => return Ok(self.finish(version)),
                Round::Failed(version) => {
                    if let Some(root) = self.handle_error(version, lookahead)? {
                        return Ok(root);
                    }
                }
            }
        }
    }

    /// Charges one unit of fuel and checks for cancellation.
    fn tick(&mut self) -> ParseResult<()> {
        if let Some(flag) = &self.options.cancellation
            && flag.is_cancelled()
        {
            return Err(ParseError::Cancelled);
        }
        if let Some(fuel) = &mut self.fuel {
            if *fuel == 0 {
                return Err(ParseError::FuelExhausted);
            }
            *fuel -= 1;
        }
        Ok(())
    }

    fn next_lookahead(&mut self) -> ParseResult<Lookahead> {
        self.tick()?;
        if let Mode::Recovering { .. } = self.mode {
            return Ok(self.scan(&[LexModeId::ALL], LexModeId::ALL, true));
        }
        if self.versions.len() == 1 {
            let mode = self.table.lex_mode(self.top_state());
            return Ok(self.scan_single(self.position, mode));
        }

        let mut modes: Vec<LexModeId> = self
            .versions
            .iter()
            .map(|v| self.table.lex_mode(self.stack.state(v.head)))
            .collect();
        modes.sort_unstable();
        modes.dedup();
        if let [mode] = modes[..] {
            return Ok(self.scan(&[mode], mode, true));
        }
        Ok(self.scan(&modes, LexModeId::NONE, true))
    }

    /// Scans in one state's mode, taking the leaf from the previous tree
    /// when it is provably what the lexer would produce.
    fn scan_single(&mut self, at: usize, mode: LexModeId) -> Lookahead {
        let old_leaf = self.reuse.as_mut().and_then(|r| r.leaf_at(at));
        if let Some(leaf) = &old_leaf
            && let Some(reuse) = &self.reuse
            && reuse.leaf_reusable(leaf, at, mode)
        {
            self.tracer.trace_reuse_leaf(leaf.kind(), at);
            let end = at + leaf.len();
            return Lookahead {
                token: Token {
                    kind: leaf.kind(),
                    start: at,
                    end,
                    examined_end: end + leaf.lookahead_bytes(),
                },
                leaf: leaf.clone(),
                fragile: false,
            };
        }

        let token = self.lexer.next_token_in(at, &[mode]);
        self.tracer.trace_lex(&token);
        let mut leaf = self.leaf_for(&token, mode);
        if let Some(old) = old_leaf
            && old.same_leaf(&leaf)
        {
            leaf = old;
        }
        Lookahead {
            token,
            leaf,
            fragile: false,
        }
    }

    fn scan(&mut self, modes: &[LexModeId], leaf_mode: LexModeId, fragile: bool) -> Lookahead {
        let token = self.lexer.next_token_in(self.position, modes);
        self.tracer.trace_lex(&token);
        Lookahead {
            leaf: self.leaf_for(&token, leaf_mode),
            token,
            fragile,
        }
    }

    fn leaf_for(&self, token: &Token, mode: LexModeId) -> Node {
        let mut flags = NodeFlags::default();
        if token.is_error() {
            flags = flags | NodeFlags::ERROR;
        } else if self.language.is_extra(token.kind) {
            flags = flags | NodeFlags::EXTRA;
        }
        Node::leaf(token.kind, token.len(), token.lookahead_bytes(), mode, flags)
    }

    fn top_state(&self) -> StateId {
        self.stack.state(self.versions[0].head)
    }

    /// Builds the root from an accepting version. Extras around the start
    /// symbol's node are merged into it.
    fn finish(&mut self, version: Version) -> Node {
        self.tracer.trace_accept();
        let nodes = self.stack.nodes(version.head);
        tracing::debug!(
            bytes = self.position,
            entries = self.stack.len(),
            error_cost = version.error_cost,
            "parse accepted"
        );

        let mut main = nodes.iter().filter(|(_, extra)| !extra);
        let (Some((start, _)), None) = (main.next(), main.next()) else {
            return self.error_root(nodes.into_iter().map(|(n, _)| n).collect());
        };
        if nodes.len() == 1 {
            return start.clone();
        }

        let site = start.reduce_site().unwrap_or(ReduceSite {
            parse_state: StateId::START,
            follow_kind: SymbolId::END,
            follow_mode: LexModeId::ALL,
        });
        let mut children = Vec::new();
        for (node, extra) in &nodes {
            if *extra {
                children.push(node.clone());
            } else if node.is_leaf() {
                children.push(node.clone());
            } else {
                children.extend(node.children().iter().cloned());
            }
        }
        Node::branch(start.kind(), children, site, 0, true)
    }

    fn error_root(&self, children: Vec<Node>) -> Node {
        Node::error(
            children,
            ReduceSite {
                parse_state: StateId::START,
                follow_kind: SymbolId::END,
                follow_mode: LexModeId::ALL,
            },
        )
    }
}

#[cfg(test)]
mod parser_tests;
#[cfg(test)]
mod stack_tests;
