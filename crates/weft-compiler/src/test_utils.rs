//! Fixture grammars and small drivers for compiled tables.

use weft_core::grammar::dsl::*;
use weft_core::{Grammar, SymbolId};
use weft_table::{Action, LexStateData, TableData};

/// `pair: "a" "a"?` with single spaces as extras.
pub fn pair_grammar() -> Grammar {
    GrammarBuilder::new("pair")
        .rule("pair", seq([string("a"), optional(string("a"))]))
        .extra(string(" "))
        .build()
}

/// Sums and products over numbers, with the usual precedences.
pub fn arith_grammar() -> Grammar {
    GrammarBuilder::new("arith")
        .rule(
            "expr",
            choice([
                sym("number"),
                prec_left(1, seq([sym("expr"), string("+"), sym("expr")])),
                prec_left(2, seq([sym("expr"), string("*"), sym("expr")])),
                seq([string("("), sym("expr"), string(")")]),
            ]),
        )
        .rule("number", pattern(r"\d+"))
        .extra(pattern(r"\s"))
        .build()
}

/// `a b` derivable two ways; only compiles with the conflict declared.
pub fn ambiguous_grammar(declare: bool) -> Grammar {
    let builder = GrammarBuilder::new("ambiguous")
        .rule("start", choice([sym("left"), sym("right")]))
        .rule("left", seq([string("a"), string("b")]))
        .rule("right", seq([string("a"), string("b")]));
    if declare {
        builder.conflict(["left", "right"]).build()
    } else {
        builder.build()
    }
}

/// Longest match from the start of `text`, best accept first.
pub fn longest_match(states: &[LexStateData], text: &str) -> Option<(SymbolId, usize)> {
    let mut state = 0usize;
    let mut best = None;
    for (i, &byte) in text.as_bytes().iter().enumerate() {
        let next = states[state]
            .transitions
            .iter()
            .find(|&&(lo, hi, _)| lo <= byte && byte <= hi);
        let Some(&(_, _, target)) = next else { break };
        state = target.index();
        if let Some(&symbol) = states[state].accepts.first() {
            best = Some((symbol, i + 1));
        }
    }
    best
}

/// Runs the first action of every entry over `tokens` (end appended) and
/// returns the reduced productions in order, or `None` on a syntax error.
pub fn reductions(data: &TableData, tokens: &[SymbolId]) -> Option<Vec<u16>> {
    let mut stack = vec![0usize];
    let mut input = tokens.iter().copied().chain([SymbolId::END]).peekable();
    let mut reduced = Vec::new();

    loop {
        let lookahead = *input.peek()?;
        let state = &data.states[*stack.last()?];
        let (_, actions) = state.entries.iter().find(|(s, _)| *s == lookahead)?;
        match actions.first()? {
            Action::Shift(target) => {
                stack.push(target.index());
                input.next();
            }
            Action::Reduce(p) => {
                let production = data.productions[p.index()];
                stack.truncate(stack.len() - production.rhs_len as usize);
                let exposed = &data.states[*stack.last()?];
                let (_, goto) = exposed.entries.iter().find(|(s, _)| *s == production.lhs)?;
                let Some(Action::Shift(target)) = goto.first() else {
                    return None;
                };
                stack.push(target.index());
                reduced.push(p.0);
            }
            Action::Accept => return Some(reduced),
        }
    }
}

pub fn symbol(data: &TableData, name: &str) -> SymbolId {
    let idx = data
        .symbols
        .iter()
        .position(|s| s.name == name)
        .unwrap_or_else(|| panic!("no symbol named {name}"));
    SymbolId(idx as u16)
}
