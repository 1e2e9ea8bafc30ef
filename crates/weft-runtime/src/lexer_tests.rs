use weft_core::{LexModeId, StateId, SymbolId};

use crate::lexer::{Lexer, Token};
use crate::test_utils::statements;

fn lex_all(text: &str, offset: usize) -> Token {
    let language = statements();
    Lexer::new(language.table(), text).next_token_in(offset, &[LexModeId::ALL])
}

#[test]
fn longest_match_examines_one_byte_past() {
    let language = statements();
    let identifier = language.symbol_for_name("identifier", true).unwrap();

    let token = Lexer::new(language.table(), "abc = 1;").next_token_in(0, &[LexModeId::ALL]);

    assert_eq!(
        token,
        Token {
            kind: identifier,
            start: 0,
            end: 3,
            examined_end: 4,
        }
    );
    assert_eq!(token.lookahead_bytes(), 1);
}

#[test]
fn token_at_end_of_text_observes_end() {
    let language = statements();
    let number = language.symbol_for_name("number", true).unwrap();

    let token = Lexer::new(language.table(), "x = 12").next_token_in(4, &[LexModeId::ALL]);

    assert_eq!(token.kind, number);
    assert_eq!(token.start..token.end, 4..6);
    assert_eq!(token.examined_end, 7);
}

#[test]
fn literal_without_continuation_examines_nothing_more() {
    let language = statements();
    let semicolon = language.symbol_for_name(";", false).unwrap();

    let token = Lexer::new(language.table(), ";;").next_token_in(0, &[LexModeId::ALL]);

    assert_eq!(token.kind, semicolon);
    assert_eq!(token.len(), 1);
    assert_eq!(token.lookahead_bytes(), 0);
}

#[test]
fn end_of_input() {
    let token = lex_all("a", 1);

    assert_eq!(token.kind, SymbolId::END);
    assert!(token.is_empty());
    assert_eq!(token.examined_end, 2);
}

#[test]
fn unknown_byte_becomes_error_token() {
    let token = lex_all("#a", 0);

    assert!(token.is_error());
    assert_eq!(token.start..token.end, 0..1);
}

#[test]
fn error_token_spans_whole_character() {
    let token = lex_all("é", 0);

    assert!(token.is_error());
    assert_eq!(token.len(), "é".len());
}

#[test]
fn extras_match_in_every_mode() {
    let language = statements();
    let lexer = Lexer::new(language.table(), " \n");

    let token = lexer.next_token(0, &[StateId::START]);

    assert!(language.is_extra(token.kind));
    assert_eq!(token.len(), 1);
}

#[test]
fn ineligible_terminal_still_reported() {
    let language = statements();
    let number = language.symbol_for_name("number", true).unwrap();
    let lexer = Lexer::new(language.table(), "42");

    // A program can only start with an identifier.
    let token = lexer.next_token(0, &[StateId::START]);

    assert_eq!(token.kind, number);
    assert_eq!(token.len(), 2);
}
