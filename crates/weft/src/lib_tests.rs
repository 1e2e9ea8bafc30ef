use std::io::Write;

use indoc::indoc;

use crate::dsl::*;
use crate::test_utils::{config_grammar, expr_grammar, load, parse};
use crate::{CompileError, Error, Language, Parser, TableError};

#[test]
fn language_from_builder() {
    let language = load(&expr_grammar());

    assert_eq!(language.name(), "expr");
    assert_eq!(parse(&language, "a+b").to_sexp(), r#"(expr (ident) "+" (ident))"#);
}

#[test]
fn language_from_json() {
    let json = indoc! {r#"
        {
          "name": "pair",
          "rules": {
            "pair": {
              "type": "SEQ",
              "members": [
                {"type": "SYMBOL", "name": "word"},
                {"type": "STRING", "value": ":"},
                {"type": "SYMBOL", "name": "word"}
              ]
            },
            "word": {"type": "PATTERN", "value": "[a-z]+"}
          },
          "extras": [{"type": "PATTERN", "value": "\\s"}]
        }
    "#};

    let language = crate::language_from_json(json).unwrap();
    let tree = parse(&language, "key : value");

    insta::assert_snapshot!(tree.to_sexp(), @r#"(pair (word) ":" (word))"#);
}

#[test]
fn invalid_json_is_a_grammar_error() {
    let err = crate::language_from_json("{").unwrap_err();

    assert!(matches!(err, Error::Grammar(_)));
}

#[test]
fn undefined_symbol_is_a_compile_error() {
    let grammar = GrammarBuilder::new("bad").rule("start", sym("nowhere")).build();

    let err = crate::language(&grammar).unwrap_err();

    assert!(matches!(
        err,
        Error::Compile(CompileError::UndefinedSymbol(ref name)) if name == "nowhere"
    ));
    insta::assert_snapshot!(err.to_string(), @"undefined symbol `nowhere`");
}

#[test]
fn language_from_table_file() {
    let bytes = crate::compile(&config_grammar()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();

    let language = Language::from_path(file.path()).unwrap();
    let tree = Parser::new(language).parse("a = [1, b];").unwrap();

    insta::assert_snapshot!(tree.to_sexp(), @r#"(document (setting (key) "=" (list "[" (number) "," (key) "]") ";"))"#);
}

#[test]
fn truncated_table_file_is_rejected() {
    let bytes = crate::compile(&expr_grammar()).unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes[..bytes.len() / 2]).unwrap();

    let err = Language::from_path(file.path()).unwrap_err();

    assert!(matches!(err, TableError::SizeMismatch { .. } | TableError::TooSmall(_)));
}
