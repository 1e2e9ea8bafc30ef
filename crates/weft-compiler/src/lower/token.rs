//! Token bodies to regular expressions.

use weft_core::Rule;

use crate::error::{CompileError, CompileResult};

/// Renders a token body as one `regex-syntax` pattern.
///
/// `name` is only used for error messages.
pub(crate) fn token_regex(name: &str, rule: &Rule) -> CompileResult<String> {
    let mut out = String::new();
    push_regex(name, rule, &mut out)?;
    Ok(out)
}

fn push_regex(name: &str, rule: &Rule, out: &mut String) -> CompileResult<()> {
    match rule {
        Rule::Blank => {}
        Rule::String(value) => out.push_str(&regex_syntax::escape(value)),
        Rule::Pattern { value, flags } => {
            let case_insensitive = flags.as_deref().is_some_and(|f| f.contains('i'));
            out.push_str(if case_insensitive { "(?i:" } else { "(?:" });
            out.push_str(value);
            out.push(')');
        }
        Rule::Seq(members) => {
            for member in members {
                push_regex(name, member, out)?;
            }
        }
        Rule::Choice(members) => {
            out.push_str("(?:");
            for (i, member) in members.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                push_regex(name, member, out)?;
            }
            out.push(')');
        }
        Rule::Repeat(content) => {
            out.push_str("(?:");
            push_regex(name, content, out)?;
            out.push_str(")*");
        }
        Rule::Repeat1(content) => {
            out.push_str("(?:");
            push_regex(name, content, out)?;
            out.push_str(")+");
        }
        Rule::Token(content)
        | Rule::ImmediateToken(content)
        | Rule::Field { content, .. }
        | Rule::Prec { content, .. }
        | Rule::PrecLeft { content, .. }
        | Rule::PrecRight { content, .. }
        | Rule::PrecDynamic { content, .. } => push_regex(name, content, out)?,
        Rule::Symbol(reference) => {
            return Err(CompileError::Unsupported(format!(
                "rule reference `{reference}` inside token `{name}`"
            )));
        }
        Rule::Alias { .. } => {
            return Err(CompileError::Unsupported(format!("alias inside token `{name}`")));
        }
        Rule::Reserved { .. } => {
            return Err(CompileError::Unsupported(format!(
                "reserved words inside token `{name}`"
            )));
        }
    }
    Ok(())
}
