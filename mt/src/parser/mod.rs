//! Parser implementation using lalrpop

use crate::ast::{Expr, Program, Span};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use lalrpop_util::ParseError;


lalrpop_util::lalrpop_mod!(
    #[allow(clippy::all)]
    grammar
);

/// Parse tokens into AST
pub fn parse(filename: &str, _source: &str, tokens: Vec<(Token, Span)>) -> Result<Program> {
    tracing::trace!(filename, tokens = tokens.len(), "parse");
    let token_iter = layout(tokens)
        .into_iter()
        .map(|(tok, span)| (span.start, tok, span.end));

    grammar::ProgramParser::new()
        .parse(token_iter)
        .map_err(|e| match e {
            ParseError::User { error } => error,
            ParseError::InvalidToken { location } => {
                CompileError::parser("invalid token", Span::new(location, location + 1))
            }
            ParseError::UnrecognizedEof { location, expected } => CompileError::parser(
                format!("unexpected end of input{}", expecting(&expected)),
                Span::new(location, location),
            ),
            ParseError::UnrecognizedToken {
                token: (start, token, end),
                expected,
            } => CompileError::parser(
                format!("unexpected `{token}`{}", expecting(&expected)),
                Span::new(start, end),
            ),
            ParseError::ExtraToken {
                token: (start, token, end),
            } => CompileError::parser(format!("unexpected `{token}`"), Span::new(start, end)),
        })
}

fn expecting(expected: &[String]) -> String {
    match expected {
        [] => String::new(),
        [one] => format!("; expected {one}"),
        _ => format!("; expected one of {}", expected.join(", ")),
    }
}

/// Parameter names of `id := (...) { ... }`, parsed as expressions
pub(crate) fn parameters(id: &str, exprs: Vec<(Expr, Span)>) -> Result<Vec<String>> {
    let mut params: Vec<String> = Vec::with_capacity(exprs.len());
    for (expr, span) in exprs {
        let Expr::Identifier(name) = expr else {
            return Err(CompileError::parser(
                format!("expected parameter name in `{id}`"),
                span,
            ));
        };
        if params.contains(&name) {
            return Err(CompileError::parser(
                format!("duplicate parameter `{name}` in `{id}`"),
                span,
            ));
        }
        params.push(name);
    }
    Ok(params)
}

/// Bracket open at the current token
enum Open {
    /// `(`; `params` while the group can still be a parameter list
    Paren { params: bool },
    Brace,
}

impl Open {
    fn disqualify(open: &mut [Open]) {
        if let Some(Open::Paren { params }) = open.last_mut() {
            *params = false;
        }
    }
}

/// Drop the newlines the grammar never sees: those inside parentheses and
/// those between a parameter list and the function body.
fn layout(tokens: Vec<(Token, Span)>) -> Vec<(Token, Span)> {
    let mut out: Vec<(Token, Span)> = Vec::with_capacity(tokens.len());
    let mut open: Vec<Open> = Vec::new();
    // A `name := (a, b)` group just closed; newlines wait for the next token
    let mut header = false;
    let mut pending = Vec::new();

    for (token, span) in tokens {
        if token == Token::Newline {
            if matches!(open.last(), Some(Open::Paren { .. })) {
                continue;
            }
            if header {
                pending.push((token, span));
            } else {
                out.push((token, span));
            }
            continue;
        }

        if header {
            header = false;
            if token == Token::LBrace {
                pending.clear();
            } else {
                out.append(&mut pending);
            }
        }

        match &token {
            Token::LParen => {
                let params = matches!(
                    out.as_slice(),
                    [.., (Token::Ident(_), _), (Token::ColonEq, _)]
                );
                Open::disqualify(&mut open);
                open.push(Open::Paren { params });
            }
            Token::RParen => {
                if let Some(Open::Paren { params }) = open.pop() {
                    header = params;
                }
            }
            Token::LBrace => {
                Open::disqualify(&mut open);
                open.push(Open::Brace);
            }
            Token::RBrace => {
                open.pop();
            }
            Token::Ident(_) | Token::Comma => {}
            _ => Open::disqualify(&mut open),
        }
        out.push((token, span));
    }
    out.append(&mut pending);
    out
}
