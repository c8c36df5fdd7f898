use logos::Logos;

use crate::classify::classify;
use crate::token::{Span, SpannedToken, SymbolType, TemplateSegment, Token};
use crate::version::Version;

/// A lexical error with the byte span where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub span: Span,
}

/// Lex a complete XPath expression under the given language version.
///
/// Whitespace and comments are consumed here; the returned tokens carry
/// byte spans into `source`. Keyword classification is final: a word is a
/// keyword token only where the version reserves it and the surrounding
/// tokens permit that role.
pub fn lex(source: &str, version: Version) -> Result<Vec<SpannedToken<'_>>, LexError> {
    lex_at(source, version, 0)
}

fn shift(span: Span, base: usize) -> Span {
    span.start + base..span.end + base
}

fn lex_at(source: &str, version: Version, base: usize) -> Result<Vec<SpannedToken<'_>>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens: Vec<SpannedToken> = Vec::new();
    let mut last_is_separator = true;
    let mut last_is_non_delimiting = false;
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let token = match result {
            Ok(token) => token,
            Err(()) => {
                return Err(LexError {
                    span: shift(span, base),
                })
            }
        };
        match token.symbol_type() {
            SymbolType::Whitespace => {
                last_is_separator = true;
                continue;
            }
            SymbolType::CommentStart => {
                skip_comment(&mut lexer, shift(span, base))?;
                last_is_separator = true;
                continue;
            }
            // a comment close with no matching open
            SymbolType::CommentEnd => {
                return Err(LexError {
                    span: shift(span, base),
                });
            }
            SymbolType::NonDelimiting => {
                // A.2.2: two non-delimiting terminals need a separator
                if last_is_non_delimiting && !last_is_separator {
                    return Err(LexError {
                        span: shift(span, base),
                    });
                }
                last_is_non_delimiting = true;
                last_is_separator = false;
            }
            SymbolType::Delimiting => {
                last_is_non_delimiting = false;
                last_is_separator = false;
            }
        }
        if matches!(token, Token::Backtick) {
            if version < Version::V3_0 {
                return Err(LexError {
                    span: shift(span, base),
                });
            }
            let spanned = scan_template(&mut lexer, version, base)?;
            tokens.push(spanned);
            continue;
        }
        tokens.push((token, shift(span, base)));
    }
    classify(tokens, version)
}

fn skip_comment<'a>(
    lexer: &mut logos::Lexer<'a, Token<'a>>,
    start_span: Span,
) -> Result<(), LexError> {
    let mut depth = 1;
    let mut end = start_span.end;
    while depth > 0 {
        match lexer.next() {
            Some(Ok(Token::CommentStart)) => {
                end = lexer.span().end;
                depth += 1;
            }
            Some(Ok(Token::CommentEnd)) => {
                end = lexer.span().end;
                depth -= 1;
            }
            // anything else inside a comment is skipped, including
            // character sequences that are not valid tokens
            Some(_) => {
                end = lexer.span().end;
            }
            None => {
                return Err(LexError {
                    span: start_span.start..end,
                });
            }
        }
    }
    Ok(())
}

/// Scan a backtick string template. The opening backtick has just been
/// lexed; the rest of the template is consumed by hand from the lexer's
/// remainder, embedded `{...}` expressions are lexed recursively.
fn scan_template<'a>(
    lexer: &mut logos::Lexer<'a, Token<'a>>,
    version: Version,
    base: usize,
) -> Result<SpannedToken<'a>, LexError> {
    let tick_span = lexer.span();
    let rem = lexer.remainder();
    let mut segments: Vec<TemplateSegment<'a>> = Vec::new();
    let mut text = String::new();
    let mut pos = 0usize;
    loop {
        let rest = &rem[pos..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => {
                // unterminated template
                return Err(LexError {
                    span: shift(tick_span.start..tick_span.end + pos, base),
                });
            }
        };
        match c {
            '`' => {
                pos += 1;
                break;
            }
            '\\' => match rest[1..].chars().next() {
                Some(escaped @ ('`' | '{' | '}' | '\\')) => {
                    text.push(escaped);
                    pos += 1 + escaped.len_utf8();
                }
                _ => {
                    let at = tick_span.end + pos;
                    return Err(LexError {
                        span: shift(at..at + 1, base),
                    });
                }
            },
            '{' => {
                if !text.is_empty() {
                    segments.push(TemplateSegment::Text(std::mem::take(&mut text)));
                }
                let expr_start = pos + 1;
                let expr_len = match matching_brace(&rem[expr_start..]) {
                    Some(len) => len,
                    None => {
                        let at = tick_span.end + pos;
                        return Err(LexError {
                            span: shift(at..at + 1, base),
                        });
                    }
                };
                let inner = &rem[expr_start..expr_start + expr_len];
                let inner_base = base + tick_span.end + expr_start;
                let inner_tokens = lex_at(inner, version, inner_base)?;
                segments.push(TemplateSegment::Expr(inner_tokens));
                pos = expr_start + expr_len + 1;
            }
            '}' => {
                let at = tick_span.end + pos;
                return Err(LexError {
                    span: shift(at..at + 1, base),
                });
            }
            _ => {
                text.push(c);
                pos += c.len_utf8();
            }
        }
    }
    if !text.is_empty() {
        segments.push(TemplateSegment::Text(text));
    }
    lexer.bump(pos);
    Ok((
        Token::StringTemplate(segments),
        shift(tick_span.start..tick_span.end + pos, base),
    ))
}

/// Byte length up to (not including) the `}` matching an already-consumed
/// `{`, honoring string literals and nested braces. `None` when unbalanced.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => quote = Some(c),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
    }
    None
}
