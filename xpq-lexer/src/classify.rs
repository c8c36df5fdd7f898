use crate::driver::LexError;
use crate::token::{SpannedToken, Token};
use crate::version::Version;

/// Assign each potential keyword its final role: keyword where the version
/// reserves the word and the surrounding tokens permit that role, otherwise
/// a plain name. The decision is made once here and never revisited.
pub(crate) fn classify<'a>(
    tokens: Vec<SpannedToken<'a>>,
    version: Version,
) -> Result<Vec<SpannedToken<'a>>, LexError> {
    let mut out: Vec<SpannedToken<'a>> = Vec::with_capacity(tokens.len());
    for i in 0..tokens.len() {
        let (token, span) = tokens[i].clone();
        if matches!(token, Token::DoubleLiteral(_)) && version == Version::V1_0 {
            // scientific notation is a 2.0 addition
            return Err(LexError { span });
        }
        let token = match token.keyword_version() {
            Some(keyword_version) => {
                let next = tokens.get(i + 1).map(|(t, _)| t);
                if version >= keyword_version && keyword_in_context(&token, next) {
                    token
                } else {
                    demote(token)
                }
            }
            None => token,
        };
        out.push((token, span));
    }
    Ok(out)
}

fn demote(token: Token) -> Token {
    match token.ncname() {
        Some(name) => Token::NCName(name),
        None => token,
    }
}

/// Whether the following token permits the keyword role of this word.
///
/// Introducer words need their introducing punctuation; axis names need
/// `::`; kind-test names need `(`. Operator-position words always keep
/// their keyword reading, the parser accepts them as names where a name is
/// expected.
fn keyword_in_context(token: &Token, next: Option<&Token>) -> bool {
    use Token::*;
    match token {
        Let | For | Some | Every => matches!(next, Option::Some(Dollar)),
        If | Switch | Function => matches!(next, Option::Some(LeftParen)),
        Map | Array => matches!(next, Option::Some(LeftBrace)),
        Ancestor | AncestorOrSelf | Child | Descendant | DescendantOrSelf | Following
        | FollowingSibling | Namespace | Parent | Preceding | PrecedingSibling | Self_ => {
            matches!(next, Option::Some(DoubleColon))
        }
        Attribute => matches!(next, Option::Some(DoubleColon) | Option::Some(LeftParen)),
        Node | Text | Comment | ProcessingInstruction | DocumentNode | Element
        | NamespaceNode | Item | EmptySequence => matches!(next, Option::Some(LeftParen)),
        _ => true,
    }
}
