use thiserror::Error;

use xpq_lexer::Version;

use crate::span::Span;

/// Errors raised while turning source text into an AST.
///
/// These are static errors; the interpreter boundary maps them onto the
/// stable `XPST*` codes (`Syntax`/`Unsupported*`/`Reserved` become
/// `XPST0003`, `UnknownPrefix` `XPST0081`, `UnknownAxis` `XPST0010`,
/// `UnknownType` `XPST0051`).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParserError {
    #[error("syntax error at {span}")]
    Syntax { span: Span },

    #[error("lexical error at {span}")]
    Lex { span: Span },

    #[error("{construct} requires XPath {required}, parsing as {version} ({span})")]
    UnsupportedConstruct {
        span: Span,
        construct: &'static str,
        required: Version,
        version: Version,
    },

    #[error("the namespace axis is not enabled ({span})")]
    NamespaceAxisDisabled { span: Span },

    #[error("unknown namespace prefix {prefix} at {span}")]
    UnknownPrefix { span: Span, prefix: String },

    #[error("{name} is a reserved function name ({span})")]
    Reserved { span: Span, name: String },

    #[error("unknown atomic type {name} at {span}")]
    UnknownType { span: Span, name: String },

    #[error("function arity out of range at {span}")]
    ArityOverflow { span: Span },

    #[error("invalid extension functions: {message}")]
    InvalidExtensions { message: String },

    #[error("invalid parser options: {message}")]
    InvalidOptions { message: String },
}

impl ParserError {
    /// The source span the error points at, where one exists.
    pub fn span(&self) -> Option<Span> {
        match self {
            ParserError::Syntax { span }
            | ParserError::Lex { span }
            | ParserError::UnsupportedConstruct { span, .. }
            | ParserError::NamespaceAxisDisabled { span }
            | ParserError::UnknownPrefix { span, .. }
            | ParserError::Reserved { span, .. }
            | ParserError::UnknownType { span, .. }
            | ParserError::ArityOverflow { span } => Some(*span),
            ParserError::InvalidExtensions { .. } | ParserError::InvalidOptions { .. } => None,
        }
    }
}

impl From<xpq_lexer::LexError> for ParserError {
    fn from(error: xpq_lexer::LexError) -> Self {
        ParserError::Lex {
            span: error.span.into(),
        }
    }
}
