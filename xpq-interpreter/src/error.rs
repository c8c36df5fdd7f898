use strum::EnumMessage as _;
use strum_macros::{Display, EnumMessage};

use xpq_ast::{ParserError, Span};

pub type Result<T> = std::result::Result<T, Error>;

/// Stable XPath error codes.
///
/// `Display` renders the code string; the doc comment is the
/// human-readable message, available through [`Error::message`].
#[derive(Debug, Clone, PartialEq, Eq, Display, EnumMessage)]
pub enum Error {
    /// Missing context item or dynamic context component.
    XPDY0002,
    /// Syntax error.
    XPST0003,
    /// Type mismatch.
    XPTY0004,
    /// Treat type does not match the sequence type.
    XPDY0050,
    /// Unknown atomic type in a cast or sequence type.
    XPST0051,
    /// Unsupported axis.
    XPST0010,
    /// Unknown function name or wrong number of arguments.
    XPST0017,
    /// Unknown namespace prefix.
    XPST0081,
    /// Invalid value for a cast or constructor.
    FORG0001,
    /// zero-or-one called with a sequence containing more than one item.
    FORG0003,
    /// one-or-more called with an empty sequence.
    FORG0004,
    /// exactly-one called with a sequence that does not contain exactly one item.
    FORG0005,
    /// Invalid argument type; no effective boolean value.
    FORG0006,
    /// Array index out of bounds.
    FOAY0001,
    /// Invalid URI passed to fn:doc.
    FODC0005,
    /// Streaming violation in strict mode.
    XPSE0001,
}

impl Error {
    /// The stable code string, e.g. `XPTY0004`.
    pub fn code(&self) -> String {
        self.to_string()
    }

    /// The human-readable message for this code.
    pub fn message(&self) -> &'static str {
        self.get_documentation().unwrap_or("XPath error")
    }

    pub fn with_span(self, span: Span) -> SpannedError {
        SpannedError {
            error: self,
            span: Some(span),
            context: None,
        }
    }
}

impl std::error::Error for Error {}

/// An error code with optional source span and context, as surfaced at the
/// API boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedError {
    pub error: Error,
    pub span: Option<Span>,
    /// Extra detail: the function name, offending value or construct.
    pub context: Option<String>,
}

impl SpannedError {
    pub fn new(error: Error) -> Self {
        Self {
            error,
            span: None,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl std::fmt::Display for SpannedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.error.message())?;
        if let Some(span) = &self.span {
            write!(f, " at {}", span)?;
        }
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for SpannedError {}

impl From<Error> for SpannedError {
    fn from(error: Error) -> Self {
        SpannedError::new(error)
    }
}

impl From<ParserError> for SpannedError {
    fn from(error: ParserError) -> Self {
        let code = match &error {
            ParserError::Syntax { .. }
            | ParserError::Lex { .. }
            | ParserError::UnsupportedConstruct { .. }
            | ParserError::Reserved { .. }
            | ParserError::ArityOverflow { .. }
            | ParserError::InvalidExtensions { .. }
            | ParserError::InvalidOptions { .. } => Error::XPST0003,
            ParserError::NamespaceAxisDisabled { .. } => Error::XPST0010,
            ParserError::UnknownPrefix { .. } => Error::XPST0081,
            ParserError::UnknownType { .. } => Error::XPST0051,
        };
        SpannedError {
            context: Some(error.to_string()),
            span: error.span(),
            error: code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_are_stable() {
        assert_eq!(Error::XPTY0004.code(), "XPTY0004");
        assert_eq!(Error::FORG0001.code(), "FORG0001");
        assert_eq!(Error::FOAY0001.code(), "FOAY0001");
    }

    #[test]
    fn test_messages_from_docs() {
        assert_eq!(Error::FOAY0001.message(), "Array index out of bounds.");
    }

    #[test]
    fn test_parser_error_mapping() {
        let err: SpannedError = ParserError::Syntax {
            span: Span::new(3, 4),
        }
        .into();
        assert_eq!(err.error, Error::XPST0003);
        assert_eq!(err.span, Some(Span::new(3, 4)));
    }
}
