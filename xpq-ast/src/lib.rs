//! XPath AST and parser.
//!
//! Four language versions share one recursive-descent grammar; a
//! [`parser::Features`] record gates the constructs each version accepts.
//! The AST is immutable once built and renders back to canonical source
//! through `Display`.

pub mod ast;
mod display;
mod error;
pub mod parser;
mod span;
pub mod types;

pub use ast::XPath;
pub use error::ParserError;
pub use parser::{
    is_reserved_function_name, parse_xpath, parse_xpath_with_options, ExtensionSignature,
    Features, Parser, ParserOptions,
};
pub use span::{Span, Spanned, WithSpan};
pub use xpq_lexer::Version;
