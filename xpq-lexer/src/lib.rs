//! Lexer for the XPath 1.0 through 3.1 language family.
//!
//! The token enum is generated by [`logos`]; a driving pass on top of it
//! enforces terminal delimination, skips `(: ... :)` comments, scans
//! backtick string templates, and classifies identifiers as keywords only
//! where the XPath version and the surrounding tokens permit that role.

mod classify;
mod driver;
mod reserved;
mod token;
mod version;

pub use driver::{lex, LexError};
pub use token::{Span, SpannedToken, TemplateSegment, Token};
pub use version::Version;
