//! Evaluation engine for the xpq XPath workspace: atomic values and
//! casting, sequences, maps and arrays, the host node abstraction, static
//! and dynamic contexts, the built-in function library, the evaluator and
//! the XSLT 3.0 streamability analyzer.

pub mod annotations;
pub mod atomic;
pub mod context;
pub mod error;
pub mod eval;
pub mod function;
pub mod library;
pub mod sequence;
pub mod stream;
pub mod xml;

pub use error::{Error, Result, SpannedError};
pub use eval::{call_function, evaluate, matches_sequence_type};
pub use library::standard_registry;
