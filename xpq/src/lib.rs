//! An XPath query engine for the 1.0 through 3.1 language family.
//!
//! Parse an expression under a language version, evaluate it against a
//! dynamic context, get a sequence back:
//!
//! ```
//! use std::rc::Rc;
//! use xpq::{evaluate, DynamicContextBuilder, StaticContext, Version};
//! use xpq::{standard_registry, SimpleNode};
//!
//! let context = DynamicContextBuilder::<SimpleNode>::new(
//!     Rc::new(StaticContext::default()),
//!     Rc::new(standard_registry()),
//! )
//! .build();
//! let result = evaluate("(5 + 3) * 2 - 3", &context, Version::V3_1).unwrap();
//! assert_eq!(result.len(), 1);
//! ```
//!
//! The engine is stateless between calls; errors surface as
//! [`SpannedError`] carrying the stable XPath error code.

pub use xpq_ast::{
    parse_xpath_with_options, ExtensionSignature, ParserError, ParserOptions, Span, Version, XPath,
};
pub use xpq_diagnostics::{
    warning_metadata, Category, NoopWarnings, Severity, Warning, WarningCollector, WarningConfig,
    WarningSink,
};
pub use xpq_interpreter::annotations::TypeAnnotations;
pub use xpq_interpreter::atomic::Atomic;
pub use xpq_interpreter::context::{
    DynamicContext, DynamicContextBuilder, SchemaRegistry, StaticContext, StaticContextBuilder,
};
pub use xpq_interpreter::function::{Array, Function, FunctionRegistry, Map};
pub use xpq_interpreter::sequence::{Item, Sequence};
pub use xpq_interpreter::stream;
pub use xpq_interpreter::xml::simple::SimpleNode;
pub use xpq_interpreter::xml::{Node, NodeKind};
pub use xpq_interpreter::{call_function, standard_registry, Error, SpannedError};
pub use xpq_name::{Name, Namespaces};
pub use xpq_schema_type::Xs;

/// Parse an expression under the context's statically known namespaces.
pub fn parse<N: Node>(
    expression: &str,
    context: &DynamicContext<N>,
    version: Version,
) -> Result<XPath, SpannedError> {
    context
        .static_context()
        .parse(expression, version)
        .map_err(SpannedError::from)
}

/// Parse and evaluate in one step: the query entry point.
///
/// Returns the result sequence; an empty result is a value, never an
/// error.
pub fn evaluate<N: Node>(
    expression: &str,
    context: &DynamicContext<N>,
    version: Version,
) -> Result<Sequence<N>, SpannedError> {
    let xpath = parse(expression, context, version)?;
    evaluate_parsed(&xpath, context)
}

/// Evaluate an already-parsed expression, e.g. one built with custom
/// parser options.
pub fn evaluate_parsed<N: Node>(
    xpath: &XPath,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>, SpannedError> {
    xpq_interpreter::evaluate(&xpath.0, context).map_err(SpannedError::from)
}
