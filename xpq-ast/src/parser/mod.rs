mod expr;
mod path;
mod primary;
mod sequence_type;

use ahash::{HashMap, HashMapExt};

use xpq_diagnostics::{NoopWarnings, WarningSink};
use xpq_lexer::{lex, SpannedToken, Token, Version};
use xpq_name::{NamespaceLookup, Namespaces, XS_NAMESPACE};

use crate::ast::{Name, NameS, WithSpan, XPath};
use crate::error::ParserError;
use crate::span::Span;

/// Grammar features a parser instance accepts. The version constructors
/// are presets over these flags; tests can flip individual flags.
#[derive(Debug, Clone, Copy)]
pub struct Features {
    pub allow_let: bool,
    pub allow_for: bool,
    pub allow_quantified: bool,
    pub allow_if: bool,
    pub allow_range: bool,
    pub allow_type_expressions: bool,
    pub allow_extended_kind_tests: bool,
    pub allow_simple_map: bool,
    pub allow_string_concat: bool,
    pub allow_arrow: bool,
    pub allow_switch: bool,
    pub allow_inline_function: bool,
    pub allow_named_function_ref: bool,
    pub allow_string_template: bool,
    pub allow_map_constructor: bool,
    pub allow_array_constructor: bool,
    pub allow_lookup: bool,
}

impl Features {
    pub fn for_version(version: Version) -> Features {
        let v2 = version >= Version::V2_0;
        let v3 = version >= Version::V3_0;
        let v31 = version >= Version::V3_1;
        Features {
            allow_let: v2,
            allow_for: v2,
            allow_quantified: v2,
            allow_if: v2,
            allow_range: v2,
            allow_type_expressions: v2,
            allow_extended_kind_tests: v2,
            allow_simple_map: v3,
            allow_string_concat: v3,
            allow_arrow: v3,
            allow_switch: v3,
            allow_inline_function: v3,
            allow_named_function_ref: v3,
            allow_string_template: v3,
            allow_map_constructor: v31,
            allow_array_constructor: v31,
            allow_lookup: v31,
        }
    }
}

/// A host extension function signature registered with the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSignature {
    pub name: String,
    pub min_args: usize,
    pub max_args: usize,
}

/// Options for building a parser.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub version: Version,
    /// XPath 1.0 compatibility mode; valid for 2.0 and later only.
    pub compatibility_mode: bool,
    /// Accept the deprecated `namespace::` axis.
    pub enable_namespace_axis: bool,
    pub extensions: Vec<ExtensionSignature>,
}

impl ParserOptions {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            compatibility_mode: false,
            enable_namespace_axis: false,
            extensions: Vec::new(),
        }
    }
}

// Unprefixed function names that collide with expression syntax; XPath
// reserves them so `if(...)` and friends stay unambiguous.
const RESERVED_FUNCTION_NAMES: &[&str] = &[
    "array",
    "attribute",
    "comment",
    "document-node",
    "element",
    "empty-sequence",
    "function",
    "if",
    "item",
    "map",
    "namespace-node",
    "node",
    "processing-instruction",
    "schema-attribute",
    "schema-element",
    "switch",
    "text",
    "typeswitch",
];

/// Whether an unprefixed function name is reserved by the grammar.
pub fn is_reserved_function_name(name: &str) -> bool {
    RESERVED_FUNCTION_NAMES.contains(&name)
}

pub(crate) enum DefaultNs {
    Element,
    Function,
    Type,
    None,
}

pub struct Parser<'a, 'c> {
    pub(crate) tokens: Vec<SpannedToken<'a>>,
    pub(crate) pos: usize,
    source_len: usize,
    pub(crate) version: Version,
    pub(crate) features: Features,
    pub(crate) compatibility_mode: bool,
    pub(crate) enable_namespace_axis: bool,
    pub(crate) namespaces: &'c Namespaces,
    pub(crate) warnings: &'c dyn WarningSink,
    pub(crate) extensions: HashMap<String, ExtensionSignature>,
}

/// Parse an expression with default options and no warning collection.
pub fn parse_xpath(
    source: &str,
    version: Version,
    namespaces: &Namespaces,
) -> Result<XPath, ParserError> {
    parse_xpath_with_options(
        source,
        namespaces,
        &ParserOptions::new(version),
        &NoopWarnings,
    )
}

pub fn parse_xpath_with_options(
    source: &str,
    namespaces: &Namespaces,
    options: &ParserOptions,
    warnings: &dyn WarningSink,
) -> Result<XPath, ParserError> {
    let mut parser = Parser::new(source, namespaces, options, warnings)?;
    parser.parse()
}

impl<'a, 'c> Parser<'a, 'c> {
    /// Build a parser over the given source. Fails if the options are
    /// inconsistent or the source does not lex.
    pub fn new(
        source: &'a str,
        namespaces: &'c Namespaces,
        options: &ParserOptions,
        warnings: &'c dyn WarningSink,
    ) -> Result<Self, ParserError> {
        if options.compatibility_mode && options.version == Version::V1_0 {
            return Err(ParserError::InvalidOptions {
                message: "compatibility mode applies to XPath 2.0 and later".to_string(),
            });
        }
        let mut extensions = HashMap::new();
        for signature in &options.extensions {
            if signature.min_args > signature.max_args {
                return Err(ParserError::InvalidExtensions {
                    message: format!(
                        "{}: minArgs {} exceeds maxArgs {}",
                        signature.name, signature.min_args, signature.max_args
                    ),
                });
            }
            if extensions
                .insert(signature.name.clone(), signature.clone())
                .is_some()
            {
                return Err(ParserError::InvalidExtensions {
                    message: format!("duplicate extension function {}", signature.name),
                });
            }
        }
        let tokens = lex(source, options.version)?;
        Ok(Self {
            tokens,
            pos: 0,
            source_len: source.len(),
            version: options.version,
            features: Features::for_version(options.version),
            compatibility_mode: options.compatibility_mode,
            enable_namespace_axis: options.enable_namespace_axis,
            namespaces,
            warnings,
            extensions,
        })
    }

    /// Override the feature set, for gating tests.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    pub fn parse(&mut self) -> Result<XPath, ParserError> {
        if self.compatibility_mode {
            self.warnings.emit("XPWC0001", None);
        }
        let expr = self.parse_expr()?;
        if self.pos < self.tokens.len() {
            return Err(self.error_here());
        }
        Ok(XPath(expr))
    }

    // --- token cursor -----------------------------------------------------

    pub(crate) fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos).map(|(token, _)| token)
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<&Token<'a>> {
        self.tokens.get(self.pos + n).map(|(token, _)| token)
    }

    pub(crate) fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => span.clone().into(),
            None => Span::new(self.source_len, self.source_len),
        }
    }

    pub(crate) fn span_at(&self, n: usize) -> Option<Span> {
        self.tokens.get(self.pos + n).map(|(_, s)| s.clone().into())
    }

    pub(crate) fn advance(&mut self) -> Option<(Token<'a>, Span)> {
        let spanned = self.tokens.get(self.pos).cloned();
        if spanned.is_some() {
            self.pos += 1;
        }
        spanned.map(|(token, span)| (token, span.into()))
    }

    /// Consume the next token if it equals `token`.
    pub(crate) fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, token: &Token) -> Result<Span, ParserError> {
        if self.peek() == Some(token) {
            let span = self.peek_span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error_here())
        }
    }

    pub(crate) fn error_here(&self) -> ParserError {
        ParserError::Syntax {
            span: self.peek_span(),
        }
    }

    pub(crate) fn unsupported(
        &self,
        construct: &'static str,
        required: Version,
    ) -> ParserError {
        ParserError::UnsupportedConstruct {
            span: self.peek_span(),
            construct,
            required,
            version: self.version,
        }
    }

    // --- names ------------------------------------------------------------

    /// The next token's name lexeme, if it can serve as an NCName.
    pub(crate) fn peek_ncname(&self) -> Option<&'a str> {
        self.peek().and_then(|token| token.ncname())
    }

    pub(crate) fn parse_ncname(&mut self) -> Result<(&'a str, Span), ParserError> {
        match self.peek().and_then(|token| token.ncname()) {
            Some(name) => {
                let span = self.peek_span();
                self.pos += 1;
                Ok((name, span))
            }
            None => Err(self.error_here()),
        }
    }

    /// Whether the tokens at `pos + n` and `pos + n + 1` touch, with no
    /// whitespace between them. Prefixed names require this.
    pub(crate) fn adjacent(&self, n: usize) -> bool {
        match (self.span_at(n), self.span_at(n + 1)) {
            (Some(a), Some(b)) => a.end == b.start,
            _ => false,
        }
    }

    /// `prefix:local` or a single NCName, with the relevant default
    /// namespace applied to unprefixed names.
    pub(crate) fn parse_eqname(&mut self, default_ns: DefaultNs) -> Result<NameS, ParserError> {
        let prefixed = self.peek_ncname().is_some()
            && matches!(self.peek_at(1), Some(Token::Colon))
            && self.peek_at(2).and_then(|t| t.ncname()).is_some()
            && self.adjacent(0)
            && self.adjacent(1);
        if prefixed {
            let (prefix, prefix_span) = self.parse_ncname()?;
            self.expect(&Token::Colon)?;
            let (local, local_span) = self.parse_ncname()?;
            let namespace = match self.namespaces.by_prefix(prefix) {
                Some(uri) => uri.to_string(),
                None => {
                    return Err(ParserError::UnknownPrefix {
                        span: prefix_span,
                        prefix: prefix.to_string(),
                    })
                }
            };
            let name = Name::new(
                local.to_string(),
                Some(namespace),
                Some(prefix.to_string()),
            );
            Ok(name.with_span(prefix_span.merge(local_span)))
        } else {
            let (local, span) = self.parse_ncname()?;
            let name = Name::unprefixed(local);
            let name = match default_ns {
                DefaultNs::Element => {
                    name.with_default_namespace(self.namespaces.default_element_namespace())
                }
                DefaultNs::Function => {
                    name.with_default_namespace(Some(self.namespaces.default_function_namespace()))
                }
                DefaultNs::Type => name.with_default_namespace(Some(XS_NAMESPACE)),
                DefaultNs::None => name,
            };
            Ok(name.with_span(span))
        }
    }

    /// A parser over an embedded token vector (string template segments),
    /// sharing this parser's configuration.
    pub(crate) fn subparser(&self, tokens: Vec<SpannedToken<'a>>) -> Parser<'a, 'c> {
        Parser {
            tokens,
            pos: 0,
            source_len: self.source_len,
            version: self.version,
            features: self.features,
            compatibility_mode: self.compatibility_mode,
            enable_namespace_axis: self.enable_namespace_axis,
            namespaces: self.namespaces,
            warnings: self.warnings,
            extensions: self.extensions.clone(),
        }
    }
}
