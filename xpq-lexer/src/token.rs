use std::borrow::Cow;

use ibig::IBig;
use logos::{Lexer, Logos};
use rust_decimal::Decimal;

/// Byte range of a token in the source expression.
pub type Span = std::ops::Range<usize>;

pub type SpannedToken<'a> = (Token<'a>, Span);

/// One segment of a backtick string template.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateSegment<'a> {
    /// A literal chunk, escapes already decoded.
    Text(String),
    /// An embedded expression, lexed with spans relative to the whole source.
    Expr(Vec<SpannedToken<'a>>),
}

#[derive(Logos, Clone, Debug, PartialEq)]
#[logos(subpattern name_start_char_without_colon = r"[A-Za-z_\u{c0}-\u{d6}\u{d8}-\u{f6}\u{f8}-\u{2ff}\u{370}-\u{37d}\u{37f}-\u{1fff}\u{200c}-\u{200d}\u{2070}-\u{218f}\u{2c00}-\u{2fef}\u{3001}-\u{d7ff}\u{f900}-\u{fdfc}\u{fdf0}-\u{fffd}\u{10000}-\u{effff}]")]
#[logos(subpattern name_char_without_colon = r"(?&name_start_char_without_colon)|[\-\.0-9\u{b7}\u{300}-\u{36F}\u{203f}-\u{2040}]")]
#[logos(subpattern ncname = r"(?&name_start_char_without_colon)(?&name_char_without_colon)*")]
pub enum Token<'a> {
    #[regex(r"[0-9]+", integer_literal, priority = 3)]
    IntegerLiteral(IBig),
    #[regex(r"(\.[0-9]+)|([0-9]+\.[0-9]*)", decimal_literal, priority = 2)]
    DecimalLiteral(Decimal),
    #[regex(
        r"(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][+-]?[0-9]+)",
        double_literal,
        priority = 2
    )]
    DoubleLiteral(f64),
    #[regex(r#""(?:""|[^"])*"|'(?:''|[^'])*'"#, string_literal, priority = 1)]
    StringLiteral(Cow<'a, str>),
    // A QName is a single token in the XPath grammar, but prefixes
    // and local names also occur on their own, so we lex NCNames and let the
    // parser assemble prefixed names from adjacent NCName ':' NCName.
    #[regex(r"(?&ncname)", priority = 2)]
    NCName(&'a str),

    // Produced by the driving lexer, never by logos directly.
    StringTemplate(Vec<TemplateSegment<'a>>),

    #[token("!")]
    ExclamationMark,
    #[token("!=")]
    NotEqual,
    #[token("#")]
    Hash,
    #[token("$")]
    Dollar,
    #[token("(")]
    LeftParen,
    #[token(")")]
    RightParen,
    #[token("*")]
    Asterisk,
    #[token("*:")]
    AsteriskColon,
    #[token("+")]
    Plus,
    #[token(",")]
    Comma,
    #[token("-")]
    Minus,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token(":")]
    Colon,
    #[token(":*")]
    ColonAsterisk,
    #[token("::")]
    DoubleColon,
    #[token(":=")]
    ColonEqual,
    #[token("<")]
    LessThan,
    #[token("<<")]
    Precedes,
    #[token("<=")]
    LessThanEqual,
    #[token("=")]
    Equal,
    #[token("=>")]
    Arrow,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEqual,
    #[token(">>")]
    Follows,
    #[token("?")]
    QuestionMark,
    #[token("@")]
    At,
    #[token("[")]
    LeftBracket,
    #[token("]")]
    RightBracket,
    #[token("{")]
    LeftBrace,
    #[token("|")]
    Pipe,
    #[token("||")]
    DoublePipe,
    #[token("}")]
    RightBrace,
    #[token("`")]
    Backtick,

    #[token("ancestor")]
    Ancestor,
    #[token("ancestor-or-self")]
    AncestorOrSelf,
    #[token("and")]
    And,
    #[token("array")]
    Array,
    #[token("as")]
    As,
    #[token("attribute")]
    Attribute,
    #[token("case")]
    Case,
    #[token("cast")]
    Cast,
    #[token("castable")]
    Castable,
    #[token("child")]
    Child,
    #[token("comment")]
    Comment,
    #[token("default")]
    Default,
    #[token("descendant")]
    Descendant,
    #[token("descendant-or-self")]
    DescendantOrSelf,
    #[token("div")]
    Div,
    #[token("document-node")]
    DocumentNode,
    #[token("element")]
    Element,
    #[token("else")]
    Else,
    #[token("empty-sequence")]
    EmptySequence,
    #[token("eq")]
    Eq,
    #[token("every")]
    Every,
    #[token("except")]
    Except,
    #[token("following")]
    Following,
    #[token("following-sibling")]
    FollowingSibling,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("ge")]
    Ge,
    #[token("gt")]
    Gt,
    #[token("idiv")]
    Idiv,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("instance")]
    Instance,
    #[token("intersect")]
    Intersect,
    #[token("is")]
    Is,
    #[token("item")]
    Item,
    #[token("le")]
    Le,
    #[token("let")]
    Let,
    #[token("lt")]
    Lt,
    #[token("map")]
    Map,
    #[token("mod")]
    Mod,
    #[token("namespace")]
    Namespace,
    #[token("namespace-node")]
    NamespaceNode,
    #[token("ne")]
    Ne,
    #[token("node")]
    Node,
    #[token("of")]
    Of,
    #[token("or")]
    Or,
    #[token("parent")]
    Parent,
    #[token("preceding")]
    Preceding,
    #[token("preceding-sibling")]
    PrecedingSibling,
    #[token("processing-instruction")]
    ProcessingInstruction,
    #[token("return")]
    Return,
    #[token("satisfies")]
    Satisfies,
    #[token("self")]
    Self_,
    #[token("some")]
    Some,
    #[token("switch")]
    Switch,
    #[token("text")]
    Text,
    #[token("then")]
    Then,
    #[token("to")]
    To,
    #[token("treat")]
    Treat,
    #[token("union")]
    Union,

    // whitespace
    #[regex(r"[\u{20}\u{9}\u{d}\u{a}]+", priority = 4)]
    Whitespace,
    // comments
    #[token("(:")]
    CommentStart,
    #[token(":)")]
    CommentEnd,
}

pub(crate) enum SymbolType {
    Delimiting,
    NonDelimiting,
    Whitespace,
    CommentStart,
    CommentEnd,
}

impl<'a> Token<'a> {
    // A.2.2 terminal delimination
    pub(crate) fn symbol_type(&self) -> SymbolType {
        use Token::*;
        match self {
            ExclamationMark | NotEqual | StringLiteral(_) | StringTemplate(_) | Hash | Dollar
            | LeftParen | RightParen | Asterisk | AsteriskColon | Plus | Comma | Minus | Dot
            | DotDot | Slash | DoubleSlash | Colon | ColonAsterisk | DoubleColon | ColonEqual
            | LessThan | Precedes | LessThanEqual | Equal | Arrow | GreaterThan
            | GreaterThanEqual | Follows | QuestionMark | At | LeftBracket | RightBracket
            | LeftBrace | Pipe | DoublePipe | RightBrace | Backtick => SymbolType::Delimiting,

            Whitespace => SymbolType::Whitespace,
            CommentStart => SymbolType::CommentStart,
            CommentEnd => SymbolType::CommentEnd,

            _ => SymbolType::NonDelimiting,
        }
    }
}

fn integer_literal<'a>(lex: &mut Lexer<'a, Token<'a>>) -> IBig {
    IBig::from_str_radix(lex.slice(), 10).unwrap()
}

fn decimal_literal<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<Decimal, ()> {
    lex.slice().try_into().map_err(|_| ())
}

fn double_literal<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Result<f64, ()> {
    lex.slice().parse().map_err(|_| ())
}

fn string_literal<'a>(lex: &mut Lexer<'a, Token<'a>>) -> Cow<'a, str> {
    let slice = lex.slice();
    let s = &slice[1..slice.len() - 1];
    if slice.starts_with('"') {
        if s.contains("\"\"") {
            Cow::Owned(s.replace("\"\"", "\""))
        } else {
            Cow::Borrowed(s)
        }
    } else if s.contains("''") {
        Cow::Owned(s.replace("''", "'"))
    } else {
        Cow::Borrowed(s)
    }
}
