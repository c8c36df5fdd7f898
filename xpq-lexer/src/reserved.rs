use crate::token::Token;
use crate::version::Version;

impl<'a> Token<'a> {
    /// The lexeme of a keyword token, for use where a plain name is valid.
    pub fn ncname(&self) -> Option<&'a str> {
        match self {
            Token::Ancestor => Some("ancestor"),
            Token::AncestorOrSelf => Some("ancestor-or-self"),
            Token::And => Some("and"),
            Token::Array => Some("array"),
            Token::As => Some("as"),
            Token::Attribute => Some("attribute"),
            Token::Case => Some("case"),
            Token::Cast => Some("cast"),
            Token::Castable => Some("castable"),
            Token::Child => Some("child"),
            Token::Comment => Some("comment"),
            Token::Default => Some("default"),
            Token::Descendant => Some("descendant"),
            Token::DescendantOrSelf => Some("descendant-or-self"),
            Token::Div => Some("div"),
            Token::DocumentNode => Some("document-node"),
            Token::Element => Some("element"),
            Token::Else => Some("else"),
            Token::EmptySequence => Some("empty-sequence"),
            Token::Eq => Some("eq"),
            Token::Every => Some("every"),
            Token::Except => Some("except"),
            Token::Following => Some("following"),
            Token::FollowingSibling => Some("following-sibling"),
            Token::For => Some("for"),
            Token::Function => Some("function"),
            Token::Ge => Some("ge"),
            Token::Gt => Some("gt"),
            Token::Idiv => Some("idiv"),
            Token::If => Some("if"),
            Token::In => Some("in"),
            Token::Instance => Some("instance"),
            Token::Intersect => Some("intersect"),
            Token::Is => Some("is"),
            Token::Item => Some("item"),
            Token::Le => Some("le"),
            Token::Let => Some("let"),
            Token::Lt => Some("lt"),
            Token::Map => Some("map"),
            Token::Mod => Some("mod"),
            Token::Namespace => Some("namespace"),
            Token::NamespaceNode => Some("namespace-node"),
            Token::Ne => Some("ne"),
            Token::Node => Some("node"),
            Token::Of => Some("of"),
            Token::Or => Some("or"),
            Token::Parent => Some("parent"),
            Token::Preceding => Some("preceding"),
            Token::PrecedingSibling => Some("preceding-sibling"),
            Token::ProcessingInstruction => Some("processing-instruction"),
            Token::Return => Some("return"),
            Token::Satisfies => Some("satisfies"),
            Token::Self_ => Some("self"),
            Token::Some => Some("some"),
            Token::Switch => Some("switch"),
            Token::Text => Some("text"),
            Token::Then => Some("then"),
            Token::To => Some("to"),
            Token::Treat => Some("treat"),
            Token::Union => Some("union"),
            Token::NCName(name) => Some(name),
            _ => None,
        }
    }

    /// The XPath version at which this word gains its keyword meaning.
    /// Below that version it is an ordinary name.
    pub(crate) fn keyword_version(&self) -> Option<Version> {
        match self {
            // the XPath 1.0 core: operators, axes, 1.0 node tests
            Token::And
            | Token::Or
            | Token::Div
            | Token::Mod
            | Token::Ancestor
            | Token::AncestorOrSelf
            | Token::Attribute
            | Token::Child
            | Token::Descendant
            | Token::DescendantOrSelf
            | Token::Following
            | Token::FollowingSibling
            | Token::Namespace
            | Token::Parent
            | Token::Preceding
            | Token::PrecedingSibling
            | Token::Self_
            | Token::Node
            | Token::Text
            | Token::Comment
            | Token::ProcessingInstruction => Some(Version::V1_0),
            // 2.0 reserved words
            Token::Let
            | Token::For
            | Token::Some
            | Token::Every
            | Token::If
            | Token::Then
            | Token::Else
            | Token::Return
            | Token::Satisfies
            | Token::In
            | Token::Eq
            | Token::Ne
            | Token::Lt
            | Token::Le
            | Token::Gt
            | Token::Ge
            | Token::Is
            | Token::To
            | Token::Idiv
            | Token::Union
            | Token::Intersect
            | Token::Except
            | Token::Instance
            | Token::Of
            | Token::Cast
            | Token::Castable
            | Token::Treat
            | Token::As
            | Token::Item
            | Token::EmptySequence
            | Token::DocumentNode
            | Token::Element => Some(Version::V2_0),
            // 3.0 reserved words
            Token::Function
            | Token::Switch
            | Token::Case
            | Token::Default
            | Token::NamespaceNode => Some(Version::V3_0),
            // 3.1 reserved words
            Token::Map | Token::Array => Some(Version::V3_1),
            _ => None,
        }
    }
}
