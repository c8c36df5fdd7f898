use ibig::IBig;
use ordered_float::OrderedFloat;
use rust_decimal::Decimal;

use xpq_schema_type::Xs;

pub use crate::span::{Span, Spanned, WithSpan};
pub use crate::types::{
    ArrayTest, FunctionTest, ItemType, KindTest, MapTest, NameOrWildcard, Occurrence, SequenceType,
};
pub use xpq_name::Name;

pub type ExprS = Spanned<Expr>;
pub type NameS = Spanned<Name>;
pub type StepS = Spanned<Step>;

impl WithSpan for Expr {}
impl WithSpan for Name {}
impl WithSpan for Step {}

/// A parsed XPath expression with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct XPath(pub ExprS);

/// The expression sum type. Every variant is evaluated by
/// `xpq-interpreter`'s single dispatch and printed by the `Display`
/// implementation in this crate; both stay in step with the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    VarRef(Name),
    ContextItem,
    /// The comma operator; never contains exactly one element.
    Sequence(Vec<ExprS>),
    Unary(UnaryOp, Box<ExprS>),
    Binary(BinaryExpr),
    SimpleMap(Box<ExprS>, Box<ExprS>),
    Arrow(Box<ArrowExpr>),
    If(Box<IfExpr>),
    Let(Box<LetExpr>),
    For(Box<ForExpr>),
    Quantified(Box<QuantifiedExpr>),
    Switch(Box<SwitchExpr>),
    FunctionCall(FunctionCall),
    NamedFunctionRef(NamedFunctionRef),
    InlineFunction(Box<InlineFunction>),
    Path(PathExpr),
    Filter(Box<FilterExpr>),
    DynamicCall(Box<DynamicCallExpr>),
    MapConstructor(MapConstructor),
    ArrayConstructor(ArrayConstructor),
    Lookup(Box<LookupExpr>),
    UnaryLookup(KeySpecifier),
    StringTemplate(Vec<TemplateSegment>),
    Cast(Box<CastExpr>),
    Castable(Box<CastExpr>),
    Treat(Box<TreatExpr>),
    InstanceOf(Box<TreatExpr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Integer(IBig),
    Decimal(Decimal),
    Double(OrderedFloat<f64>),
    String(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<ExprS>,
    pub right: Box<ExprS>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // logical
    Or,
    And,
    // general comparisons
    GenEq,
    GenNe,
    GenLt,
    GenLe,
    GenGt,
    GenGe,
    // value comparisons
    ValueEq,
    ValueNe,
    ValueLt,
    ValueLe,
    ValueGt,
    ValueGe,
    // node comparisons
    Is,
    Precedes,
    Follows,
    // string concatenation
    Concat,
    // range
    Range,
    // arithmetic
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    // set operations over node sequences
    Union,
    Intersect,
    Except,
}

impl BinaryOp {
    pub fn is_comparison(&self) -> bool {
        use BinaryOp::*;
        matches!(
            self,
            GenEq
                | GenNe
                | GenLt
                | GenLe
                | GenGt
                | GenGe
                | ValueEq
                | ValueNe
                | ValueLt
                | ValueLe
                | ValueGt
                | ValueGe
                | Is
                | Precedes
                | Follows
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        use BinaryOp::*;
        matches!(self, Add | Sub | Mul | Div | IntDiv | Mod)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowExpr {
    pub target: ExprS,
    pub call: FunctionCall,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub condition: ExprS,
    pub then: ExprS,
    pub else_: ExprS,
}

/// A variable binding clause of `let`, `for`, `some` and `every`.
/// Only `let` may carry a declared sequence type.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: NameS,
    pub declared_type: Option<SequenceType>,
    pub expr: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetExpr {
    pub bindings: Vec<Binding>,
    pub return_expr: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForExpr {
    pub bindings: Vec<Binding>,
    pub return_expr: ExprS,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantifiedExpr {
    pub quantifier: Quantifier,
    pub bindings: Vec<Binding>,
    pub satisfies: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchExpr {
    pub operand: ExprS,
    pub cases: Vec<SwitchCase>,
    pub default: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub operands: Vec<ExprS>,
    pub return_expr: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: NameS,
    pub args: Vec<ExprS>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedFunctionRef {
    pub name: NameS,
    pub arity: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlineFunction {
    pub params: Vec<Param>,
    pub return_type: Option<SequenceType>,
    pub body: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Name,
    pub declared_type: Option<SequenceType>,
}

/// A path expression. `absolute` paths start at the document root;
/// `//x` desugars to a leading `descendant-or-self::node()` step.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub absolute: bool,
    pub steps: Vec<StepS>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Axis(AxisStep),
    /// A primary expression used as a path step, e.g. `$x` in `$x/foo`.
    Expr(Box<ExprS>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisStep {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<ExprS>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    Self_,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        use Axis::*;
        match self {
            Ancestor => "ancestor",
            AncestorOrSelf => "ancestor-or-self",
            Attribute => "attribute",
            Child => "child",
            Descendant => "descendant",
            DescendantOrSelf => "descendant-or-self",
            Following => "following",
            FollowingSibling => "following-sibling",
            Namespace => "namespace",
            Parent => "parent",
            Preceding => "preceding",
            PrecedingSibling => "preceding-sibling",
            Self_ => "self",
        }
    }

    /// Axes that walk against or across document order deliver their
    /// results reversed relative to it.
    pub fn is_reverse(&self) -> bool {
        use Axis::*;
        matches!(
            self,
            Ancestor | AncestorOrSelf | Parent | Preceding | PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    Name(NameTest),
    Kind(KindTest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NameTest {
    Name(NameS),
    Star,
    /// `*:local`
    LocalName(String),
    /// `prefix:*`, prefix kept for display, resolved to its URI for matching
    Namespace { prefix: String, uri: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpr {
    pub primary: ExprS,
    pub predicates: Vec<ExprS>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicCallExpr {
    pub base: ExprS,
    pub args: Vec<ExprS>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConstructor {
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: ExprS,
    pub value: ExprS,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayConstructor {
    /// `[e1, ..., en]`: one member per operand, commas do not flatten.
    Square(Vec<ExprS>),
    /// `array { seq }`: one member per item of the sequence.
    Curly(Option<Box<ExprS>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupExpr {
    pub base: ExprS,
    pub key: KeySpecifier,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KeySpecifier {
    NcName(String),
    Integer(IBig),
    Star,
    Expr(Box<ExprS>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSegment {
    Text(String),
    Expr(ExprS),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleType {
    pub name: NameS,
    pub xs: Xs,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub expr: ExprS,
    pub target: SingleType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatExpr {
    pub expr: ExprS,
    pub target: SequenceType,
}
