//! Canonical source rendering of the AST.
//!
//! The output reparses to a tree that is structurally equal to the
//! original. Operands are parenthesized freely; parentheses are
//! transparent in the grammar, so this costs nothing structurally.

use std::fmt;

use crate::ast::*;
use crate::types::*;

impl fmt::Display for XPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.value.fmt(f)
    }
}

fn op_str(op: BinaryOp) -> &'static str {
    use BinaryOp::*;
    match op {
        Or => "or",
        And => "and",
        GenEq => "=",
        GenNe => "!=",
        GenLt => "<",
        GenLe => "<=",
        GenGt => ">",
        GenGe => ">=",
        ValueEq => "eq",
        ValueNe => "ne",
        ValueLt => "lt",
        ValueLe => "le",
        ValueGt => "gt",
        ValueGe => "ge",
        Is => "is",
        Precedes => "<<",
        Follows => ">>",
        Concat => "||",
        Range => "to",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "div",
        IntDiv => "idiv",
        Mod => "mod",
        Union => "|",
        Intersect => "intersect",
        Except => "except",
    }
}

/// Whether an expression can stand bare wherever an operand or path step
/// is expected, without changing how it reparses.
fn is_self_delimiting(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Literal(_)
            | Expr::VarRef(_)
            | Expr::ContextItem
            | Expr::Sequence(_)
            | Expr::FunctionCall(_)
            | Expr::NamedFunctionRef(_)
            | Expr::MapConstructor(_)
            | Expr::ArrayConstructor(_)
            | Expr::UnaryLookup(_)
            | Expr::StringTemplate(_)
    )
}

fn fmt_operand(f: &mut fmt::Formatter<'_>, expr: &ExprS) -> fmt::Result {
    if is_self_delimiting(&expr.value) {
        write!(f, "{}", expr.value)
    } else {
        write!(f, "({})", expr.value)
    }
}

fn fmt_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "\"{}\"", s.replace('"', "\"\""))
}

fn fmt_args(f: &mut fmt::Formatter<'_>, args: &[ExprS]) -> fmt::Result {
    write!(f, "(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", arg.value)?;
    }
    write!(f, ")")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(literal) => literal.fmt(f),
            Expr::VarRef(name) => write!(f, "${}", name),
            Expr::ContextItem => write!(f, "."),
            Expr::Sequence(exprs) => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", expr.value)?;
                }
                write!(f, ")")
            }
            Expr::Unary(op, operand) => {
                let sign = match op {
                    UnaryOp::Plus => "+",
                    UnaryOp::Minus => "-",
                };
                write!(f, "{}", sign)?;
                fmt_operand(f, operand)
            }
            Expr::Binary(binary) => {
                write!(f, "(")?;
                fmt_operand(f, &binary.left)?;
                write!(f, " {} ", op_str(binary.op))?;
                fmt_operand(f, &binary.right)?;
                write!(f, ")")
            }
            Expr::SimpleMap(left, right) => {
                write!(f, "(")?;
                fmt_operand(f, left)?;
                write!(f, " ! ")?;
                fmt_operand(f, right)?;
                write!(f, ")")
            }
            Expr::Arrow(arrow) => {
                write!(f, "(")?;
                fmt_operand(f, &arrow.target)?;
                write!(f, " => {}", arrow.call.name.value)?;
                fmt_args(f, &arrow.call.args)?;
                write!(f, ")")
            }
            Expr::If(if_expr) => {
                write!(f, "if ({}) then ", if_expr.condition.value)?;
                fmt_operand(f, &if_expr.then)?;
                write!(f, " else ")?;
                fmt_operand(f, &if_expr.else_)
            }
            Expr::Let(let_expr) => {
                write!(f, "let ")?;
                fmt_bindings(f, &let_expr.bindings)?;
                write!(f, " return ")?;
                fmt_operand(f, &let_expr.return_expr)
            }
            Expr::For(for_expr) => {
                write!(f, "for ")?;
                fmt_in_bindings(f, &for_expr.bindings)?;
                write!(f, " return ")?;
                fmt_operand(f, &for_expr.return_expr)
            }
            Expr::Quantified(quantified) => {
                let word = match quantified.quantifier {
                    Quantifier::Some => "some",
                    Quantifier::Every => "every",
                };
                write!(f, "{} ", word)?;
                fmt_in_bindings(f, &quantified.bindings)?;
                write!(f, " satisfies ")?;
                fmt_operand(f, &quantified.satisfies)
            }
            Expr::Switch(switch) => {
                write!(f, "switch ({})", switch.operand.value)?;
                for case in &switch.cases {
                    for operand in &case.operands {
                        write!(f, " case ")?;
                        fmt_operand(f, operand)?;
                    }
                    write!(f, " return ")?;
                    fmt_operand(f, &case.return_expr)?;
                }
                write!(f, " default return ")?;
                fmt_operand(f, &switch.default)
            }
            Expr::FunctionCall(call) => {
                write!(f, "{}", call.name.value)?;
                fmt_args(f, &call.args)
            }
            Expr::NamedFunctionRef(func_ref) => {
                write!(f, "{}#{}", func_ref.name.value, func_ref.arity)
            }
            Expr::InlineFunction(inline) => {
                write!(f, "function (")?;
                for (i, param) in inline.params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "${}", param.name)?;
                    if let Some(declared) = &param.declared_type {
                        write!(f, " as {}", declared)?;
                    }
                }
                write!(f, ")")?;
                if let Some(return_type) = &inline.return_type {
                    write!(f, " as {}", return_type)?;
                }
                write!(f, " {{ {} }}", inline.body.value)
            }
            Expr::Path(path) => path.fmt(f),
            Expr::Filter(filter) => {
                fmt_operand(f, &filter.primary)?;
                for predicate in &filter.predicates {
                    write!(f, "[{}]", predicate.value)?;
                }
                Ok(())
            }
            Expr::DynamicCall(call) => {
                fmt_operand(f, &call.base)?;
                fmt_args(f, &call.args)
            }
            Expr::MapConstructor(constructor) => {
                write!(f, "map {{ ")?;
                for (i, entry) in constructor.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", entry.key.value, entry.value.value)?;
                }
                write!(f, " }}")
            }
            Expr::ArrayConstructor(constructor) => match constructor {
                ArrayConstructor::Square(members) => {
                    write!(f, "[")?;
                    for (i, member) in members.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", member.value)?;
                    }
                    write!(f, "]")
                }
                ArrayConstructor::Curly(body) => match body {
                    Some(body) => write!(f, "array {{ {} }}", body.value),
                    None => write!(f, "array {{ }}"),
                },
            },
            Expr::Lookup(lookup) => {
                fmt_operand(f, &lookup.base)?;
                write!(f, "?{}", lookup.key)
            }
            Expr::UnaryLookup(key) => write!(f, "?{}", key),
            Expr::StringTemplate(segments) => {
                write!(f, "`")?;
                for segment in segments {
                    match segment {
                        TemplateSegment::Text(text) => {
                            let escaped = text
                                .replace('\\', "\\\\")
                                .replace('`', "\\`")
                                .replace('{', "\\{")
                                .replace('}', "\\}");
                            write!(f, "{}", escaped)?;
                        }
                        TemplateSegment::Expr(expr) => write!(f, "{{{}}}", expr.value)?,
                    }
                }
                write!(f, "`")
            }
            Expr::Cast(cast) => {
                write!(f, "(")?;
                fmt_operand(f, &cast.expr)?;
                write!(f, " cast as {})", cast.target)
            }
            Expr::Castable(cast) => {
                write!(f, "(")?;
                fmt_operand(f, &cast.expr)?;
                write!(f, " castable as {})", cast.target)
            }
            Expr::Treat(treat) => {
                write!(f, "(")?;
                fmt_operand(f, &treat.expr)?;
                write!(f, " treat as {})", treat.target)
            }
            Expr::InstanceOf(treat) => {
                write!(f, "(")?;
                fmt_operand(f, &treat.expr)?;
                write!(f, " instance of {})", treat.target)
            }
        }
    }
}

fn fmt_bindings(f: &mut fmt::Formatter<'_>, bindings: &[Binding]) -> fmt::Result {
    for (i, binding) in bindings.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "${}", binding.name.value)?;
        if let Some(declared) = &binding.declared_type {
            write!(f, " as {}", declared)?;
        }
        write!(f, " := ")?;
        fmt_operand(f, &binding.expr)?;
    }
    Ok(())
}

fn fmt_in_bindings(f: &mut fmt::Formatter<'_>, bindings: &[Binding]) -> fmt::Result {
    for (i, binding) in bindings.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "${} in ", binding.name.value)?;
        fmt_operand(f, &binding.expr)?;
    }
    Ok(())
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Decimal(d) => {
                if d.scale() == 0 {
                    write!(f, "{}.0", d)
                } else {
                    write!(f, "{}", d)
                }
            }
            // {:e} keeps the exponent, so the literal re-lexes as a double
            Literal::Double(d) => write!(f, "{:e}", d.0),
            Literal::String(s) => fmt_string_literal(f, s),
        }
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "/")?;
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            step.value.fmt(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Axis(step) => step.fmt(f),
            Step::Expr(expr) => {
                if is_self_delimiting(&expr.value) {
                    write!(f, "{}", expr.value)
                } else {
                    write!(f, "({})", expr.value)
                }
            }
        }
    }
}

impl fmt::Display for AxisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.axis.as_str(), self.node_test)?;
        for predicate in &self.predicates {
            write!(f, "[{}]", predicate.value)?;
        }
        Ok(())
    }
}

impl fmt::Display for NodeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTest::Name(name_test) => name_test.fmt(f),
            NodeTest::Kind(kind_test) => kind_test.fmt(f),
        }
    }
}

impl fmt::Display for NameTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameTest::Name(name) => write!(f, "{}", name.value),
            NameTest::Star => write!(f, "*"),
            NameTest::LocalName(local) => write!(f, "*:{}", local),
            NameTest::Namespace { prefix, .. } => write!(f, "{}:*", prefix),
        }
    }
}

impl fmt::Display for KeySpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySpecifier::NcName(name) => write!(f, "{}", name),
            KeySpecifier::Integer(i) => write!(f, "{}", i),
            KeySpecifier::Star => write!(f, "*"),
            KeySpecifier::Expr(expr) => write!(f, "({})", expr.value),
        }
    }
}

impl fmt::Display for SingleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name.value)?;
        if self.optional {
            write!(f, "?")?;
        }
        Ok(())
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceType::Empty => write!(f, "empty-sequence()"),
            SequenceType::Item {
                item_type,
                occurrence,
            } => write!(f, "{}{}", item_type, occurrence.as_str()),
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::AnyItem => write!(f, "item()"),
            ItemType::Atomic(xs) => write!(f, "xs:{}", xs.local_name()),
            ItemType::Kind(kind_test) => kind_test.fmt(f),
            ItemType::Function(function_test) => function_test.fmt(f),
            ItemType::Map(map_test) => map_test.fmt(f),
            ItemType::Array(array_test) => array_test.fmt(f),
            ItemType::Union(members) => {
                write!(f, "(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    member.fmt(f)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for KindTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindTest::Any => write!(f, "node()"),
            KindTest::Document(None) => write!(f, "document-node()"),
            KindTest::Document(Some(inner)) => write!(f, "document-node({})", inner),
            KindTest::Element(name, type_name) => {
                write!(f, "element(")?;
                fmt_name_and_type(f, name, type_name)?;
                write!(f, ")")
            }
            KindTest::Attribute(name, type_name) => {
                write!(f, "attribute(")?;
                fmt_name_and_type(f, name, type_name)?;
                write!(f, ")")
            }
            KindTest::PI(None) => write!(f, "processing-instruction()"),
            KindTest::PI(Some(target)) => {
                write!(f, "processing-instruction(")?;
                fmt_string_literal(f, target)?;
                write!(f, ")")
            }
            KindTest::Comment => write!(f, "comment()"),
            KindTest::Text => write!(f, "text()"),
            KindTest::NamespaceNode => write!(f, "namespace-node()"),
        }
    }
}

fn fmt_name_and_type(
    f: &mut fmt::Formatter<'_>,
    name: &Option<NameOrWildcard>,
    type_name: &Option<NameS>,
) -> fmt::Result {
    match name {
        None => {}
        Some(NameOrWildcard::Wildcard) => write!(f, "*")?,
        Some(NameOrWildcard::Name(name)) => write!(f, "{}", name.value)?,
    }
    if let Some(type_name) = type_name {
        write!(f, ", {}", type_name.value)?;
    }
    Ok(())
}

impl fmt::Display for FunctionTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionTest::Any => write!(f, "function(*)"),
            FunctionTest::Typed {
                params,
                return_type,
            } => {
                write!(f, "function(")?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    param.fmt(f)?;
                }
                write!(f, ") as {}", return_type)
            }
        }
    }
}

impl fmt::Display for MapTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapTest::Any => write!(f, "map(*)"),
            MapTest::Typed { key, value } => {
                write!(f, "map(xs:{}, {})", key.local_name(), value)
            }
        }
    }
}

impl fmt::Display for ArrayTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayTest::Any => write!(f, "array(*)"),
            ArrayTest::Typed(member) => write!(f, "array({})", member),
        }
    }
}
