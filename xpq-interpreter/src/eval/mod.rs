//! The evaluator: a single dispatch over the expression sum type.

mod matching;
mod path;

pub use matching::{matches_item_type, matches_sequence_type};

use std::rc::Rc;

use ibig::IBig;

use xpq_ast::ast::{
    ArrayConstructor, BinaryExpr, BinaryOp, Expr, ExprS, FunctionCall, KeySpecifier, Literal,
    TemplateSegment,
};
use xpq_name::{Name, XS_NAMESPACE};
use xpq_schema_type::Xs;

use crate::atomic::{self, Atomic};
use crate::context::DynamicContext;
use crate::error::{Error, Result};
use crate::function::{Array, CallCtx, Function, InlineFunctionValue, Map, Variables};
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

use path::{apply_predicates, sorted_distinct};

/// Evaluate an expression under a dynamic context.
pub fn evaluate<N: Node>(expr: &ExprS, context: &DynamicContext<N>) -> Result<Sequence<N>> {
    match &expr.value {
        Expr::Literal(literal) => Ok(Sequence::from_atomic(literal_value(literal))),
        Expr::VarRef(name) => context.variable(name),
        Expr::ContextItem => Ok(Sequence::one(context.context_item()?.clone())),
        Expr::Sequence(items) => {
            let mut result = Sequence::empty();
            for item in items {
                result.extend(evaluate(item, context)?);
            }
            Ok(result)
        }
        Expr::Unary(op, operand) => {
            let operand = evaluate(operand, context)?;
            match operand.atomized_first()? {
                None => Ok(Sequence::empty()),
                Some(value) => Ok(Sequence::from_atomic(atomic::unary(*op, value)?)),
            }
        }
        Expr::Binary(binary) => evaluate_binary(binary, context),
        Expr::SimpleMap(left, right) => {
            let input = evaluate(left, context)?.into_items();
            let size = input.len();
            let mut result = Sequence::empty();
            for (index, item) in input.into_iter().enumerate() {
                let focus = context.with_focus(item, index + 1, size);
                result.extend(evaluate(right, &focus)?);
            }
            Ok(result)
        }
        Expr::Arrow(arrow) => {
            let target = evaluate(&arrow.target, context)?;
            let mut args = vec![target];
            for arg in &arrow.call.args {
                args.push(evaluate(arg, context)?);
            }
            call_named(&arrow.call.name.value, args, context)
        }
        Expr::If(if_expr) => {
            let condition = evaluate(&if_expr.condition, context)?;
            if condition.effective_boolean_value()? {
                evaluate(&if_expr.then, context)
            } else {
                evaluate(&if_expr.else_, context)
            }
        }
        Expr::Let(let_expr) => {
            let mut scope = context.clone();
            for binding in &let_expr.bindings {
                let value = evaluate(&binding.expr, &scope)?;
                if let Some(declared) = &binding.declared_type {
                    if !matches_sequence_type(&value, declared, &scope) {
                        return Err(Error::XPTY0004);
                    }
                }
                scope = scope.with_variable(binding.name.value.clone(), value);
            }
            evaluate(&let_expr.return_expr, &scope)
        }
        Expr::For(for_expr) => {
            let mut result = Sequence::empty();
            iterate_bindings(
                &for_expr.bindings,
                context,
                &mut |scope| {
                    result.extend(evaluate(&for_expr.return_expr, scope)?);
                    Ok(true)
                },
            )?;
            Ok(result)
        }
        Expr::Quantified(quantified) => {
            let every = quantified.quantifier == xpq_ast::ast::Quantifier::Every;
            let mut outcome = every;
            iterate_bindings(&quantified.bindings, context, &mut |scope| {
                let satisfied = evaluate(&quantified.satisfies, scope)?
                    .effective_boolean_value()?;
                if every && !satisfied {
                    outcome = false;
                    return Ok(false);
                }
                if !every && satisfied {
                    outcome = true;
                    return Ok(false);
                }
                Ok(true)
            })?;
            Ok(Sequence::from_bool(outcome))
        }
        Expr::Switch(switch) => {
            let operand = evaluate(&switch.operand, context)?.atomized_first()?;
            for case in &switch.cases {
                for case_operand in &case.operands {
                    let candidate = evaluate(case_operand, context)?.atomized_first()?;
                    if switch_matches(&operand, &candidate) {
                        return evaluate(&case.return_expr, context);
                    }
                }
            }
            evaluate(&switch.default, context)
        }
        Expr::FunctionCall(call) => evaluate_function_call(call, context),
        Expr::NamedFunctionRef(func_ref) => {
            let name = &func_ref.name.value;
            if !context.functions().contains(name) {
                return Err(Error::XPST0017);
            }
            Ok(Sequence::one(Item::Function(Function::Named {
                name: name.clone(),
                arity: func_ref.arity,
            })))
        }
        Expr::InlineFunction(inline) => {
            let closure: Variables<N> = context.variables().clone();
            Ok(Sequence::one(Item::Function(Function::Inline(Rc::new(
                InlineFunctionValue {
                    params: inline.params.clone(),
                    return_type: inline.return_type.clone(),
                    body: inline.body.clone(),
                    closure,
                },
            )))))
        }
        Expr::Path(path_expr) => path::evaluate_path(path_expr, context),
        Expr::Filter(filter) => {
            let primary = evaluate(&filter.primary, context)?;
            let filtered =
                apply_predicates(primary.into_items(), &filter.predicates, context)?;
            Ok(Sequence::from_items(filtered))
        }
        Expr::DynamicCall(call) => {
            let base = evaluate(&call.base, context)?;
            let function = base.singleton()?.to_function()?;
            let mut args = Vec::with_capacity(call.args.len());
            for arg in &call.args {
                args.push(evaluate(arg, context)?);
            }
            call_function(context, &function, args)
        }
        Expr::MapConstructor(constructor) => {
            let mut pairs = Vec::with_capacity(constructor.entries.len());
            for entry in &constructor.entries {
                let key = evaluate(&entry.key, context)?
                    .atomized_first()?
                    .ok_or(Error::XPTY0004)?;
                let value = evaluate(&entry.value, context)?;
                pairs.push((key, value));
            }
            Ok(Sequence::one(Item::Function(Function::Map(Map::new(pairs)))))
        }
        Expr::ArrayConstructor(constructor) => {
            let members: Vec<Sequence<N>> = match constructor {
                ArrayConstructor::Square(exprs) => exprs
                    .iter()
                    .map(|member| evaluate(member, context))
                    .collect::<Result<_>>()?,
                ArrayConstructor::Curly(body) => match body {
                    None => Vec::new(),
                    Some(body) => evaluate(body, context)?
                        .into_items()
                        .into_iter()
                        .map(Sequence::one)
                        .collect(),
                },
            };
            Ok(Sequence::one(Item::Function(Function::Array(Array::new(
                members,
            )))))
        }
        Expr::Lookup(lookup) => {
            let base = evaluate(&lookup.base, context)?;
            let mut result = Sequence::empty();
            for item in base.items() {
                result.extend(lookup_on_item(item, &lookup.key, context)?);
            }
            Ok(result)
        }
        Expr::UnaryLookup(key) => {
            let item = context.context_item()?.clone();
            if !matches!(
                item,
                Item::Function(Function::Map(_)) | Item::Function(Function::Array(_))
            ) {
                return Err(Error::XPDY0002);
            }
            lookup_on_item(&item, key, context)
        }
        Expr::StringTemplate(segments) => {
            let mut rendered = String::new();
            for segment in segments {
                match segment {
                    TemplateSegment::Text(text) => rendered.push_str(text),
                    TemplateSegment::Expr(expr) => {
                        let value = evaluate(expr, context)?;
                        if let Some(atomic) = value.atomized_first()? {
                            rendered.push_str(&atomic.into_canonical());
                        }
                    }
                }
            }
            Ok(Sequence::from_atomic(Atomic::string(rendered)))
        }
        Expr::Cast(cast) => {
            let value = evaluate(&cast.expr, context)?;
            let atomized = value.atomized()?;
            match atomized.len() {
                0 => {
                    if cast.target.optional {
                        Ok(Sequence::empty())
                    } else {
                        Err(Error::XPTY0004)
                    }
                }
                1 => {
                    let result = atomic::cast_to(
                        &atomized[0],
                        cast.target.xs,
                        Some(context.static_context().namespaces()),
                    )?;
                    Ok(Sequence::from_atomic(result))
                }
                _ => Err(Error::XPTY0004),
            }
        }
        Expr::Castable(cast) => {
            let value = evaluate(&cast.expr, context)?;
            let castable = match value.atomized() {
                Ok(atomized) => match atomized.len() {
                    0 => cast.target.optional,
                    1 => atomic::cast_to(
                        &atomized[0],
                        cast.target.xs,
                        Some(context.static_context().namespaces()),
                    )
                    .is_ok(),
                    _ => false,
                },
                Err(_) => false,
            };
            Ok(Sequence::from_bool(castable))
        }
        Expr::Treat(treat) => {
            let value = evaluate(&treat.expr, context)?;
            if matches_sequence_type(&value, &treat.target, context) {
                Ok(value)
            } else {
                Err(Error::XPDY0050)
            }
        }
        Expr::InstanceOf(instance) => {
            let value = evaluate(&instance.expr, context)?;
            Ok(Sequence::from_bool(matches_sequence_type(
                &value,
                &instance.target,
                context,
            )))
        }
    }
}

fn literal_value(literal: &Literal) -> Atomic {
    match literal {
        Literal::Integer(i) => Atomic::integer(i.clone()),
        Literal::Decimal(d) => Atomic::Decimal(*d),
        Literal::Double(d) => Atomic::double(d.0),
        Literal::String(s) => Atomic::string(s.clone()),
    }
}

/// Cartesian iteration over `for`/quantified bindings. The callback
/// returns false to stop early.
fn iterate_bindings<N: Node>(
    bindings: &[xpq_ast::ast::Binding],
    context: &DynamicContext<N>,
    body: &mut dyn FnMut(&DynamicContext<N>) -> Result<bool>,
) -> Result<bool> {
    match bindings.split_first() {
        None => body(context),
        Some((binding, rest)) => {
            let values = evaluate(&binding.expr, context)?;
            for item in values.into_items() {
                let scope =
                    context.with_variable(binding.name.value.clone(), Sequence::one(item));
                if !iterate_bindings(rest, &scope, body)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn switch_matches(operand: &Option<Atomic>, candidate: &Option<Atomic>) -> bool {
    match (operand, candidate) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            atomic::value_compare(BinaryOp::ValueEq, a.clone(), b.clone()).unwrap_or(false)
        }
        _ => false,
    }
}

fn evaluate_binary<N: Node>(
    binary: &BinaryExpr,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    use BinaryOp::*;
    match binary.op {
        And => {
            let left = evaluate(&binary.left, context)?.effective_boolean_value()?;
            if !left {
                return Ok(Sequence::from_bool(false));
            }
            let right = evaluate(&binary.right, context)?.effective_boolean_value()?;
            Ok(Sequence::from_bool(right))
        }
        Or => {
            let left = evaluate(&binary.left, context)?.effective_boolean_value()?;
            if left {
                return Ok(Sequence::from_bool(true));
            }
            let right = evaluate(&binary.right, context)?.effective_boolean_value()?;
            Ok(Sequence::from_bool(right))
        }
        Add | Sub | Mul | Div | IntDiv | Mod => {
            let left = evaluate(&binary.left, context)?.atomized_first()?;
            let right = evaluate(&binary.right, context)?.atomized_first()?;
            match (left, right) {
                (Some(a), Some(b)) => {
                    Ok(Sequence::from_atomic(atomic::arithmetic(binary.op, a, b)?))
                }
                _ => Ok(Sequence::empty()),
            }
        }
        GenEq | GenNe | GenLt | GenLe | GenGt | GenGe => {
            let left = evaluate(&binary.left, context)?.atomized()?;
            let right = evaluate(&binary.right, context)?.atomized()?;
            for a in &left {
                for b in &right {
                    if atomic::general_compare(binary.op, a, b)? {
                        return Ok(Sequence::from_bool(true));
                    }
                }
            }
            Ok(Sequence::from_bool(false))
        }
        ValueEq | ValueNe | ValueLt | ValueLe | ValueGt | ValueGe => {
            let left = evaluate(&binary.left, context)?.atomized()?;
            let right = evaluate(&binary.right, context)?.atomized()?;
            if left.len() != 1 || right.len() != 1 {
                return Err(Error::XPTY0004);
            }
            let result =
                atomic::value_compare(binary.op, left[0].clone(), right[0].clone())?;
            Ok(Sequence::from_bool(result))
        }
        Is | Precedes | Follows => {
            let left = evaluate(&binary.left, context)?;
            let right = evaluate(&binary.right, context)?;
            if left.is_empty() || right.is_empty() {
                return Ok(Sequence::empty());
            }
            let a = left.singleton()?.to_node()?;
            let b = right.singleton()?.to_node()?;
            let result = match binary.op {
                Is => a.node_id() == b.node_id(),
                Precedes => a.document_order(&b) == std::cmp::Ordering::Less,
                _ => a.document_order(&b) == std::cmp::Ordering::Greater,
            };
            Ok(Sequence::from_bool(result))
        }
        Range => {
            let left = evaluate(&binary.left, context)?.atomized_first()?;
            let right = evaluate(&binary.right, context)?.atomized_first()?;
            match (left, right) {
                (Some(a), Some(b)) => {
                    let from = range_bound(&a)?;
                    let to = range_bound(&b)?;
                    let mut result = Sequence::empty();
                    let mut current = from;
                    while current <= to {
                        result.push(Item::Atomic(Atomic::integer(current.clone())));
                        current += IBig::from(1);
                    }
                    Ok(result)
                }
                _ => Ok(Sequence::empty()),
            }
        }
        Concat => {
            let left = concat_operand(evaluate(&binary.left, context)?)?;
            let right = concat_operand(evaluate(&binary.right, context)?)?;
            Ok(Sequence::from_atomic(Atomic::string(left + &right)))
        }
        Union => {
            let mut nodes = evaluate(&binary.left, context)?.nodes()?;
            nodes.extend(evaluate(&binary.right, context)?.nodes()?);
            Ok(Sequence::from_nodes(sorted_distinct(nodes)))
        }
        Intersect => {
            let left = evaluate(&binary.left, context)?.nodes()?;
            let right = evaluate(&binary.right, context)?.nodes()?;
            let ids: ahash::AHashSet<u64> = right.iter().map(|n| n.node_id()).collect();
            let kept: Vec<N> = left
                .into_iter()
                .filter(|node| ids.contains(&node.node_id()))
                .collect();
            Ok(Sequence::from_nodes(sorted_distinct(kept)))
        }
        Except => {
            let left = evaluate(&binary.left, context)?.nodes()?;
            let right = evaluate(&binary.right, context)?.nodes()?;
            let ids: ahash::AHashSet<u64> = right.iter().map(|n| n.node_id()).collect();
            let kept: Vec<N> = left
                .into_iter()
                .filter(|node| !ids.contains(&node.node_id()))
                .collect();
            Ok(Sequence::from_nodes(sorted_distinct(kept)))
        }
    }
}

fn range_bound(value: &Atomic) -> Result<IBig> {
    match value {
        Atomic::Integer(_, i) => Ok((**i).clone()),
        Atomic::Untyped(_) => {
            let as_double = value.number_value();
            if as_double.trunc() == as_double && as_double.is_finite() {
                atomic::cast_to(value, Xs::Integer, None).and_then(|v| match v {
                    Atomic::Integer(_, i) => Ok((*i).clone()),
                    _ => Err(Error::XPTY0004),
                })
            } else {
                Err(Error::XPTY0004)
            }
        }
        _ => Err(Error::XPTY0004),
    }
}

fn concat_operand<N: Node>(value: Sequence<N>) -> Result<String> {
    match value.atomized_first()? {
        None => Ok(String::new()),
        Some(atomic) => Ok(atomic.into_canonical()),
    }
}

fn lookup_on_item<N: Node>(
    item: &Item<N>,
    key: &KeySpecifier,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    match item {
        Item::Function(Function::Map(map)) => match key {
            KeySpecifier::Star => {
                let mut result = Sequence::empty();
                for value in map.values() {
                    result.extend(value);
                }
                Ok(result)
            }
            KeySpecifier::NcName(name) => {
                Ok(map.get(&Atomic::string(name.clone())).cloned().unwrap_or_default())
            }
            KeySpecifier::Integer(i) => Ok(map
                .get(&Atomic::integer(i.clone()))
                .cloned()
                .unwrap_or_default()),
            KeySpecifier::Expr(expr) => {
                let keys = evaluate(expr, context)?.atomized()?;
                let mut result = Sequence::empty();
                for key in keys {
                    if let Some(value) = map.get(&key) {
                        result.extend(value.clone());
                    }
                }
                Ok(result)
            }
        },
        Item::Function(Function::Array(array)) => match key {
            KeySpecifier::Star => Ok(Sequence::from_items(array.flattened()?)),
            KeySpecifier::Integer(i) => Ok(array.get(i)?.clone()),
            KeySpecifier::NcName(_) => Err(Error::XPTY0004),
            KeySpecifier::Expr(expr) => {
                let keys = evaluate(expr, context)?.atomized()?;
                let mut result = Sequence::empty();
                for key in keys {
                    let index = match atomic::cast_to(&key, Xs::Integer, None)? {
                        Atomic::Integer(_, i) => (*i).clone(),
                        _ => return Err(Error::XPTY0004),
                    };
                    result.extend(array.get(&index)?.clone());
                }
                Ok(result)
            }
        },
        _ => Err(Error::XPTY0004),
    }
}

fn evaluate_function_call<N: Node>(
    call: &FunctionCall,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    let mut args = Vec::with_capacity(call.args.len());
    for arg in &call.args {
        args.push(evaluate(arg, context)?);
    }
    call_named(&call.name.value, args, context)
}

fn call_named<N: Node>(
    name: &Name,
    args: Vec<Sequence<N>>,
    context: &DynamicContext<N>,
) -> Result<Sequence<N>> {
    // xs:* constructor functions are casts
    if name.namespace() == Some(XS_NAMESPACE) {
        if args.len() != 1 {
            return Err(Error::XPST0017);
        }
        let target = Xs::by_name(name.namespace(), name.local_name()).ok_or(Error::XPST0017)?;
        return match args[0].atomized_first()? {
            None => Ok(Sequence::empty()),
            Some(value) => Ok(Sequence::from_atomic(atomic::cast_to(
                &value,
                target,
                Some(context.static_context().namespaces()),
            )?)),
        };
    }
    let implementation = context.functions().resolve(name, args.len())?;
    implementation(&CallCtx { context }, &args)
}

/// Call a function item with the given arguments.
pub fn call_function<N: Node>(
    context: &DynamicContext<N>,
    function: &Function<N>,
    args: Vec<Sequence<N>>,
) -> Result<Sequence<N>> {
    match function {
        Function::Named { name, arity } => {
            if *arity as usize != args.len() {
                return Err(Error::XPST0017);
            }
            call_named(name, args, context)
        }
        Function::Inline(inline) => {
            if inline.params.len() != args.len() {
                return Err(Error::XPTY0004);
            }
            let mut environment = inline.closure.clone();
            for (param, value) in inline.params.iter().zip(args.into_iter()) {
                if let Some(declared) = &param.declared_type {
                    if !matches_sequence_type(&value, declared, context) {
                        return Err(Error::XPTY0004);
                    }
                }
                environment.insert(param.name.clone(), value);
            }
            let scope = context.with_variables(environment).without_focus();
            let result = evaluate(&inline.body, &scope)?;
            if let Some(declared) = &inline.return_type {
                if !matches_sequence_type(&result, declared, context) {
                    return Err(Error::XPTY0004);
                }
            }
            Ok(result)
        }
        Function::Map(map) => {
            if args.len() != 1 {
                return Err(Error::XPTY0004);
            }
            let key = args[0].atomized()?;
            if key.len() != 1 {
                return Err(Error::XPTY0004);
            }
            Ok(map.get(&key[0]).cloned().unwrap_or_default())
        }
        Function::Array(array) => {
            if args.len() != 1 {
                return Err(Error::XPTY0004);
            }
            let key = args[0].atomized()?;
            if key.len() != 1 {
                return Err(Error::XPTY0004);
            }
            let index = match atomic::cast_to(&key[0], Xs::Integer, None)? {
                Atomic::Integer(_, i) => (*i).clone(),
                _ => return Err(Error::XPTY0004),
            };
            Ok(array.get(&index)?.clone())
        }
    }
}
