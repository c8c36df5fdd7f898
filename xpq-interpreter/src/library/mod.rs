//! The built-in function library.
//!
//! Functions are plain `fn` items registered by expanded name and arity
//! range into a [`FunctionRegistry`]; hosts add their own on top.

mod boolean;
mod context;
mod doc;
mod hof;
mod map_array;
mod math;
mod node;
mod numeric;
mod qname;
mod sequence;
mod string;

use xpq_name::{ARRAY_NAMESPACE, FN_NAMESPACE, MAP_NAMESPACE, MATH_NAMESPACE};

use crate::atomic::Atomic;
use crate::error::Result;
use crate::function::{CallCtx, FunctionRegistry};
use crate::sequence::Sequence;
use crate::xml::Node;

/// The registry holding every built-in this engine ships.
pub fn standard_registry<N: Node>() -> FunctionRegistry<N> {
    let mut registry = FunctionRegistry::new();
    let fns = &mut registry;

    // XPath 1.0 core
    register(fns, "string", 0, Some(1), string::string);
    register(fns, "concat", 2, None, string::concat);
    register(fns, "contains", 2, Some(2), string::contains);
    register(fns, "starts-with", 2, Some(2), string::starts_with);
    register(fns, "substring", 2, Some(3), string::substring);
    register(fns, "substring-before", 2, Some(2), string::substring_before);
    register(fns, "substring-after", 2, Some(2), string::substring_after);
    register(fns, "string-length", 0, Some(1), string::string_length);
    register(fns, "normalize-space", 0, Some(1), string::normalize_space);
    register(fns, "translate", 3, Some(3), string::translate);
    register(fns, "string-join", 1, Some(2), string::string_join);
    register(fns, "boolean", 1, Some(1), boolean::boolean);
    register(fns, "not", 1, Some(1), boolean::not);
    register(fns, "true", 0, Some(0), boolean::true_);
    register(fns, "false", 0, Some(0), boolean::false_);
    register(fns, "number", 0, Some(1), numeric::number);
    register(fns, "sum", 1, Some(2), numeric::sum);
    register(fns, "avg", 1, Some(1), numeric::avg);
    register(fns, "min", 1, Some(1), numeric::min);
    register(fns, "max", 1, Some(1), numeric::max);
    register(fns, "abs", 1, Some(1), numeric::abs);
    register(fns, "floor", 1, Some(1), numeric::floor);
    register(fns, "ceiling", 1, Some(1), numeric::ceiling);
    register(fns, "round", 1, Some(1), numeric::round);
    register(fns, "count", 1, Some(1), sequence::count);
    register(fns, "empty", 1, Some(1), sequence::empty);
    register(fns, "exists", 1, Some(1), sequence::exists);
    register(fns, "position", 0, Some(0), context::position);
    register(fns, "last", 0, Some(0), context::last);
    register(fns, "name", 0, Some(1), node::name);
    register(fns, "local-name", 0, Some(1), node::local_name);
    register(fns, "namespace-uri", 0, Some(1), node::namespace_uri);
    register(fns, "root", 0, Some(1), node::root);
    register(fns, "id", 1, Some(2), node::id);
    register(fns, "lang", 1, Some(2), node::lang);

    // XPath 2.0 cardinality
    register(fns, "zero-or-one", 1, Some(1), sequence::zero_or_one);
    register(fns, "one-or-more", 1, Some(1), sequence::one_or_more);
    register(fns, "exactly-one", 1, Some(1), sequence::exactly_one);
    register(fns, "unordered", 1, Some(1), sequence::unordered);

    // XPath 2.0 QName handling
    register(fns, "QName", 2, Some(2), qname::qname);
    register(fns, "resolve-QName", 2, Some(2), qname::resolve_qname);
    register(fns, "prefix-from-QName", 1, Some(1), qname::prefix_from_qname);
    register(
        fns,
        "local-name-from-QName",
        1,
        Some(1),
        qname::local_name_from_qname,
    );
    register(
        fns,
        "namespace-uri-from-QName",
        1,
        Some(1),
        qname::namespace_uri_from_qname,
    );
    register(fns, "in-scope-prefixes", 1, Some(1), qname::in_scope_prefixes);
    register(
        fns,
        "namespace-uri-for-prefix",
        2,
        Some(2),
        qname::namespace_uri_for_prefix,
    );

    // XPath 2.0 sequences
    register(fns, "distinct-values", 1, Some(1), sequence::distinct_values);
    register(fns, "index-of", 2, Some(2), sequence::index_of);
    register(fns, "insert-before", 3, Some(3), sequence::insert_before);
    register(fns, "remove", 2, Some(2), sequence::remove);
    register(fns, "reverse", 1, Some(1), sequence::reverse);
    register(fns, "subsequence", 2, Some(3), sequence::subsequence);

    // XPath 2.0 context
    register(fns, "current-dateTime", 0, Some(0), context::current_date_time);
    register(fns, "current-date", 0, Some(0), context::current_date);
    register(fns, "current-time", 0, Some(0), context::current_time);
    register(fns, "implicit-timezone", 0, Some(0), context::implicit_timezone);

    // documents and collections
    register(fns, "doc", 1, Some(1), doc::doc);
    register(fns, "doc-available", 1, Some(1), doc::doc_available);
    register(fns, "collection", 0, Some(1), doc::collection);

    // XPath 3.0 sequences and higher-order functions
    register(fns, "head", 1, Some(1), sequence::head);
    register(fns, "tail", 1, Some(1), sequence::tail);
    register(fns, "sort", 1, Some(1), sequence::sort);
    register(fns, "for-each", 2, Some(2), hof::for_each);
    register(fns, "map", 2, Some(2), hof::for_each);
    register(fns, "filter", 2, Some(2), hof::filter);
    register(fns, "fold-left", 3, Some(3), hof::fold_left);
    register(fns, "fold-right", 3, Some(3), hof::fold_right);
    register(fns, "for-each-pair", 3, Some(3), hof::for_each_pair);

    // math namespace
    registry.register(MATH_NAMESPACE, "pi", 0, Some(0), math::pi);
    registry.register(MATH_NAMESPACE, "sqrt", 1, Some(1), math::sqrt);
    registry.register(MATH_NAMESPACE, "sin", 1, Some(1), math::sin);
    registry.register(MATH_NAMESPACE, "cos", 1, Some(1), math::cos);
    registry.register(MATH_NAMESPACE, "tan", 1, Some(1), math::tan);
    registry.register(MATH_NAMESPACE, "exp", 1, Some(1), math::exp);
    registry.register(MATH_NAMESPACE, "log", 1, Some(1), math::log);
    registry.register(MATH_NAMESPACE, "pow", 2, Some(2), math::pow);

    // map and array namespaces
    registry.register(MAP_NAMESPACE, "keys", 1, Some(1), map_array::map_keys);
    registry.register(MAP_NAMESPACE, "size", 1, Some(1), map_array::map_size);
    registry.register(MAP_NAMESPACE, "get", 2, Some(2), map_array::map_get);
    registry.register(MAP_NAMESPACE, "contains", 2, Some(2), map_array::map_contains);
    registry.register(MAP_NAMESPACE, "put", 3, Some(3), map_array::map_put);
    registry.register(ARRAY_NAMESPACE, "size", 1, Some(1), map_array::array_size);
    registry.register(ARRAY_NAMESPACE, "get", 2, Some(2), map_array::array_get);
    registry.register(ARRAY_NAMESPACE, "flatten", 1, Some(1), map_array::array_flatten);

    registry
}

fn register<N: Node>(
    registry: &mut FunctionRegistry<N>,
    local: &str,
    min_args: usize,
    max_args: Option<usize>,
    implementation: crate::function::FunctionImpl<N>,
) {
    registry.register(FN_NAMESPACE, local, min_args, max_args, implementation);
}

// --- shared argument helpers ---------------------------------------------

/// The string value of an argument sequence; empty is the empty string.
pub(crate) fn string_arg<N: Node>(seq: &Sequence<N>) -> Result<String> {
    match seq.atomized_first()? {
        None => Ok(String::new()),
        Some(atomic) => Ok(atomic.into_canonical()),
    }
}

/// The numeric value of an argument sequence; empty is NaN.
pub(crate) fn number_arg<N: Node>(seq: &Sequence<N>) -> Result<f64> {
    match seq.atomized_first()? {
        None => Ok(f64::NAN),
        Some(atomic) => Ok(atomic.number_value()),
    }
}

/// The argument, or the context item when absent (the 0-arity form of
/// `string()`, `name()` and friends).
pub(crate) fn arg_or_context<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    match args.first() {
        Some(seq) => Ok(seq.clone()),
        None => Ok(Sequence::one(ctx.context.context_item()?.clone())),
    }
}

pub(crate) fn double_result<N: Node>(value: f64) -> Result<Sequence<N>> {
    Ok(Sequence::from_atomic(Atomic::double(value)))
}
