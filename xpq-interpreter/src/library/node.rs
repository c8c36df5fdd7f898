use crate::atomic::{Atomic, StringType};
use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::{Item, Sequence};
use crate::xml::{Node, NodeKind};

use super::{arg_or_context, string_arg};

fn node_argument<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Option<N>> {
    let input = arg_or_context(ctx, args)?;
    match input.optional()? {
        None => Ok(None),
        Some(item) => Ok(Some(item.to_node()?)),
    }
}

pub(crate) fn name<N: Node>(ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let value = match node_argument(ctx, args)? {
        Some(node) => node.name().map(|n| n.to_string()).unwrap_or_default(),
        None => String::new(),
    };
    Ok(Sequence::from_atomic(Atomic::string(value)))
}

pub(crate) fn local_name<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let value = match node_argument(ctx, args)? {
        Some(node) => node
            .name()
            .map(|n| n.local_name().to_string())
            .unwrap_or_default(),
        None => String::new(),
    };
    Ok(Sequence::from_atomic(Atomic::string(value)))
}

pub(crate) fn namespace_uri<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let value = match node_argument(ctx, args)? {
        Some(node) => node
            .name()
            .and_then(|n| n.namespace().map(|ns| ns.to_string()))
            .unwrap_or_default(),
        None => String::new(),
    };
    Ok(Sequence::from_atomic(Atomic::String(
        StringType::AnyURI,
        std::rc::Rc::new(value),
    )))
}

pub(crate) fn root<N: Node>(ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    match node_argument(ctx, args)? {
        Some(node) => Ok(Sequence::from_node(node.root())),
        None => Ok(Sequence::empty()),
    }
}

/// `fn:id`: elements whose `id` or `xml:id` attribute matches one of the
/// whitespace-separated tokens, in document order.
pub(crate) fn id<N: Node>(ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let wanted: Vec<String> = args[0]
        .atomized()?
        .iter()
        .flat_map(|value| {
            value
                .into_canonical()
                .split_whitespace()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        })
        .collect();
    let start = match args.get(1) {
        Some(seq) => seq.singleton()?.to_node()?,
        None => ctx.context.context_item()?.to_node()?,
    };
    let root = start.root();
    let mut result = Vec::new();
    let mut candidates = vec![root.clone()];
    candidates.extend(root.descendants());
    for node in candidates {
        if node.kind() != NodeKind::Element {
            continue;
        }
        let matched = node.attributes().iter().any(|attribute| {
            attribute
                .name()
                .map(|name| name.local_name() == "id")
                .unwrap_or(false)
                && wanted.contains(&attribute.string_value())
        });
        if matched {
            result.push(node);
        }
    }
    Ok(Sequence::from_nodes(result))
}

/// `fn:lang`: whether the nearest `xml:lang` matches the argument, case
/// insensitively, with subtag truncation.
pub(crate) fn lang<N: Node>(ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let wanted = string_arg(&args[0])?.to_ascii_lowercase();
    let start = match args.get(1) {
        Some(seq) => seq.singleton()?.to_node()?,
        None => ctx.context.context_item()?.to_node()?,
    };
    let mut current = Some(start);
    while let Some(node) = current {
        for attribute in node.attributes() {
            let is_lang = attribute
                .name()
                .map(|name| {
                    name.local_name() == "lang"
                        && name.namespace() == Some(xpq_name::XML_NAMESPACE)
                })
                .unwrap_or(false);
            if is_lang {
                let value = attribute.string_value().to_ascii_lowercase();
                let matches = value == wanted
                    || (value.starts_with(&wanted)
                        && value.as_bytes().get(wanted.len()) == Some(&b'-'));
                return Ok(Sequence::from_bool(matches));
            }
        }
        current = node.parent();
    }
    Ok(Sequence::from_bool(false))
}
