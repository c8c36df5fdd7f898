use crate::error::{Error, Result};
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

use super::string_arg;

/// `fn:doc`: a pure lookup against the dynamic context's document map.
/// No entry means the empty sequence; an empty URI is an error.
pub(crate) fn doc<N: Node>(ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::empty());
    }
    let uri = string_arg(&args[0])?;
    if uri.is_empty() {
        return Err(Error::FODC0005);
    }
    match ctx.context.document(&uri) {
        Some(root) => Ok(Sequence::from_node(root.clone())),
        None => Ok(Sequence::empty()),
    }
}

/// `fn:doc-available` never raises for missing entries.
pub(crate) fn doc_available<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::from_bool(false));
    }
    let uri = string_arg(&args[0])?;
    let available = !uri.is_empty() && ctx.context.document(&uri).is_some();
    Ok(Sequence::from_bool(available))
}

/// `fn:collection`: without an argument, the default collection.
pub(crate) fn collection<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    match args.first() {
        None => match ctx.context.default_collection() {
            Some(nodes) => Ok(Sequence::from_nodes(nodes.to_vec())),
            None => Ok(Sequence::empty()),
        },
        Some(arg) => {
            if arg.is_empty() {
                return collection(ctx, &[]);
            }
            let uri = string_arg(arg)?;
            match ctx.context.collection(&uri) {
                Some(nodes) => Ok(Sequence::from_nodes(nodes.to_vec())),
                None => Ok(Sequence::empty()),
            }
        }
    }
}
