use std::rc::Rc;

use xpq_name::Name;

use crate::atomic::{Atomic, StringType};
use crate::error::{Error, Result};
use crate::function::CallCtx;
use crate::sequence::{Item, Sequence};
use crate::xml::{Node, NodeKind};

use super::string_arg;

fn qname_argument<N: Node>(seq: &Sequence<N>) -> Result<Rc<Name>> {
    match seq.atomized()?.first() {
        Some(Atomic::QName(name)) => Ok(name.clone()),
        _ => Err(Error::XPTY0004),
    }
}

fn element_argument<N: Node>(seq: &Sequence<N>) -> Result<N> {
    let node = seq.singleton()?.to_node()?;
    if node.kind() != NodeKind::Element {
        return Err(Error::XPTY0004);
    }
    Ok(node)
}

/// The in-scope prefix to URI bindings of an element, read off its
/// namespace nodes.
fn in_scope_bindings<N: Node>(element: &N) -> Vec<(String, String)> {
    element
        .namespaces()
        .iter()
        .map(|ns| {
            let prefix = ns
                .name()
                .map(|name| name.local_name().to_string())
                .unwrap_or_default();
            (prefix, ns.string_value())
        })
        .collect()
}

/// `fn:QName(uri, lexical)`: build a QName, resolving the prefix part
/// against the given URI.
pub(crate) fn qname<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let uri = string_arg(&args[0])?;
    let lexical = string_arg(&args[1])?;
    let (prefix, local) = match lexical.split_once(':') {
        Some((prefix, local)) => (Some(prefix.to_string()), local.to_string()),
        None => (None, lexical),
    };
    if local.is_empty() {
        return Err(Error::FORG0001);
    }
    if prefix.is_some() && uri.is_empty() {
        return Err(Error::FORG0001);
    }
    let namespace = if uri.is_empty() { None } else { Some(uri) };
    Ok(Sequence::from_atomic(Atomic::QName(Rc::new(Name::new(
        local, namespace, prefix,
    )))))
}

/// `fn:resolve-QName(lexical, element)`: resolve the prefix against the
/// element's in-scope namespaces.
pub(crate) fn resolve_qname<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::empty());
    }
    let lexical = string_arg(&args[0])?;
    let element = element_argument(&args[1])?;
    let bindings = in_scope_bindings(&element);
    let (prefix, local) = match lexical.split_once(':') {
        Some((prefix, local)) => (prefix.to_string(), local.to_string()),
        None => (String::new(), lexical),
    };
    let namespace = bindings
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| uri.clone());
    if namespace.is_none() && !prefix.is_empty() {
        return Err(Error::FORG0001);
    }
    let prefix = if prefix.is_empty() { None } else { Some(prefix) };
    Ok(Sequence::from_atomic(Atomic::QName(Rc::new(Name::new(
        local, namespace, prefix,
    )))))
}

pub(crate) fn prefix_from_qname<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::empty());
    }
    let name = qname_argument(&args[0])?;
    match name.prefix() {
        Some(prefix) if !prefix.is_empty() => {
            Ok(Sequence::from_atomic(Atomic::string(prefix)))
        }
        _ => Ok(Sequence::empty()),
    }
}

pub(crate) fn local_name_from_qname<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::empty());
    }
    let name = qname_argument(&args[0])?;
    Ok(Sequence::from_atomic(Atomic::string(name.local_name())))
}

pub(crate) fn namespace_uri_from_qname<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Ok(Sequence::empty());
    }
    let name = qname_argument(&args[0])?;
    Ok(Sequence::from_atomic(Atomic::String(
        StringType::AnyURI,
        Rc::new(name.namespace().unwrap_or_default().to_string()),
    )))
}

pub(crate) fn in_scope_prefixes<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let element = element_argument(&args[0])?;
    let items: Vec<Item<N>> = in_scope_bindings(&element)
        .into_iter()
        .map(|(prefix, _)| Item::Atomic(Atomic::string(prefix)))
        .collect();
    Ok(Sequence::from_items(items))
}

pub(crate) fn namespace_uri_for_prefix<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let prefix = string_arg(&args[0])?;
    let element = element_argument(&args[1])?;
    let uri = in_scope_bindings(&element)
        .into_iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, uri)| uri);
    match uri {
        Some(uri) => Ok(Sequence::from_atomic(Atomic::String(
            StringType::AnyURI,
            Rc::new(uri),
        ))),
        None => Ok(Sequence::empty()),
    }
}
