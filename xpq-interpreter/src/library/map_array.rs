use xpq_schema_type::Xs;

use crate::atomic::{cast_to, Atomic};
use crate::error::{Error, Result};
use crate::function::{CallCtx, Function};
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

fn map_argument<N: Node>(seq: &Sequence<N>) -> Result<crate::function::Map<N>> {
    match seq.singleton()? {
        Item::Function(Function::Map(map)) => Ok(map.clone()),
        _ => Err(Error::XPTY0004),
    }
}

fn array_argument<N: Node>(seq: &Sequence<N>) -> Result<crate::function::Array<N>> {
    match seq.singleton()? {
        Item::Function(Function::Array(array)) => Ok(array.clone()),
        _ => Err(Error::XPTY0004),
    }
}

fn key_argument<N: Node>(seq: &Sequence<N>) -> Result<Atomic> {
    seq.atomized()?.into_iter().next().ok_or(Error::XPTY0004)
}

/// `map:keys` enumerates in insertion order.
pub(crate) fn map_keys<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let map = map_argument(&args[0])?;
    Ok(Sequence::from_items(
        map.keys().into_iter().map(Item::Atomic).collect(),
    ))
}

pub(crate) fn map_size<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let map = map_argument(&args[0])?;
    Ok(Sequence::from_atomic(Atomic::integer(map.len() as i64)))
}

pub(crate) fn map_get<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let map = map_argument(&args[0])?;
    let key = key_argument(&args[1])?;
    Ok(map.get(&key).cloned().unwrap_or_default())
}

pub(crate) fn map_contains<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let map = map_argument(&args[0])?;
    let key = key_argument(&args[1])?;
    Ok(Sequence::from_bool(map.contains(&key)))
}

pub(crate) fn map_put<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let map = map_argument(&args[0])?;
    let key = key_argument(&args[1])?;
    let updated = map.with_entry(key, args[2].clone());
    Ok(Sequence::one(Item::Function(Function::Map(updated))))
}

pub(crate) fn array_size<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let array = array_argument(&args[0])?;
    Ok(Sequence::from_atomic(Atomic::integer(array.len() as i64)))
}

pub(crate) fn array_get<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let array = array_argument(&args[0])?;
    let key = key_argument(&args[1])?;
    let index = match cast_to(&key, Xs::Integer, None)? {
        Atomic::Integer(_, i) => (*i).clone(),
        _ => return Err(Error::XPTY0004),
    };
    Ok(array.get(&index)?.clone())
}

/// `array:flatten` deep-flattens nested arrays into a sequence.
pub(crate) fn array_flatten<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let mut result = Sequence::empty();
    for item in args[0].iter() {
        match item {
            Item::Function(Function::Array(array)) => {
                result.extend(Sequence::from_items(array.flattened()?));
            }
            other => result.push(other.clone()),
        }
    }
    Ok(result)
}
