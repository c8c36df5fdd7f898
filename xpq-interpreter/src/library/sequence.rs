use xpq_ast::ast::BinaryOp;

use crate::atomic::{self, Atomic};
use crate::error::{Error, Result};
use crate::function::CallCtx;
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

use super::number_arg;

pub(crate) fn count<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    Ok(Sequence::from_atomic(Atomic::integer(args[0].len() as i64)))
}

pub(crate) fn empty<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(args[0].is_empty()))
}

pub(crate) fn exists<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(!args[0].is_empty()))
}

pub(crate) fn zero_or_one<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].len() > 1 {
        return Err(Error::FORG0003);
    }
    Ok(args[0].clone())
}

pub(crate) fn one_or_more<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].is_empty() {
        return Err(Error::FORG0004);
    }
    Ok(args[0].clone())
}

pub(crate) fn exactly_one<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    if args[0].len() != 1 {
        return Err(Error::FORG0005);
    }
    Ok(args[0].clone())
}

/// Releases ordering constraints; this implementation keeps the input
/// order, and must never drop or duplicate items.
pub(crate) fn unordered<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(args[0].clone())
}

fn values_equal(a: &Atomic, b: &Atomic) -> bool {
    if a.is_nan() && b.is_nan() {
        return true;
    }
    atomic::value_compare(BinaryOp::ValueEq, a.clone(), b.clone()).unwrap_or(false)
}

pub(crate) fn distinct_values<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    let mut distinct: Vec<Atomic> = Vec::with_capacity(values.len());
    for value in values {
        if !distinct.iter().any(|seen| values_equal(seen, &value)) {
            distinct.push(value);
        }
    }
    Ok(Sequence::from_items(
        distinct.into_iter().map(Item::Atomic).collect(),
    ))
}

pub(crate) fn index_of<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    let search = args[1].atomized()?;
    let search = search.first().ok_or(Error::XPTY0004)?;
    let mut result = Sequence::empty();
    for (index, value) in values.iter().enumerate() {
        if values_equal(value, search) {
            result.push(Item::Atomic(Atomic::integer((index + 1) as i64)));
        }
    }
    Ok(result)
}

pub(crate) fn insert_before<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let target = args[0].clone().into_items();
    let position = number_arg(&args[1])?;
    let inserts = args[2].clone().into_items();
    let at = if position < 1.0 {
        0
    } else {
        ((position as usize) - 1).min(target.len())
    };
    let mut result: Vec<Item<N>> = Vec::with_capacity(target.len() + inserts.len());
    result.extend(target[..at].iter().cloned());
    result.extend(inserts);
    result.extend(target[at..].iter().cloned());
    Ok(Sequence::from_items(result))
}

pub(crate) fn remove<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let position = number_arg(&args[1])?;
    let result: Vec<Item<N>> = args[0]
        .iter()
        .enumerate()
        .filter(|(index, _)| (index + 1) as f64 != position)
        .map(|(_, item)| item.clone())
        .collect();
    Ok(Sequence::from_items(result))
}

pub(crate) fn reverse<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let mut items = args[0].clone().into_items();
    items.reverse();
    Ok(Sequence::from_items(items))
}

pub(crate) fn subsequence<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let start = number_arg(&args[1])?.round();
    let end = match args.get(2) {
        Some(length) => start + number_arg(length)?.round(),
        None => f64::INFINITY,
    };
    if start.is_nan() || end.is_nan() {
        return Ok(Sequence::empty());
    }
    let result: Vec<Item<N>> = args[0]
        .iter()
        .enumerate()
        .filter(|(index, _)| {
            let position = (index + 1) as f64;
            position >= start && position < end
        })
        .map(|(_, item)| item.clone())
        .collect();
    Ok(Sequence::from_items(result))
}

pub(crate) fn head<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    match args[0].items().first() {
        Some(item) => Ok(Sequence::one(item.clone())),
        None => Ok(Sequence::empty()),
    }
}

pub(crate) fn tail<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let items = args[0].items();
    if items.len() <= 1 {
        return Ok(Sequence::empty());
    }
    Ok(Sequence::from_items(items[1..].to_vec()))
}

/// `fn:sort` over the items' atomized keys, numbers before strings,
/// stable for equal keys.
pub(crate) fn sort<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let mut keyed: Vec<(Atomic, Item<N>)> = Vec::with_capacity(args[0].len());
    for item in args[0].iter() {
        keyed.push((item.to_atomic()?, item.clone()));
    }
    keyed.sort_by(|(a, _), (b, _)| {
        if a.is_numeric() || b.is_numeric() {
            a.number_value()
                .partial_cmp(&b.number_value())
                .unwrap_or(std::cmp::Ordering::Equal)
        } else {
            a.into_canonical().cmp(&b.into_canonical())
        }
    });
    Ok(Sequence::from_items(
        keyed.into_iter().map(|(_, item)| item).collect(),
    ))
}
