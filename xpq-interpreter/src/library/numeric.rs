use xpq_ast::ast::BinaryOp;

use crate::atomic::{self, Atomic};
use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

use super::{arg_or_context, double_result};

pub(crate) fn number<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = arg_or_context(ctx, args)?;
    match input.atomized_first()? {
        None => double_result(f64::NAN),
        Some(atomic) => double_result(atomic.number_value()),
    }
}

pub(crate) fn sum<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    if values.is_empty() {
        return match args.get(1) {
            Some(zero) => Ok(zero.clone()),
            None => Ok(Sequence::from_atomic(Atomic::integer(0))),
        };
    }
    let mut total = values[0].clone();
    for value in &values[1..] {
        total = atomic::arithmetic(BinaryOp::Add, total, value.clone())?;
    }
    Ok(Sequence::from_atomic(total))
}

pub(crate) fn avg<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    if values.is_empty() {
        return Ok(Sequence::empty());
    }
    let mut total = values[0].clone();
    for value in &values[1..] {
        total = atomic::arithmetic(BinaryOp::Add, total, value.clone())?;
    }
    let count = Atomic::integer(values.len() as i64);
    Ok(Sequence::from_atomic(atomic::arithmetic(
        BinaryOp::Div,
        total,
        count,
    )?))
}

fn extreme<N: Node>(args: &[Sequence<N>], want_greater: bool) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    if values.is_empty() {
        return Ok(Sequence::empty());
    }
    let mut best = values[0].clone();
    for value in &values[1..] {
        if value.is_nan() || best.is_nan() {
            return double_result(f64::NAN);
        }
        let op = if want_greater {
            BinaryOp::ValueGt
        } else {
            BinaryOp::ValueLt
        };
        if atomic::value_compare(op, value.clone(), best.clone())? {
            best = value.clone();
        }
    }
    Ok(Sequence::from_atomic(best))
}

pub(crate) fn min<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    extreme(args, false)
}

pub(crate) fn max<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    extreme(args, true)
}

fn rounded<N: Node>(
    args: &[Sequence<N>],
    apply: impl Fn(f64) -> f64,
) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    match values.first() {
        None => Ok(Sequence::empty()),
        Some(value) => {
            // integers are already whole
            if matches!(value, Atomic::Integer(_, _)) {
                return Ok(Sequence::from_atomic(value.clone()));
            }
            let result = apply(value.number_value());
            if result.is_finite() && result.abs() < 9e15 {
                Ok(Sequence::from_atomic(Atomic::integer(result as i64)))
            } else {
                double_result(result)
            }
        }
    }
}

pub(crate) fn abs<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let values = args[0].atomized()?;
    match values.first() {
        None => Ok(Sequence::empty()),
        Some(Atomic::Integer(_, i)) => {
            let value = (**i).clone();
            let positive = if value < ibig::IBig::from(0) { -value } else { value };
            Ok(Sequence::from_atomic(Atomic::integer(positive)))
        }
        Some(Atomic::Decimal(d)) => Ok(Sequence::from_atomic(Atomic::Decimal(d.abs()))),
        Some(value) => double_result(value.number_value().abs()),
    }
}

pub(crate) fn floor<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    rounded(args, f64::floor)
}

pub(crate) fn ceiling<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    rounded(args, f64::ceil)
}

/// `fn:round` rounds halves toward positive infinity, so `round(-2.5)`
/// is `-2`.
pub(crate) fn round<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    rounded(args, |v| {
        if v.is_finite() {
            (v + 0.5).floor()
        } else {
            v
        }
    })
}
