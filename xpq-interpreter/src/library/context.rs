use std::rc::Rc;

use rust_decimal::Decimal;

use crate::atomic::{Atomic, DateTimeValue, DateValue, Duration, TimeValue};
use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

pub(crate) fn position<N: Node>(
    ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(Sequence::from_atomic(Atomic::integer(
        ctx.context.position()? as i64,
    )))
}

pub(crate) fn last<N: Node>(ctx: &CallCtx<'_, N>, _args: &[Sequence<N>]) -> Result<Sequence<N>> {
    Ok(Sequence::from_atomic(Atomic::integer(
        ctx.context.size()? as i64,
    )))
}

pub(crate) fn current_date_time<N: Node>(
    ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let now = ctx.context.current_date_time();
    Ok(Sequence::from_atomic(Atomic::DateTime(Rc::new(
        DateTimeValue {
            date_time: now.naive_local(),
            offset: Some(*now.offset()),
        },
    ))))
}

pub(crate) fn current_date<N: Node>(
    ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let now = ctx.context.current_date_time();
    Ok(Sequence::from_atomic(Atomic::Date(Rc::new(DateValue {
        date: now.date_naive(),
        offset: Some(*now.offset()),
    }))))
}

pub(crate) fn current_time<N: Node>(
    ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let now = ctx.context.current_date_time();
    Ok(Sequence::from_atomic(Atomic::Time(Rc::new(TimeValue {
        time: now.time(),
        offset: Some(*now.offset()),
    }))))
}

/// The implicit timezone as a duration, `PT0S` for UTC.
pub(crate) fn implicit_timezone<N: Node>(
    ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let offset = ctx.context.implicit_timezone();
    let seconds = offset.local_minus_utc();
    let negative = seconds < 0;
    let seconds = seconds.unsigned_abs();
    let duration = Duration {
        negative,
        years: 0,
        months: 0,
        days: 0,
        hours: seconds / 3600,
        minutes: (seconds % 3600) / 60,
        seconds: Decimal::from(seconds % 60),
    };
    Ok(Sequence::from_atomic(Atomic::Duration(Rc::new(duration))))
}
