use crate::atomic::Atomic;
use crate::error::{Error, Result};
use crate::eval::call_function;
use crate::function::CallCtx;
use crate::sequence::{Item, Sequence};
use crate::xml::Node;

pub(crate) fn for_each<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let function = args[1].singleton()?.to_function()?;
    let mut result = Sequence::empty();
    for item in args[0].iter() {
        result.extend(call_function(
            ctx.context,
            &function,
            vec![Sequence::one(item.clone())],
        )?);
    }
    Ok(result)
}

pub(crate) fn filter<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let function = args[1].singleton()?.to_function()?;
    let mut result = Sequence::empty();
    for item in args[0].iter() {
        let keep = call_function(
            ctx.context,
            &function,
            vec![Sequence::one(item.clone())],
        )?;
        match keep.singleton()? {
            Item::Atomic(Atomic::Boolean(true)) => result.push(item.clone()),
            Item::Atomic(Atomic::Boolean(false)) => {}
            _ => return Err(Error::XPTY0004),
        }
    }
    Ok(result)
}

pub(crate) fn fold_left<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let function = args[2].singleton()?.to_function()?;
    let mut accumulator = args[1].clone();
    for item in args[0].iter() {
        accumulator = call_function(
            ctx.context,
            &function,
            vec![accumulator, Sequence::one(item.clone())],
        )?;
    }
    Ok(accumulator)
}

pub(crate) fn fold_right<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let function = args[2].singleton()?.to_function()?;
    let mut accumulator = args[1].clone();
    for item in args[0].iter().rev() {
        accumulator = call_function(
            ctx.context,
            &function,
            vec![Sequence::one(item.clone()), accumulator],
        )?;
    }
    Ok(accumulator)
}

pub(crate) fn for_each_pair<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let function = args[2].singleton()?.to_function()?;
    let mut result = Sequence::empty();
    for (a, b) in args[0].iter().zip(args[1].iter()) {
        result.extend(call_function(
            ctx.context,
            &function,
            vec![Sequence::one(a.clone()), Sequence::one(b.clone())],
        )?);
    }
    Ok(result)
}
