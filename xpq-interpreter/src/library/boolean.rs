use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

pub(crate) fn boolean<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(args[0].effective_boolean_value()?))
}

pub(crate) fn not<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(!args[0].effective_boolean_value()?))
}

pub(crate) fn true_<N: Node>(
    _ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(true))
}

pub(crate) fn false_<N: Node>(
    _ctx: &CallCtx<'_, N>,
    _args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    Ok(Sequence::from_bool(false))
}
