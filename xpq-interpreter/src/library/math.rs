use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

use super::{double_result, number_arg};

pub(crate) fn pi<N: Node>(_ctx: &CallCtx<'_, N>, _args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(std::f64::consts::PI)
}

pub(crate) fn sqrt<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.sqrt())
}

pub(crate) fn sin<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.sin())
}

pub(crate) fn cos<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.cos())
}

pub(crate) fn tan<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.tan())
}

pub(crate) fn exp<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.exp())
}

pub(crate) fn log<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    double_result(number_arg(&args[0])?.ln())
}

pub(crate) fn pow<N: Node>(_ctx: &CallCtx<'_, N>, args: &[Sequence<N>]) -> Result<Sequence<N>> {
    let base = number_arg(&args[0])?;
    let exponent = number_arg(&args[1])?;
    double_result(base.powf(exponent))
}
