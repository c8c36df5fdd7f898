use crate::atomic::Atomic;
use crate::error::Result;
use crate::function::CallCtx;
use crate::sequence::Sequence;
use crate::xml::Node;

use super::{arg_or_context, number_arg, string_arg};

fn str_result<N: Node>(value: String) -> Result<Sequence<N>> {
    Ok(Sequence::from_atomic(Atomic::string(value)))
}

pub(crate) fn string<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = arg_or_context(ctx, args)?;
    str_result(string_arg(&input)?)
}

pub(crate) fn concat<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let mut result = String::new();
    for arg in args {
        result.push_str(&string_arg(arg)?);
    }
    str_result(result)
}

pub(crate) fn contains<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let haystack = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    Ok(Sequence::from_bool(haystack.contains(&needle)))
}

pub(crate) fn starts_with<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let haystack = string_arg(&args[0])?;
    let prefix = string_arg(&args[1])?;
    Ok(Sequence::from_bool(haystack.starts_with(&prefix)))
}

/// `fn:substring` counts characters from 1 and rounds its numeric
/// arguments, with the usual NaN/infinity edge cases.
pub(crate) fn substring<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = string_arg(&args[0])?;
    let chars: Vec<char> = input.chars().collect();
    let start = number_arg(&args[1])?.round();
    let end = match args.get(2) {
        Some(length) => start + number_arg(length)?.round(),
        None => f64::INFINITY,
    };
    if start.is_nan() || end.is_nan() {
        return str_result(String::new());
    }
    let result: String = chars
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let position = (*i + 1) as f64;
            position >= start && position < end
        })
        .map(|(_, c)| *c)
        .collect();
    str_result(result)
}

pub(crate) fn substring_before<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let haystack = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    match haystack.find(&needle) {
        Some(at) if !needle.is_empty() => str_result(haystack[..at].to_string()),
        _ => str_result(String::new()),
    }
}

pub(crate) fn substring_after<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let haystack = string_arg(&args[0])?;
    let needle = string_arg(&args[1])?;
    match haystack.find(&needle) {
        Some(at) if !needle.is_empty() => {
            str_result(haystack[at + needle.len()..].to_string())
        }
        _ => str_result(String::new()),
    }
}

pub(crate) fn string_length<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = arg_or_context(ctx, args)?;
    let value = string_arg(&input)?;
    Ok(Sequence::from_atomic(Atomic::integer(
        value.chars().count() as i64
    )))
}

pub(crate) fn normalize_space<N: Node>(
    ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = arg_or_context(ctx, args)?;
    let value = string_arg(&input)?;
    let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
    str_result(normalized)
}

pub(crate) fn translate<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let input = string_arg(&args[0])?;
    let from: Vec<char> = string_arg(&args[1])?.chars().collect();
    let to: Vec<char> = string_arg(&args[2])?.chars().collect();
    let result: String = input
        .chars()
        .filter_map(|c| match from.iter().position(|f| *f == c) {
            Some(at) => to.get(at).copied(),
            None => Some(c),
        })
        .collect();
    str_result(result)
}

pub(crate) fn string_join<N: Node>(
    _ctx: &CallCtx<'_, N>,
    args: &[Sequence<N>],
) -> Result<Sequence<N>> {
    let separator = match args.get(1) {
        Some(sep) => string_arg(sep)?,
        None => String::new(),
    };
    let parts: Vec<String> = args[0]
        .atomized()?
        .iter()
        .map(|a| a.into_canonical())
        .collect();
    str_result(parts.join(&separator))
}
