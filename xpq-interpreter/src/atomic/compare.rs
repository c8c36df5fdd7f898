use std::cmp::Ordering;

use ibig::IBig;

use xpq_ast::ast::BinaryOp;

use crate::error::{Error, Result};

use super::ops::promote_pair;
use super::{Atomic, StringType};

fn apply(op: BinaryOp, ordering: Ordering) -> bool {
    match op {
        BinaryOp::ValueEq | BinaryOp::GenEq => ordering == Ordering::Equal,
        BinaryOp::ValueNe | BinaryOp::GenNe => ordering != Ordering::Equal,
        BinaryOp::ValueLt | BinaryOp::GenLt => ordering == Ordering::Less,
        BinaryOp::ValueLe | BinaryOp::GenLe => ordering != Ordering::Greater,
        BinaryOp::ValueGt | BinaryOp::GenGt => ordering == Ordering::Greater,
        BinaryOp::ValueGe | BinaryOp::GenGe => ordering != Ordering::Less,
        _ => false,
    }
}

fn apply_float(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::ValueEq | BinaryOp::GenEq => a == b,
        BinaryOp::ValueNe | BinaryOp::GenNe => a != b,
        BinaryOp::ValueLt | BinaryOp::GenLt => a < b,
        BinaryOp::ValueLe | BinaryOp::GenLe => a <= b,
        BinaryOp::ValueGt | BinaryOp::GenGt => a > b,
        BinaryOp::ValueGe | BinaryOp::GenGe => a >= b,
        _ => false,
    }
}

fn is_equality(op: BinaryOp) -> bool {
    matches!(
        op,
        BinaryOp::ValueEq | BinaryOp::ValueNe | BinaryOp::GenEq | BinaryOp::GenNe
    )
}

/// A value comparison (`eq`, `ne`, `lt`, `le`, `gt`, `ge`) of two single
/// atomic values. Operands must be type compatible; untyped values
/// compare as strings.
pub fn value_compare(op: BinaryOp, a: Atomic, b: Atomic) -> Result<bool> {
    let a = untyped_to_string(a);
    let b = untyped_to_string(b);
    if a.is_numeric() && b.is_numeric() {
        let (a, b) = promote_pair(a, b)?;
        return match (&a, &b) {
            (Atomic::Integer(_, x), Atomic::Integer(_, y)) => {
                Ok(apply(op, (**x).cmp(&**y)))
            }
            (Atomic::Decimal(x), Atomic::Decimal(y)) => Ok(apply(op, x.cmp(y))),
            (Atomic::Float(x), Atomic::Float(y)) => {
                Ok(apply_float(op, x.0 as f64, y.0 as f64))
            }
            (Atomic::Double(x), Atomic::Double(y)) => Ok(apply_float(op, x.0, y.0)),
            _ => Err(Error::XPTY0004),
        };
    }
    match (&a, &b) {
        (Atomic::String(_, x), Atomic::String(_, y)) => Ok(apply(op, x.cmp(y))),
        (Atomic::Boolean(x), Atomic::Boolean(y)) => Ok(apply(op, x.cmp(y))),
        (Atomic::DateTime(x), Atomic::DateTime(y)) => Ok(apply(op, x.compare(y))),
        (Atomic::Date(x), Atomic::Date(y)) => Ok(apply(op, x.compare(y))),
        (Atomic::Time(x), Atomic::Time(y)) => Ok(apply(op, x.compare(y))),
        (Atomic::Duration(x), Atomic::Duration(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::QName(x), Atomic::QName(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::Binary(_, x), Atomic::Binary(_, y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::GYearMonth(x), Atomic::GYearMonth(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::GYear(x), Atomic::GYear(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::GMonthDay(x), Atomic::GMonthDay(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::GDay(x), Atomic::GDay(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        (Atomic::GMonth(x), Atomic::GMonth(y)) if is_equality(op) => {
            Ok(apply(op, if x == y { Ordering::Equal } else { Ordering::Less }))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn untyped_to_string(value: Atomic) -> Atomic {
    match value {
        Atomic::Untyped(s) => Atomic::String(StringType::String, s),
        other => other,
    }
}

/// One pair of a general comparison: numeric when either side is
/// numeric, boolean against boolean, otherwise by string value.
pub fn general_compare(op: BinaryOp, a: &Atomic, b: &Atomic) -> Result<bool> {
    if a.is_numeric() || b.is_numeric() {
        return Ok(apply_float(op, a.number_value(), b.number_value()));
    }
    if let (Atomic::Boolean(x), Atomic::Boolean(y)) = (a, b) {
        return Ok(apply(op, x.cmp(y)));
    }
    Ok(apply(op, a.into_canonical().cmp(&b.into_canonical())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::DateTimeValue;
    use std::rc::Rc;

    #[test]
    fn test_value_compare_numeric() {
        assert!(value_compare(BinaryOp::ValueLt, Atomic::integer(1), Atomic::double(1.5)).unwrap());
        assert!(value_compare(BinaryOp::ValueEq, Atomic::integer(2), Atomic::integer(2)).unwrap());
        // NaN compares false, except through ne
        let nan = Atomic::double(f64::NAN);
        assert!(!value_compare(BinaryOp::ValueEq, nan.clone(), nan.clone()).unwrap());
        assert!(value_compare(BinaryOp::ValueNe, nan.clone(), nan).unwrap());
    }

    #[test]
    fn test_value_compare_untyped_as_string() {
        assert!(value_compare(
            BinaryOp::ValueEq,
            Atomic::untyped("abc"),
            Atomic::string("abc")
        )
        .unwrap());
    }

    #[test]
    fn test_value_compare_incompatible() {
        assert_eq!(
            value_compare(BinaryOp::ValueEq, Atomic::string("1"), Atomic::Boolean(true)),
            Err(Error::XPTY0004)
        );
    }

    #[test]
    fn test_value_compare_temporal() {
        let a = Atomic::DateTime(Rc::new(DateTimeValue::parse("2024-01-01T00:00:00Z").unwrap()));
        let b = Atomic::DateTime(Rc::new(
            DateTimeValue::parse("2024-01-01T01:00:00+01:00").unwrap(),
        ));
        assert!(value_compare(BinaryOp::ValueEq, a, b).unwrap());
    }

    #[test]
    fn test_general_compare_coercion() {
        // numeric when either side is numeric
        assert!(general_compare(BinaryOp::GenEq, &Atomic::string("2"), &Atomic::integer(2)).unwrap());
        // string when neither is
        assert!(general_compare(BinaryOp::GenLt, &Atomic::string("a"), &Atomic::string("b")).unwrap());
        assert!(
            !general_compare(BinaryOp::GenEq, &Atomic::string("x"), &Atomic::integer(2)).unwrap()
        );
    }

    #[test]
    fn test_value_compare_big_integers() {
        let big = IBig::from(u64::MAX);
        assert!(value_compare(
            BinaryOp::ValueGt,
            Atomic::integer(big),
            Atomic::integer(1)
        )
        .unwrap());
    }
}
