use ibig::IBig;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use xpq_ast::ast::{BinaryOp, UnaryOp};
use xpq_schema_type::Xs;

use crate::error::{Error, Result};

use super::cast::cast_to;
use super::{decimal_to_ibig, ibig_to_decimal, ibig_to_f64, Atomic};

/// Numeric coercion for arithmetic: numbers stay typed, booleans and
/// strings become doubles, non-numeric strings become NaN rather than an
/// error.
fn coerce_numeric(value: Atomic) -> Result<Atomic> {
    match value {
        Atomic::Decimal(_) | Atomic::Integer(_, _) | Atomic::Float(_) | Atomic::Double(_) => {
            Ok(value)
        }
        Atomic::Boolean(b) => Ok(Atomic::double(if b { 1.0 } else { 0.0 })),
        Atomic::String(_, _) | Atomic::Untyped(_) => Ok(Atomic::double(value.number_value())),
        _ => Err(Error::XPTY0004),
    }
}

fn rank(value: &Atomic) -> u8 {
    match value {
        Atomic::Integer(_, _) => 0,
        Atomic::Decimal(_) => 1,
        Atomic::Float(_) => 2,
        Atomic::Double(_) => 3,
        _ => 0,
    }
}

fn promote_to(value: Atomic, target_rank: u8) -> Result<Atomic> {
    let target = match target_rank {
        0 => Xs::Integer,
        1 => Xs::Decimal,
        2 => Xs::Float,
        _ => Xs::Double,
    };
    cast_to(&value, target, None)
}

/// Promote a pair of numeric operands along
/// `integer < decimal < float < double`.
pub(crate) fn promote_pair(a: Atomic, b: Atomic) -> Result<(Atomic, Atomic)> {
    let target = rank(&a).max(rank(&b));
    Ok((promote_to(a, target)?, promote_to(b, target)?))
}

/// Binary arithmetic over already-atomized operands.
pub fn arithmetic(op: BinaryOp, a: Atomic, b: Atomic) -> Result<Atomic> {
    let a = coerce_numeric(a)?;
    let b = coerce_numeric(b)?;
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => basic(op, a, b),
        BinaryOp::Div => divide(a, b),
        BinaryOp::IntDiv => integer_divide(a, b),
        BinaryOp::Mod => modulo(a, b),
        _ => Err(Error::XPTY0004),
    }
}

fn basic(op: BinaryOp, a: Atomic, b: Atomic) -> Result<Atomic> {
    let (a, b) = promote_pair(a, b)?;
    match (a, b) {
        (Atomic::Integer(_, x), Atomic::Integer(_, y)) => {
            let result = match op {
                BinaryOp::Add => &*x + &*y,
                BinaryOp::Sub => &*x - &*y,
                _ => &*x * &*y,
            };
            Ok(Atomic::integer(result))
        }
        (Atomic::Decimal(x), Atomic::Decimal(y)) => {
            let result = match op {
                BinaryOp::Add => x.checked_add(y),
                BinaryOp::Sub => x.checked_sub(y),
                _ => x.checked_mul(y),
            };
            result.map(Atomic::Decimal).ok_or(Error::FORG0001)
        }
        (Atomic::Float(x), Atomic::Float(y)) => {
            let result = match op {
                BinaryOp::Add => x.0 + y.0,
                BinaryOp::Sub => x.0 - y.0,
                _ => x.0 * y.0,
            };
            Ok(Atomic::Float(result.into()))
        }
        (Atomic::Double(x), Atomic::Double(y)) => {
            let result = match op {
                BinaryOp::Add => x.0 + y.0,
                BinaryOp::Sub => x.0 - y.0,
                _ => x.0 * y.0,
            };
            Ok(Atomic::double(result))
        }
        _ => Err(Error::XPTY0004),
    }
}

/// `div`: division by zero follows IEEE 754 by promoting to double, so
/// `1 div 0` is INF and `0 div 0` is NaN.
fn divide(a: Atomic, b: Atomic) -> Result<Atomic> {
    let (a, b) = promote_pair(a, b)?;
    match (&a, &b) {
        (Atomic::Integer(_, x), Atomic::Integer(_, y)) => {
            if **y == IBig::from(0) {
                return Ok(Atomic::double(ibig_to_f64(x) / 0.0));
            }
            let x = ibig_to_decimal(x)?;
            let y = ibig_to_decimal(y)?;
            x.checked_div(y).map(Atomic::Decimal).ok_or(Error::FORG0001)
        }
        (Atomic::Decimal(x), Atomic::Decimal(y)) => {
            if y.is_zero() {
                return Ok(Atomic::double(x.to_f64().unwrap_or(f64::NAN) / 0.0));
            }
            x.checked_div(*y).map(Atomic::Decimal).ok_or(Error::FORG0001)
        }
        (Atomic::Float(x), Atomic::Float(y)) => Ok(Atomic::Float((x.0 / y.0).into())),
        (Atomic::Double(x), Atomic::Double(y)) => Ok(Atomic::double(x.0 / y.0)),
        _ => Err(Error::XPTY0004),
    }
}

fn is_zero(value: &Atomic) -> bool {
    match value {
        Atomic::Integer(_, i) => **i == IBig::from(0),
        Atomic::Decimal(d) => d.is_zero(),
        Atomic::Float(f) => f.0 == 0.0,
        Atomic::Double(d) => d.0 == 0.0,
        _ => false,
    }
}

/// `idiv`: truncating division; division by zero is an error.
fn integer_divide(a: Atomic, b: Atomic) -> Result<Atomic> {
    if is_zero(&b) {
        return Err(Error::XPDY0002);
    }
    let (a, b) = promote_pair(a, b)?;
    let result: IBig = match (&a, &b) {
        (Atomic::Integer(_, x), Atomic::Integer(_, y)) => &**x / &**y,
        (Atomic::Decimal(x), Atomic::Decimal(y)) => {
            let quotient = x.checked_div(*y).ok_or(Error::FORG0001)?;
            decimal_to_ibig(&quotient)?
        }
        (Atomic::Float(x), Atomic::Float(y)) => {
            let quotient = (x.0 / y.0) as f64;
            if quotient.is_nan() || quotient.is_infinite() {
                return Err(Error::FORG0001);
            }
            super::cast::float_to_ibig(quotient)?
        }
        (Atomic::Double(x), Atomic::Double(y)) => {
            let quotient = x.0 / y.0;
            if quotient.is_nan() || quotient.is_infinite() {
                return Err(Error::FORG0001);
            }
            super::cast::float_to_ibig(quotient)?
        }
        _ => return Err(Error::XPTY0004),
    };
    Ok(Atomic::integer(result))
}

/// `mod`: the remainder takes the sign of the dividend; modulus zero is
/// an error.
fn modulo(a: Atomic, b: Atomic) -> Result<Atomic> {
    if is_zero(&b) {
        return Err(Error::XPDY0002);
    }
    let (a, b) = promote_pair(a, b)?;
    match (&a, &b) {
        (Atomic::Integer(_, x), Atomic::Integer(_, y)) => Ok(Atomic::integer(&**x % &**y)),
        (Atomic::Decimal(x), Atomic::Decimal(y)) => x
            .checked_rem(*y)
            .map(Atomic::Decimal)
            .ok_or(Error::FORG0001),
        (Atomic::Float(x), Atomic::Float(y)) => Ok(Atomic::Float((x.0 % y.0).into())),
        (Atomic::Double(x), Atomic::Double(y)) => Ok(Atomic::double(x.0 % y.0)),
        _ => Err(Error::XPTY0004),
    }
}

/// Unary sign: coerce to a number, then negate or pass through.
pub fn unary(op: UnaryOp, value: Atomic) -> Result<Atomic> {
    let value = coerce_numeric(value)?;
    match op {
        UnaryOp::Plus => Ok(value),
        UnaryOp::Minus => match value {
            Atomic::Integer(_, i) => Ok(Atomic::integer(-&*i)),
            Atomic::Decimal(d) => Ok(Atomic::Decimal(-d)),
            Atomic::Float(f) => Ok(Atomic::Float((-f.0).into())),
            Atomic::Double(d) => Ok(Atomic::double(-d.0)),
            _ => Err(Error::XPTY0004),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(i: i64) -> Atomic {
        Atomic::integer(i)
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(
            arithmetic(BinaryOp::Add, int(2), int(3)).unwrap(),
            int(5)
        );
        assert_eq!(
            arithmetic(BinaryOp::Mul, int(4), int(5)).unwrap(),
            int(20)
        );
    }

    #[test]
    fn test_integer_div_produces_decimal() {
        assert_eq!(
            arithmetic(BinaryOp::Div, int(1), int(2)).unwrap(),
            Atomic::Decimal("0.5".parse::<Decimal>().unwrap())
        );
    }

    #[test]
    fn test_promotion_ladder() {
        assert_eq!(
            arithmetic(BinaryOp::Add, int(1), Atomic::double(0.5)).unwrap(),
            Atomic::double(1.5)
        );
        assert_eq!(
            arithmetic(
                BinaryOp::Add,
                Atomic::Decimal(Decimal::ONE),
                Atomic::Float(2.0f32.into())
            )
            .unwrap(),
            Atomic::Float(3.0f32.into())
        );
    }

    #[test]
    fn test_non_numeric_string_is_nan() {
        let result = arithmetic(BinaryOp::Add, Atomic::string("pear"), int(1)).unwrap();
        assert!(result.is_nan());
    }

    #[test]
    fn test_div_by_zero_is_ieee() {
        assert_eq!(
            arithmetic(BinaryOp::Div, int(1), int(0)).unwrap(),
            Atomic::double(f64::INFINITY)
        );
        assert_eq!(
            arithmetic(BinaryOp::Div, int(-1), int(0)).unwrap(),
            Atomic::double(f64::NEG_INFINITY)
        );
        assert!(arithmetic(BinaryOp::Div, int(0), int(0)).unwrap().is_nan());
    }

    #[test]
    fn test_idiv_and_mod_by_zero_raise() {
        assert_eq!(
            arithmetic(BinaryOp::IntDiv, int(1), int(0)),
            Err(Error::XPDY0002)
        );
        assert_eq!(
            arithmetic(BinaryOp::Mod, int(1), int(0)),
            Err(Error::XPDY0002)
        );
    }

    #[test]
    fn test_idiv_truncates() {
        assert_eq!(
            arithmetic(BinaryOp::IntDiv, int(7), int(2)).unwrap(),
            int(3)
        );
        assert_eq!(
            arithmetic(BinaryOp::IntDiv, int(-7), int(2)).unwrap(),
            int(-3)
        );
        assert_eq!(
            arithmetic(BinaryOp::IntDiv, Atomic::double(7.5), int(2)).unwrap(),
            int(3)
        );
    }

    #[test]
    fn test_mod_sign_follows_dividend() {
        assert_eq!(arithmetic(BinaryOp::Mod, int(7), int(3)).unwrap(), int(1));
        assert_eq!(
            arithmetic(BinaryOp::Mod, int(-7), int(3)).unwrap(),
            int(-1)
        );
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Minus, int(5)).unwrap(), int(-5));
        assert_eq!(
            unary(UnaryOp::Plus, Atomic::string("3")).unwrap(),
            Atomic::double(3.0)
        );
        assert!(unary(UnaryOp::Minus, Atomic::string("x")).unwrap().is_nan());
    }
}
