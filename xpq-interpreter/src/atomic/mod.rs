//! Atomic values: the value side of the type registry.
//!
//! Casting, arithmetic and comparison live in the sibling modules; the
//! type lattice itself is `xpq_schema_type::Xs`.

mod cast;
mod compare;
mod datetime;
mod ops;

pub use cast::cast_to;
pub use compare::{general_compare, value_compare};
pub use datetime::{
    DateTimeValue, DateValue, Duration, GDay, GMonth, GMonthDay, GYear, GYearMonth, TimeValue,
};
pub use ops::{arithmetic, unary};

use std::rc::Rc;

use ibig::IBig;
use ordered_float::OrderedFloat;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use xpq_name::Name;
use xpq_schema_type::Xs;

use crate::error::{Error, Result};

/// The string-family tags an [`Atomic::String`] can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringType {
    /// xs:string
    String,
    /// xs:anyURI; accepted without RFC validation, round-trips as a string
    AnyURI,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerType {
    Integer,
    NonPositiveInteger,
    NegativeInteger,
    NonNegativeInteger,
    PositiveInteger,
    Long,
    Int,
    Short,
    Byte,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
}

impl IntegerType {
    pub fn schema_type(&self) -> Xs {
        match self {
            IntegerType::Integer => Xs::Integer,
            IntegerType::NonPositiveInteger => Xs::NonPositiveInteger,
            IntegerType::NegativeInteger => Xs::NegativeInteger,
            IntegerType::NonNegativeInteger => Xs::NonNegativeInteger,
            IntegerType::PositiveInteger => Xs::PositiveInteger,
            IntegerType::Long => Xs::Long,
            IntegerType::Int => Xs::Int,
            IntegerType::Short => Xs::Short,
            IntegerType::Byte => Xs::Byte,
            IntegerType::UnsignedLong => Xs::UnsignedLong,
            IntegerType::UnsignedInt => Xs::UnsignedInt,
            IntegerType::UnsignedShort => Xs::UnsignedShort,
            IntegerType::UnsignedByte => Xs::UnsignedByte,
        }
    }

    pub(crate) fn from_schema_type(xs: Xs) -> Option<IntegerType> {
        let ty = match xs {
            Xs::Integer => IntegerType::Integer,
            Xs::NonPositiveInteger => IntegerType::NonPositiveInteger,
            Xs::NegativeInteger => IntegerType::NegativeInteger,
            Xs::NonNegativeInteger => IntegerType::NonNegativeInteger,
            Xs::PositiveInteger => IntegerType::PositiveInteger,
            Xs::Long => IntegerType::Long,
            Xs::Int => IntegerType::Int,
            Xs::Short => IntegerType::Short,
            Xs::Byte => IntegerType::Byte,
            Xs::UnsignedLong => IntegerType::UnsignedLong,
            Xs::UnsignedInt => IntegerType::UnsignedInt,
            Xs::UnsignedShort => IntegerType::UnsignedShort,
            Xs::UnsignedByte => IntegerType::UnsignedByte,
            _ => return None,
        };
        Some(ty)
    }

    /// The inclusive bounds of this type, where it has them.
    pub(crate) fn bounds(&self) -> (Option<IBig>, Option<IBig>) {
        match self {
            IntegerType::Integer => (None, None),
            IntegerType::NonPositiveInteger => (None, Some(IBig::from(0))),
            IntegerType::NegativeInteger => (None, Some(IBig::from(-1))),
            IntegerType::NonNegativeInteger => (Some(IBig::from(0)), None),
            IntegerType::PositiveInteger => (Some(IBig::from(1)), None),
            IntegerType::Long => (Some(IBig::from(i64::MIN)), Some(IBig::from(i64::MAX))),
            IntegerType::Int => (Some(IBig::from(i32::MIN)), Some(IBig::from(i32::MAX))),
            IntegerType::Short => (Some(IBig::from(i16::MIN)), Some(IBig::from(i16::MAX))),
            IntegerType::Byte => (Some(IBig::from(i8::MIN)), Some(IBig::from(i8::MAX))),
            IntegerType::UnsignedLong => (Some(IBig::from(0u8)), Some(IBig::from(u64::MAX))),
            IntegerType::UnsignedInt => (Some(IBig::from(0u8)), Some(IBig::from(u32::MAX))),
            IntegerType::UnsignedShort => (Some(IBig::from(0u8)), Some(IBig::from(u16::MAX))),
            IntegerType::UnsignedByte => (Some(IBig::from(0u8)), Some(IBig::from(u8::MAX))),
        }
    }

    pub(crate) fn contains(&self, value: &IBig) -> bool {
        let (min, max) = self.bounds();
        if let Some(min) = min {
            if value < &min {
                return false;
            }
        }
        if let Some(max) = max {
            if value > &max {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryType {
    /// xs:hexBinary; canonical form upper-cased
    Hex,
    /// xs:base64Binary
    Base64,
}

impl BinaryType {
    pub fn schema_type(&self) -> Xs {
        match self {
            BinaryType::Hex => Xs::HexBinary,
            BinaryType::Base64 => Xs::Base64Binary,
        }
    }
}

/// A single atomic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Atomic {
    String(StringType, Rc<String>),
    Untyped(Rc<String>),
    Boolean(bool),
    Decimal(Decimal),
    Integer(IntegerType, Rc<IBig>),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Duration(Rc<Duration>),
    DateTime(Rc<DateTimeValue>),
    Date(Rc<DateValue>),
    Time(Rc<TimeValue>),
    GYearMonth(Rc<GYearMonth>),
    GYear(Rc<GYear>),
    GMonthDay(Rc<GMonthDay>),
    GDay(Rc<GDay>),
    GMonth(Rc<GMonth>),
    Binary(BinaryType, Rc<Vec<u8>>),
    QName(Rc<Name>),
}

impl Atomic {
    pub fn string(s: impl Into<String>) -> Atomic {
        Atomic::String(StringType::String, Rc::new(s.into()))
    }

    pub fn untyped(s: impl Into<String>) -> Atomic {
        Atomic::Untyped(Rc::new(s.into()))
    }

    pub fn integer(i: impl Into<IBig>) -> Atomic {
        Atomic::Integer(IntegerType::Integer, Rc::new(i.into()))
    }

    pub fn double(d: f64) -> Atomic {
        Atomic::Double(OrderedFloat(d))
    }

    pub fn schema_type(&self) -> Xs {
        match self {
            Atomic::String(StringType::String, _) => Xs::String,
            Atomic::String(StringType::AnyURI, _) => Xs::AnyURI,
            Atomic::Untyped(_) => Xs::UntypedAtomic,
            Atomic::Boolean(_) => Xs::Boolean,
            Atomic::Decimal(_) => Xs::Decimal,
            Atomic::Integer(ty, _) => ty.schema_type(),
            Atomic::Float(_) => Xs::Float,
            Atomic::Double(_) => Xs::Double,
            Atomic::Duration(_) => Xs::Duration,
            Atomic::DateTime(_) => Xs::DateTime,
            Atomic::Date(_) => Xs::Date,
            Atomic::Time(_) => Xs::Time,
            Atomic::GYearMonth(_) => Xs::GYearMonth,
            Atomic::GYear(_) => Xs::GYear,
            Atomic::GMonthDay(_) => Xs::GMonthDay,
            Atomic::GDay(_) => Xs::GDay,
            Atomic::GMonth(_) => Xs::GMonth,
            Atomic::Binary(ty, _) => ty.schema_type(),
            Atomic::QName(_) => Xs::QName,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Atomic::Decimal(_) | Atomic::Integer(_, _) | Atomic::Float(_) | Atomic::Double(_)
        )
    }

    pub fn is_nan(&self) -> bool {
        match self {
            Atomic::Float(f) => f.0.is_nan(),
            Atomic::Double(d) => d.0.is_nan(),
            _ => false,
        }
    }

    /// Whether this value is an instance of the given atomic type,
    /// honoring derivation.
    pub fn is_instance_of(&self, xs: Xs) -> bool {
        self.schema_type().derives_from(xs)
    }

    /// The lexical (canonical) form.
    pub fn into_canonical(&self) -> String {
        match self {
            Atomic::String(_, s) | Atomic::Untyped(s) => s.to_string(),
            Atomic::Boolean(b) => b.to_string(),
            Atomic::Decimal(d) => canonical_decimal(d),
            Atomic::Integer(_, i) => i.to_string(),
            Atomic::Float(f) => canonical_double(f.0 as f64),
            Atomic::Double(d) => canonical_double(d.0),
            Atomic::Duration(d) => d.to_string(),
            Atomic::DateTime(dt) => dt.to_string(),
            Atomic::Date(d) => d.to_string(),
            Atomic::Time(t) => t.to_string(),
            Atomic::GYearMonth(g) => g.to_string(),
            Atomic::GYear(g) => g.to_string(),
            Atomic::GMonthDay(g) => g.to_string(),
            Atomic::GDay(g) => g.to_string(),
            Atomic::GMonth(g) => g.to_string(),
            Atomic::Binary(BinaryType::Hex, bytes) => {
                let mut s = String::with_capacity(bytes.len() * 2);
                for byte in bytes.iter() {
                    s.push_str(&format!("{:02X}", byte));
                }
                s
            }
            Atomic::Binary(BinaryType::Base64, bytes) => {
                use base64::Engine as _;
                base64::engine::general_purpose::STANDARD.encode(bytes.as_slice())
            }
            Atomic::QName(name) => name.to_string(),
        }
    }

    /// Numeric coercion in the style of `fn:number`: never fails,
    /// unparseable input becomes NaN.
    pub fn number_value(&self) -> f64 {
        match self {
            Atomic::String(_, s) | Atomic::Untyped(s) => {
                s.trim().parse::<f64>().unwrap_or(f64::NAN)
            }
            Atomic::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Atomic::Decimal(d) => d.to_f64().unwrap_or(f64::NAN),
            Atomic::Integer(_, i) => ibig_to_f64(i),
            Atomic::Float(f) => f.0 as f64,
            Atomic::Double(d) => d.0,
            _ => f64::NAN,
        }
    }

    /// The effective boolean value of a single atomic item.
    pub fn effective_boolean_value(&self) -> Result<bool> {
        match self {
            Atomic::Boolean(b) => Ok(*b),
            Atomic::String(_, s) | Atomic::Untyped(s) => Ok(!s.is_empty()),
            Atomic::Decimal(d) => Ok(!d.is_zero()),
            Atomic::Integer(_, i) => Ok(**i != IBig::from(0)),
            Atomic::Float(f) => Ok(f.0 != 0.0 && !f.0.is_nan()),
            Atomic::Double(d) => Ok(d.0 != 0.0 && !d.0.is_nan()),
            _ => Err(Error::FORG0006),
        }
    }
}

/// Structural validation: whether a value's content fits the target type,
/// regardless of its dynamic type tag.
///
/// Decimal accepts finite numbers only; float and double also accept the
/// infinities and NaN; the integer family accepts whole numbers within
/// the declared bounds. Everything else validates by castability.
pub fn validate(value: &Atomic, target: Xs) -> bool {
    if let Some(integer_type) = IntegerType::from_schema_type(target) {
        return match value {
            Atomic::Integer(_, i) => integer_type.contains(i),
            Atomic::Decimal(d) => {
                d.fract().is_zero()
                    && decimal_to_ibig(d)
                        .map(|i| integer_type.contains(&i))
                        .unwrap_or(false)
            }
            Atomic::Float(_) | Atomic::Double(_) => {
                let v = value.number_value();
                v.is_finite()
                    && v.trunc() == v
                    && cast::cast_to(value, target, None).is_ok()
            }
            Atomic::String(_, _) | Atomic::Untyped(_) => {
                cast::cast_to(value, target, None).is_ok()
            }
            _ => false,
        };
    }
    match target {
        Xs::Decimal => match value {
            Atomic::Decimal(_) | Atomic::Integer(_, _) => true,
            Atomic::Float(_) | Atomic::Double(_) => value.number_value().is_finite(),
            Atomic::String(_, _) | Atomic::Untyped(_) => {
                cast::cast_to(value, target, None).is_ok()
            }
            _ => false,
        },
        Xs::Float | Xs::Double => match value {
            Atomic::Decimal(_) | Atomic::Integer(_, _) | Atomic::Float(_) | Atomic::Double(_) => {
                true
            }
            Atomic::String(_, _) | Atomic::Untyped(_) => {
                cast::cast_to(value, target, None).is_ok()
            }
            _ => false,
        },
        _ => value.is_instance_of(target) || cast::cast_to(value, target, None).is_ok(),
    }
}

pub(crate) fn ibig_to_f64(i: &IBig) -> f64 {
    i.to_string().parse::<f64>().unwrap_or(f64::NAN)
}

pub(crate) fn ibig_to_decimal(i: &IBig) -> Result<Decimal> {
    i.to_string().parse::<Decimal>().map_err(|_| Error::FORG0001)
}

pub(crate) fn decimal_to_ibig(d: &Decimal) -> Result<IBig> {
    let truncated = d.trunc();
    truncated
        .normalize()
        .to_string()
        .parse::<IBig>()
        .map_err(|_| Error::FORG0001)
}

fn canonical_decimal(d: &Decimal) -> String {
    let normalized = d.normalize();
    normalized.to_string()
}

fn canonical_double(d: f64) -> String {
    if d.is_nan() {
        "NaN".to_string()
    } else if d.is_infinite() {
        if d > 0.0 {
            "INF".to_string()
        } else {
            "-INF".to_string()
        }
    } else if d == d.trunc() && d.abs() < 1e15 {
        format!("{}", d as i64)
    } else {
        format!("{}", d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Atomic::Boolean(true).into_canonical(), "true");
        assert_eq!(Atomic::integer(42).into_canonical(), "42");
        assert_eq!(Atomic::double(2.5).into_canonical(), "2.5");
        assert_eq!(Atomic::double(3.0).into_canonical(), "3");
        assert_eq!(Atomic::double(f64::NAN).into_canonical(), "NaN");
        assert_eq!(Atomic::double(f64::INFINITY).into_canonical(), "INF");
        assert_eq!(Atomic::double(f64::NEG_INFINITY).into_canonical(), "-INF");
        assert_eq!(
            Atomic::Binary(BinaryType::Hex, Rc::new(vec![0xab, 0x01])).into_canonical(),
            "AB01"
        );
    }

    #[test]
    fn test_number_value_never_fails() {
        assert_eq!(Atomic::string("12").number_value(), 12.0);
        assert!(Atomic::string("pear").number_value().is_nan());
        assert_eq!(Atomic::Boolean(true).number_value(), 1.0);
    }

    #[test]
    fn test_integer_bounds() {
        assert!(IntegerType::Byte.contains(&IBig::from(127)));
        assert!(!IntegerType::Byte.contains(&IBig::from(128)));
        assert!(IntegerType::UnsignedLong.contains(&IBig::from(u64::MAX)));
        assert!(!IntegerType::UnsignedLong.contains(&IBig::from(-1)));
        assert!(!IntegerType::PositiveInteger.contains(&IBig::from(0)));
        assert!(IntegerType::NonPositiveInteger.contains(&IBig::from(0)));
    }

    #[test]
    fn test_instance_of_derivation() {
        assert!(Atomic::integer(1).is_instance_of(Xs::Decimal));
        assert!(Atomic::integer(1).is_instance_of(Xs::AnyAtomicType));
        assert!(!Atomic::Decimal(Decimal::ONE).is_instance_of(Xs::Integer));
    }

    #[test]
    fn test_validate_structural() {
        // integer validation rejects fractional values
        assert!(validate(&Atomic::integer(3), Xs::Integer));
        assert!(validate(&Atomic::Decimal("3.0".parse().unwrap()), Xs::Integer));
        assert!(!validate(&Atomic::Decimal("3.5".parse().unwrap()), Xs::Integer));
        assert!(!validate(&Atomic::double(f64::NAN), Xs::Integer));
        // decimal accepts finite numbers only
        assert!(validate(&Atomic::double(1.5), Xs::Decimal));
        assert!(!validate(&Atomic::double(f64::INFINITY), Xs::Decimal));
        // float and double accept the infinities and NaN
        assert!(validate(&Atomic::double(f64::INFINITY), Xs::Double));
        assert!(validate(&Atomic::double(f64::NAN), Xs::Float));
        // derived integer bounds apply
        assert!(validate(&Atomic::integer(255), Xs::UnsignedByte));
        assert!(!validate(&Atomic::integer(256), Xs::UnsignedByte));
        // other types validate by castability
        assert!(validate(&Atomic::string("true"), Xs::Boolean));
        assert!(!validate(&Atomic::string("yes"), Xs::Boolean));
    }

    #[test]
    fn test_ebv() {
        assert!(!Atomic::string("").effective_boolean_value().unwrap());
        assert!(Atomic::string("x").effective_boolean_value().unwrap());
        assert!(!Atomic::double(f64::NAN).effective_boolean_value().unwrap());
        assert!(Atomic::Duration(Rc::new(Duration::parse("P1Y").unwrap()))
            .effective_boolean_value()
            .is_err());
    }
}
