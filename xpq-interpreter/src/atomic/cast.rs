use std::rc::Rc;

use base64::Engine as _;
use chrono::Datelike;
use ibig::IBig;
use ordered_float::OrderedFloat;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use xpq_name::{Name, NamespaceLookup};
use xpq_schema_type::Xs;

use crate::error::{Error, Result};

use super::datetime::{
    date_of, time_of, DateTimeValue, DateValue, Duration, GDay, GMonth, GMonthDay, GYear,
    GYearMonth, TimeValue,
};
use super::{decimal_to_ibig, ibig_to_decimal, Atomic, BinaryType, IntegerType, StringType};

/// Cast a value to the target atomic type.
///
/// A total function: it either returns a value of the target type or
/// raises `XPTY0004` (source type not castable) / `FORG0001` (lexical or
/// range failure). The namespace lookup is consulted for `xs:QName`
/// targets; without one, prefixed names stay unresolved.
pub fn cast_to(
    value: &Atomic,
    target: Xs,
    namespaces: Option<&dyn NamespaceLookup>,
) -> Result<Atomic> {
    if let Some(integer_type) = IntegerType::from_schema_type(target) {
        return cast_to_integer(value, integer_type);
    }
    match target {
        Xs::String => Ok(Atomic::String(
            StringType::String,
            Rc::new(value.into_canonical()),
        )),
        Xs::AnyURI => cast_to_any_uri(value),
        Xs::UntypedAtomic | Xs::AnyAtomicType => {
            Ok(Atomic::Untyped(Rc::new(value.into_canonical())))
        }
        Xs::Boolean => cast_to_boolean(value),
        Xs::Decimal => cast_to_decimal(value),
        Xs::Float => cast_to_float(value),
        Xs::Double => cast_to_double(value),
        Xs::Duration => cast_to_duration(value),
        Xs::DateTime => cast_to_date_time(value),
        Xs::Date => cast_to_date(value),
        Xs::Time => cast_to_time(value),
        Xs::GYearMonth => cast_to_g_year_month(value),
        Xs::GYear => cast_to_g_year(value),
        Xs::GMonthDay => cast_to_g_month_day(value),
        Xs::GDay => cast_to_g_day(value),
        Xs::GMonth => cast_to_g_month(value),
        Xs::HexBinary => cast_to_binary(value, BinaryType::Hex),
        Xs::Base64Binary => cast_to_binary(value, BinaryType::Base64),
        Xs::QName => cast_to_qname(value, namespaces),
        _ => Err(Error::XPTY0004),
    }
}

fn lexical(value: &Atomic) -> Option<&str> {
    match value {
        Atomic::String(_, s) | Atomic::Untyped(s) => Some(s.as_str()),
        _ => None,
    }
}

fn cast_to_any_uri(value: &Atomic) -> Result<Atomic> {
    // any string is accepted, no RFC validation
    match value {
        Atomic::String(_, s) | Atomic::Untyped(s) => Ok(Atomic::String(
            StringType::AnyURI,
            Rc::new(s.trim().to_string()),
        )),
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_boolean(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Boolean(_) => Ok(value.clone()),
        Atomic::Decimal(d) => Ok(Atomic::Boolean(!d.is_zero())),
        Atomic::Integer(_, i) => Ok(Atomic::Boolean(**i != IBig::from(0))),
        Atomic::Float(f) => Ok(Atomic::Boolean(f.0 != 0.0 && !f.0.is_nan())),
        Atomic::Double(d) => Ok(Atomic::Boolean(d.0 != 0.0 && !d.0.is_nan())),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
                Ok(Atomic::Boolean(true))
            } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
                Ok(Atomic::Boolean(false))
            } else {
                Err(Error::FORG0001)
            }
        }
        _ => Err(Error::XPTY0004),
    }
}

fn parse_double_lexical(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    match trimmed {
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        "NaN" => return Ok(f64::NAN),
        _ => {}
    }
    // reject the Rust-only spellings before falling back to the float parser
    let lower = trimmed.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return Err(Error::FORG0001);
    }
    trimmed.parse::<f64>().map_err(|_| Error::FORG0001)
}

fn cast_to_decimal(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Decimal(_) => Ok(value.clone()),
        Atomic::Integer(_, i) => Ok(Atomic::Decimal(ibig_to_decimal(i)?)),
        Atomic::Boolean(b) => Ok(Atomic::Decimal(if *b { Decimal::ONE } else { Decimal::ZERO })),
        Atomic::Float(f) => {
            let v = f.0 as f64;
            if v.is_nan() || v.is_infinite() {
                return Err(Error::FORG0001);
            }
            Decimal::from_f64(v).map(Atomic::Decimal).ok_or(Error::FORG0001)
        }
        Atomic::Double(d) => {
            if d.0.is_nan() || d.0.is_infinite() {
                return Err(Error::FORG0001);
            }
            Decimal::from_f64(d.0).map(Atomic::Decimal).ok_or(Error::FORG0001)
        }
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            // no exponent in the decimal lexical space
            s.trim().parse::<Decimal>()
                .map(Atomic::Decimal)
                .map_err(|_| Error::FORG0001)
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_float(value: &Atomic) -> Result<Atomic> {
    let double = cast_to_double(value)?;
    match double {
        Atomic::Double(d) => Ok(Atomic::Float(OrderedFloat(d.0 as f32))),
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_double(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Double(_) => Ok(value.clone()),
        Atomic::Float(f) => Ok(Atomic::double(f.0 as f64)),
        Atomic::Decimal(d) => Ok(Atomic::double(d.to_f64().ok_or(Error::FORG0001)?)),
        Atomic::Integer(_, i) => Ok(Atomic::double(super::ibig_to_f64(i))),
        Atomic::Boolean(b) => Ok(Atomic::double(if *b { 1.0 } else { 0.0 })),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            parse_double_lexical(s).map(Atomic::double)
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_integer(value: &Atomic, target: IntegerType) -> Result<Atomic> {
    let integer: IBig = match value {
        Atomic::Integer(_, i) => (**i).clone(),
        Atomic::Decimal(d) => decimal_to_ibig(d)?,
        Atomic::Float(f) => float_to_ibig(f.0 as f64)?,
        Atomic::Double(d) => float_to_ibig(d.0)?,
        Atomic::Boolean(b) => IBig::from(if *b { 1 } else { 0 }),
        Atomic::String(_, s) | Atomic::Untyped(s) => parse_integer_lexical(s)?,
        _ => return Err(Error::XPTY0004),
    };
    if !target.contains(&integer) {
        return Err(Error::FORG0001);
    }
    Ok(Atomic::Integer(target, Rc::new(integer)))
}

/// Truncation toward zero; NaN and the infinities are not integers.
pub(crate) fn float_to_ibig(v: f64) -> Result<IBig> {
    if v.is_nan() || v.is_infinite() {
        return Err(Error::FORG0001);
    }
    format!("{:.0}", v.trunc())
        .parse::<IBig>()
        .map_err(|_| Error::FORG0001)
}

fn parse_integer_lexical(s: &str) -> Result<IBig> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix(['+', '-'])
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::FORG0001);
    }
    trimmed.parse::<IBig>().map_err(|_| Error::FORG0001)
}

fn cast_to_duration(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Duration(_) => Ok(value.clone()),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::Duration(Rc::new(Duration::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_date_time(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::DateTime(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::DateTime(Rc::new(d.to_date_time()))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::DateTime(Rc::new(DateTimeValue::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_date(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Date(_) => Ok(value.clone()),
        Atomic::DateTime(dt) => Ok(Atomic::Date(Rc::new(date_of(dt)))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::Date(Rc::new(DateValue::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_time(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::Time(_) => Ok(value.clone()),
        Atomic::DateTime(dt) => Ok(Atomic::Time(Rc::new(time_of(dt)))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::Time(Rc::new(TimeValue::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_g_year_month(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::GYearMonth(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::GYearMonth(Rc::new(GYearMonth {
            year: d.date.year(),
            month: d.date.month() as u8,
            offset: d.offset,
        }))),
        Atomic::DateTime(dt) => Ok(Atomic::GYearMonth(Rc::new(GYearMonth {
            year: dt.date_time.year(),
            month: dt.date_time.month() as u8,
            offset: dt.offset,
        }))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::GYearMonth(Rc::new(GYearMonth::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_g_year(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::GYear(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::GYear(Rc::new(GYear {
            year: d.date.year(),
            offset: d.offset,
        }))),
        Atomic::DateTime(dt) => Ok(Atomic::GYear(Rc::new(GYear {
            year: dt.date_time.year(),
            offset: dt.offset,
        }))),
        Atomic::String(_, s) | Atomic::Untyped(s) => Ok(Atomic::GYear(Rc::new(GYear::parse(s)?))),
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_g_month_day(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::GMonthDay(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::GMonthDay(Rc::new(GMonthDay {
            month: d.date.month() as u8,
            day: d.date.day() as u8,
            offset: d.offset,
        }))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::GMonthDay(Rc::new(GMonthDay::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_g_day(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::GDay(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::GDay(Rc::new(GDay {
            day: d.date.day() as u8,
            offset: d.offset,
        }))),
        Atomic::String(_, s) | Atomic::Untyped(s) => Ok(Atomic::GDay(Rc::new(GDay::parse(s)?))),
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_g_month(value: &Atomic) -> Result<Atomic> {
    match value {
        Atomic::GMonth(_) => Ok(value.clone()),
        Atomic::Date(d) => Ok(Atomic::GMonth(Rc::new(GMonth {
            month: d.date.month() as u8,
            offset: d.offset,
        }))),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            Ok(Atomic::GMonth(Rc::new(GMonth::parse(s)?)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn cast_to_binary(value: &Atomic, target: BinaryType) -> Result<Atomic> {
    match value {
        Atomic::Binary(_, bytes) => Ok(Atomic::Binary(target, bytes.clone())),
        Atomic::String(_, _) | Atomic::Untyped(_) => {
            let s = lexical(value).unwrap_or_default().trim().to_string();
            let bytes = match target {
                BinaryType::Hex => decode_hex(&s)?,
                BinaryType::Base64 => decode_base64(&s)?,
            };
            Ok(Atomic::Binary(target, Rc::new(bytes)))
        }
        _ => Err(Error::XPTY0004),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::FORG0001);
    }
    let mut bytes = Vec::with_capacity(s.len() / 2);
    for chunk in s.as_bytes().chunks(2) {
        let hex = std::str::from_utf8(chunk).map_err(|_| Error::FORG0001)?;
        bytes.push(u8::from_str_radix(hex, 16).map_err(|_| Error::FORG0001)?);
    }
    Ok(bytes)
}

fn decode_base64(s: &str) -> Result<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 4 != 0 {
        return Err(Error::FORG0001);
    }
    base64::engine::general_purpose::STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| Error::FORG0001)
}

fn is_ncname(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '-' | '.' | '_' | '\u{b7}'))
}

fn cast_to_qname(value: &Atomic, namespaces: Option<&dyn NamespaceLookup>) -> Result<Atomic> {
    match value {
        Atomic::QName(_) => Ok(value.clone()),
        Atomic::String(_, s) | Atomic::Untyped(s) => {
            let trimmed = s.trim();
            match trimmed.split_once(':') {
                Some((prefix, local)) => {
                    if !is_ncname(prefix) || !is_ncname(local) {
                        return Err(Error::FORG0001);
                    }
                    match namespaces {
                        Some(namespaces) => match namespaces.by_prefix(prefix) {
                            Some(uri) => Ok(Atomic::QName(Rc::new(Name::new(
                                local.to_string(),
                                Some(uri.to_string()),
                                Some(prefix.to_string()),
                            )))),
                            // a prefix with no binding is an error
                            None => Err(Error::FORG0001),
                        },
                        // no resolver: keep the prefix, leave it unresolved
                        None => Ok(Atomic::QName(Rc::new(Name::new(
                            local.to_string(),
                            None,
                            Some(prefix.to_string()),
                        )))),
                    }
                }
                None => {
                    if !is_ncname(trimmed) {
                        return Err(Error::FORG0001);
                    }
                    Ok(Atomic::QName(Rc::new(Name::unprefixed(trimmed))))
                }
            }
        }
        _ => Err(Error::XPTY0004),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpq_name::Namespaces;

    fn str_value(s: &str) -> Atomic {
        Atomic::string(s)
    }

    #[test]
    fn test_boolean_lexical_rules() {
        for (input, expected) in [
            ("true", true),
            ("TRUE", true),
            (" 1 ", true),
            ("false", false),
            ("False", false),
            ("0", false),
        ] {
            assert_eq!(
                cast_to(&str_value(input), Xs::Boolean, None).unwrap(),
                Atomic::Boolean(expected),
                "casting {input:?}"
            );
        }
        assert_eq!(
            cast_to(&str_value("yes"), Xs::Boolean, None),
            Err(Error::FORG0001)
        );
    }

    #[test]
    fn test_numeric_from_boolean_and_number() {
        assert_eq!(
            cast_to(&Atomic::Boolean(true), Xs::Boolean, None).unwrap(),
            Atomic::Boolean(true)
        );
        assert_eq!(
            cast_to(&Atomic::double(0.0), Xs::Boolean, None).unwrap(),
            Atomic::Boolean(false)
        );
        assert_eq!(
            cast_to(&Atomic::double(f64::NAN), Xs::Boolean, None).unwrap(),
            Atomic::Boolean(false)
        );
        assert_eq!(
            cast_to(&Atomic::double(2.5), Xs::Boolean, None).unwrap(),
            Atomic::Boolean(true)
        );
    }

    #[test]
    fn test_double_lexical_space() {
        assert_eq!(
            cast_to(&str_value("INF"), Xs::Double, None).unwrap(),
            Atomic::double(f64::INFINITY)
        );
        assert_eq!(
            cast_to(&str_value("-INF"), Xs::Double, None).unwrap(),
            Atomic::double(f64::NEG_INFINITY)
        );
        assert!(matches!(
            cast_to(&str_value("NaN"), Xs::Double, None).unwrap(),
            Atomic::Double(d) if d.0.is_nan()
        ));
        assert_eq!(
            cast_to(&str_value(" 1.5e2 "), Xs::Double, None).unwrap(),
            Atomic::double(150.0)
        );
        // Rust-only spellings are not in the lexical space
        assert!(cast_to(&str_value("inf"), Xs::Double, None).is_err());
    }

    #[test]
    fn test_decimal_rejects_inf_nan_and_exponent() {
        assert!(cast_to(&str_value("INF"), Xs::Decimal, None).is_err());
        assert!(cast_to(&Atomic::double(f64::NAN), Xs::Decimal, None).is_err());
        assert!(cast_to(&str_value("1e3"), Xs::Decimal, None).is_err());
        assert_eq!(
            cast_to(&str_value(" 1.50 "), Xs::Decimal, None).unwrap(),
            Atomic::Decimal("1.50".parse::<Decimal>().unwrap())
        );
    }

    #[test]
    fn test_integer_truncates_toward_zero() {
        assert_eq!(
            cast_to(&Atomic::double(2.9), Xs::Integer, None).unwrap(),
            Atomic::integer(2)
        );
        assert_eq!(
            cast_to(&Atomic::double(-2.9), Xs::Integer, None).unwrap(),
            Atomic::integer(-2)
        );
        assert!(cast_to(&Atomic::double(f64::INFINITY), Xs::Integer, None).is_err());
        assert!(cast_to(&str_value("1.5"), Xs::Integer, None).is_err());
    }

    #[test]
    fn test_derived_integer_ranges() {
        assert!(cast_to(&Atomic::integer(127), Xs::Byte, None).is_ok());
        assert_eq!(
            cast_to(&Atomic::integer(128), Xs::Byte, None),
            Err(Error::FORG0001)
        );
        assert!(cast_to(&Atomic::integer(-1), Xs::UnsignedByte, None).is_err());
        assert!(cast_to(&Atomic::integer(0), Xs::PositiveInteger, None).is_err());
        assert!(cast_to(&Atomic::integer(1), Xs::PositiveInteger, None).is_ok());
        assert!(cast_to(&str_value("18446744073709551615"), Xs::UnsignedLong, None).is_ok());
        assert!(cast_to(&str_value("18446744073709551616"), Xs::UnsignedLong, None).is_err());
    }

    #[test]
    fn test_hex_binary_normalizes_upper() {
        let value = cast_to(&str_value("ab01"), Xs::HexBinary, None).unwrap();
        assert_eq!(value.into_canonical(), "AB01");
        assert!(cast_to(&str_value("abc"), Xs::HexBinary, None).is_err());
        assert!(cast_to(&str_value("zz"), Xs::HexBinary, None).is_err());
    }

    #[test]
    fn test_base64_binary() {
        let value = cast_to(&str_value("aGVsbG8="), Xs::Base64Binary, None).unwrap();
        match &value {
            Atomic::Binary(BinaryType::Base64, bytes) => {
                assert_eq!(bytes.as_slice(), b"hello")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(value.into_canonical(), "aGVsbG8=");
        assert!(cast_to(&str_value("abc"), Xs::Base64Binary, None).is_err());
        assert!(cast_to(&str_value("a!b="), Xs::Base64Binary, None).is_err());
    }

    #[test]
    fn test_qname_resolution() {
        let namespaces = Namespaces::default();
        let value = cast_to(&str_value("xs:integer"), Xs::QName, Some(&namespaces)).unwrap();
        match value {
            Atomic::QName(name) => {
                assert_eq!(name.local_name(), "integer");
                assert_eq!(name.namespace(), Some(Xs::namespace()));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(cast_to(&str_value("nope:x"), Xs::QName, Some(&namespaces)).is_err());
        // without a resolver the prefix stays unresolved
        let unresolved = cast_to(&str_value("p:x"), Xs::QName, None).unwrap();
        match unresolved {
            Atomic::QName(name) => assert_eq!(name.namespace(), None),
            other => panic!("unexpected {other:?}"),
        }
        assert!(cast_to(&str_value("1bad"), Xs::QName, None).is_err());
    }

    #[test]
    fn test_temporal_casts() {
        let dt = cast_to(&str_value("2024-05-06T07:08:09Z"), Xs::DateTime, None).unwrap();
        let date = cast_to(&dt, Xs::Date, None).unwrap();
        assert_eq!(date.into_canonical(), "2024-05-06Z");
        let time = cast_to(&dt, Xs::Time, None).unwrap();
        assert_eq!(time.into_canonical(), "07:08:09Z");
        let gym = cast_to(&date, Xs::GYearMonth, None).unwrap();
        assert_eq!(gym.into_canonical(), "2024-05Z");
    }

    #[test]
    fn test_string_round_trip() {
        for value in [
            Atomic::integer(42),
            Atomic::Boolean(true),
            Atomic::double(1.5),
            Atomic::Decimal("3.25".parse::<Decimal>().unwrap()),
            Atomic::Binary(BinaryType::Hex, Rc::new(vec![0xde, 0xad])),
        ] {
            let target = value.schema_type();
            let as_string = cast_to(&value, Xs::String, None).unwrap();
            let back = cast_to(&as_string, target, None).unwrap();
            assert_eq!(back, value, "round trip through string for {value:?}");
        }
    }

    #[test]
    fn test_untyped_accepts_anything() {
        let value = cast_to(&Atomic::integer(7), Xs::UntypedAtomic, None).unwrap();
        assert_eq!(value, Atomic::untyped("7"));
    }
}
