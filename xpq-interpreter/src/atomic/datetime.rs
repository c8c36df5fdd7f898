use std::cmp::Ordering;
use std::fmt;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{Error, Result};

/// An `xs:duration`: unsigned components with a single sign applying to
/// all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Duration {
    pub negative: bool,
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: Decimal,
}

impl Duration {
    /// Parse the ISO-8601 lexical form `[-]PnYnMnDTnHnMnS`. Components
    /// default to zero; at least one must be present, and `T` must be
    /// followed by a time component.
    pub fn parse(input: &str) -> Result<Duration> {
        let s = input.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix('P').ok_or(Error::FORG0001)?;
        let mut duration = Duration {
            negative,
            years: 0,
            months: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: Decimal::ZERO,
        };
        let (date_part, time_part) = match s.split_once('T') {
            Some((date, time)) => {
                if time.is_empty() {
                    return Err(Error::FORG0001);
                }
                (date, Some(time))
            }
            None => (s, None),
        };
        if date_part.is_empty() && time_part.is_none() {
            return Err(Error::FORG0001);
        }
        let mut seen = false;
        let mut rest = date_part;
        for (designator, slot) in [('Y', 0usize), ('M', 1), ('D', 2)] {
            if let Some(at) = rest.find(designator) {
                let digits = &rest[..at];
                let value: u32 = digits.parse().map_err(|_| Error::FORG0001)?;
                match slot {
                    0 => duration.years = value,
                    1 => duration.months = value,
                    _ => duration.days = value,
                }
                rest = &rest[at + 1..];
                seen = true;
            }
        }
        if !rest.is_empty() {
            return Err(Error::FORG0001);
        }
        if let Some(time) = time_part {
            let mut rest = time;
            for (designator, slot) in [('H', 0usize), ('M', 1), ('S', 2)] {
                if let Some(at) = rest.find(designator) {
                    let digits = &rest[..at];
                    if slot == 2 {
                        duration.seconds =
                            digits.parse::<Decimal>().map_err(|_| Error::FORG0001)?;
                        if duration.seconds.is_sign_negative() {
                            return Err(Error::FORG0001);
                        }
                    } else {
                        let value: u32 = digits.parse().map_err(|_| Error::FORG0001)?;
                        if slot == 0 {
                            duration.hours = value;
                        } else {
                            duration.minutes = value;
                        }
                    }
                    rest = &rest[at + 1..];
                    seen = true;
                }
            }
            if !rest.is_empty() {
                return Err(Error::FORG0001);
            }
        }
        if !seen {
            return Err(Error::FORG0001);
        }
        Ok(duration)
    }

    pub fn signed_years(&self) -> i64 {
        self.signed(self.years as i64)
    }

    pub fn signed_months(&self) -> i64 {
        self.signed(self.months as i64)
    }

    pub fn signed_days(&self) -> i64 {
        self.signed(self.days as i64)
    }

    pub fn signed_hours(&self) -> i64 {
        self.signed(self.hours as i64)
    }

    pub fn signed_minutes(&self) -> i64 {
        self.signed(self.minutes as i64)
    }

    fn signed(&self, value: i64) -> i64 {
        if self.negative {
            -value
        } else {
            value
        }
    }

    fn is_zero(&self) -> bool {
        self.years == 0
            && self.months == 0
            && self.days == 0
            && self.hours == 0
            && self.minutes == 0
            && self.seconds.is_zero()
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "PT0S");
        }
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;
        if self.years > 0 {
            write!(f, "{}Y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}M", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || !self.seconds.is_zero() {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if !self.seconds.is_zero() {
                write!(f, "{}S", self.seconds.normalize())?;
            }
        }
        Ok(())
    }
}

/// Split an optional timezone suffix (`Z` or `±hh:mm`) off a temporal
/// lexical form.
fn split_timezone(s: &str) -> Result<(&str, Option<FixedOffset>)> {
    if let Some(body) = s.strip_suffix('Z') {
        return Ok((body, Some(FixedOffset::east_opt(0).ok_or(Error::FORG0001)?)));
    }
    if s.len() > 6 {
        let (body, suffix) = s.split_at(s.len() - 6);
        let bytes = suffix.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' {
            let hours: i32 = suffix[1..3].parse().map_err(|_| Error::FORG0001)?;
            let minutes: i32 = suffix[4..6].parse().map_err(|_| Error::FORG0001)?;
            if hours > 14 || minutes > 59 {
                return Err(Error::FORG0001);
            }
            let seconds = hours * 3600 + minutes * 60;
            let seconds = if bytes[0] == b'-' { -seconds } else { seconds };
            let offset = FixedOffset::east_opt(seconds).ok_or(Error::FORG0001)?;
            return Ok((body, Some(offset)));
        }
    }
    Ok((s, None))
}

fn format_offset(f: &mut fmt::Formatter<'_>, offset: &Option<FixedOffset>) -> fmt::Result {
    match offset {
        None => Ok(()),
        Some(offset) => {
            let seconds = offset.local_minus_utc();
            if seconds == 0 {
                write!(f, "Z")
            } else {
                let sign = if seconds < 0 { '-' } else { '+' };
                let seconds = seconds.abs();
                write!(f, "{}{:02}:{:02}", sign, seconds / 3600, (seconds % 3600) / 60)
            }
        }
    }
}

/// An `xs:dateTime`: a naive timestamp plus an optional timezone carried
/// on the value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTimeValue {
    pub date_time: NaiveDateTime,
    pub offset: Option<FixedOffset>,
}

impl DateTimeValue {
    pub fn parse(input: &str) -> Result<DateTimeValue> {
        let (body, offset) = split_timezone(input.trim())?;
        let date_time = NaiveDateTime::parse_from_str(body, "%Y-%m-%dT%H:%M:%S%.f")
            .map_err(|_| Error::FORG0001)?;
        Ok(DateTimeValue { date_time, offset })
    }

    /// The instant used for ordering; a missing timezone counts as UTC.
    pub fn instant(&self) -> NaiveDateTime {
        match self.offset {
            Some(offset) => self.date_time - chrono::Duration::seconds(offset.local_minus_utc() as i64),
            None => self.date_time,
        }
    }

    pub fn compare(&self, other: &DateTimeValue) -> Ordering {
        self.instant().cmp(&other.instant())
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.date_time.nanosecond() == 0 {
            write!(f, "{}", self.date_time.format("%Y-%m-%dT%H:%M:%S"))?;
        } else {
            write!(f, "{}", self.date_time.format("%Y-%m-%dT%H:%M:%S%.f"))?;
        }
        format_offset(f, &self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateValue {
    pub date: NaiveDate,
    pub offset: Option<FixedOffset>,
}

impl DateValue {
    pub fn parse(input: &str) -> Result<DateValue> {
        let (body, offset) = split_timezone(input.trim())?;
        let date = NaiveDate::parse_from_str(body, "%Y-%m-%d").map_err(|_| Error::FORG0001)?;
        Ok(DateValue { date, offset })
    }

    pub fn compare(&self, other: &DateValue) -> Ordering {
        self.to_date_time().compare(&other.to_date_time())
    }

    pub fn to_date_time(&self) -> DateTimeValue {
        DateTimeValue {
            date_time: self.date.and_time(NaiveTime::MIN),
            offset: self.offset,
        }
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        format_offset(f, &self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeValue {
    pub time: NaiveTime,
    pub offset: Option<FixedOffset>,
}

impl TimeValue {
    pub fn parse(input: &str) -> Result<TimeValue> {
        let (body, offset) = split_timezone(input.trim())?;
        let time = NaiveTime::parse_from_str(body, "%H:%M:%S%.f").map_err(|_| Error::FORG0001)?;
        Ok(TimeValue { time, offset })
    }

    pub fn compare(&self, other: &TimeValue) -> Ordering {
        let a = self.offset.map(|o| o.local_minus_utc()).unwrap_or(0) as i64;
        let b = other.offset.map(|o| o.local_minus_utc()).unwrap_or(0) as i64;
        let left = self.time.num_seconds_from_midnight() as i64 - a;
        let right = other.time.num_seconds_from_midnight() as i64 - b;
        left.cmp(&right)
            .then_with(|| self.time.nanosecond().cmp(&other.time.nanosecond()))
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.time.nanosecond() == 0 {
            write!(f, "{}", self.time.format("%H:%M:%S"))?;
        } else {
            write!(f, "{}", self.time.format("%H:%M:%S%.f"))?;
        }
        format_offset(f, &self.offset)
    }
}

fn parse_year(digits: &str) -> Result<i32> {
    let (negative, body) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    };
    if body.len() < 4 || !body.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::FORG0001);
    }
    let year: i32 = body.parse().map_err(|_| Error::FORG0001)?;
    Ok(if negative { -year } else { year })
}

fn parse_month(digits: &str) -> Result<u8> {
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::FORG0001);
    }
    let month: u8 = digits.parse().map_err(|_| Error::FORG0001)?;
    if !(1..=12).contains(&month) {
        return Err(Error::FORG0001);
    }
    Ok(month)
}

fn parse_day(digits: &str, month: Option<u8>) -> Result<u8> {
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::FORG0001);
    }
    let day: u8 = digits.parse().map_err(|_| Error::FORG0001)?;
    let max = match month {
        Some(m) => days_in_month(m),
        None => 31,
    };
    if day == 0 || day > max {
        return Err(Error::FORG0001);
    }
    Ok(day)
}

fn days_in_month(month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        // 29 admits leap-year dates; gMonthDay has no year to check against
        2 => 29,
        _ => 0,
    }
}

/// `YYYY-MM`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GYearMonth {
    pub year: i32,
    pub month: u8,
    pub offset: Option<FixedOffset>,
}

impl GYearMonth {
    pub fn parse(input: &str) -> Result<GYearMonth> {
        let (body, offset) = split_timezone(input.trim())?;
        let split = body.len().checked_sub(3).ok_or(Error::FORG0001)?;
        if body.as_bytes().get(split) != Some(&b'-') {
            return Err(Error::FORG0001);
        }
        Ok(GYearMonth {
            year: parse_year(&body[..split])?,
            month: parse_month(&body[split + 1..])?,
            offset,
        })
    }
}

fn format_year(f: &mut fmt::Formatter<'_>, year: i32) -> fmt::Result {
    if year < 0 {
        write!(f, "-{:04}", -(year as i64))
    } else {
        write!(f, "{:04}", year)
    }
}

impl fmt::Display for GYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_year(f, self.year)?;
        write!(f, "-{:02}", self.month)?;
        format_offset(f, &self.offset)
    }
}

/// `YYYY`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GYear {
    pub year: i32,
    pub offset: Option<FixedOffset>,
}

impl GYear {
    pub fn parse(input: &str) -> Result<GYear> {
        let (body, offset) = split_timezone(input.trim())?;
        Ok(GYear {
            year: parse_year(body)?,
            offset,
        })
    }
}

impl fmt::Display for GYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_year(f, self.year)?;
        format_offset(f, &self.offset)
    }
}

/// `--MM-DD`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GMonthDay {
    pub month: u8,
    pub day: u8,
    pub offset: Option<FixedOffset>,
}

impl GMonthDay {
    pub fn parse(input: &str) -> Result<GMonthDay> {
        let (body, offset) = split_timezone(input.trim())?;
        let body = body.strip_prefix("--").ok_or(Error::FORG0001)?;
        let (month_digits, day_digits) = body.split_once('-').ok_or(Error::FORG0001)?;
        let month = parse_month(month_digits)?;
        let day = parse_day(day_digits, Some(month))?;
        Ok(GMonthDay { month, day, offset })
    }
}

impl fmt::Display for GMonthDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}-{:02}", self.month, self.day)?;
        format_offset(f, &self.offset)
    }
}

/// `---DD`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GDay {
    pub day: u8,
    pub offset: Option<FixedOffset>,
}

impl GDay {
    pub fn parse(input: &str) -> Result<GDay> {
        let (body, offset) = split_timezone(input.trim())?;
        let body = body.strip_prefix("---").ok_or(Error::FORG0001)?;
        Ok(GDay {
            day: parse_day(body, None)?,
            offset,
        })
    }
}

impl fmt::Display for GDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "---{:02}", self.day)?;
        format_offset(f, &self.offset)
    }
}

/// `--MM`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GMonth {
    pub month: u8,
    pub offset: Option<FixedOffset>,
}

impl GMonth {
    pub fn parse(input: &str) -> Result<GMonth> {
        let (body, offset) = split_timezone(input.trim())?;
        let body = body.strip_prefix("--").ok_or(Error::FORG0001)?;
        Ok(GMonth {
            month: parse_month(body)?,
            offset,
        })
    }
}

impl fmt::Display for GMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{:02}", self.month)?;
        format_offset(f, &self.offset)
    }
}

pub(crate) fn date_of(date_time: &DateTimeValue) -> DateValue {
    DateValue {
        date: date_time.date_time.date(),
        offset: date_time.offset,
    }
}

pub(crate) fn time_of(date_time: &DateTimeValue) -> TimeValue {
    TimeValue {
        time: date_time.date_time.time(),
        offset: date_time.offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duration_parse_full() {
        let d = Duration::parse("P1Y2M3DT4H5M6S").unwrap();
        assert!(!d.negative);
        assert_eq!(d.years, 1);
        assert_eq!(d.months, 2);
        assert_eq!(d.days, 3);
        assert_eq!(d.hours, 4);
        assert_eq!(d.minutes, 5);
        assert_eq!(d.seconds, dec!(6));
        assert_eq!(d.to_string(), "P1Y2M3DT4H5M6S");
    }

    #[test]
    fn test_duration_negative_applies_to_all() {
        let d = Duration::parse("-P1Y").unwrap();
        assert!(d.negative);
        assert_eq!(d.signed_years(), -1);
        assert_eq!(d.signed_months(), 0);
        assert_eq!(d.to_string(), "-P1Y");
    }

    #[test]
    fn test_duration_components_default_to_zero() {
        let d = Duration::parse("PT5M").unwrap();
        assert_eq!(d.years, 0);
        assert_eq!(d.minutes, 5);
    }

    #[test]
    fn test_duration_rejects_garbage() {
        assert!(Duration::parse("P").is_err());
        assert!(Duration::parse("1Y").is_err());
        assert!(Duration::parse("P1H").is_err());
        assert!(Duration::parse("P1YT").is_err());
    }

    #[test]
    fn test_datetime_with_timezone() {
        let dt = DateTimeValue::parse("2024-03-01T12:30:00+05:30").unwrap();
        assert_eq!(
            dt.offset.unwrap().local_minus_utc(),
            5 * 3600 + 30 * 60
        );
        assert_eq!(dt.to_string(), "2024-03-01T12:30:00+05:30");
        let utc = DateTimeValue::parse("2024-03-01T07:00:00Z").unwrap();
        assert_eq!(dt.compare(&utc), Ordering::Equal);
    }

    #[test]
    fn test_time_of_day_range_checked() {
        assert!(TimeValue::parse("24:00:01").is_err());
        assert!(TimeValue::parse("12:61:00").is_err());
        assert!(TimeValue::parse("23:59:59").is_ok());
    }

    #[test]
    fn test_gregorian_grammars() {
        assert_eq!(GYearMonth::parse("2024-02").unwrap().month, 2);
        assert_eq!(GYear::parse("-0044").unwrap().year, -44);
        let md = GMonthDay::parse("--02-29").unwrap();
        assert_eq!((md.month, md.day), (2, 29));
        assert_eq!(GDay::parse("---31").unwrap().day, 31);
        assert_eq!(GMonth::parse("--12").unwrap().month, 12);
    }

    #[test]
    fn test_gregorian_ranges_enforced() {
        assert!(GMonth::parse("--00").is_err());
        assert!(GMonth::parse("--13").is_err());
        assert!(GDay::parse("---00").is_err());
        assert!(GDay::parse("---32").is_err());
        assert!(GMonthDay::parse("--02-30").is_err());
        assert!(GMonthDay::parse("--04-31").is_err());
    }

    #[test]
    fn test_gregorian_rejects_loose_forms() {
        assert!(GYear::parse("44").is_err());
        assert!(GMonth::parse("12").is_err());
        assert!(GMonthDay::parse("-02-10").is_err());
    }
}
