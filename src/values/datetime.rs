//! Calendar and duration values
//!
//! A hand-rolled scanner over fixed-width fields produces an 8-slot tuple
//! `[year, month, day, hour, minute, second, millisecond, timezone]`
//! shared by every calendar grain and by durations. Values carrying an
//! explicit timezone offset are normalized to UTC with calendar carry
//! rules before any comparison, so two lexically different instants with
//! different offsets compare equal. A value with a timezone compared
//! against one without is indeterminate.

use crate::error::{ValueError, ValueErrorKind};
use crate::values::ValueOrder;
use std::fmt;

/// Calendar grain of a date/time type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarGrain {
    /// xs:dateTime
    DateTime,
    /// xs:date
    Date,
    /// xs:time
    Time,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:gYear
    GYear,
    /// xs:gMonthDay
    GMonthDay,
    /// xs:gDay
    GDay,
    /// xs:gMonth
    GMonth,
    /// xs:duration
    Duration,
}

impl CalendarGrain {
    /// The XSD type name for diagnostics
    pub fn type_name(self) -> &'static str {
        match self {
            CalendarGrain::DateTime => "dateTime",
            CalendarGrain::Date => "date",
            CalendarGrain::Time => "time",
            CalendarGrain::GYearMonth => "gYearMonth",
            CalendarGrain::GYear => "gYear",
            CalendarGrain::GMonthDay => "gMonthDay",
            CalendarGrain::GDay => "gDay",
            CalendarGrain::GMonth => "gMonth",
            CalendarGrain::Duration => "duration",
        }
    }
}

/// Timezone slot of the tuple
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    /// No timezone information present
    Missing,
    /// UTC ('Z', or an offset already normalized away)
    Utc,
    /// Minutes east of UTC, before normalization
    Offset(i32),
}

/// Parsed calendar or duration value.
///
/// For calendar grains the fields are absolute calendar coordinates with
/// grain-appropriate defaults in the unused slots. For durations the
/// fields are component magnitudes and `negative` carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeValue {
    /// Duration sign (calendar grains always false; negative years go in `year`)
    pub negative: bool,
    /// Year (never 0; negative for BCE years)
    pub year: i32,
    /// Month 1..=12 (duration: month count)
    pub month: i32,
    /// Day 1..=31 (duration: day count)
    pub day: i32,
    /// Hour 0..=23
    pub hour: i32,
    /// Minute 0..=59
    pub minute: i32,
    /// Second 0..=59
    pub second: i32,
    /// Millisecond 0..=999
    pub millisecond: i32,
    /// Timezone slot
    pub tz: Timezone,
    grain: CalendarGrain,
}

const MONTH_DAYS: [i32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn max_day_in_month(year: i32, month: i32) -> i32 {
    if month == 2 && is_leap_year(year) {
        29
    } else {
        MONTH_DAYS[(month - 1) as usize]
    }
}

impl DateTimeValue {
    fn empty(grain: CalendarGrain) -> Self {
        // Durations count components from zero; calendar grains fill
        // unused slots with a fixed leap-year origin so carry during
        // normalization stays well defined and cancels in comparisons.
        let calendar = grain != CalendarGrain::Duration;
        Self {
            negative: false,
            year: if calendar { 2000 } else { 0 },
            month: if calendar { 1 } else { 0 },
            day: if calendar { 1 } else { 0 },
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            tz: Timezone::Missing,
            grain,
        }
    }

    /// The grain this value was parsed as
    pub fn grain(&self) -> CalendarGrain {
        self.grain
    }

    /// Whether the value carries timezone information
    pub fn has_timezone(&self) -> bool {
        !matches!(self.tz, Timezone::Missing)
    }

    /// Parse a lexical value of the given grain, normalizing any explicit
    /// offset to UTC.
    pub fn parse(lexical: &str, grain: CalendarGrain) -> Result<Self, ValueError> {
        let trimmed = lexical.trim();
        let mut scanner = Scanner::new(trimmed);
        let mut value = Self::empty(grain);
        let fail = || lexical_error(lexical, grain);

        match grain {
            CalendarGrain::DateTime => {
                value.year = scan_year(&mut scanner).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.month = scanner.fixed_digits(2).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.day = scanner.fixed_digits(2).ok_or_else(fail)?;
                scanner.expect(b'T').then_some(()).ok_or_else(fail)?;
                scan_time(&mut scanner, &mut value).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::Date => {
                value.year = scan_year(&mut scanner).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.month = scanner.fixed_digits(2).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.day = scanner.fixed_digits(2).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::Time => {
                scan_time(&mut scanner, &mut value).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::GYearMonth => {
                value.year = scan_year(&mut scanner).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.month = scanner.fixed_digits(2).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::GYear => {
                value.year = scan_year(&mut scanner).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::GMonthDay => {
                scanner.expect_str("--").then_some(()).ok_or_else(fail)?;
                value.month = scanner.fixed_digits(2).ok_or_else(fail)?;
                scanner.expect(b'-').then_some(()).ok_or_else(fail)?;
                value.day = scanner.fixed_digits(2).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::GDay => {
                scanner.expect_str("---").then_some(()).ok_or_else(fail)?;
                value.day = scanner.fixed_digits(2).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::GMonth => {
                scanner.expect_str("--").then_some(()).ok_or_else(fail)?;
                value.month = scanner.fixed_digits(2).ok_or_else(fail)?;
                value.tz = scan_timezone(&mut scanner).ok_or_else(fail)?;
            }
            CalendarGrain::Duration => {
                scan_duration(&mut scanner, &mut value).ok_or_else(fail)?;
            }
        }

        if !scanner.done() {
            return Err(fail());
        }
        value.check_fields().map_err(|_| fail())?;
        value.normalize_to_utc();
        Ok(value)
    }

    fn check_fields(&self) -> Result<(), ()> {
        if self.grain == CalendarGrain::Duration {
            return Ok(());
        }
        if self.year == 0 {
            return Err(());
        }
        if !(1..=12).contains(&self.month) {
            return Err(());
        }
        if self.day < 1 || self.day > max_day_in_month(self.year, self.month) {
            return Err(());
        }
        if !(0..=23).contains(&self.hour)
            || !(0..=59).contains(&self.minute)
            || !(0..=59).contains(&self.second)
        {
            return Err(());
        }
        if let Timezone::Offset(off) = self.tz {
            if off.abs() > 14 * 60 {
                return Err(());
            }
        }
        Ok(())
    }

    fn normalize_to_utc(&mut self) {
        if let Timezone::Offset(off) = self.tz {
            let total_minutes = self.minute - off;
            self.minute = total_minutes.rem_euclid(60);
            let carry_hours = (total_minutes - self.minute) / 60;
            let total_hours = self.hour + carry_hours;
            self.hour = total_hours.rem_euclid(24);
            let carry_days = (total_hours - self.hour) / 24;
            self.add_days(carry_days);
            self.tz = Timezone::Utc;
        }
    }

    fn add_days(&mut self, days: i32) {
        self.day += days;
        while self.day < 1 {
            self.month -= 1;
            if self.month < 1 {
                self.month = 12;
                self.year -= 1;
                if self.year == 0 {
                    self.year = -1;
                }
            }
            self.day += max_day_in_month(self.year, self.month);
        }
        while self.day > max_day_in_month(self.year, self.month) {
            self.day -= max_day_in_month(self.year, self.month);
            self.month += 1;
            if self.month > 12 {
                self.month = 1;
                self.year += 1;
                if self.year == 0 {
                    self.year = 1;
                }
            }
        }
    }

    fn field_key(&self) -> (i32, i32, i32, i32, i32, i32, i32) {
        (
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.millisecond,
        )
    }

    /// Compare two values of the same grain.
    ///
    /// Calendar values order by normalized field comparison when both
    /// carry timezone information or both lack it; a mismatch in timezone
    /// presence is indeterminate. Durations order through month-length
    /// bounds and are indeterminate when the bounds overlap.
    pub fn compare(&self, other: &Self) -> ValueOrder {
        if self.grain == CalendarGrain::Duration {
            return self.compare_duration(other);
        }
        match (self.has_timezone(), other.has_timezone()) {
            (true, true) | (false, false) => {
                ValueOrder::from_ordering(self.field_key().cmp(&other.field_key()))
            }
            _ => ValueOrder::Indeterminate,
        }
    }

    fn signed_components(&self) -> (i64, i64) {
        let months = (self.year as i64) * 12 + self.month as i64;
        let fixed_ms = (self.day as i64) * 86_400_000
            + (self.hour as i64) * 3_600_000
            + (self.minute as i64) * 60_000
            + (self.second as i64) * 1000
            + self.millisecond as i64;
        if self.negative {
            (-months, -fixed_ms)
        } else {
            (months, fixed_ms)
        }
    }

    fn compare_duration(&self, other: &Self) -> ValueOrder {
        let (a_months, a_fixed) = self.signed_components();
        let (b_months, b_fixed) = other.signed_components();
        if a_months == b_months && a_fixed == b_fixed {
            return ValueOrder::Equal;
        }

        // A month spans 28 to 31 days depending on calendar placement, so
        // a duration denotes a range of instants. The order is decided
        // only when the ranges do not overlap.
        let range = |months: i64, fixed: i64| {
            let lo = months * 28 * 86_400_000 + fixed;
            let hi = months * 31 * 86_400_000 + fixed;
            (lo.min(hi), lo.max(hi))
        };
        let (a_lo, a_hi) = range(a_months, a_fixed);
        let (b_lo, b_hi) = range(b_months, b_fixed);
        if a_hi < b_lo {
            ValueOrder::Less
        } else if a_lo > b_hi {
            ValueOrder::Greater
        } else {
            ValueOrder::Indeterminate
        }
    }
}

fn lexical_error(lexical: &str, grain: CalendarGrain) -> ValueError {
    ValueError::new(
        ValueErrorKind::InvalidLexical,
        format!("value is not a valid xs:{}", grain.type_name()),
    )
    .with_value(lexical)
}

// ---------------------------------------------------------------------------
// Field scanner
// ---------------------------------------------------------------------------

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    fn done(&self) -> bool {
        self.pos == self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Exactly `n` digits as a number
    fn fixed_digits(&mut self, n: usize) -> Option<i32> {
        if self.pos + n > self.bytes.len() {
            return None;
        }
        let mut value = 0i32;
        for i in 0..n {
            let b = self.bytes[self.pos + i];
            if !b.is_ascii_digit() {
                return None;
            }
            value = value * 10 + (b - b'0') as i32;
        }
        self.pos += n;
        Some(value)
    }

    /// At least `min` digits as a number, consuming as many as present
    fn digits_min(&mut self, min: usize) -> Option<i64> {
        let start = self.pos;
        let mut value = 0i64;
        while let Some(b) = self.peek() {
            if !b.is_ascii_digit() {
                break;
            }
            value = value.checked_mul(10)?.checked_add((b - b'0') as i64)?;
            self.pos += 1;
        }
        if self.pos - start < min {
            self.pos = start;
            return None;
        }
        Some(value)
    }
}

fn scan_year(scanner: &mut Scanner<'_>) -> Option<i32> {
    let negative = scanner.expect(b'-');
    let leading_zero = scanner.peek() == Some(b'0');
    let start = scanner.pos;
    let magnitude = scanner.digits_min(4)?;
    // more than four digits must not start with a zero
    if leading_zero && scanner.pos - start > 4 {
        return None;
    }
    let year = i32::try_from(magnitude).ok()?;
    Some(if negative { -year } else { year })
}

fn scan_time(scanner: &mut Scanner<'_>, value: &mut DateTimeValue) -> Option<()> {
    let hour = scanner.fixed_digits(2)?;
    scanner.expect(b':').then_some(())?;
    value.minute = scanner.fixed_digits(2)?;
    scanner.expect(b':').then_some(())?;
    value.second = scanner.fixed_digits(2)?;
    if scanner.expect(b'.') {
        value.millisecond = scan_fraction_ms(scanner)?;
    }
    // 24:00:00 denotes the first instant of the following day
    if hour == 24 {
        if value.minute != 0 || value.second != 0 || value.millisecond != 0 {
            return None;
        }
        value.hour = 0;
        value.add_days(1);
    } else {
        value.hour = hour;
    }
    Some(())
}

fn scan_fraction_ms(scanner: &mut Scanner<'_>) -> Option<i32> {
    let start = scanner.pos;
    let mut ms = 0i32;
    let mut count = 0usize;
    while let Some(b) = scanner.peek() {
        if !b.is_ascii_digit() {
            break;
        }
        if count < 3 {
            ms = ms * 10 + (b - b'0') as i32;
        }
        count += 1;
        scanner.pos += 1;
    }
    if scanner.pos == start {
        return None;
    }
    while count < 3 {
        ms *= 10;
        count += 1;
    }
    Some(ms)
}

fn scan_timezone(scanner: &mut Scanner<'_>) -> Option<Timezone> {
    match scanner.peek() {
        None => Some(Timezone::Missing),
        Some(b'Z') => {
            scanner.pos += 1;
            Some(Timezone::Utc)
        }
        Some(sign @ (b'+' | b'-')) => {
            scanner.pos += 1;
            let hours = scanner.fixed_digits(2)?;
            scanner.expect(b':').then_some(())?;
            let minutes = scanner.fixed_digits(2)?;
            if hours > 14 || minutes > 59 || (hours == 14 && minutes != 0) {
                return None;
            }
            let offset = hours * 60 + minutes;
            Some(Timezone::Offset(if sign == b'-' { -offset } else { offset }))
        }
        Some(_) => None,
    }
}

fn scan_duration(scanner: &mut Scanner<'_>, value: &mut DateTimeValue) -> Option<()> {
    value.negative = scanner.expect(b'-');
    scanner.expect(b'P').then_some(())?;

    fn component(scanner: &mut Scanner<'_>, marker: u8) -> Option<i64> {
        let start = scanner.pos;
        match scanner.digits_min(1) {
            Some(n) if scanner.expect(marker) => Some(n),
            Some(_) => {
                scanner.pos = start;
                None
            }
            None => None,
        }
    }

    let mut components = 0usize;
    if let Some(n) = component(scanner, b'Y') {
        value.year = i32::try_from(n).ok()?;
        components += 1;
    }
    if let Some(n) = component(scanner, b'M') {
        value.month = i32::try_from(n).ok()?;
        components += 1;
    }
    if let Some(n) = component(scanner, b'D') {
        value.day = i32::try_from(n).ok()?;
        components += 1;
    }

    if scanner.expect(b'T') {
        let before_time = components;
        if let Some(n) = component(scanner, b'H') {
            value.hour = i32::try_from(n).ok()?;
            components += 1;
        }
        if let Some(n) = component(scanner, b'M') {
            value.minute = i32::try_from(n).ok()?;
            components += 1;
        }
        // seconds component parsed inline so the fraction can follow it
        let start = scanner.pos;
        if let Some(n) = scanner.digits_min(1) {
            let ms = if scanner.expect(b'.') {
                scan_fraction_ms(scanner)?
            } else {
                0
            };
            if scanner.expect(b'S') {
                value.second = i32::try_from(n).ok()?;
                value.millisecond = ms;
                components += 1;
            } else {
                scanner.pos = start;
            }
        }
        if components == before_time {
            return None;
        }
    }

    if components == 0 {
        return None;
    }
    Some(())
}

// ---------------------------------------------------------------------------
// Lexical rendering (diagnostics)
// ---------------------------------------------------------------------------

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.grain {
            CalendarGrain::DateTime => {
                write_year(f, self.year)?;
                write!(f, "-{:02}-{:02}T", self.month, self.day)?;
                write_time(f, self)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::Date => {
                write_year(f, self.year)?;
                write!(f, "-{:02}-{:02}", self.month, self.day)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::Time => {
                write_time(f, self)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::GYearMonth => {
                write_year(f, self.year)?;
                write!(f, "-{:02}", self.month)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::GYear => {
                write_year(f, self.year)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::GMonthDay => {
                write!(f, "--{:02}-{:02}", self.month, self.day)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::GDay => {
                write!(f, "---{:02}", self.day)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::GMonth => {
                write!(f, "--{:02}", self.month)?;
                write_tz(f, self.tz)
            }
            CalendarGrain::Duration => {
                if self.negative {
                    write!(f, "-")?;
                }
                write!(f, "P")?;
                if self.year != 0 {
                    write!(f, "{}Y", self.year)?;
                }
                if self.month != 0 {
                    write!(f, "{}M", self.month)?;
                }
                if self.day != 0 {
                    write!(f, "{}D", self.day)?;
                }
                let has_time =
                    self.hour != 0 || self.minute != 0 || self.second != 0 || self.millisecond != 0;
                if has_time {
                    write!(f, "T")?;
                    if self.hour != 0 {
                        write!(f, "{}H", self.hour)?;
                    }
                    if self.minute != 0 {
                        write!(f, "{}M", self.minute)?;
                    }
                    if self.second != 0 || self.millisecond != 0 {
                        if self.millisecond != 0 {
                            write!(f, "{}.{:03}S", self.second, self.millisecond)?;
                        } else {
                            write!(f, "{}S", self.second)?;
                        }
                    }
                } else if self.year == 0 && self.month == 0 && self.day == 0 {
                    write!(f, "T0S")?;
                }
                Ok(())
            }
        }
    }
}

fn write_year(f: &mut fmt::Formatter<'_>, year: i32) -> fmt::Result {
    if year < 0 {
        write!(f, "-{:04}", -year)
    } else {
        write!(f, "{:04}", year)
    }
}

fn write_time(f: &mut fmt::Formatter<'_>, v: &DateTimeValue) -> fmt::Result {
    write!(f, "{:02}:{:02}:{:02}", v.hour, v.minute, v.second)?;
    if v.millisecond != 0 {
        write!(f, ".{:03}", v.millisecond)?;
    }
    Ok(())
}

fn write_tz(f: &mut fmt::Formatter<'_>, tz: Timezone) -> fmt::Result {
    match tz {
        Timezone::Missing => Ok(()),
        Timezone::Utc => write!(f, "Z"),
        Timezone::Offset(off) => {
            let sign = if off < 0 { '-' } else { '+' };
            let abs = off.abs();
            write!(f, "{}{:02}:{:02}", sign, abs / 60, abs % 60)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> DateTimeValue {
        DateTimeValue::parse(s, CalendarGrain::DateTime).unwrap()
    }

    fn dur(s: &str) -> DateTimeValue {
        DateTimeValue::parse(s, CalendarGrain::Duration).unwrap()
    }

    #[test]
    fn test_datetime_lexical() {
        assert!(DateTimeValue::parse("2024-01-15T10:30:00", CalendarGrain::DateTime).is_ok());
        assert!(DateTimeValue::parse("2024-01-15T10:30:00Z", CalendarGrain::DateTime).is_ok());
        assert!(
            DateTimeValue::parse("2024-01-15T10:30:00.5+05:30", CalendarGrain::DateTime).is_ok()
        );
        assert!(DateTimeValue::parse("-0044-03-15T12:00:00", CalendarGrain::DateTime).is_ok());
        assert!(DateTimeValue::parse("2024-01-15", CalendarGrain::DateTime).is_err());
        assert!(DateTimeValue::parse("2024-13-01T00:00:00", CalendarGrain::DateTime).is_err());
        assert!(DateTimeValue::parse("2024-02-30T00:00:00", CalendarGrain::DateTime).is_err());
        assert!(DateTimeValue::parse("0000-01-01T00:00:00", CalendarGrain::DateTime).is_err());
        assert!(DateTimeValue::parse("invalid", CalendarGrain::DateTime).is_err());
    }

    #[test]
    fn test_expanded_year_has_no_leading_zero() {
        assert!(DateTimeValue::parse("10000-01-01", CalendarGrain::Date).is_ok());
        assert!(DateTimeValue::parse("0999-01-01", CalendarGrain::Date).is_ok());
        assert!(DateTimeValue::parse("010000-01-01", CalendarGrain::Date).is_err());
        assert!(DateTimeValue::parse("-02024-01-01", CalendarGrain::Date).is_err());
    }

    #[test]
    fn test_leap_year_days() {
        assert!(DateTimeValue::parse("2024-02-29", CalendarGrain::Date).is_ok());
        assert!(DateTimeValue::parse("2023-02-29", CalendarGrain::Date).is_err());
        assert!(DateTimeValue::parse("1900-02-29", CalendarGrain::Date).is_err());
        assert!(DateTimeValue::parse("2000-02-29", CalendarGrain::Date).is_ok());
    }

    #[test]
    fn test_gregorian_grains() {
        assert!(DateTimeValue::parse("2024-01", CalendarGrain::GYearMonth).is_ok());
        assert!(DateTimeValue::parse("2024", CalendarGrain::GYear).is_ok());
        assert!(DateTimeValue::parse("--02-29", CalendarGrain::GMonthDay).is_ok());
        assert!(DateTimeValue::parse("---15Z", CalendarGrain::GDay).is_ok());
        assert!(DateTimeValue::parse("--12+13:00", CalendarGrain::GMonth).is_ok());
        assert!(DateTimeValue::parse("--13", CalendarGrain::GMonth).is_err());
        assert!(DateTimeValue::parse("15", CalendarGrain::GDay).is_err());
    }

    #[test]
    fn test_time_grain() {
        assert!(DateTimeValue::parse("10:30:00", CalendarGrain::Time).is_ok());
        assert!(DateTimeValue::parse("10:30:00.123", CalendarGrain::Time).is_ok());
        assert!(DateTimeValue::parse("24:00:00", CalendarGrain::Time).is_ok());
        assert!(DateTimeValue::parse("24:00:01", CalendarGrain::Time).is_err());
        assert!(DateTimeValue::parse("25:00:00", CalendarGrain::Time).is_err());
        assert!(DateTimeValue::parse("10:60:00", CalendarGrain::Time).is_err());
    }

    #[test]
    fn test_utc_normalization_equality() {
        let a = dt("2001-01-01T00:00:00+01:00");
        let b = dt("2000-12-31T23:00:00Z");
        assert_eq!(a.compare(&b), ValueOrder::Equal);
    }

    #[test]
    fn test_normalization_rolls_year_forward() {
        let a = dt("2000-12-31T23:30:00-01:00");
        let b = dt("2001-01-01T00:30:00Z");
        assert_eq!(a.compare(&b), ValueOrder::Equal);
    }

    #[test]
    fn test_missing_timezone_is_indeterminate() {
        let zoned = dt("2001-01-01T00:00:00Z");
        let local = dt("2001-01-01T00:00:00");
        assert_eq!(zoned.compare(&local), ValueOrder::Indeterminate);
        assert_eq!(local.compare(&zoned), ValueOrder::Indeterminate);
        assert_eq!(local.compare(&local), ValueOrder::Equal);
    }

    #[test]
    fn test_zoned_order() {
        let early = dt("2001-01-01T00:00:00Z");
        let late = dt("2001-01-01T00:00:00-05:00");
        assert_eq!(early.compare(&late), ValueOrder::Less);
        assert_eq!(late.compare(&early), ValueOrder::Greater);
    }

    #[test]
    fn test_timezone_offset_limits() {
        assert!(DateTimeValue::parse("2024-01-01T00:00:00+14:00", CalendarGrain::DateTime).is_ok());
        assert!(
            DateTimeValue::parse("2024-01-01T00:00:00+14:30", CalendarGrain::DateTime).is_err()
        );
        assert!(
            DateTimeValue::parse("2024-01-01T00:00:00+15:00", CalendarGrain::DateTime).is_err()
        );
    }

    #[test]
    fn test_duration_lexical() {
        assert!(DateTimeValue::parse("P1Y2M3DT4H5M6S", CalendarGrain::Duration).is_ok());
        assert!(DateTimeValue::parse("PT1H", CalendarGrain::Duration).is_ok());
        assert!(DateTimeValue::parse("-P30D", CalendarGrain::Duration).is_ok());
        assert!(DateTimeValue::parse("PT0.5S", CalendarGrain::Duration).is_ok());
        assert!(DateTimeValue::parse("P", CalendarGrain::Duration).is_err());
        assert!(DateTimeValue::parse("-P", CalendarGrain::Duration).is_err());
        assert!(DateTimeValue::parse("P1YT", CalendarGrain::Duration).is_err());
        assert!(DateTimeValue::parse("P1S", CalendarGrain::Duration).is_err());
    }

    #[test]
    fn test_duration_equality() {
        assert_eq!(dur("P1Y").compare(&dur("P12M")), ValueOrder::Equal);
        assert_eq!(dur("PT60M").compare(&dur("PT1H")), ValueOrder::Equal);
    }

    #[test]
    fn test_duration_order() {
        assert_eq!(dur("P1M").compare(&dur("P27D")), ValueOrder::Greater);
        assert_eq!(dur("P27D").compare(&dur("P1M")), ValueOrder::Less);
        assert_eq!(dur("P1M").compare(&dur("P30D")), ValueOrder::Indeterminate);
        assert_eq!(dur("P1Y").compare(&dur("P365D")), ValueOrder::Indeterminate);
        assert_eq!(dur("-P1D").compare(&dur("P1D")), ValueOrder::Less);
    }

    #[test]
    fn test_display_round_trip_forms() {
        assert_eq!(dt("2024-01-15T10:30:00Z").to_string(), "2024-01-15T10:30:00Z");
        assert_eq!(
            DateTimeValue::parse("--02-29", CalendarGrain::GMonthDay)
                .unwrap()
                .to_string(),
            "--02-29"
        );
        assert_eq!(dur("P1Y2M").to_string(), "P1Y2M");
        assert_eq!(dur("PT0S").to_string(), "PT0S");
        // offsets normalize to UTC, so rendering carries a Z
        assert_eq!(
            dt("2001-01-01T00:00:00+01:00").to_string(),
            "2000-12-31T23:00:00Z"
        );
    }
}
