//! Duration strings in the `1h30m` / `500ms` / `2.5s` format.
//!
//! Both the keep-alive field on chat requests and the gateway timeout in
//! the configuration accept this format. A duration string is an optional
//! sign followed by one or more `<number><unit>` groups, where the number
//! may carry a decimal fraction and the unit is one of `ns`, `us` (or
//! `µs`), `ms`, `s`, `m`, `h`. The bare string `"0"` is also accepted.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Largest magnitude a duration string may express (signed 64-bit nanoseconds).
const MAX_NANOS: u128 = i64::MAX as u128;

/// Fraction digits beyond this are dropped; they are below nanosecond precision.
const MAX_FRACTION_DIGITS: u32 = 18;

/// Errors produced while parsing a duration string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("invalid duration \"{0}\"")]
    Invalid(String),

    #[error("missing unit in duration \"{0}\"")]
    MissingUnit(String),

    #[error("unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },

    #[error("duration \"{0}\" is out of range")]
    Overflow(String),
}

/// A parsed duration string: its magnitude plus whether it was negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedDuration {
    pub negative: bool,
    pub magnitude: Duration,
}

impl SignedDuration {
    /// Zero, positive.
    pub const ZERO: Self = Self {
        negative: false,
        magnitude: Duration::ZERO,
    };

    /// `true` when the value is strictly below zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.negative && !self.magnitude.is_zero()
    }
}

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(NANOS_PER_MICRO),
        "ms" => Some(NANOS_PER_MILLI),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Split off the leading run of ASCII digits.
fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

/// Parse a duration string such as `"300ms"`, `"-1.5h"` or `"2h45m"`.
pub fn parse_duration(input: &str) -> Result<SignedDuration, DurationParseError> {
    let invalid = || DurationParseError::Invalid(input.to_string());

    let mut rest = input;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(SignedDuration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, after_whole) = split_digits(rest);
        rest = after_whole;

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after_fraction) = split_digits(after_dot);
            fraction = digits;
            rest = after_fraction;
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = rest
            .find(|c: char| c == '.' || c.is_ascii_digit())
            .unwrap_or(rest.len());
        if unit_end == 0 {
            return Err(DurationParseError::MissingUnit(input.to_string()));
        }
        let (unit, after_unit) = rest.split_at(unit_end);
        rest = after_unit;
        let scale = unit_nanos(unit).ok_or_else(|| DurationParseError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        let overflow = || DurationParseError::Overflow(input.to_string());
        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| overflow())?
        };
        let mut group = whole_value.checked_mul(scale).ok_or_else(overflow)?;

        let mut fraction_value: u128 = 0;
        let mut fraction_scale: u128 = 1;
        for digit in fraction.bytes().take(MAX_FRACTION_DIGITS as usize) {
            fraction_value = fraction_value * 10 + u128::from(digit - b'0');
            fraction_scale *= 10;
        }
        group += fraction_value * scale / fraction_scale;

        total = total.checked_add(group).ok_or_else(overflow)?;
        if total > MAX_NANOS {
            return Err(overflow());
        }
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| invalid())?;
    let nanos = u32::try_from(total % NANOS_PER_SEC).map_err(|_| invalid())?;
    Ok(SignedDuration {
        negative,
        magnitude: Duration::new(secs, nanos),
    })
}

/// Render `value / unit` with the remainder as a trimmed decimal fraction.
fn write_scaled(f: &mut impl fmt::Write, value: u128, unit: u128) -> fmt::Result {
    let whole = value / unit;
    let remainder = value % unit;
    if remainder == 0 {
        return write!(f, "{whole}");
    }
    let width = unit.to_string().len() - 1;
    let digits = format!("{remainder:0width$}");
    write!(f, "{whole}.{}", digits.trim_end_matches('0'))
}

/// Format a duration the way [`parse_duration`] reads it back.
///
/// Sub-second values use the largest fitting unit (`1.5ms`, `250µs`,
/// `40ns`); everything else is written as hours, minutes and seconds,
/// omitting leading zero components (`30s`, `5m0s`, `1h0m0s`).
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = write_duration(&mut out, duration);
    out
}

fn write_duration(out: &mut String, duration: Duration) -> fmt::Result {
    use fmt::Write as _;

    let nanos = duration.as_nanos();
    if nanos == 0 {
        return out.write_str("0s");
    }

    if nanos < NANOS_PER_SEC {
        let (unit, suffix) = if nanos < NANOS_PER_MICRO {
            (1, "ns")
        } else if nanos < NANOS_PER_MILLI {
            (NANOS_PER_MICRO, "\u{00b5}s")
        } else {
            (NANOS_PER_MILLI, "ms")
        };
        write_scaled(out, nanos, unit)?;
        return out.write_str(suffix);
    }

    let total_secs = nanos / NANOS_PER_SEC;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds_nanos = (total_secs % 60) * NANOS_PER_SEC + nanos % NANOS_PER_SEC;

    if hours > 0 {
        write!(out, "{hours}h{minutes}m")?;
    } else if minutes > 0 {
        write!(out, "{minutes}m")?;
    }
    write_scaled(out, seconds_nanos, NANOS_PER_SEC)?;
    out.write_str("s")
}
