use std::{fmt, str::FromStr};

use crate::EngineError;

/// Money amount represented as **integer cents**.
///
/// Balances, aggregates and entry amounts are all stored as `i64` minor
/// units to avoid floating-point drift; this newtype is the boundary type
/// for parsing caller-supplied decimal strings and for display.
///
/// Parsing accepts `.` or `,` as decimal separator and rejects more than
/// two decimals:
///
/// ```rust
/// use engine::MoneyCents;
///
/// assert_eq!("10".parse::<MoneyCents>().unwrap().cents(), 1000);
/// assert_eq!("10,5".parse::<MoneyCents>().unwrap().cents(), 1050);
/// assert!("12.345".parse::<MoneyCents>().is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct MoneyCents(i64);

impl MoneyCents {
    pub const ZERO: MoneyCents = MoneyCents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for MoneyCents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let units = abs / 100;
        let cents = abs % 100;
        write!(f, "{sign}{units}.{cents:02}")
    }
}

impl From<i64> for MoneyCents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<MoneyCents> for i64 {
    fn from(value: MoneyCents) -> Self {
        value.0
    }
}

impl FromStr for MoneyCents {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let invalid = || EngineError::InvalidAmount(format!("invalid amount: {input}"));

        let (sign, rest) = match input.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, input),
        };
        if rest.is_empty() {
            return Err(invalid());
        }

        let mut parts = rest.splitn(2, ['.', ',']);
        let units_part = parts.next().unwrap_or_default();
        let cents_part = parts.next().unwrap_or("");

        if units_part.is_empty() || !units_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if cents_part.len() > 2 || !cents_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let units: i64 = units_part.parse().map_err(|_| invalid())?;
        let cents: i64 = match cents_part.len() {
            0 => 0,
            1 => cents_part.parse::<i64>().map_err(|_| invalid())? * 10,
            _ => cents_part.parse().map_err(|_| invalid())?,
        };

        units
            .checked_mul(100)
            .and_then(|total| total.checked_add(cents))
            .map(|total| MoneyCents(sign * total))
            .ok_or_else(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!("1000".parse::<MoneyCents>().unwrap(), MoneyCents::new(100_000));
        assert_eq!("12.34".parse::<MoneyCents>().unwrap(), MoneyCents::new(1234));
        assert_eq!("12,3".parse::<MoneyCents>().unwrap(), MoneyCents::new(1230));
        assert_eq!("-5.00".parse::<MoneyCents>().unwrap(), MoneyCents::new(-500));
    }

    #[test]
    fn rejects_malformed_amounts() {
        assert!("".parse::<MoneyCents>().is_err());
        assert!("-".parse::<MoneyCents>().is_err());
        assert!("12.345".parse::<MoneyCents>().is_err());
        assert!("12.3x".parse::<MoneyCents>().is_err());
        assert!("abc".parse::<MoneyCents>().is_err());
    }

    #[test]
    fn formats_with_two_decimals() {
        assert_eq!(MoneyCents::new(100_000).to_string(), "1000.00");
        assert_eq!(MoneyCents::new(-1234).to_string(), "-12.34");
        assert_eq!(MoneyCents::ZERO.to_string(), "0.00");
    }
}
