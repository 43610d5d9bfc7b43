//! GNU-style numeric and date parsing
//!
//! Multiplier suffixes follow the coreutils convention: `b` is 512,
//! a bare letter (`K`, `M`, ...) or `*iB` form is a power of 1024, a
//! `*B` form is a power of 1000. `K` is 1024 while `kB` is 1000.

use crate::error::{PailError, PailResult};
use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Sign prefix on a head/tail count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    None,
    Plus,
    Minus,
}

/// A parsed `-n`/`-c` argument. Interpretation is per command:
/// `head -n N` takes the first N and `-n -N` all but the last N, while
/// `tail -n N` takes the last N; `+N` means "from record N on" for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSpec {
    pub count: u64,
    pub sign: Sign,
}

/// Multiplier exponent for a unit letter.
fn unit_exponent(letter: char) -> Option<u32> {
    Some(match letter.to_ascii_uppercase() {
        'K' => 1,
        'M' => 2,
        'G' => 3,
        'T' => 4,
        'P' => 5,
        'E' => 6,
        'Z' => 7,
        'Y' => 8,
        'R' => 9,
        'Q' => 10,
        _ => return None,
    })
}

fn multiplier(suffix: &str) -> Option<u128> {
    if suffix.is_empty() {
        return Some(1);
    }
    if suffix == "b" {
        return Some(512);
    }
    let mut chars = suffix.chars();
    let letter = chars.next()?;
    let exp = unit_exponent(letter)?;
    let base: u128 = match chars.as_str() {
        "" => 1024,
        "B" => 1000,
        "iB" => 1024,
        _ => return None,
    };
    base.checked_pow(exp)
}

/// Parse a byte count with an optional multiplier suffix.
/// An optional leading `+` is accepted and ignored.
pub fn parse_size(input: &str) -> PailResult<u64> {
    let bad = || PailError::InvalidSize(input.to_string());

    let s = input.strip_prefix('+').unwrap_or(input);
    if s.is_empty() || s.starts_with('-') {
        return Err(bad());
    }

    let digits_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (mantissa, suffix) = s.split_at(digits_end);
    if mantissa.is_empty() {
        return Err(bad());
    }
    let mult = multiplier(suffix).ok_or_else(bad)?;

    if let Ok(whole) = mantissa.parse::<u128>() {
        let value = whole.checked_mul(mult).ok_or_else(bad)?;
        return u64::try_from(value).map_err(|_| bad());
    }

    // Fractional mantissa, e.g. "1.5K"
    let frac: f64 = mantissa.parse().map_err(|_| bad())?;
    let value = frac * mult as f64;
    if !value.is_finite() || value < 0.0 || value > u64::MAX as f64 {
        return Err(bad());
    }
    Ok(value as u64)
}

/// Parse a head/tail record count, capturing the sign prefix.
pub fn parse_count(input: &str) -> PailResult<CountSpec> {
    let (sign, rest) = match input.as_bytes().first() {
        Some(&b'+') => (Sign::Plus, &input[1..]),
        Some(&b'-') => (Sign::Minus, &input[1..]),
        _ => (Sign::None, input),
    };
    if rest.is_empty() {
        return Err(PailError::InvalidSize(input.to_string()));
    }
    let count = parse_size(rest).map_err(|_| PailError::InvalidSize(input.to_string()))?;
    Ok(CountSpec { count, sign })
}

/// Parse the compact `[[CC]YY]MMDDhhmm[.ss]` stamp accepted by `touch -t`.
pub fn parse_touch_stamp(input: &str) -> PailResult<DateTime<Utc>> {
    let bad = || PailError::InvalidDate(input.to_string());

    let (main, secs) = match input.split_once('.') {
        Some((m, s)) => (m, Some(s)),
        None => (input, None),
    };
    if !main.bytes().all(|b| b.is_ascii_digit()) {
        return Err(bad());
    }
    let second: u32 = match secs {
        Some(s) if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) => {
            s.parse().map_err(|_| bad())?
        }
        Some(_) => return Err(bad()),
        None => 0,
    };

    let (year, rest) = match main.len() {
        8 => (Local::now().year(), main),
        10 => {
            let yy: i32 = main[..2].parse().map_err(|_| bad())?;
            // POSIX pivot: 69-99 map to 19xx
            let year = if yy >= 69 { 1900 + yy } else { 2000 + yy };
            (year, &main[2..])
        }
        12 => (main[..4].parse().map_err(|_| bad())?, &main[4..]),
        _ => return Err(bad()),
    };

    let month: u32 = rest[..2].parse().map_err(|_| bad())?;
    let day: u32 = rest[2..4].parse().map_err(|_| bad())?;
    let hour: u32 = rest[4..6].parse().map_err(|_| bad())?;
    let minute: u32 = rest[6..8].parse().map_err(|_| bad())?;

    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(bad)?;
    local_to_utc(naive).ok_or_else(bad)
}

/// Parse a free-form date string. Accepted forms, tried in order:
/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY-MM-DD HH:MM`, `YYYY-MM-DD`, `@SECONDS` since the epoch.
/// Forms without an offset are interpreted in local time.
pub fn parse_datetime(input: &str) -> PailResult<DateTime<Utc>> {
    let bad = || PailError::InvalidDate(input.to_string());

    if let Some(epoch) = input.strip_prefix('@') {
        let secs: i64 = epoch.parse().map_err(|_| bad())?;
        return DateTime::from_timestamp(secs, 0).ok_or_else(bad);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return local_to_utc(naive).ok_or_else(bad);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let naive = date.and_hms_opt(0, 0, 0).ok_or_else(bad)?;
        return local_to_utc(naive).ok_or_else(bad);
    }

    Err(bad())
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_plain() {
        assert_eq!(parse_size("0").unwrap(), 0);
        assert_eq!(parse_size("42").unwrap(), 42);
        assert_eq!(parse_size("+7").unwrap(), 7);
    }

    #[test]
    fn test_parse_size_binary_vs_decimal() {
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1000);
        assert_eq!(parse_size("1kB").unwrap(), 1000);
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size("1M").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
        assert_eq!(parse_size("1MiB").unwrap(), 1024 * 1024);
        assert_eq!(parse_size("2G").unwrap(), 2 * 1024u64.pow(3));
        assert_eq!(parse_size("1b").unwrap(), 512);
    }

    #[test]
    fn test_parse_size_large_units() {
        assert_eq!(parse_size("1E").unwrap(), 1024u64.pow(6));
        assert_eq!(parse_size("1EB").unwrap(), 1000u64.pow(6));
        // Suffixes through Q parse, but 1Z and beyond overflow u64
        assert!(parse_size("1Z").is_err());
        assert!(parse_size("1Q").is_err());
        assert_eq!(parse_size("0QiB").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_fractional() {
        assert_eq!(parse_size("1.5K").unwrap(), 1536);
        assert_eq!(parse_size("0.5KB").unwrap(), 500);
    }

    #[test]
    fn test_parse_size_invalid() {
        for bad in ["", "X", "1X", "1KX", "1iB", "-3", "1.2.3K", "K"] {
            assert!(
                matches!(parse_size(bad), Err(PailError::InvalidSize(_))),
                "expected InvalidSize for {bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_size_overflow() {
        assert!(parse_size("99999999999999999999Y").is_err());
    }

    #[test]
    fn test_parse_count_signs() {
        assert_eq!(
            parse_count("3").unwrap(),
            CountSpec { count: 3, sign: Sign::None }
        );
        assert_eq!(
            parse_count("+3").unwrap(),
            CountSpec { count: 3, sign: Sign::Plus }
        );
        assert_eq!(
            parse_count("-3").unwrap(),
            CountSpec { count: 3, sign: Sign::Minus }
        );
        assert_eq!(parse_count("2K").unwrap().count, 2048);
    }

    #[test]
    fn test_parse_count_invalid() {
        assert!(parse_count("").is_err());
        assert!(parse_count("+").is_err());
        assert!(parse_count("1X").is_err());
    }

    #[test]
    fn test_touch_stamp_full() {
        let dt = parse_touch_stamp("202301011200").unwrap();
        let local = dt.with_timezone(&Local);
        assert_eq!(local.year(), 2023);
        assert_eq!(local.month(), 1);
        assert_eq!(local.day(), 1);
    }

    #[test]
    fn test_touch_stamp_two_digit_year() {
        let dt = parse_touch_stamp("9901011200").unwrap();
        assert_eq!(dt.with_timezone(&Local).year(), 1999);

        let dt = parse_touch_stamp("0101011200").unwrap();
        assert_eq!(dt.with_timezone(&Local).year(), 2001);
    }

    #[test]
    fn test_touch_stamp_seconds() {
        let dt = parse_touch_stamp("202301011200.30").unwrap();
        use chrono::Timelike;
        assert_eq!(dt.with_timezone(&Local).second(), 30);
    }

    #[test]
    fn test_touch_stamp_invalid() {
        for bad in ["2023", "20230101120", "abc", "202313011200", "202301011200.5"] {
            assert!(parse_touch_stamp(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn test_datetime_formats() {
        assert!(parse_datetime("2023-01-01 12:00:00").is_ok());
        assert!(parse_datetime("2023-01-01T12:00:00").is_ok());
        assert!(parse_datetime("2023-01-01 12:00").is_ok());
        assert!(parse_datetime("2023-01-01").is_ok());
        assert_eq!(
            parse_datetime("@0").unwrap(),
            DateTime::from_timestamp(0, 0).unwrap()
        );
        assert!(parse_datetime("2023-01-01T12:00:00+02:00").is_ok());
    }

    #[test]
    fn test_datetime_invalid() {
        assert!(matches!(
            parse_datetime("not a date"),
            Err(PailError::InvalidDate(_))
        ));
    }
}
