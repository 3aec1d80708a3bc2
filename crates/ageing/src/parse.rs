//! Lenient field parsers shared by the adapters.
//!
//! Every parser returns `None` instead of guessing: an unreadable date must
//! stay unknown all the way to the bucket.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

// Two-digit-year variants come first: `%Y` would happily read "24" as year 24.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d-%b-%y",
    "%d %b %y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d-%B-%Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Parse a date the way ledger exports write them.
///
/// Numeric dates with the day and month both <= 12 are ambiguous; they are
/// read month-first unless `day_first` is set.
pub fn parse_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let year_first = s.get(..4).is_some_and(|p| p.chars().all(|c| c.is_ascii_digit()));
    if year_first {
        if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(d);
        }
        for fmt in ISO_DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }
    }
    for fmt in NAMED_MONTH_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Drop a trailing time component on numeric dates ("01/06/2023 00:00:00").
    let date_part = s.split_whitespace().next().unwrap_or(s);
    parse_numeric_date(date_part, day_first)
}

fn parse_numeric_date(s: &str, day_first: bool) -> Option<NaiveDate> {
    let sep = ['/', '-', '.'].into_iter().find(|c| s.contains(*c))?;
    let parts: Vec<&str> = s.split(sep).collect();
    if parts.len() != 3 {
        return None;
    }
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.trim().parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    // Year-first: 2023/06/01
    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }

    let year = match parts[2].len() {
        4 => nums[2] as i32,
        2 => 2000 + nums[2] as i32,
        _ => return None,
    };

    let (first, second) = (nums[0], nums[1]);
    let (day, month) = if first > 12 {
        (first, second)
    } else if second > 12 {
        (second, first)
    } else if day_first {
        (first, second)
    } else {
        (second, first)
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Ledger payment term: strip the trailing unit character ("30D" -> 30).
pub fn parse_payment_terms(raw: &str) -> Option<i64> {
    let s = raw.trim();
    let mut chars = s.chars();
    chars.next_back()?;
    parse_integral(chars.as_str())
}

/// Reversal payment term: plain number, no unit.
pub fn parse_term_value(raw: &str) -> Option<i64> {
    parse_integral(raw)
}

// Terms are day counts: negative values read as absent.
fn parse_integral(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let n = match s.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let d = Decimal::from_str(s).ok()?;
            if !d.fract().is_zero() {
                return None;
            }
            i64::try_from(d.trunc()).ok()?
        }
    };
    (n >= 0).then_some(n)
}

/// Monetary amount. Accepts thousands separators and accounting parentheses.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let (negative, body) = match s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner.trim()),
        None => (false, s),
    };
    let cleaned: String = body.chars().filter(|c| *c != ',').collect();
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;
    Some(if negative { -value } else { value })
}
