//! Display formatting for prices, market caps and percentage changes.
//!
//! Numbers use the dashboard's locale convention: `.` groups thousands and
//! `,` separates decimals (`$1.234,56`). Compact market caps keep a plain
//! two-decimal mantissa (`$1.23T`).

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use crate::net::types::Currency;

const TRILLION: f64 = 1e12;
const BILLION: f64 = 1e9;
const MILLION: f64 = 1e6;

pub const NOT_AVAILABLE: &str = "N/A";

/// Price with exactly two decimals, e.g. `€43.210,50`.
#[must_use]
pub fn format_price(price: f64, currency: Currency) -> String {
    format!("{}{}", currency.symbol(), localized(price, 2, 2))
}

/// Market cap abbreviated to T / B / M, otherwise grouped in full.
#[must_use]
pub fn format_market_cap(market_cap: f64, currency: Currency) -> String {
    let symbol = currency.symbol();
    if market_cap >= TRILLION {
        format!("{symbol}{:.2}T", market_cap / TRILLION)
    } else if market_cap >= BILLION {
        format!("{symbol}{:.2}B", market_cap / BILLION)
    } else if market_cap >= MILLION {
        format!("{symbol}{:.2}M", market_cap / MILLION)
    } else {
        format!("{symbol}{}", localized(market_cap, 0, 3))
    }
}

/// Signed two-decimal percentage. Missing and zero changes read `N/A`.
#[must_use]
pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(p) if p != 0.0 && p.is_finite() => {
            let sign = if p > 0.0 { "+" } else { "" };
            format!("{sign}{p:.2}%")
        }
        _ => NOT_AVAILABLE.to_owned(),
    }
}

/// Calendar day of a unix timestamp (seconds, UTC) as `dd/mm/yyyy`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_day(unix_secs: f64) -> String {
    if !unix_secs.is_finite() {
        return NOT_AVAILABLE.to_owned();
    }
    match time::OffsetDateTime::from_unix_timestamp(unix_secs.floor() as i64) {
        Ok(at) => format!("{:02}/{:02}/{}", at.day(), u8::from(at.month()), at.year()),
        Err(_) => NOT_AVAILABLE.to_owned(),
    }
}

/// Insert `.` between every group of three digits, counting from the right.
#[must_use]
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

fn localized(value: f64, min_fraction: usize, max_fraction: usize) -> String {
    if !value.is_finite() {
        return NOT_AVAILABLE.to_owned();
    }
    let fixed = format!("{:.*}", max_fraction, value.abs());
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = fraction.to_owned();
    while fraction.len() > min_fraction && fraction.ends_with('0') {
        fraction.pop();
    }

    let mut out = String::new();
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    out.push_str(&group_thousands(integer));
    if !fraction.is_empty() {
        out.push(',');
        out.push_str(&fraction);
    }
    out
}
