// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lenient parsing of numeric form input.
//!
//! Distance and price fields arrive as free text. Anything that is not a
//! plain decimal number is treated as absent.

/// Parses a decimal string into hundredths, rounding half away from zero
/// beyond the second fractional digit. Accepts `.` or `,` as the separator.
fn parse_hundredths(raw: &str) -> Option<i64> {
    let trimmed: &str = raw.trim();
    let (negative, unsigned): (bool, &str) = trimmed
        .strip_prefix('-')
        .map_or((false, trimmed), |rest| (true, rest));

    let (whole, fraction) = unsigned.split_once(['.', ',']).unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let whole_value: i64 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };
    let mut digits = fraction
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(i64::from);
    let tenths: i64 = digits.next().unwrap_or(0);
    let hundredths: i64 = digits.next().unwrap_or(0);
    let round_up: i64 = i64::from(digits.next().unwrap_or(0) >= 5);

    let magnitude: i64 = whole_value
        .checked_mul(100)?
        .checked_add(tenths * 10 + hundredths + round_up)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parses a kilometer figure, rounding to the nearest whole km.
///
/// Returns `None` for empty or non-numeric input.
#[must_use]
pub fn parse_km(raw: &str) -> Option<i64> {
    let hundredths: i64 = parse_hundredths(raw)?;
    let magnitude: u64 = hundredths.unsigned_abs();
    let rounded: u64 = magnitude / 100 + u64::from(magnitude % 100 >= 50);
    let rounded: i64 = i64::try_from(rounded).ok()?;
    Some(if hundredths < 0 { -rounded } else { rounded })
}

/// Parses a money amount into cents.
///
/// Returns `None` for empty or non-numeric input.
#[must_use]
pub fn parse_money_cents(raw: &str) -> Option<i64> {
    parse_hundredths(raw)
}

/// Parses a whole count such as a stock quantity.
///
/// Returns `None` for empty, fractional or non-numeric input.
#[must_use]
pub fn parse_count(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Formats cents as a decimal amount with two fractional digits.
#[must_use]
pub fn format_money_cents(cents: i64) -> String {
    let sign: &str = if cents < 0 { "-" } else { "" };
    let magnitude: u64 = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}
