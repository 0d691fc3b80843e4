//! Duration parsing utilities.

use anyhow::Context;
use std::time::Duration;

/// Parse a run duration such as "500ms", "30s", "5m", "1h", "1h30m" or
/// "300" (plain seconds).
///
/// Negative values parse to [`Duration::ZERO`], which selects fixed mode.
pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("Empty duration string");
    }

    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    };

    // No suffix - treat as seconds
    let millis = if is_plain_number(body) {
        let secs: f64 = body
            .parse()
            .with_context(|| format!("Invalid duration value: {s}"))?;
        let millis = (secs * 1000.0).round();
        if !millis.is_finite() || millis >= i64::MAX as f64 {
            anyhow::bail!("Duration overflow: {s}");
        }
        millis as i64
    } else {
        parse_units_to_millis(body).with_context(|| format!("Invalid duration value: {s}"))?
    };

    if negative || millis <= 0 {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_millis(millis as u64))
}

/// Digits with at most one decimal point. Rejects float spellings such as
/// "nan", "inf" or "1e3".
fn is_plain_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
        && s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.matches('.').count() <= 1
}

/// Sum a sequence of `<number><unit>` groups.
fn parse_units_to_millis(s: &str) -> anyhow::Result<i64> {
    let mut total: i64 = 0;
    let mut rest = s;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        if digits == 0 {
            anyhow::bail!("Expected a number before '{rest}'");
        }
        let (num_str, after) = rest.split_at(digits);
        let value: i64 = num_str
            .parse()
            .with_context(|| format!("Invalid number: {num_str}"))?;

        let unit_len = after
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(after.len());
        let (unit, next) = after.split_at(unit_len);
        let factor = match unit {
            "ms" => 1,
            "s" | "" => 1_000,
            "m" => 60_000,
            "h" => 3_600_000,
            other => anyhow::bail!("Unknown duration unit: {other}"),
        };

        total = value
            .checked_mul(factor)
            .and_then(|ms| total.checked_add(ms))
            .context("Duration overflow")?;
        rest = next;
    }
    Ok(total)
}
