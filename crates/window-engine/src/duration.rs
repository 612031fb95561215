//! Duration parsing and rendering for window sizes and offsets.
//!
//! Window sizes and offsets travel as plain durations (`"720h"`, `"-2h"`,
//! `"1d12h"`), both on the command line and in written job definitions.

use chrono::Duration;

use crate::error::WindowError;

/// Parse a duration string such as `"2h"`, `"-30m"`, `"1d2h30m"` or `"+1w"`.
///
/// # Format
///
/// An optional `+` or `-` sign, followed by one or more components:
/// - `Nw` - weeks
/// - `Nd` - days (always 24h, there is no calendar here)
/// - `Nh` - hours
/// - `Nm` - minutes
/// - `Ns` - seconds
///
/// A bare `"0"` is accepted as zero.
///
/// # Errors
///
/// Returns [`WindowError::InvalidDuration`] for empty input, unknown units,
/// numbers without a unit, or values too large to represent.
///
/// # Examples
///
/// ```
/// use chrono::Duration;
/// use window_engine::duration::parse_duration;
///
/// assert_eq!(parse_duration("1d2h").unwrap(), Duration::hours(26));
/// assert_eq!(parse_duration("-5m").unwrap(), Duration::minutes(-5));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, WindowError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(WindowError::InvalidDuration("empty duration".to_string()));
    }

    let (sign, rest) = match s.as_bytes().first() {
        Some(b'+') => (1i64, &s[1..]),
        Some(b'-') => (-1i64, &s[1..]),
        _ => (1i64, s),
    };

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(WindowError::InvalidDuration(format!(
            "duration has no components: '{s}'"
        )));
    }

    let overflow = || WindowError::InvalidDuration(format!("duration out of range: '{s}'"));

    let mut total_seconds: i64 = 0;
    let mut num_buf = String::new();

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            num_buf.push(ch);
            continue;
        }
        if num_buf.is_empty() {
            return Err(WindowError::InvalidDuration(format!(
                "expected number before '{ch}' in '{s}'"
            )));
        }
        let n: i64 = num_buf.parse().map_err(|_| overflow())?;
        num_buf.clear();

        let unit_seconds = match ch {
            'w' | 'W' => 7 * 86_400,
            'd' | 'D' => 86_400,
            'h' | 'H' => 3_600,
            'm' => 60,
            's' | 'S' => 1,
            _ => {
                return Err(WindowError::InvalidDuration(format!(
                    "unknown unit '{ch}' in '{s}'"
                )));
            }
        };
        total_seconds = n
            .checked_mul(unit_seconds)
            .and_then(|secs| total_seconds.checked_add(secs))
            .ok_or_else(overflow)?;
    }

    if !num_buf.is_empty() {
        return Err(WindowError::InvalidDuration(format!(
            "number without unit at end of '{s}'"
        )));
    }

    Duration::try_seconds(sign * total_seconds).ok_or_else(overflow)
}

/// Render a duration compactly in hours, minutes and seconds (e.g. `"720h"`,
/// `"-2h30m"`, `"0s"`).
///
/// Hours are not folded into days, so a logical month reads `"720h"`.
/// Sub-second precision is dropped.
pub fn format_duration(d: Duration) -> String {
    let total = d.num_seconds();
    if total == 0 {
        return "0s".to_string();
    }

    let abs = total.unsigned_abs();
    let hours = abs / 3600;
    let minutes = (abs % 3600) / 60;
    let seconds = abs % 60;

    let mut out = String::new();
    if total < 0 {
        out.push('-');
    }
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    if seconds > 0 {
        out.push_str(&format!("{seconds}s"));
    }
    out
}

/// Human-readable rendering of a duration's magnitude (e.g. `"29 days"`,
/// `"1 day, 2 hours"`). The sign is ignored.
pub fn humanize_duration(d: Duration) -> String {
    let abs_seconds = d.num_seconds().unsigned_abs();

    let days = abs_seconds / 86400;
    let remainder = abs_seconds % 86400;
    let hours = remainder / 3600;
    let remainder = remainder % 3600;
    let minutes = remainder / 60;
    let seconds = remainder % 60;

    let mut parts = Vec::new();
    for (amount, unit) in [
        (days, "day"),
        (hours, "hour"),
        (minutes, "minute"),
        (seconds, "second"),
    ] {
        if amount > 0 {
            parts.push(format!(
                "{} {}{}",
                amount,
                unit,
                if amount == 1 { "" } else { "s" }
            ));
        }
    }
    if parts.is_empty() {
        return "0 seconds".to_string();
    }
    parts.join(", ")
}
