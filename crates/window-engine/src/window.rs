//! Data-window resolution.
//!
//! A [`WindowSpec`] describes a job's data window declaratively: how long it
//! is, how far it is shifted, and which calendar boundary the reference
//! instant is aligned to first. [`resolve`] turns that description plus a
//! reference "now" into a concrete half-open [`Interval`].
//!
//! All computation happens in UTC. There is no time-zone or DST handling.
//!
//! # Alignment rules
//!
//! | Granularity | Aligned reference                                      |
//! |-------------|--------------------------------------------------------|
//! | `None`      | unchanged                                              |
//! | `Hour`      | start of the current hour                              |
//! | `Day`       | midnight of the current day                            |
//! | `Week`      | midnight of the *next* Sunday (end of the current week) |
//! | `Month`     | calendar-month walk, see [`WindowSpec::Monthly`]       |
//!
//! Week alignment moves forward while hour and day alignment move backward.
//! That asymmetry is kept as-is: weekly windows end at the close of the
//! week the reference falls in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;

/// Seconds in one logical month (30 × 24h).
pub const LOGICAL_MONTH_SECONDS: i64 = 30 * 24 * 3600;

/// The fixed 30-day duration used to convert durations into month counts.
///
/// This is only a unit of conversion; the resulting windows follow true
/// calendar month lengths.
pub fn logical_month() -> Duration {
    Duration::seconds(LOGICAL_MONTH_SECONDS)
}

// ── Granularity ─────────────────────────────────────────────────────────────

/// Calendar unit the reference instant is aligned to before offset and size
/// are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    None,
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    /// The short tag used in job definitions (`""`, `"h"`, `"d"`, `"w"`, `"M"`).
    pub fn tag(&self) -> &'static str {
        match self {
            Granularity::None => "",
            Granularity::Hour => "h",
            Granularity::Day => "d",
            Granularity::Week => "w",
            Granularity::Month => "M",
        }
    }
}

impl FromStr for Granularity {
    type Err = WindowError;

    /// Parse a truncation tag. Unknown tags are rejected rather than treated
    /// as "no truncation".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(Granularity::None),
            "h" => Ok(Granularity::Hour),
            "d" => Ok(Granularity::Day),
            "w" => Ok(Granularity::Week),
            "M" => Ok(Granularity::Month),
            other => Err(WindowError::InvalidGranularity(format!(
                "'{other}' (expected one of '', h, d, w, M)"
            ))),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::None => "none",
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        };
        f.write_str(name)
    }
}

/// Alignment for fixed-duration windows. Month has its own variant of
/// [`WindowSpec`] because months are not fixed-length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    None,
    Hour,
    Day,
    Week,
}

impl From<Alignment> for Granularity {
    fn from(a: Alignment) -> Self {
        match a {
            Alignment::None => Granularity::None,
            Alignment::Hour => Granularity::Hour,
            Alignment::Day => Granularity::Day,
            Alignment::Week => Granularity::Week,
        }
    }
}

// ── WindowSpec ──────────────────────────────────────────────────────────────

/// Declarative description of a data window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSpec {
    /// Align the reference, shift it by `offset` to get the end, then step
    /// back `size` to get the start.
    Fixed {
        size: Duration,
        offset: Duration,
        alignment: Alignment,
    },
    /// Calendar-month window. The end is midnight of the last day of the
    /// reference's month shifted by `offset_months`. The start is the first
    /// day of that month, moved back a further `size_months - 1` months when
    /// that is positive.
    Monthly { size_months: i64, offset_months: i64 },
}

impl WindowSpec {
    /// Build a spec from duration-typed inputs.
    ///
    /// For [`Granularity::Month`], `size` and `offset` are converted to whole
    /// logical months with `floor(d / 30 days)`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidWindowSpec`] if `size` is negative.
    pub fn new(
        size: Duration,
        offset: Duration,
        granularity: Granularity,
    ) -> Result<Self, WindowError> {
        if size < Duration::zero() {
            return Err(WindowError::InvalidWindowSpec(format!(
                "size must not be negative, got {}s",
                size.num_seconds()
            )));
        }
        Ok(Self::from_durations(size, offset, granularity))
    }

    /// Build a monthly spec from month counts directly.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::InvalidWindowSpec`] if `size_months` is negative.
    pub fn monthly(size_months: i64, offset_months: i64) -> Result<Self, WindowError> {
        if size_months < 0 {
            return Err(WindowError::InvalidWindowSpec(format!(
                "size_months must not be negative, got {size_months}"
            )));
        }
        Ok(WindowSpec::Monthly {
            size_months,
            offset_months,
        })
    }

    /// Infallible construction for callers that already guarantee a
    /// non-negative size.
    pub(crate) fn from_durations(size: Duration, offset: Duration, granularity: Granularity) -> Self {
        let alignment = match granularity {
            Granularity::None => Alignment::None,
            Granularity::Hour => Alignment::Hour,
            Granularity::Day => Alignment::Day,
            Granularity::Week => Alignment::Week,
            Granularity::Month => {
                return WindowSpec::Monthly {
                    size_months: whole_months(size),
                    offset_months: whole_months(offset),
                };
            }
        };
        WindowSpec::Fixed {
            size,
            offset,
            alignment,
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            WindowSpec::Fixed { alignment, .. } => (*alignment).into(),
            WindowSpec::Monthly { .. } => Granularity::Month,
        }
    }

    /// Window size as a duration. Monthly specs report logical months.
    pub fn size(&self) -> Duration {
        match self {
            WindowSpec::Fixed { size, .. } => *size,
            WindowSpec::Monthly { size_months, .. } => months_as_duration(*size_months),
        }
    }

    /// Window offset as a duration. Monthly specs report logical months.
    pub fn offset(&self) -> Duration {
        match self {
            WindowSpec::Fixed { offset, .. } => *offset,
            WindowSpec::Monthly { offset_months, .. } => months_as_duration(*offset_months),
        }
    }

    /// Shorthand for [`resolve`].
    pub fn resolve(&self, reference: DateTime<Utc>) -> Interval {
        resolve(self, reference)
    }
}

/// `floor(d / logical_month)`, exact for sub-second remainders.
fn whole_months(d: Duration) -> i64 {
    let secs = d.num_seconds();
    let floor_secs = if d.subsec_nanos() < 0 { secs - 1 } else { secs };
    floor_secs.div_euclid(LOGICAL_MONTH_SECONDS)
}

fn months_as_duration(months: i64) -> Duration {
    months
        .checked_mul(LOGICAL_MONTH_SECONDS)
        .and_then(Duration::try_seconds)
        .unwrap_or(if months < 0 { Duration::MIN } else { Duration::MAX })
}

// ── Interval ────────────────────────────────────────────────────────────────

/// A half-open `[start, end)` range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

// ── resolve ─────────────────────────────────────────────────────────────────

/// Compute the concrete interval a job run processes for `reference`.
///
/// Pure and total: arithmetic that would leave chrono's representable range
/// saturates at its bounds.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use window_engine::window::{resolve, Granularity, WindowSpec};
///
/// let spec = WindowSpec::new(Duration::hours(1), Duration::hours(-2), Granularity::Hour).unwrap();
/// let reference = Utc.with_ymd_and_hms(2024, 1, 1, 10, 37, 0).unwrap();
/// let interval = resolve(&spec, reference);
/// assert_eq!(interval.end, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
/// assert_eq!(interval.start, Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap());
/// ```
pub fn resolve(spec: &WindowSpec, reference: DateTime<Utc>) -> Interval {
    match *spec {
        WindowSpec::Fixed {
            size,
            offset,
            alignment,
        } => {
            let floating_end = align(reference, alignment);
            let end = shift(floating_end, offset);
            let start = shift(end, -size);
            Interval { start, end }
        }
        WindowSpec::Monthly {
            size_months,
            offset_months,
        } => resolve_monthly(size_months, offset_months, reference),
    }
}

fn resolve_monthly(size_months: i64, offset_months: i64, reference: DateTime<Utc>) -> Interval {
    let month_start = first_of_month(reference.date_naive());
    let shifted = add_months(month_start, offset_months);
    let last_day = add_months(shifted, 1).pred_opt().unwrap_or(NaiveDate::MIN);

    // The end month already counts as one month of the window.
    let mut start_date = first_of_month(last_day);
    let extra_months = size_months.saturating_sub(1);
    if extra_months > 0 {
        start_date = add_months(start_date, -extra_months);
    }

    Interval {
        start: midnight(start_date),
        end: midnight(last_day),
    }
}

fn align(t: DateTime<Utc>, alignment: Alignment) -> DateTime<Utc> {
    match alignment {
        Alignment::None => t,
        Alignment::Hour => shift(midnight(t.date_naive()), Duration::hours(t.hour() as i64)),
        Alignment::Day => midnight(t.date_naive()),
        Alignment::Week => {
            // Saturday is day 6 from Sunday; one past it is the next Sunday.
            let days_ahead = 7 - t.weekday().num_days_from_sunday() as u64;
            let date = t
                .date_naive()
                .checked_add_days(Days::new(days_ahead))
                .unwrap_or(NaiveDate::MAX);
            midnight(date)
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Calendar month arithmetic, saturating at chrono's date bounds.
fn add_months(date: NaiveDate, months: i64) -> NaiveDate {
    let magnitude = u32::try_from(months.unsigned_abs()).unwrap_or(u32::MAX);
    if months >= 0 {
        date.checked_add_months(Months::new(magnitude))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(Months::new(magnitude))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn shift(t: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    t.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
