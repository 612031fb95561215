//! Named window presets and the adjustable dial built on them.
//!
//! A preset picks a granularity and supplies the step sizes used when the
//! window is adjusted interactively: up/down changes the size by one default
//! size, left/right moves the offset by one offset step.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WindowError;
use crate::window::{logical_month, resolve, Granularity, Interval, WindowSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    #[default]
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Preset {
    /// All presets, in display order.
    pub const ALL: [Preset; 4] = [Preset::Hourly, Preset::Daily, Preset::Weekly, Preset::Monthly];

    pub fn name(&self) -> &'static str {
        match self {
            Preset::Hourly => "Hourly",
            Preset::Daily => "Daily",
            Preset::Weekly => "Weekly",
            Preset::Monthly => "Monthly",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Preset::Hourly => "Job runs on hourly data",
            Preset::Daily => "Job runs on daily data",
            Preset::Weekly => "Job runs on weekly data",
            Preset::Monthly => "Job runs on monthly data",
        }
    }

    /// Default window size; also the step for growing or shrinking it.
    pub fn size(&self) -> Duration {
        match self {
            Preset::Hourly => Duration::hours(1),
            Preset::Daily => Duration::hours(24),
            Preset::Weekly => Duration::days(7),
            Preset::Monthly => logical_month(),
        }
    }

    /// Amount one offset adjustment moves the window.
    pub fn offset_step(&self) -> Duration {
        match self {
            Preset::Hourly => Duration::minutes(5),
            Preset::Daily => Duration::hours(1),
            Preset::Weekly | Preset::Monthly => Duration::hours(24),
        }
    }

    pub fn granularity(&self) -> Granularity {
        match self {
            Preset::Hourly => Granularity::Hour,
            Preset::Daily => Granularity::Day,
            Preset::Weekly => Granularity::Week,
            Preset::Monthly => Granularity::Month,
        }
    }
}

impl FromStr for Preset {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                WindowError::InvalidWindowSpec(format!(
                    "unknown preset '{}' (expected hourly, daily, weekly or monthly)",
                    s.trim()
                ))
            })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── WindowDial ──────────────────────────────────────────────────────────────

/// Interactive window state: a selected preset plus the current size and
/// offset. Every state it can reach yields a valid [`WindowSpec`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowDial {
    preset: Preset,
    size: Duration,
    offset: Duration,
}

impl Default for WindowDial {
    fn default() -> Self {
        Self::with_preset(Preset::default())
    }
}

impl WindowDial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preset(preset: Preset) -> Self {
        Self {
            preset,
            size: preset.size(),
            offset: Duration::zero(),
        }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn size(&self) -> Duration {
        self.size
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    /// Switch presets, resetting size and offset. Reselecting the current
    /// preset keeps the adjustments.
    pub fn select(&mut self, preset: Preset) {
        if preset != self.preset {
            *self = Self::with_preset(preset);
        }
    }

    pub fn grow(&mut self) {
        self.size = self
            .size
            .checked_add(&self.preset.size())
            .unwrap_or(self.size);
    }

    /// Shrink by one step. Never goes below zero.
    pub fn shrink(&mut self) {
        if self.size > Duration::zero() {
            self.size = (self.size - self.preset.size()).max(Duration::zero());
        }
    }

    pub fn shift_earlier(&mut self) {
        self.offset = self
            .offset
            .checked_sub(&self.preset.offset_step())
            .unwrap_or(self.offset);
    }

    pub fn shift_later(&mut self) {
        self.offset = self
            .offset
            .checked_add(&self.preset.offset_step())
            .unwrap_or(self.offset);
    }

    pub fn spec(&self) -> WindowSpec {
        WindowSpec::from_durations(self.size, self.offset, self.preset.granularity())
    }

    pub fn interval(&self, reference: DateTime<Utc>) -> Interval {
        resolve(&self.spec(), reference)
    }
}
