//! # window-engine
//!
//! Deterministic data-window computation for recurring jobs.
//!
//! Given a reference instant and a declarative window (size, offset and an
//! alignment granularity), compute the concrete `[start, end)` range a job run
//! should process. Hour, day and week windows are fixed-length. Month windows
//! always land on true calendar month boundaries.
//!
//! ## Modules
//!
//! - [`window`] - `WindowSpec`, `Granularity`, `Interval` and the resolver
//! - [`preset`] - Hourly/Daily/Weekly/Monthly presets and the adjustable dial
//! - [`duration`] - Duration parsing, compact and human-readable rendering
//! - [`job`] - Job parameters and the serializable job definition
//! - [`error`] - Error types

pub mod duration;
pub mod error;
pub mod job;
pub mod preset;
pub mod window;

pub use duration::{format_duration, humanize_duration, parse_duration};
pub use error::WindowError;
pub use job::{parse_start_date, JobDefinition, JobSpec, TaskType, Trigger};
pub use preset::{Preset, WindowDial};
pub use window::{
    logical_month, resolve, Alignment, Granularity, Interval, WindowSpec, LOGICAL_MONTH_SECONDS,
};
