//! Job parameters collected for a recurring data-processing job, and the
//! serializable definition handed to the job writer.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::duration::format_duration;
use crate::error::WindowError;
use crate::window::WindowSpec;

/// Date format for schedule start dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest year a schedule may start in.
pub const MIN_START_YEAR: i32 = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Runs automatically from `start_date` on the `cron` schedule.
    Scheduled { start_date: NaiveDate, cron: String },
    /// Triggered by hand only.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaskType {
    #[serde(rename = "python")]
    Python,
    #[serde(rename = "bq2bq")]
    Bq2Bq,
}

impl TaskType {
    pub fn name(&self) -> &'static str {
        match self {
            TaskType::Python => "python",
            TaskType::Bq2Bq => "bq2bq",
        }
    }
}

impl FromStr for TaskType {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" => Ok(TaskType::Python),
            "bq2bq" => Ok(TaskType::Bq2Bq),
            other => Err(WindowError::InvalidJob(format!(
                "unknown task '{other}' (expected python or bq2bq)"
            ))),
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse a schedule start date (`YYYY-MM-DD`).
///
/// # Errors
///
/// Returns [`WindowError::InvalidDatetime`] if the date does not parse or
/// falls before [`MIN_START_YEAR`].
pub fn parse_start_date(s: &str) -> Result<NaiveDate, WindowError> {
    let date = NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| WindowError::InvalidDatetime(format!("'{}': {}", s.trim(), e)))?;
    if date.year() < MIN_START_YEAR {
        return Err(WindowError::InvalidDatetime(format!(
            "dates before {MIN_START_YEAR} are not allowed: '{}'",
            s.trim()
        )));
    }
    Ok(date)
}

/// Everything gathered for a new job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSpec {
    pub name: String,
    pub owner: String,
    pub trigger: Trigger,
    pub window: WindowSpec,
    pub task: TaskType,
}

impl JobSpec {
    /// Check the fields the writer relies on. Cron syntax is not checked here.
    pub fn validate(&self) -> Result<(), WindowError> {
        if self.name.trim().is_empty() {
            return Err(WindowError::InvalidJob("name is required".to_string()));
        }
        if self.owner.trim().is_empty() {
            return Err(WindowError::InvalidJob("owner is required".to_string()));
        }
        if let Trigger::Scheduled { start_date, cron } = &self.trigger {
            if cron.trim().is_empty() {
                return Err(WindowError::InvalidJob(
                    "scheduled jobs need a cron expression".to_string(),
                ));
            }
            if start_date.year() < MIN_START_YEAR {
                return Err(WindowError::InvalidJob(format!(
                    "start date {start_date} is before {MIN_START_YEAR}"
                )));
            }
        }
        Ok(())
    }

    /// Validate and convert into the written form.
    pub fn definition(&self) -> Result<JobDefinition, WindowError> {
        self.validate()?;

        let (schedule, trigger) = match &self.trigger {
            Trigger::Scheduled { start_date, cron } => (
                Some(ScheduleDefinition {
                    start_date: start_date.format(DATE_FORMAT).to_string(),
                    interval: cron.trim().to_string(),
                }),
                "scheduled",
            ),
            Trigger::Manual => (None, "manual"),
        };

        Ok(JobDefinition {
            name: self.name.trim().to_string(),
            owner: self.owner.trim().to_string(),
            trigger,
            schedule,
            task: self.task,
            window: WindowDefinition {
                size: format_duration(self.window.size()),
                offset: format_duration(self.window.offset()),
                truncate_to: self.window.granularity().tag(),
            },
        })
    }
}

/// Serialized job definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDefinition {
    pub name: String,
    pub owner: String,
    pub trigger: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<ScheduleDefinition>,
    pub task: TaskType,
    pub window: WindowDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleDefinition {
    pub start_date: String,
    pub interval: String,
}

/// Window in its duration-string form: `{size: "720h", offset: "0s", truncate_to: "M"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowDefinition {
    pub size: String,
    pub offset: String,
    pub truncate_to: &'static str,
}

impl JobDefinition {
    pub fn to_json_pretty(&self) -> Result<String, WindowError> {
        serde_json::to_string_pretty(self).map_err(|e| WindowError::InvalidJob(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::Granularity;
    use chrono::Duration;

    fn scheduled_job() -> JobSpec {
        JobSpec {
            name: "sales-daily".to_string(),
            owner: "data@example.com".to_string(),
            trigger: Trigger::Scheduled {
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                cron: "0 2 * * *".to_string(),
            },
            window: WindowSpec::new(Duration::hours(24), Duration::zero(), Granularity::Day)
                .unwrap(),
            task: TaskType::Bq2Bq,
        }
    }

    #[test]
    fn test_parse_start_date() {
        assert_eq!(
            parse_start_date("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn test_parse_start_date_rejects_before_2000() {
        let err = parse_start_date("1999-12-31").unwrap_err();
        assert!(err.to_string().contains("before 2000"));
    }

    #[test]
    fn test_parse_start_date_rejects_garbage() {
        assert!(matches!(
            parse_start_date("15/03/2024"),
            Err(WindowError::InvalidDatetime(_))
        ));
    }

    #[test]
    fn test_task_parse() {
        assert_eq!("Python".parse::<TaskType>().unwrap(), TaskType::Python);
        assert_eq!("BQ2BQ".parse::<TaskType>().unwrap(), TaskType::Bq2Bq);
        assert!("spark".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_validate_requires_name_and_owner() {
        let mut job = scheduled_job();
        job.name = "  ".to_string();
        assert!(job.validate().is_err());

        let mut job = scheduled_job();
        job.owner = String::new();
        assert!(job.validate().is_err());
    }

    #[test]
    fn test_validate_requires_cron_for_scheduled() {
        let mut job = scheduled_job();
        job.trigger = Trigger::Scheduled {
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            cron: String::new(),
        };
        assert!(job.validate().unwrap_err().to_string().contains("cron"));
    }

    #[test]
    fn test_manual_job_needs_no_schedule() {
        let mut job = scheduled_job();
        job.trigger = Trigger::Manual;
        let def = job.definition().unwrap();
        assert_eq!(def.trigger, "manual");
        assert!(def.schedule.is_none());
    }

    #[test]
    fn test_definition_window_fields() {
        let def = scheduled_job().definition().unwrap();
        assert_eq!(def.window.size, "24h");
        assert_eq!(def.window.offset, "0s");
        assert_eq!(def.window.truncate_to, "d");
    }

    #[test]
    fn test_definition_monthly_window_uses_logical_months() {
        let mut job = scheduled_job();
        job.window = WindowSpec::monthly(2, -1).unwrap();
        let def = job.definition().unwrap();
        assert_eq!(def.window.size, "1440h");
        assert_eq!(def.window.offset, "-720h");
        assert_eq!(def.window.truncate_to, "M");
    }

    #[test]
    fn test_definition_json() {
        let json = scheduled_job().definition().unwrap().to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "sales-daily");
        assert_eq!(value["trigger"], "scheduled");
        assert_eq!(value["schedule"]["start_date"], "2024-01-01");
        assert_eq!(value["schedule"]["interval"], "0 2 * * *");
        assert_eq!(value["task"], "bq2bq");
        assert_eq!(value["window"]["truncate_to"], "d");
    }
}
