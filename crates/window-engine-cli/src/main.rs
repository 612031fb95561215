use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use window_engine::{
    format_duration, humanize_duration, parse_duration, parse_start_date, Granularity, JobSpec,
    Preset, TaskType, Trigger, WindowSpec,
};

#[derive(Parser)]
#[command(name = "mirage", version, about = "Inspect data windows and write job definitions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the interval a data window covers
    Window {
        #[command(flatten)]
        window: WindowArgs,

        /// Reference instant (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        at: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Build a job definition and write it as JSON
    Create {
        /// Job name
        #[arg(long)]
        name: String,

        /// Owner contact
        #[arg(long)]
        owner: String,

        #[arg(long, value_enum, default_value_t = TriggerKind::Scheduled)]
        trigger: TriggerKind,

        /// First day of the schedule (YYYY-MM-DD); defaults to today
        #[arg(long)]
        start_date: Option<String>,

        /// Cron schedule, e.g. '0 2 * * *' for 2AM every day
        #[arg(long)]
        cron: Option<String>,

        #[command(flatten)]
        window: WindowArgs,

        /// Task to run (python or bq2bq)
        #[arg(long)]
        task: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct WindowArgs {
    /// Preset supplying default size and truncation (hourly, daily, weekly, monthly)
    #[arg(long, default_value = "hourly")]
    preset: String,

    /// Window size, e.g. 24h or 60d (default: the preset's size)
    #[arg(long, allow_hyphen_values = true)]
    size: Option<String>,

    /// Window offset, e.g. -2h (default: 0)
    #[arg(long, allow_hyphen_values = true)]
    offset: Option<String>,

    /// Truncation tag: h, d, w, M, or none (default: the preset's)
    #[arg(long)]
    truncate: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TriggerKind {
    Scheduled,
    Manual,
}

impl WindowArgs {
    fn to_spec(&self) -> Result<WindowSpec> {
        let preset: Preset = self.preset.parse()?;
        let size = match &self.size {
            Some(s) => parse_duration(s).context("invalid --size")?,
            None => preset.size(),
        };
        let offset = match &self.offset {
            Some(s) => parse_duration(s).context("invalid --offset")?,
            None => chrono::Duration::zero(),
        };
        let granularity = match &self.truncate {
            Some(tag) => tag.parse::<Granularity>().context("invalid --truncate")?,
            None => preset.granularity(),
        };
        let spec = WindowSpec::new(size, offset, granularity)?;
        debug!(?spec, %preset, "built window spec");
        Ok(spec)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Window { window, at, json } => cmd_window(&window, at.as_deref(), json),
        Commands::Create {
            name,
            owner,
            trigger,
            start_date,
            cron,
            window,
            task,
            output,
        } => {
            let trigger = match trigger {
                TriggerKind::Manual => Trigger::Manual,
                TriggerKind::Scheduled => {
                    let start_date = match start_date {
                        Some(s) => parse_start_date(&s)?,
                        None => Utc::now().date_naive(),
                    };
                    let Some(cron) = cron else {
                        bail!("--cron is required for scheduled jobs");
                    };
                    Trigger::Scheduled { start_date, cron }
                }
            };
            let job = JobSpec {
                name,
                owner,
                trigger,
                window: window.to_spec()?,
                task: task.parse::<TaskType>()?,
            };
            cmd_create(&job, output)
        }
    }
}

fn cmd_window(args: &WindowArgs, at: Option<&str>, json: bool) -> Result<()> {
    let spec = args.to_spec()?;
    let reference = match at {
        Some(s) => parse_reference(s)?,
        None => Utc::now(),
    };
    let interval = spec.resolve(reference);
    debug!(%reference, %interval, "resolved window");

    if json {
        let out = serde_json::json!({
            "reference": reference.to_rfc3339(),
            "start": interval.start.to_rfc3339(),
            "end": interval.end.to_rfc3339(),
            "duration_seconds": interval.duration().num_seconds(),
            "duration": humanize_duration(interval.duration()),
            "size": format_duration(spec.size()),
            "offset": format_duration(spec.offset()),
            "truncate_to": spec.granularity().tag(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("start:    {}", interval.start.to_rfc3339());
        println!("end:      {}", interval.end.to_rfc3339());
        println!("duration: {}", humanize_duration(interval.duration()));
    }
    Ok(())
}

fn cmd_create(job: &JobSpec, output: Option<PathBuf>) -> Result<()> {
    let json = job.definition()?.to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(&path, format!("{json}\n"))
                .with_context(|| format!("failed to write {}", path.display()))?;
            debug!(path = %path.display(), job = %job.name, "wrote job definition");
            eprintln!("Done! Your job has been created in {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Accept a full RFC 3339 instant or a bare date (midnight UTC).
fn parse_reference(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid --at '{s}': expected RFC 3339 or YYYY-MM-DD"))?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}
