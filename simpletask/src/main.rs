//! `SimpleTask` — offline-friendly task manager CLI.
//!
//! Talks to a `simpletask-server` document store over HTTP and renders
//! task lists, calendar groupings, and completion stats. Configuration
//! via CLI flags, environment variables, or config file
//! (`~/.config/simpletask/config.toml`).
//!
//! ```bash
//! # Add a task due today
//! simpletask --store-url http://127.0.0.1:7878 --owner alice \
//!     add "Buy milk" --priority high --date 2026-08-24
//!
//! # List pending tasks (store URL and owner via environment)
//! SIMPLETASK_STORE_URL=http://127.0.0.1:7878 SIMPLETASK_OWNER=alice \
//!     simpletask list --filter pending
//! ```

use std::path::Path;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use simpletask::config::{CliArgs, ClientConfig, Command};
use simpletask::profile::ProfileRepository;
use simpletask::session::AuthSession;
use simpletask::store::http::HttpStore;
use simpletask::tasks::{TaskCache, TaskError, TaskMutationCoordinator, TaskRepository};
use simpletask_core::calendar::{self, DateStatus};
use simpletask_core::filter::{self, StatusFilter};
use simpletask_core::stats::{self, Period};
use simpletask_core::task::{DATE_FORMAT, OwnerId, Priority, TIME_FORMAT, Task, TaskDraft, TaskId};

type CliError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before doing any work (logs go to file, not stdout).
    let log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!("simpletask starting");

    let store = match config.to_http_store() {
        Ok(Some(store)) => Arc::new(store),
        Ok(None) => {
            drop(log_guard);
            eprintln!(
                "Error: no store URL configured; pass --store-url or set SIMPLETASK_STORE_URL"
            );
            std::process::exit(1);
        }
        Err(e) => {
            drop(log_guard);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let Some(owner) = cli.owner else {
        drop(log_guard);
        eprintln!("Error: no owner configured; pass --owner or set SIMPLETASK_OWNER");
        std::process::exit(1);
    };

    let command = cli.command.unwrap_or_else(|| Command::List {
        filter: "all".to_string(),
        search: String::new(),
    });

    match run(command, store, OwnerId::new(owner), &config).await {
        Ok(()) => tracing::info!("simpletask exiting"),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            drop(log_guard);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, which carries command
/// output). Returns a [`WorkerGuard`] that must be held until shutdown to
/// ensure all buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("simpletask.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Wires the repository stack against the HTTP store and dispatches the
/// subcommand.
async fn run(
    command: Command,
    store: Arc<HttpStore>,
    owner: OwnerId,
    config: &ClientConfig,
) -> Result<(), CliError> {
    let session = AuthSession::signed_in(owner.clone());
    let repository = Arc::new(TaskRepository::with_config(
        Arc::clone(&store),
        session.handle(),
        config,
    ));
    let cache = Arc::new(TaskCache::new(repository));
    let coordinator = TaskMutationCoordinator::new(Arc::clone(&cache));

    match command {
        Command::Add {
            title,
            description,
            priority,
            date,
            time,
        } => {
            let mut draft = TaskDraft::new(title);
            if let Some(description) = description {
                draft = draft.with_description(description);
            }
            if let Some(priority) = priority {
                draft = draft.with_priority(parse_priority(&priority)?);
            }
            if let Some(date) = date {
                draft = draft.with_date(NaiveDate::parse_from_str(&date, DATE_FORMAT)?);
            }
            if let Some(time) = time {
                draft = draft.with_time(NaiveTime::parse_from_str(&time, TIME_FORMAT)?);
            }
            let tasks = coordinator.create_task(draft).await?;
            println!("Added. {} task(s) total.", tasks.len());
        }
        Command::List { filter, search } => {
            let tasks = cache.refresh().await?;
            let status = parse_filter(&filter)?;
            let visible = filter::filter_and_search(&tasks, status, &search);
            if visible.is_empty() {
                println!("No tasks.");
            }
            for task in visible {
                println!("{}", format_task_line(task));
            }
        }
        Command::Toggle { id } => {
            let id = TaskId::new(id);
            let tasks = cache.refresh().await?;
            let currently_completed = tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| task.completed)
                .ok_or_else(|| TaskError::NotFound(id.clone()))?;
            coordinator.toggle_completion(&id, currently_completed).await?;
            if currently_completed {
                println!("Reopened {id}.");
            } else {
                println!("Completed {id}.");
            }
        }
        Command::Delete { id } => {
            let tasks = coordinator.delete_task(&TaskId::new(id)).await?;
            println!("Deleted. {} task(s) remaining.", tasks.len());
        }
        Command::Calendar => {
            let tasks = cache.refresh().await?;
            if tasks.is_empty() {
                println!("No tasks.");
            }
            for (date, day_tasks) in &calendar::group_by_date(&tasks) {
                let status = match calendar::date_status(day_tasks) {
                    DateStatus::Pending => "pending",
                    DateStatus::Done => "done",
                    DateStatus::Mixed => "mixed",
                };
                println!("{date} ({status})");
                for task in day_tasks {
                    println!("  {}", format_task_line(task));
                }
            }
        }
        Command::Stats { period } => {
            let tasks = cache.refresh().await?;
            let now = Utc::now();
            let totals = stats::task_totals(&tasks, now);
            println!(
                "total {}  completed {}  pending {}  due this week {}",
                totals.total, totals.completed, totals.pending, totals.this_week
            );
            let series = stats::bucket_by_period(&tasks, parse_period(&period)?, now);
            for (label, count) in series.labels.iter().zip(&series.counts) {
                let bar = "#".repeat(usize::try_from(*count).unwrap_or_default());
                println!("{label:>4} {count:>3} {bar}");
            }
        }
        Command::Profile => {
            let profiles = ProfileRepository::with_config(store, config);
            match profiles.fetch(&owner).await? {
                Some(profile) => {
                    println!("name:   {}", profile.name.as_deref().unwrap_or("-"));
                    println!("email:  {}", profile.email.as_deref().unwrap_or("-"));
                    println!("avatar: {}", profile.avatar_url.as_deref().unwrap_or("-"));
                }
                None => println!("No profile found for {owner}."),
            }
        }
    }

    Ok(())
}

/// Parse a `--filter` argument value.
fn parse_filter(value: &str) -> Result<StatusFilter, CliError> {
    match value {
        "all" => Ok(StatusFilter::All),
        "pending" => Ok(StatusFilter::Pending),
        "completed" => Ok(StatusFilter::Completed),
        other => {
            Err(format!("unknown filter {other:?} (expected all, pending, or completed)").into())
        }
    }
}

/// Parse a `--priority` argument value. Strict, unlike the lenient
/// default resolution applied to stored documents.
fn parse_priority(value: &str) -> Result<Priority, CliError> {
    match value {
        "high" => Ok(Priority::High),
        "medium" => Ok(Priority::Medium),
        "low" => Ok(Priority::Low),
        other => Err(format!("unknown priority {other:?} (expected high, medium, or low)").into()),
    }
}

/// Parse a `--period` argument value.
fn parse_period(value: &str) -> Result<Period, CliError> {
    match value {
        "week" => Ok(Period::Week),
        "month" => Ok(Period::Month),
        "year" => Ok(Period::Year),
        other => Err(format!("unknown period {other:?} (expected week, month, or year)").into()),
    }
}

/// Format a task as a single list line: marker, id, title, priority, and
/// due date/time when present.
fn format_task_line(task: &Task) -> String {
    let marker = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{marker}] {} {} ({})", task.id, task.title, task.priority);
    if let Some(date) = &task.date {
        line.push_str(&format!(" due {date}"));
        if let Some(time) = &task.time {
            line.push_str(&format!(" {time}"));
        }
    }
    line
}
