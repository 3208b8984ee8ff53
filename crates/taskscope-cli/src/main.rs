use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskscope_core::config;
use taskscope_core::{
    report, resolver, CombineMode, ConduitTracker, Config, CsvExporter, DateField, Error,
    ProjectDirectory, TaskAggregator, TaskFilter, TimeWindow, TrackerSource,
};

#[derive(Parser)]
#[command(name = "taskscope")]
#[command(version, about = "Team task report for Phabricator-compatible trackers", long_about = None)]
struct Cli {
    /// Start date in YYYY-MM-DD format
    #[arg(long)]
    start_date: String,

    /// End date in YYYY-MM-DD format
    #[arg(long)]
    end_date: String,

    /// Comma-separated list of project names (default: all projects)
    #[arg(long)]
    projects: Option<String>,

    /// Comma-separated list of task statuses
    #[arg(long, default_value = "open,resolved")]
    statuses: String,

    /// Export tasks to CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// How project constraints combine
    #[arg(long, value_enum, default_value_t = ModeArg::Any)]
    mode: ModeArg,

    /// Which task date the period applies to
    #[arg(long, value_enum, default_value_t = DateFieldArg::Modified)]
    date_field: DateFieldArg,

    /// Page size for task queries
    #[arg(long, default_value_t = 100)]
    limit: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Tasks in at least one selected project
    Any,
    /// Tasks in every selected project at once
    All,
}

impl From<ModeArg> for CombineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Any => CombineMode::Any,
            ModeArg::All => CombineMode::All,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateFieldArg {
    Created,
    Modified,
}

impl From<DateFieldArg> for DateField {
    fn from(field: DateFieldArg) -> Self {
        match field {
            DateFieldArg::Created => DateField::Created,
            DateFieldArg::Modified => DateField::Modified,
        }
    }
}

fn parse_date(label: &str, value: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::Config(format!(
            "Invalid {} date '{}'. Please use YYYY-MM-DD.",
            label, value
        ))
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;

    let start = parse_date("start", &cli.start_date)?;
    let end = parse_date("end", &cli.end_date)?;
    let window = TimeWindow::from_dates(start, end);

    let statuses = config::split_list(&cli.statuses);
    let project_names = cli
        .projects
        .as_deref()
        .map(config::split_list)
        .unwrap_or_default();

    let tracker = ConduitTracker::new(&config.base_url, &config.api_token);

    println!("Getting all projects...");
    let directory = ProjectDirectory::new(tracker.projects().await?);
    println!("Found {} projects in Phabricator.", directory.len());

    // The username snapshot is display-only; without it raw PHIDs show up
    let usernames = match tracker.users().await {
        Ok(users) => report::username_map(&users),
        Err(err) => {
            tracing::warn!(error = %err, "could not fetch the user listing");
            HashMap::new()
        }
    };

    println!("Getting PHIDs of team members...");
    let team = resolver::resolve_team(&tracker, &config.team_members).await;

    let project_phids = resolver::resolve_projects(&directory, &project_names);
    println!();
    println!("Selected projects:");
    if project_phids.is_empty() {
        println!("  (No projects selected)");
    } else {
        for phid in &project_phids {
            let name = directory.name_of(phid).unwrap_or(phid.as_str());
            println!("  {}: {}", name, phid);
        }
    }

    println!();
    println!(
        "Searching tasks for period: {} - {}",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    );

    let filter = TaskFilter {
        project_phids,
        window,
        date_field: cli.date_field.into(),
        statuses,
        limit: cli.limit,
    };
    let aggregator = TaskAggregator::new(&tracker, &directory);
    let tasks = aggregator.collect(&filter, cli.mode.into()).await?;

    println!();
    println!("Found tasks: {}", tasks.len());

    let team_phids: HashSet<String> = team.values().cloned().collect();
    let tasks = report::filter_by_team(tasks, &team_phids);
    println!("Found tasks for the team: {}", tasks.len());

    if tasks.is_empty() {
        println!("No tasks to display.");
        return Ok(());
    }

    println!();
    println!(
        "Found {} tasks for the team for the period from {} to {}.",
        tasks.len(),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    );

    println!();
    println!("Team members:");
    for member in &config.team_members {
        if let Some(phid) = team.get(member) {
            println!("  {}: {}", member, phid);
        }
    }

    println!();
    println!("Team tasks:");
    println!("---------------");
    for task in &tasks {
        println!("\n{}", report::render_task(task, &usernames));
    }

    if let Some(path) = &cli.csv {
        CsvExporter::write_to_file(&tasks, &usernames, path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging - helps when things go sideways
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskscope=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(Cli::parse()).await
}
