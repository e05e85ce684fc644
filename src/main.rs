use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, Level};

mod aggregate;
mod archive;
mod config;
mod error;
mod output;
mod rating;
mod records;

use crate::aggregate::{Aggregator, CommitCounting, Stats, Strategy};
use crate::archive::Workspace;
use crate::config::Config;
use crate::error::RatingError;
use crate::output::{Report, Reporter, StrategyRun};
use crate::rating::Leaderboards;
use crate::records::{CsvTables, TableSource};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Link to download the tar.gz archive from
    #[arg(long, env = "ACTIVITY_RATING_TAR_LINK")]
    tar_link: Option<String>,

    /// Local tar.gz archive to use instead of downloading (takes precedence over --tar-link)
    #[arg(short, long)]
    archive: Option<PathBuf>,

    /// Aggregation strategy; `both` runs each, checks they agree and reports both timings
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyChoice>,

    /// Number of entries kept in each leaderboard
    #[arg(short, long)]
    capacity: Option<usize>,

    /// Count commits from a one-pass index instead of rescanning per push
    #[arg(long)]
    index_commits: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: String,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    output_file: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Strategy selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyChoice {
    SinglePass,
    Rescan,
    Both,
}

impl StrategyChoice {
    fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategyChoice::SinglePass => vec![Strategy::SinglePass],
            StrategyChoice::Rescan => vec![Strategy::Rescan],
            StrategyChoice::Both => vec![Strategy::SinglePass, Strategy::Rescan],
        }
    }
}

/// Strategies to run: the command line choice, else the configured one.
fn resolve_strategies(choice: Option<StrategyChoice>, configured: Strategy) -> Vec<Strategy> {
    match choice {
        Some(choice) => choice.strategies(),
        None => vec![configured],
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    println!(
        "{}",
        "Activity Rating - GitHub event leaderboards"
            .bright_cyan()
            .bold()
    );

    let mut config = Config::load()?;
    if let Some(tar_link) = &cli.tar_link {
        config.archive.tar_link = tar_link.clone();
    }
    if let Some(capacity) = cli.capacity {
        config.rating.capacity = capacity;
    }
    if cli.index_commits {
        config.rating.commit_counting = CommitCounting::Indexed;
    }

    let reporter = Reporter::new(&cli.output, cli.output_file.as_deref())?;

    // Dropping the workspace removes the extracted tables on every exit path.
    let workspace = Workspace::create(&config.archive.temp_dir_prefix)?;
    info!("Extracting tables into {}", workspace.path().display());
    let source = match &cli.archive {
        Some(path) => {
            info!("Reading archive from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open archive {}", path.display()))?;
            workspace
                .unpack(BufReader::new(file))
                .with_context(|| format!("Failed to extract {}", path.display()))?;
            path.display().to_string()
        }
        None => {
            let body = archive::download(&config.archive.tar_link).await?;
            workspace
                .unpack(body.as_slice())
                .context("Failed to extract downloaded archive")?;
            config.archive.tar_link.clone()
        }
    };
    println!("Source: {}", source.bright_white());

    let tables = CsvTables::new(
        &workspace.data_dir(&config.archive.data_dir),
        config.tables.clone(),
    );

    let strategies = resolve_strategies(cli.strategy, config.rating.strategy);
    let runs = rate(
        &tables,
        &strategies,
        config.rating.commit_counting,
        config.rating.capacity,
        true,
    )?;

    let report = Report {
        source,
        generated_at: Utc::now(),
        runs,
    };
    reporter.generate_report(&report)?;

    workspace
        .close()
        .context("Failed to remove temporary directory")?;

    println!("\n{}", "Rating complete!".bright_green().bold());

    Ok(())
}

/// Aggregates with each strategy in turn and builds its leaderboards.
///
/// When more than one strategy runs, every result must match the first.
fn rate(
    tables: &dyn TableSource,
    strategies: &[Strategy],
    counting: CommitCounting,
    capacity: usize,
    show_progress: bool,
) -> Result<Vec<StrategyRun>> {
    let mut runs = Vec::with_capacity(strategies.len());
    let mut baseline: Option<Stats> = None;

    for &strategy in strategies {
        let progress = if show_progress {
            spinner(strategy)?
        } else {
            ProgressBar::hidden()
        };

        let started = Instant::now();
        let stats = Aggregator::new(strategy, counting)
            .with_progress(progress)
            .run(tables)
            .with_context(|| format!("{} aggregation failed", strategy))?;
        let leaderboards = Leaderboards::build(&stats, capacity);
        let elapsed = started.elapsed();
        info!("{} rating took {:.2?}", strategy, elapsed);

        match &baseline {
            Some(first) => {
                if let Some(diff) = first.first_difference(&stats) {
                    return Err(RatingError::StrategyMismatch(diff).into());
                }
            }
            None => baseline = Some(stats),
        }

        runs.push(StrategyRun {
            strategy,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
            leaderboards,
        });
    }

    Ok(runs)
}

fn spinner(strategy: Strategy) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} records ({msg})")?,
    );
    pb.set_message(strategy.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::tests::tarball;
    use crate::config::TableFiles;
    use crate::rating::Ratable;

    fn unpacked_workspace(events: &str) -> Workspace {
        let bytes = tarball(&[
            ("events.csv", events),
            ("actors.csv", "id,username\nu1,alice\nu2,bob\n"),
            (
                "commits.csv",
                "sha,message,event_id\nh1,first,e1\nh2,second,e1\nh3,third,e3\n",
            ),
            ("repos.csv", "id,name\nr1,acme/api\nr2,acme/web\n"),
        ]);
        let workspace = Workspace::create("activity-rating-test").unwrap();
        workspace.unpack(bytes.as_slice()).unwrap();
        workspace
    }

    #[test]
    fn archive_to_leaderboards_with_both_strategies() {
        let workspace = unpacked_workspace(
            "id,type,actor_id,repo_id\n\
             e1,PushEvent,u1,r1\n\
             e2,WatchEvent,u2,r2\n\
             e3,PushEvent,u2,r2\n\
             e4,PullRequestEvent,u2,r1\n\
             e5,DeleteEvent,u1,r2\n",
        );
        let tables = CsvTables::new(&workspace.data_dir("data"), TableFiles::default());

        let runs = rate(
            &tables,
            &[Strategy::SinglePass, Strategy::Rescan],
            CommitCounting::OnDemand,
            10,
            false,
        )
        .unwrap();
        assert_eq!(runs.len(), 2);

        for run in &runs {
            let users: Vec<(&str, u64)> = run
                .leaderboards
                .users
                .items()
                .iter()
                .map(|u| (u.username.as_str(), u.score()))
                .collect();
            assert_eq!(users, vec![("alice", 2), ("bob", 2)]);

            let watches = &run.leaderboards.repo_watches.items()[0];
            assert_eq!((watches.name.as_str(), watches.watch_events), ("acme/web", 1));
        }
    }

    #[test]
    fn strategy_flag_accepts_both() {
        let cli = Cli::try_parse_from(["activity-rating", "--strategy", "both"]).unwrap();
        assert_eq!(
            resolve_strategies(cli.strategy, Strategy::Rescan),
            vec![Strategy::SinglePass, Strategy::Rescan]
        );

        let cli = Cli::try_parse_from(["activity-rating", "-s", "rescan"]).unwrap();
        assert_eq!(
            resolve_strategies(cli.strategy, Strategy::SinglePass),
            vec![Strategy::Rescan]
        );

        let cli = Cli::try_parse_from(["activity-rating"]).unwrap();
        assert_eq!(
            resolve_strategies(cli.strategy, Strategy::Rescan),
            vec![Strategy::Rescan]
        );

        assert!(Cli::try_parse_from(["activity-rating", "--compare"]).is_err());
        assert!(Cli::try_parse_from(["activity-rating", "--strategy", "all"]).is_err());
    }

    #[test]
    fn malformed_event_aborts_without_report() {
        let workspace = unpacked_workspace("id,type,actor_id,repo_id\ne1,PushEvent,u1,r1\ne2,WatchEvent\n");
        let tables = CsvTables::new(&workspace.data_dir("data"), TableFiles::default());

        for strategy in [Strategy::SinglePass, Strategy::Rescan] {
            let err = rate(&tables, &[strategy], CommitCounting::Indexed, 10, false).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<RatingError>(),
                Some(RatingError::MalformedRecord { table: "event", .. })
            ));
        }
    }
}
