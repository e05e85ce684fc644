use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::records::{EventType, TableSource};

pub mod rescan;
pub mod single_pass;
pub mod stats;

pub use stats::{RepoStats, Stats, StatsTable, UserStats};

/// How the event table is turned into per-entity stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Rescan the events for every user and repo row. Holds one entity at a time.
    Rescan,
    /// Scan the events once, keeping every touched entity in memory.
    SinglePass,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Rescan => f.write_str("rescan"),
            Strategy::SinglePass => f.write_str("single-pass"),
        }
    }
}

/// How commits are attributed to push events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitCounting {
    /// Scan the commit table for each push event.
    OnDemand,
    /// Scan the commit table once up front and keep event id -> count.
    Indexed,
}

/// Number of commits attached to a push event.
pub struct CommitCounter<'a> {
    source: &'a dyn TableSource,
    index: Option<HashMap<String, u64>>,
}

impl<'a> CommitCounter<'a> {
    pub fn new(source: &'a dyn TableSource, counting: CommitCounting) -> Result<Self> {
        let index = match counting {
            CommitCounting::OnDemand => None,
            CommitCounting::Indexed => {
                let mut index: HashMap<String, u64> = HashMap::new();
                for commit in source.commits()? {
                    *index.entry(commit?.event_id).or_insert(0) += 1;
                }
                debug!("Indexed commits for {} events", index.len());
                Some(index)
            }
        };

        Ok(Self { source, index })
    }

    pub fn count(&self, event_id: &str) -> Result<u64> {
        if let Some(index) = &self.index {
            return Ok(index.get(event_id).copied().unwrap_or(0));
        }

        let mut total = 0;
        for commit in self.source.commits()? {
            if commit?.event_id == event_id {
                total += 1;
            }
        }
        Ok(total)
    }
}

/// Runs one aggregation strategy over a set of tables.
pub struct Aggregator {
    strategy: Strategy,
    counting: CommitCounting,
    progress: ProgressBar,
}

impl Aggregator {
    pub fn new(strategy: Strategy, counting: CommitCounting) -> Self {
        Self {
            strategy,
            counting,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once per event (single pass) or per entity (rescan).
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn run(&self, source: &dyn TableSource) -> Result<Stats> {
        info!(
            "Starting {} aggregation ({:?} commit counting)",
            self.strategy, self.counting
        );

        let counter = CommitCounter::new(source, self.counting)?;
        let stats = match self.strategy {
            Strategy::Rescan => rescan::aggregate(source, &counter, &self.progress)?,
            Strategy::SinglePass => single_pass::aggregate(source, &counter, &self.progress)?,
        };

        self.progress
            .finish_with_message(format!("{} aggregation complete", self.strategy));
        if stats.users.is_empty() && stats.repos.is_empty() {
            warn!("No push, pull request or watch events found");
        }
        info!(
            "Aggregated {} users and {} repos",
            stats.users.len(),
            stats.repos.len()
        );
        Ok(stats)
    }
}

/// Whether an event touches user stats.
fn counts_for_user(kind: &EventType) -> bool {
    kind.is_relevant() && *kind != EventType::Watch
}

/// Whether an event touches repo stats.
fn counts_for_repo(kind: &EventType) -> bool {
    kind.is_relevant() && *kind != EventType::PullRequest
}
