use super::*;
use crate::aggregate::{RepoStats, Stats, UserStats};
use tracing::debug;

/// A user ranked by commits plus pull request events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatedUser {
    pub id: String,
    pub username: String,
    pub commits: u64,
    pub pull_request_events: u64,
}

impl Ratable for RatedUser {
    fn score(&self) -> u64 {
        self.commits + self.pull_request_events
    }

    fn label(&self) -> String {
        format!(
            "ID: {}; Username: {}; Commits: {}; PREvents: {};",
            self.id, self.username, self.commits, self.pull_request_events
        )
    }
}

impl From<&UserStats> for RatedUser {
    fn from(stats: &UserStats) -> Self {
        Self {
            id: stats.id.clone(),
            username: stats.username.clone(),
            commits: stats.commits,
            pull_request_events: stats.pull_request_events,
        }
    }
}

/// A repository ranked by commits pushed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitRatedRepo {
    pub id: String,
    pub name: String,
    pub commits: u64,
}

impl Ratable for CommitRatedRepo {
    fn score(&self) -> u64 {
        self.commits
    }

    fn label(&self) -> String {
        format!("ID: {}; Name: {}; Commits: {};", self.id, self.name, self.commits)
    }
}

impl From<&RepoStats> for CommitRatedRepo {
    fn from(stats: &RepoStats) -> Self {
        Self {
            id: stats.id.clone(),
            name: stats.name.clone(),
            commits: stats.commits,
        }
    }
}

/// A repository ranked by watch events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchRatedRepo {
    pub id: String,
    pub name: String,
    pub watch_events: u64,
}

impl Ratable for WatchRatedRepo {
    fn score(&self) -> u64 {
        self.watch_events
    }

    fn label(&self) -> String {
        format!(
            "ID: {}; Name: {}; WatchEvents: {};",
            self.id, self.name, self.watch_events
        )
    }
}

impl From<&RepoStats> for WatchRatedRepo {
    fn from(stats: &RepoStats) -> Self {
        Self {
            id: stats.id.clone(),
            name: stats.name.clone(),
            watch_events: stats.watch_events,
        }
    }
}

/// The three leaderboards reported for one aggregation run.
#[derive(Debug, Clone, Serialize)]
pub struct Leaderboards {
    pub users: Rating<RatedUser>,
    pub repo_commits: Rating<CommitRatedRepo>,
    pub repo_watches: Rating<WatchRatedRepo>,
}

impl Leaderboards {
    /// Offers every stats record in table order.
    pub fn build(stats: &Stats, capacity: usize) -> Self {
        let mut users = Rating::new(capacity);
        for user in stats.users.iter() {
            users.offer(RatedUser::from(user));
        }

        let mut repo_commits = Rating::new(capacity);
        let mut repo_watches = Rating::new(capacity);
        for repo in stats.repos.iter() {
            repo_commits.offer(CommitRatedRepo::from(repo));
            repo_watches.offer(WatchRatedRepo::from(repo));
        }

        debug!(
            "Leaderboards hold {} users, {} repos by commits, {} repos by watches",
            users.len(),
            repo_commits.len(),
            repo_watches.len()
        );

        Self {
            users,
            repo_commits,
            repo_watches,
        }
    }
}
