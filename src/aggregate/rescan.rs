use super::*;
use crate::records::{Repo, User};

// Index-then-scan: every user and repo row triggers a full scan of the event
// table, so only one entity's totals are held at a time.

pub fn aggregate(
    source: &dyn TableSource,
    counter: &CommitCounter<'_>,
    progress: &ProgressBar,
) -> Result<Stats> {
    let mut stats = Stats::default();

    for user in source.users()? {
        let user = user?;
        debug!("Rating user {} (ID: {})", user.username, user.id);

        if let Some(user_stats) = rate_user(source, counter, &user)? {
            debug!(
                "User {} rated; commits: {}, PR events: {}",
                user.id, user_stats.commits, user_stats.pull_request_events
            );
            stats.users.insert(user_stats);
        }
        progress.inc(1);
    }

    for repo in source.repos()? {
        let repo = repo?;
        debug!("Rating repo {} (ID: {})", repo.name, repo.id);

        if let Some(repo_stats) = rate_repo(source, counter, &repo)? {
            debug!(
                "Repo {} rated; commits: {}, watches: {}",
                repo.id, repo_stats.commits, repo_stats.watch_events
            );
            stats.repos.insert(repo_stats);
        }
        progress.inc(1);
    }

    Ok(stats)
}

/// Totals for one user, or `None` when no push or pull request names them.
fn rate_user(
    source: &dyn TableSource,
    counter: &CommitCounter<'_>,
    user: &User,
) -> Result<Option<UserStats>> {
    let mut stats = UserStats {
        id: user.id.clone(),
        username: user.username.clone(),
        ..UserStats::default()
    };
    let mut touched = false;

    for event in source.events()? {
        let event = event?;
        if event.actor_id != user.id || !counts_for_user(&event.kind) {
            continue;
        }

        touched = true;
        match event.kind {
            EventType::Push => stats.commits += counter.count(&event.id)?,
            EventType::PullRequest => stats.pull_request_events += 1,
            _ => {}
        }
    }

    Ok(touched.then_some(stats))
}

/// Totals for one repo, or `None` when no push or watch names it.
fn rate_repo(
    source: &dyn TableSource,
    counter: &CommitCounter<'_>,
    repo: &Repo,
) -> Result<Option<RepoStats>> {
    let mut stats = RepoStats {
        id: repo.id.clone(),
        name: repo.name.clone(),
        ..RepoStats::default()
    };
    let mut touched = false;

    for event in source.events()? {
        let event = event?;
        if event.repo_id != repo.id || !counts_for_repo(&event.kind) {
            continue;
        }

        touched = true;
        match event.kind {
            EventType::Push => stats.commits += counter.count(&event.id)?,
            EventType::Watch => stats.watch_events += 1,
            _ => {}
        }
    }

    Ok(touched.then_some(stats))
}
