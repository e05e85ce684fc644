use super::*;
use crate::records::Event;

pub fn aggregate(
    source: &dyn TableSource,
    counter: &CommitCounter<'_>,
    progress: &ProgressBar,
) -> Result<Stats> {
    let mut stats = Stats::default();

    for event in source.events()? {
        let event = event?;
        apply_event(&mut stats, counter, &event)?;
        progress.inc(1);
    }

    debug!(
        "Event pass done, backfilling names for {} users and {} repos",
        stats.users.len(),
        stats.repos.len()
    );
    backfill_usernames(source, &mut stats.users)?;
    backfill_repo_names(source, &mut stats.repos)?;

    Ok(stats)
}

/// Folds one event into the running totals. Irrelevant kinds are a no-op.
pub fn apply_event(stats: &mut Stats, counter: &CommitCounter<'_>, event: &Event) -> Result<()> {
    if !event.kind.is_relevant() {
        return Ok(());
    }

    match event.kind {
        EventType::Push => {
            let commits = counter.count(&event.id)?;
            stats.users.entry(&event.actor_id).commits += commits;
            stats.repos.entry(&event.repo_id).commits += commits;
        }
        EventType::PullRequest => stats.users.entry(&event.actor_id).pull_request_events += 1,
        EventType::Watch => stats.repos.entry(&event.repo_id).watch_events += 1,
        _ => {}
    }

    debug!("Event {} ({}) processed", event.id, event.kind);
    Ok(())
}

fn backfill_usernames(source: &dyn TableSource, users: &mut StatsTable<UserStats>) -> Result<()> {
    for user in source.users()? {
        let user = user?;
        if let Some(stats) = users.get_mut(&user.id) {
            stats.username = user.username;
        }
    }
    Ok(())
}

fn backfill_repo_names(source: &dyn TableSource, repos: &mut StatsTable<RepoStats>) -> Result<()> {
    for repo in source.repos()? {
        let repo = repo?;
        if let Some(stats) = repos.get_mut(&repo.id) {
            stats.name = repo.name;
        }
    }
    Ok(())
}
