use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-user running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub id: String,
    /// Empty until a name backfill finds the user.
    pub username: String,
    pub commits: u64,
    pub pull_request_events: u64,
}

/// Per-repository running totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    pub id: String,
    pub name: String,
    pub commits: u64,
    pub watch_events: u64,
}

pub trait Keyed {
    fn with_id(id: &str) -> Self;
    fn id(&self) -> &str;
}

impl Keyed for UserStats {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

impl Keyed for RepoStats {
    fn with_id(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Stats records keyed by entity id, kept in first-insertion order.
#[derive(Debug, Clone)]
pub struct StatsTable<S> {
    index: HashMap<String, usize>,
    entries: Vec<S>,
}

impl<S> Default for StatsTable<S> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<S: Keyed> StatsTable<S> {
    /// Returns the record for `id`, creating an empty one on first sight.
    pub fn entry(&mut self, id: &str) -> &mut S {
        let position = match self.index.get(id) {
            Some(&position) => position,
            None => {
                let position = self.entries.len();
                self.entries.push(S::with_id(id));
                self.index.insert(id.to_string(), position);
                position
            }
        };
        &mut self.entries[position]
    }

    /// Stores `stats` under its own id, replacing any previous record.
    pub fn insert(&mut self, stats: S) {
        match self.index.get(stats.id()) {
            Some(&position) => self.entries[position] = stats,
            None => {
                self.index.insert(stats.id().to_string(), self.entries.len());
                self.entries.push(stats);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&S> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut S> {
        match self.index.get(id) {
            Some(&position) => Some(&mut self.entries[position]),
            None => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Keyed + PartialEq> PartialEq for StatsTable<S> {
    /// Same ids with equal records; insertion order is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|stats| other.get(stats.id()) == Some(stats))
    }
}

/// The outcome of one aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub users: StatsTable<UserStats>,
    pub repos: StatsTable<RepoStats>,
}

impl Stats {
    /// Human-readable description of the first difference from `other`.
    pub fn first_difference(&self, other: &Stats) -> Option<String> {
        if let Some(diff) = table_difference("user", &self.users, &other.users) {
            return Some(diff);
        }
        table_difference("repo", &self.repos, &other.repos)
    }
}

fn table_difference<S: Keyed + PartialEq + std::fmt::Debug>(
    kind: &str,
    left: &StatsTable<S>,
    right: &StatsTable<S>,
) -> Option<String> {
    for stats in left.iter() {
        match right.get(stats.id()) {
            Some(other) if other == stats => {}
            Some(other) => return Some(format!("{kind} {}: {:?} vs {:?}", stats.id(), stats, other)),
            None => return Some(format!("{kind} {} missing from second run", stats.id())),
        }
    }
    right
        .iter()
        .find(|stats| left.get(stats.id()).is_none())
        .map(|stats| format!("{kind} {} missing from first run", stats.id()))
}
