use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RatingError, Result};

pub mod source;

pub use source::{CsvTables, MemoryTables, RecordIter, TableSource};

/// A record type that can be decoded from one positional CSV row.
pub trait FromRecord: Sized {
    /// Table name used in error messages.
    const TABLE: &'static str;
    /// Exact number of fields a row must carry.
    const ARITY: usize;

    fn decode(fields: &[&str]) -> Self;

    fn from_fields(fields: &[&str]) -> Result<Self> {
        if fields.len() != Self::ARITY {
            return Err(RatingError::MalformedRecord {
                table: Self::TABLE,
                expected: Self::ARITY,
                found: fields.len(),
            });
        }
        Ok(Self::decode(fields))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    CommitComment,
    Create,
    Delete,
    Fork,
    Gollum,
    IssueComment,
    Issues,
    Member,
    Public,
    PullRequest,
    PullRequestReviewComment,
    Push,
    Release,
    Watch,
    Other(String),
}

impl EventType {
    /// Only pushes, pull requests and watches feed the ratings.
    pub fn is_relevant(&self) -> bool {
        matches!(self, EventType::Push | EventType::PullRequest | EventType::Watch)
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventType::CommitComment => "CommitCommentEvent",
            EventType::Create => "CreateEvent",
            EventType::Delete => "DeleteEvent",
            EventType::Fork => "ForkEvent",
            EventType::Gollum => "GollumEvent",
            EventType::IssueComment => "IssueCommentEvent",
            EventType::Issues => "IssuesEvent",
            EventType::Member => "MemberEvent",
            EventType::Public => "PublicEvent",
            EventType::PullRequest => "PullRequestEvent",
            EventType::PullRequestReviewComment => "PullRequestReviewCommentEvent",
            EventType::Push => "PushEvent",
            EventType::Release => "ReleaseEvent",
            EventType::Watch => "WatchEvent",
            EventType::Other(name) => name,
        }
    }
}

impl From<&str> for EventType {
    fn from(s: &str) -> Self {
        match s {
            "CommitCommentEvent" => EventType::CommitComment,
            "CreateEvent" => EventType::Create,
            "DeleteEvent" => EventType::Delete,
            "ForkEvent" => EventType::Fork,
            "GollumEvent" => EventType::Gollum,
            "IssueCommentEvent" => EventType::IssueComment,
            "IssuesEvent" => EventType::Issues,
            "MemberEvent" => EventType::Member,
            "PublicEvent" => EventType::Public,
            "PullRequestEvent" => EventType::PullRequest,
            "PullRequestReviewCommentEvent" => EventType::PullRequestReviewComment,
            "PushEvent" => EventType::Push,
            "ReleaseEvent" => EventType::Release,
            "WatchEvent" => EventType::Watch,
            other => EventType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub kind: EventType,
    pub actor_id: String,
    pub repo_id: String,
}

impl FromRecord for Event {
    const TABLE: &'static str = "event";
    const ARITY: usize = 4;

    fn decode(fields: &[&str]) -> Self {
        Self {
            id: fields[0].to_string(),
            kind: EventType::from(fields[1]),
            actor_id: fields[2].to_string(),
            repo_id: fields[3].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

impl FromRecord for User {
    const TABLE: &'static str = "user";
    const ARITY: usize = 2;

    fn decode(fields: &[&str]) -> Self {
        Self {
            id: fields[0].to_string(),
            username: fields[1].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub hash: String,
    pub message: String,
    pub event_id: String,
}

impl FromRecord for Commit {
    const TABLE: &'static str = "commit";
    const ARITY: usize = 3;

    fn decode(fields: &[&str]) -> Self {
        Self {
            hash: fields[0].to_string(),
            message: fields[1].to_string(),
            event_id: fields[2].to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
    pub id: String,
    pub name: String,
}

impl FromRecord for Repo {
    const TABLE: &'static str = "repo";
    const ARITY: usize = 2;

    fn decode(fields: &[&str]) -> Self {
        Self {
            id: fields[0].to_string(),
            name: fields[1].to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_event_positionally() {
        let event = Event::from_fields(&["e1", "PushEvent", "u1", "r1"]).unwrap();
        assert_eq!(event.id, "e1");
        assert_eq!(event.kind, EventType::Push);
        assert_eq!(event.actor_id, "u1");
        assert_eq!(event.repo_id, "r1");
    }

    #[test]
    fn unknown_event_type_is_kept_but_irrelevant() {
        let event = Event::from_fields(&["e1", "SponsorshipEvent", "u1", "r1"]).unwrap();
        assert_eq!(event.kind, EventType::Other("SponsorshipEvent".to_string()));
        assert!(!event.kind.is_relevant());
        assert_eq!(event.kind.to_string(), "SponsorshipEvent");
    }

    #[test]
    fn only_push_pull_request_and_watch_are_relevant() {
        assert!(EventType::Push.is_relevant());
        assert!(EventType::PullRequest.is_relevant());
        assert!(EventType::Watch.is_relevant());
        for name in ["CreateEvent", "ForkEvent", "IssuesEvent", "ReleaseEvent"] {
            assert!(!EventType::from(name).is_relevant(), "{name}");
        }
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let err = Event::from_fields(&["e1", "PushEvent", "u1"]).unwrap_err();
        assert!(matches!(
            err,
            RatingError::MalformedRecord {
                table: "event",
                expected: 4,
                found: 3
            }
        ));

        assert!(User::from_fields(&["u1"]).is_err());
        assert!(Repo::from_fields(&["r1", "name", "extra"]).is_err());
        assert!(Commit::from_fields(&[]).is_err());
    }

    #[test]
    fn empty_fields_are_not_validated() {
        let commit = Commit::from_fields(&["", "", ""]).unwrap();
        assert_eq!(commit.hash, "");
        let user = User::from_fields(&["u1", ""]).unwrap();
        assert_eq!(user.username, "");
    }
}
