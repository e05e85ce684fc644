use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::{CommitCounting, Strategy};

pub const DEFAULT_TAR_LINK: &str =
    "https://github.com/adjust/analytics-software-engineer-assignment/blob/master/data.tar.gz?raw=true";

/// Optional config file, looked up in the working directory.
const CONFIG_FILE: &str = "activity-rating";
const ENV_PREFIX: &str = "ACTIVITY_RATING";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub tables: TableFiles,
    pub rating: RatingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub tar_link: String,
    /// Directory inside the archive that holds the CSV tables.
    pub data_dir: String,
    pub temp_dir_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFiles {
    pub events: String,
    pub users: String,
    pub commits: String,
    pub repos: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    pub capacity: usize,
    pub strategy: Strategy,
    pub commit_counting: CommitCounting,
}

impl Default for TableFiles {
    fn default() -> Self {
        Self {
            events: "events.csv".to_string(),
            users: "actors.csv".to_string(),
            commits: "commits.csv".to_string(),
            repos: "repos.csv".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            archive: ArchiveConfig {
                tar_link: DEFAULT_TAR_LINK.to_string(),
                data_dir: "data".to_string(),
                temp_dir_prefix: "activity-rating-data".to_string(),
            },
            tables: TableFiles::default(),
            rating: RatingConfig {
                capacity: 10,
                strategy: Strategy::SinglePass,
                commit_counting: CommitCounting::OnDemand,
            },
        }
    }
}

impl Config {
    /// Defaults, then `activity-rating.{toml,yaml,json}` if present, then
    /// `ACTIVITY_RATING__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::Config::try_from(&Self::default())
                    .context("Failed to serialize default config")?,
            )
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to load configuration")?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_archive_layout() {
        let config = Config::default();
        assert_eq!(config.rating.capacity, 10);
        assert_eq!(config.archive.data_dir, "data");
        assert_eq!(config.tables.users, "actors.csv");
        assert_eq!(config.rating.strategy, Strategy::SinglePass);
    }

    #[test]
    fn load_without_overrides_yields_defaults() {
        let config = Config::load().unwrap();
        assert_eq!(config.tables, TableFiles::default());
        assert_eq!(config.archive.tar_link, DEFAULT_TAR_LINK);
    }
}
