use super::*;
use crate::config::TableFiles;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A fresh scan over one table, yielding decoded records in file order.
pub type RecordIter<'a, T> = Box<dyn Iterator<Item = Result<T>> + 'a>;

/// The four activity tables. Each call starts a new scan from the first record,
/// so a table can be walked as many times as a strategy needs.
pub trait TableSource {
    fn events(&self) -> Result<RecordIter<'_, Event>>;
    fn users(&self) -> Result<RecordIter<'_, User>>;
    fn commits(&self) -> Result<RecordIter<'_, Commit>>;
    fn repos(&self) -> Result<RecordIter<'_, Repo>>;
}

/// CSV tables extracted from the archive, one file per table.
pub struct CsvTables {
    dir: PathBuf,
    files: TableFiles,
}

impl CsvTables {
    pub fn new(dir: &Path, files: TableFiles) -> Self {
        Self {
            dir: dir.to_path_buf(),
            files,
        }
    }

    fn scan<T: FromRecord + 'static>(&self, file: &str) -> Result<RecordIter<'static, T>> {
        let path = self.dir.join(file);
        debug!("Scanning {} table at {}", T::TABLE, path.display());

        // Field counts are checked by the decoder, not by the CSV reader.
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)?;

        Ok(Box::new(reader.into_records().map(|record| {
            let record = record?;
            let fields: Vec<&str> = record.iter().collect();
            T::from_fields(&fields)
        })))
    }
}

impl TableSource for CsvTables {
    fn events(&self) -> Result<RecordIter<'_, Event>> {
        self.scan(&self.files.events)
    }

    fn users(&self) -> Result<RecordIter<'_, User>> {
        self.scan(&self.files.users)
    }

    fn commits(&self) -> Result<RecordIter<'_, Commit>> {
        self.scan(&self.files.commits)
    }

    fn repos(&self) -> Result<RecordIter<'_, Repo>> {
        self.scan(&self.files.repos)
    }
}

/// Tables that are already decoded and held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub events: Vec<Event>,
    pub users: Vec<User>,
    pub commits: Vec<Commit>,
    pub repos: Vec<Repo>,
}

impl TableSource for MemoryTables {
    fn events(&self) -> Result<RecordIter<'_, Event>> {
        Ok(replay(&self.events))
    }

    fn users(&self) -> Result<RecordIter<'_, User>> {
        Ok(replay(&self.users))
    }

    fn commits(&self) -> Result<RecordIter<'_, Commit>> {
        Ok(replay(&self.commits))
    }

    fn repos(&self) -> Result<RecordIter<'_, Repo>> {
        Ok(replay(&self.repos))
    }
}

fn replay<T: Clone>(rows: &[T]) -> RecordIter<'_, T> {
    Box::new(rows.iter().cloned().map(Ok::<T, RatingError>))
}
