use thiserror::Error;

/// Errors raised while fetching, decoding or aggregating the activity tables.
///
/// Every variant is fatal for the current run: aggregation stops at the first
/// error and nothing gathered so far is reported.
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("malformed {table} record: expected {expected} fields, found {found}")]
    MalformedRecord {
        table: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("couldn't download the archive: {url} responded with {status}")]
    Download { url: String, status: u16 },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("unhandled entry type inside the tar archive: {path} ({kind})")]
    UnsupportedArchiveEntry { path: String, kind: String },

    #[error("aggregation strategies disagree: {0}")]
    StrategyMismatch(String),
}

pub type Result<T> = std::result::Result<T, RatingError>;
