//! Error type for `fittrack-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A `body_json` column held valid JSON that was not an object.
  #[error("document {0} body is not a JSON object")]
  NotAnObject(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
