//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and record bodies as compact
//! JSON objects.

use chrono::{DateTime, Utc};
use fittrack_core::store::Document;
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Body ─────────────────────────────────────────────────────────────────────

pub fn encode_body(body: &Map<String, Value>) -> Result<String> {
  Ok(serde_json::to_string(body)?)
}

pub fn decode_body(id: &str, s: &str) -> Result<Map<String, Value>> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject(id.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Columns every collection query selects, in order.
pub const DOCUMENT_COLUMNS: &str = "id, owner_id, body_json, created_at, updated_at";

/// Raw strings read directly from a collection row.
pub struct RawDocument {
  pub id:         String,
  pub owner_id:   String,
  pub body_json:  String,
  pub created_at: String,
  pub updated_at: Option<String>,
}

impl RawDocument {
  /// Map a row selected with [`DOCUMENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      owner_id:   row.get(1)?,
      body_json:  row.get(2)?,
      created_at: row.get(3)?,
      updated_at: row.get(4)?,
    })
  }

  pub fn into_document(self) -> Result<Document> {
    Ok(Document {
      body:       decode_body(&self.id, &self.body_json)?,
      created_at: decode_dt(&self.created_at)?,
      updated_at: self.updated_at.as_deref().map(decode_dt).transpose()?,
      id:         self.id,
      owner_id:   self.owner_id,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dt_roundtrip() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn non_object_body_is_rejected() {
    assert!(matches!(decode_body("x", "[1,2]"), Err(Error::NotAnObject(_))));
    assert!(decode_body("x", r#"{"Name":"Run"}"#).is_ok());
  }
}
