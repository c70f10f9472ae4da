//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use serde_json::{Map, Value};

use fittrack_core::{
  resource::ResourceKind,
  store::{Document, DocumentStore, Modified},
};

use crate::{
  Error, Result,
  encode::{DOCUMENT_COLUMNS, RawDocument, decode_body, encode_body, encode_dt},
  schema::schema,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A fittrack document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Open it
/// once at startup, share clones across requests, and [`close`] it on
/// shutdown.
///
/// [`close`]: DocumentStore::close
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — used for the `memory` backend and tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    let sql = schema();
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn select_one(
    &self,
    kind: ResourceKind,
    owner_id: &str,
    id: &str,
  ) -> Result<Option<Document>> {
    let table    = kind.collection();
    let owner_id = owner_id.to_owned();
    let id       = id.to_owned();

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {DOCUMENT_COLUMNS} FROM {table} WHERE id = ?1 AND owner_id = ?2"
              ),
              rusqlite::params![id, owner_id],
              RawDocument::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }
}

/// What happened inside a [`DocumentStore::modify`] transaction.
enum EditStep {
  Written(RawDocument),
  Missing,
  Rejected(fittrack_core::Error),
  Failed(Error),
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  async fn insert(&self, kind: ResourceKind, doc: Document) -> Result<Document> {
    let table          = kind.collection();
    let id             = doc.id.clone();
    let owner_id       = doc.owner_id.clone();
    let body_json      = encode_body(&doc.body)?;
    let created_at_str = encode_dt(doc.created_at);
    let updated_at_str = doc.updated_at.map(encode_dt);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO {table} (id, owner_id, body_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)"
          ),
          rusqlite::params![id, owner_id, body_json, created_at_str, updated_at_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::trace!(table, id = %doc.id, "inserted document");
    Ok(doc)
  }

  async fn find(&self, kind: ResourceKind, owner_id: &str) -> Result<Vec<Document>> {
    let table    = kind.collection();
    let owner_id = owner_id.to_owned();

    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {DOCUMENT_COLUMNS} FROM {table} WHERE owner_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![owner_id], RawDocument::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }

  async fn find_one(
    &self,
    kind: ResourceKind,
    owner_id: &str,
    id: &str,
  ) -> Result<Option<Document>> {
    self.select_one(kind, owner_id, id).await
  }

  async fn modify<F>(
    &self,
    kind:       ResourceKind,
    owner_id:   &str,
    id:         &str,
    updated_at: DateTime<Utc>,
    edit:       F,
  ) -> Result<Modified>
  where
    F: FnOnce(Map<String, Value>) -> fittrack_core::Result<Map<String, Value>>
      + Send
      + 'static,
  {
    let table          = kind.collection();
    let owner_id       = owner_id.to_owned();
    let id             = id.to_owned();
    let updated_at_str = encode_dt(updated_at);

    // Select, edit, and update inside one transaction on the connection
    // thread, so concurrent edits of the same document serialise.
    let step = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let raw = tx
          .query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM {table} WHERE id = ?1 AND owner_id = ?2"),
            rusqlite::params![id, owner_id],
            RawDocument::from_row,
          )
          .optional()?;
        let Some(raw) = raw else { return Ok(EditStep::Missing) };

        let body = match decode_body(&raw.id, &raw.body_json) {
          Ok(body) => body,
          Err(e) => return Ok(EditStep::Failed(e)),
        };
        let body_json = match edit(body) {
          Ok(body) => match encode_body(&body) {
            Ok(json) => json,
            Err(e) => return Ok(EditStep::Failed(e)),
          },
          Err(e) => return Ok(EditStep::Rejected(e)),
        };

        tx.execute(
          &format!(
            "UPDATE {table} SET body_json = ?1, updated_at = ?2
             WHERE id = ?3 AND owner_id = ?4"
          ),
          rusqlite::params![body_json, updated_at_str, id, owner_id],
        )?;
        tx.commit()?;
        Ok(EditStep::Written(RawDocument {
          body_json,
          updated_at: Some(updated_at_str),
          ..raw
        }))
      })
      .await?;

    match step {
      EditStep::Written(raw) => Ok(Modified::Written(raw.into_document()?)),
      EditStep::Missing => Ok(Modified::Missing),
      EditStep::Rejected(e) => Ok(Modified::Rejected(e)),
      EditStep::Failed(e) => Err(e),
    }
  }

  async fn delete(&self, kind: ResourceKind, owner_id: &str, id: &str) -> Result<bool> {
    let table    = kind.collection();
    let owner_id = owner_id.to_owned();
    let id       = id.to_owned();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE id = ?1 AND owner_id = ?2"),
          rusqlite::params![id, owner_id],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn close(&self) -> Result<()> {
    self.conn.clone().close().await?;
    tracing::info!("store connection closed");
    Ok(())
  }
}
