//! The `DocumentStore` trait and the stored document envelope.
//!
//! The trait is implemented by storage backends (`fittrack-store-sqlite`,
//! and [`crate::memory::MemoryStore`]). Higher layers depend on this
//! abstraction and pick a backend from configuration.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::resource::ResourceKind;

/// A stored record: store-owned metadata plus the record body in storage
/// (PascalCase) shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
  pub id:         String,
  /// The only access-control predicate; every query filters on it.
  pub owner_id:   String,
  pub created_at: DateTime<Utc>,
  pub updated_at: Option<DateTime<Utc>>,
  pub body:       Map<String, Value>,
}

/// Outcome of [`DocumentStore::modify`].
#[derive(Debug)]
pub enum Modified {
  /// The edited document as now stored.
  Written(Document),
  /// No document with that id belongs to the owner.
  Missing,
  /// The edit refused the stored body; nothing was written.
  Rejected(crate::Error),
}

/// Abstraction over an owner-scoped document database with one collection
/// per [`ResourceKind`].
///
/// No method ever returns or touches a document whose `owner_id` differs from
/// the one passed in. Misses are reported as `None` / `false`, never as
/// errors; errors mean the store itself failed.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new document. The caller assigns `id` and timestamps.
  fn insert(
    &self,
    kind: ResourceKind,
    doc: Document,
  ) -> impl Future<Output = Result<Document, Self::Error>> + Send + '_;

  /// All documents in `kind` owned by `owner_id`, in no particular order.
  fn find<'a>(
    &'a self,
    kind: ResourceKind,
    owner_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Document>, Self::Error>> + Send + 'a;

  /// A single owned document.
  fn find_one<'a>(
    &'a self,
    kind: ResourceKind,
    owner_id: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Read, transform, and write back the body of an owned document as one
  /// step: no other write to the same store lands between the read `edit`
  /// sees and the write of its result. `edit` receives the stored body and
  /// returns the new one; an `Err` from it leaves the document untouched and
  /// comes back as [`Modified::Rejected`]. Never inserts.
  fn modify<'a, F>(
    &'a self,
    kind: ResourceKind,
    owner_id: &'a str,
    id: &'a str,
    updated_at: DateTime<Utc>,
    edit: F,
  ) -> impl Future<Output = Result<Modified, Self::Error>> + Send + 'a
  where
    F: FnOnce(Map<String, Value>) -> crate::Result<Map<String, Value>> + Send + 'static;

  /// Delete an owned document. Returns whether anything was removed.
  fn delete<'a>(
    &'a self,
    kind: ResourceKind,
    owner_id: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Cheap liveness check of the underlying connection.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Release the connection. Later calls fail with a connection error.
  fn close(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
