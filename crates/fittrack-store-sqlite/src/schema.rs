//! SQL schema for the fittrack SQLite store.
//!
//! One table per resource family, all with the same layout. Executed once at
//! connection startup; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.

use fittrack_core::resource::ResourceKind;
use strum::IntoEnumIterator as _;

/// Pragmas applied before any table is created.
pub const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
";

/// DDL for one collection table and its owner index.
///
/// `owner_id` is the only access predicate: every query filters on it.
pub fn collection_ddl(table: &str) -> String {
  format!(
    "
CREATE TABLE IF NOT EXISTS {table} (
    id          TEXT PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    body_json   TEXT NOT NULL,   -- record body, PascalCase storage shape
    created_at  TEXT NOT NULL,   -- RFC 3339 UTC; server-assigned
    updated_at  TEXT             -- RFC 3339 UTC or NULL
);

CREATE INDEX IF NOT EXISTS {table}_owner_idx ON {table}(owner_id);
"
  )
}

/// Full schema for every collection.
pub fn schema() -> String {
  let mut sql = String::from(PRAGMAS);
  for kind in ResourceKind::iter() {
    sql.push_str(&collection_ddl(kind.collection()));
  }
  sql.push_str("PRAGMA user_version = 1;\n");
  sql
}
