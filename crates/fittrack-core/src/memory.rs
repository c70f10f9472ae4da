//! [`MemoryStore`] — a process-local [`DocumentStore`].
//!
//! Backs the `memory` storage backend and the tests of the layers above the
//! store. Contents are lost when the process exits.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
  resource::ResourceKind,
  store::{Document, DocumentStore, Modified},
};

#[derive(Debug, Error)]
pub enum MemoryStoreError {
  #[error("connection closed")]
  Closed,
}

type Key = (ResourceKind, String);

/// Cloning is cheap — clones share the same collections.
#[derive(Clone, Default)]
pub struct MemoryStore {
  docs:   Arc<RwLock<HashMap<Key, Document>>>,
  closed: Arc<AtomicBool>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn check_open(&self) -> Result<(), MemoryStoreError> {
    if self.closed.load(Ordering::Acquire) {
      Err(MemoryStoreError::Closed)
    } else {
      Ok(())
    }
  }
}

impl DocumentStore for MemoryStore {
  type Error = MemoryStoreError;

  async fn insert(&self, kind: ResourceKind, doc: Document) -> Result<Document, Self::Error> {
    self.check_open()?;
    self.docs.write().insert((kind, doc.id.clone()), doc.clone());
    Ok(doc)
  }

  async fn find(
    &self,
    kind: ResourceKind,
    owner_id: &str,
  ) -> Result<Vec<Document>, Self::Error> {
    self.check_open()?;
    Ok(
      self
        .docs
        .read()
        .iter()
        .filter(|((k, _), d)| *k == kind && d.owner_id == owner_id)
        .map(|(_, d)| d.clone())
        .collect(),
    )
  }

  async fn find_one(
    &self,
    kind: ResourceKind,
    owner_id: &str,
    id: &str,
  ) -> Result<Option<Document>, Self::Error> {
    self.check_open()?;
    Ok(
      self
        .docs
        .read()
        .get(&(kind, id.to_owned()))
        .filter(|d| d.owner_id == owner_id)
        .cloned(),
    )
  }

  async fn modify<F>(
    &self,
    kind: ResourceKind,
    owner_id: &str,
    id: &str,
    updated_at: DateTime<Utc>,
    edit: F,
  ) -> Result<Modified, Self::Error>
  where
    F: FnOnce(Map<String, Value>) -> crate::Result<Map<String, Value>> + Send + 'static,
  {
    self.check_open()?;
    // The write lock spans read and write.
    let mut docs = self.docs.write();
    let Some(doc) = docs
      .get_mut(&(kind, id.to_owned()))
      .filter(|d| d.owner_id == owner_id)
    else {
      return Ok(Modified::Missing);
    };
    match edit(doc.body.clone()) {
      Ok(body) => {
        doc.body = body;
        doc.updated_at = Some(updated_at);
        Ok(Modified::Written(doc.clone()))
      }
      Err(err) => Ok(Modified::Rejected(err)),
    }
  }

  async fn delete(
    &self,
    kind: ResourceKind,
    owner_id: &str,
    id: &str,
  ) -> Result<bool, Self::Error> {
    self.check_open()?;
    let mut docs = self.docs.write();
    let key = (kind, id.to_owned());
    if docs.get(&key).is_some_and(|d| d.owner_id == owner_id) {
      docs.remove(&key);
      Ok(true)
    } else {
      Ok(false)
    }
  }

  async fn ping(&self) -> Result<(), Self::Error> { self.check_open() }

  async fn close(&self) -> Result<(), Self::Error> {
    self.closed.store(true, Ordering::Release);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn doc(id: &str, owner: &str) -> Document {
    Document {
      id:         id.to_owned(),
      owner_id:   owner.to_owned(),
      created_at: Utc::now(),
      updated_at: None,
      body:       Map::new(),
    }
  }

  #[tokio::test]
  async fn other_owner_cannot_see_or_touch() {
    let s = MemoryStore::new();
    s.insert(ResourceKind::Goals, doc("g1", "alice")).await.unwrap();

    assert!(s.find(ResourceKind::Goals, "bob").await.unwrap().is_empty());
    assert!(s.find_one(ResourceKind::Goals, "bob", "g1").await.unwrap().is_none());
    assert!(matches!(
      s.modify(ResourceKind::Goals, "bob", "g1", Utc::now(), Ok).await.unwrap(),
      Modified::Missing
    ));
    assert!(!s.delete(ResourceKind::Goals, "bob", "g1").await.unwrap());
    assert_eq!(s.find(ResourceKind::Goals, "alice").await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn collections_are_separate() {
    let s = MemoryStore::new();
    s.insert(ResourceKind::Goals, doc("x", "alice")).await.unwrap();
    assert!(
      s.find_one(ResourceKind::WorkoutLogs, "alice", "x")
        .await
        .unwrap()
        .is_none()
    );
  }

  #[tokio::test]
  async fn rejected_edit_leaves_document_untouched() {
    let s = MemoryStore::new();
    s.insert(ResourceKind::Goals, doc("g1", "alice")).await.unwrap();
    let out = s
      .modify(ResourceKind::Goals, "alice", "g1", Utc::now(), |_| {
        Err(crate::Error::BadRequest("no".into()))
      })
      .await
      .unwrap();
    assert!(matches!(out, Modified::Rejected(crate::Error::BadRequest(_))));
    let stored = s.find_one(ResourceKind::Goals, "alice", "g1").await.unwrap().unwrap();
    assert_eq!(stored.updated_at, None);
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_modifications_all_land() {
    let s = MemoryStore::new();
    s.insert(ResourceKind::WorkoutPlans, doc("p1", "alice")).await.unwrap();

    let mut tasks = tokio::task::JoinSet::new();
    for n in 0..20 {
      let s = s.clone();
      tasks.spawn(async move {
        s.modify(ResourceKind::WorkoutPlans, "alice", "p1", Utc::now(), move |mut body| {
          let mut list = match body.remove("Exercises") {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
          };
          list.push(Value::from(n));
          body.insert("Exercises".into(), Value::Array(list));
          Ok(body)
        })
        .await
        .unwrap()
      });
    }
    while let Some(out) = tasks.join_next().await {
      assert!(matches!(out.unwrap(), Modified::Written(_)));
    }

    let stored = s.find_one(ResourceKind::WorkoutPlans, "alice", "p1").await.unwrap().unwrap();
    assert_eq!(stored.body["Exercises"].as_array().unwrap().len(), 20);
  }

  #[tokio::test]
  async fn closed_store_reports_connection_failure() {
    let s = MemoryStore::new();
    s.close().await.unwrap();
    let err = s.find(ResourceKind::Goals, "alice").await.unwrap_err();
    assert!(crate::fallback::is_connection_failure(&err.to_string()));
  }
}
