//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use fittrack_core::{
  Error as CoreError,
  fallback::is_connection_failure,
  repository::Repository,
  resource::ResourceKind,
  store::{Document, DocumentStore, Modified},
};
use serde_json::{Map, Value, json};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(id: &str, owner: &str, body: Value) -> Document {
  let Value::Object(body) = body else { panic!("body must be an object") };
  Document {
    id: id.into(),
    owner_id: owner.into(),
    created_at: Utc::now(),
    updated_at: None,
    body,
  }
}

// ─── Raw document operations ─────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_one() {
  let s = store().await;
  let inserted = s
    .insert(ResourceKind::Goals, doc("g1", "alice", json!({ "Name": "Run" })))
    .await
    .unwrap();

  let fetched = s
    .find_one(ResourceKind::Goals, "alice", "g1")
    .await
    .unwrap()
    .expect("document present");
  assert_eq!(fetched, inserted);
  assert_eq!(fetched.body["Name"], "Run");
}

#[tokio::test]
async fn find_is_scoped_to_owner_and_collection() {
  let s = store().await;
  s.insert(ResourceKind::Goals, doc("g1", "alice", json!({}))).await.unwrap();
  s.insert(ResourceKind::Goals, doc("g2", "alice", json!({}))).await.unwrap();
  s.insert(ResourceKind::Goals, doc("g3", "bob", json!({}))).await.unwrap();
  s.insert(ResourceKind::WorkoutLogs, doc("l1", "alice", json!({}))).await.unwrap();

  assert_eq!(s.find(ResourceKind::Goals, "alice").await.unwrap().len(), 2);
  assert_eq!(s.find(ResourceKind::Goals, "bob").await.unwrap().len(), 1);
  assert_eq!(s.find(ResourceKind::WorkoutLogs, "alice").await.unwrap().len(), 1);
  assert!(s.find(ResourceKind::Users, "alice").await.unwrap().is_empty());
}

type Body = Map<String, Value>;

fn rename(to: &'static str) -> impl FnOnce(Body) -> fittrack_core::Result<Body> + Send {
  move |mut body| {
    body.insert("Name".into(), json!(to));
    Ok(body)
  }
}

#[tokio::test]
async fn modify_requires_matching_owner() {
  let s = store().await;
  s.insert(ResourceKind::WorkoutPlans, doc("p1", "alice", json!({ "Name": "A" })))
    .await
    .unwrap();

  let miss = s
    .modify(ResourceKind::WorkoutPlans, "bob", "p1", Utc::now(), rename("B"))
    .await
    .unwrap();
  assert!(matches!(miss, Modified::Missing));

  let Modified::Written(hit) = s
    .modify(ResourceKind::WorkoutPlans, "alice", "p1", Utc::now(), rename("B"))
    .await
    .unwrap()
  else {
    panic!("owned document should be written");
  };
  assert_eq!(hit.body["Name"], "B");
  assert!(hit.updated_at.is_some());
  assert_eq!(
    s.find_one(ResourceKind::WorkoutPlans, "alice", "p1").await.unwrap(),
    Some(hit)
  );
}

#[tokio::test]
async fn modify_missing_does_not_insert() {
  let s = store().await;
  let res = s
    .modify(ResourceKind::Goals, "alice", "ghost", Utc::now(), rename("B"))
    .await
    .unwrap();
  assert!(matches!(res, Modified::Missing));
  assert!(s.find(ResourceKind::Goals, "alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_modify_rolls_back() {
  let s = store().await;
  s.insert(ResourceKind::Goals, doc("g1", "alice", json!({ "Name": "A" })))
    .await
    .unwrap();

  let res = s
    .modify(ResourceKind::Goals, "alice", "g1", Utc::now(), |_| {
      Err(CoreError::NotFound("Exercise not found".into()))
    })
    .await
    .unwrap();
  assert!(matches!(res, Modified::Rejected(CoreError::NotFound(_))));

  let stored = s.find_one(ResourceKind::Goals, "alice", "g1").await.unwrap().unwrap();
  assert_eq!(stored.body["Name"], "A");
  assert_eq!(stored.updated_at, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_modifications_all_land() {
  let s = store().await;
  s.insert(ResourceKind::WorkoutPlans, doc("p1", "alice", json!({ "Exercises": [] })))
    .await
    .unwrap();

  let mut tasks = tokio::task::JoinSet::new();
  for n in 0..20 {
    let s = s.clone();
    tasks.spawn(async move {
      s.modify(ResourceKind::WorkoutPlans, "alice", "p1", Utc::now(), move |mut body| {
        if let Some(Value::Array(list)) = body.get_mut("Exercises") {
          list.push(json!({ "Name": format!("ex{n}") }));
        }
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
async fn delete_only_owned() {
  let s = store().await;
  s.insert(ResourceKind::Goals, doc("g1", "alice", json!({}))).await.unwrap();

  assert!(!s.delete(ResourceKind::Goals, "bob", "g1").await.unwrap());
  assert!(s.delete(ResourceKind::Goals, "alice", "g1").await.unwrap());
  assert!(!s.delete(ResourceKind::Goals, "alice", "g1").await.unwrap());
  assert!(
    s.find_one(ResourceKind::Goals, "alice", "g1")
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn ping_and_close() {
  let s = store().await;
  s.ping().await.unwrap();

  let handle = s.clone();
  s.close().await.unwrap();

  let err = handle.find(ResourceKind::Goals, "alice").await.unwrap_err();
  assert!(
    is_connection_failure(&err.to_string()),
    "closed-store error should look like a connection failure: {err}"
  );
}

// ─── Through the repository ──────────────────────────────────────────────────

#[tokio::test]
async fn repository_round_trip_keeps_legacy_storage_shape() {
  let s = store().await;
  let repo = Repository::new(&s, ResourceKind::Goals);

  let created = repo
    .create("alice", json!({ "name": "Lose Weight", "targetValue": 70 }))
    .await
    .unwrap();
  let id = created["id"].as_str().unwrap().to_owned();

  let raw = s
    .find_one(ResourceKind::Goals, "alice", &id)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(raw.body["Name"], "Lose Weight");
  assert!(!raw.body.contains_key("name"));

  let fetched = repo.get("alice", &id).await.unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn repository_delete_then_get() {
  let s = store().await;
  let repo = Repository::new(&s, ResourceKind::WorkoutLogs);
  let created = repo
    .create("alice", json!({ "workoutDate": "2024-01-01", "duration": 45 }))
    .await
    .unwrap();
  let id = created["id"].as_str().unwrap();

  repo.delete("alice", id).await.unwrap();
  assert!(matches!(repo.get("alice", id).await, Err(CoreError::NotFound(_))));
  assert!(matches!(repo.delete("alice", id).await, Err(CoreError::NotFound(_))));
}
