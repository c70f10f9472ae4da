//! [`Repository`] — owner-scoped CRUD for one resource family.
//!
//! Sits between the HTTP handlers and a [`DocumentStore`]: client payloads
//! come in camelCase or PascalCase, are stored in the PascalCase shape, and
//! leave again in the camelCase client shape with the store-owned fields
//! (`id`, `userId`, `createdAt`, `updatedAt`) attached.

use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  normalize::{self, FieldSpec},
  resource::ResourceKind,
  store::{Document, DocumentStore, Modified},
};

/// A record in client shape.
pub type Record = Map<String, Value>;

pub struct Repository<'a, S> {
  store: &'a S,
  kind:  ResourceKind,
}

impl<'a, S: DocumentStore> Repository<'a, S> {
  pub fn new(store: &'a S, kind: ResourceKind) -> Self { Self { store, kind } }

  pub fn kind(&self) -> ResourceKind { self.kind }

  fn not_found(&self) -> Error {
    Error::NotFound(format!("{} not found", self.kind.noun()))
  }

  /// Every record owned by `owner_id`. No ordering is guaranteed.
  pub async fn list(&self, owner_id: &str) -> Result<Vec<Record>> {
    let docs = self
      .store
      .find(self.kind, owner_id)
      .await
      .map_err(Error::store)?;
    Ok(docs.into_iter().map(|d| to_record(self.kind, d)).collect())
  }

  /// A single owned record; records of other owners are reported as absent.
  pub async fn get(&self, owner_id: &str, id: &str) -> Result<Record> {
    let doc = self
      .store
      .find_one(self.kind, owner_id, id)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| self.not_found())?;
    Ok(to_record(self.kind, doc))
  }

  /// Validate, assign an identity and creation timestamp, and persist.
  pub async fn create(&self, owner_id: &str, payload: Value) -> Result<Record> {
    let fields = self.kind.fields();
    let mut body = into_object(payload)?;
    normalize::strip_system_keys(&mut body);
    if let Some(field) = normalize::missing_required(fields, &body) {
      return Err(Error::BadRequest(format!("Missing required field: {field}")));
    }

    let mut canonical = normalize::to_client(fields, &body);
    fill_nested_ids(fields, &mut canonical);

    let doc = Document {
      id:         Uuid::new_v4().to_string(),
      owner_id:   owner_id.to_owned(),
      created_at: Utc::now(),
      updated_at: None,
      body:       normalize::to_storage(fields, &canonical),
    };
    let stored = self
      .store
      .insert(self.kind, doc)
      .await
      .map_err(Error::store)?;
    tracing::debug!(kind = %self.kind, id = %stored.id, "record created");
    Ok(to_record(self.kind, stored))
  }

  /// Merge `payload` over an existing owned record. Fields the payload does
  /// not mention keep their stored values. A miss is `NotFound`; nothing is
  /// ever created here.
  pub async fn update(&self, owner_id: &str, id: &str, payload: Value) -> Result<Record> {
    let mut patch = into_object(payload)?;
    normalize::strip_system_keys(&mut patch);
    let patch = normalize::canonical_keys(self.kind.fields(), &patch);

    self
      .edit(owner_id, id, move |mut record| {
        record.extend(patch);
        Ok(record)
      })
      .await
  }

  /// Apply `edit` to the client shape of an owned record and persist the
  /// result, atomically with respect to other writes. The edited record is
  /// validated and its nested items get ids before it is stored.
  pub async fn edit<F>(&self, owner_id: &str, id: &str, edit: F) -> Result<Record>
  where
    F: FnOnce(Record) -> Result<Record> + Send + 'static,
  {
    let kind = self.kind;
    let outcome = self
      .store
      .modify(kind, owner_id, id, Utc::now(), move |body| {
        let fields = kind.fields();
        let mut record = edit(normalize::to_client(fields, &body))?;
        if let Some(field) = normalize::missing_required(fields, &record) {
          return Err(Error::BadRequest(format!("Missing required field: {field}")));
        }
        fill_nested_ids(fields, &mut record);
        Ok(normalize::to_storage(fields, &record))
      })
      .await
      .map_err(Error::store)?;

    match outcome {
      Modified::Written(doc) => Ok(to_record(kind, doc)),
      Modified::Missing => Err(self.not_found()),
      Modified::Rejected(err) => Err(err),
    }
  }

  pub async fn delete(&self, owner_id: &str, id: &str) -> Result<()> {
    let removed = self
      .store
      .delete(self.kind, owner_id, id)
      .await
      .map_err(Error::store)?;
    if removed { Ok(()) } else { Err(self.not_found()) }
  }
}

/// Client shape of a stored document.
pub fn to_record(kind: ResourceKind, doc: Document) -> Record {
  let mut out = normalize::to_client(kind.fields(), &doc.body);
  out.insert("id".into(), Value::String(doc.id));
  out.insert("userId".into(), Value::String(doc.owner_id));
  out.insert("createdAt".into(), Value::String(doc.created_at.to_rfc3339()));
  if let Some(at) = doc.updated_at {
    out.insert("updatedAt".into(), Value::String(at.to_rfc3339()));
  }
  out
}

fn into_object(payload: Value) -> Result<Map<String, Value>> {
  match payload {
    Value::Object(map) => Ok(map),
    _ => Err(Error::BadRequest("Request body must be a JSON object".into())),
  }
}

/// Give every element of an identity-bearing nested sequence an `id` if it
/// lacks one. Expects the camelCase shape.
pub fn fill_nested_ids(fields: &[FieldSpec], record: &mut Map<String, Value>) {
  for spec in fields {
    let Some(nested) = spec.nested else { continue };
    if !nested.iter().any(|f| f.camel == "id") {
      continue;
    }
    if let Some(Value::Array(items)) = record.get_mut(spec.camel) {
      for item in items.iter_mut() {
        if let Value::Object(obj) = item
          && obj.get("id").is_none_or(Value::is_null)
        {
          obj.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        }
      }
    }
  }
}
