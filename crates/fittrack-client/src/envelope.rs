//! List response envelopes.
//!
//! Lists arrive either as a bare JSON array or as a reference-preserving
//! object `{"$id": "1", "$values": [...]}`. Both become a plain `Vec`.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{GatewayError, Result};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
  Bare(Vec<Value>),
  Preserved {
    #[serde(rename = "$values")]
    values: Vec<Value>,
  },
}

impl Envelope {
  pub fn into_vec(self) -> Vec<Value> {
    match self {
      Envelope::Bare(values) | Envelope::Preserved { values } => values,
    }
  }
}

/// Unwrap either envelope shape.
pub fn unwrap_list(body: Value) -> Result<Vec<Value>> {
  serde_json::from_value::<Envelope>(body)
    .map(Envelope::into_vec)
    .map_err(|_| GatewayError::Decode("expected a list or a $values envelope".into()))
}
