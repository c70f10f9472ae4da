//! The signed-in user's bearer credential.

use std::sync::Arc;

use parking_lot::RwLock;

/// Holds the bearer token attached to outgoing requests.
///
/// Cloning is cheap and clones share the token. Only the owner of the
/// session changes it; the gateway reads it and never clears it.
#[derive(Clone, Default)]
pub struct Session {
  token: Arc<RwLock<Option<String>>>,
}

impl Session {
  pub fn new() -> Self { Self::default() }

  pub fn with_token(token: impl Into<String>) -> Self {
    let session = Self::new();
    session.set(token);
    session
  }

  pub fn set(&self, token: impl Into<String>) { *self.token.write() = Some(token.into()); }

  pub fn clear(&self) { *self.token.write() = None; }

  pub fn current(&self) -> Option<String> { self.token.read().clone() }
}
