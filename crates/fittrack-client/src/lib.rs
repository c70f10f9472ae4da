//! Client library for the fittrack JSON API.
//!
//! [`Gateway`] issues requests with the [`Session`]'s bearer credential,
//! unwraps both list envelope shapes, normalizes records from either API
//! generation, and falls back to substitute data when the server cannot be
//! reached. User-facing messages go through a [`Notifier`].

pub mod envelope;
pub mod error;
pub mod gateway;
pub mod notify;
pub mod session;

pub use error::{GatewayError, Result};
pub use gateway::Gateway;
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
pub use session::Session;
