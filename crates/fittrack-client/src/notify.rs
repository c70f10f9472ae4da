//! User-facing notifications with severity-dependent display time.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Info,
  Success,
  Warning,
  Error,
}

impl Severity {
  /// How long a notification of this severity stays on screen.
  pub fn display_duration(self) -> Duration {
    match self {
      Severity::Info | Severity::Success => Duration::from_secs(3),
      Severity::Warning => Duration::from_secs(5),
      Severity::Error => Duration::from_secs(8),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub severity: Severity,
  pub message:  String,
}

impl Notification {
  pub fn new(severity: Severity, message: impl Into<String>) -> Self {
    Self { severity, message: message.into() }
  }

  pub fn display_duration(&self) -> Duration { self.severity.display_duration() }
}

/// Sink for notifications. Implementations must not block.
pub trait Notifier: Send + Sync {
  fn notify(&self, notification: Notification);
}

/// Writes notifications to the log at the matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
  fn notify(&self, n: Notification) {
    let secs = n.display_duration().as_secs();
    match n.severity {
      Severity::Info | Severity::Success => tracing::info!(display_secs = secs, "{}", n.message),
      Severity::Warning => tracing::warn!(display_secs = secs, "{}", n.message),
      Severity::Error => tracing::error!(display_secs = secs, "{}", n.message),
    }
  }
}
