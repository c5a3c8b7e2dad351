//! Notification sink and confirmation prompt seams.
//!
//! The coordinator reports every terminal outcome through a caller-supplied
//! [`Notifier`] and gates destructive operations behind a [`Confirmation`]
//! prompt. Both are traits so a UI can plug in toasts and dialogs while the
//! CLI uses stdout and stdin.

use async_trait::async_trait;

/// How loud the notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// A single human-readable outcome message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Caller-supplied notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Info => tracing::info!("{}", notification.message),
            Severity::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Yes/no prompt invoked before a delete takes any remote effect.
///
/// Returning `false` (or dismissing, in a UI) must abort the operation with
/// zero gateway calls made.
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Confirmation that always answers yes. Only sensible for non-interactive
/// callers that have already confirmed out of band.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Confirmation for AutoConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}
