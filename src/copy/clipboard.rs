//! Clipboard and notification collaborators.

use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use tokio::task::LocalSet;
use tracing::info;

/// Reasons a clipboard write can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable")]
    Unavailable,
    #[error("clipboard access was denied")]
    PermissionDenied,
    #[error("clipboard write failed: {0}")]
    Other(String),
}

/// System clipboard, written asynchronously.
///
/// Implementations run on the UI thread's task set, so futures need not be
/// `Send`.
#[async_trait(?Send)]
pub trait Clipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Clipboard for hosts without one; every write fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClipboard;

#[async_trait(?Send)]
impl Clipboard for UnavailableClipboard {
    async fn write_text(&self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError::Unavailable)
    }
}

/// Clipboard write and its follow-up, started by one click.
pub type CopyTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs copy tasks on the UI thread.
///
/// Spawning never runs the task inline and never fails. A task that is
/// never driven never completes, so it never notifies.
pub trait TaskSpawner {
    fn spawn_task(&self, task: CopyTask);
}

/// Queues the task on the set. It runs once the host drives the set with
/// `run_until` or by awaiting it, even if the set was idle when queued.
impl TaskSpawner for LocalSet {
    fn spawn_task(&self, task: CopyTask) {
        drop(self.spawn_local(task));
    }
}

/// Transient user notifications.
pub trait Notifier {
    /// Shows a success message that dismisses itself after `auto_dismiss`.
    fn success(&self, message: &str, auto_dismiss: Duration);
}

/// Notifier that writes notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str, auto_dismiss: Duration) {
        info!(
            text = message,
            auto_dismiss_ms = auto_dismiss.as_millis() as u64,
            "Notification"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_error_messages() {
        assert_eq!(
            ClipboardError::Unavailable.to_string(),
            "clipboard is unavailable"
        );
        assert_eq!(
            ClipboardError::PermissionDenied.to_string(),
            "clipboard access was denied"
        );
        assert_eq!(
            ClipboardError::Other("busy".to_string()).to_string(),
            "clipboard write failed: busy"
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_unavailable_clipboard_rejects_writes() {
        // Arrange & Act
        let result = UnavailableClipboard.write_text("x").await;

        // Assert
        assert_eq!(result, Err(ClipboardError::Unavailable));
    }

    #[test]
    fn test_log_notifier_does_not_panic() {
        LogNotifier.success("code copied", Duration::from_millis(1000));
    }
}
