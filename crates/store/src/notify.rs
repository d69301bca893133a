//! User notification sink.
//!
//! Fire-and-forget: callers never consume a return value, and a sink must
//! never fail the operation that reports through it.

use parking_lot::Mutex;
use tracing::{error, info};

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// An operation completed.
    Success,
    /// An operation failed.
    Error,
    /// Neutral information.
    Info,
}

/// One user-facing notification.
#[derive(Debug, Clone)]
pub struct Notice {
    /// Severity.
    pub kind: NoticeKind,
    /// Display message.
    pub message: String,
}

/// Fire-and-forget notification display.
pub trait Notifier: Send + Sync {
    /// Show a success message.
    fn success(&self, message: &str);

    /// Show an error message.
    fn error(&self, message: &str);

    /// Show a neutral message.
    fn info(&self, message: &str);
}

/// Notifier that emits structured tracing events.
///
/// The default sink when no toast-style display is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(kind = "success", "{message}");
    }

    fn error(&self, message: &str) {
        error!(kind = "error", "{message}");
    }

    fn info(&self, message: &str) {
        info!(kind = "info", "{message}");
    }
}

/// Notifier that records notices for test assertions.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notices so far, in order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Number of notices of the given kind.
    #[must_use]
    pub fn count(&self, kind: NoticeKind) -> usize {
        self.notices.lock().iter().filter(|n| n.kind == kind).count()
    }

    /// Discard all recorded notices.
    pub fn clear(&self) {
        self.notices.lock().clear();
    }

    fn record(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().push(Notice {
            kind,
            message: message.to_string(),
        });
    }
}

impl Notifier for MemoryNotifier {
    fn success(&self, message: &str) {
        self.record(NoticeKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.record(NoticeKind::Error, message);
    }

    fn info(&self, message: &str) {
        self.record(NoticeKind::Info, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_records_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.success("created");
        notifier.error("failed");
        notifier.info("fyi");

        let notices = notifier.notices();
        assert_eq!(notices.len(), 3);
        assert_eq!(notices[0].kind, NoticeKind::Success);
        assert_eq!(notices[1].message, "failed");
        assert_eq!(notifier.count(NoticeKind::Error), 1);

        notifier.clear();
        assert!(notifier.notices().is_empty());
    }
}
