//! Notifications

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// The operation succeeded.
    Success,

    /// Nothing changed, and that is fine.
    Info,

    /// The operation was skipped for a reason the user can fix.
    Warning,

    /// The operation failed and any local change was rolled back.
    Error,
}

/// One user-facing notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// How the UI should style it.
    pub kind: NoticeKind,

    /// Ready-to-display message.
    pub message: String,
}

/// Sender half of the notification channel.
///
/// Every state-changing store operation reports its outcome here exactly
/// once, in the order the operations resolved. The UI drains the receiver;
/// tests drain it to assert on outcomes without reaching into store
/// internals.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: UnboundedSender<Notice>,
}

impl Notifier {
    /// Creates a notifier and the receiver its notices arrive on.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();

        (Self { tx }, rx)
    }

    /// Reports a completed operation.
    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeKind::Success, message.into());
    }

    /// Reports a benign no-op.
    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeKind::Info, message.into());
    }

    /// Reports a skipped operation the user can retry after acting.
    pub fn warning(&self, message: impl Into<String>) {
        self.push(NoticeKind::Warning, message.into());
    }

    /// Reports a failed and rolled-back operation.
    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeKind::Error, message.into());
    }

    fn push(&self, kind: NoticeKind, message: String) {
        // A closed receiver just means nothing is rendering notices.
        _ = self.tx.send(Notice { kind, message });
    }
}
