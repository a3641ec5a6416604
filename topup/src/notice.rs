//! Transient user notices.
//!
//! Flows report outcomes to the user through the [`Notifier`] capability:
//! short success/info/error messages with a display-duration lifecycle and
//! no persisted identity. Delivery is fire-and-forget and infallible by
//! contract: a notifier that cannot display anything must swallow the
//! notice, never panic, so that flow postconditions hold on every path.

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// An action completed.
    Success,
    /// Guidance that requires no action from the flow.
    Info,
    /// An action failed.
    Error,
}

/// A transient message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity, used by hosts to pick presentation.
    pub kind: NoticeKind,
    /// The message text.
    pub text: String,
}

impl Notice {
    /// Creates a success notice.
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Creates an info notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            NoticeKind::Success => write!(f, "success: {}", self.text),
            NoticeKind::Info => write!(f, "info: {}", self.text),
            NoticeKind::Error => write!(f, "error: {}", self.text),
        }
    }
}

/// Capability for surfacing transient notices to the user.
pub trait Notifier: Send + Sync {
    /// Displays a notice. Must not block and must not fail.
    fn notify(&self, notice: Notice);
}

/// A notifier that discards every notice.
///
/// Useful for headless embedders and as a test default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notice: Notice) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(Notice::success("ok").kind, NoticeKind::Success);
        assert_eq!(Notice::info("hm").kind, NoticeKind::Info);
        assert_eq!(Notice::error("no").kind, NoticeKind::Error);
    }

    #[test]
    fn test_display_prefixes_kind() {
        assert_eq!(Notice::error("request failed").to_string(), "error: request failed");
    }

    #[test]
    fn test_null_notifier_swallows() {
        NullNotifier.notify(Notice::info("nobody listens"));
    }
}
