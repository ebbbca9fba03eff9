//! Single-slot notification surface.
//!
//! Shows the most recent outcome. A new notification always replaces the
//! previous one; dismissing only hides it, so the last content stays
//! inspectable until the next event.

use std::time::{Duration, Instant};

/// Message shown after a successful enrollment insert.
pub const SUCCESS_MESSAGE: &str = "Course added successfully";

/// Message shown when the submission deadline elapses.
pub const TIMEOUT_MESSAGE: &str = "Operation timed out";

/// Notification type determines the styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Info => "Info",
        }
    }
}

/// Current notification content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub visible: bool,
    pub kind: NotificationKind,
    pub message: String,
}

/// Holds at most one notification.
#[derive(Debug, Default)]
pub struct NotificationRelay {
    current: Option<Notification>,
    shown_at: Option<Instant>,
    auto_dismiss: Option<Duration>,
    emitted: u64,
}

impl NotificationRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hide visible notifications once they are older than `after`.
    pub fn with_auto_dismiss(mut self, after: Option<Duration>) -> Self {
        self.auto_dismiss = after;
        self
    }

    /// Replace the current notification and make it visible.
    pub fn show(&mut self, kind: NotificationKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(kind = kind.label(), %message, "Showing notification");
        self.current = Some(Notification {
            visible: true,
            kind,
            message,
        });
        self.shown_at = Some(Instant::now());
        self.emitted += 1;
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(NotificationKind::Info, message);
    }

    /// Hide the notification. Kind and message are kept.
    pub fn dismiss(&mut self) {
        if let Some(current) = &mut self.current {
            current.visible = false;
        }
    }

    /// Dismiss the notification if auto-dismiss is on and it has been shown
    /// for at least that long. Returns true when it was hidden by this call.
    pub fn expire_if_due(&mut self, now: Instant) -> bool {
        let (Some(after), Some(shown_at)) = (self.auto_dismiss, self.shown_at) else {
            return false;
        };
        if !self.is_visible() || now.saturating_duration_since(shown_at) < after {
            return false;
        }
        self.dismiss();
        true
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.current.as_ref().is_some_and(|n| n.visible)
    }

    /// Total notifications shown over the relay's lifetime.
    pub fn emitted_count(&self) -> u64 {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_replaces_previous_content() {
        let mut relay = NotificationRelay::new();
        relay.info("Loading");
        relay.error("Operation timed out");
        let current = relay.current().unwrap();
        assert_eq!(current.kind, NotificationKind::Error);
        assert_eq!(current.message, "Operation timed out");
        assert!(current.visible);
        assert_eq!(relay.emitted_count(), 2);
    }

    #[test]
    fn dismiss_keeps_last_content() {
        let mut relay = NotificationRelay::new();
        relay.success(SUCCESS_MESSAGE);
        relay.dismiss();
        assert!(!relay.is_visible());
        let current = relay.current().unwrap();
        assert_eq!(current.kind, NotificationKind::Success);
        assert_eq!(current.message, SUCCESS_MESSAGE);
    }

    #[test]
    fn dismiss_on_empty_relay_is_noop() {
        let mut relay = NotificationRelay::new();
        relay.dismiss();
        assert!(relay.current().is_none());
        assert_eq!(relay.emitted_count(), 0);
    }

    #[test]
    fn expire_respects_auto_dismiss_setting() {
        let mut relay = NotificationRelay::new();
        relay.success("done");
        assert!(!relay.expire_if_due(Instant::now() + Duration::from_secs(3600)));
        assert!(relay.is_visible());

        let mut relay = NotificationRelay::new().with_auto_dismiss(Some(Duration::from_secs(5)));
        relay.success("done");
        assert!(!relay.expire_if_due(Instant::now()));
        assert!(relay.expire_if_due(Instant::now() + Duration::from_secs(6)));
        assert!(!relay.is_visible());
        assert!(!relay.expire_if_due(Instant::now() + Duration::from_secs(7)));
    }
}
