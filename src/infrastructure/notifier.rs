//! User-visible status notifications.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Started,
    Stopping,
    /// A start command was refused.
    Rejected { reason: String },
    Saved { fallback: bool },
    SaveFailed { reason: String },
    Completed { records: usize, pages: u32 },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "Review crawl started"),
            Self::Stopping => write!(f, "Stopping after the current step"),
            Self::Rejected { reason } => write!(f, "Crawl not started: {reason}"),
            Self::Saved { fallback: false } => write!(f, "Export saved"),
            Self::Saved { fallback: true } => write!(f, "Export saved via fallback"),
            Self::SaveFailed { reason } => write!(f, "Export failed: {reason}"),
            Self::Completed { records, pages } => {
                write!(f, "Done: {records} reviews from {pages} pages")
            }
        }
    }
}

/// Fire-and-forget notification channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Logs notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::SaveFailed { .. } | Notification::Rejected { .. } => {
                warn!("{}", notification);
            }
            _ => info!("{}", notification),
        }
    }
}

/// Forwards notifications to a receiver; dropped silently once it is gone.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_texts() {
        assert_eq!(
            Notification::Completed { records: 12, pages: 3 }.to_string(),
            "Done: 12 reviews from 3 pages"
        );
        assert_eq!(Notification::Saved { fallback: true }.to_string(), "Export saved via fallback");
    }

    #[test]
    fn test_channel_notifier_ignores_closed_receiver() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notification::Started);
        assert_eq!(rx.try_recv().unwrap(), Notification::Started);
        drop(rx);
        notifier.notify(Notification::Stopping);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Notification::Saved { fallback: false }).unwrap();
        assert_eq!(json["kind"], "saved");
        assert_eq!(json["fallback"], false);
    }
}
