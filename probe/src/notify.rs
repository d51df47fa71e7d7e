//! Transient user notifications.
//!
//! Screens push one [`Notification`] per submission; whatever renders them
//! (the CLI, a UI) subscribes to the [`Toaster`].

use std::fmt;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            Level::Success => "✓",
            Level::Error => "✗",
        };
        write!(f, "{} {}", marker, self.message)
    }
}

/// Fan-out of notifications to any number of listeners.
#[derive(Clone)]
pub struct Toaster {
    tx: broadcast::Sender<Notification>,
}

impl Toaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(Level::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Level::Error, message.into());
    }

    fn emit(&self, level: Level, message: String) {
        debug!(?level, message = %message, "Notification");
        // No listeners is fine: nobody is looking.
        let _ = self.tx.send(Notification { level, message });
    }
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out() {
        let toaster = Toaster::default();
        let mut first = toaster.subscribe();
        let mut second = toaster.subscribe();

        toaster.success("Message sent successfully!");

        for rx in [&mut first, &mut second] {
            let note = rx.recv().await.unwrap();
            assert_eq!(note.level, Level::Success);
            assert_eq!(note.message, "Message sent successfully!");
        }
    }

    #[test]
    fn test_emit_without_listeners() {
        Toaster::default().error("nobody hears this");
    }
}
