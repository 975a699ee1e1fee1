use tokio::sync::mpsc;
use tracing::warn;

use esorelay_events::{EventHandler, GameEvent, format_event};

/// Bridges the synchronous handler registry to the bot worker's outbox. A
/// full outbox drops the line rather than stalling the request that carried
/// the event.
pub struct Notifier {
    sender: mpsc::Sender<String>,
}

impl Notifier {
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self { sender }
    }
}

impl EventHandler for Notifier {
    fn handle(&self, event: &GameEvent) {
        let line = format_event(event);
        if let Err(err) = self.sender.try_send(line) {
            warn!(%err, "notification outbox full, dropping event line");
        }
    }
}
