use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use esorelay_events::Command;

/// Thread-shared queue of outbound commands. The bot worker appends, polling
/// requests drain. Both operations take the same lock; `drain` detaches the
/// whole batch by replacement so the queue is logically empty the moment the
/// call returns.
#[derive(Debug, Default)]
pub struct CommandQueue {
    items: Mutex<Vec<Command>>,
    len_hint: AtomicUsize,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, command: Command) {
        let mut items = self.lock_items();
        items.push(command);
        self.len_hint.store(items.len(), Ordering::Relaxed);
    }

    /// Returns every queued command in insertion order, leaving the queue
    /// empty.
    pub fn drain(&self) -> Vec<Command> {
        let mut items = self.lock_items();
        self.len_hint.store(0, Ordering::Relaxed);
        std::mem::take(&mut *items)
    }

    /// Lock-free hint only; the answer may be stale by the time it is used.
    pub fn is_empty(&self) -> bool {
        self.len_hint.load(Ordering::Relaxed) == 0
    }

    fn lock_items(&self) -> std::sync::MutexGuard<'_, Vec<Command>> {
        // Queue operations cannot fail; a panic while holding the lock left
        // the vector itself intact.
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
