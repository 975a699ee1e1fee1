use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::error;

use esorelay_events::{EventHandler, GameEvent, format_event};

use crate::error::StorageError;

/// Appends one line per notified event to a daily file named by the local
/// date. Each write is flushed and synced so a crash loses at most the line
/// being written.
#[derive(Debug)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    pub fn create(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn append_event(&self, event: &GameEvent) -> Result<(), StorageError> {
        let now = Local::now();
        let line = format!("{} {}\n", now.format("%H:%M"), format_event(event));
        let file_name = format!("{}.txt", now.format("%d-%m-%Y"));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(file_name))?;
        file.write_all(line.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl EventHandler for EventLog {
    fn handle(&self, event: &GameEvent) {
        // A failed log write never fails the request that carried the event.
        if let Err(err) = self.append_event(event) {
            error!(dir = %self.dir.display(), %err, "could not append to the event log");
        }
    }
}
