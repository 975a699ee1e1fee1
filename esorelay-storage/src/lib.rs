mod config;
mod error;
mod event_log;
#[cfg(test)]
mod event_log_test;

pub use config::{Config, ConfigPair, executable_dir};
pub use error::StorageError;
pub use event_log::EventLog;
