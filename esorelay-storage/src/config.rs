use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPair {
    pub name: String,
    pub value: String,
}

/// Flat `key=value` configuration, one pair per line, kept in insertion
/// order. The file lives next to the executable and is rewritten wholesale
/// whenever a value changes.
#[derive(Debug)]
pub struct Config {
    pairs: Vec<ConfigPair>,
    path: PathBuf,
}

impl Config {
    /// Loads the file at `path`. An unreadable or missing file yields an
    /// empty config; the first `rewrite` will create it.
    pub fn load(path: &Path) -> Self {
        let mut config = Self {
            pairs: Vec::new(),
            path: path.to_path_buf(),
        };
        match fs::read_to_string(path) {
            Ok(text) => config.parse(&text),
            Err(err) => warn!(
                path = %path.display(),
                %err,
                "config file not readable, starting empty"
            ),
        }
        config
    }

    fn parse(&mut self, text: &str) {
        for line in text.lines() {
            if let Some((name, value)) = line.split_once('=') {
                self.pairs.push(ConfigPair {
                    name: name.to_string(),
                    value: value.to_string(),
                });
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.value.as_str())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        match self.pairs.iter_mut().find(|pair| pair.name == name) {
            Some(pair) => pair.value = value.to_string(),
            None => self.pairs.push(ConfigPair {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Writes every pair back to disk, newline-terminated.
    pub fn rewrite(&self) -> Result<(), StorageError> {
        let mut text = String::new();
        for pair in &self.pairs {
            text.push_str(&pair.name);
            text.push('=');
            text.push_str(&pair.value);
            text.push('\n');
        }
        fs::write(&self.path, text)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pairs(&self) -> &[ConfigPair] {
        &self.pairs
    }
}

/// Directory holding the running executable; config and logs are colocated
/// with it.
pub fn executable_dir() -> Result<PathBuf, StorageError> {
    let exe = std::env::current_exe()?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or(StorageError::NoExecutableDir)
}
