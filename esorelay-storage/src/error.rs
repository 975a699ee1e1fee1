use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot resolve the executable directory")]
    NoExecutableDir,
}
