use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("server configuration error: {0}")]
    Config(String),
    #[error("server IO error: {0}")]
    Io(#[from] std::io::Error),
}
