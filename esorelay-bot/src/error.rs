use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("bot API transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("bot API call {method} rejected: {description}")]
    Api { method: String, description: String },
}
