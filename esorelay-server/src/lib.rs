mod dispatch;
mod error;
mod queue;
mod server;
#[cfg(test)]
mod dispatch_test;

pub use dispatch::{AppState, dispatch};
pub use error::ServerError;
pub use queue::CommandQueue;
pub use server::{
    CLIENT_CHUNK_SIZE, MAX_READ_RETRIES, READ_TIMEOUT, Server, shutdown_channel,
};
