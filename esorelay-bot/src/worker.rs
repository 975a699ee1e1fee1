use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use esorelay_events::Command;
use esorelay_server::CommandQueue;
use esorelay_storage::Config;

use crate::error::BotError;

pub const OWNER_CONFIG_KEY: &str = "owner";

const POLL_PACING: Duration = Duration::from_secs(1);
const OUTBOX_CAPACITY: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotUpdate {
    pub update_id: i64,
    pub from_id: i64,
    pub from_username: String,
    pub text: String,
}

/// The slice of the bot API the worker needs. Kept narrow so tests can drive
/// the worker with a scripted transport.
#[async_trait]
pub trait BotTransport: Send + Sync {
    async fn get_me(&self) -> Result<BotUser, BotError>;
    async fn get_updates(&self, offset: i64) -> Result<Vec<BotUpdate>, BotError>;
    async fn send_message(&self, chat_id: i64, text: &str, silent: bool) -> Result<(), BotError>;
}

/// Mutable bot state. `owner == 0` means nobody has claimed the bot yet; the
/// first `/start` sender becomes the owner and is persisted to the config.
#[derive(Debug)]
pub struct BotParams {
    pub owner: i64,
    pub chat_mode: bool,
}

/// Channel carrying formatted event lines from request handlers to the
/// worker's outbox.
pub fn notify_channel() -> (mpsc::Sender<String>, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOX_CAPACITY)
}

pub struct BotWorker<T: BotTransport> {
    transport: T,
    queue: Arc<CommandQueue>,
    config: Arc<Mutex<Config>>,
    params: BotParams,
    outbox: mpsc::Receiver<String>,
    offset: i64,
}

impl<T: BotTransport> BotWorker<T> {
    pub fn new(
        transport: T,
        queue: Arc<CommandQueue>,
        config: Arc<Mutex<Config>>,
        outbox: mpsc::Receiver<String>,
    ) -> Self {
        let owner = lock_config(&config)
            .get(OWNER_CONFIG_KEY)
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        Self {
            transport,
            queue,
            config,
            params: BotParams {
                owner,
                chat_mode: true,
            },
            outbox,
            offset: 0,
        }
    }

    /// Long-poll loop. A failed identity check is fatal; poll failures are
    /// logged and retried on the next pacing tick.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) -> Result<(), BotError> {
        let me = self.transport.get_me().await?;
        info!(id = me.id, username = %me.username, "bot online");

        loop {
            if *stop.borrow() {
                break;
            }

            self.flush_outbox().await;

            match self.transport.get_updates(self.offset).await {
                Ok(updates) => {
                    for update in updates {
                        self.offset = update.update_id + 1;
                        self.process_update(update).await;
                    }
                }
                Err(err) => warn!(%err, "update poll failed"),
            }

            tokio::select! {
                () = tokio::time::sleep(POLL_PACING) => {}
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
            }
        }
        info!("bot worker stopped");
        Ok(())
    }

    /// Forwards queued event lines to the owner, silently. Lines arriving
    /// before anyone runs `/start` are dropped here.
    async fn flush_outbox(&mut self) {
        while let Ok(line) = self.outbox.try_recv() {
            if self.params.owner == 0 {
                continue;
            }
            if let Err(err) = self
                .transport
                .send_message(self.params.owner, &line, true)
                .await
            {
                warn!(%err, "could not forward event line");
            }
        }
    }

    pub(crate) async fn process_update(&mut self, update: BotUpdate) {
        match update.text.as_str() {
            "/start" => {
                if self.params.owner == 0 {
                    self.params.owner = update.from_id;
                    self.persist_owner();
                    self.reply("Готово! Вы сохранены как владелец бота.").await;
                } else if self.params.owner != update.from_id {
                    warn!(
                        id = update.from_id,
                        username = %update.from_username,
                        "account tried to access bot"
                    );
                } else {
                    self.reply("Вы уже владеете этим ботом.").await;
                }
            }
            "/reconnect" => {
                self.queue.add(Command::Reconnect);
                self.reply("Reconnecting").await;
            }
            "/chat" => {
                self.params.chat_mode = !self.params.chat_mode;
                if self.params.chat_mode {
                    self.reply("Chat mode enabled").await;
                } else {
                    self.reply("Chat mode disabled").await;
                }
            }
            _ => {
                if self.params.chat_mode {
                    self.queue.add(Command::SendMessage { text: update.text });
                }
            }
        }
    }

    // Synchronous on purpose: the config guard must not be held across an
    // await point, or the worker future stops being `Send`.
    fn persist_owner(&self) {
        let mut config = lock_config(&self.config);
        config.set(OWNER_CONFIG_KEY, &self.params.owner.to_string());
        if let Err(err) = config.rewrite() {
            warn!(%err, "could not persist the owner id");
        }
    }

    async fn reply(&self, text: &str) {
        if let Err(err) = self
            .transport
            .send_message(self.params.owner, text, false)
            .await
        {
            warn!(%err, "could not reply to the owner");
        }
    }

    #[cfg(test)]
    pub(crate) fn params(&self) -> &BotParams {
        &self.params
    }
}

fn lock_config(config: &Mutex<Config>) -> std::sync::MutexGuard<'_, Config> {
    config
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
