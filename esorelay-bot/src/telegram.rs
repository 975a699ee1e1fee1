use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::BotError;
use crate::worker::{BotTransport, BotUpdate, BotUser};

const API_BASE: &str = "https://api.telegram.org";
const POLL_LIMIT: u32 = 20;
const POLL_TIMEOUT_SECS: u32 = 5;

/// Telegram Bot API client. Every call is a POST of a JSON document to
/// `/bot<token>/<method>`; the response envelope carries `ok` plus either the
/// result or a human-readable rejection.
pub struct TelegramApi {
    http: reqwest::Client,
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<R> {
    ok: bool,
    result: Option<R>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    id: i64,
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUpdate {
    update_id: i64,
    message: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    from: Option<ApiUser>,
    text: Option<String>,
}

impl TelegramApi {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.to_string(),
        }
    }

    async fn call<R: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        payload: Value,
    ) -> Result<R, BotError> {
        let url = format!("{API_BASE}/bot{}/{method}", self.token);
        let envelope: ApiEnvelope<R> = self
            .http
            .post(url)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;
        match envelope.result {
            Some(result) if envelope.ok => Ok(result),
            _ => Err(BotError::Api {
                method: method.to_string(),
                description: envelope
                    .description
                    .unwrap_or_else(|| "no description".to_string()),
            }),
        }
    }
}

#[async_trait]
impl BotTransport for TelegramApi {
    async fn get_me(&self) -> Result<BotUser, BotError> {
        let user: ApiUser = self.call("getMe", json!({})).await?;
        Ok(BotUser {
            id: user.id,
            username: user.username.unwrap_or_default(),
        })
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<BotUpdate>, BotError> {
        let updates: Vec<ApiUpdate> = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "limit": POLL_LIMIT,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message"],
                }),
            )
            .await?;
        Ok(updates
            .into_iter()
            .map(|update| {
                let message = update.message.unwrap_or(ApiMessage {
                    from: None,
                    text: None,
                });
                let from = message.from.unwrap_or(ApiUser {
                    id: 0,
                    username: None,
                });
                BotUpdate {
                    update_id: update.update_id,
                    from_id: from.id,
                    from_username: from.username.unwrap_or_default(),
                    text: message.text.unwrap_or_default(),
                }
            })
            .collect())
    }

    async fn send_message(&self, chat_id: i64, text: &str, silent: bool) -> Result<(), BotError> {
        let _sent: Value = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": chat_id,
                    "text": text,
                    "parse_mode": "HTML",
                    "disable_notification": silent,
                }),
            )
            .await?;
        Ok(())
    }
}
