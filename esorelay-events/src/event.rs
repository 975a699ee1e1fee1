use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const CODE_CHAT: &str = "chat";
pub const CODE_BROADCAST: &str = "serverBroadcast";
pub const CODE_TRY: &str = "tryMessage";
pub const CODE_ROLL: &str = "userRoll";
pub const CODE_DICE: &str = "diceResult";
pub const CODE_MEDIA_TRACK: &str = "youtubePlaying";
pub const CODE_DISCONNECT: &str = "esoDisconnected";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event field missing: {0}")]
    MissingField(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaTrack {
    pub id: String,
    pub kind: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiceRoll {
    pub num: i64,
    pub sides: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    Chat { message: String },
    Broadcast { message: String },
    Try { message: String, success: bool },
    Roll { num: i64 },
    Dice { rolls: Vec<DiceRoll> },
    MediaTrack { track: MediaTrack },
    Disconnect,
    /// Event code the relay does not know. Still a successful decode; the
    /// formatter renders a placeholder so nothing is silently dropped.
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub code: String,
    pub node: String,
    pub actor: Actor,
    pub payload: EventPayload,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    code: String,
    data: RawData,
}

#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(rename = "gameData")]
    game_data: RawGameData,
    actor: RawActor,
    #[serde(rename = "eventData")]
    event_data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawGameData {
    node: String,
}

#[derive(Debug, Deserialize)]
struct RawActor {
    id: i64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawChat {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawTry {
    message: String,
    success: bool,
}

#[derive(Debug, Deserialize)]
struct RawRoll {
    num: i64,
}

#[derive(Debug, Deserialize)]
struct RawDice {
    rolls: Vec<RawDiceRoll>,
}

#[derive(Debug, Deserialize)]
struct RawDiceRoll {
    num: i64,
    sides: i64,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    track: RawTrack,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Decodes a notification body posted by the game client. Invalid JSON and
/// missing envelope fields surface as request-level failures, never a crash.
pub fn decode_event(body: &[u8]) -> Result<GameEvent, EventError> {
    let raw: RawEvent = serde_json::from_slice(body)?;
    let payload = decode_payload(&raw.code, raw.data.event_data)?;
    Ok(GameEvent {
        code: raw.code,
        node: raw.data.game_data.node,
        actor: Actor {
            id: raw.data.actor.id,
            name: raw.data.actor.name,
        },
        payload,
    })
}

fn decode_payload(code: &str, data: Option<Value>) -> Result<EventPayload, EventError> {
    fn required(data: Option<Value>) -> Result<Value, EventError> {
        data.ok_or(EventError::MissingField("eventData"))
    }
    match code {
        CODE_CHAT => {
            let raw: RawChat = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::Chat {
                message: raw.message,
            })
        }
        CODE_BROADCAST => {
            let raw: RawChat = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::Broadcast {
                message: raw.message,
            })
        }
        CODE_TRY => {
            let raw: RawTry = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::Try {
                message: raw.message,
                success: raw.success,
            })
        }
        CODE_ROLL => {
            let raw: RawRoll = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::Roll { num: raw.num })
        }
        CODE_DICE => {
            let raw: RawDice = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::Dice {
                rolls: raw
                    .rolls
                    .into_iter()
                    .map(|roll| DiceRoll {
                        num: roll.num,
                        sides: roll.sides,
                    })
                    .collect(),
            })
        }
        CODE_MEDIA_TRACK => {
            let raw: RawMedia = serde_json::from_value(required(data)?)?;
            Ok(EventPayload::MediaTrack {
                track: MediaTrack {
                    id: raw.track.id,
                    kind: raw.track.kind,
                },
            })
        }
        CODE_DISCONNECT => Ok(EventPayload::Disconnect),
        _ => Ok(EventPayload::Unexpected),
    }
}
