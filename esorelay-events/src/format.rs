use std::fmt::Write;

use crate::event::{EventPayload, GameEvent};

/// Renders the human-readable notification line for an event. The wording is
/// part of the contract with existing log files and bot subscribers.
pub fn format_event(event: &GameEvent) -> String {
    let mut text = format!("[{}] ", event.node);
    let actor = &event.actor;
    match &event.payload {
        EventPayload::Chat { message } => {
            let _ = write!(text, "[{}] {}: {}", actor.id, actor.name, message);
        }
        EventPayload::Broadcast { message } => {
            let _ = write!(text, "Блютекст: {message}");
        }
        EventPayload::Try { message, success } => {
            let outcome = if *success { "успешно" } else { "безуспешно" };
            let _ = write!(
                text,
                "[{}] [try] {}: {} {}",
                actor.id, actor.name, outcome, message
            );
        }
        EventPayload::Roll { num } => {
            let _ = write!(text, "[{}] [roll] {} rolled {}", actor.id, actor.name, num);
        }
        EventPayload::Dice { rolls } => {
            let mut rolled = String::new();
            for roll in rolls {
                let _ = write!(rolled, "{}/{} ", roll.num, roll.sides);
            }
            let _ = write!(
                text,
                "[{}] [dice] {} rolled {}",
                actor.id, actor.name, rolled
            );
        }
        EventPayload::MediaTrack { track } => {
            let link = if track.kind == "youtube" {
                format!("https://www.youtube.com/watch?v={}", track.id)
            } else {
                track.id.clone()
            };
            let _ = write!(
                text,
                "[{}] [yt-play] {} played {}",
                actor.id, actor.name, link
            );
        }
        EventPayload::Disconnect => text.push_str("DISCONNECT"),
        EventPayload::Unexpected => {
            let _ = write!(text, "unimplemented event '{}'", event.code);
        }
    }
    text
}
