mod command;
mod event;
mod format;

pub use command::{Command, command_list_to_json};
pub use event::{
    Actor, DiceRoll, EventError, EventPayload, GameEvent, MediaTrack, decode_event,
};
pub use format::format_event;

/// A sink for decoded game events. The registry of handlers is assembled at
/// startup and read-only afterwards; handlers log their own failures and
/// never fail the request that delivered the event.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &GameEvent);
}
