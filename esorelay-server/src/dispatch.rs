use std::sync::Arc;

use tracing::debug;

use esorelay_events::{EventHandler, command_list_to_json, decode_event};
use esorelay_net::{
    ByteBuilder, CONTENT_PLAIN, Method, Request, not_found, respond_options, respond_text,
};

use crate::queue::CommandQueue;

const COMMANDS_URI: &str = "/commands";
const EVENT_URI: &str = "/event";
const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// State shared by every connection task. The handler registry is assembled
/// once at startup and never mutated afterwards, so it needs no lock.
pub struct AppState {
    pub queue: Arc<CommandQueue>,
    pub handlers: Vec<Box<dyn EventHandler>>,
}

/// Maps a completed request to its response bytes. The command JSON is served
/// as text/plain on purpose: the existing polling client expects that
/// content type.
pub fn dispatch(state: &AppState, request: &Request) -> Vec<u8> {
    let mut out = ByteBuilder::with_capacity(4096);

    if request.method == Method::Post && request.body.is_none() {
        respond_text(&mut out, b"no body", CONTENT_PLAIN);
    } else if request.method == Method::Options {
        respond_options(&mut out, ALLOWED_METHODS);
    } else if request.method == Method::Get && request.uri == COMMANDS_URI {
        let commands = state.queue.drain();
        let document = command_list_to_json(&commands);
        respond_text(&mut out, document.as_bytes(), CONTENT_PLAIN);
    } else if request.method == Method::Post && request.uri == EVENT_URI {
        match request.body.as_deref() {
            None => respond_text(&mut out, b"empty body", CONTENT_PLAIN),
            Some(body) => match decode_event(body) {
                Ok(event) => {
                    for handler in &state.handlers {
                        handler.handle(&event);
                    }
                    respond_text(&mut out, "done \u{1f44d}".as_bytes(), CONTENT_PLAIN);
                }
                Err(err) => {
                    debug!(%err, "event body did not decode");
                    respond_text(&mut out, b"failed to to parse event", CONTENT_PLAIN);
                }
            },
        }
    } else {
        not_found(&mut out);
    }

    out.into_bytes()
}
