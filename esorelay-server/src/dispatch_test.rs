use std::sync::{Arc, Mutex};

use esorelay_events::{Command, EventHandler, GameEvent, format_event};
use esorelay_net::{Method, Request};

use crate::dispatch::{AppState, dispatch};
use crate::queue::CommandQueue;

struct Recorder {
    seen: Mutex<Vec<String>>,
}

struct RecorderHandle(Arc<Recorder>);

impl EventHandler for RecorderHandle {
    fn handle(&self, event: &GameEvent) {
        self.0
            .seen
            .lock()
            .expect("recorder lock")
            .push(format_event(event));
    }
}

fn state() -> AppState {
    AppState {
        queue: Arc::new(CommandQueue::new()),
        handlers: Vec::new(),
    }
}

fn request(method: Method, uri: &str, body: Option<&[u8]>) -> Request {
    Request {
        method,
        uri: uri.to_string(),
        version: "HTTP/1.0".to_string(),
        headers: Vec::new(),
        body_length: body.map_or(0, <[u8]>::len),
        body: body.map(<[u8]>::to_vec),
    }
}

fn head_and_body(response: &[u8]) -> (String, Vec<u8>) {
    let split = response
        .windows(4)
        .position(|window| window == b"\r\n\r\n")
        .expect("header terminator");
    (
        String::from_utf8_lossy(&response[..split]).into_owned(),
        response[split + 4..].to_vec(),
    )
}

#[test]
fn get_commands_with_an_empty_queue_serves_an_empty_list() {
    let state = state();
    let response = dispatch(&state, &request(Method::Get, "/commands", None));
    let (head, body) = head_and_body(&response);

    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert!(head.contains("content-type: text/plain"));
    assert_eq!(body, br#"{"commands":[]}"#);
}

#[test]
fn get_commands_drains_the_queue() {
    let state = state();
    state.queue.add(Command::SendMessage {
        text: "hi".to_string(),
    });
    state.queue.add(Command::Reconnect);

    let first = dispatch(&state, &request(Method::Get, "/commands", None));
    let (_, body) = head_and_body(&first);
    let document: serde_json::Value = serde_json::from_slice(&body).expect("valid JSON");
    let commands = document["commands"].as_array().expect("commands array");
    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0]["type"], "sendMessage");
    assert_eq!(commands[1]["type"], "reconnect");

    let second = dispatch(&state, &request(Method::Get, "/commands", None));
    let (_, body) = head_and_body(&second);
    assert_eq!(body, br#"{"commands":[]}"#);
}

#[test]
fn options_advertises_the_allowed_methods() {
    let response = dispatch(&state(), &request(Method::Options, "/anything", None));
    let (head, body) = head_and_body(&response);

    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert!(head.contains("allow: GET, POST, OPTIONS"));
    assert!(body.is_empty());
}

#[test]
fn post_without_a_body_gets_the_no_body_placeholder() {
    let response = dispatch(&state(), &request(Method::Post, "/event", None));
    let (_, body) = head_and_body(&response);
    assert_eq!(body, b"no body");
}

#[test]
fn post_event_with_an_undecodable_body_reports_failure() {
    let response = dispatch(&state(), &request(Method::Post, "/event", Some(b"{}")));
    let (_, body) = head_and_body(&response);
    assert_eq!(body, b"failed to to parse event");
}

#[test]
fn post_event_forwards_to_every_handler_and_acknowledges() {
    let recorder = Arc::new(Recorder {
        seen: Mutex::new(Vec::new()),
    });
    let state = AppState {
        queue: Arc::new(CommandQueue::new()),
        handlers: vec![
            Box::new(RecorderHandle(Arc::clone(&recorder))),
            Box::new(RecorderHandle(Arc::clone(&recorder))),
        ],
    };

    let body = br#"{"code":"chat","data":{"gameData":{"node":"NA"},"actor":{"id":7,"name":"Ashryn"},"eventData":{"message":"well met"}}}"#;
    let response = dispatch(&state, &request(Method::Post, "/event", Some(body)));
    let (_, response_body) = head_and_body(&response);

    assert_eq!(response_body, "done \u{1f44d}".as_bytes());
    let seen = recorder.seen.lock().expect("recorder lock");
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], "[NA] [7] Ashryn: well met");
}

#[test]
fn unknown_routes_get_the_fixed_not_found_page() {
    for (method, uri) in [
        (Method::Get, "/nope"),
        (Method::Head, "/commands"),
        (Method::Unset, "/commands"),
        (Method::Get, "/event"),
    ] {
        let response = dispatch(&state(), &request(method, uri, None));
        let (head, body) = head_and_body(&response);

        assert!(head.starts_with("HTTP/1.0 404 NOT FOUND"));
        assert_eq!(body.len(), 146);
    }
}
