use chrono::Local;

use esorelay_events::{Actor, EventHandler, EventPayload, GameEvent};

use crate::event_log::EventLog;

fn chat_event(message: &str) -> GameEvent {
    GameEvent {
        code: "chat".to_string(),
        node: "NA".to_string(),
        actor: Actor {
            id: 7,
            name: "Ashryn".to_string(),
        },
        payload: EventPayload::Chat {
            message: message.to_string(),
        },
    }
}

#[test]
fn creates_the_log_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let logs = dir.path().join("logs");
    let log = EventLog::create(&logs).expect("create");

    assert!(logs.is_dir());
    assert_eq!(log.dir(), logs);
}

#[test]
fn appends_timestamped_lines_to_the_daily_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = EventLog::create(dir.path()).expect("create");

    log.append_event(&chat_event("first")).expect("append");
    log.handle(&chat_event("second"));

    let file = dir
        .path()
        .join(format!("{}.txt", Local::now().format("%d-%m-%Y")));
    let text = std::fs::read_to_string(&file).expect("daily file exists");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("[NA] [7] Ashryn: first"));
    assert!(lines[1].ends_with("[NA] [7] Ashryn: second"));
    // HH:MM prefix followed by a space.
    assert_eq!(lines[0].as_bytes()[2], b':');
    assert_eq!(lines[0].as_bytes()[5], b' ');
}
