use serde_json::{Value, json};

const SEND_MESSAGE_NAME: &str = "sendMessage";
const RECONNECT_NAME: &str = "reconnect";

/// An outbound instruction queued for delivery to the polling game client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SendMessage { text: String },
    Reconnect,
}

/// Serializes a drained command batch to the `/commands` polling document:
/// `{"commands":[{"type":...,"data":{...}},...]}`. `reconnect` carries no
/// `data` key.
pub fn command_list_to_json(commands: &[Command]) -> String {
    let items: Vec<Value> = commands
        .iter()
        .map(|command| match command {
            Command::SendMessage { text } => json!({
                "type": SEND_MESSAGE_NAME,
                "data": { "text": text },
            }),
            Command::Reconnect => json!({ "type": RECONNECT_NAME }),
        })
        .collect();
    json!({ "commands": items }).to_string()
}

#[cfg(test)]
mod tests {
    use super::{Command, command_list_to_json};
    use serde_json::Value;

    #[test]
    fn empty_batch_serializes_to_an_empty_list() {
        assert_eq!(command_list_to_json(&[]), r#"{"commands":[]}"#);
    }

    #[test]
    fn batch_keeps_order_and_reconnect_has_no_data() {
        let commands = [
            Command::SendMessage {
                text: "привет".to_string(),
            },
            Command::Reconnect,
        ];
        let document: Value =
            serde_json::from_str(&command_list_to_json(&commands)).expect("valid JSON");
        let list = document["commands"].as_array().expect("commands array");

        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["type"], "sendMessage");
        assert_eq!(list[0]["data"]["text"], "привет");
        assert_eq!(list[1]["type"], "reconnect");
        assert!(list[1].get("data").is_none());
    }
}
