use serde::Deserialize;
use serde_json::{Value, json};

/// Reply from the instance to an earlier request.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Correlates the answer with the pending request, when present.
    pub uuid: Option<String>,
    pub data: Value,
}

impl Answer {
    fn from_data(data: Value) -> Self {
        let uuid = data
            .get("uuid")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { uuid, data }
    }

    /// Human-readable failure text carried by error answers.
    pub fn error_message(&self) -> String {
        match self.data.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => "unknown error".to_string(),
        }
    }
}

/// Inbound message posted by the instance frame.
///
/// Wire shape is `{"type": <tag>, "data": <payload>}`.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// `extension-advertise`
    Advertise { online: bool },
    /// `extension-online`
    Online,
    /// `extension-offline`
    Offline,
    /// `extension-answer`
    Answer(Answer),
    /// `extension-answer-offline`
    AnswerOffline(Answer),
    /// `extension-answer-error`
    AnswerError(Answer),
    /// Any other tag, or a message without one.
    Unknown { tag: Option<String>, raw: Value },
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    data: Value,
}

impl RelayMessage {
    pub fn tag(&self) -> &str {
        match self {
            RelayMessage::Advertise { .. } => "extension-advertise",
            RelayMessage::Online => "extension-online",
            RelayMessage::Offline => "extension-offline",
            RelayMessage::Answer(_) => "extension-answer",
            RelayMessage::AnswerOffline(_) => "extension-answer-offline",
            RelayMessage::AnswerError(_) => "extension-answer-error",
            RelayMessage::Unknown { tag, .. } => tag.as_deref().unwrap_or("<none>"),
        }
    }

    /// Classify a raw posted message. Never fails: anything unrecognized
    /// becomes [`RelayMessage::Unknown`].
    pub fn from_value(raw: Value) -> Self {
        let Ok(Envelope { tag, data }) = Envelope::deserialize(&raw) else {
            let tag = raw.get("type").and_then(Value::as_str).map(str::to_string);
            return RelayMessage::Unknown { tag, raw };
        };
        match tag.as_str() {
            "extension-advertise" => RelayMessage::Advertise {
                online: data.get("online").and_then(Value::as_bool).unwrap_or(false),
            },
            "extension-online" => RelayMessage::Online,
            "extension-offline" => RelayMessage::Offline,
            "extension-answer" => RelayMessage::Answer(Answer::from_data(data)),
            "extension-answer-offline" => RelayMessage::AnswerOffline(Answer::from_data(data)),
            "extension-answer-error" => RelayMessage::AnswerError(Answer::from_data(data)),
            _ => RelayMessage::Unknown {
                tag: Some(tag.clone()),
                raw,
            },
        }
    }
}

/// Outbound action request posted to the frame.
pub fn action_request(uuid: &str, name: &str, args: &Value) -> Value {
    json!({
        "type": "action",
        "data": {
            "uuid": uuid,
            "name": name,
            "args": args,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advertise_reads_online_flag() {
        let message = RelayMessage::from_value(json!({
            "type": "extension-advertise",
            "data": {"online": true}
        }));
        assert_eq!(message, RelayMessage::Advertise { online: true });

        let message = RelayMessage::from_value(json!({"type": "extension-advertise"}));
        assert_eq!(message, RelayMessage::Advertise { online: false });
    }

    #[test]
    fn test_answer_extracts_uuid() {
        let message = RelayMessage::from_value(json!({
            "type": "extension-answer-error",
            "data": {"uuid": "42", "error": "no such command"}
        }));
        let RelayMessage::AnswerError(answer) = message else {
            panic!("expected answer error");
        };
        assert_eq!(answer.uuid.as_deref(), Some("42"));
        assert_eq!(answer.error_message(), "no such command");
    }

    #[test]
    fn test_unrecognized_shapes_are_unknown() {
        let message = RelayMessage::from_value(json!({"type": "webpack-ok"}));
        assert_eq!(message.tag(), "webpack-ok");
        assert!(matches!(message, RelayMessage::Unknown { .. }));

        let message = RelayMessage::from_value(json!("hello"));
        assert_eq!(message.tag(), "<none>");
    }

    #[test]
    fn test_action_request_shape() {
        let request = action_request("u-1", "open", &json!(["README.md"]));
        assert_eq!(request["type"], "action");
        assert_eq!(request["data"]["uuid"], "u-1");
        assert_eq!(request["data"]["args"][0], "README.md");
    }
}
