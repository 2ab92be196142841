//! Shared DAP envelope shapes. Mirrors the wire format: requests carry
//! `seq`/`type`/`command`/`arguments`; responses add `request_seq`/
//! `success`/`message`/`body`; events carry `event`/`body`.

use serde_json::Value;

#[derive(Debug, Clone)]
pub struct ParsedMessage {
    pub seq: i64,
    pub kind: MessageKind,
}

#[derive(Debug, Clone)]
pub enum MessageKind {
    Response {
        request_seq: i64,
        success: bool,
        command: String,
        message: Option<String>,
        body: Value,
    },
    Event {
        event: String,
        body: Value,
    },
    Request {
        command: String,
        arguments: Value,
    },
}

/// Parse a raw JSON message body into its envelope shape.
pub fn parse(raw: &str) -> crate::error::Result<ParsedMessage> {
    let value: Value = serde_json::from_str(raw)?;
    let seq = value.get("seq").and_then(Value::as_i64).unwrap_or(0);
    let kind = match value.get("type").and_then(Value::as_str) {
        Some("response") => MessageKind::Response {
            request_seq: value
                .get("request_seq")
                .and_then(Value::as_i64)
                .unwrap_or(-1),
            success: value
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            command: value
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            message: value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            body: value.get("body").cloned().unwrap_or(Value::Null),
        },
        Some("event") => MessageKind::Event {
            event: value
                .get("event")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            body: value.get("body").cloned().unwrap_or(Value::Null),
        },
        Some("request") => MessageKind::Request {
            command: value
                .get("command")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            arguments: value.get("arguments").cloned().unwrap_or(Value::Null),
        },
        other => {
            return Err(crate::error::Error::InvalidResponse(format!(
                "unknown message type: {other:?}"
            )))
        }
    };
    Ok(ParsedMessage { seq, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_response() {
        let raw = json!({
            "seq": 5, "type": "response", "request_seq": 2, "success": true,
            "command": "next", "body": {"ok": true}
        })
        .to_string();
        let parsed = parse(&raw).unwrap();
        assert_eq!(parsed.seq, 5);
        match parsed.kind {
            MessageKind::Response {
                request_seq,
                success,
                command,
                ..
            } => {
                assert_eq!(request_seq, 2);
                assert!(success);
                assert_eq!(command, "next");
            }
            _ => panic!("expected response"),
        }
    }

    #[test]
    fn parses_event() {
        let raw = json!({"seq": 1, "type": "event", "event": "stopped", "body": {"threadId": 1}})
            .to_string();
        let parsed = parse(&raw).unwrap();
        match parsed.kind {
            MessageKind::Event { event, .. } => assert_eq!(event, "stopped"),
            _ => panic!("expected event"),
        }
    }

    #[test]
    fn parses_reverse_request() {
        let raw = json!({"seq": 9, "type": "request", "command": "runInTerminal", "arguments": {}})
            .to_string();
        let parsed = parse(&raw).unwrap();
        match parsed.kind {
            MessageKind::Request { command, .. } => assert_eq!(command, "runInTerminal"),
            _ => panic!("expected request"),
        }
    }

    #[test]
    fn unknown_type_is_an_error() {
        let raw = json!({"seq": 1, "type": "weird"}).to_string();
        assert!(parse(&raw).is_err());
    }
}
