//! The JSON envelope every control-plane message travels in.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One control-plane message.
///
/// `id` is present only on window-originated requests that expect a
/// `response`; notifications and pushes leave it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpcMessage {
    /// The message type / command name.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default)]
    pub payload: Value,
}

impl IpcMessage {
    /// Parse a message from a raw JSON string (from JS `postMessage`).
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn notification(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            id: None,
            payload,
        }
    }

    pub fn request(kind: impl Into<String>, id: u64, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            id: Some(id),
            payload,
        }
    }

    /// Successful answer to the request with the given id.
    pub fn response_ok(id: u64, result: Value) -> Self {
        Self::notification("response", json!({ "id": id, "result": result }))
    }

    /// Failed answer to the request with the given id.
    pub fn response_err(id: u64, error: impl Into<String>) -> Self {
        Self::notification("response", json!({ "id": id, "error": error.into() }))
    }

    pub fn is_request(&self) -> bool {
        self.id.is_some()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notification_without_id_or_payload() {
        let msg = IpcMessage::from_json(r#"{"kind":"minimize"}"#).unwrap();
        assert_eq!(msg.kind, "minimize");
        assert!(!msg.is_request());
        assert_eq!(msg.payload, Value::Null);
    }

    #[test]
    fn parses_request_with_id() {
        let msg = IpcMessage::from_json(r#"{"kind":"is-maximized","id":12}"#).unwrap();
        assert_eq!(msg.id, Some(12));
        assert!(msg.is_request());
    }

    #[test]
    fn rejects_garbage() {
        assert!(IpcMessage::from_json("not json").is_none());
        assert!(IpcMessage::from_json(r#"{"payload":1}"#).is_none());
    }

    #[test]
    fn response_shapes() {
        let ok = IpcMessage::response_ok(3, json!(true));
        assert_eq!(ok.kind, "response");
        assert_eq!(ok.payload, json!({"id": 3, "result": true}));

        let err = IpcMessage::response_err(4, "nope");
        assert_eq!(err.payload, json!({"id": 4, "error": "nope"}));
    }

    #[test]
    fn notification_omits_id_when_serialized() {
        let json = IpcMessage::notification("clear-menu", Value::Null).to_json();
        assert!(!json.contains("\"id\""));
    }
}
