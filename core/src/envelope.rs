//! JSON response envelope shared by the server and the client.
//!
//! Every response carries `success`. Failures add a human-readable
//! `message` and an internal `error` detail string; list responses add
//! `count` next to `data`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            count: None,
            data: Some(data),
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl Envelope<()> {
    /// A successful response with a message and no payload.
    pub fn done(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            count: None,
            data: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            count: None,
            data: None,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_envelope_shape() {
        let json = serde_json::to_value(Envelope::ok(vec![1, 2]).with_count(2)).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "count": 2, "data": [1, 2]}));
    }

    #[test]
    fn failure_envelope_shape() {
        let env = Envelope::failure("Todo not found", None);
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "Todo not found"}));
    }

    #[test]
    fn missing_members_deserialize_as_none() {
        let env: Envelope<u32> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(env.success);
        assert!(env.data.is_none());
        assert!(env.count.is_none());
    }
}
