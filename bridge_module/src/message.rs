//! Platform-neutral message records passed between translators and the
//! outbound clients.

use serde::Serialize;

use crate::error::{BridgeError, BridgeResult};

pub const NOTIFICATION_PREVIEW_CHARS: usize = 100;

/// A message ready to be posted to the inbox. Only constructible through
/// [`CanonicalMessage::new`], which enforces the non-empty invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalMessage {
    external_id: String,
    body: String,
    from_handle: String,
    to_handle: Vec<String>,
    notification_preview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delivered_at: Option<i64>,
}

impl CanonicalMessage {
    pub fn new(
        external_id: impl Into<String>,
        body: impl Into<String>,
        from_handle: impl Into<String>,
        to_handle: Vec<String>,
    ) -> BridgeResult<Self> {
        let external_id = external_id.into();
        let body = body.into();
        let from_handle = from_handle.into();

        if external_id.trim().is_empty() {
            return Err(BridgeError::MissingRequiredField("external_id"));
        }
        if body.trim().is_empty() {
            return Err(BridgeError::MissingRequiredField("content"));
        }
        if from_handle.trim().is_empty() {
            return Err(BridgeError::MissingRequiredField("number"));
        }
        let to_handle: Vec<String> = to_handle
            .into_iter()
            .filter(|handle| !handle.trim().is_empty())
            .collect();
        if to_handle.is_empty() {
            return Err(BridgeError::MissingRequiredField("to_handle"));
        }

        let notification_preview = notification_preview(&body);
        Ok(Self {
            external_id,
            body,
            from_handle,
            to_handle,
            notification_preview,
            channel_id: None,
            delivered_at: None,
        })
    }

    pub fn with_channel_id(mut self, channel_id: Option<String>) -> Self {
        self.channel_id = channel_id.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn with_delivered_at(mut self, delivered_at: Option<i64>) -> Self {
        self.delivered_at = delivered_at;
        self
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn from_handle(&self) -> &str {
        &self.from_handle
    }

    pub fn to_handle(&self) -> &[String] {
        &self.to_handle
    }

    pub fn notification_preview(&self) -> &str {
        &self.notification_preview
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    pub fn delivered_at(&self) -> Option<i64> {
        self.delivered_at
    }
}

/// Send request for the carrier's send-message endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendCommand {
    pub number: String,
    pub content: String,
}

/// First [`NOTIFICATION_PREVIEW_CHARS`] characters of `body`, cut on a char
/// boundary so the result is always a prefix.
pub fn notification_preview(body: &str) -> String {
    match body.char_indices().nth(NOTIFICATION_PREVIEW_CHARS) {
        Some((cut, _)) => body[..cut].to_string(),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_preview_is_whole_body() {
        assert_eq!(notification_preview("hello"), "hello");
    }

    #[test]
    fn long_body_preview_is_truncated_prefix() {
        let body = "x".repeat(250);
        let preview = notification_preview(&body);
        assert_eq!(preview.chars().count(), 100);
        assert!(body.starts_with(&preview));
    }

    #[test]
    fn preview_boundary_at_one_hundred_chars() {
        let exact = "y".repeat(100);
        assert_eq!(notification_preview(&exact), exact);

        let over = format!("{}z", "y".repeat(100));
        assert_eq!(notification_preview(&over), "y".repeat(100));

        let multibyte = "é".repeat(101);
        assert_eq!(notification_preview(&multibyte), "é".repeat(100));
    }

    #[test]
    fn preview_never_splits_multibyte_chars() {
        let body = "é🙂".repeat(80);
        let preview = notification_preview(&body);
        assert_eq!(preview.chars().count(), 100);
        assert!(body.starts_with(&preview));
    }

    #[test]
    fn constructor_rejects_empty_required_fields() {
        let to = vec!["Sendblue".to_string()];
        assert!(matches!(
            CanonicalMessage::new("", "hi", "+1555", to.clone()),
            Err(BridgeError::MissingRequiredField("external_id"))
        ));
        assert!(matches!(
            CanonicalMessage::new("id", "  ", "+1555", to.clone()),
            Err(BridgeError::MissingRequiredField("content"))
        ));
        assert!(matches!(
            CanonicalMessage::new("id", "hi", "", to),
            Err(BridgeError::MissingRequiredField("number"))
        ));
        assert!(matches!(
            CanonicalMessage::new("id", "hi", "+1555", vec![" ".to_string()]),
            Err(BridgeError::MissingRequiredField("to_handle"))
        ));
    }

    #[test]
    fn serializes_without_absent_optionals() {
        let message =
            CanonicalMessage::new("h1", "hello", "+15551234567", vec!["Sendblue".into()]).unwrap();
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["external_id"], "h1");
        assert_eq!(value["notification_preview"], "hello");
        assert!(value.get("channel_id").is_none());
        assert!(value.get("delivered_at").is_none());

        let scoped = message.with_channel_id(Some("chan-1".into()));
        assert_eq!(serde_json::to_value(&scoped).unwrap()["channel_id"], "chan-1");
    }
}
