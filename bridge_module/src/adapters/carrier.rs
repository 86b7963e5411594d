//! Carrier (Sendblue) adapter for inbound and outbound text messages.
//!
//! - `CarrierInboundAdapter`: turns an incoming-message webhook into a
//!   [`CanonicalMessage`] for the inbox
//! - `CarrierClient`: sends a [`SendCommand`] through the carrier REST API

use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::channel::{Channel, IgnoreReason, InboundAdapter, Translation};
use crate::config::CarrierConfig;
use crate::dispatch::parse_acknowledgement;
use crate::error::{BridgeError, BridgeResult};
use crate::idempotency::derive_external_id;
use crate::message::{CanonicalMessage, SendCommand};
use crate::resolve::{resolve_content, resolve_destination, resolve_sender_phone};

/// Adapter for parsing carrier incoming-message webhooks.
#[derive(Debug, Clone)]
pub struct CarrierInboundAdapter {
    destination_label: String,
}

impl CarrierInboundAdapter {
    pub fn new(destination_label: impl Into<String>) -> Self {
        Self {
            destination_label: destination_label.into(),
        }
    }

    pub fn translate(
        &self,
        payload: &CarrierIncomingPayload,
    ) -> BridgeResult<Translation<CanonicalMessage>> {
        // The carrier reflects our own sends back; re-ingesting them would loop.
        if payload.is_outbound {
            return Ok(Translation::Ignored(IgnoreReason::OutboundEcho));
        }

        let Some(content) = resolve_content(payload.content.as_deref(), payload.body.as_deref())
        else {
            return Ok(Translation::Ignored(IgnoreReason::EmptyContent));
        };

        let sender = resolve_sender_phone(payload.number.as_deref(), payload.from_number.as_deref())?;
        let destination =
            resolve_destination(payload.sendblue_number.as_deref(), &self.destination_label);
        let external_id = derive_external_id(
            payload.message_handle.as_deref(),
            payload.date_sent.as_deref(),
        );
        debug!(
            "carrier message {} resolved content from {} sender from {} destination from {}",
            external_id, content.source, sender.source, destination.source
        );

        let message = CanonicalMessage::new(
            external_id,
            content.value,
            sender.value,
            vec![destination.value],
        )?
        .with_delivered_at(payload.date_sent.as_deref().and_then(parse_delivered_at));

        Ok(Translation::Forward(message))
    }
}

impl InboundAdapter for CarrierInboundAdapter {
    type Output = CanonicalMessage;

    fn parse(&self, raw_payload: &[u8]) -> BridgeResult<Translation<CanonicalMessage>> {
        let payload: CarrierIncomingPayload = serde_json::from_slice(raw_payload)
            .map_err(|err| BridgeError::Validation(err.to_string()))?;
        self.translate(&payload)
    }

    fn channel(&self) -> Channel {
        Channel::Carrier
    }
}

/// Client for the carrier send-message endpoint.
#[derive(Debug, Clone)]
pub struct CarrierClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    api_secret: Option<String>,
}

impl CarrierClient {
    pub fn new(http: Client, config: &CarrierConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    pub async fn send_message(&self, command: &SendCommand) -> BridgeResult<Value> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(BridgeError::MissingCredential("SENDBLUE_API_KEY"))?;
        let api_secret = self
            .api_secret
            .as_deref()
            .ok_or(BridgeError::MissingCredential("SENDBLUE_API_SECRET"))?;

        let url = format!("{}/send-message", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("sb-api-key", api_key)
            .header("sb-api-secret", api_secret)
            .json(command)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!("carrier API error: {} - {}", status, body);
            return Err(BridgeError::Delivery {
                target: "carrier",
                status: Some(status.as_u16()),
                detail: body,
            });
        }
        Ok(parse_acknowledgement(&body))
    }
}

// ============================================================================
// Carrier webhook types
// ============================================================================

/// Incoming-message webhook. Field names vary between event kinds, so
/// everything is optional and resolved in order by [`crate::resolve`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CarrierIncomingPayload {
    pub number: Option<String>,
    pub from_number: Option<String>,
    pub sendblue_number: Option<String>,
    pub content: Option<String>,
    pub body: Option<String>,
    pub status: Option<String>,
    pub message_handle: Option<String>,
    pub date_sent: Option<String>,
    #[serde(default)]
    pub is_outbound: bool,
}

fn parse_delivered_at(date_sent: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(date_sent.trim())
        .ok()
        .map(|value| value.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> CarrierInboundAdapter {
        CarrierInboundAdapter::new("Sendblue")
    }

    #[test]
    fn parse_received_message() {
        let payload = r#"{
            "number": "+15551234567",
            "content": "hello",
            "status": "RECEIVED",
            "is_outbound": false,
            "message_handle": "h1",
            "date_sent": "2024-01-01T00:00:00Z"
        }"#;

        let Translation::Forward(message) = adapter().parse(payload.as_bytes()).unwrap() else {
            panic!("expected forward");
        };
        assert_eq!(message.external_id(), "h1");
        assert_eq!(message.body(), "hello");
        assert_eq!(message.from_handle(), "+15551234567");
        assert_eq!(message.to_handle(), ["Sendblue".to_string()]);
        assert_eq!(message.notification_preview(), "hello");
        assert_eq!(message.delivered_at(), Some(1_704_067_200));
        assert!(message.channel_id().is_none());
    }

    #[test]
    fn alternate_field_names_resolve() {
        let payload = r#"{
            "from_number": "+15550001111",
            "sendblue_number": "+15552223333",
            "body": "via body field",
            "date_sent": "not-a-date"
        }"#;

        let Translation::Forward(message) = adapter().parse(payload.as_bytes()).unwrap() else {
            panic!("expected forward");
        };
        assert_eq!(message.from_handle(), "+15550001111");
        assert_eq!(message.to_handle(), ["+15552223333".to_string()]);
        assert_eq!(message.body(), "via body field");
        assert_eq!(message.external_id(), "sb_not-a-date");
        assert_eq!(message.delivered_at(), None);
    }

    #[test]
    fn outbound_echo_is_ignored() {
        let payload = r#"{"number": "+15551234567", "content": "echo", "is_outbound": true}"#;
        assert_eq!(
            adapter().parse(payload.as_bytes()).unwrap(),
            Translation::Ignored(IgnoreReason::OutboundEcho)
        );
    }

    #[test]
    fn empty_content_is_ignored_not_error() {
        let payload = r#"{"number": "+15551234567", "content": "   ", "status": "DELIVERED"}"#;
        assert_eq!(
            adapter().parse(payload.as_bytes()).unwrap(),
            Translation::Ignored(IgnoreReason::EmptyContent)
        );
    }

    #[test]
    fn missing_sender_is_missing_field() {
        let payload = r#"{"content": "who am i"}"#;
        assert!(matches!(
            adapter().parse(payload.as_bytes()),
            Err(BridgeError::MissingRequiredField("number"))
        ));
    }

    #[test]
    fn non_object_body_is_validation_error() {
        assert!(matches!(
            adapter().parse(b"[1, 2, 3]"),
            Err(BridgeError::Validation(_))
        ));
        assert!(matches!(
            adapter().parse(br#"{"is_outbound": "yes"}"#),
            Err(BridgeError::Validation(_))
        ));
    }

    #[test]
    fn long_content_gets_truncated_preview() {
        let content = "a".repeat(150);
        let payload = CarrierIncomingPayload {
            number: Some("+15551234567".into()),
            content: Some(content.clone()),
            message_handle: Some("h-long".into()),
            ..Default::default()
        };
        let Translation::Forward(message) = adapter().translate(&payload).unwrap() else {
            panic!("expected forward");
        };
        assert_eq!(message.notification_preview().chars().count(), 100);
        assert!(content.starts_with(message.notification_preview()));
    }

    #[test]
    fn content_whitespace_is_preserved() {
        let content = "  line one\n  indented\n";
        let payload = CarrierIncomingPayload {
            number: Some("+15551234567".into()),
            content: Some(content.into()),
            message_handle: Some("h-ws".into()),
            ..Default::default()
        };
        let Translation::Forward(message) = adapter().translate(&payload).unwrap() else {
            panic!("expected forward");
        };
        assert_eq!(message.body(), content);
        assert_eq!(message.notification_preview(), content);
    }
}
