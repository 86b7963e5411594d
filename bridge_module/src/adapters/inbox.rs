//! Inbox (Missive) outgoing-message webhooks.
//!
//! `InboxInboundAdapter` turns a "message sent" event from the inbox into a
//! carrier send command. Posting into the inbox lives in [`crate::dispatch`].

use serde::Deserialize;
use tracing::debug;

use crate::channel::{Channel, IgnoreReason, InboundAdapter, Translation};
use crate::error::{BridgeError, BridgeResult};
use crate::message::SendCommand;
use crate::resolve::resolve_recipient_phone;

/// Event types that represent a human sending a reply from the inbox. Both
/// spellings occur in the wild.
const SEND_EVENT_TYPES: [&str; 4] = ["message_sent", "message-sent", "draft_sent", "draft-sent"];

#[derive(Debug, Clone, Default)]
pub struct InboxInboundAdapter;

impl InboxInboundAdapter {
    pub fn new() -> Self {
        Self
    }

    pub fn is_send_event(event_type: &str) -> bool {
        SEND_EVENT_TYPES.contains(&event_type.trim())
    }

    pub fn translate(&self, payload: &InboxOutgoingPayload) -> BridgeResult<Translation<SendCommand>> {
        if !Self::is_send_event(&payload.event_type) {
            return Ok(Translation::Ignored(IgnoreReason::UnsupportedEventType(
                payload.event_type.clone(),
            )));
        }

        let message = &payload.message;
        let to_handles: Vec<&str> = message
            .to_handle
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(HandleEntry::text)
            .collect();
        let recipient_username = message
            .recipient
            .as_ref()
            .and_then(|recipient| recipient.username.as_deref());

        let number = resolve_recipient_phone(recipient_username, &to_handles)?;
        if message.body.trim().is_empty() {
            return Err(BridgeError::MissingRequiredField("body"));
        }
        debug!(
            "inbox message {} recipient resolved from {}",
            message.id, number.source
        );

        Ok(Translation::Forward(SendCommand {
            number: number.value,
            content: message.body.clone(),
        }))
    }
}

impl InboundAdapter for InboxInboundAdapter {
    type Output = SendCommand;

    fn parse(&self, raw_payload: &[u8]) -> BridgeResult<Translation<SendCommand>> {
        let payload: InboxOutgoingPayload = serde_json::from_slice(raw_payload)
            .map_err(|err| BridgeError::Validation(err.to_string()))?;
        self.translate(&payload)
    }

    fn channel(&self) -> Channel {
        Channel::Inbox
    }
}

// ============================================================================
// Inbox webhook types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct InboxOutgoingPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message: InboxMessage,
    pub channel: Option<InboxChannel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    /// Reply text, forwarded verbatim.
    pub body: String,
    pub to_handle: Option<Vec<HandleEntry>>,
    pub recipient: Option<InboxRecipient>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxRecipient {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboxChannel {
    pub id: String,
}

/// A destination handle; older payloads send plain strings, newer ones
/// send contact objects.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HandleEntry {
    Text(String),
    Contact {
        address: Option<String>,
        username: Option<String>,
        id: Option<String>,
    },
}

impl HandleEntry {
    pub fn text(&self) -> Option<&str> {
        match self {
            HandleEntry::Text(value) => Some(value.as_str()),
            HandleEntry::Contact {
                address,
                username,
                id,
            } => address
                .as_deref()
                .or(username.as_deref())
                .or(id.as_deref()),
        }
    }
}
