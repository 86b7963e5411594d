use std::fmt;

use crate::error::BridgeResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Inbox,
    Carrier,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Inbox => write!(f, "inbox"),
            Channel::Carrier => write!(f, "carrier"),
        }
    }
}

/// Why an event was acknowledged without forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    UnsupportedEventType(String),
    OutboundEcho,
    EmptyContent,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::UnsupportedEventType(_) => "unsupported event type",
            IgnoreReason::OutboundEcho => "outbound echo",
            IgnoreReason::EmptyContent => "empty content",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreReason::UnsupportedEventType(event_type) => {
                write!(f, "unsupported event type: {}", event_type)
            }
            other => f.write_str(other.as_str()),
        }
    }
}

/// Result of translating a webhook event that passed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation<T> {
    Forward(T),
    Ignored(IgnoreReason),
}

/// Turns a raw webhook body from one platform into the request for the other.
pub trait InboundAdapter {
    type Output;

    fn parse(&self, raw_payload: &[u8]) -> BridgeResult<Translation<Self::Output>>;

    fn channel(&self) -> Channel;
}
