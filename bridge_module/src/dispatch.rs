//! Delivery of canonical messages into the inbox posts API.
//!
//! The posts endpoint exists in two shapes. The channel-scoped shape takes a
//! list of posts under `/channels/{id}/posts`; the global shape takes a map
//! of posts keyed by external id under `/posts`, each post carrying its own
//! `channel_id`. Delivery starts channel-scoped and moves to the global shape
//! only when the first call comes back 404.

use std::collections::BTreeMap;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::config::InboxConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::idempotency::synthesize_key;
use crate::message::CanonicalMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostShape {
    ChannelScoped,
    Global,
}

impl PostShape {
    /// The only transition: a channel-scoped 404 moves to the global shape.
    fn next(self, status: StatusCode) -> Option<PostShape> {
        match (self, status) {
            (PostShape::ChannelScoped, StatusCode::NOT_FOUND) => Some(PostShape::Global),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboundDispatcher {
    http: Client,
    base_url: String,
    api_token: Option<String>,
    default_channel_id: Option<String>,
}

impl OutboundDispatcher {
    pub fn new(http: Client, config: &InboxConfig) -> Self {
        Self {
            http,
            base_url: config.api_base_url.clone(),
            api_token: config.api_token.clone(),
            default_channel_id: config.default_channel_id.clone(),
        }
    }

    /// Posts `message` to the inbox. Makes one call, or two when the
    /// channel-scoped endpoint does not exist.
    pub async fn dispatch(&self, message: &CanonicalMessage) -> BridgeResult<Value> {
        let token = self
            .api_token
            .as_deref()
            .ok_or(BridgeError::MissingCredential("MISSIVE_API_TOKEN"))?;
        let channel_id = message
            .channel_id()
            .map(str::to_string)
            .or_else(|| self.default_channel_id.clone())
            .ok_or(BridgeError::MissingCredential("MISSIVE_CHANNEL_ID"))?;
        let message = message.clone().with_channel_id(Some(channel_id.clone()));

        let mut shape = PostShape::ChannelScoped;
        loop {
            let (url, payload) = match shape {
                PostShape::ChannelScoped => (
                    format!("{}/channels/{}/posts", self.base_url, channel_id),
                    channel_scoped_body(&message),
                ),
                PostShape::Global => (format!("{}/posts", self.base_url), global_body(&message)),
            };

            let response = self
                .http
                .post(&url)
                .bearer_auth(token)
                .json(&payload)
                .send()
                .await?;
            let status = response.status();
            let body = response.text().await?;

            if status.is_success() {
                info!(
                    "inbox accepted post external_id={} shape={:?} status={}",
                    message.external_id(),
                    shape,
                    status
                );
                return Ok(parse_acknowledgement(&body));
            }

            match shape.next(status) {
                Some(next) => {
                    warn!(
                        "inbox channel endpoint not found for channel={}, retrying with {:?} shape",
                        channel_id, next
                    );
                    shape = next;
                }
                None => {
                    error!("inbox API error: {} - {}", status, body);
                    return Err(BridgeError::Delivery {
                        target: "inbox",
                        status: Some(status.as_u16()),
                        detail: body,
                    });
                }
            }
        }
    }
}

fn channel_scoped_body(message: &CanonicalMessage) -> Value {
    json!({ "posts": [message] })
}

fn global_body(message: &CanonicalMessage) -> Value {
    let key = if message.external_id().trim().is_empty() {
        synthesize_key()
    } else {
        message.external_id().to_string()
    };
    let mut posts = BTreeMap::new();
    posts.insert(key, message);
    json!({ "posts": posts })
}

/// A 2xx body as JSON. An empty body becomes a synthetic acknowledgement.
pub(crate) fn parse_acknowledgement(body: &str) -> Value {
    if body.trim().is_empty() {
        return json!({"status": "success"});
    }
    serde_json::from_str(body).unwrap_or_else(|_| json!({"status": "success", "body": body}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn message() -> CanonicalMessage {
        CanonicalMessage::new("h1", "hello", "+15551234567", vec!["Sendblue".into()])
            .unwrap()
            .with_channel_id(Some("chan-1".into()))
    }

    #[test]
    fn only_channel_scoped_not_found_transitions() {
        assert_eq!(
            PostShape::ChannelScoped.next(StatusCode::NOT_FOUND),
            Some(PostShape::Global)
        );
        assert_eq!(PostShape::ChannelScoped.next(StatusCode::BAD_REQUEST), None);
        assert_eq!(PostShape::ChannelScoped.next(StatusCode::INTERNAL_SERVER_ERROR), None);
        assert_eq!(PostShape::Global.next(StatusCode::NOT_FOUND), None);
    }

    #[test]
    fn channel_scoped_body_is_a_list() {
        let body = channel_scoped_body(&message());
        let posts = body["posts"].as_array().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0]["external_id"], "h1");
    }

    #[test]
    fn global_body_is_keyed_by_external_id() {
        let body = global_body(&message());
        assert_eq!(body["posts"]["h1"]["channel_id"], "chan-1");
        assert_eq!(body["posts"]["h1"]["body"], "hello");
    }

    #[test]
    fn acknowledgement_handles_empty_and_text_bodies() {
        assert_eq!(parse_acknowledgement(""), json!({"status": "success"}));
        assert_eq!(parse_acknowledgement(r#"{"id":"p1"}"#), json!({"id": "p1"}));
        assert_eq!(
            parse_acknowledgement("created"),
            json!({"status": "success", "body": "created"})
        );
    }

    #[tokio::test]
    async fn truncated_success_body_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"id\"")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let config = InboxConfig {
            api_base_url: format!("http://{}", addr),
            api_token: Some("token".into()),
            webhook_secret: None,
            default_channel_id: Some("chan-1".into()),
        };
        let dispatcher = OutboundDispatcher::new(Client::new(), &config);
        let result = dispatcher.dispatch(&message()).await;
        assert!(matches!(result, Err(BridgeError::Http(_))));
    }
}
