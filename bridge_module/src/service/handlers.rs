use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::channel::{Channel, IgnoreReason, InboundAdapter, Translation};
use crate::error::{BridgeError, BridgeResult};
use crate::verify::{verify_carrier_secret, verify_inbox_signature};

use super::state::BridgeState;

pub(super) async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// A reply written in the inbox, sent out as a text message.
pub(super) async fn inbox_outgoing(
    State(state): State<Arc<BridgeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> BridgeResult<Json<Value>> {
    verify_inbox_signature(
        state.config.inbox.webhook_secret.as_deref(),
        &headers,
        &body,
    )
    .inspect_err(|err| warn!("inbox webhook rejected: {}", err))?;

    let translation = state
        .inbox_adapter
        .parse(&body)
        .inspect_err(|err| log_rejected_payload(state.inbox_adapter.channel(), err, &body))?;
    let command = match translation {
        Translation::Forward(command) => command,
        Translation::Ignored(reason) => {
            warn!("ignoring inbox event: {}", reason);
            return Ok(ignored(&reason));
        }
    };

    info!("sending inbox reply to carrier number={}", command.number);
    let response = state.carrier_client.send_message(&command).await?;
    let handle = response
        .get("message_handle")
        .and_then(|value| value.as_str())
        .unwrap_or("unknown");
    info!("carrier accepted message handle={}", handle);
    Ok(Json(json!({"status": "success", "carrier_response": response})))
}

/// A text message received by the carrier, posted into the inbox.
pub(super) async fn carrier_incoming(
    State(state): State<Arc<BridgeState>>,
    headers: HeaderMap,
    body: Bytes,
) -> BridgeResult<Json<Value>> {
    verify_carrier_secret(state.config.carrier.signing_secret.as_deref(), &headers)
        .inspect_err(|err| warn!("carrier webhook rejected: {}", err))?;

    let translation = state
        .carrier_adapter
        .parse(&body)
        .inspect_err(|err| log_rejected_payload(state.carrier_adapter.channel(), err, &body))?;
    let message = match translation {
        Translation::Forward(message) => message,
        Translation::Ignored(reason) => {
            info!("ignoring carrier event: {}", reason);
            return Ok(ignored(&reason));
        }
    };

    info!(
        "posting carrier message to inbox external_id={} from={}",
        message.external_id(),
        message.from_handle()
    );
    let response = state.dispatcher.dispatch(&message).await?;
    Ok(Json(json!({"status": "success", "inbox_response": response})))
}

fn ignored(reason: &IgnoreReason) -> Json<Value> {
    let mut body = json!({"status": "ignored", "reason": reason.as_str()});
    if let IgnoreReason::UnsupportedEventType(event_type) = reason {
        body["event_type"] = json!(event_type);
    }
    Json(body)
}

fn log_rejected_payload(channel: Channel, err: &BridgeError, body: &[u8]) {
    match err {
        BridgeError::Validation(detail) => warn!(
            "{} payload failed validation: {} body={}",
            channel,
            detail,
            String::from_utf8_lossy(body)
        ),
        other => warn!("{} payload rejected: {}", channel, other),
    }
}
