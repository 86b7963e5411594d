#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bridge_module::config::BridgeConfig;
use bridge_module::service::{build_router, BridgeState};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Config with every credential present and both APIs pointed at `base_url`.
pub fn config_for(base_url: &str) -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.inbox.api_base_url = base_url.to_string();
    config.inbox.api_token = Some("missive-test".to_string());
    config.inbox.default_channel_id = Some("chan-default".to_string());
    config.carrier.api_base_url = base_url.to_string();
    config.carrier.api_key = Some("sb-key".to_string());
    config.carrier.api_secret = Some("sb-secret".to_string());
    config
}

pub fn router(config: BridgeConfig) -> Router {
    build_router(Arc::new(BridgeState::new(config)))
}

pub async fn post_json(
    app: Router,
    path: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> Result<(StatusCode, Value), Box<dyn std::error::Error>> {
    let mut request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = app.oneshot(request.body(Body::from(body.to_string()))?).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}
