use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::BridgeConfig;

use super::handlers::{carrier_incoming, health, inbox_outgoing};
use super::state::BridgeState;
use super::BoxError;

pub fn build_router(state: Arc<BridgeState>) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/inbox/outgoing", post(inbox_outgoing))
        .route("/missive/outgoing", post(inbox_outgoing))
        .route("/carrier/incoming", post(carrier_incoming))
        .route("/sendblue/incoming", post(carrier_incoming))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(
    config: BridgeConfig,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), BoxError> {
    let host: IpAddr = config
        .server
        .host
        .parse()
        .map_err(|_| format!("invalid host: {}", config.server.host))?;
    let addr = SocketAddr::new(host, config.server.port);

    info!(
        "bridge config inbox_base={} carrier_base={} default_channel={} inbox_signature_check={} carrier_secret_check={}",
        config.inbox.api_base_url,
        config.carrier.api_base_url,
        config.inbox.default_channel_id.as_deref().unwrap_or("<unset>"),
        config.inbox.webhook_secret.is_some(),
        config.carrier.signing_secret.is_some()
    );

    let app = build_router(Arc::new(BridgeState::new(config)));

    info!("bridge gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
