use std::sync::Arc;

use reqwest::Client;

use crate::adapters::carrier::{CarrierClient, CarrierInboundAdapter};
use crate::adapters::inbox::InboxInboundAdapter;
use crate::config::BridgeConfig;
use crate::dispatch::OutboundDispatcher;

/// Per-process request context. Everything here is read-only; the HTTP
/// client is internally pooled and cheap to clone.
#[derive(Debug, Clone)]
pub struct BridgeState {
    pub(super) config: Arc<BridgeConfig>,
    pub(super) inbox_adapter: InboxInboundAdapter,
    pub(super) carrier_adapter: CarrierInboundAdapter,
    pub(super) carrier_client: CarrierClient,
    pub(super) dispatcher: OutboundDispatcher,
}

impl BridgeState {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: BridgeConfig, http: Client) -> Self {
        let carrier_adapter = CarrierInboundAdapter::new(config.carrier.destination_label.clone());
        let carrier_client = CarrierClient::new(http.clone(), &config.carrier);
        let dispatcher = OutboundDispatcher::new(http, &config.inbox);
        Self {
            config: Arc::new(config),
            inbox_adapter: InboxInboundAdapter::new(),
            carrier_adapter,
            carrier_client,
            dispatcher,
        }
    }
}
