pub mod adapters;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod idempotency;
pub mod message;
pub mod resolve;
pub mod service;
pub mod verify;

pub use channel::{Channel, IgnoreReason, InboundAdapter, Translation};
pub use config::BridgeConfig;
pub use dispatch::{OutboundDispatcher, PostShape};
pub use error::{BridgeError, BridgeResult, ConfigError};
pub use message::{CanonicalMessage, SendCommand};
