//! Platform adapters.
//!
//! Each adapter implements [`crate::channel::InboundAdapter`] for the webhook
//! its platform emits, plus whatever client the other direction needs.

pub mod carrier;
pub mod inbox;

pub use carrier::{CarrierClient, CarrierIncomingPayload, CarrierInboundAdapter};
pub use inbox::{HandleEntry, InboxInboundAdapter, InboxOutgoingPayload};
