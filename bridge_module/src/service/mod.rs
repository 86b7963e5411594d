mod handlers;
mod server;
mod state;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use server::{build_router, run_server};
pub use state::BridgeState;
