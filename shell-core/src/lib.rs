//! shell-core: Shared infrastructure for Factora dashboard-shell subsystems.
pub mod config;
pub mod error;
pub mod observability;

pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use validator;
