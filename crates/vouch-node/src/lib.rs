//! Vouch Node - community trust tracking service
//!
//! Runs the vouch ledger behind a single serialized writer and exposes the
//! bot's command surface to a chat-platform adapter.
//!
//! # Architecture
//!
//! - **Service**: serialized load-mutate-save cycles over the ledger snapshot
//! - **Commands**: one dispatcher method per bot command
//! - **Listener**: vouches detected in the configured channel's messages
//! - **Collaborators**: role sync, vouch log and acknowledgements, emitted as
//!   platform events for the adapter to carry out
//! - **Admin Socket**: line-delimited JSON over a Unix socket (vouch-admin CLI)
//! - **API**: read-only HTTP endpoints
//!
//! # Example
//!
//! ```no_run
//! use vouch_node::{NodeConfig, VouchNode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = VouchNode::new(config)?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod error;
pub mod listener;
pub mod node;
pub mod service;

pub use collaborators::{
    Clock, Collaborators, EventBus, Notifier, PlatformEvent, RoleSync, SystemClock, VouchLog,
    VouchLogEntry,
};
pub use commands::{Dispatcher, Proof, VouchReceipt};
pub use config::NodeConfig;
pub use error::{Error, Result};
pub use listener::scan_stream;
pub use node::VouchNode;
pub use service::LedgerService;
