//! Vouch Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process owning the ledger and config snapshots
//! - Unix admin socket for commands, listener messages and adapter events
//! - Read-only HTTP API for dashboards

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::collaborators::{Collaborators, EventBus};
use crate::commands::Dispatcher;
use crate::config::NodeConfig;
use crate::error::Result;
use crate::service::LedgerService;
use std::sync::Arc;

/// A vouch node instance.
pub struct VouchNode {
    dispatcher: Arc<Dispatcher>,
    bus: EventBus,
    config: NodeConfig,
}

impl VouchNode {
    /// Create a new vouch node.
    pub fn new(config: NodeConfig) -> Result<Self> {
        let service = Arc::new(LedgerService::open(&config.data_dir)?);
        let bus = EventBus::default();
        let dispatcher = Arc::new(Dispatcher::new(
            service,
            Collaborators::from_bus(bus.clone()),
            config.keywords.clone(),
        ));

        Ok(Self {
            dispatcher,
            bus,
            config,
        })
    }

    /// Command dispatcher shared by the socket and the API.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// Run the node (starts admin socket and HTTP server).
    pub async fn run(self) -> Result<()> {
        tracing::info!("Vouch node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);
        tracing::info!("  Keywords: {:?}", self.config.keywords.words());

        let admin_socket = AdminSocket::new(
            self.dispatcher(),
            self.config
                .admin_socket
                .to_str()
                .unwrap_or("./vouch-data/admin.sock"),
        )
        .with_event_bus(self.bus.clone());
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        let app = api::build_router(self.dispatcher());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
