//! Vouch Node binary
//!
//! Tracks vouches, streaks and the trusted designation for a chat community.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vouch_node::{NodeConfig, VouchNode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vouch_node=info,vouch_ledger=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Vouch Node");

    let config = NodeConfig::from_env()?;

    let node = VouchNode::new(config)?;
    node.run().await?;

    Ok(())
}
