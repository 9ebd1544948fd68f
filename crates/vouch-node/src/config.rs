//! Node configuration from the environment.

use crate::error::{Error, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use vouch_ledger::KeywordSet;

/// Configuration for a vouch node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory holding the ledger and bot config snapshots
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Admin socket path (for vouch-admin and platform adapters)
    pub admin_socket: PathBuf,

    /// Words that mark a listener-channel message as a vouch
    pub keywords: KeywordSet,
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir =
            PathBuf::from(lookup("VOUCH_DATA_DIR").unwrap_or_else(|| "./vouch-data".to_string()));

        let api_addr = lookup("VOUCH_API_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("VOUCH_API_ADDR: {}", e)))?;

        let admin_socket = lookup("VOUCH_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        let keywords = match lookup("VOUCH_KEYWORDS") {
            Some(list) => {
                let keywords = KeywordSet::new(list.split(','));
                if keywords.words().is_empty() {
                    return Err(Error::InvalidConfig("VOUCH_KEYWORDS is empty".into()));
                }
                keywords
            }
            None => KeywordSet::default(),
        };

        Ok(Self {
            data_dir,
            api_addr,
            admin_socket,
            keywords,
        })
    }
}
