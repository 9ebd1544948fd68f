//! Data models for the vouch ledger.

mod config;
mod ids;
mod ledger;
mod message;
mod record;

pub use config::BotConfig;
pub use ids::{ChannelId, RoleId, UserId};
pub use ledger::Ledger;
pub use message::{ChatMessage, InboundMessage, KeywordSet, Participant};
pub use record::VouchRecord;
