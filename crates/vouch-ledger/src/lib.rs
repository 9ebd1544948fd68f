//! Vouch Ledger - community trust tracking core
//!
//! Members vouch for one another, accrue counts and day streaks, and cross a
//! fixed threshold to receive a "trusted" designation. This crate holds the
//! parts of that system that do not care how the chat platform works.
//!
//! # Architecture
//!
//! - **Models**: `VouchRecord`, `Ledger`, `BotConfig`, platform identifiers
//! - **Engine**: pure transitions over a `Ledger` (record, adjust, reset, stats)
//! - **Store**: JSON snapshot files with fail-soft loads and atomic saves
//!
//! Time is never read from the wall clock here; every operation takes `today`.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use vouch_ledger::{Ledger, UserId};
//!
//! let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut ledger = Ledger::default();
//! let outcome = ledger.record_vouch(UserId(1), UserId(2), today).unwrap();
//! assert_eq!(outcome.total, 1);
//! assert_eq!(outcome.streak, 1);
//! assert!(!outcome.is_trusted());
//! ```

pub mod engine;
pub mod error;
pub mod models;
pub mod store;

pub use engine::{
    is_trusted, next_streak, scan_pings, LedgerStatus, PingTally, VouchOutcome,
    DEFAULT_LEADERBOARD_LIMIT, PING_SCAN_LIMIT, TRUSTED_THRESHOLD,
};
pub use error::{Error, Result};
pub use models::{
    BotConfig, ChannelId, ChatMessage, InboundMessage, KeywordSet, Ledger, Participant, RoleId,
    UserId, VouchRecord,
};
pub use store::{ConfigStore, LedgerStore, LoadOutcome, Snapshot, SnapshotStore};
