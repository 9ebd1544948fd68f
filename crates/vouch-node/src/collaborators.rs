//! Narrow interfaces to the chat platform.
//!
//! The node never talks to the platform directly. It asks these traits to
//! grant or revoke the trusted role, post vouch log entries and acknowledge
//! listener vouches. The daemon wires them to an [`EventBus`] that platform
//! adapters subscribe to over the admin socket.

use crate::error::{Error, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use vouch_ledger::{ChannelId, RoleId, UserId};

/// Source of the current UTC calendar day.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock UTC day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }
}

/// Grants or revokes the trusted role.
#[async_trait]
pub trait RoleSync: Send + Sync {
    /// Make `user` hold `role` iff `trusted`. Must be idempotent.
    async fn set_trusted(&self, user: UserId, role: RoleId, trusted: bool) -> Result<()>;
}

/// Posts vouch log entries.
#[async_trait]
pub trait VouchLog: Send + Sync {
    async fn publish(&self, channel: ChannelId, entry: &VouchLogEntry) -> Result<()>;
}

/// Sends short acknowledgements to a channel.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn acknowledge(&self, channel: ChannelId, text: &str) -> Result<()>;
}

/// A submitted vouch, as posted to the log channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchLogEntry {
    pub from: UserId,
    pub to: UserId,
    pub total: u64,
    pub streak: u32,
    pub proof_url: Option<String>,
}

impl VouchLogEntry {
    /// Plain-text rendering for platforms without rich embeds.
    pub fn render(&self) -> String {
        let mut text = format!(
            "Vouch Submitted\nFrom: {}\nTo: {}\nTotal Vouches: {}\nStreak: {} days",
            self.from.mention(),
            self.to.mention(),
            self.total,
            self.streak
        );
        if let Some(url) = &self.proof_url {
            text.push_str("\nProof: ");
            text.push_str(url);
        }
        text
    }
}

/// Everything the node asks of the platform.
#[derive(Clone)]
pub struct Collaborators {
    pub clock: Arc<dyn Clock>,
    pub roles: Arc<dyn RoleSync>,
    pub log: Arc<dyn VouchLog>,
    pub notifier: Arc<dyn Notifier>,
}

impl Collaborators {
    /// Route every platform side effect through one event bus.
    pub fn from_bus(bus: EventBus) -> Self {
        let bus = Arc::new(bus);
        Self {
            clock: Arc::new(SystemClock),
            roles: bus.clone(),
            log: bus.clone(),
            notifier: bus,
        }
    }
}

/// Side effect requested of the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlatformEvent {
    /// Grant (`trusted`) or revoke the role
    Role {
        user: UserId,
        role: RoleId,
        trusted: bool,
    },
    /// Post an entry to the log channel
    Log {
        channel: ChannelId,
        entry: VouchLogEntry,
    },
    /// Post a short acknowledgement
    Ack { channel: ChannelId, text: String },
}

/// Broadcasts platform events to every subscribed adapter.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.tx.subscribe()
    }

    fn emit(&self, event: PlatformEvent) -> Result<()> {
        tracing::info!(?event, "platform event");
        if self.tx.receiver_count() == 0 {
            tracing::debug!("No platform adapter subscribed; event dropped");
            return Ok(());
        }
        self.tx
            .send(event)
            .map(|_| ())
            .map_err(|e| Error::Collaborator(e.to_string()))
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl RoleSync for EventBus {
    async fn set_trusted(&self, user: UserId, role: RoleId, trusted: bool) -> Result<()> {
        self.emit(PlatformEvent::Role {
            user,
            role,
            trusted,
        })
    }
}

#[async_trait]
impl VouchLog for EventBus {
    async fn publish(&self, channel: ChannelId, entry: &VouchLogEntry) -> Result<()> {
        self.emit(PlatformEvent::Log {
            channel,
            entry: entry.clone(),
        })
    }
}

#[async_trait]
impl Notifier for EventBus {
    async fn acknowledge(&self, channel: ChannelId, text: &str) -> Result<()> {
        self.emit(PlatformEvent::Ack {
            channel,
            text: text.to_string(),
        })
    }
}

/// In-memory collaborators for tests.
#[cfg(test)]
pub(crate) mod fakes {
    use super::*;
    use std::sync::Mutex;

    /// A clock stuck on one day, movable by tests.
    pub struct FixedClock(Mutex<NaiveDate>);

    impl FixedClock {
        pub fn new(day: &str) -> Self {
            Self(Mutex::new(day.parse().unwrap()))
        }

        pub fn set(&self, day: &str) {
            *self.0.lock().unwrap() = day.parse().unwrap();
        }
    }

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            *self.0.lock().unwrap()
        }
    }

    /// Records every platform event; optionally fails role syncs.
    #[derive(Default)]
    pub struct Recorder {
        pub events: Mutex<Vec<PlatformEvent>>,
        pub fail_roles: bool,
    }

    impl Recorder {
        pub fn events(&self) -> Vec<PlatformEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RoleSync for Recorder {
        async fn set_trusted(&self, user: UserId, role: RoleId, trusted: bool) -> Result<()> {
            if self.fail_roles {
                return Err(Error::Collaborator("missing permissions".into()));
            }
            self.events.lock().unwrap().push(PlatformEvent::Role {
                user,
                role,
                trusted,
            });
            Ok(())
        }
    }

    #[async_trait]
    impl VouchLog for Recorder {
        async fn publish(&self, channel: ChannelId, entry: &VouchLogEntry) -> Result<()> {
            self.events.lock().unwrap().push(PlatformEvent::Log {
                channel,
                entry: entry.clone(),
            });
            Ok(())
        }
    }

    #[async_trait]
    impl Notifier for Recorder {
        async fn acknowledge(&self, channel: ChannelId, text: &str) -> Result<()> {
            self.events.lock().unwrap().push(PlatformEvent::Ack {
                channel,
                text: text.to_string(),
            });
            Ok(())
        }
    }

    /// Collaborators backed by one recorder and a fixed clock.
    pub fn recording(day: &str, recorder: Arc<Recorder>) -> (Collaborators, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(day));
        let collaborators = Collaborators {
            clock: clock.clone(),
            roles: recorder.clone(),
            log: recorder.clone(),
            notifier: recorder,
        };
        (collaborators, clock)
    }
}
