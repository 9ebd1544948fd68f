//! Unix socket server for bot commands and platform adapters.
//!
//! One JSON command per line in, one JSON response per line out. A platform
//! adapter forwards slash commands and listener-channel messages here, and
//! sends `subscribe` on a separate connection to receive the role, log and
//! acknowledgement events it must carry out.

use crate::collaborators::EventBus;
use crate::commands::{Dispatcher, Proof};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::broadcast;
use vouch_ledger::{ChannelId, InboundMessage, RoleId, UserId};

/// Command sent over the socket.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Submit a vouch with image proof
    Vouch {
        actor: UserId,
        target: UserId,
        proof_url: String,
        content_type: String,
    },
    /// Check a user's vouches
    Vouches { user: UserId },
    /// Today's top 10
    Top10Today,
    /// Add vouches
    VouchAdd { user: UserId, amount: u64 },
    /// Revoke vouches
    VouchRevoke { user: UserId, amount: u64 },
    /// Reset a user's vouch data
    VouchReset { user: UserId },
    /// Set the trusted role
    SetTrustedRole { role: RoleId },
    /// Set the vouch log channel
    SetVouchLogChannel { channel: ChannelId },
    /// Set the listener channel
    SetVouchChannel { channel: ChannelId },
    /// Ping (latency check)
    Ping,
    /// Ledger-wide statistics
    VouchStatus,
    /// Count vouch-like mentions in a channel history
    PingCheck { messages: Vec<InboundMessage> },
    /// A message posted in a channel the bot can see
    Message { message: InboundMessage },
    /// Stream platform events on this connection
    Subscribe,
}

/// One leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub user: UserId,
    pub count: u64,
}

/// Response to a command.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Ok {
        message: String,
    },
    Error {
        error: String,
    },
    Stats {
        user: UserId,
        total: u64,
        today: u64,
        streak: u32,
        trusted: bool,
    },
    Ranking {
        title: String,
        entries: Vec<RankEntry>,
    },
    Status {
        total_all: u64,
        user_count: usize,
        today_total: u64,
    },
    Recorded {
        users: Vec<UserId>,
    },
    Pong {
        latency_ms: u64,
    },
    Subscribed,
}

/// Admin socket server.
pub struct AdminSocket {
    dispatcher: Arc<Dispatcher>,
    socket_path: String,
    bus: Option<EventBus>,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(dispatcher: Arc<Dispatcher>, socket_path: &str) -> Self {
        Self {
            dispatcher,
            socket_path: socket_path.to_string(),
            bus: None,
        }
    }

    /// Allow adapters to subscribe to platform events.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<()> {
        // Remove a stale socket file from a previous run
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let bus = self.bus.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, dispatcher, bus).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }
}

async fn handle_connection(
    stream: UnixStream,
    dispatcher: Arc<Dispatcher>,
    bus: Option<EventBus>,
) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        if line.trim().is_empty() {
            line.clear();
            continue;
        }

        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(AdminCommand::Subscribe) => match &bus {
                Some(bus) => {
                    let events = bus.subscribe();
                    write_line(&mut writer, &AdminResponse::Subscribed).await?;
                    return forward_events(events, &mut writer).await;
                }
                None => AdminResponse::Error {
                    error: "Event subscription is not enabled".to_string(),
                },
            },
            Ok(cmd) => execute_command(cmd, &dispatcher).await,
            Err(e) => AdminResponse::Error {
                error: format!("Invalid command: {}", e),
            },
        };

        write_line(&mut writer, &response).await?;
        line.clear();
    }

    Ok(())
}

async fn write_line<W, T>(writer: &mut W, value: &T) -> Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let json = serde_json::to_string(value)? + "\n";
    writer.write_all(json.as_bytes()).await?;
    Ok(())
}

async fn forward_events<W>(
    mut events: broadcast::Receiver<crate::collaborators::PlatformEvent>,
    writer: &mut W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    tracing::info!("Platform adapter subscribed");
    loop {
        match events.recv().await {
            Ok(event) => write_line(writer, &event).await?,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("Platform adapter lagged, {} events dropped", n);
            }
            Err(broadcast::error::RecvError::Closed) => return Ok(()),
        }
    }
}

fn ranking(title: &str, entries: Vec<(UserId, u64)>) -> AdminResponse {
    AdminResponse::Ranking {
        title: title.to_string(),
        entries: entries
            .into_iter()
            .map(|(user, count)| RankEntry { user, count })
            .collect(),
    }
}

/// Run one command and build its response.
pub async fn execute_command(cmd: AdminCommand, dispatcher: &Dispatcher) -> AdminResponse {
    match cmd {
        AdminCommand::Vouch {
            actor,
            target,
            proof_url,
            content_type,
        } => {
            let proof = Proof {
                url: proof_url,
                content_type,
            };
            match dispatcher.submit_vouch(actor, target, proof).await {
                Ok(receipt) => AdminResponse::Ok {
                    message: format!(
                        "Vouch submitted from {} to {}: {} total, {} day streak",
                        receipt.from.mention(),
                        receipt.to.mention(),
                        receipt.outcome.total,
                        receipt.outcome.streak
                    ),
                },
                Err(e) => AdminResponse::Error {
                    error: e.user_message(),
                },
            }
        }

        AdminCommand::Vouches { user } => {
            let stats = dispatcher.query_vouch(user).await;
            AdminResponse::Stats {
                user,
                total: stats.total,
                today: stats.today,
                streak: stats.streak,
                trusted: stats.is_trusted(),
            }
        }

        AdminCommand::Top10Today => ranking("Top 10 Today", dispatcher.leaderboard().await),

        AdminCommand::VouchAdd { user, amount } => match dispatcher.admin_add(user, amount).await {
            Ok(_) => AdminResponse::Ok {
                message: format!("Added {} vouches to {}", amount, user.mention()),
            },
            Err(e) => AdminResponse::Error {
                error: e.user_message(),
            },
        },

        AdminCommand::VouchRevoke { user, amount } => {
            match dispatcher.admin_revoke(user, amount).await {
                Ok(_) => AdminResponse::Ok {
                    message: format!("Removed {} vouches from {}", amount, user.mention()),
                },
                Err(e) => AdminResponse::Error {
                    error: e.user_message(),
                },
            }
        }

        AdminCommand::VouchReset { user } => match dispatcher.admin_reset(user).await {
            Ok(true) => AdminResponse::Ok {
                message: format!("Reset vouch data for {}", user.mention()),
            },
            Ok(false) => AdminResponse::Ok {
                message: "No vouch data found.".to_string(),
            },
            Err(e) => AdminResponse::Error {
                error: e.user_message(),
            },
        },

        AdminCommand::SetTrustedRole { role } => match dispatcher.set_trusted_role(role).await {
            Ok(_) => AdminResponse::Ok {
                message: format!("Trusted role set to {}", role.mention()),
            },
            Err(e) => AdminResponse::Error {
                error: e.user_message(),
            },
        },

        AdminCommand::SetVouchLogChannel { channel } => {
            match dispatcher.set_log_channel(channel).await {
                Ok(_) => AdminResponse::Ok {
                    message: format!("Log channel set to {}", channel.mention()),
                },
                Err(e) => AdminResponse::Error {
                    error: e.user_message(),
                },
            }
        }

        AdminCommand::SetVouchChannel { channel } => {
            match dispatcher.set_vouch_channel(channel).await {
                Ok(_) => AdminResponse::Ok {
                    message: format!("Listening to vouches in {}", channel.mention()),
                },
                Err(e) => AdminResponse::Error {
                    error: e.user_message(),
                },
            }
        }

        AdminCommand::Ping => AdminResponse::Pong {
            latency_ms: dispatcher.ping().await.as_millis() as u64,
        },

        AdminCommand::VouchStatus => {
            let status = dispatcher.status().await;
            AdminResponse::Status {
                total_all: status.total_all,
                user_count: status.user_count,
                today_total: status.today_total,
            }
        }

        AdminCommand::PingCheck { messages } => {
            let entries = dispatcher.scan_pings(&messages);
            if entries.is_empty() {
                AdminResponse::Error {
                    error: "No valid vouch pings found.".to_string(),
                }
            } else {
                ranking("Vouch Ping Leaderboard", entries)
            }
        }

        AdminCommand::Message { message } => match dispatcher.on_message(&message).await {
            Ok(recorded) => AdminResponse::Recorded {
                users: recorded.into_iter().map(|(user, _)| user).collect(),
            },
            Err(e) => AdminResponse::Error {
                error: e.user_message(),
            },
        },

        // Handled per connection
        AdminCommand::Subscribe => AdminResponse::Error {
            error: "subscribe must be sent on its own connection".to_string(),
        },
    }
}

/// Default socket path.
pub fn default_socket_path() -> String {
    let data_dir = std::env::var("VOUCH_DATA_DIR").unwrap_or_else(|_| "./vouch-data".to_string());
    format!("{}/admin.sock", data_dir)
}
