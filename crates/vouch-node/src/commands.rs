//! Command surface: one method per bot command.
//!
//! Each command maps onto a single engine operation, runs it through the
//! serialized [`LedgerService`], then performs the optional side effects
//! (role sync, vouch log). Side effects that are not configured are skipped;
//! side effects that fail are logged. Neither fails the command.

use crate::collaborators::{Collaborators, VouchLogEntry};
use crate::error::Result;
use crate::service::LedgerService;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use vouch_ledger::{
    is_trusted, BotConfig, ChannelId, InboundMessage, KeywordSet, LedgerStatus, RoleId, UserId,
    VouchOutcome, DEFAULT_LEADERBOARD_LIMIT, PING_SCAN_LIMIT,
};

/// Evidence attached to a submitted vouch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    pub url: String,
    pub content_type: String,
}

impl Proof {
    /// Only images are accepted as proof.
    pub fn validate(&self) -> vouch_ledger::Result<()> {
        if self.content_type.trim().to_ascii_lowercase().starts_with("image") {
            Ok(())
        } else {
            Err(vouch_ledger::Error::InvalidProof {
                content_type: self.content_type.clone(),
            })
        }
    }
}

/// Result of a submitted vouch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchReceipt {
    pub from: UserId,
    pub to: UserId,
    pub outcome: VouchOutcome,
    pub trusted: bool,
}

/// Executes bot commands against the ledger.
pub struct Dispatcher {
    pub(crate) service: Arc<LedgerService>,
    pub(crate) collaborators: Collaborators,
    pub(crate) keywords: KeywordSet,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(
        service: Arc<LedgerService>,
        collaborators: Collaborators,
        keywords: KeywordSet,
    ) -> Self {
        Self {
            service,
            collaborators,
            keywords,
        }
    }

    /// Keywords used by the listener and channel scans.
    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    /// Submit a vouch with image proof.
    pub async fn submit_vouch(
        &self,
        actor: UserId,
        target: UserId,
        proof: Proof,
    ) -> Result<VouchReceipt> {
        if actor == target {
            return Err(vouch_ledger::Error::SelfVouch(actor).into());
        }
        proof.validate()?;

        let today = self.collaborators.clock.today();
        let outcome = self
            .service
            .update(|ledger| ledger.record_vouch(actor, target, today))
            .await?;

        let config = self.service.config().await;
        self.sync_role(&config, target, outcome.total).await;

        let entry = VouchLogEntry {
            from: actor,
            to: target,
            total: outcome.total,
            streak: outcome.streak,
            proof_url: Some(proof.url),
        };
        self.publish_log(&config, &entry).await;

        tracing::info!(%actor, %target, total = outcome.total, "vouch submitted");
        Ok(VouchReceipt {
            from: actor,
            to: target,
            outcome,
            trusted: outcome.is_trusted(),
        })
    }

    /// A user's counters as of today.
    pub async fn query_vouch(&self, target: UserId) -> VouchOutcome {
        let today = self.collaborators.clock.today();
        self.service.read(|ledger| ledger.stats(target, today)).await
    }

    /// Today's most vouched users.
    pub async fn leaderboard(&self) -> Vec<(UserId, u64)> {
        let today = self.collaborators.clock.today();
        self.service
            .read(|ledger| ledger.top_today(today, DEFAULT_LEADERBOARD_LIMIT))
            .await
    }

    /// Admin: add vouches to a user's total.
    pub async fn admin_add(&self, target: UserId, amount: u64) -> Result<u64> {
        self.admin_adjust(target, clamp_delta(amount)).await
    }

    /// Admin: remove vouches from a user's total, stopping at zero.
    pub async fn admin_revoke(&self, target: UserId, amount: u64) -> Result<u64> {
        self.admin_adjust(target, -clamp_delta(amount)).await
    }

    async fn admin_adjust(&self, target: UserId, delta: i64) -> Result<u64> {
        let total = self
            .service
            .update(|ledger| Ok(ledger.admin_adjust(target, delta)))
            .await?;

        let config = self.service.config().await;
        self.sync_role(&config, target, total).await;

        tracing::info!(%target, delta, total, "admin adjusted vouches");
        Ok(total)
    }

    /// Admin: drop a user's record. Returns whether there was one.
    pub async fn admin_reset(&self, target: UserId) -> Result<bool> {
        let existed = self.service.update(|ledger| Ok(ledger.reset(target))).await?;
        tracing::info!(%target, existed, "admin reset");
        Ok(existed)
    }

    /// Admin: set the role granted at the trusted threshold.
    pub async fn set_trusted_role(&self, role: RoleId) -> Result<BotConfig> {
        tracing::info!(%role, "trusted role set");
        self.service
            .update_config(|c| c.trusted_role = Some(role))
            .await
    }

    /// Admin: set the vouch log channel.
    pub async fn set_log_channel(&self, channel: ChannelId) -> Result<BotConfig> {
        tracing::info!(%channel, "log channel set");
        self.service
            .update_config(|c| c.log_channel = Some(channel))
            .await
    }

    /// Admin: set the channel the listener watches.
    pub async fn set_vouch_channel(&self, channel: ChannelId) -> Result<BotConfig> {
        tracing::info!(%channel, "vouch channel set");
        self.service
            .update_config(|c| c.vouch_channel = Some(channel))
            .await
    }

    /// How long a serialized ledger read takes right now.
    pub async fn ping(&self) -> Duration {
        let start = Instant::now();
        self.service.read(|ledger| ledger.len()).await;
        start.elapsed()
    }

    /// Ledger-wide totals as of today.
    pub async fn status(&self) -> LedgerStatus {
        let today = self.collaborators.clock.today();
        self.service.read(|ledger| ledger.status(today)).await
    }

    /// Admin: count vouch-like mentions in a channel history.
    pub fn scan_pings(&self, messages: &[InboundMessage]) -> Vec<(UserId, u64)> {
        let mut ranking = vouch_ledger::scan_pings(messages, &self.keywords);
        ranking.truncate(PING_SCAN_LIMIT);
        ranking
    }

    /// Grant or revoke the trusted role to match `total`.
    pub(crate) async fn sync_role(&self, config: &BotConfig, user: UserId, total: u64) {
        let Some(role) = config.trusted_role else {
            tracing::debug!(
                "{}; role sync skipped",
                vouch_ledger::Error::ConfigMissing("trusted role")
            );
            return;
        };
        if let Err(e) = self
            .collaborators
            .roles
            .set_trusted(user, role, is_trusted(total))
            .await
        {
            tracing::warn!(%user, %role, "Role sync failed: {}", e);
        }
    }

    async fn publish_log(&self, config: &BotConfig, entry: &VouchLogEntry) {
        let Some(channel) = config.log_channel else {
            tracing::debug!(
                "{}; vouch log skipped",
                vouch_ledger::Error::ConfigMissing("log channel")
            );
            return;
        };
        if let Err(e) = self.collaborators.log.publish(channel, entry).await {
            tracing::warn!(%channel, "Vouch log failed: {}", e);
        }
    }
}

fn clamp_delta(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}
