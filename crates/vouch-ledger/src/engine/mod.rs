//! Vouch Engine
//!
//! Pure transitions over a [`Ledger`]. Each operation takes the ledger and
//! explicit arguments (including `today`), mutates nothing else and returns
//! an outcome. Loading and saving the snapshot around these calls is the
//! caller's job, as are notifications and role changes.

mod leaderboard;
mod scan;
mod streak;

pub use scan::{scan_pings, PingTally};
pub use streak::next_streak;

use crate::error::{Error, Result};
use crate::models::{Ledger, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Total at which a user receives the trusted designation.
pub const TRUSTED_THRESHOLD: u64 = 10;

/// Entries shown on the daily leaderboard.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Entries reported by a channel ping scan.
pub const PING_SCAN_LIMIT: usize = 25;

/// Whether a total earns the trusted designation.
pub const fn is_trusted(total: u64) -> bool {
    total >= TRUSTED_THRESHOLD
}

/// A user's counters as of `today`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VouchOutcome {
    pub total: u64,
    /// Vouches received today
    pub today: u64,
    pub streak: u32,
}

impl VouchOutcome {
    /// Whether the total earns the trusted designation.
    pub fn is_trusted(&self) -> bool {
        is_trusted(self.total)
    }
}

/// Ledger-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    /// Sum of every user's total
    pub total_all: u64,
    /// Users with a record
    pub user_count: usize,
    /// Vouches received today across all users
    pub today_total: u64,
}

impl Ledger {
    /// Record a vouch from `actor` to `target` on `today`.
    ///
    /// Self-vouches are rejected before anything is touched.
    pub fn record_vouch(
        &mut self,
        actor: UserId,
        target: UserId,
        today: NaiveDate,
    ) -> Result<VouchOutcome> {
        if actor == target {
            return Err(Error::SelfVouch(actor));
        }

        let record = self.entry(target);
        record.total = record.total.saturating_add(1);
        *record.daily.entry(today).or_insert(0) += 1;
        record.streak = next_streak(record.last_day, record.streak, today);
        record.last_day = Some(today);

        tracing::debug!(
            %actor,
            %target,
            total = record.total,
            streak = record.streak,
            "vouch recorded"
        );

        Ok(VouchOutcome {
            total: record.total,
            today: record.count_on(today),
            streak: record.streak,
        })
    }

    /// Read a user's counters. Unknown users read as all zeros.
    pub fn stats(&self, target: UserId, today: NaiveDate) -> VouchOutcome {
        self.get(target)
            .map(|record| VouchOutcome {
                total: record.total,
                today: record.count_on(today),
                streak: record.streak,
            })
            .unwrap_or_default()
    }

    /// Users with at least one vouch today, most vouched first.
    ///
    /// Ties are broken by user id ascending.
    pub fn top_today(&self, today: NaiveDate, limit: usize) -> Vec<(UserId, u64)> {
        let mut ranked = leaderboard::rank(self.iter().map(|(id, r)| (id, r.count_on(today))));
        ranked.truncate(limit);
        ranked
    }

    /// Add `delta` (negative to revoke) to a user's total, clamping at zero.
    ///
    /// Daily counts, streak and last day are left alone.
    pub fn admin_adjust(&mut self, target: UserId, delta: i64) -> u64 {
        let record = self.entry(target);
        record.total = if delta.is_negative() {
            record.total.saturating_sub(delta.unsigned_abs())
        } else {
            record.total.saturating_add(delta.unsigned_abs())
        };

        tracing::debug!(%target, delta, total = record.total, "total adjusted");
        record.total
    }

    /// Drop a user's record. Returns whether there was one.
    pub fn reset(&mut self, target: UserId) -> bool {
        let existed = self.remove(target).is_some();
        if existed {
            tracing::debug!(%target, "record reset");
        }
        existed
    }

    /// Ledger-wide totals as of `today`.
    pub fn status(&self, today: NaiveDate) -> LedgerStatus {
        self.iter().fold(
            LedgerStatus {
                user_count: self.len(),
                ..Default::default()
            },
            |mut status, (_, record)| {
                status.total_all = status.total_all.saturating_add(record.total);
                status.today_total = status.today_total.saturating_add(record.count_on(today));
                status
            },
        )
    }
}
