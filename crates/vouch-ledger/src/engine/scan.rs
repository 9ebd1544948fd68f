//! Counting vouch-like mentions across a channel's history.

use super::leaderboard;
use crate::models::{ChatMessage, KeywordSet, UserId};
use std::collections::HashMap;

/// Running per-user mention counts for a history scan.
///
/// Fed one message at a time so a caller walking a long (or async) history
/// can stop whenever it likes and still read the counts so far.
#[derive(Debug, Clone, Default)]
pub struct PingTally {
    keywords: KeywordSet,
    counts: HashMap<UserId, u64>,
    scanned: u64,
}

impl PingTally {
    /// Start a tally matching the given keywords.
    pub fn new(keywords: KeywordSet) -> Self {
        Self {
            keywords,
            counts: HashMap::new(),
            scanned: 0,
        }
    }

    /// Count one message.
    ///
    /// Bot authors, messages without mentions and messages without a keyword
    /// are skipped. Every non-bot mention counts once, including the author
    /// mentioning themselves.
    pub fn observe<M: ChatMessage>(&mut self, message: &M) {
        self.scanned += 1;

        if message.author().bot || message.mentions().is_empty() {
            return;
        }
        if !self.keywords.matches(message.content()) {
            return;
        }

        for mention in message.mentions().iter().filter(|m| !m.bot) {
            *self.counts.entry(mention.id).or_insert(0) += 1;
        }
    }

    /// Messages seen so far, matched or not.
    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    /// Whether no mention has been counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Counts so far, most mentioned first, ties by user id ascending.
    pub fn ranking(&self) -> Vec<(UserId, u64)> {
        leaderboard::rank(self.counts.iter().map(|(id, n)| (*id, *n)))
    }
}

/// Scan a finite message history for vouch-like mentions.
///
/// Returns every mentioned user with a non-zero count, most mentioned first.
/// Callers usually keep the first [`super::PING_SCAN_LIMIT`] entries.
pub fn scan_pings<I>(messages: I, keywords: &KeywordSet) -> Vec<(UserId, u64)>
where
    I: IntoIterator,
    I::Item: ChatMessage,
{
    let mut tally = PingTally::new(keywords.clone());
    for message in messages {
        tally.observe(&message);
    }
    tally.ranking()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChannelId, InboundMessage, Participant};

    fn msg(author: Participant, mentions: &[Participant], content: &str) -> InboundMessage {
        InboundMessage {
            channel_id: ChannelId(1),
            author,
            mentions: mentions.to_vec(),
            content: content.to_string(),
        }
    }

    #[test]
    fn counts_matching_mentions() {
        let a = Participant::user(1);
        let b = Participant::user(2);
        let c = Participant::user(3);
        let history = vec![
            msg(a, &[b], "vouch for this guy"),
            msg(c, &[b, a], "Legit trade with both"),
            msg(a, &[c], "Thanks!"),             // no keyword
            msg(b, &[], "vouched"),               // no mentions
            msg(Participant::bot(9), &[c], "vouch"), // bot author
        ];

        let ranking = scan_pings(&history, &KeywordSet::default());
        assert_eq!(ranking, vec![(UserId(2), 2), (UserId(1), 1)]);
    }

    #[test]
    fn bot_mentions_are_skipped_and_self_mentions_count() {
        let a = Participant::user(1);
        let history = vec![
            msg(a, &[Participant::bot(50), a], "trusted"),
            msg(a, &[Participant::bot(50)], "trusted"),
        ];

        let ranking = scan_pings(history, &KeywordSet::default());
        assert_eq!(ranking, vec![(UserId(1), 1)]);
    }

    #[test]
    fn repeated_mentions_in_one_message_each_count() {
        let b = Participant::user(2);
        let history = vec![msg(Participant::user(1), &[b, b], "vouch vouch")];
        assert_eq!(
            scan_pings(&history, &KeywordSet::default()),
            vec![(UserId(2), 2)]
        );
    }

    #[test]
    fn tally_can_stop_early() {
        let b = Participant::user(2);
        let c = Participant::user(3);
        let history = vec![
            msg(Participant::user(1), &[b], "vouch"),
            msg(Participant::user(1), &[c], "vouch"),
        ];

        let mut tally = PingTally::new(KeywordSet::default());
        for message in history.iter().take(1) {
            tally.observe(message);
        }
        assert_eq!(tally.scanned(), 1);
        assert_eq!(tally.ranking(), vec![(UserId(2), 1)]);
    }

    #[test]
    fn empty_history() {
        let history: Vec<InboundMessage> = Vec::new();
        let tally = PingTally::new(KeywordSet::default());
        assert!(tally.is_empty());
        assert!(scan_pings(history, &KeywordSet::default()).is_empty());
    }
}
