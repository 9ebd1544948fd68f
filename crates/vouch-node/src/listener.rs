//! Event surface: vouches detected in listener-channel messages, and channel
//! history scans over async streams.

use crate::commands::Dispatcher;
use crate::error::Result;
use futures::{Stream, StreamExt};
use vouch_ledger::{ChatMessage, InboundMessage, KeywordSet, PingTally, UserId, VouchOutcome};

/// Text posted after a listener vouch.
pub const ACK_TEXT: &str = "Vouch recorded.";

impl Dispatcher {
    /// Handle a message posted anywhere the bot can see.
    ///
    /// Only human messages in the configured vouch channel that contain a
    /// keyword and mention someone count. Each mentioned user other than the
    /// author receives one vouch, all in a single ledger cycle.
    pub async fn on_message(
        &self,
        message: &InboundMessage,
    ) -> Result<Vec<(UserId, VouchOutcome)>> {
        if message.author().bot {
            return Ok(Vec::new());
        }

        let config = self.service.config().await;
        if config.vouch_channel != Some(message.channel_id) {
            return Ok(Vec::new());
        }
        if message.mentions().is_empty() || !self.keywords.matches(message.content()) {
            return Ok(Vec::new());
        }

        let author = message.author().id;
        let today = self.collaborators.clock.today();
        let recorded = self
            .service
            .update(|ledger| {
                let mut recorded: Vec<(UserId, VouchOutcome)> = Vec::new();
                for mention in message.mentions().iter().filter(|m| m.id != author) {
                    // One vouch per user, however often they are mentioned
                    if recorded.iter().any(|(user, _)| *user == mention.id) {
                        continue;
                    }
                    let outcome = ledger.record_vouch(author, mention.id, today)?;
                    recorded.push((mention.id, outcome));
                }
                Ok(recorded)
            })
            .await?;

        for (user, outcome) in &recorded {
            self.sync_role(&config, *user, outcome.total).await;
        }

        if !recorded.is_empty() {
            tracing::info!(%author, count = recorded.len(), "listener vouches recorded");
            if let Err(e) = self
                .collaborators
                .notifier
                .acknowledge(message.channel_id, ACK_TEXT)
                .await
            {
                tracing::debug!("Acknowledgement failed: {}", e);
            }
        }

        Ok(recorded)
    }
}

/// Tally vouch-like mentions from an async message history.
///
/// Dropping the returned future stops the scan between messages.
pub async fn scan_stream<S>(messages: S, keywords: KeywordSet) -> PingTally
where
    S: Stream,
    S::Item: ChatMessage,
{
    let mut tally = PingTally::new(keywords);
    futures::pin_mut!(messages);
    while let Some(message) = messages.next().await {
        tally.observe(&message);
    }
    tracing::debug!(scanned = tally.scanned(), "history scan finished");
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::fakes::{recording, Recorder};
    use crate::collaborators::PlatformEvent;
    use crate::service::LedgerService;
    use std::sync::Arc;
    use tempfile::TempDir;
    use vouch_ledger::{ChannelId, Participant, RoleId};

    const VOUCH_CHANNEL: ChannelId = ChannelId(500);

    async fn setup() -> (TempDir, Dispatcher, Arc<Recorder>) {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(LedgerService::open(dir.path()).unwrap());
        let recorder = Arc::new(Recorder::default());
        let (collaborators, _clock) = recording("2024-01-01", recorder.clone());
        let dispatcher = Dispatcher::new(service, collaborators, KeywordSet::default());
        dispatcher.set_vouch_channel(VOUCH_CHANNEL).await.unwrap();
        (dir, dispatcher, recorder)
    }

    fn message(
        channel: ChannelId,
        author: Participant,
        mentions: &[Participant],
        text: &str,
    ) -> InboundMessage {
        InboundMessage {
            channel_id: channel,
            author,
            mentions: mentions.to_vec(),
            content: text.into(),
        }
    }

    #[tokio::test]
    async fn records_each_mention_except_author() {
        let (_dir, dispatcher, recorder) = setup().await;
        let author = Participant::user(1);
        let msg = message(
            VOUCH_CHANNEL,
            author,
            &[Participant::user(2), author, Participant::user(3)],
            "+vouch smooth trade",
        );

        let recorded = dispatcher.on_message(&msg).await.unwrap();
        let users: Vec<UserId> = recorded.iter().map(|(u, _)| *u).collect();
        assert_eq!(users, vec![UserId(2), UserId(3)]);
        assert_eq!(dispatcher.query_vouch(UserId(1)).await.total, 0);
        assert_eq!(
            recorder.events(),
            vec![PlatformEvent::Ack {
                channel: VOUCH_CHANNEL,
                text: ACK_TEXT.into()
            }]
        );
    }

    #[tokio::test]
    async fn duplicate_mentions_vouch_once() {
        let (_dir, dispatcher, _recorder) = setup().await;
        let b = Participant::user(2);
        let c = Participant::user(3);
        let msg = message(VOUCH_CHANNEL, Participant::user(1), &[b, c, b], "vouch");

        let recorded = dispatcher.on_message(&msg).await.unwrap();
        let users: Vec<UserId> = recorded.iter().map(|(u, _)| *u).collect();
        assert_eq!(users, vec![UserId(2), UserId(3)]);
        assert_eq!(dispatcher.query_vouch(UserId(2)).await.total, 1);
        assert_eq!(dispatcher.query_vouch(UserId(2)).await.today, 1);
    }

    #[tokio::test]
    async fn self_mention_only_records_nothing() {
        let (_dir, dispatcher, recorder) = setup().await;
        let author = Participant::user(1);
        let msg = message(VOUCH_CHANNEL, author, &[author], "vouch");

        assert!(dispatcher.on_message(&msg).await.unwrap().is_empty());
        assert_eq!(dispatcher.status().await.total_all, 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn ignores_other_channels_bots_and_plain_chat() {
        let (_dir, dispatcher, recorder) = setup().await;
        let b = Participant::user(2);

        let ignored = [
            message(ChannelId(1), Participant::user(1), &[b], "vouch"),
            message(VOUCH_CHANNEL, Participant::bot(9), &[b], "vouch"),
            message(VOUCH_CHANNEL, Participant::user(1), &[b], "hello there"),
            message(VOUCH_CHANNEL, Participant::user(1), &[], "vouch"),
        ];
        for msg in &ignored {
            assert!(dispatcher.on_message(msg).await.unwrap().is_empty());
        }
        assert_eq!(dispatcher.status().await.total_all, 0);
        assert!(recorder.events().is_empty());
    }

    #[tokio::test]
    async fn no_channel_configured_means_no_listening() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(LedgerService::open(dir.path()).unwrap());
        let (collaborators, _clock) = recording("2024-01-01", Arc::new(Recorder::default()));
        let dispatcher = Dispatcher::new(service, collaborators, KeywordSet::default());

        let msg = message(VOUCH_CHANNEL, Participant::user(1), &[Participant::user(2)], "vouch");
        assert!(dispatcher.on_message(&msg).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listener_vouches_sync_roles() {
        let (_dir, dispatcher, recorder) = setup().await;
        dispatcher.set_trusted_role(RoleId(3)).await.unwrap();
        dispatcher.admin_add(UserId(2), 9).await.unwrap();

        let msg = message(VOUCH_CHANNEL, Participant::user(1), &[Participant::user(2)], "LEGIT");
        let recorded = dispatcher.on_message(&msg).await.unwrap();
        assert_eq!(recorded[0].1.total, 10);

        assert!(recorder.events().contains(&PlatformEvent::Role {
            user: UserId(2),
            role: RoleId(3),
            trusted: true
        }));
    }

    #[tokio::test]
    async fn stream_scan() {
        let a = Participant::user(1);
        let b = Participant::user(2);
        let history = vec![
            message(ChannelId(1), a, &[b], "vouched"),
            message(ChannelId(1), b, &[a], "trusted seller"),
            message(ChannelId(1), a, &[b], "legit"),
        ];

        let tally = scan_stream(futures::stream::iter(history), KeywordSet::default()).await;
        assert_eq!(tally.scanned(), 3);
        assert_eq!(tally.ranking(), vec![(UserId(2), 2), (UserId(1), 1)]);
    }
}
