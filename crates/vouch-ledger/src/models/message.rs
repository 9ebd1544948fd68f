//! Chat messages as the engine sees them.
//!
//! A platform adapter maps its own message objects onto [`ChatMessage`]; the
//! engine needs nothing beyond ids, bot flags and the text.

use super::{ChannelId, UserId};
use serde::{Deserialize, Serialize};

/// A message author or mentioned user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: UserId,
    #[serde(default)]
    pub bot: bool,
}

impl Participant {
    /// A human user.
    pub fn user(id: u64) -> Self {
        Self {
            id: UserId(id),
            bot: false,
        }
    }

    /// A bot account.
    pub fn bot(id: u64) -> Self {
        Self {
            id: UserId(id),
            bot: true,
        }
    }
}

/// Minimal view of a chat message.
pub trait ChatMessage {
    /// Who sent the message.
    fn author(&self) -> Participant;

    /// Users mentioned in the message, in order.
    fn mentions(&self) -> &[Participant];

    /// Raw message text.
    fn content(&self) -> &str;
}

impl<M: ChatMessage + ?Sized> ChatMessage for &M {
    fn author(&self) -> Participant {
        (**self).author()
    }

    fn mentions(&self) -> &[Participant] {
        (**self).mentions()
    }

    fn content(&self) -> &str {
        (**self).content()
    }
}

/// An owned message delivered by a platform adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub channel_id: ChannelId,
    pub author: Participant,
    #[serde(default)]
    pub mentions: Vec<Participant>,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage for InboundMessage {
    fn author(&self) -> Participant {
        self.author
    }

    fn mentions(&self) -> &[Participant] {
        &self.mentions
    }

    fn content(&self) -> &str {
        &self.content
    }
}

/// Words that mark a message as a vouch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    words: Vec<String>,
}

impl KeywordSet {
    /// Keywords used when none are configured.
    pub const DEFAULT: [&'static str; 5] = ["vouch", "vouched", "vouches", "legit", "trusted"];

    /// Build a keyword set; words are matched case-insensitively.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Whether `text` contains at least one keyword as a substring.
    pub fn matches(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        self.words.iter().any(|w| text.contains(w.as_str()))
    }

    /// The normalized keywords.
    pub fn words(&self) -> &[String] {
        &self.words
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}
