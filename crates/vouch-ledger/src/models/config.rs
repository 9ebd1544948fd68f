//! Bot configuration: where to log, where to listen, which role to grant.

use super::{ChannelId, RoleId};
use serde::{Deserialize, Serialize};

/// Persisted bot configuration.
///
/// Identifiers are opaque to the engine. An unset identifier is stored as
/// `0`, which is also how older config files mark "not configured".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BotConfig {
    /// Role granted at the trusted threshold
    #[serde(default, with = "id_or_zero")]
    pub trusted_role: Option<RoleId>,

    /// Channel that receives vouch log entries
    #[serde(default, with = "id_or_zero")]
    pub log_channel: Option<ChannelId>,

    /// Channel whose messages are scanned for vouches
    #[serde(default, with = "id_or_zero")]
    pub vouch_channel: Option<ChannelId>,
}

mod id_or_zero {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(id: &Option<T>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Copy + Into<u64>,
    {
        s.serialize_u64(id.map(Into::into).unwrap_or(0))
    }

    pub fn deserialize<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: From<u64>,
    {
        Ok(Option::<u64>::deserialize(d)?
            .filter(|id| *id != 0)
            .map(T::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn zero_means_unset() {
        let cfg: BotConfig = serde_json::from_value(json!({
            "trusted_role": 0,
            "log_channel": 55,
            "vouch_channel": 0
        }))
        .unwrap();

        assert_eq!(cfg.trusted_role, None);
        assert_eq!(cfg.log_channel, Some(ChannelId(55)));
        assert_eq!(cfg.vouch_channel, None);
    }

    #[test]
    fn missing_keys_default() {
        let cfg: BotConfig = serde_json::from_value(json!({})).unwrap();
        assert_eq!(cfg, BotConfig::default());
    }

    #[test]
    fn writes_zero_for_unset() {
        let cfg = BotConfig {
            trusted_role: Some(RoleId(9)),
            ..Default::default()
        };
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(
            value,
            json!({ "trusted_role": 9, "log_channel": 0, "vouch_channel": 0 })
        );
    }
}
