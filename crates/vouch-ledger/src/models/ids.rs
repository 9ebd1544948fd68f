//! Opaque platform identifiers.
//!
//! The engine never interprets these; it only compares and threads them
//! through to collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

platform_id!(
    /// A chat platform user.
    UserId
);
platform_id!(
    /// A chat platform role (the trusted designation).
    RoleId
);
platform_id!(
    /// A chat platform channel.
    ChannelId
);

impl UserId {
    /// Platform mention markup for this user.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl ChannelId {
    /// Platform mention markup for this channel.
    pub fn mention(&self) -> String {
        format!("<#{}>", self.0)
    }
}

impl RoleId {
    /// Platform mention markup for this role.
    pub fn mention(&self) -> String {
        format!("<@&{}>", self.0)
    }
}
