use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Discord sends snowflakes as strings, other sources as plain numbers.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnowflake {
    Number(u64),
    Text(String)
}

macro_rules! snowflake {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
            #[serde(transparent)]
            pub struct $name(NonZeroU64);

            impl<'de> Deserialize<'de> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'de>
                {
                    match RawSnowflake::deserialize(deserializer)? {
                        RawSnowflake::Number(id) => NonZeroU64::new(id)
                            .map(Self)
                            .ok_or_else(|| D::Error::custom("snowflake can't be zero")),
                        RawSnowflake::Text(id) => id.parse().map_err(D::Error::custom)
                    }
                }
            }

            impl $name {
                /// Creates a new id, returns `None` for zero.
                pub const fn new(id: u64) -> Option<Self> {
                    match NonZeroU64::new(id) {
                        Some(id) => Some(Self(id)),
                        None => None
                    }
                }

                pub const fn get(self) -> u64 {
                    self.0.get()
                }
            }

            impl From<NonZeroU64> for $name {
                fn from(value: NonZeroU64) -> Self {
                    Self(value)
                }
            }

            impl FromStr for $name {
                type Err = std::num::ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    s.trim().parse::<NonZeroU64>().map(Self)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }
        )*
    };
}

snowflake! {
    /// Id of a guild, which is also the id of its playback session.
    GuildId,
    /// Id of a text or voice channel.
    ChannelId,
    /// Id of a message.
    MessageId,
    /// Id of a user.
    UserId,
}

#[cfg(feature = "serenity")]
mod serenity_conv {
    use serenity::all as s;

    macro_rules! convert {
        ($($ours:ident <=> $theirs:ident),*) => {
            $(
                impl From<s::$theirs> for super::$ours {
                    fn from(value: s::$theirs) -> Self {
                        Self(value.into())
                    }
                }

                impl From<super::$ours> for s::$theirs {
                    fn from(value: super::$ours) -> Self {
                        s::$theirs::from(value.0)
                    }
                }
            )*
        };
    }

    convert!(GuildId <=> GuildId, ChannelId <=> ChannelId, MessageId <=> MessageId, UserId <=> UserId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_snowflake_strings() {
        let id: ChannelId = " 123456789012345678".parse().unwrap();
        assert_eq!(id.get(), 123456789012345678);
        assert!("0".parse::<ChannelId>().is_err());
        assert!("abc".parse::<ChannelId>().is_err());
    }

    #[test]
    fn serializes_transparently() {
        let id = GuildId::new(42).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<GuildId>("42").unwrap(), id);
        assert_eq!(serde_json::from_str::<GuildId>("\"42\"").unwrap(), id);
        assert!(serde_json::from_str::<GuildId>("0").is_err());
    }
}
