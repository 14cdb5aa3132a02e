//! # Level Registry
//!
//! The ordered enumeration of access levels and name lookup.
//!
//! Ordering is defined by an explicit rank index, not by declaration order
//! or any dynamic structure, so comparisons hold no matter how a level was
//! obtained (parsed from storage, deserialized from config, or constructed
//! directly).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An access level in the guild permission ladder.
///
/// Lowest to highest: `EVERYONE < MEMBER < SUBMOD < MOD < ADMIN <
/// GUILD_OWNER < BOT_OWNER`. `UNKNOWN` is a sentinel below all real
/// levels — it can never be an actor's resolved level and never a
/// command default; the management API rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    /// Sentinel — not assignable, not resolvable
    Unknown,
    /// Baseline level of any guild member without a mapped role
    Everyone,
    /// Verified/regular member
    Member,
    /// Trainee moderator
    Submod,
    /// Moderator
    Mod,
    /// Administrator
    Admin,
    /// The guild's owner (derived from the directory, never assigned)
    GuildOwner,
    /// The bot's operator (derived from configuration, never assigned)
    BotOwner,
}

impl AccessLevel {
    /// Explicit rank index defining the total order.
    pub fn rank(&self) -> i8 {
        match self {
            AccessLevel::Unknown => -1,
            AccessLevel::Everyone => 0,
            AccessLevel::Member => 1,
            AccessLevel::Submod => 2,
            AccessLevel::Mod => 3,
            AccessLevel::Admin => 4,
            AccessLevel::GuildOwner => 5,
            AccessLevel::BotOwner => 6,
        }
    }

    /// Canonical upper-case name, as stored and displayed.
    pub fn name(&self) -> &'static str {
        match self {
            AccessLevel::Unknown => "UNKNOWN",
            AccessLevel::Everyone => "EVERYONE",
            AccessLevel::Member => "MEMBER",
            AccessLevel::Submod => "SUBMOD",
            AccessLevel::Mod => "MOD",
            AccessLevel::Admin => "ADMIN",
            AccessLevel::GuildOwner => "GUILD_OWNER",
            AccessLevel::BotOwner => "BOT_OWNER",
        }
    }

    /// Look a level up by its canonical name (case-sensitive exact match).
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "UNKNOWN" => Ok(AccessLevel::Unknown),
            "EVERYONE" => Ok(AccessLevel::Everyone),
            "MEMBER" => Ok(AccessLevel::Member),
            "SUBMOD" => Ok(AccessLevel::Submod),
            "MOD" => Ok(AccessLevel::Mod),
            "ADMIN" => Ok(AccessLevel::Admin),
            "GUILD_OWNER" => Ok(AccessLevel::GuildOwner),
            "BOT_OWNER" => Ok(AccessLevel::BotOwner),
            _ => Err(Error::UnknownLevel(name.to_string())),
        }
    }

    /// All real levels, lowest first. Used for display and validation;
    /// excludes the `UNKNOWN` sentinel.
    pub fn ordered() -> [AccessLevel; 7] {
        [
            AccessLevel::Everyone,
            AccessLevel::Member,
            AccessLevel::Submod,
            AccessLevel::Mod,
            AccessLevel::Admin,
            AccessLevel::GuildOwner,
            AccessLevel::BotOwner,
        ]
    }

    /// Levels that may be assigned through the management API, lowest
    /// first. The owner levels are derived, never assigned.
    pub fn assignable() -> [AccessLevel; 5] {
        [
            AccessLevel::Everyone,
            AccessLevel::Member,
            AccessLevel::Submod,
            AccessLevel::Mod,
            AccessLevel::Admin,
        ]
    }

    /// Whether this level may be assigned as a role mapping or command
    /// default.
    pub fn is_assignable(&self) -> bool {
        Self::assignable().contains(self)
    }
}

impl Ord for AccessLevel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl PartialOrd for AccessLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AccessLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_matches_rank_index() {
        let ordered = AccessLevel::ordered();
        for pair in ordered.windows(2) {
            assert!(pair[0] < pair[1], "{} should be below {}", pair[0], pair[1]);
            assert!(pair[0].rank() < pair[1].rank());
        }
        // Full cross-check: L1 < L2 iff rank(L1) < rank(L2)
        for a in ordered {
            for b in ordered {
                assert_eq!(a < b, a.rank() < b.rank());
            }
        }
    }

    #[test]
    fn test_ordering_is_transitive() {
        assert!(AccessLevel::Everyone < AccessLevel::Submod);
        assert!(AccessLevel::Submod < AccessLevel::GuildOwner);
        assert!(AccessLevel::Everyone < AccessLevel::GuildOwner);
        assert!(AccessLevel::BotOwner >= AccessLevel::BotOwner);
    }

    #[test]
    fn test_unknown_is_below_everything() {
        for level in AccessLevel::ordered() {
            assert!(AccessLevel::Unknown < level);
        }
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            AccessLevel::from_name("GUILD_OWNER").unwrap(),
            AccessLevel::GuildOwner
        );
        assert_eq!(
            AccessLevel::from_name("EVERYONE").unwrap(),
            AccessLevel::Everyone
        );

        // Exact match only — lookup is case-sensitive
        assert!(AccessLevel::from_name("everyone").is_err());
        assert!(matches!(
            AccessLevel::from_name("WIZARD"),
            Err(Error::UnknownLevel(name)) if name == "WIZARD"
        ));
    }

    #[test]
    fn test_name_round_trip() {
        for level in AccessLevel::ordered() {
            assert_eq!(AccessLevel::from_name(level.name()).unwrap(), level);
        }
        assert_eq!(
            AccessLevel::from_name(AccessLevel::Unknown.name()).unwrap(),
            AccessLevel::Unknown
        );
    }

    #[test]
    fn test_assignable_excludes_reserved() {
        assert!(!AccessLevel::Unknown.is_assignable());
        assert!(!AccessLevel::GuildOwner.is_assignable());
        assert!(!AccessLevel::BotOwner.is_assignable());
        assert!(AccessLevel::Everyone.is_assignable());
        assert!(AccessLevel::Admin.is_assignable());
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&AccessLevel::GuildOwner).unwrap();
        assert_eq!(json, "\"GUILD_OWNER\"");
        let level: AccessLevel = serde_json::from_str("\"SUBMOD\"").unwrap();
        assert_eq!(level, AccessLevel::Submod);
    }
}
