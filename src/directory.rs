//! # Directory Service
//!
//! The platform directory supplies the facts the ACL engine cannot own:
//! who owns a guild, which roles a member holds, and who operates the bot.
//! The embedding application implements [`Directory`] on top of its chat
//! client's cache or API; the engine never talks to the platform itself.
//!
//! Lookups are synchronous — real implementations read from the client's
//! in-memory cache. Implementations must be cheap to call repeatedly: the
//! engine may consult the directory more than once per decision.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::{GuildId, RoleId, UserId};

/// Read-only view of the chat platform's guild/member/role structure.
pub trait Directory: Send + Sync {
    /// The user who owns the guild.
    fn guild_owner(&self, guild_id: GuildId) -> Result<UserId>;

    /// The roles a member holds in a guild, **most authoritative first**.
    ///
    /// The order is load-bearing: both level resolution and role
    /// overwrites take the first match. The implementation owns the
    /// platform's role-priority semantics (for Discord-style platforms,
    /// highest role position first); the engine never reorders.
    ///
    /// A user with no roles (or not present in the guild) yields an empty
    /// list.
    fn member_roles(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<RoleId>>;

    /// The identifiers of the bot's operators.
    fn bot_owner_ids(&self) -> Result<HashSet<UserId>>;
}

/// In-memory [`Directory`] for tests and fixtures.
///
/// Populate it up front, then hand it to the service behind an `Arc`.
#[derive(Debug, Default)]
pub struct StaticDirectory {
    bot_owners: HashSet<UserId>,
    guild_owners: HashMap<GuildId, UserId>,
    member_roles: HashMap<(GuildId, UserId), Vec<RoleId>>,
}

impl StaticDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a user as a bot operator.
    pub fn add_bot_owner(&mut self, user_id: UserId) {
        self.bot_owners.insert(user_id);
    }

    /// Set a guild's owner.
    pub fn set_guild_owner(&mut self, guild_id: GuildId, user_id: UserId) {
        self.guild_owners.insert(guild_id, user_id);
    }

    /// Set a member's roles, most authoritative first.
    pub fn set_member_roles(&mut self, guild_id: GuildId, user_id: UserId, roles: Vec<RoleId>) {
        self.member_roles.insert((guild_id, user_id), roles);
    }
}

impl Directory for StaticDirectory {
    fn guild_owner(&self, guild_id: GuildId) -> Result<UserId> {
        self.guild_owners
            .get(&guild_id)
            .copied()
            .ok_or(Error::GuildNotFound(guild_id))
    }

    fn member_roles(&self, guild_id: GuildId, user_id: UserId) -> Result<Vec<RoleId>> {
        Ok(self
            .member_roles
            .get(&(guild_id, user_id))
            .cloned()
            .unwrap_or_default())
    }

    fn bot_owner_ids(&self) -> Result<HashSet<UserId>> {
        Ok(self.bot_owners.clone())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_directory_lookups() {
        let mut directory = StaticDirectory::new();
        directory.add_bot_owner(100);
        directory.set_guild_owner(1, 200);
        directory.set_member_roles(1, 300, vec![10, 11]);

        assert_eq!(directory.guild_owner(1).unwrap(), 200);
        assert_eq!(directory.member_roles(1, 300).unwrap(), vec![10, 11]);
        assert!(directory.member_roles(1, 999).unwrap().is_empty());
        assert!(directory.bot_owner_ids().unwrap().contains(&100));
    }

    #[test]
    fn test_unknown_guild_is_an_error() {
        let directory = StaticDirectory::new();
        assert!(matches!(
            directory.guild_owner(42),
            Err(Error::GuildNotFound(42))
        ));
    }
}
