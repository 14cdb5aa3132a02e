//! # Actor Level Resolver
//!
//! Maps an actor to their access level within a guild.
//!
//! Strict precedence, first match wins: bot owner, guild owner, first
//! mapped role in directory priority order, `EVERYONE`. Results are held
//! in the level cache for a short TTL; a racing second resolution is
//! harmless (it recomputes the same value and overwrites the entry).

use crate::error::Result;
use crate::{GuildId, UserId};

use super::AccessLevel;

impl super::AclService {
    /// Resolve an actor's access level within a guild.
    ///
    /// The answer may be up to the cache TTL stale with respect to role
    /// changes; see [`LevelCache`](super::LevelCache) for the trade-off.
    pub fn resolve_level(&self, guild_id: GuildId, user_id: UserId) -> Result<AccessLevel> {
        if let Some(level) = self.cache().get(guild_id, user_id) {
            tracing::trace!(guild_id, user_id, %level, "level resolved from cache");
            return Ok(level);
        }

        let level = self.resolve_level_uncached(guild_id, user_id)?;
        self.cache().insert(guild_id, user_id, level);
        Ok(level)
    }

    fn resolve_level_uncached(&self, guild_id: GuildId, user_id: UserId) -> Result<AccessLevel> {
        if self.directory().bot_owner_ids()?.contains(&user_id) {
            tracing::trace!(guild_id, user_id, "actor is bot owner");
            return Ok(AccessLevel::BotOwner);
        }

        if self.directory().guild_owner(guild_id)? == user_id {
            tracing::trace!(guild_id, user_id, "actor is guild owner");
            return Ok(AccessLevel::GuildOwner);
        }

        // First mapped role in priority order wins.
        for role_id in self.directory().member_roles(guild_id, user_id)? {
            if let Some(mapping) = self.db().get_role_mapping(guild_id, role_id)? {
                tracing::trace!(
                    guild_id,
                    user_id,
                    role_id,
                    level = %mapping.level,
                    "actor mapped via role"
                );
                return Ok(mapping.level);
            }
        }

        Ok(AccessLevel::Everyone)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::acl::{AccessLevel, AclService, CommandRegistry, LevelCache, ManualClock};
    use crate::directory::StaticDirectory;
    use crate::storage::Database;

    const GUILD: i64 = 1;
    const OWNER: i64 = 200;
    const USER: i64 = 300;

    async fn service_with_clock() -> (AclService, Arc<ManualClock>) {
        let db = Arc::new(Database::open(None).await.unwrap());

        let mut directory = StaticDirectory::new();
        directory.add_bot_owner(100);
        directory.set_guild_owner(GUILD, OWNER);
        directory.set_member_roles(GUILD, USER, vec![10, 11]);

        let clock = Arc::new(ManualClock::new());
        let cache = LevelCache::with_clock(Duration::from_secs(10), clock.clone());
        let service =
            AclService::with_cache(db, Arc::new(directory), CommandRegistry::new(), cache);
        (service, clock)
    }

    #[tokio::test]
    async fn test_bot_owner_outranks_everything() {
        let (service, _clock) = service_with_clock().await;
        // Even mapped roles and guild ownership don't matter for a bot owner
        service
            .db()
            .add_role_mapping(GUILD, 10, AccessLevel::Member)
            .unwrap();
        assert_eq!(
            service.resolve_level(GUILD, 100).unwrap(),
            AccessLevel::BotOwner
        );
    }

    #[tokio::test]
    async fn test_guild_owner_resolution() {
        let (service, _clock) = service_with_clock().await;
        assert_eq!(
            service.resolve_level(GUILD, OWNER).unwrap(),
            AccessLevel::GuildOwner
        );
    }

    #[tokio::test]
    async fn test_unmapped_member_is_everyone() {
        let (service, _clock) = service_with_clock().await;
        assert_eq!(
            service.resolve_level(GUILD, USER).unwrap(),
            AccessLevel::Everyone
        );
    }

    #[tokio::test]
    async fn test_first_mapped_role_in_priority_order_wins() {
        let (service, _clock) = service_with_clock().await;
        // USER holds roles [10, 11], role 10 being the more authoritative.
        // Role 11 maps to MOD, role 10 to MEMBER: the priority order, not
        // the higher level, decides.
        service
            .db()
            .add_role_mapping(GUILD, 11, AccessLevel::Mod)
            .unwrap();
        service
            .db()
            .add_role_mapping(GUILD, 10, AccessLevel::Member)
            .unwrap();
        assert_eq!(
            service.resolve_level(GUILD, USER).unwrap(),
            AccessLevel::Member
        );
    }

    #[tokio::test]
    async fn test_skips_unmapped_roles() {
        let (service, _clock) = service_with_clock().await;
        // Role 10 has no mapping; role 11 does.
        service
            .db()
            .add_role_mapping(GUILD, 11, AccessLevel::Submod)
            .unwrap();
        assert_eq!(
            service.resolve_level(GUILD, USER).unwrap(),
            AccessLevel::Submod
        );
    }

    #[tokio::test]
    async fn test_cache_staleness_window() {
        let (service, clock) = service_with_clock().await;
        service
            .db()
            .add_role_mapping(GUILD, 10, AccessLevel::Mod)
            .unwrap();
        assert_eq!(service.resolve_level(GUILD, USER).unwrap(), AccessLevel::Mod);

        // Mapping changes, but the cached answer holds inside the window
        service.db().remove_role_mapping(GUILD, 10).unwrap();
        clock.advance(Duration::from_secs(9));
        assert_eq!(service.resolve_level(GUILD, USER).unwrap(), AccessLevel::Mod);

        // After expiry the change is reflected
        clock.advance(Duration::from_secs(2));
        assert_eq!(
            service.resolve_level(GUILD, USER).unwrap(),
            AccessLevel::Everyone
        );
    }

    #[tokio::test]
    async fn test_explicit_invalidation_beats_the_window() {
        let (service, _clock) = service_with_clock().await;
        service
            .db()
            .add_role_mapping(GUILD, 10, AccessLevel::Mod)
            .unwrap();
        assert_eq!(service.resolve_level(GUILD, USER).unwrap(), AccessLevel::Mod);

        service.db().remove_role_mapping(GUILD, 10).unwrap();
        service.cache().invalidate(GUILD, USER);
        assert_eq!(
            service.resolve_level(GUILD, USER).unwrap(),
            AccessLevel::Everyone
        );
    }
}
