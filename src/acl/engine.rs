//! # Permission Decision Engine
//!
//! The central allow/deny decision for one command invocation.
//!
//! The engine is a pure function of the override-store snapshot plus the
//! resolver cache: it performs no writes and raises typed denials that
//! carry the rule that fired, so the dispatch layer can render a precise
//! message.

use crate::error::{Error, Result};

use super::{AccessLevel, InvocationContext};

impl super::AclService {
    /// Decide whether the actor may invoke `command` at `required` level.
    ///
    /// `required` is the command's declared baseline; a per-guild command
    /// default, if present, replaces it before the comparison step.
    /// Returns `Ok(())` on allow and a denial error
    /// ([`Error::is_denial`]) on an explicit or implicit deny.
    ///
    /// Evaluation order:
    ///
    /// 1. no guild → allow (ACL governs guild behavior only)
    /// 2. bot owner → allow, bypassing all overrides
    /// 3. user overwrite, allow or deny, stop
    /// 4. channel overwrite, allow or deny, stop
    /// 5. first role overwrite in directory priority order, stop
    /// 6. `actor_level >= required`
    pub fn check(
        &self,
        required: AccessLevel,
        ctx: &InvocationContext,
        command: &str,
    ) -> Result<()> {
        // Invocations outside a guild are always allowed.
        let Some(guild_id) = ctx.guild else {
            tracing::trace!(command, "non-guild context is always allowed");
            return Ok(());
        };

        let actor_level = self.resolve_level(guild_id, ctx.actor)?;
        if actor_level == AccessLevel::BotOwner {
            tracing::trace!(command, "bot owner is always allowed");
            return Ok(());
        }

        let mut required = required;
        if let Some(custom) = self.db().get_command_default(guild_id, command)? {
            required = custom.level;
        }
        tracing::trace!(command, required = %required, "required level");

        if let Some(uo) = self.db().get_user_overwrite(guild_id, ctx.actor, command)? {
            tracing::trace!(command, user_id = ctx.actor, allow = uo.allow, "user overwrite");
            if uo.allow {
                return Ok(());
            }
            return Err(Error::NegativeUserOverwrite { user_id: ctx.actor });
        }

        if let Some(channel_id) = ctx.channel {
            if let Some(co) = self.db().get_channel_overwrite(guild_id, channel_id, command)? {
                tracing::trace!(command, channel_id, allow = co.allow, "channel overwrite");
                if co.allow {
                    return Ok(());
                }
                return Err(Error::NegativeChannelOverwrite { channel_id });
            }
        }

        for role_id in self.directory().member_roles(guild_id, ctx.actor)? {
            if let Some(ro) = self.db().get_role_overwrite(guild_id, role_id, command)? {
                tracing::trace!(command, role_id, allow = ro.allow, "role overwrite");
                if ro.allow {
                    return Ok(());
                }
                return Err(Error::NegativeRoleOverwrite { role_id });
            }
        }

        if actor_level >= required {
            tracing::trace!(
                command,
                actor_level = %actor_level,
                "actor level meets required level"
            );
            return Ok(());
        }

        tracing::trace!(
            command,
            actor_level = %actor_level,
            required = %required,
            "actor level below required level"
        );
        Err(Error::InsufficientLevel {
            required,
            actual: actor_level,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::acl::{AccessLevel, AclService, CommandRegistry, InvocationContext};
    use crate::directory::StaticDirectory;
    use crate::error::Error;
    use crate::storage::Database;
    use crate::AclConfig;

    const GUILD: i64 = 1;
    const CHANNEL: i64 = 500;
    const BOT_OWNER: i64 = 100;
    const GUILD_OWNER: i64 = 200;
    const USER: i64 = 300;
    const ROLE_A: i64 = 10;
    const ROLE_B: i64 = 11;

    async fn service() -> AclService {
        let db = Arc::new(Database::open(None).await.unwrap());

        let mut directory = StaticDirectory::new();
        directory.add_bot_owner(BOT_OWNER);
        directory.set_guild_owner(GUILD, GUILD_OWNER);
        // ROLE_A is the more authoritative of USER's two roles
        directory.set_member_roles(GUILD, USER, vec![ROLE_A, ROLE_B]);
        directory.set_member_roles(GUILD, BOT_OWNER, vec![ROLE_A]);

        let mut registry = CommandRegistry::new();
        registry.register("ping", AccessLevel::Everyone).unwrap();
        registry.register("ban", AccessLevel::Mod).unwrap();

        AclService::new(db, Arc::new(directory), registry, &AclConfig::default())
    }

    fn ctx(actor: i64) -> InvocationContext {
        InvocationContext::guild(actor, GUILD, CHANNEL)
    }

    #[tokio::test]
    async fn test_direct_message_is_always_allowed() {
        let service = service().await;
        // Even with a stored deny rule and an impossible required level
        service.db().add_user_overwrite(GUILD, USER, "ban", false).unwrap();
        let dm = InvocationContext::direct(USER);
        assert!(service.check(AccessLevel::BotOwner, &dm, "ban").is_ok());
    }

    #[tokio::test]
    async fn test_bot_owner_bypasses_negative_overwrites() {
        let service = service().await;
        service.db().add_user_overwrite(GUILD, BOT_OWNER, "ban", false).unwrap();
        service.db().add_channel_overwrite(GUILD, CHANNEL, "ban", false).unwrap();
        service.db().add_role_overwrite(GUILD, ROLE_A, "ban", false).unwrap();

        assert!(service.check(AccessLevel::BotOwner, &ctx(BOT_OWNER), "ban").is_ok());
    }

    #[tokio::test]
    async fn test_insufficient_level_carries_both_levels() {
        let service = service().await;
        let err = service
            .check(AccessLevel::Member, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientLevel {
                required: AccessLevel::Member,
                actual: AccessLevel::Everyone,
            }
        ));
    }

    #[tokio::test]
    async fn test_equal_level_is_allowed() {
        let service = service().await;
        service.db().add_role_mapping(GUILD, ROLE_A, AccessLevel::Mod).unwrap();
        // Boundary is >=, not >
        assert!(service.check(AccessLevel::Mod, &ctx(USER), "ban").is_ok());
    }

    #[tokio::test]
    async fn test_user_deny_beats_role_allow() {
        let service = service().await;
        service.db().add_user_overwrite(GUILD, USER, "ping", false).unwrap();
        service.db().add_role_overwrite(GUILD, ROLE_A, "ping", true).unwrap();

        let err = service
            .check(AccessLevel::Everyone, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(err, Error::NegativeUserOverwrite { user_id } if user_id == USER));
    }

    #[tokio::test]
    async fn test_user_allow_wins_over_level() {
        let service = service().await;
        service.db().add_user_overwrite(GUILD, USER, "ban", true).unwrap();
        assert!(service.check(AccessLevel::Mod, &ctx(USER), "ban").is_ok());
    }

    #[tokio::test]
    async fn test_channel_allow_bypasses_level_check() {
        let service = service().await;
        service.db().add_channel_overwrite(GUILD, CHANNEL, "ping", true).unwrap();
        // Actor resolves to EVERYONE; required is MOD — the overwrite decides
        assert!(service.check(AccessLevel::Mod, &ctx(USER), "ping").is_ok());
    }

    #[tokio::test]
    async fn test_channel_deny_carries_channel() {
        let service = service().await;
        service.db().add_channel_overwrite(GUILD, CHANNEL, "ping", false).unwrap();
        let err = service
            .check(AccessLevel::Everyone, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::NegativeChannelOverwrite { channel_id } if channel_id == CHANNEL
        ));
    }

    #[tokio::test]
    async fn test_channel_overwrite_beats_role_overwrite() {
        let service = service().await;
        service.db().add_channel_overwrite(GUILD, CHANNEL, "ping", false).unwrap();
        service.db().add_role_overwrite(GUILD, ROLE_A, "ping", true).unwrap();

        let err = service
            .check(AccessLevel::Everyone, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(err, Error::NegativeChannelOverwrite { .. }));
    }

    #[tokio::test]
    async fn test_first_role_overwrite_wins() {
        let service = service().await;
        // ROLE_A is iterated first; its deny decides before ROLE_B's allow
        service.db().add_role_overwrite(GUILD, ROLE_A, "ping", false).unwrap();
        service.db().add_role_overwrite(GUILD, ROLE_B, "ping", true).unwrap();

        let err = service
            .check(AccessLevel::Everyone, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(err, Error::NegativeRoleOverwrite { role_id } if role_id == ROLE_A));
    }

    #[tokio::test]
    async fn test_role_allow_wins_over_level() {
        let service = service().await;
        service.db().add_role_overwrite(GUILD, ROLE_B, "ban", true).unwrap();
        assert!(service.check(AccessLevel::Mod, &ctx(USER), "ban").is_ok());
    }

    #[tokio::test]
    async fn test_command_default_replaces_baseline() {
        let service = service().await;
        service.db().add_role_mapping(GUILD, ROLE_A, AccessLevel::Member).unwrap();

        // Below the hardcoded MOD baseline...
        let err = service.check(AccessLevel::Mod, &ctx(USER), "ban").unwrap_err();
        assert!(err.is_denial());

        // ...but at the per-guild default once it is set
        service.db().add_command_default(GUILD, "ban", AccessLevel::Member).unwrap();
        service.cache().clear();
        assert!(service.check(AccessLevel::Mod, &ctx(USER), "ban").is_ok());
    }

    #[tokio::test]
    async fn test_default_raises_baseline_too() {
        let service = service().await;
        service.db().add_role_mapping(GUILD, ROLE_A, AccessLevel::Member).unwrap();
        service.db().add_command_default(GUILD, "ping", AccessLevel::Admin).unwrap();

        let err = service
            .check(AccessLevel::Everyone, &ctx(USER), "ping")
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientLevel {
                required: AccessLevel::Admin,
                actual: AccessLevel::Member,
            }
        ));
    }

    #[tokio::test]
    async fn test_overwrite_beats_command_default() {
        let service = service().await;
        // Default would deny; the user overwrite is evaluated first
        service.db().add_command_default(GUILD, "ping", AccessLevel::Admin).unwrap();
        service.db().add_user_overwrite(GUILD, USER, "ping", true).unwrap();
        assert!(service.check(AccessLevel::Everyone, &ctx(USER), "ping").is_ok());
    }

    #[tokio::test]
    async fn test_guild_owner_is_not_bot_owner() {
        let service = service().await;
        // A negative overwrite does apply to the guild owner
        service
            .db()
            .add_user_overwrite(GUILD, GUILD_OWNER, "ping", false)
            .unwrap();
        let err = service
            .check(AccessLevel::Everyone, &ctx(GUILD_OWNER), "ping")
            .unwrap_err();
        assert!(matches!(err, Error::NegativeUserOverwrite { .. }));
    }

    #[tokio::test]
    async fn test_missing_channel_skips_channel_step() {
        let service = service().await;
        service.db().add_channel_overwrite(GUILD, CHANNEL, "ping", false).unwrap();
        let ctx = InvocationContext {
            actor: USER,
            guild: Some(GUILD),
            channel: None,
        };
        // No channel in context — the channel deny cannot fire
        assert!(service.check(AccessLevel::Everyone, &ctx, "ping").is_ok());
    }
}
