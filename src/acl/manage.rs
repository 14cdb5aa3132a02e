//! # Override Management
//!
//! Guarded mutations of the override store.
//!
//! The chat-facing administration commands live in the embedding
//! application; what lives here are the mutations they perform, each
//! wrapped in the privilege-escalation guards: an actor may only hand out
//! or take away what they hold themselves, and may only touch the
//! permissions of commands they can currently invoke.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::storage::{
    ChannelOverwriteRecord, CommandDefaultRecord, RoleMappingRecord, RoleOverwriteRecord,
    UserOverwriteRecord,
};
use crate::{ChannelId, GuildId, RoleId, UserId};

use super::{AccessLevel, InvocationContext};

impl super::AclService {
    // ========================================================================
    // ROLE-LEVEL MAPPINGS
    // ========================================================================

    /// Map a role to a level.
    ///
    /// The level must be assignable, and the managing actor's own level
    /// must be strictly above it. Returns `None` if the role is already
    /// mapped.
    pub fn set_role_mapping(
        &self,
        ctx: &InvocationContext,
        role_id: RoleId,
        level: AccessLevel,
    ) -> Result<Option<RoleMappingRecord>> {
        let guild_id = require_guild(ctx)?;
        if !level.is_assignable() {
            return Err(Error::ReservedLevel(level));
        }

        let actor_level = self.resolve_level(guild_id, ctx.actor)?;
        if level >= actor_level {
            return Err(Error::EscalationDenied {
                level,
                actual: actor_level,
            });
        }

        let mapping = self.db().add_role_mapping(guild_id, role_id, level)?;
        if mapping.is_some() {
            tracing::debug!(guild_id, role_id, %level, "role mapping created");
            // Anyone holding the role may now resolve differently
            self.cache().clear();
        }
        Ok(mapping)
    }

    /// Remove a role's mapping.
    ///
    /// The mapping's level must be strictly below the managing actor's.
    /// Returns whether a mapping existed.
    pub fn remove_role_mapping(&self, ctx: &InvocationContext, role_id: RoleId) -> Result<bool> {
        let guild_id = require_guild(ctx)?;

        let Some(mapping) = self.db().get_role_mapping(guild_id, role_id)? else {
            return Ok(false);
        };

        let actor_level = self.resolve_level(guild_id, ctx.actor)?;
        if mapping.level >= actor_level {
            return Err(Error::EscalationDenied {
                level: mapping.level,
                actual: actor_level,
            });
        }

        let removed = self.db().remove_role_mapping(guild_id, role_id)?;
        if removed {
            tracing::debug!(guild_id, role_id, "role mapping removed");
            self.cache().clear();
        }
        Ok(removed)
    }

    // ========================================================================
    // COMMAND DEFAULTS
    // ========================================================================

    /// Set a per-guild default level for a command, superseding its
    /// hardcoded baseline.
    ///
    /// Guards: the level must be assignable; the command must be known
    /// and governed; the actor must currently be able to invoke it, sit
    /// at or above its current effective level, and strictly above the
    /// level being assigned. Returns `None` if a default already exists.
    pub fn set_command_default(
        &self,
        ctx: &InvocationContext,
        command: &str,
        level: AccessLevel,
    ) -> Result<Option<CommandDefaultRecord>> {
        let guild_id = require_guild(ctx)?;
        if !level.is_assignable() {
            return Err(Error::ReservedLevel(level));
        }
        if !self.registry().contains(command) {
            return Err(Error::UnknownCommand(command.to_string()));
        }
        let Some(current) = self.effective_level(guild_id, command)? else {
            return Err(Error::CommandNotManaged(command.to_string()));
        };
        self.ensure_can_alter(ctx, command)?;

        let actor_level = self.resolve_level(guild_id, ctx.actor)?;
        if current > actor_level {
            return Err(Error::EscalationDenied {
                level: current,
                actual: actor_level,
            });
        }
        if level >= actor_level {
            return Err(Error::EscalationDenied {
                level,
                actual: actor_level,
            });
        }

        let default = self.db().add_command_default(guild_id, command, level)?;
        if default.is_some() {
            tracing::debug!(guild_id, command, %level, "command default created");
        }
        Ok(default)
    }

    /// Remove a command's per-guild default, restoring its hardcoded
    /// baseline. Returns whether a default existed.
    pub fn remove_command_default(&self, ctx: &InvocationContext, command: &str) -> Result<bool> {
        let guild_id = require_guild(ctx)?;
        if !self.registry().contains(command) {
            return Err(Error::UnknownCommand(command.to_string()));
        }
        self.ensure_can_alter(ctx, command)?;

        let removed = self.db().remove_command_default(guild_id, command)?;
        if removed {
            tracing::debug!(guild_id, command, "command default removed");
        }
        Ok(removed)
    }

    // ========================================================================
    // OVERWRITES
    // ========================================================================

    /// Add a user allow/deny overwrite. Returns `None` on duplicate.
    pub fn set_user_overwrite(
        &self,
        ctx: &InvocationContext,
        user_id: UserId,
        command: &str,
        allow: bool,
    ) -> Result<Option<UserOverwriteRecord>> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let overwrite = self.db().add_user_overwrite(guild_id, user_id, command, allow)?;
        if overwrite.is_some() {
            tracing::debug!(guild_id, user_id, command, allow, "user overwrite created");
        }
        Ok(overwrite)
    }

    /// Remove a user overwrite. Returns whether one existed.
    pub fn remove_user_overwrite(
        &self,
        ctx: &InvocationContext,
        user_id: UserId,
        command: &str,
    ) -> Result<bool> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let removed = self.db().remove_user_overwrite(guild_id, user_id, command)?;
        if removed {
            tracing::debug!(guild_id, user_id, command, "user overwrite removed");
        }
        Ok(removed)
    }

    /// Add a channel allow/deny overwrite. Returns `None` on duplicate.
    pub fn set_channel_overwrite(
        &self,
        ctx: &InvocationContext,
        channel_id: ChannelId,
        command: &str,
        allow: bool,
    ) -> Result<Option<ChannelOverwriteRecord>> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let overwrite = self
            .db()
            .add_channel_overwrite(guild_id, channel_id, command, allow)?;
        if overwrite.is_some() {
            tracing::debug!(guild_id, channel_id, command, allow, "channel overwrite created");
        }
        Ok(overwrite)
    }

    /// Remove a channel overwrite. Returns whether one existed.
    pub fn remove_channel_overwrite(
        &self,
        ctx: &InvocationContext,
        channel_id: ChannelId,
        command: &str,
    ) -> Result<bool> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let removed = self
            .db()
            .remove_channel_overwrite(guild_id, channel_id, command)?;
        if removed {
            tracing::debug!(guild_id, channel_id, command, "channel overwrite removed");
        }
        Ok(removed)
    }

    /// Add a role allow/deny overwrite. Returns `None` on duplicate.
    pub fn set_role_overwrite(
        &self,
        ctx: &InvocationContext,
        role_id: RoleId,
        command: &str,
        allow: bool,
    ) -> Result<Option<RoleOverwriteRecord>> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let overwrite = self.db().add_role_overwrite(guild_id, role_id, command, allow)?;
        if overwrite.is_some() {
            tracing::debug!(guild_id, role_id, command, allow, "role overwrite created");
        }
        Ok(overwrite)
    }

    /// Remove a role overwrite. Returns whether one existed.
    pub fn remove_role_overwrite(
        &self,
        ctx: &InvocationContext,
        role_id: RoleId,
        command: &str,
    ) -> Result<bool> {
        let guild_id = self.check_overwrite_guards(ctx, command)?;
        let removed = self.db().remove_role_overwrite(guild_id, role_id, command)?;
        if removed {
            tracing::debug!(guild_id, role_id, command, "role overwrite removed");
        }
        Ok(removed)
    }

    // ========================================================================
    // LISTINGS & EXPORT
    // ========================================================================

    /// All role mappings in a guild.
    pub fn role_mappings(&self, guild_id: GuildId) -> Result<Vec<RoleMappingRecord>> {
        self.db().get_role_mappings(guild_id)
    }

    /// All command defaults in a guild.
    pub fn command_defaults(&self, guild_id: GuildId) -> Result<Vec<CommandDefaultRecord>> {
        self.db().get_command_defaults(guild_id)
    }

    /// All user overwrites in a guild.
    pub fn user_overwrites(&self, guild_id: GuildId) -> Result<Vec<UserOverwriteRecord>> {
        self.db().get_user_overwrites(guild_id)
    }

    /// All channel overwrites in a guild.
    pub fn channel_overwrites(&self, guild_id: GuildId) -> Result<Vec<ChannelOverwriteRecord>> {
        self.db().get_channel_overwrites(guild_id)
    }

    /// All role overwrites in a guild.
    pub fn role_overwrites(&self, guild_id: GuildId) -> Result<Vec<RoleOverwriteRecord>> {
        self.db().get_role_overwrites(guild_id)
    }

    /// Export a guild's complete ACL state for backup tooling.
    pub fn export_guild(&self, guild_id: GuildId) -> Result<GuildAclSnapshot> {
        Ok(GuildAclSnapshot {
            guild_id,
            role_mappings: self.role_mappings(guild_id)?,
            command_defaults: self.command_defaults(guild_id)?,
            user_overwrites: self.user_overwrites(guild_id)?,
            channel_overwrites: self.channel_overwrites(guild_id)?,
            role_overwrites: self.role_overwrites(guild_id)?,
        })
    }

    // ========================================================================
    // GUARD HELPERS
    // ========================================================================

    /// Common guards for overwrite mutations: guild context, known
    /// command, and the actor being able to invoke it.
    fn check_overwrite_guards(&self, ctx: &InvocationContext, command: &str) -> Result<GuildId> {
        let guild_id = require_guild(ctx)?;
        if !self.registry().contains(command) {
            return Err(Error::UnknownCommand(command.to_string()));
        }
        self.ensure_can_alter(ctx, command)?;
        Ok(guild_id)
    }

    /// An actor may only alter the permissions of commands they could
    /// invoke right now.
    fn ensure_can_alter(&self, ctx: &InvocationContext, command: &str) -> Result<()> {
        match self.can_invoke(ctx, command)? {
            Some(true) => Ok(()),
            _ => Err(Error::CannotAlterCommand(command.to_string())),
        }
    }
}

fn require_guild(ctx: &InvocationContext) -> Result<GuildId> {
    ctx.guild.ok_or(Error::GuildRequired)
}

/// A guild's complete ACL state, for export/backup.
#[derive(Debug, Clone, Serialize)]
pub struct GuildAclSnapshot {
    /// The guild the snapshot belongs to
    pub guild_id: GuildId,
    /// Role-to-level mappings
    pub role_mappings: Vec<RoleMappingRecord>,
    /// Per-guild command defaults
    pub command_defaults: Vec<CommandDefaultRecord>,
    /// User overwrites
    pub user_overwrites: Vec<UserOverwriteRecord>,
    /// Channel overwrites
    pub channel_overwrites: Vec<ChannelOverwriteRecord>,
    /// Role overwrites
    pub role_overwrites: Vec<RoleOverwriteRecord>,
}

// ============================================================================
// TESTS
// ============================================================================
