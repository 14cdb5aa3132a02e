//! # Command Introspection
//!
//! Helpers recovering a command's effective level and whether an actor
//! could invoke it. The management API leans on these to stop privilege
//! escalation: nobody may grant or revoke a permission they could not
//! exercise themselves.

use crate::error::Result;
use crate::GuildId;

use super::{AccessLevel, InvocationContext};

impl super::AclService {
    /// The level currently governing a command in a guild.
    ///
    /// A per-guild command default wins over the registered baseline.
    /// `None` means the command is not governed by access control at all
    /// — the management API refuses to create overrides for such
    /// commands.
    pub fn effective_level(
        &self,
        guild_id: GuildId,
        command: &str,
    ) -> Result<Option<AccessLevel>> {
        if let Some(custom) = self.db().get_command_default(guild_id, command)? {
            return Ok(Some(custom.level));
        }
        Ok(self.registry().hardcoded_level(command))
    }

    /// Whether the actor could invoke the command in the given context.
    ///
    /// Returns `None` in a direct-message context (access control does
    /// not apply there), `Some(false)` for ungoverned commands or any
    /// denial, `Some(true)` on success. Non-denial failures (storage,
    /// directory) propagate as errors.
    pub fn can_invoke(&self, ctx: &InvocationContext, command: &str) -> Result<Option<bool>> {
        let Some(guild_id) = ctx.guild else {
            return Ok(None);
        };

        let Some(level) = self.effective_level(guild_id, command)? else {
            return Ok(Some(false));
        };

        match self.check(level, ctx, command) {
            Ok(()) => Ok(Some(true)),
            Err(err) if err.is_denial() => Ok(Some(false)),
            Err(err) => Err(err),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
