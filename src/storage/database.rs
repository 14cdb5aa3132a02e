//! # Database
//!
//! SQLite-backed override store.
//!
//! ## Database Operations
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DATABASE OPERATIONS                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────┐                                                    │
//! │  │   AclService    │                                                    │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │    Database     │  High-level API                                    │
//! │  │   (this file)   │  - Role-level mappings                             │
//! │  │                 │  - Command defaults                                │
//! │  │                 │  - User/channel/role overwrites                    │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │    rusqlite     │  SQLite wrapper                                    │
//! │  └────────┬────────┘                                                    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │   SQLite DB     │  - In-memory for tests                             │
//! │  │                 │  - File for production                             │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every `add_*` inserts atomically and reports a duplicate logical key as
//! `Ok(None)` rather than an error; `remove_*` reports whether a row was
//! deleted. The single mutexed connection means a concurrent reader
//! observes either the pre- or post-state of a mutation, never a partial
//! row.

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::sync::Arc;

use super::schema;
use crate::acl::AccessLevel;
use crate::error::{Error, Result};
use crate::{ChannelId, GuildId, RoleId, UserId};

/// The main database handle
///
/// Wraps a SQLite connection and provides high-level methods for the five
/// override-store tables.
pub struct Database {
    /// The underlying SQLite connection
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create a database
    ///
    /// If path is None, creates an in-memory database (useful for testing).
    pub async fn open(path: Option<&str>) -> Result<Self> {
        let conn = match path {
            Some(p) => Connection::open(p)
                .map_err(|e| Error::DatabaseError(format!("Failed to open database: {}", e)))?,
            None => Connection::open_in_memory().map_err(|e| {
                Error::DatabaseError(format!("Failed to create in-memory database: {}", e))
            })?,
        };

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        // Initialize schema
        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock();

        // Check current schema version
        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .ok();

        match version {
            None => {
                // Fresh database, create all tables
                conn.execute_batch(schema::CREATE_TABLES)
                    .map_err(|e| Error::DatabaseError(format!("Failed to create tables: {}", e)))?;

                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?)",
                    params![schema::SCHEMA_VERSION],
                )
                .map_err(|e| Error::DatabaseError(format!("Failed to set schema version: {}", e)))?;

                tracing::info!("ACL schema created (version {})", schema::SCHEMA_VERSION);
            }
            Some(v) => {
                tracing::debug!("ACL schema version: {}", v);
            }
        }

        Ok(())
    }

    // ========================================================================
    // ROLE-LEVEL MAPPINGS
    // ========================================================================

    /// Map a role to a level. Returns None if the role is already mapped.
    pub fn add_role_mapping(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        level: AccessLevel,
    ) -> Result<Option<RoleMappingRecord>> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO acl_role_mappings (guild_id, role_id, level, created_at)
                 VALUES (?, ?, ?, ?)",
                params![guild_id, role_id, level.name(), now],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to add role mapping: {}", e)))?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(RoleMappingRecord {
            guild_id,
            role_id,
            level,
            created_at: now,
        }))
    }

    /// Get the mapping for a role, if any.
    pub fn get_role_mapping(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
    ) -> Result<Option<RoleMappingRecord>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT guild_id, role_id, level, created_at FROM acl_role_mappings
             WHERE guild_id = ? AND role_id = ?",
            params![guild_id, role_id],
            |row| {
                Ok(RoleMappingRecord {
                    guild_id: row.get(0)?,
                    role_id: row.get(1)?,
                    level: parse_level(2, row.get(2)?)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(e.to_string())),
        }
    }

    /// Get all role mappings for a guild.
    pub fn get_role_mappings(&self, guild_id: GuildId) -> Result<Vec<RoleMappingRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, role_id, level, created_at FROM acl_role_mappings
                 WHERE guild_id = ? ORDER BY role_id",
            )
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(RoleMappingRecord {
                    guild_id: row.get(0)?,
                    role_id: row.get(1)?,
                    level: parse_level(2, row.get(2)?)?,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let mut mappings = Vec::new();
        for row in rows {
            mappings.push(row.map_err(|e| Error::DatabaseError(e.to_string()))?);
        }
        Ok(mappings)
    }

    /// Remove a role mapping. Returns whether a mapping existed.
    pub fn remove_role_mapping(&self, guild_id: GuildId, role_id: RoleId) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM acl_role_mappings WHERE guild_id = ? AND role_id = ?",
                params![guild_id, role_id],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to remove role mapping: {}", e)))?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // COMMAND DEFAULTS
    // ========================================================================

    /// Set a guild-level default for a command. Returns None if one exists.
    pub fn add_command_default(
        &self,
        guild_id: GuildId,
        command: &str,
        level: AccessLevel,
    ) -> Result<Option<CommandDefaultRecord>> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO acl_command_defaults (guild_id, command, level, created_at)
                 VALUES (?, ?, ?, ?)",
                params![guild_id, command, level.name(), now],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to add command default: {}", e)))?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(CommandDefaultRecord {
            guild_id,
            command: command.to_string(),
            level,
            created_at: now,
        }))
    }

    /// Get the default for a command, if any.
    pub fn get_command_default(
        &self,
        guild_id: GuildId,
        command: &str,
    ) -> Result<Option<CommandDefaultRecord>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT guild_id, command, level, created_at FROM acl_command_defaults
             WHERE guild_id = ? AND command = ?",
            params![guild_id, command],
            |row| {
                Ok(CommandDefaultRecord {
                    guild_id: row.get(0)?,
                    command: row.get(1)?,
                    level: parse_level(2, row.get(2)?)?,
                    created_at: row.get(3)?,
                })
            },
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(e.to_string())),
        }
    }

    /// Get all command defaults for a guild.
    pub fn get_command_defaults(&self, guild_id: GuildId) -> Result<Vec<CommandDefaultRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, command, level, created_at FROM acl_command_defaults
                 WHERE guild_id = ? ORDER BY command",
            )
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(CommandDefaultRecord {
                    guild_id: row.get(0)?,
                    command: row.get(1)?,
                    level: parse_level(2, row.get(2)?)?,
                    created_at: row.get(3)?,
                })
            })
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let mut defaults = Vec::new();
        for row in rows {
            defaults.push(row.map_err(|e| Error::DatabaseError(e.to_string()))?);
        }
        Ok(defaults)
    }

    /// Remove a command default. Returns whether one existed.
    pub fn remove_command_default(&self, guild_id: GuildId, command: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM acl_command_defaults WHERE guild_id = ? AND command = ?",
                params![guild_id, command],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to remove command default: {}", e)))?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // USER OVERWRITES
    // ========================================================================

    /// Add a user overwrite. Returns None if one already exists.
    pub fn add_user_overwrite(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        command: &str,
        allow: bool,
    ) -> Result<Option<UserOverwriteRecord>> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO acl_user_overwrites (guild_id, user_id, command, allow, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![guild_id, user_id, command, allow as i32, now],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to add user overwrite: {}", e)))?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(UserOverwriteRecord {
            guild_id,
            user_id,
            command: command.to_string(),
            allow,
            created_at: now,
        }))
    }

    /// Get the user overwrite for (guild, user, command), if any.
    pub fn get_user_overwrite(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        command: &str,
    ) -> Result<Option<UserOverwriteRecord>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT guild_id, user_id, command, allow, created_at FROM acl_user_overwrites
             WHERE guild_id = ? AND user_id = ? AND command = ?",
            params![guild_id, user_id, command],
            |row| {
                Ok(UserOverwriteRecord {
                    guild_id: row.get(0)?,
                    user_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            },
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(e.to_string())),
        }
    }

    /// Get all user overwrites for a guild.
    pub fn get_user_overwrites(&self, guild_id: GuildId) -> Result<Vec<UserOverwriteRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, user_id, command, allow, created_at FROM acl_user_overwrites
                 WHERE guild_id = ? ORDER BY user_id, command",
            )
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(UserOverwriteRecord {
                    guild_id: row.get(0)?,
                    user_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let mut overwrites = Vec::new();
        for row in rows {
            overwrites.push(row.map_err(|e| Error::DatabaseError(e.to_string()))?);
        }
        Ok(overwrites)
    }

    /// Remove a user overwrite. Returns whether one existed.
    pub fn remove_user_overwrite(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        command: &str,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM acl_user_overwrites WHERE guild_id = ? AND user_id = ? AND command = ?",
                params![guild_id, user_id, command],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to remove user overwrite: {}", e)))?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // CHANNEL OVERWRITES
    // ========================================================================

    /// Add a channel overwrite. Returns None if one already exists.
    pub fn add_channel_overwrite(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        command: &str,
        allow: bool,
    ) -> Result<Option<ChannelOverwriteRecord>> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO acl_channel_overwrites (guild_id, channel_id, command, allow, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![guild_id, channel_id, command, allow as i32, now],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to add channel overwrite: {}", e)))?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(ChannelOverwriteRecord {
            guild_id,
            channel_id,
            command: command.to_string(),
            allow,
            created_at: now,
        }))
    }

    /// Get the channel overwrite for (guild, channel, command), if any.
    pub fn get_channel_overwrite(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        command: &str,
    ) -> Result<Option<ChannelOverwriteRecord>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT guild_id, channel_id, command, allow, created_at FROM acl_channel_overwrites
             WHERE guild_id = ? AND channel_id = ? AND command = ?",
            params![guild_id, channel_id, command],
            |row| {
                Ok(ChannelOverwriteRecord {
                    guild_id: row.get(0)?,
                    channel_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            },
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(e.to_string())),
        }
    }

    /// Get all channel overwrites for a guild.
    pub fn get_channel_overwrites(&self, guild_id: GuildId) -> Result<Vec<ChannelOverwriteRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, channel_id, command, allow, created_at FROM acl_channel_overwrites
                 WHERE guild_id = ? ORDER BY channel_id, command",
            )
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(ChannelOverwriteRecord {
                    guild_id: row.get(0)?,
                    channel_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let mut overwrites = Vec::new();
        for row in rows {
            overwrites.push(row.map_err(|e| Error::DatabaseError(e.to_string()))?);
        }
        Ok(overwrites)
    }

    /// Remove a channel overwrite. Returns whether one existed.
    pub fn remove_channel_overwrite(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        command: &str,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM acl_channel_overwrites
                 WHERE guild_id = ? AND channel_id = ? AND command = ?",
                params![guild_id, channel_id, command],
            )
            .map_err(|e| {
                Error::DatabaseError(format!("Failed to remove channel overwrite: {}", e))
            })?;
        Ok(deleted > 0)
    }

    // ========================================================================
    // ROLE OVERWRITES
    // ========================================================================

    /// Add a role overwrite. Returns None if one already exists.
    pub fn add_role_overwrite(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command: &str,
        allow: bool,
    ) -> Result<Option<RoleOverwriteRecord>> {
        let conn = self.conn.lock();
        let now = crate::time::now_timestamp();

        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO acl_role_overwrites (guild_id, role_id, command, allow, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![guild_id, role_id, command, allow as i32, now],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to add role overwrite: {}", e)))?;

        if inserted == 0 {
            return Ok(None);
        }
        Ok(Some(RoleOverwriteRecord {
            guild_id,
            role_id,
            command: command.to_string(),
            allow,
            created_at: now,
        }))
    }

    /// Get the role overwrite for (guild, role, command), if any.
    pub fn get_role_overwrite(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command: &str,
    ) -> Result<Option<RoleOverwriteRecord>> {
        let conn = self.conn.lock();
        let result = conn.query_row(
            "SELECT guild_id, role_id, command, allow, created_at FROM acl_role_overwrites
             WHERE guild_id = ? AND role_id = ? AND command = ?",
            params![guild_id, role_id, command],
            |row| {
                Ok(RoleOverwriteRecord {
                    guild_id: row.get(0)?,
                    role_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            },
        );
        match result {
            Ok(r) => Ok(Some(r)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Error::DatabaseError(e.to_string())),
        }
    }

    /// Get all role overwrites for a guild.
    pub fn get_role_overwrites(&self, guild_id: GuildId) -> Result<Vec<RoleOverwriteRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT guild_id, role_id, command, allow, created_at FROM acl_role_overwrites
                 WHERE guild_id = ? ORDER BY role_id, command",
            )
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![guild_id], |row| {
                Ok(RoleOverwriteRecord {
                    guild_id: row.get(0)?,
                    role_id: row.get(1)?,
                    command: row.get(2)?,
                    allow: row.get::<_, i32>(3)? != 0,
                    created_at: row.get(4)?,
                })
            })
            .map_err(|e| Error::DatabaseError(e.to_string()))?;

        let mut overwrites = Vec::new();
        for row in rows {
            overwrites.push(row.map_err(|e| Error::DatabaseError(e.to_string()))?);
        }
        Ok(overwrites)
    }

    /// Remove a role overwrite. Returns whether one existed.
    pub fn remove_role_overwrite(
        &self,
        guild_id: GuildId,
        role_id: RoleId,
        command: &str,
    ) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn
            .execute(
                "DELETE FROM acl_role_overwrites WHERE guild_id = ? AND role_id = ? AND command = ?",
                params![guild_id, role_id, command],
            )
            .map_err(|e| Error::DatabaseError(format!("Failed to remove role overwrite: {}", e)))?;
        Ok(deleted > 0)
    }
}

/// Convert a stored level name back to an [`AccessLevel`] inside a row
/// mapper.
fn parse_level(idx: usize, name: String) -> rusqlite::Result<AccessLevel> {
    AccessLevel::from_name(&name).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

// ============================================================================
// RECORD TYPES
// ============================================================================

/// A role-to-level mapping record
#[derive(Debug, Clone, Serialize)]
pub struct RoleMappingRecord {
    /// Guild the mapping belongs to
    pub guild_id: GuildId,
    /// Mapped role
    pub role_id: RoleId,
    /// Level members holding the role resolve to
    pub level: AccessLevel,
    /// When the mapping was created (Unix seconds)
    pub created_at: i64,
}

/// A per-guild command default record
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefaultRecord {
    /// Guild the default belongs to
    pub guild_id: GuildId,
    /// Qualified command name
    pub command: String,
    /// Level superseding the command's hardcoded baseline
    pub level: AccessLevel,
    /// When the default was created (Unix seconds)
    pub created_at: i64,
}

/// A user allow/deny overwrite record
#[derive(Debug, Clone, Serialize)]
pub struct UserOverwriteRecord {
    /// Guild the overwrite belongs to
    pub guild_id: GuildId,
    /// User the overwrite applies to
    pub user_id: UserId,
    /// Qualified command name
    pub command: String,
    /// true = allow, false = deny
    pub allow: bool,
    /// When the overwrite was created (Unix seconds)
    pub created_at: i64,
}

/// A channel allow/deny overwrite record
#[derive(Debug, Clone, Serialize)]
pub struct ChannelOverwriteRecord {
    /// Guild the overwrite belongs to
    pub guild_id: GuildId,
    /// Channel the overwrite applies to
    pub channel_id: ChannelId,
    /// Qualified command name
    pub command: String,
    /// true = allow, false = deny
    pub allow: bool,
    /// When the overwrite was created (Unix seconds)
    pub created_at: i64,
}

/// A role allow/deny overwrite record
#[derive(Debug, Clone, Serialize)]
pub struct RoleOverwriteRecord {
    /// Guild the overwrite belongs to
    pub guild_id: GuildId,
    /// Role the overwrite applies to
    pub role_id: RoleId,
    /// Qualified command name
    pub command: String,
    /// true = allow, false = deny
    pub allow: bool,
    /// When the overwrite was created (Unix seconds)
    pub created_at: i64,
}

// ============================================================================
// TESTS
// ============================================================================
