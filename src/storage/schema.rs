//! # Database Schema
//!
//! SQL schema definitions for the override store.
//!
//! ## Schema Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         OVERRIDE STORE SCHEMA                           │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐                 │
//! │  │  acl_role_mappings   │      │ acl_command_defaults │                 │
//! │  ├──────────────────────┤      ├──────────────────────┤                 │
//! │  │ guild_id             │      │ guild_id             │                 │
//! │  │ role_id              │      │ command              │                 │
//! │  │ level                │      │ level                │                 │
//! │  └──────────────────────┘      └──────────────────────┘                 │
//! │                                                                         │
//! │  ┌──────────────────────┐ ┌──────────────────────┐ ┌─────────────────┐  │
//! │  │ acl_user_overwrites  │ │acl_channel_overwrites│ │acl_role_        │  │
//! │  ├──────────────────────┤ ├──────────────────────┤ │    overwrites   │  │
//! │  │ guild_id             │ │ guild_id             │ ├─────────────────┤  │
//! │  │ user_id              │ │ channel_id           │ │ guild_id        │  │
//! │  │ command              │ │ command              │ │ role_id         │  │
//! │  │ allow                │ │ allow                │ │ command         │  │
//! │  └──────────────────────┘ └──────────────────────┘ │ allow           │  │
//! │                                                    └─────────────────┘  │
//! │                                                                         │
//! │  Each table is keyed by its logical scope: one row per                  │
//! │  (guild, scope-id[, command]). Levels are stored as their               │
//! │  canonical names.                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL to create all tables
pub const CREATE_TABLES: &str = r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Role-to-level mappings
-- At most one mapping per (guild, role); a role without a mapping
-- contributes no level.
CREATE TABLE IF NOT EXISTS acl_role_mappings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id INTEGER NOT NULL,
    role_id INTEGER NOT NULL,
    -- Canonical level name (EVERYONE .. ADMIN)
    level TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (guild_id, role_id)
);
CREATE INDEX IF NOT EXISTS idx_acl_role_mappings_guild ON acl_role_mappings(guild_id);

-- Per-guild command defaults
-- Supersede a command's hardcoded baseline level.
CREATE TABLE IF NOT EXISTS acl_command_defaults (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id INTEGER NOT NULL,
    -- Qualified command name
    command TEXT NOT NULL,
    level TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (guild_id, command)
);
CREATE INDEX IF NOT EXISTS idx_acl_command_defaults_guild ON acl_command_defaults(guild_id);

-- Per-user allow/deny overwrites
CREATE TABLE IF NOT EXISTS acl_user_overwrites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id INTEGER NOT NULL,
    user_id INTEGER NOT NULL,
    command TEXT NOT NULL,
    -- 1 = allow, 0 = deny
    allow INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (guild_id, user_id, command)
);
CREATE INDEX IF NOT EXISTS idx_acl_user_overwrites_guild ON acl_user_overwrites(guild_id);

-- Per-channel allow/deny overwrites
CREATE TABLE IF NOT EXISTS acl_channel_overwrites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id INTEGER NOT NULL,
    channel_id INTEGER NOT NULL,
    command TEXT NOT NULL,
    allow INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (guild_id, channel_id, command)
);
CREATE INDEX IF NOT EXISTS idx_acl_channel_overwrites_guild ON acl_channel_overwrites(guild_id);

-- Per-role allow/deny overwrites
CREATE TABLE IF NOT EXISTS acl_role_overwrites (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    guild_id INTEGER NOT NULL,
    role_id INTEGER NOT NULL,
    command TEXT NOT NULL,
    allow INTEGER NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (guild_id, role_id, command)
);
CREATE INDEX IF NOT EXISTS idx_acl_role_overwrites_guild ON acl_role_overwrites(guild_id);
"#;
