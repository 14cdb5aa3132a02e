//! # Palisade Core
//!
//! Guild-scoped access control for chat bots: layered permission
//! evaluation mapping an actor (user + roles) to an access level and
//! resolving the most specific override for each command invocation.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       PALISADE CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐    │
//! │  │   Levels    │  │  Resolver   │  │   Engine    │  │  Management  │    │
//! │  │             │  │             │  │             │  │              │    │
//! │  │ - Ordering  │  │ - Owner     │  │ - Overrides │  │ - Guards     │    │
//! │  │ - Lookup    │  │ - Role map  │  │ - Precedence│  │ - Listings   │    │
//! │  │ - Reserved  │  │ - TTL cache │  │ - Denials   │  │ - Export     │    │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘    │
//! │         │                │                │                │            │
//! │         └────────────────┴───────┬────────┴────────────────┘            │
//! │                                  │                                      │
//! │  ┌─────────────┐  ┌──────────────┴──┐  ┌─────────────────────────────┐  │
//! │  │  Directory  │  │     Storage     │  │        Embedder             │  │
//! │  │  (trait)    │  │                 │  │                             │  │
//! │  │             │  │ - SQLite        │◄─│ - Implements Directory      │  │
//! │  │ - Owners    │  │ - 5 tables      │  │ - Registers commands        │  │
//! │  │ - Roles     │  │ - One row per   │  │ - Calls check() on dispatch │  │
//! │  │             │  │   scope key     │  │                             │  │
//! │  └─────────────┘  └─────────────────┘  └─────────────────────────────┘  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`acl`] - Levels, resolver, decision engine, management API
//! - [`directory`] - The platform directory contract
//! - [`storage`] - The persistent override store (SQLite)
//! - [`time`] - Timestamp helpers
//!
//! ## Decision model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DECISION PRECEDENCE                                │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  0. No guild (direct message)          → allow                          │
//! │  1. Actor is bot owner                 → allow (absolute bypass)        │
//! │  2. Guild command default              → replaces required level        │
//! │  3. User overwrite                     → allow/deny, stop               │
//! │  4. Channel overwrite                  → allow/deny, stop               │
//! │  5. Role overwrite (priority order)    → allow/deny, stop               │
//! │  6. actor level >= required level      → allow, else deny               │
//! │                                                                         │
//! │  Denials are typed errors carrying the rule that fired; the             │
//! │  dispatch layer renders them, nothing here is fatal.                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use palisade_core::{AccessLevel, AclConfig, AclService, CommandRegistry, InvocationContext};
//!
//! let config = AclConfig::default();
//! let db = Arc::new(palisade_core::storage::init(&config).await?);
//!
//! let mut registry = CommandRegistry::new();
//! registry.register("ping", AccessLevel::Everyone)?;
//! registry.register("ban", AccessLevel::Mod)?;
//!
//! let service = AclService::new(db, directory, registry, &config);
//!
//! // In the dispatch hook:
//! let ctx = InvocationContext::guild(actor_id, guild_id, channel_id);
//! service.check(AccessLevel::Mod, &ctx, "ban")?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod acl;
pub mod directory;
pub mod error;
pub mod storage;
/// Timestamp helpers for stored rows.
pub mod time;

// ============================================================================
// ID ALIASES
// ============================================================================

/// Snowflake-style guild identifier.
pub type GuildId = i64;
/// Snowflake-style user identifier.
pub type UserId = i64;
/// Snowflake-style role identifier.
pub type RoleId = i64;
/// Snowflake-style channel identifier.
pub type ChannelId = i64;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use acl::{AccessLevel, AclService, CommandRegistry, InvocationContext};
pub use directory::Directory;
pub use error::{Error, Result};

// ============================================================================
// CONFIGURATION
// ============================================================================

use serde::Deserialize;

/// Configuration for the ACL service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AclConfig {
    /// Path to the override-store database file (None for in-memory)
    pub database_path: Option<String>,
    /// How long resolved actor levels are cached, in seconds
    pub cache_ttl_secs: u64,
}

impl Default for AclConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            cache_ttl_secs: 10,
        }
    }
}

// ============================================================================
// VERSION INFO
// ============================================================================

/// Returns the version of palisade-core
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================================
// TESTS
// ============================================================================
