//! # ACL Service
//!
//! Core service struct tying the collaborators together.

use std::sync::Arc;
use std::time::Duration;

use crate::directory::Directory;
use crate::storage::Database;
use crate::{AclConfig, ChannelId, GuildId, UserId};

use super::{CommandRegistry, LevelCache};

/// The access-control service — owns the decision engine, the actor level
/// resolver and the management API.
///
/// All collaborators are injected: the override store ([`Database`]), the
/// platform [`Directory`], and the [`CommandRegistry`] of declared
/// baselines. The service itself holds no other state than the resolved
/// level cache, so it can be shared freely behind an `Arc`.
pub struct AclService {
    db: Arc<Database>,
    directory: Arc<dyn Directory>,
    registry: CommandRegistry,
    cache: LevelCache,
}

impl AclService {
    /// Create a new ACL service backed by the given collaborators.
    pub fn new(
        db: Arc<Database>,
        directory: Arc<dyn Directory>,
        registry: CommandRegistry,
        config: &AclConfig,
    ) -> Self {
        Self::with_cache(
            db,
            directory,
            registry,
            LevelCache::new(Duration::from_secs(config.cache_ttl_secs)),
        )
    }

    /// Create a service with an explicit cache (e.g. one built around a
    /// test clock).
    pub fn with_cache(
        db: Arc<Database>,
        directory: Arc<dyn Directory>,
        registry: CommandRegistry,
        cache: LevelCache,
    ) -> Self {
        Self {
            db,
            directory,
            registry,
            cache,
        }
    }

    /// Get a reference to the underlying database.
    pub(crate) fn db(&self) -> &Database {
        &self.db
    }

    /// Get a reference to the platform directory.
    pub(crate) fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    /// The registry of declared command baselines.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// The resolved-level cache.
    pub fn cache(&self) -> &LevelCache {
        &self.cache
    }
}

/// Everything the engine needs to know about one command invocation.
///
/// Supplied per call by the dispatch layer. `guild` is `None` in a
/// direct-message context; `channel` may only be `None` when `guild` is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationContext {
    /// The invoking user
    pub actor: UserId,
    /// The guild the command was run in, if any
    pub guild: Option<GuildId>,
    /// The channel the command was run in, if any
    pub channel: Option<ChannelId>,
}

impl InvocationContext {
    /// A guild-scoped invocation.
    pub fn guild(actor: UserId, guild: GuildId, channel: ChannelId) -> Self {
        Self {
            actor,
            guild: Some(guild),
            channel: Some(channel),
        }
    }

    /// A direct-message invocation.
    pub fn direct(actor: UserId) -> Self {
        Self {
            actor,
            guild: None,
            channel: None,
        }
    }
}
