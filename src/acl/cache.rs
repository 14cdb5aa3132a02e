//! # Resolved-Level Cache
//!
//! A small expiring map for actor level resolutions.
//!
//! Role membership can change at any time while guild ownership is
//! effectively static, so instead of wiring invalidation hooks into the
//! platform the resolver caches each `(guild, user)` result for a short
//! TTL (10 seconds by default). Staleness inside the window is an accepted
//! trade-off, not a bug; callers that do observe a role change may evict
//! early with [`LevelCache::invalidate`].
//!
//! The clock is injectable so tests can drive expiry deterministically.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};

use crate::{GuildId, UserId};

use super::AccessLevel;

/// Time source for the cache.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// The real clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A hand-driven clock for tests: time only moves when
/// [`ManualClock::advance`] is called.
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.start + *self.offset.lock()
    }
}

struct CacheEntry {
    level: AccessLevel,
    cached_at: Instant,
}

/// Expiring map of resolved actor levels, keyed by `(guild, user)`.
///
/// There are no cross-entry invariants: concurrent readers and writers
/// only need map-level exclusion, and two racing resolutions for the same
/// key are harmless (last write wins).
pub struct LevelCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<(GuildId, UserId), CacheEntry>>,
}

impl LevelCache {
    /// Create a cache with the given TTL and the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock.
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Look up a fresh entry. Expired entries are ignored (and removed
    /// lazily by [`purge_expired`](Self::purge_expired) or the next
    /// insert for the key).
    pub fn get(&self, guild_id: GuildId, user_id: UserId) -> Option<AccessLevel> {
        let entries = self.entries.read();
        let entry = entries.get(&(guild_id, user_id))?;
        if self.clock.now().duration_since(entry.cached_at) < self.ttl {
            Some(entry.level)
        } else {
            None
        }
    }

    /// Store a resolution, replacing any previous entry for the key.
    pub fn insert(&self, guild_id: GuildId, user_id: UserId, level: AccessLevel) {
        let entry = CacheEntry {
            level,
            cached_at: self.clock.now(),
        };
        self.entries.write().insert((guild_id, user_id), entry);
    }

    /// Evict a single entry before its TTL runs out.
    pub fn invalidate(&self, guild_id: GuildId, user_id: UserId) {
        self.entries.write().remove(&(guild_id, user_id));
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Drop all expired entries.
    pub fn purge_expired(&self) {
        let now = self.clock.now();
        self.entries
            .write()
            .retain(|_, entry| now.duration_since(entry.cached_at) < self.ttl);
    }

    /// Number of entries currently held (including expired ones that have
    /// not been purged yet).
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn manual_cache(ttl_secs: u64) -> (LevelCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = LevelCache::with_clock(Duration::from_secs(ttl_secs), clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_insert_and_get() {
        let (cache, _clock) = manual_cache(10);
        assert!(cache.get(1, 2).is_none());

        cache.insert(1, 2, AccessLevel::Mod);
        assert_eq!(cache.get(1, 2), Some(AccessLevel::Mod));

        // Same user in another guild is a different key
        assert!(cache.get(9, 2).is_none());
    }

    #[test]
    fn test_entries_expire_after_ttl() {
        let (cache, clock) = manual_cache(10);
        cache.insert(1, 2, AccessLevel::Mod);

        clock.advance(Duration::from_secs(9));
        assert_eq!(cache.get(1, 2), Some(AccessLevel::Mod));

        clock.advance(Duration::from_secs(2));
        assert!(cache.get(1, 2).is_none());
    }

    #[test]
    fn test_insert_replaces_entry() {
        let (cache, clock) = manual_cache(10);
        cache.insert(1, 2, AccessLevel::Member);

        clock.advance(Duration::from_secs(8));
        cache.insert(1, 2, AccessLevel::Admin);

        // The replacement also refreshed the timestamp
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get(1, 2), Some(AccessLevel::Admin));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let (cache, _clock) = manual_cache(10);
        cache.insert(1, 2, AccessLevel::Mod);
        cache.insert(1, 3, AccessLevel::Member);

        cache.invalidate(1, 2);
        assert!(cache.get(1, 2).is_none());
        assert_eq!(cache.get(1, 3), Some(AccessLevel::Member));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let (cache, clock) = manual_cache(10);
        cache.insert(1, 2, AccessLevel::Mod);
        clock.advance(Duration::from_secs(11));
        cache.insert(1, 3, AccessLevel::Member);

        assert_eq!(cache.len(), 2);
        cache.purge_expired();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1, 3), Some(AccessLevel::Member));
    }
}
