//! # Command Registry
//!
//! Commands declare their baseline access level here at startup. The
//! introspection helpers read the registry instead of inspecting command
//! source, so the declared level is available without any reflection.
//!
//! Commands that exist but opt out of access control register without a
//! baseline; the management API knows them but refuses to create
//! overrides for them.

use std::collections::HashMap;

use crate::error::{Error, Result};

use super::AccessLevel;

/// Registry of command baseline levels, populated once at startup.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    levels: HashMap<String, Option<AccessLevel>>,
}

impl CommandRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command's declared baseline level.
    ///
    /// Registering the same qualified name again replaces the previous
    /// entry (registration happens once at startup; last wins).
    /// `UNKNOWN` is not a valid baseline.
    pub fn register(&mut self, name: impl Into<String>, level: AccessLevel) -> Result<()> {
        if level == AccessLevel::Unknown {
            return Err(Error::ReservedLevel(level));
        }
        self.levels.insert(name.into(), Some(level));
        Ok(())
    }

    /// Register a command that does not participate in access control.
    ///
    /// The command is known (listings include it, management recognizes
    /// the name) but has no baseline, so overrides cannot be created for
    /// it.
    pub fn register_ungoverned(&mut self, name: impl Into<String>) {
        self.levels.insert(name.into(), None);
    }

    /// The declared baseline level of a command, if it has one.
    pub fn hardcoded_level(&self, name: &str) -> Option<AccessLevel> {
        self.levels.get(name).copied().flatten()
    }

    /// Whether a command is known to the registry (governed or not).
    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(name)
    }

    /// Iterate all registered commands and their baselines (for audit
    /// listings; unordered, `None` for ungoverned commands).
    pub fn commands(&self) -> impl Iterator<Item = (&str, Option<AccessLevel>)> + '_ {
        self.levels.iter().map(|(name, level)| (name.as_str(), *level))
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
