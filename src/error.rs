//! # Error Handling
//!
//! Error types for palisade-core.
//!
//! ## Error Hierarchy
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           ERROR HIERARCHY                               │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  Error (top-level)                                                      │
//! │  │                                                                      │
//! │  ├── Level Errors                                                       │
//! │  │   ├── UnknownLevel           - Name not in the level registry        │
//! │  │   └── ReservedLevel          - Level cannot be assigned              │
//! │  │                                                                      │
//! │  ├── Denials (expected outcomes of a permission check)                  │
//! │  │   ├── NegativeUserOverwrite    - Deny rule matched the user          │
//! │  │   ├── NegativeChannelOverwrite - Deny rule matched the channel       │
//! │  │   ├── NegativeRoleOverwrite    - Deny rule matched a role            │
//! │  │   └── InsufficientLevel        - Actor's level below required        │
//! │  │                                                                      │
//! │  ├── Management Errors                                                  │
//! │  │   ├── UnknownCommand         - Command not registered                │
//! │  │   ├── CommandNotManaged      - Command outside ACL control           │
//! │  │   ├── CannotAlterCommand     - Actor cannot invoke the command       │
//! │  │   ├── EscalationDenied       - Actor's level too low to manage       │
//! │  │   └── GuildRequired          - Operation needs a guild context       │
//! │  │                                                                      │
//! │  ├── Directory Errors                                                   │
//! │  │   └── GuildNotFound          - Guild unknown to the directory        │
//! │  │                                                                      │
//! │  └── Storage Errors                                                     │
//! │      ├── DatabaseError          - SQLite-level failure                  │
//! │      └── SerializationError     - JSON encode/decode failure            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Denials are *expected, recoverable* outcomes: the dispatch layer catches
//! them and renders a precise message from the carried scope data. Nothing
//! in this crate is fatal to the host process, and no error here warrants a
//! retry — a permission decision is deterministic for a given store state.

use thiserror::Error;

use crate::acl::AccessLevel;
use crate::{ChannelId, GuildId, RoleId, UserId};

/// Result type alias for palisade-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for palisade-core
///
/// All errors are categorized by module/domain to make error handling
/// clearer and to provide meaningful error messages to users.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Level Errors (100-199)
    // ========================================================================

    /// A level name does not exist in the registry
    #[error("Unknown access level '{0}'.")]
    UnknownLevel(String),

    /// The level is reserved and cannot be assigned
    #[error("Level {0} is reserved and cannot be assigned.")]
    ReservedLevel(AccessLevel),

    // ========================================================================
    // Denials (200-299)
    // ========================================================================

    /// Invocation was blocked by a negative user overwrite
    #[error("Invocation was blocked based on a user rule.")]
    NegativeUserOverwrite {
        /// The user the deny rule matched
        user_id: UserId,
    },

    /// Invocation was blocked by a negative channel overwrite
    #[error("Invocation was blocked based on channel {channel_id}.")]
    NegativeChannelOverwrite {
        /// The channel the deny rule matched
        channel_id: ChannelId,
    },

    /// Invocation was blocked by a negative role overwrite
    #[error("Invocation was blocked based on role {role_id}.")]
    NegativeRoleOverwrite {
        /// The role the deny rule matched
        role_id: RoleId,
    },

    /// No explicit rule matched and the actor's level is below the required one
    #[error("You need access permissions at least at level {required}. You only have {actual}.")]
    InsufficientLevel {
        /// Level the command requires (after any command default override)
        required: AccessLevel,
        /// Level the actor actually resolved to
        actual: AccessLevel,
    },

    // ========================================================================
    // Management Errors (300-399)
    // ========================================================================

    /// The command is not present in the command registry
    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),

    /// The command has no declared baseline and cannot be controlled by ACL
    #[error("Command '{0}' can't be controlled by access control.")]
    CommandNotManaged(String),

    /// The actor cannot invoke the command, so they may not alter its permissions
    #[error("You don't have permission to run command '{0}', so you can't alter its permissions.")]
    CannotAlterCommand(String),

    /// The actor's level is too low to manage the given level
    #[error("Your access level has to be higher than {level} (you have {actual}).")]
    EscalationDenied {
        /// Level being assigned or removed
        level: AccessLevel,
        /// The managing actor's resolved level
        actual: AccessLevel,
    },

    /// A management operation was attempted outside a guild
    #[error("This operation requires a guild context.")]
    GuildRequired,

    // ========================================================================
    // Directory Errors (400-499)
    // ========================================================================

    /// The directory has no record of the guild
    #[error("Guild {0} was not found in the directory.")]
    GuildNotFound(GuildId),

    // ========================================================================
    // Storage Errors (500-599)
    // ========================================================================

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Get the numeric error code
    ///
    /// Error codes are organized by category:
    /// - 100-199: Levels
    /// - 200-299: Denials
    /// - 300-399: Management
    /// - 400-499: Directory
    /// - 500-599: Storage
    pub fn code(&self) -> i32 {
        match self {
            // Levels (100-199)
            Error::UnknownLevel(_) => 100,
            Error::ReservedLevel(_) => 101,

            // Denials (200-299)
            Error::NegativeUserOverwrite { .. } => 200,
            Error::NegativeChannelOverwrite { .. } => 201,
            Error::NegativeRoleOverwrite { .. } => 202,
            Error::InsufficientLevel { .. } => 203,

            // Management (300-399)
            Error::UnknownCommand(_) => 300,
            Error::CommandNotManaged(_) => 301,
            Error::CannotAlterCommand(_) => 302,
            Error::EscalationDenied { .. } => 303,
            Error::GuildRequired => 304,

            // Directory (400-499)
            Error::GuildNotFound(_) => 400,

            // Storage (500-599)
            Error::DatabaseError(_) => 500,
            Error::SerializationError(_) => 501,
        }
    }

    /// Check if this error is a permission denial
    ///
    /// Denials are the expected negative outcomes of a permission check.
    /// [`can_invoke`](crate::acl::AclService::can_invoke) converts them to
    /// `false`; everything else (storage, directory failures) propagates.
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            Error::NegativeUserOverwrite { .. }
                | Error::NegativeChannelOverwrite { .. }
                | Error::NegativeRoleOverwrite { .. }
                | Error::InsufficientLevel { .. }
        )
    }
}

// ============================================================================
// ERROR CONVERSIONS
// ============================================================================

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(err.to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(Error::UnknownLevel("WIZARD".into()).code(), 100);
        assert_eq!(Error::NegativeUserOverwrite { user_id: 1 }.code(), 200);
        assert_eq!(Error::UnknownCommand("ping".into()).code(), 300);
        assert_eq!(Error::GuildNotFound(1).code(), 400);
        assert_eq!(Error::DatabaseError("test".into()).code(), 500);
    }

    #[test]
    fn test_denial_classification() {
        assert!(Error::NegativeUserOverwrite { user_id: 1 }.is_denial());
        assert!(Error::NegativeChannelOverwrite { channel_id: 2 }.is_denial());
        assert!(Error::NegativeRoleOverwrite { role_id: 3 }.is_denial());
        assert!(
            Error::InsufficientLevel {
                required: AccessLevel::Mod,
                actual: AccessLevel::Everyone,
            }
            .is_denial()
        );

        assert!(!Error::UnknownLevel("WIZARD".into()).is_denial());
        assert!(!Error::GuildRequired.is_denial());
        assert!(!Error::DatabaseError("test".into()).is_denial());
    }

    #[test]
    fn test_insufficient_level_message() {
        let err = Error::InsufficientLevel {
            required: AccessLevel::Mod,
            actual: AccessLevel::Everyone,
        };
        let message = err.to_string();
        assert!(message.contains("MOD"));
        assert!(message.contains("EVERYONE"));
    }
}
