//! # Storage Module
//!
//! Persistent storage for the override store.
//!
//! ## Storage Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         STORAGE SYSTEM                                  │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │  SQLite Database                                                │    │
//! │  │  ───────────────                                                │    │
//! │  │                                                                 │    │
//! │  │  Tables:                                                        │    │
//! │  │  • acl_role_mappings     - role → level mappings                │    │
//! │  │  • acl_command_defaults  - per-guild command level overrides    │    │
//! │  │  • acl_user_overwrites   - per-user allow/deny rules            │    │
//! │  │  • acl_channel_overwrites- per-channel allow/deny rules         │    │
//! │  │  • acl_role_overwrites   - per-role allow/deny rules            │    │
//! │  │                                                                 │    │
//! │  │  One row per logical scope key; duplicate adds are reported     │    │
//! │  │  as None, removals as bool.                                     │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod database;
mod schema;

pub use database::{
    ChannelOverwriteRecord, CommandDefaultRecord, Database, RoleMappingRecord,
    RoleOverwriteRecord, UserOverwriteRecord,
};

use crate::error::Result;

/// Initialize the storage system from crate configuration.
pub async fn init(config: &crate::AclConfig) -> Result<Database> {
    Database::open(config.database_path.as_deref()).await
}

#[cfg(test)]
mod tests {
    use crate::AclConfig;

    #[tokio::test]
    async fn test_init_honors_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acl.db");

        let config = AclConfig {
            database_path: Some(path.to_str().unwrap().to_string()),
            ..AclConfig::default()
        };
        let _db = super::init(&config).await.unwrap();
        assert!(path.exists());
    }
}
