//! # Access Control Module
//!
//! Layered permission evaluation for guild commands.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            ACL MODULE                                   │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────┐  ┌──────────────┐    │
//! │  │   Levels    │  │  Registry   │  │   Resolver  │  │    Engine    │    │
//! │  │             │  │             │  │             │  │              │    │
//! │  │ - Ordering  │  │ - Baselines │  │ - Bot owner │  │ - Overrides  │    │
//! │  │ - Names     │  │ - Audit     │  │ - Guild own │  │ - Precedence │    │
//! │  │ - Assignable│  │             │  │ - Role map  │  │ - Denials    │    │
//! │  └──────┬──────┘  └──────┬──────┘  └──────┬──────┘  └──────┬───────┘    │
//! │         │                │                │                │            │
//! │  ┌──────┴──────┐  ┌──────┴──────┐  ┌──────┴──────┐                      │
//! │  │   Cache     │  │ Introspect  │  │   Manage    │                      │
//! │  │             │  │             │  │             │                      │
//! │  │ - 10s TTL   │  │ - Effective │  │ - Guards    │                      │
//! │  │ - Fake clock│  │ - CanInvoke │  │ - Snapshot  │                      │
//! │  └─────────────┘  └─────────────┘  └─────────────┘                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Decision precedence
//!
//! For a guild invocation the engine applies, in order: bot-owner bypass,
//! user overwrite, channel overwrite, role overwrites (first role in
//! directory priority order wins), and finally the level comparison
//! against the required level (possibly replaced by a per-guild command
//! default). Direct messages are always allowed.

mod cache;
mod engine;
mod introspect;
mod levels;
mod manage;
mod registry;
mod resolver;
mod service;

pub use cache::{Clock, LevelCache, ManualClock, SystemClock};
pub use levels::AccessLevel;
pub use manage::GuildAclSnapshot;
pub use registry::CommandRegistry;
pub use service::{AclService, InvocationContext};
