//! Bounded, multi-tenant conversation storage for Botsmith.
//!
//! The [`ConversationStore`] owns three pieces of state:
//! - blueprints, keyed by bot id
//! - a global session → bot binding map
//! - per-(bot, session) turn histories, ordered by session recency
//!
//! Two independent capacity limits are enforced silently by eviction:
//! the number of bound sessions per bot (least-recently-touched session
//! evicted first) and the number of retained turns per session (oldest
//! turns dropped first).
//!
//! When constructed with a backing path, every mutating call rewrites the
//! whole state as one JSON snapshot before returning; on construction an
//! existing snapshot is read back. A missing or undecodable snapshot
//! yields an empty store.

#![warn(clippy::all)]

pub mod recency;
pub mod snapshot;
pub mod store;
pub mod types;

pub use recency::RecencyMap;
pub use snapshot::Snapshot;
pub use store::{ConversationStore, StoreConfig};
pub use types::{BotBlueprint, ChatTurn, TurnRole};
