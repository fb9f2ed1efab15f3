//! Snapshot document written to the backing path.

use crate::recency::RecencyMap;
use crate::types::{BotBlueprint, ChatTurn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Whole-state snapshot of a [`ConversationStore`](crate::ConversationStore).
///
/// `history` nests per-bot session maps in recency order (least-recently-
/// touched session first), so reloading a snapshot restores eviction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// bot_id → blueprint
    #[serde(default)]
    pub blueprints: HashMap<String, BotBlueprint>,
    /// bot_id → (session_id → turns), sessions in recency order
    #[serde(default)]
    pub history: HashMap<String, RecencyMap<String, Vec<ChatTurn>>>,
    /// session_id → bot_id
    #[serde(default)]
    pub sessions: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_decodes_to_empty_snapshot() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.blueprints.is_empty());
        assert!(snapshot.history.is_empty());
        assert!(snapshot.sessions.is_empty());
    }

    #[test]
    fn snapshot_roundtrips() {
        let mut snapshot = Snapshot::default();
        snapshot
            .sessions
            .insert("sess-1".to_string(), "bot-1".to_string());
        let mut sessions = RecencyMap::new();
        sessions.insert("sess-1".to_string(), vec![ChatTurn::user("hi")]);
        snapshot.history.insert("bot-1".to_string(), sessions);

        let json = serde_json::to_string_pretty(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
