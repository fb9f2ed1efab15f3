//! JSON-snapshot-backed storage for blueprints, sessions, and histories.

use crate::recency::RecencyMap;
use crate::snapshot::Snapshot;
use crate::types::{BotBlueprint, ChatTurn};
use botsmith_common::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

/// Construction parameters for a [`ConversationStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Snapshot file path. `None` keeps the store memory-only.
    pub path: Option<PathBuf>,
    /// Maximum bound sessions per bot before LRU eviction.
    pub max_sessions_per_bot: usize,
    /// Maximum retained turns per (bot, session) history.
    pub max_turns_per_session: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_sessions_per_bot: 50,
            max_turns_per_session: 40,
        }
    }
}

impl StoreConfig {
    pub fn from_settings(settings: &botsmith_common::Settings) -> Self {
        Self {
            path: settings.store_path.clone(),
            max_sessions_per_bot: settings.max_sessions_per_bot,
            max_turns_per_session: settings.max_turns_per_session,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    blueprints: HashMap<String, BotBlueprint>,
    history: HashMap<String, RecencyMap<String, Vec<ChatTurn>>>,
    sessions: HashMap<String, String>,
}

/// Conversation store shared by all request handlers.
///
/// One mutex serializes every operation, including the synchronous snapshot
/// write, so a caller observing a completed mutation is guaranteed the
/// durable copy (if backed) reflects it. Operations never fail on capacity
/// limits (they evict) or on snapshot problems (they reset or log).
pub struct ConversationStore {
    path: Option<PathBuf>,
    max_sessions_per_bot: usize,
    max_turns_per_session: usize,
    inner: Mutex<StoreInner>,
}

impl ConversationStore {
    /// Create a store, reading back an existing snapshot when backed.
    ///
    /// A missing snapshot file yields an empty store. An unreadable or
    /// undecodable snapshot also yields an empty store; the condition is
    /// logged at warn level but never fails construction. The only error
    /// conditions are non-positive capacity limits and an uncreatable
    /// parent directory for the backing path.
    pub fn new(config: StoreConfig) -> Result<Self> {
        if config.max_sessions_per_bot == 0 || config.max_turns_per_session == 0 {
            return Err(Error::Config(
                "Storage limits must be positive integers".to_string(),
            ));
        }

        if let Some(ref path) = config.path {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let inner = config.path.as_ref().map_or_else(StoreInner::default, |path| {
            Self::load_snapshot(path)
        });

        Ok(Self {
            path: config.path,
            max_sessions_per_bot: config.max_sessions_per_bot,
            max_turns_per_session: config.max_turns_per_session,
            inner: Mutex::new(inner),
        })
    }

    /// Create a memory-only store with the default caps.
    pub fn in_memory() -> Self {
        let config = StoreConfig::default();
        Self {
            path: None,
            max_sessions_per_bot: config.max_sessions_per_bot,
            max_turns_per_session: config.max_turns_per_session,
            inner: Mutex::new(StoreInner::default()),
        }
    }

    fn load_snapshot(path: &PathBuf) -> StoreInner {
        if !path.exists() {
            return StoreInner::default();
        }

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Snapshot unreadable, starting empty");
                return StoreInner::default();
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => StoreInner {
                blueprints: snapshot.blueprints,
                history: snapshot.history,
                sessions: snapshot.sessions,
            },
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "Snapshot undecodable, starting empty");
                StoreInner::default()
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite the whole state to the backing path, if any.
    ///
    /// Write failures are logged and swallowed; mutations stay visible in
    /// memory either way.
    fn persist_locked(&self, inner: &StoreInner) {
        let Some(ref path) = self.path else {
            return;
        };

        let snapshot = Snapshot {
            blueprints: inner.blueprints.clone(),
            history: inner.history.clone(),
            sessions: inner.sessions.clone(),
        };

        let payload = match serde_json::to_string_pretty(&snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "Snapshot encode failed");
                return;
            }
        };

        if let Err(err) = std::fs::write(path, payload) {
            tracing::error!(path = %path.display(), %err, "Snapshot write failed");
        }
    }

    // ------------------------------------------------------------------
    // Blueprints
    // ------------------------------------------------------------------

    /// Upsert a blueprint by its `bot_id`, ensuring a session map exists.
    pub fn save_blueprint(&self, blueprint: BotBlueprint) {
        let mut inner = self.lock();
        inner
            .history
            .entry(blueprint.bot_id.clone())
            .or_default();
        inner
            .blueprints
            .insert(blueprint.bot_id.clone(), blueprint);
        self.persist_locked(&inner);
    }

    pub fn get_blueprint(&self, bot_id: &str) -> Option<BotBlueprint> {
        self.lock().blueprints.get(bot_id).cloned()
    }

    // ------------------------------------------------------------------
    // Session association
    // ------------------------------------------------------------------

    /// Bind or refresh a session under a bot. No-op for empty session ids.
    ///
    /// A session bound to a different bot is detached from it first (its
    /// turn history there is discarded). The session becomes the bot's
    /// most-recently-touched; if the bot then exceeds its session cap, the
    /// least-recently-touched session is evicted and unbound.
    pub fn assign_session(&self, bot_id: &str, session_id: &str) {
        if session_id.is_empty() {
            return;
        }

        let mut inner = self.lock();

        if let Some(previous_bot) = inner.sessions.get(session_id).cloned() {
            if previous_bot != bot_id {
                if let Some(previous_sessions) = inner.history.get_mut(&previous_bot) {
                    previous_sessions.remove(&session_id.to_string());
                }
            }
        }

        inner
            .sessions
            .insert(session_id.to_string(), bot_id.to_string());

        let bot_sessions = inner.history.entry(bot_id.to_string()).or_default();
        if !bot_sessions.touch(&session_id.to_string()) {
            bot_sessions.insert(session_id.to_string(), Vec::new());
        }

        self.trim_sessions_for_bot(&mut inner, bot_id);
        self.persist_locked(&inner);
    }

    /// Resolve a session to its bot's blueprint and its turn history.
    ///
    /// Unbound sessions yield `(None, [])`. The returned turns are a copy.
    pub fn get_session_state(&self, session_id: &str) -> (Option<BotBlueprint>, Vec<ChatTurn>) {
        let inner = self.lock();
        let Some(bot_id) = inner.sessions.get(session_id) else {
            return (None, Vec::new());
        };

        let blueprint = inner.blueprints.get(bot_id).cloned();
        let turns = inner
            .history
            .get(bot_id)
            .and_then(|sessions| sessions.get(&session_id.to_string()))
            .cloned()
            .unwrap_or_default();
        (blueprint, turns)
    }

    // ------------------------------------------------------------------
    // Conversation history
    // ------------------------------------------------------------------

    /// Clear every session's turn history for a bot.
    ///
    /// Used when a blueprint is regenerated under the same id. Bindings in
    /// the global session map are left in place: a bound session simply
    /// has no turns until it speaks again.
    pub fn reset_history_for_bot(&self, bot_id: &str) {
        let mut inner = self.lock();
        if let Some(sessions) = inner.history.get_mut(bot_id) {
            sessions.clear();
        }
        self.persist_locked(&inner);
    }

    /// Append a turn to the (bot, session) history.
    ///
    /// Oldest turns are dropped from the front once the turn cap is
    /// exceeded, and the session becomes the bot's most-recently-touched.
    pub fn append_turn(&self, bot_id: &str, session_id: &str, turn: ChatTurn) {
        let mut inner = self.lock();
        let cap = self.max_turns_per_session;

        let bot_sessions = inner.history.entry(bot_id.to_string()).or_default();
        let key = session_id.to_string();
        if bot_sessions.get(&key).is_none() {
            bot_sessions.insert(key.clone(), Vec::new());
        }

        if let Some(turns) = bot_sessions.get_mut(&key) {
            turns.push(turn);
            if turns.len() > cap {
                let excess = turns.len() - cap;
                turns.drain(..excess);
            }
        }

        bot_sessions.touch(&key);
        self.persist_locked(&inner);
    }

    /// Ordered turn history for a (bot, session), as a copy.
    pub fn get_history(&self, bot_id: &str, session_id: &str) -> Vec<ChatTurn> {
        self.lock()
            .history
            .get(bot_id)
            .and_then(|sessions| sessions.get(&session_id.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Utilities (primarily for tests/admin tasks)
    // ------------------------------------------------------------------

    /// Wipe all state and delete the backing snapshot, if any.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.blueprints.clear();
        inner.history.clear();
        inner.sessions.clear();

        if let Some(ref path) = self.path {
            if path.exists() {
                if let Err(err) = std::fs::remove_file(path) {
                    tracing::warn!(path = %path.display(), %err, "Snapshot delete failed");
                }
            }
        }
    }

    fn trim_sessions_for_bot(&self, inner: &mut StoreInner, bot_id: &str) {
        let Some(bot_sessions) = inner.history.get_mut(bot_id) else {
            return;
        };

        while bot_sessions.len() > self.max_sessions_per_bot {
            if let Some((evicted, _)) = bot_sessions.pop_oldest() {
                inner.sessions.remove(&evicted);
                tracing::debug!(bot_id, session_id = %evicted, "Evicted least-recently-touched session");
            }
        }
    }
}
