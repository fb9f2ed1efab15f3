//! Blueprint and conversation turn types.

use serde::{Deserialize, Serialize};

/// Speaker role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// End-user message
    User,
    /// Generated bot response
    Assistant,
}

impl TurnRole {
    /// String representation used in prompts and the snapshot.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a (bot, session) history.
///
/// Histories are append-only; ordering is insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Structured definition of a generated bot.
///
/// `bot_id` is assigned at creation and immutable thereafter; saving a
/// blueprint with an existing id overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotBlueprint {
    pub bot_id: String,
    pub bot_name: String,
    pub tagline: String,
    pub tone: String,
    pub language: String,
    pub knowledge_base: Vec<String>,
    pub system_prompt: String,
    pub sample_questions: Vec<String>,
    pub sample_responses: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TurnRole::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&TurnRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn turn_role_as_str_matches_serde() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role.as_str()));
        }
    }

    #[test]
    fn chat_turn_roundtrips() {
        let turn = ChatTurn::assistant("hello");
        let json = serde_json::to_string(&turn).unwrap();
        let back: ChatTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, back);
    }
}
