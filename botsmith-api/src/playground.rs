//! Playground chat: sends a session's message through the invoker and
//! persists the exchange.

use crate::prompts::build_playground_messages;
use botsmith_common::error::{Error, Result};
use botsmith_gateway::{FallbackInvoker, GenerateContent};
use botsmith_store::{ChatTurn, ConversationStore};

/// Generate a reply for a (bot, session) and record both turns.
///
/// The stored history plus the new message travel to the provider as
/// role-tagged messages behind the bot's persona instructions. Turns are
/// appended only after a non-empty reply comes back, so a failed call
/// leaves the history untouched.
pub async fn chat_with_bot(
    store: &ConversationStore,
    invoker: &FallbackInvoker,
    bot_id: &str,
    session_id: &str,
    user_message: &str,
) -> Result<String> {
    let message = user_message.trim();
    if message.is_empty() {
        return Err(Error::InvalidInput("content must not be empty".to_string()));
    }

    let blueprint = store
        .get_blueprint(bot_id)
        .ok_or_else(|| Error::NotFound(format!("Bot with id {bot_id} was not found")))?;

    store.assign_session(bot_id, session_id);
    let turns = store.get_history(bot_id, session_id);

    let content = GenerateContent::Messages(build_playground_messages(&blueprint, &turns, message));
    let generated = invoker.generate(&content).await.map_err(Error::from)?;

    let reply = generated.text.trim().to_string();
    if reply.is_empty() {
        return Err(Error::External("Gemini returned an empty response".to_string()));
    }

    store.append_turn(bot_id, session_id, ChatTurn::user(message));
    store.append_turn(bot_id, session_id, ChatTurn::assistant(&reply));

    tracing::debug!(bot_id, session_id, model = %generated.model, "Playground reply recorded");
    Ok(reply)
}
