//! Prompt construction for the blueprint and playground flows.

use crate::blueprint::BlueprintRequest;
use botsmith_gateway::ChatMessage;
use botsmith_store::{BotBlueprint, ChatTurn};

/// Prompt for the blueprint generation call. Asks for minified JSON
/// matching the `BotBlueprint` payload schema.
pub fn build_blueprint_prompt(request: &BlueprintRequest) -> String {
    let target_audience = request
        .target_audience
        .as_deref()
        .unwrap_or("not specified");
    let preferred_tone = request
        .preferred_tone
        .as_deref()
        .unwrap_or("balanced professional");

    format!(
        r#"You are an expert AI product designer.
Given the following business context, craft a detailed persona and system prompt for a
custom chatbot. Respond ONLY with minified JSON following this schema:
{{
  "bot_name": "string",
  "tagline": "string",
  "tone": "string",
  "language": "string",
  "knowledge_base": ["string"],
  "system_prompt": "string",
  "sample_questions": ["string"],
  "sample_responses": ["string"]
}}
Avoid markdown fences. Be concise but vivid.

Business name: {business_name}
Business description: {business_description}
Desired bot role: {desired_bot_role}
Target audience: {target_audience}
Preferred tone: {preferred_tone}
Preferred language: {preferred_language}
"#,
        business_name = request.business_name,
        business_description = request.business_description,
        desired_bot_role = request.desired_bot_role,
        preferred_language = request.preferred_language,
    )
}

/// Persona instructions for the playground chat call.
///
/// History is not embedded here; it travels as role-tagged messages (see
/// [`build_playground_messages`]).
pub fn build_persona_prompt(bot: &BotBlueprint) -> String {
    format!(
        r#"You are now acting as {bot_name}, a bespoke AI assistant.
Persona mission: {tagline}
Tone of voice: {tone}
Language: {language}

System instructions:
{system_prompt}

Guidelines:
- Respond naturally in {language}.
- Maintain the persona above.
- Offer concrete suggestions or questions that move the user toward their goal.
- Keep responses under 180 words unless the user explicitly requests more detail.
"#,
        bot_name = bot.bot_name,
        tagline = bot.tagline,
        tone = bot.tone,
        language = bot.language,
        system_prompt = bot.system_prompt,
    )
}

/// Full message sequence for a playground call: persona instructions
/// first, then the stored history, then the latest user message.
pub fn build_playground_messages(
    bot: &BotBlueprint,
    turns: &[ChatTurn],
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(turns.len() + 2);
    messages.push(ChatMessage::new("user", build_persona_prompt(bot)));
    for turn in turns {
        messages.push(ChatMessage::new(turn.role.as_str(), turn.content.clone()));
    }
    messages.push(ChatMessage::new("user", user_message));
    messages
}
