//! Blueprint generation: turns interview answers into a stored bot persona.

use crate::extract::extract_json;
use crate::prompts::build_blueprint_prompt;
use botsmith_common::error::{Error, Result};
use botsmith_gateway::FallbackInvoker;
use botsmith_store::{BotBlueprint, ConversationStore};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Interview answers collected by the frontend.
#[derive(Debug, Clone, Deserialize)]
pub struct BlueprintRequest {
    pub business_name: String,
    pub business_description: String,
    pub desired_bot_role: String,
    #[serde(default)]
    pub target_audience: Option<String>,
    #[serde(default)]
    pub preferred_tone: Option<String>,
    #[serde(default = "default_language")]
    pub preferred_language: String,
}

fn default_language() -> String {
    "he".to_string()
}

impl BlueprintRequest {
    /// Enforce the interview minimums and normalize the language code.
    pub fn validate(&mut self) -> Result<()> {
        if self.business_name.trim().chars().count() < 2 {
            return Err(Error::InvalidInput(
                "business_name must be at least 2 characters".to_string(),
            ));
        }
        if self.business_description.trim().chars().count() < 20 {
            return Err(Error::InvalidInput(
                "business_description must be at least 20 characters".to_string(),
            ));
        }
        if self.desired_bot_role.trim().chars().count() < 10 {
            return Err(Error::InvalidInput(
                "desired_bot_role must be at least 10 characters".to_string(),
            ));
        }
        self.preferred_language = self.preferred_language.to_lowercase();
        Ok(())
    }
}

/// Generate a blueprint, persist it, and optionally bind the caller's session.
pub async fn create_bot_blueprint(
    store: &ConversationStore,
    invoker: &FallbackInvoker,
    mut request: BlueprintRequest,
    session_id: Option<&str>,
) -> Result<BotBlueprint> {
    request.validate()?;

    let prompt = build_blueprint_prompt(&request);
    let generated = invoker.generate(&prompt.into()).await.map_err(Error::from)?;

    let payload = extract_json(&generated.text).ok_or_else(|| {
        Error::External("Gemini response is not a valid JSON object".to_string())
    })?;
    if !payload.is_object() {
        return Err(Error::External(
            "Gemini response is not a valid JSON object".to_string(),
        ));
    }

    let blueprint = parse_blueprint_payload(&payload);
    store.save_blueprint(blueprint.clone());
    store.reset_history_for_bot(&blueprint.bot_id);
    if let Some(session) = session_id.filter(|s| !s.is_empty()) {
        store.assign_session(&blueprint.bot_id, session);
    }

    tracing::info!(bot_id = %blueprint.bot_id, model = %generated.model, "Blueprint created");
    Ok(blueprint)
}

/// Map the model's JSON payload to a blueprint, filling gaps with defaults.
fn parse_blueprint_payload(payload: &Value) -> BotBlueprint {
    BotBlueprint {
        bot_id: Uuid::new_v4().to_string(),
        bot_name: string_or(payload, "bot_name", "Custom AI Buddy"),
        tagline: string_or(payload, "tagline", "An assistant tailored to your business"),
        tone: string_or(payload, "tone", "friendly"),
        language: string_or(payload, "language", "he"),
        knowledge_base: string_list(payload, "knowledge_base"),
        system_prompt: string_or(payload, "system_prompt", "You are a helpful assistant."),
        sample_questions: string_list(payload, "sample_questions"),
        sample_responses: string_list(payload, "sample_responses"),
    }
}

fn string_or(payload: &Value, key: &str, default: &str) -> String {
    payload
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_string())
}

fn string_list(payload: &Value, key: &str) -> Vec<String> {
    payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use botsmith_gateway::{FailureKind, GenerateContent, ProviderFailure, TextGenerator};
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedGenerator {
        reply: std::result::Result<String, ProviderFailure>,
    }

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(
            &self,
            _model: &str,
            _content: &GenerateContent,
        ) -> std::result::Result<String, ProviderFailure> {
            self.reply.clone()
        }
    }

    fn invoker_with_reply(reply: &str) -> FallbackInvoker {
        FallbackInvoker::new(
            Arc::new(FixedGenerator {
                reply: Ok(reply.to_string()),
            }),
            vec!["gemini-2.0-flash".to_string()],
            Duration::from_secs(5),
        )
    }

    fn request() -> BlueprintRequest {
        BlueprintRequest {
            business_name: "Slice House".to_string(),
            business_description: "A neighborhood pizzeria serving seasonal menus".to_string(),
            desired_bot_role: "customer support and recommendations".to_string(),
            target_audience: None,
            preferred_tone: None,
            preferred_language: "EN".to_string(),
        }
    }

    #[test]
    fn validation_enforces_interview_minimums() {
        let mut short_name = request();
        short_name.business_name = "X".to_string();
        assert!(matches!(
            short_name.validate(),
            Err(Error::InvalidInput(_))
        ));

        let mut short_description = request();
        short_description.business_description = "too short".to_string();
        assert!(short_description.validate().is_err());

        let mut short_role = request();
        short_role.desired_bot_role = "sales".to_string();
        assert!(short_role.validate().is_err());
    }

    #[test]
    fn validation_lowercases_language() {
        let mut req = request();
        req.validate().unwrap();
        assert_eq!(req.preferred_language, "en");
    }

    #[tokio::test]
    async fn creates_blueprint_and_binds_session() {
        let store = ConversationStore::in_memory();
        let invoker = invoker_with_reply(
            r#"{"bot_name": "Slice Pal", "tagline": "Pizza help", "tone": "playful",
                "language": "en", "knowledge_base": ["menu"],
                "system_prompt": "Recommend pizzas.",
                "sample_questions": ["What is popular?"],
                "sample_responses": ["Try the margherita."]}"#,
        );

        let blueprint = create_bot_blueprint(&store, &invoker, request(), Some("sess-1"))
            .await
            .unwrap();

        assert_eq!(blueprint.bot_name, "Slice Pal");
        assert!(!blueprint.bot_id.is_empty());
        assert!(store.get_blueprint(&blueprint.bot_id).is_some());

        let (bound, turns) = store.get_session_state("sess-1");
        assert_eq!(bound.map(|b| b.bot_id), Some(blueprint.bot_id));
        assert!(turns.is_empty());
    }

    #[tokio::test]
    async fn missing_fields_fall_back_to_defaults() {
        let store = ConversationStore::in_memory();
        let invoker = invoker_with_reply(r#"{"bot_name": "Minimal"}"#);

        let blueprint = create_bot_blueprint(&store, &invoker, request(), None)
            .await
            .unwrap();

        assert_eq!(blueprint.bot_name, "Minimal");
        assert_eq!(blueprint.tagline, "An assistant tailored to your business");
        assert_eq!(blueprint.tone, "friendly");
        assert_eq!(blueprint.system_prompt, "You are a helpful assistant.");
        assert!(blueprint.knowledge_base.is_empty());
    }

    #[tokio::test]
    async fn fenced_reply_is_accepted() {
        let store = ConversationStore::in_memory();
        let invoker = invoker_with_reply("```json\n{\"bot_name\": \"Fenced\"}\n```");

        let blueprint = create_bot_blueprint(&store, &invoker, request(), None)
            .await
            .unwrap();
        assert_eq!(blueprint.bot_name, "Fenced");
    }

    #[tokio::test]
    async fn non_json_reply_is_an_external_error() {
        let store = ConversationStore::in_memory();
        let invoker = invoker_with_reply("I refuse to answer in JSON.");

        let err = create_bot_blueprint(&store, &invoker, request(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::External(_)));
    }

    #[tokio::test]
    async fn provider_failure_propagates_as_common_error() {
        let store = ConversationStore::in_memory();
        let invoker = FallbackInvoker::new(
            Arc::new(FixedGenerator {
                reply: Err(ProviderFailure {
                    model: "gemini-2.0-flash".to_string(),
                    message: "quota".to_string(),
                    status_code: Some(429),
                    kind: FailureKind::RateLimited,
                }),
            }),
            vec!["gemini-2.0-flash".to_string()],
            Duration::from_secs(5),
        );

        let err = create_bot_blueprint(&store, &invoker, request(), None)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 429);
    }
}
