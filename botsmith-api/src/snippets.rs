//! Copy-paste ready embed snippets for a bot blueprint.

use botsmith_common::error::{Error, Result};
use botsmith_store::BotBlueprint;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Target language for a generated snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnippetLanguage {
    #[serde(rename = "py")]
    Py,
    #[serde(rename = "js")]
    Js,
}

impl SnippetLanguage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Py => "py",
            Self::Js => "js",
        }
    }
}

impl FromStr for SnippetLanguage {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw {
            "py" => Ok(Self::Py),
            "js" => Ok(Self::Js),
            other => Err(Error::InvalidInput(format!(
                "Unsupported snippet language: {other}. Use 'py' or 'js'."
            ))),
        }
    }
}

/// Generated snippet payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub bot_id: String,
    pub language: SnippetLanguage,
    pub code: String,
    pub instructions: String,
}

/// Build the snippet for a blueprint in the requested language.
pub fn build_snippet(blueprint: &BotBlueprint, language: SnippetLanguage, model: &str) -> Snippet {
    let (code, instructions) = match language {
        SnippetLanguage::Py => (
            python_template(blueprint, model),
            "Set GEMINI_API_KEY (and optionally GEMINI_MODEL), install google-generativeai, \
             then copy this snippet into your project."
                .to_string(),
        ),
        SnippetLanguage::Js => (
            javascript_template(blueprint, model),
            "Install @google/generative-ai and dotenv, set GEMINI_API_KEY, then import the \
             exported function."
                .to_string(),
        ),
    };

    Snippet {
        bot_id: blueprint.bot_id.clone(),
        language,
        code,
        instructions,
    }
}

fn python_template(blueprint: &BotBlueprint, model: &str) -> String {
    let safe_fn = blueprint.bot_id.replace('-', "_");
    let system_prompt = json_string(&blueprint.system_prompt);
    let bot_name = blueprint.bot_name.replace('"', "'");
    let tagline = blueprint.tagline.replace('"', "'");

    format!(
        r#"import os
import google.generativeai as genai

GEMINI_MODEL = os.getenv("GEMINI_MODEL", "{model}")
SYSTEM_PROMPT = {system_prompt}


def init_model():
    api_key = os.getenv("GEMINI_API_KEY")
    if not api_key:
        raise RuntimeError("Missing GEMINI_API_KEY")
    genai.configure(api_key=api_key)
    return genai.GenerativeModel(GEMINI_MODEL)


def ask_{safe_fn}(message, history=None):
    history = history or []
    model = init_model()
    system_header = "System: {bot_name} | {tagline}"
    compiled_prompt = "\n".join([
        system_header,
        SYSTEM_PROMPT,
        *history,
        f"User: {{message}}",
    ])
    response = model.generate_content(compiled_prompt)
    return response.text.strip()


if __name__ == "__main__":
    print(ask_{safe_fn}("Hi there! What can you do?"))"#
    )
}

fn javascript_template(blueprint: &BotBlueprint, model: &str) -> String {
    let export_name = format!("ask{}", export_suffix(&blueprint.bot_id));
    let system_prompt = json_string(&blueprint.system_prompt);
    let bot_name = blueprint.bot_name.replace('"', "'");
    let tagline = blueprint.tagline.replace('"', "'");

    format!(
        r#"import 'dotenv/config';
import {{ GoogleGenerativeAI }} from "@google/generative-ai";

const modelName = process.env.GEMINI_MODEL || "{model}";
const systemPrompt = {system_prompt};

function initModel() {{
    const apiKey = process.env.GEMINI_API_KEY;
    if (!apiKey) throw new Error('Missing GEMINI_API_KEY');
    const genAI = new GoogleGenerativeAI(apiKey);
    return genAI.getGenerativeModel({{ model: modelName }});
}}

export async function {export_name}(message, history = []) {{
    const model = initModel();
    const compiledPrompt = [
        "System: {bot_name} | {tagline}",
        systemPrompt,
        ...history,
        `User: ${{message}}`,
    ].join('\n');
    const result = await model.generateContent(compiledPrompt);
    return result.response.text().trim();
}}"#
    )
}

/// Bot id with dashes dropped and each letter run capitalized, suitable
/// for a camel-cased export name.
fn export_suffix(bot_id: &str) -> String {
    let mut out = String::with_capacity(bot_id.len());
    let mut boundary = true;
    for ch in bot_id.chars() {
        if ch == '-' {
            continue;
        }
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> BotBlueprint {
        BotBlueprint {
            bot_id: "shop-bot-42".to_string(),
            bot_name: "Shop \"Helper\"".to_string(),
            tagline: "Always here".to_string(),
            tone: "warm".to_string(),
            language: "en".to_string(),
            knowledge_base: vec![],
            system_prompt: "Help with \"orders\"\nand returns.".to_string(),
            sample_questions: vec![],
            sample_responses: vec![],
        }
    }

    #[test]
    fn language_parses_from_query_values() {
        assert_eq!("py".parse::<SnippetLanguage>().unwrap(), SnippetLanguage::Py);
        assert_eq!("js".parse::<SnippetLanguage>().unwrap(), SnippetLanguage::Js);
        assert!("rb".parse::<SnippetLanguage>().is_err());
    }

    #[test]
    fn python_snippet_names_function_after_bot_id() {
        let snippet = build_snippet(&blueprint(), SnippetLanguage::Py, "gemini-2.0-flash");
        assert!(snippet.code.contains("def ask_shop_bot_42(message, history=None):"));
        assert!(snippet.code.contains(r#"os.getenv("GEMINI_MODEL", "gemini-2.0-flash")"#));
        assert!(snippet.instructions.contains("google-generativeai"));
    }

    #[test]
    fn python_snippet_escapes_system_prompt_as_json_string() {
        let snippet = build_snippet(&blueprint(), SnippetLanguage::Py, "gemini-2.0-flash");
        assert!(snippet
            .code
            .contains(r#"SYSTEM_PROMPT = "Help with \"orders\"\nand returns.""#));
    }

    #[test]
    fn python_header_swaps_double_quotes_in_names() {
        let snippet = build_snippet(&blueprint(), SnippetLanguage::Py, "gemini-2.0-flash");
        assert!(snippet.code.contains("System: Shop 'Helper' | Always here"));
    }

    #[test]
    fn javascript_snippet_exports_camel_cased_function() {
        let snippet = build_snippet(&blueprint(), SnippetLanguage::Js, "gemini-2.0-flash");
        assert!(snippet.code.contains("export async function askShopbot42"));
        assert!(snippet.code.contains("GoogleGenerativeAI"));
        assert!(snippet.instructions.contains("@google/generative-ai"));
    }

    #[test]
    fn export_suffix_capitalizes_after_non_letters() {
        assert_eq!(export_suffix("shop-bot-42"), "Shopbot42");
        assert_eq!(export_suffix("a1b2-c3"), "A1B2C3");
    }
}
