//! Helpers for pulling structured data out of model replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

// Accepts ```json ... ``` and bare ``` ... ``` fences.
static FENCED_JSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fence pattern")
});

/// Extract the first JSON object from a model reply.
///
/// Models asked for "minified JSON" still wrap it in markdown fences or
/// surround it with prose often enough that both forms are handled: a
/// fenced block is preferred, then the first balanced `{...}` region,
/// then the raw text as a last resort.
pub fn extract_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(captures) = FENCED_JSON.captures(trimmed) {
        if let Some(block) = captures.get(1) {
            if let Ok(value) = serde_json::from_str(block.as_str()) {
                return Some(value);
            }
        }
    }

    if let Some(region) = balanced_object(trimmed) {
        if let Ok(value) = serde_json::from_str(region) {
            return Some(value);
        }
    }

    serde_json::from_str(trimmed).ok()
}

/// The first balanced `{...}` region, tracking string literals so braces
/// inside values do not derail the scan.
fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Fresh opaque session identifier.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}
