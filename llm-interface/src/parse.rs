//! Parsing of model output that is supposed to be JSON.
//!
//! Models wrap JSON in markdown fences or surround it with prose often enough
//! that a strict `serde_json::from_str` is not sufficient. When nothing
//! parses, callers get an explicit [`AiPayload::Fallback`] carrying their
//! default payload instead of an error.

use serde::de::DeserializeOwned;
use tracing::warn;

#[derive(Debug, Clone, PartialEq)]
pub enum AiPayload<T> {
    Parsed(T),
    Fallback { value: T, reason: String },
}

impl<T> AiPayload<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, AiPayload::Fallback { .. })
    }

    pub fn into_inner(self) -> T {
        match self {
            AiPayload::Parsed(value) | AiPayload::Fallback { value, .. } => value,
        }
    }

    pub fn as_ref(&self) -> &T {
        match self {
            AiPayload::Parsed(value) | AiPayload::Fallback { value, .. } => value,
        }
    }
}

/// Removes a surrounding ```` ```json ```` / ```` ``` ```` fence if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") up to the first newline.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses JSON out of model text: first the fence-stripped text as a whole,
/// then the widest `{...}` or `[...]` span inside it.
pub fn parse_ai_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let cleaned = strip_code_fences(text);
    match serde_json::from_str(cleaned) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            for (open, close) in [('{', '}'), ('[', ']')] {
                if let (Some(start), Some(end)) = (cleaned.find(open), cleaned.rfind(close)) {
                    if start < end {
                        if let Ok(value) = serde_json::from_str(&cleaned[start..=end]) {
                            return Ok(value);
                        }
                    }
                }
            }
            Err(first_error)
        }
    }
}

pub fn parse_or_fallback<T, F>(text: &str, fallback: F) -> AiPayload<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> T,
{
    match parse_ai_json(text) {
        Ok(value) => AiPayload::Parsed(value),
        Err(e) => {
            warn!("AI response was not valid JSON, using fallback payload: {}", e);
            AiPayload::Fallback {
                value: fallback(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n[1]\n```  "), "[1]");
        assert_eq!(strip_code_fences("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_parse_fenced_json() {
        let parsed: Sample = parse_ai_json("```json\n{\"name\": \"rust\"}\n```").unwrap();
        assert_eq!(parsed.name, "rust");
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let text = "Sure! Here is the result:\n{\"name\": \"saas\"}\nLet me know if you need more.";
        let parsed: Sample = parse_ai_json(text).unwrap();
        assert_eq!(parsed.name, "saas");
    }

    #[test]
    fn test_fallback_on_garbage() {
        let payload = parse_or_fallback("I cannot help with that", || Sample {
            name: "default".to_string(),
        });
        assert!(payload.is_fallback());
        assert_eq!(payload.into_inner().name, "default");
    }

    #[test]
    fn test_parsed_variant() {
        let payload = parse_or_fallback("{\"name\":\"ok\"}", || Sample {
            name: "default".to_string(),
        });
        assert_eq!(
            payload,
            AiPayload::Parsed(Sample {
                name: "ok".to_string()
            })
        );
    }
}
