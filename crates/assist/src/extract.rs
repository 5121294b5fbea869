//! Finds a device-control instruction embedded in free-text model output.
//!
//! Models are asked for a bare one-line JSON object but often wrap it in
//! prose or a fenced code block. Extraction tries the whole trimmed reply
//! first, then every fenced block and every balanced `{...}` span in order of
//! where they start in the text. The first candidate that parses as a JSON
//! object wins.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use mc_domain::home::ServiceCall;

static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fenced block regex")
});

/// Locate the first JSON object in `text`, or `None`.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    if let Some(obj) = parse_object(text.trim()) {
        return Some(obj);
    }
    candidates(text).into_iter().find_map(|(_, c)| parse_object(c))
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Fenced block bodies and brace spans, keyed and sorted by start offset.
fn candidates(text: &str) -> Vec<(usize, &str)> {
    let mut found: Vec<(usize, &str)> = FENCED_RE
        .captures_iter(text)
        .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.as_str())))
        .collect();

    found.extend(
        text.match_indices('{')
            .filter_map(|(start, _)| balanced_span(text, start).map(|span| (start, span))),
    );
    found.sort_by_key(|(start, _)| *start);
    found
}

/// The balanced `{...}` span opening at `start`, or `None` if it never closes.
///
/// Braces inside JSON string literals are ignored, including escaped quotes.
fn balanced_span(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            '"' => in_string = true,
            _ => {}
        }
    }
    None
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Action request
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A `call_service` instruction parsed out of a reply. Not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRequest {
    pub domain: String,
    pub service: String,
    pub entity_id: String,
    pub data: Map<String, Value>,
    /// Confirmation the model wants spoken after a successful call.
    pub response: Option<String>,
}

impl ActionRequest {
    /// Parse the first embedded object; only `"action": "call_service"`
    /// counts as an action.
    pub fn from_reply(text: &str) -> Option<Self> {
        extract_json(text).and_then(|obj| Self::from_object(&obj))
    }

    pub fn from_object(obj: &Map<String, Value>) -> Option<Self> {
        if obj.get("action").and_then(Value::as_str) != Some("call_service") {
            return None;
        }

        let data = ["data", "extra_params", "service_data"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_object))
            .cloned()
            .unwrap_or_default();

        let response = ["response", "confirmation"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Some(Self {
            domain: str_field(obj, &["domain"]),
            service: str_field(obj, &["service"]),
            entity_id: str_field(obj, &["entity_id", "target_id"]),
            data,
            response,
        })
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.domain, self.service)
    }

    pub fn to_service_call(&self) -> ServiceCall {
        ServiceCall {
            domain: self.domain.clone(),
            service: self.service.clone(),
            entity_id: self.entity_id.clone(),
            data: self.data.clone(),
        }
    }
}

fn str_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| obj.get(*k).and_then(Value::as_str))
        .unwrap_or_default()
        .trim()
        .to_string()
}
