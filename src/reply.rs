use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

/// Answer used when a reply carries no text at all.
pub const NO_RESPONSE_TEXT: &str = "No response received.";

/// The `{answer, followup}` shape extracted from a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredReply {
    answer: String,
    followup: Option<String>,
}

impl StructuredReply {
    pub fn new(answer: &str, followup: Option<&str>) -> Self {
        Self {
            answer: answer.to_string(),
            followup: followup.map(str::to_string),
        }
    }

    /// Treat the whole text as the answer with no follow-up.
    pub fn raw(text: &str) -> Self {
        Self::new(text, None)
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn followup(&self) -> Option<&str> {
        self.followup.as_deref()
    }

    pub fn into_parts(self) -> (String, Option<String>) {
        (self.answer, self.followup)
    }
}

fn json_object_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // greedy: first `{` through last `}`
    PATTERN.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("static pattern compiles"))
}

/// Best-effort extraction of a [`StructuredReply`] from free-form model output.
///
/// The model is asked for JSON but is not bound to produce it, so this never
/// fails: anything that cannot be read as `{"answer": ..., "followup": ...}`
/// degrades to the raw text as the answer. The answer is never empty.
pub fn parse_reply(text: &str) -> StructuredReply {
    if text.trim().is_empty() {
        debug!("reply is empty, using placeholder");
        return StructuredReply::raw(NO_RESPONSE_TEXT);
    }

    let Some(candidate) = json_object_pattern().find(text) else {
        debug!("reply has no JSON object, using raw text");
        return StructuredReply::raw(text);
    };

    let object = match serde_json::from_str::<Map<String, Value>>(candidate.as_str()) {
        Ok(object) => object,
        Err(err) => {
            debug!(error = %err, "reply JSON did not decode, using raw text");
            return StructuredReply::raw(text);
        }
    };

    match object.get("answer").and_then(usable_answer) {
        Some(answer) => StructuredReply {
            answer,
            followup: object.get("followup").and_then(usable_followup),
        },
        None => {
            debug!("reply JSON has no usable answer, using raw text");
            StructuredReply::raw(text)
        }
    }
}

fn usable_answer(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64().is_some_and(|f| f != 0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn usable_followup(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}
