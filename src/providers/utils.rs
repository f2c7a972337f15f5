use serde_json::Value;

use crate::reply::NO_RESPONSE_TEXT;

/// Wrap a user question with the instruction to answer in the
/// `{answer, followup}` JSON shape.
pub fn structured_prompt(question: &str) -> String {
    format!(
        r#"
Please provide the response in the following JSON format:
{{
  "answer": "Your answer here.",
  "followup": "A relevant follow-up question."
}}

Question: {}
"#,
        question
    )
}

/// Pull `candidates[0].content.parts[0].text` out of a generateContent
/// response, falling back to [`NO_RESPONSE_TEXT`] when the path is missing
/// or empty.
pub fn reply_text(response: &Value) -> String {
    response
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(NO_RESPONSE_TEXT)
        .to_string()
}
