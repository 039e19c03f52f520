//! Summary and Q&A generation on top of the Gemini client.
//!
//! The model is asked twice: once to turn the caller's free-form request
//! into a clean instruction, and once to apply that instruction to the
//! document with a JSON-only answer format. The second reply is recovered
//! with [`parse_analysis`], which never fails.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::gemini::{GeminiClient, GeminiError};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub questions: Vec<QuestionAnswer>,
}

fn target_schema() -> Value {
    json!({
        "summary": "string",
        "questions": [
            {
                "question": "string",
                "answer": "string"
            }
        ]
    })
}

pub fn rewrite_prompt(user_input: &str) -> String {
    format!(
        "Take the following instruction and rewrite it into a clean, structured prompt \
that will be used to analyze the text of a PDF.

Keep the goal clear, focused, and in one paragraph. Do not include formatting or explanation.

User instruction:
\"\"\"{user_input}\"\"\"

Only return the reworded prompt. Do not return JSON or commentary.
"
    )
}

pub fn json_prompt(instruction: &str, schema: &Value, text: &str) -> String {
    let schema_str =
        serde_json::to_string_pretty(schema).unwrap_or_else(|_| schema.to_string());
    format!(
        "{instruction}

Return only valid JSON in this format:
{schema_str}

Do not return any explanation, markdown, or extra content.

Here is the document:
\"\"\"{text}\"\"\"
"
    )
}

/// Asks the model to restate `user_input` as a single analysis instruction.
pub async fn rewrite_instruction(
    client: &GeminiClient,
    user_input: &str,
) -> Result<String, GeminiError> {
    let reply = client.generate(&rewrite_prompt(user_input)).await?;
    Ok(reply.trim().to_string())
}

/// Runs the full rewrite-then-analyze flow for one document.
pub async fn analyze_document(
    client: &GeminiClient,
    text: &str,
    user_prompt: &str,
) -> Result<AnalysisResult, GeminiError> {
    info!(user_prompt, "analysis requested");
    let instruction = rewrite_instruction(client, user_prompt).await?;
    info!(instruction = %instruction, "rewritten instruction");

    let prompt = json_prompt(&instruction, &target_schema(), text);
    let reply = client.generate(&prompt).await?;
    debug!(reply = %reply, "model analysis output");

    Ok(parse_analysis(&reply))
}

/// Substring from the first `{` to the last `}`, if both exist in that order.
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Recovers an [`AnalysisResult`] from free-form model output.
///
/// Anything that cannot be recovered falls back to empty values: no JSON
/// span or an unparsable span gives the default result, and a `questions`
/// field that is an unparsable string gives an empty list while keeping
/// the summary.
pub fn parse_analysis(reply: &str) -> AnalysisResult {
    let Some(span) = brace_span(reply) else {
        warn!("no JSON object found in model output");
        return AnalysisResult::default();
    };

    let parsed: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "failed to parse model output as JSON");
            return AnalysisResult::default();
        }
    };

    let summary = match parsed.get("summary") {
        Some(Value::String(summary)) => summary.clone(),
        Some(_) => {
            warn!("'summary' is not a string");
            String::new()
        }
        None => String::new(),
    };

    let questions = match parsed.get("questions") {
        Some(Value::String(encoded)) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded) => questions_from(&decoded),
            Err(e) => {
                warn!(error = %e, "failed to parse 'questions' string");
                Vec::new()
            }
        },
        Some(value) => questions_from(value),
        None => Vec::new(),
    };

    AnalysisResult { summary, questions }
}

fn questions_from(value: &Value) -> Vec<QuestionAnswer> {
    let Some(items) = value.as_array() else {
        warn!("'questions' is not a list");
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let fields = item.as_object()?;
            Some(QuestionAnswer {
                question: text_field(fields.get("question")),
                answer: text_field(fields.get("answer")),
            })
        })
        .collect()
}

/// Strings pass through, other scalars are rendered, `null` or absent is empty.
fn text_field(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
