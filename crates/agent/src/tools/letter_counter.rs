use agentcore_core::errors::ToolError;
use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;

/// Counts case-insensitive occurrences of `letter` in `word`.
///
/// Fails with `InvalidArgument` unless `letter` is exactly one character.
pub fn count_letter(word: &str, letter: &str) -> Result<usize, ToolError> {
    if letter.chars().count() != 1 {
        return Err(ToolError::InvalidArgument(
            "The 'letter' parameter must be a single character".to_string(),
        ));
    }

    let needle = letter.to_lowercase();
    Ok(word.to_lowercase().matches(needle.as_str()).count())
}

/// Tool-boundary entry point over untyped arguments.
///
/// Non-string arguments yield `0` before the single-character check runs.
pub fn letter_counter(word: &Value, letter: &Value) -> Result<usize, ToolError> {
    let (Some(word), Some(letter)) = (word.as_str(), letter.as_str()) else {
        return Ok(0);
    };
    count_letter(word, letter)
}

#[derive(Clone, Copy, Debug, Default)]
pub struct LetterCounter;

#[async_trait]
impl Tool for LetterCounter {
    fn name(&self) -> &'static str {
        "letter_counter"
    }

    fn description(&self) -> &'static str {
        "Count occurrences of a specific letter in a word."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "word": { "type": "string", "description": "The input word to search in" },
                "letter": { "type": "string", "description": "The specific letter to count" }
            },
            "required": ["word", "letter"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, ToolError> {
        let word = input.get("word").unwrap_or(&Value::Null);
        let letter = input.get("letter").unwrap_or(&Value::Null);
        letter_counter(word, letter).map(|count| json!(count))
    }
}
