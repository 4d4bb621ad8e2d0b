//! Summarizer tools

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::Result;
use crate::tools::context::ToolContext;
use crate::tools::tool::{parse_args, Tool};
use crate::tools::ToolRegistry;

const STOPWORDS: &[&str] = &[
    "the", "and", "a", "an", "of", "in", "on", "at", "to", "for", "with", "is", "are", "was",
    "were", "be", "by", "this", "that", "it", "from", "as", "or", "but", "if", "then", "so", "not",
];

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word regex must compile"));

/// The `n` most frequent non-stopwords, ties broken by first appearance
pub fn most_common_words(text: &str, n: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for word in WORD.find_iter(&lowered).map(|m| m.as_str()) {
        if STOPWORDS.contains(&word) {
            continue;
        }
        match index.get(word) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(word, counts.len());
                counts.push((word, 1));
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(word, _)| word.to_string())
        .collect()
}

#[derive(Deserialize)]
struct CommonWordsArgs {
    text: String,
    n: i64,
}

/// Reports the most common words of a text
pub struct GetMostCommonWords {
    parameters: Value,
}

impl GetMostCommonWords {
    pub fn new() -> Self {
        Self {
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "Text to analyze"
                    },
                    "n": {
                        "type": "integer",
                        "description": "Number of words to return"
                    }
                },
                "required": ["text", "n"]
            }),
        }
    }
}

impl Default for GetMostCommonWords {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GetMostCommonWords {
    fn name(&self) -> &str {
        "get_n_most_common_words"
    }

    fn description(&self) -> &str {
        "Extract the n most common words from the text."
    }

    fn parameters(&self) -> &Value {
        &self.parameters
    }

    async fn invoke(&self, args: Value, _ctx: &ToolContext<'_>) -> Result<Value> {
        let args: CommonWordsArgs = parse_args(self.name(), args)?;
        let words = most_common_words(&args.text, usize::try_from(args.n).unwrap_or(0));

        Ok(Value::String(format!(
            "The {} most common words are: {}",
            args.n,
            words.join(", ")
        )))
    }
}

/// Register the summarizer tools
pub fn register(registry: &mut ToolRegistry) -> Result<()> {
    registry.register(GetMostCommonWords::new())
}
