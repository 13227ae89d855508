//! LLM-based query expansion
//!
//! Rewrites a short or ambiguous user query into a longer descriptive form
//! matching the style of synthesized catalog text, so the query embedding
//! lands near the package embeddings it should match. Expansion is a quality
//! enhancement, not a correctness requirement: any model failure falls back
//! to the deterministic template without surfacing an error.

use super::{ChatMessage, LLMClient};
use crate::error::Result;
use crate::synthesis::{synthesize_query_expansion, CLOSING_SENTENCE};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"```[a-zA-Z]*").expect("static regex");
}

/// Query transformer using an external chat model
pub struct QueryTransformer {
    client: Arc<dyn LLMClient>,
}

impl QueryTransformer {
    /// Create from an LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Expand a raw query into descriptive catalog-style text.
    ///
    /// Infallible surface: on any model error the template-based expansion
    /// is returned instead.
    pub async fn transform(&self, raw_query: &str) -> String {
        match self.transform_inner(raw_query).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!("Query transformer returned empty output, using template fallback");
                synthesize_query_expansion(raw_query)
            }
            Err(e) => {
                tracing::warn!("Query transform failed ({}), using template fallback", e);
                synthesize_query_expansion(raw_query)
            }
        }
    }

    async fn transform_inner(&self, raw_query: &str) -> Result<String> {
        let messages = vec![
            ChatMessage::system(
                "You rewrite travel search queries into short descriptive paragraphs \
                 matching the style of tour package descriptions. Output plain text only, \
                 no markdown, no lists.",
            ),
            ChatMessage::user(build_transform_prompt(raw_query)),
        ];

        let response = self.client.chat_completion(messages).await?;
        Ok(strip_markup(&response))
    }
}

fn build_transform_prompt(raw_query: &str) -> String {
    format!(
        r#"Rewrite this travel query as 3-5 descriptive sentences:

Query: "{}"

Rules:
1. Restate what the traveler is asking for.
2. Mention a category, trip duration, budget level or destination ONLY when the query itself makes it evident. Never invent specifics that are not in the query.
3. End with exactly this sentence: {}

Output only the rewritten text."#,
        raw_query, CLOSING_SENTENCE
    )
}

/// Strip code fences and surrounding whitespace the model may wrap around
/// its output
fn strip_markup(response: &str) -> String {
    CODE_FENCE.replace_all(response, "").trim().to_string()
}
