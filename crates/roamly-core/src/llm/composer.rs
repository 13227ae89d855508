//! Conversational reply composition
//!
//! Turns a set of search results (or the lack of one) into a short assistant
//! reply. The results themselves stay valid without prose commentary, so any
//! model failure degrades to a canned reply and is never surfaced as an
//! error.

use super::{ChatMessage, LLMClient};
use crate::error::Result;
use crate::search::ScoredPackage;
use std::sync::Arc;

/// Static reply used when the chat model is unavailable
pub const FALLBACK_REPLY: &str = "I'm here to help with your travel queries!";

/// Reply composer using an external chat model
pub struct ResponseComposer {
    client: Arc<dyn LLMClient>,
}

impl ResponseComposer {
    /// Create from an LLM client
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self { client }
    }

    /// Compose a reply for the query and its results.
    ///
    /// Infallible surface: returns `FALLBACK_REPLY` on any model error.
    pub async fn compose(&self, raw_query: &str, results: &[ScoredPackage]) -> String {
        match self.compose_inner(raw_query, results).await {
            Ok(reply) if !reply.trim().is_empty() => reply.trim().to_string(),
            Ok(_) => {
                tracing::warn!("Composer returned empty reply, using static fallback");
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                tracing::warn!("Reply composition failed ({}), using static fallback", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }

    async fn compose_inner(&self, raw_query: &str, results: &[ScoredPackage]) -> Result<String> {
        let prompt = if results.is_empty() {
            build_no_match_prompt(raw_query)
        } else {
            build_results_prompt(raw_query, results)
        };

        let messages = vec![
            ChatMessage::system(
                "You are a friendly travel assistant. Reply in plain text, \
                 no markdown formatting.",
            ),
            ChatMessage::user(prompt),
        ];

        self.client.chat_completion(messages).await
    }
}

/// Compact one-line digest of a result for the prompt
fn digest(result: &ScoredPackage) -> String {
    let pkg = &result.package;
    let location = pkg
        .location
        .as_ref()
        .map(|l| {
            [&l.city, &l.region, &l.country]
                .into_iter()
                .filter_map(|p| p.as_deref())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "location unspecified".to_string());

    format!(
        "- {} | {:.0} per person | {} days | {} | tags: {}",
        pkg.title,
        pkg.price,
        pkg.duration_days,
        location,
        if pkg.tags.is_empty() {
            "none".to_string()
        } else {
            pkg.tags.join(", ")
        }
    )
}

fn build_results_prompt(raw_query: &str, results: &[ScoredPackage]) -> String {
    let digests: Vec<String> = results.iter().map(digest).collect();
    format!(
        r#"A traveler asked: "{}"

These packages matched:
{}

Write an engaging reply in under 3 sentences that mentions the matching packages by name and invites the traveler to take a look."#,
        raw_query,
        digests.join("\n")
    )
}

fn build_no_match_prompt(raw_query: &str) -> String {
    format!(
        r#"A traveler asked: "{}"

No packages in the catalog matched. Acknowledge their question, then pivot to offering help with travel planning, in under 3 sentences."#,
        raw_query
    )
}
