//! Query state threaded through every pipeline step
//!
//! One [`QueryState`] exists per run. Steps mutate it in place; the orchestrator
//! reads its two flags to pick the next step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// A single search result record.
///
/// Search backends return loosely-typed records. The keys the pipeline cares
/// about are lifted into fields; everything else is kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResearchResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// The follow-up question that produced this record, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_query: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResearchResult {
    pub fn new(content: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Build a record from a raw search value.
    ///
    /// Returns `None` for anything that is not a JSON object. String-valued
    /// `content`, `url` and `follow_up_query` keys become fields; those keys
    /// are dropped when they hold anything else. Other keys stay in `extra`.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };

        let content = take_string(&mut fields, "content");
        let url = take_string(&mut fields, "url");
        let follow_up_query = take_string(&mut fields, "follow_up_query");

        Some(Self {
            content,
            url,
            follow_up_query,
            extra: fields,
        })
    }

    /// Content, or the empty string when absent
    pub fn content(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// URL, or the empty string when absent
    pub fn url(&self) -> &str {
        self.url.as_deref().unwrap_or("")
    }

    /// Title reported by the search backend, if any
    pub fn title(&self) -> Option<&str> {
        self.extra.get("title").and_then(Value::as_str)
    }

    /// Cut `content` to at most `limit` characters. No marker is appended.
    pub fn truncate_content(&mut self, limit: usize) {
        if let Some(content) = self.content.as_mut() {
            if let Some((byte_idx, _)) = content.char_indices().nth(limit) {
                content.truncate(byte_idx);
            }
        }
    }

    /// Tag the record with the follow-up question that found it
    pub fn with_follow_up_query(mut self, question: impl Into<String>) -> Self {
        self.extra.remove("follow_up_query");
        self.follow_up_query = Some(question.into());
        self
    }
}

fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Mutable record for one research run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryState {
    /// The user's question; never changes after creation
    pub query: String,

    /// Accumulated search results, in arrival order. Append-only.
    pub research_results: Vec<ResearchResult>,

    /// Pending follow-up questions, consumed from the front
    pub follow_up_questions: VecDeque<String>,

    pub drafted_answer: String,

    pub final_answer: String,

    pub needs_more_research: bool,

    pub research_complete: bool,
}

impl QueryState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn append_results(&mut self, results: impl IntoIterator<Item = ResearchResult>) {
        self.research_results.extend(results);
    }

    pub fn enqueue_follow_ups(&mut self, questions: impl IntoIterator<Item = String>) {
        self.follow_up_questions.extend(questions);
    }

    /// Take the oldest pending follow-up question
    pub fn next_follow_up(&mut self) -> Option<String> {
        self.follow_up_questions.pop_front()
    }

    /// Research results as JSON, for embedding in prompts
    pub fn research_results_json(&self) -> String {
        serde_json::to_string(&self.research_results).unwrap_or_else(|_| "[]".to_string())
    }
}
