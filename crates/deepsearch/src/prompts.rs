//! Prompt templates for the generation calls
//!
//! Each builder returns the full conversation for one call: a system message
//! followed by the user turns, in order.

use chrono::Utc;

use crate::llm::Message;
use crate::parsing::{ADDITIONAL_RESEARCH_MARKER, FOLLOW_UP_MARKER};

/// Prompt templates for the research pipeline
pub struct ResearchPrompts;

impl ResearchPrompts {
    /// Get the current date formatted for prompts
    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    /// Needs-analysis system prompt
    pub fn analyzer() -> String {
        format!(
            r#"Today's date is {date}. You are a research analyst who evaluates search results.
Analyze the search results and determine if they adequately address the query.
If not, generate follow-up questions that would help gather more relevant information.

If more research is needed, end your response with a line containing exactly
{marker}
followed by a numbered list with one question per line.
If the results are sufficient, do not include that line."#,
            date = Self::current_date(),
            marker = FOLLOW_UP_MARKER,
        )
    }

    /// Draft synthesis system prompt
    pub fn drafter() -> String {
        format!(
            r#"Today's date is {date}. You are an expert at synthesizing research into clear, comprehensive answers.
Based on the provided research results, create a well-structured and informative response that directly addresses the original query.
At the end of each paragraph or key point, include a citation in this format: [source](URL).
If multiple results support a point, include up to 2 citations.
Do not invent citations not present in the list below.
If the research results don't contain enough information to fully answer the query, note this in your response."#,
            date = Self::current_date(),
        )
    }

    /// Draft evaluation system prompt
    pub fn evaluator() -> String {
        format!(
            r#"Today's date is {date}. You evaluate the quality and completeness of an answer draft.
Determine if the draft adequately addresses the original query or if more research is needed.
If certain aspects of the query remain unaddressed or if the information seems insufficient,
indicate what additional information would be helpful.

When more research is needed, write a line containing exactly
{marker}
followed by one research question per line, without bullets."#,
            date = Self::current_date(),
            marker = ADDITIONAL_RESEARCH_MARKER,
        )
    }

    /// Final editing system prompt
    pub fn finalizer() -> String {
        r#"You are a skilled editor who refines draft content into polished, final answers.
Review the drafted answer and make improvements to:
1. Ensure all parts of the original query are addressed
2. Improve clarity, structure, and flow
3. Eliminate redundancy
4. At the end of each key point, add a citation in format like [1], [2], etc., referring to the corresponding research source.
5. Format the answer appropriately with headers, bullet points, etc. as needed
6. Include a complete and properly formatted References section at the end with all cited sources

IMPORTANT: Make sure all citations in the text have corresponding entries in the References section.
Format the References section like this:

References:
1. [Title 1](URL1)
2. [Title 2](URL2)
Ensure every citation in the text has a corresponding entry in the References list.
Do not remove any citations from the body."#
            .to_string()
    }

    pub fn analyze_messages(query: &str, research_results: &str) -> Vec<Message> {
        vec![
            Message::system(Self::analyzer()),
            Message::user(format!("Original Query: {query}")),
            Message::user(format!("Research Results:{research_results}")),
        ]
    }

    pub fn draft_messages(query: &str, formatted_results: &str) -> Vec<Message> {
        vec![
            Message::system(Self::drafter()),
            Message::user(format!("Original Query: {query}")),
            Message::user(format!("Research Results:{formatted_results}")),
        ]
    }

    pub fn evaluate_messages(query: &str, drafted_answer: &str, research_results: &str) -> Vec<Message> {
        vec![
            Message::system(Self::evaluator()),
            Message::user(format!("Original Query: {query}")),
            Message::user(format!("Drafted Answer: {drafted_answer}")),
            Message::user(format!("Research Results:{research_results}")),
        ]
    }

    pub fn finalize_messages(query: &str, drafted_answer: &str, formatted_results: &str) -> Vec<Message> {
        vec![
            Message::system(Self::finalizer()),
            Message::user(format!("Original Query: {query}")),
            Message::user(format!("Draft Answer: {drafted_answer}")),
            Message::user(format!("Research Results:{formatted_results}")),
        ]
    }
}
