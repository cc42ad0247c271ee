//! The pipeline's state machine
//!
//! ```text
//! search_web                 ─▶ analyze_research_needs
//! analyze_research_needs     ─▶ conduct_follow_up_research   if needs_more_research
//!                            ─▶ draft_answer                 otherwise
//! conduct_follow_up_research ─▶ analyze_research_needs       if !research_complete
//!                            ─▶ draft_answer                 otherwise
//! draft_answer               ─▶ evaluate_draft
//! evaluate_draft             ─▶ conduct_follow_up_research   if needs_more_research
//!                            ─▶ finalize_answer              otherwise
//! finalize_answer            ─▶ END
//! ```
//!
//! [`next_node`] is the plain transition table. [`route`] applies the loop
//! budget on top of it: once follow-up searches are exhausted, edges into
//! `conduct_follow_up_research` are redirected toward an answer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::state::QueryState;

/// A step in the pipeline graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    SearchWeb,
    AnalyzeResearchNeeds,
    ConductFollowUpResearch,
    DraftAnswer,
    EvaluateDraft,
    FinalizeAnswer,
}

impl Node {
    /// Entry point of every run
    pub const START: Node = Node::SearchWeb;

    pub fn as_str(&self) -> &'static str {
        match self {
            Node::SearchWeb => "search_web",
            Node::AnalyzeResearchNeeds => "analyze_research_needs",
            Node::ConductFollowUpResearch => "conduct_follow_up_research",
            Node::DraftAnswer => "draft_answer",
            Node::EvaluateDraft => "evaluate_draft",
            Node::FinalizeAnswer => "finalize_answer",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::FinalizeAnswer)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition table. `None` means the run is over.
pub fn next_node(from: Node, state: &QueryState) -> Option<Node> {
    match from {
        Node::SearchWeb => Some(Node::AnalyzeResearchNeeds),
        Node::AnalyzeResearchNeeds => Some(if state.needs_more_research {
            Node::ConductFollowUpResearch
        } else {
            Node::DraftAnswer
        }),
        Node::ConductFollowUpResearch => Some(if state.research_complete {
            Node::DraftAnswer
        } else {
            Node::AnalyzeResearchNeeds
        }),
        Node::DraftAnswer => Some(Node::EvaluateDraft),
        Node::EvaluateDraft => Some(if state.needs_more_research {
            Node::ConductFollowUpResearch
        } else {
            Node::FinalizeAnswer
        }),
        Node::FinalizeAnswer => None,
    }
}

/// Transition with the follow-up budget applied.
pub fn route(from: Node, state: &QueryState, follow_ups_exhausted: bool) -> Option<Node> {
    match next_node(from, state)? {
        Node::ConductFollowUpResearch if follow_ups_exhausted => Some(match from {
            Node::EvaluateDraft => Node::FinalizeAnswer,
            _ => Node::DraftAnswer,
        }),
        next => Some(next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(needs_more_research: bool, research_complete: bool) -> QueryState {
        QueryState {
            needs_more_research,
            research_complete,
            ..QueryState::new("q")
        }
    }

    #[test]
    fn test_transition_table() {
        let idle = state(false, false);
        let needs = state(true, false);
        let done = state(false, true);

        assert_eq!(next_node(Node::SearchWeb, &needs), Some(Node::AnalyzeResearchNeeds));
        assert_eq!(next_node(Node::AnalyzeResearchNeeds, &needs), Some(Node::ConductFollowUpResearch));
        assert_eq!(next_node(Node::AnalyzeResearchNeeds, &idle), Some(Node::DraftAnswer));
        assert_eq!(next_node(Node::ConductFollowUpResearch, &needs), Some(Node::AnalyzeResearchNeeds));
        assert_eq!(next_node(Node::ConductFollowUpResearch, &done), Some(Node::DraftAnswer));
        assert_eq!(next_node(Node::DraftAnswer, &idle), Some(Node::EvaluateDraft));
        assert_eq!(next_node(Node::EvaluateDraft, &needs), Some(Node::ConductFollowUpResearch));
        assert_eq!(next_node(Node::EvaluateDraft, &idle), Some(Node::FinalizeAnswer));
        assert_eq!(next_node(Node::FinalizeAnswer, &idle), None);
    }

    #[test]
    fn test_exhausted_budget_redirects_follow_up_edges() {
        let needs = state(true, false);

        assert_eq!(route(Node::AnalyzeResearchNeeds, &needs, true), Some(Node::DraftAnswer));
        assert_eq!(route(Node::EvaluateDraft, &needs, true), Some(Node::FinalizeAnswer));
        assert_eq!(
            route(Node::ConductFollowUpResearch, &needs, true),
            Some(Node::AnalyzeResearchNeeds)
        );
        assert_eq!(
            route(Node::AnalyzeResearchNeeds, &needs, false),
            Some(Node::ConductFollowUpResearch)
        );
    }

    #[test]
    fn test_node_names() {
        assert_eq!(Node::START.to_string(), "search_web");
        assert_eq!(
            serde_json::to_string(&Node::ConductFollowUpResearch).unwrap(),
            r#""conduct_follow_up_research""#
        );
        assert!(Node::FinalizeAnswer.is_terminal());
        assert!(!Node::EvaluateDraft.is_terminal());
    }
}
