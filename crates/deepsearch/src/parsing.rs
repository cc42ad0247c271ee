//! Reading control decisions out of model responses
//!
//! Two formats are accepted. A structured JSON assessment is tried first:
//!
//! ```json
//! {"needs_more_research": true, "follow_up_questions": ["..."]}
//! ```
//!
//! either as the whole response or inside a fenced ```` ```json ```` block.
//! Otherwise the free-text sentinel markers decide. Parsing never fails; output
//! that matches neither format reads as "no more research needed".

use serde::Deserialize;

/// Marker that opens the follow-up section of a needs-analysis response
pub const FOLLOW_UP_MARKER: &str = "FOLLOW-UP QUESTIONS:";

/// Marker that opens the follow-up section of a draft evaluation
pub const ADDITIONAL_RESEARCH_MARKER: &str = "ADDITIONAL RESEARCH NEEDED:";

/// Structured response contract for analysis and evaluation calls
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Assessment {
    pub needs_more_research: bool,
    #[serde(default)]
    pub follow_up_questions: Vec<String>,
}

/// Decision read from a needs-analysis response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NeedsAnalysis {
    /// The results cover the query
    Complete,
    /// More research is needed; questions in parse order (possibly none)
    FollowUp(Vec<String>),
}

/// Decision read from a draft evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftVerdict {
    Sufficient,
    NeedsResearch(Vec<String>),
}

/// Try to read a structured [`Assessment`] from a response.
pub fn parse_structured(text: &str) -> Option<Assessment> {
    let trimmed = text.trim();
    if let Ok(assessment) = serde_json::from_str::<Assessment>(trimmed) {
        return Some(assessment);
    }

    let start = trimmed.find("```json")? + "```json".len();
    let body = &trimmed[start..];
    let end = body.find("```")?;
    serde_json::from_str(body[..end].trim()).ok()
}

/// Parse a needs-analysis response.
pub fn parse_needs_analysis(text: &str) -> NeedsAnalysis {
    if let Some(assessment) = parse_structured(text) {
        return if assessment.needs_more_research {
            NeedsAnalysis::FollowUp(non_blank(assessment.follow_up_questions))
        } else {
            NeedsAnalysis::Complete
        };
    }

    match text.split(FOLLOW_UP_MARKER).nth(1) {
        Some(section) => NeedsAnalysis::FollowUp(extract_follow_up_questions(section)),
        None => NeedsAnalysis::Complete,
    }
}

/// Pull questions out of the text after [`FOLLOW_UP_MARKER`].
///
/// Tried in order, first non-empty wins:
/// 1. numbered lines: an ASCII digit within the first two characters of the line
/// 2. bullet lines starting with `•` or `-`, prefix removed
/// 3. the whole section as one question
pub fn extract_follow_up_questions(section: &str) -> Vec<String> {
    let numbered: Vec<String> = section
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| line.chars().take(2).any(|c| c.is_ascii_digit()))
        .map(|line| line.trim().to_string())
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }

    let bulleted: Vec<String> = section
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('•') || line.starts_with('-'))
        .map(|line| line.trim_matches(|c: char| c == '•' || c == '-').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    if !bulleted.is_empty() {
        return bulleted;
    }

    let whole = section.trim();
    if whole.is_empty() {
        Vec::new()
    } else {
        vec![whole.to_string()]
    }
}

/// Parse a draft evaluation response.
///
/// After [`ADDITIONAL_RESEARCH_MARKER`], every non-blank line that does not
/// start with `•` is a follow-up question.
pub fn parse_draft_evaluation(text: &str) -> DraftVerdict {
    if let Some(assessment) = parse_structured(text) {
        return if assessment.needs_more_research {
            DraftVerdict::NeedsResearch(non_blank(assessment.follow_up_questions))
        } else {
            DraftVerdict::Sufficient
        };
    }

    match text.split(ADDITIONAL_RESEARCH_MARKER).nth(1) {
        Some(section) => DraftVerdict::NeedsResearch(
            section
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('•'))
                .map(str::to_string)
                .collect(),
        ),
        None => DraftVerdict::Sufficient,
    }
}

fn non_blank(questions: Vec<String>) -> Vec<String> {
    questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn follow_ups(text: &str) -> Vec<String> {
        match parse_needs_analysis(text) {
            NeedsAnalysis::FollowUp(questions) => questions,
            NeedsAnalysis::Complete => panic!("expected follow-up questions in {text:?}"),
        }
    }

    #[test]
    fn test_numbered_questions() {
        assert_eq!(
            follow_ups("FOLLOW-UP QUESTIONS:\n1. What is X?\n2. What is Y?"),
            vec!["1. What is X?", "2. What is Y?"]
        );
    }

    #[test]
    fn test_no_marker_means_complete() {
        assert_eq!(parse_needs_analysis("Looks complete."), NeedsAnalysis::Complete);
        assert_eq!(
            parse_needs_analysis("follow-up questions: lowercase does not count"),
            NeedsAnalysis::Complete
        );
    }

    #[test]
    fn test_bullet_fallback() {
        assert_eq!(
            follow_ups("FOLLOW-UP QUESTIONS:\n• What about Z?"),
            vec!["What about Z?"]
        );
        assert_eq!(
            follow_ups("Gaps remain.\nFOLLOW-UP QUESTIONS:\n- First?\n  - Second?\nnot a bullet"),
            vec!["First?", "Second?"]
        );
    }

    #[test]
    fn test_whole_section_fallback() {
        assert_eq!(
            follow_ups("FOLLOW-UP QUESTIONS: How does it scale?\nAnd at what cost?"),
            vec!["How does it scale?\nAnd at what cost?"]
        );
    }

    #[test]
    fn test_empty_section_yields_no_questions() {
        assert_eq!(follow_ups("FOLLOW-UP QUESTIONS:\n   \n"), Vec::<String>::new());
    }

    #[test]
    fn test_numbered_beats_bullets() {
        assert_eq!(
            follow_ups("FOLLOW-UP QUESTIONS:\n- bullet\n10) ten\na2 late digit\n abc"),
            vec!["10) ten", "a2 late digit"]
        );
    }

    #[test]
    fn test_numeric_symbols_are_not_list_numbers() {
        assert_eq!(
            extract_follow_up_questions("\n½ cup?\nⅣ roman\n- real bullet"),
            vec!["real bullet"]
        );
    }

    #[test]
    fn test_section_ends_at_second_marker() {
        assert_eq!(
            follow_ups("FOLLOW-UP QUESTIONS:\n1. A?\nFOLLOW-UP QUESTIONS:\n2. B?"),
            vec!["1. A?"]
        );
    }

    #[test]
    fn test_evaluation_sufficient() {
        assert_eq!(parse_draft_evaluation("The draft is thorough."), DraftVerdict::Sufficient);
    }

    #[test]
    fn test_evaluation_skips_dot_bullets_only() {
        let verdict = parse_draft_evaluation(
            "Mostly fine.\nADDITIONAL RESEARCH NEEDED:\nWhat changed in 2024?\n• ignored\n\n- kept as is",
        );
        assert_eq!(
            verdict,
            DraftVerdict::NeedsResearch(vec![
                "What changed in 2024?".to_string(),
                "- kept as is".to_string(),
            ])
        );
    }

    #[test]
    fn test_evaluation_marker_with_no_questions() {
        assert_eq!(
            parse_draft_evaluation("ADDITIONAL RESEARCH NEEDED:\n• only bullets"),
            DraftVerdict::NeedsResearch(vec![])
        );
    }

    #[test]
    fn test_structured_json_response() {
        let text = r#"{"needs_more_research": true, "follow_up_questions": ["Who?", "  "]}"#;
        assert_eq!(parse_needs_analysis(text), NeedsAnalysis::FollowUp(vec!["Who?".to_string()]));
        assert_eq!(
            parse_draft_evaluation(text),
            DraftVerdict::NeedsResearch(vec!["Who?".to_string()])
        );
    }

    #[test]
    fn test_structured_fenced_block() {
        let text = "Assessment below.\n```json\n{\"needs_more_research\": false}\n```\nFOLLOW-UP QUESTIONS:\n1. ignored";
        assert_eq!(parse_needs_analysis(text), NeedsAnalysis::Complete);
    }

    #[test]
    fn test_malformed_json_falls_back_to_markers() {
        let text = "{\"needs_more_research\": maybe}\nFOLLOW-UP QUESTIONS:\n1. Real?";
        assert_eq!(follow_ups(text), vec!["1. Real?"]);
    }
}
