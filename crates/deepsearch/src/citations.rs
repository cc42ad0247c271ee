//! Result deduplication and citation formatting
//!
//! Both helpers borrow from the accumulated results; the state itself is never
//! reordered or shrunk.

use std::collections::HashSet;

use crate::state::ResearchResult;

/// Keep the first record for each content fingerprint (its first `len`
/// characters). Records whose content is blank are dropped.
pub fn dedup_by_content(results: &[ResearchResult], len: usize) -> Vec<&ResearchResult> {
    let mut seen = HashSet::new();
    results
        .iter()
        .filter(|result| !result.content().trim().is_empty())
        .filter(|result| {
            let fingerprint: String = result.content().chars().take(len).collect();
            seen.insert(fingerprint)
        })
        .collect()
}

/// Keep the first record for each distinct non-empty URL.
///
/// Records without a URL are dropped, unless no record has a URL at all, in
/// which case every record is kept.
pub fn dedup_by_url(results: &[ResearchResult]) -> Vec<&ResearchResult> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut unique = Vec::new();
    for result in results {
        let url = result.url();
        if !url.is_empty() && seen.insert(url) {
            unique.push(result);
        }
    }

    if unique.is_empty() {
        results.iter().collect()
    } else {
        unique
    }
}

/// Citation marker for the 1-based `index`: `[n](url)`, or `[n]` without a URL
pub fn citation(index: usize, url: &str) -> String {
    if url.is_empty() {
        format!("[{index}]")
    } else {
        format!("[{index}]({url})")
    }
}

/// One line per record: `{content} [n](url)`
pub fn format_with_citations(results: &[&ResearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| format!("{} {}", result.content(), citation(i + 1, result.url())))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents<'a>(results: &[&'a ResearchResult]) -> Vec<&'a str> {
        results.iter().map(|r| r.content()).collect()
    }

    #[test]
    fn test_content_dedup_keeps_first_occurrence() {
        let results = vec![
            ResearchResult::new("abc", "http://a"),
            ResearchResult::new("abc", "http://b"),
            ResearchResult::new("xyz", "http://c"),
        ];

        let unique = dedup_by_content(&results, 100);
        assert_eq!(contents(&unique), vec!["abc", "xyz"]);
        assert_eq!(unique[0].url(), "http://a");
    }

    #[test]
    fn test_content_dedup_uses_prefix_only() {
        let shared = "p".repeat(100);
        let results = vec![
            ResearchResult::new(format!("{shared} first tail"), "http://a"),
            ResearchResult::new(format!("{shared} second tail"), "http://b"),
            ResearchResult::new("short", ""),
        ];

        let unique = dedup_by_content(&results, 100);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].url(), "http://a");
        assert_eq!(unique[1].content(), "short");
    }

    #[test]
    fn test_content_dedup_drops_blank_content() {
        let results = vec![
            ResearchResult::new("   ", "http://a"),
            ResearchResult::default(),
            ResearchResult::new("body", "http://b"),
        ];
        assert_eq!(contents(&dedup_by_content(&results, 100)), vec!["body"]);
    }

    #[test]
    fn test_url_dedup_drops_duplicates_and_blank_urls() {
        let results = vec![
            ResearchResult::new("one", "http://a"),
            ResearchResult::new("two", "http://a"),
            ResearchResult::new("three", ""),
            ResearchResult::new("four", "http://b"),
        ];

        let unique = dedup_by_url(&results);
        assert_eq!(contents(&unique), vec!["one", "four"]);
    }

    #[test]
    fn test_url_dedup_keeps_everything_without_urls() {
        let results = vec![
            ResearchResult::new("one", ""),
            ResearchResult::new("one", ""),
        ];
        assert_eq!(dedup_by_url(&results).len(), 2);
    }

    #[test]
    fn test_format_with_citations() {
        let a = ResearchResult::new("Alpha", "http://a");
        let b = ResearchResult::new("Beta", "");

        assert_eq!(
            format_with_citations(&[&a, &b]),
            "Alpha [1](http://a)\nBeta [2]"
        );
        assert_eq!(format_with_citations(&[]), "");
    }
}
