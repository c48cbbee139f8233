//! Review text parsing.
//!
//! Reviews arrive as a single string with bold section markers:
//!
//! ```text
//! **Summary**
//! One paragraph, kept whole.
//! **Strengths**
//! - first point
//! - second point
//! **Weaknesses**
//! - ...
//! **Questions**
//! - ...
//! ```
//!
//! Each section runs from its marker to the first later occurrence of the
//! *next* marker in that fixed order (or the end of the text). Point sections
//! are split on `"\n-"`, so a point only loses its bullet when it follows a
//! newline, or when the whole section starts with a literal `-`. Existing
//! rating data was collected against exactly this behaviour.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Summary shown when the review value is not text at all.
pub const NOT_AVAILABLE: &str = "Not Available";

const SUMMARY: &str = "**Summary**";
const STRENGTHS: &str = "**Strengths**";
const WEAKNESSES: &str = "**Weaknesses**";
const QUESTIONS: &str = "**Questions**";

const POINT_DELIMITER: &str = "\n-";

/// A review split into its labelled sections.
///
/// Every field is always present; missing sections are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReview {
    /// At most one entry: the stripped summary block.
    pub summary: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub questions: Vec<String>,
}

impl ParsedReview {
    /// The placeholder used for review values that are not strings.
    pub fn not_available() -> Self {
        Self {
            summary: vec![NOT_AVAILABLE.to_string()],
            ..Self::default()
        }
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.summary.first().map(String::as_str)
    }

    /// The bullet-point sections in display order, labelled.
    pub fn point_sections(&self) -> [(&'static str, &[String]); 3] {
        [
            ("Strengths", self.strengths.as_slice()),
            ("Weaknesses", self.weaknesses.as_slice()),
            ("Questions", self.questions.as_slice()),
        ]
    }

    /// True when no section carries any content.
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty()
            && self.strengths.is_empty()
            && self.weaknesses.is_empty()
            && self.questions.is_empty()
    }
}

/// Parse raw review text into sections. `None` means the value was not a string.
///
/// Never fails: degenerate input yields empty sections.
pub fn parse_review(text: Option<&str>) -> ParsedReview {
    let Some(text) = text else {
        return ParsedReview::not_available();
    };

    let mut review = ParsedReview::default();

    if let Some(content) = section(text, SUMMARY, Some(STRENGTHS)) {
        let content = content.trim();
        if !content.is_empty() {
            review.summary.push(content.to_string());
        }
    }
    if let Some(content) = section(text, STRENGTHS, Some(WEAKNESSES)) {
        review.strengths = split_points(content);
    }
    if let Some(content) = section(text, WEAKNESSES, Some(QUESTIONS)) {
        review.weaknesses = split_points(content);
    }
    if let Some(content) = section(text, QUESTIONS, None) {
        review.questions = split_points(content);
    }

    tracing::debug!(
        summary = review.summary.len(),
        strengths = review.strengths.len(),
        weaknesses = review.weaknesses.len(),
        questions = review.questions.len(),
        "parsed review"
    );
    review
}

/// Parse a review value as stored in the reviews table.
///
/// JSON strings are parsed as text; every other value (null, numbers, ...)
/// is treated as "not a string".
pub fn parse_review_value(value: &Value) -> ParsedReview {
    parse_review(value.as_str())
}

/// Content between the first `marker` and the first later `next` marker.
fn section<'a>(text: &'a str, marker: &str, next: Option<&str>) -> Option<&'a str> {
    let start = text.find(marker)? + marker.len();
    let rest = &text[start..];
    let end = next.and_then(|n| rest.find(n)).unwrap_or(rest.len());
    Some(&rest[..end])
}

fn split_points(content: &str) -> Vec<String> {
    content
        .trim()
        .split(POINT_DELIMITER)
        .filter_map(|candidate| {
            let mut point = candidate.trim();
            // Only a section that starts with "-" leaves a bullet on its first point.
            if let Some(rest) = point.strip_prefix('-') {
                point = rest.trim();
            }
            (!point.is_empty()).then(|| point.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = "**Summary**\nGood paper.\n**Strengths**\n- clear writing\n- solid experiments\n**Weaknesses**\n- too long\n**Questions**\nWhy not compare to X?";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn non_string_is_not_available() {
        let expected = ParsedReview {
            summary: strings(&["Not Available"]),
            ..ParsedReview::default()
        };
        assert_eq!(parse_review(None), expected);
        assert_eq!(parse_review_value(&Value::Null), expected);
        assert_eq!(parse_review_value(&serde_json::json!(42)), expected);
    }

    #[test]
    fn full_review() {
        let review = parse_review(Some(FULL));
        assert_eq!(review.summary, strings(&["Good paper."]));
        assert_eq!(
            review.strengths,
            strings(&["clear writing", "solid experiments"])
        );
        assert_eq!(review.weaknesses, strings(&["too long"]));
        assert_eq!(review.questions, strings(&["Why not compare to X?"]));
    }

    #[test]
    fn json_string_value_is_parsed() {
        let review = parse_review_value(&Value::String(FULL.to_string()));
        assert_eq!(review, parse_review(Some(FULL)));
    }

    #[test]
    fn missing_sections_are_empty() {
        let review = parse_review(Some("**Summary**\nOnly a summary here."));
        assert_eq!(review.summary, strings(&["Only a summary here."]));
        assert!(review.strengths.is_empty());
        assert!(review.weaknesses.is_empty());
        assert!(review.questions.is_empty());
    }

    #[test]
    fn text_without_markers_is_empty() {
        let review = parse_review(Some(
            "Review for Paper ID 12 and type human not found.",
        ));
        assert!(review.is_empty());
    }

    #[test]
    fn whitespace_only_sections_are_empty() {
        let review = parse_review(Some(
            "**Summary**\n   \n**Strengths**\n \n\t\n**Weaknesses**\n**Questions**\n\n",
        ));
        assert!(review.summary.is_empty());
        assert!(review.strengths.is_empty());
        assert!(review.weaknesses.is_empty());
        assert!(review.questions.is_empty());
    }

    #[test]
    fn summary_runs_to_end_without_strengths() {
        // Summary only stops at Strengths, so later markers stay in its text.
        let review = parse_review(Some("**Summary**\nShort.\n**Weaknesses**\n- w1"));
        assert_eq!(review.summary, strings(&["Short.\n**Weaknesses**\n- w1"]));
        assert_eq!(review.weaknesses, strings(&["w1"]));
    }

    #[test]
    fn first_point_without_hyphen_is_kept_whole() {
        let review = parse_review(Some("**Strengths** novel idea\n- good ablations"));
        assert_eq!(review.strengths, strings(&["novel idea", "good ablations"]));
    }

    #[test]
    fn indented_sub_bullets_stay_with_their_point() {
        let review = parse_review(Some(
            "**Weaknesses**\n- missing baselines\n  - no X\n  - no Y\n- unclear notation",
        ));
        assert_eq!(
            review.weaknesses,
            strings(&["missing baselines\n  - no X\n  - no Y", "unclear notation"])
        );
    }

    #[test]
    fn multi_line_points_and_blank_lines() {
        let review = parse_review(Some(
            "**Questions**\n\n- How does it scale?\nPlease add a plot.\n\n- Why this dataset?\n",
        ));
        assert_eq!(
            review.questions,
            strings(&[
                "How does it scale?\nPlease add a plot.",
                "Why this dataset?"
            ])
        );
    }

    #[test]
    fn double_hyphen_loses_one_bullet() {
        let review = parse_review(Some("**Strengths**\n- a\n--b\n-\n- c"));
        assert_eq!(review.strengths, strings(&["a", "b", "c"]));
    }

    #[test]
    fn sections_use_first_marker_occurrence() {
        let text = "**Strengths**\n- s1\n**Weaknesses**\n- w1\n**Strengths**\n- s2\n**Questions**\n- q1";
        let review = parse_review(Some(text));
        assert_eq!(review.strengths, strings(&["s1"]));
        assert_eq!(
            review.weaknesses,
            strings(&["w1\n**Strengths**", "s2"])
        );
        assert_eq!(review.questions, strings(&["q1"]));
    }

    #[test]
    fn sections_out_of_order() {
        // Questions before Strengths: Strengths runs to Weaknesses or the end.
        let review = parse_review(Some("**Questions**\n- q1\n**Strengths**\n- s1"));
        assert_eq!(review.strengths, strings(&["s1"]));
        assert_eq!(review.questions, strings(&["q1\n**Strengths**", "s1"]));
    }

    #[test]
    fn parsing_is_idempotent() {
        assert_eq!(parse_review(Some(FULL)), parse_review(Some(FULL)));
    }

    #[test]
    fn point_sections_are_labelled_in_order() {
        let review = parse_review(Some(FULL));
        let labels: Vec<&str> = review.point_sections().iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, ["Strengths", "Weaknesses", "Questions"]);
        assert_eq!(review.summary_text(), Some("Good paper."));
    }
}
