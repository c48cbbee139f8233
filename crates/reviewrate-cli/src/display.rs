//! Plain-text rendering of parsed reviews and session progress.

use reviewrate_core::{AnnotationSession, CurrentReview, ParsedReview, SessionStatus};

/// Print a parsed review as a card: summary paragraph, then bullet sections.
///
/// Empty sections are skipped.
pub fn print_review(review: &ParsedReview) {
    print!("{}", render_review(review));
}

pub fn print_current(current: &CurrentReview<'_>) {
    println!(
        "=== Review {} of {} ===",
        current.position, current.total
    );
    println!(
        "paper {}  type {}",
        current.assignment.paper_id, current.assignment.review_type
    );
    println!();
    print_review(&current.review);
}

pub fn print_status(session: &AnnotationSession<'_>) {
    println!("{}", render_status(session.user(), session.status()));
}

fn render_review(review: &ParsedReview) -> String {
    let mut out = String::new();
    if let Some(summary) = review.summary_text() {
        out.push_str("Summary\n");
        for line in summary.lines() {
            out.push_str(&format!("  {line}\n"));
        }
        out.push('\n');
    }
    for (header, points) in review.point_sections() {
        if points.is_empty() {
            continue;
        }
        out.push_str(header);
        out.push('\n');
        for point in points {
            let mut lines = point.lines();
            if let Some(first) = lines.next() {
                out.push_str(&format!("  - {first}\n"));
            }
            for line in lines {
                out.push_str(&format!("    {line}\n"));
            }
        }
        out.push('\n');
    }
    out
}

fn render_status(user: &str, status: SessionStatus) -> String {
    match status {
        SessionStatus::NoAssignments => format!("{user}: no reviews assigned"),
        SessionStatus::InProgress { position, total } => {
            format!("{user}: {}/{total} rated, next is review {position}", position - 1)
        }
        SessionStatus::Complete { total } => {
            format!("{user}: {total}/{total} rated, all assigned reviews complete")
        }
    }
}
