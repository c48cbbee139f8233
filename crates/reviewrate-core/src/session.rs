//! Annotation sessions: one user working through their review queue.

use tracing::info;

use crate::dataset::{Assignment, Dataset};
use crate::error::SessionError;
use crate::rating::{RatingRecord, Scores};
use crate::review::ParsedReview;

/// Persistent destination for rating records.
///
/// The number of records already stored for a user is the only progress
/// marker: queues are rated in order and never skipped.
pub trait RatingLog {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist one record. On error the rating counts as not submitted.
    fn append(&self, record: &RatingRecord) -> Result<(), Self::Error>;

    /// Records stored for `user`; 0 when the log cannot be read.
    fn count_for_user(&self, user: &str) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The user's annotator has no queue.
    NoAssignments,
    /// `position` is 1-based.
    InProgress { position: usize, total: usize },
    Complete { total: usize },
}

/// The review currently waiting for scores.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentReview<'a> {
    pub assignment: &'a Assignment,
    pub position: usize,
    pub total: usize,
    pub review: ParsedReview,
}

/// Session state for one user: their queue and how far they have got.
#[derive(Debug, Clone)]
pub struct AnnotationSession<'a> {
    dataset: &'a Dataset,
    user: String,
    annotator_id: String,
    queue: &'a [Assignment],
    index: usize,
}

impl<'a> AnnotationSession<'a> {
    /// Start or resume a session, continuing after the records already in `log`.
    pub fn resume<L: RatingLog>(
        dataset: &'a Dataset,
        log: &L,
        user: &str,
    ) -> Result<Self, SessionError> {
        let annotator_id = dataset
            .users
            .annotator_for(user)
            .ok_or_else(|| SessionError::UnknownUser(user.to_string()))?
            .to_string();
        let queue = dataset.assignments.queue_for(&annotator_id);
        let index = log.count_for_user(user);
        info!(
            user,
            annotator_id = %annotator_id,
            completed = index,
            total = queue.len(),
            "resumed session"
        );
        Ok(Self {
            dataset,
            user: user.to_string(),
            annotator_id,
            queue,
            index,
        })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn annotator_id(&self) -> &str {
        &self.annotator_id
    }

    pub fn queue(&self) -> &'a [Assignment] {
        self.queue
    }

    /// Number of reviews rated so far (may exceed the queue length).
    pub fn completed(&self) -> usize {
        self.index
    }

    pub fn status(&self) -> SessionStatus {
        let total = self.queue.len();
        if total == 0 {
            SessionStatus::NoAssignments
        } else if self.index >= total {
            SessionStatus::Complete { total }
        } else {
            SessionStatus::InProgress {
                position: self.index + 1,
                total,
            }
        }
    }

    /// The pending review with its parsed text, if any.
    pub fn current(&self) -> Option<CurrentReview<'a>> {
        let assignment = self.queue.get(self.index)?;
        Some(CurrentReview {
            assignment,
            position: self.index + 1,
            total: self.queue.len(),
            review: self.dataset.review(assignment).parse(),
        })
    }

    /// Rate the pending review, persist the record, and advance.
    ///
    /// The session only advances once `log` accepted the record.
    pub fn submit<L: RatingLog>(
        &mut self,
        log: &L,
        scores: Scores,
    ) -> Result<RatingRecord, SessionError> {
        let assignment = self
            .queue
            .get(self.index)
            .ok_or_else(|| SessionError::NothingPending(self.user.clone()))?;
        let record = RatingRecord::new(
            self.user.as_str(),
            assignment.paper_id.as_str(),
            assignment.review_type.as_str(),
            scores,
        )?;
        log.append(&record)
            .map_err(|e| SessionError::Log(Box::new(e)))?;
        self.index += 1;
        info!(
            user = %self.user,
            paper_id = %record.paper_id,
            review_type = %record.review_type,
            completed = self.index,
            "rating submitted"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::dataset::{UserEntry, UserTable};

    #[derive(Default)]
    struct MemoryLog {
        records: RefCell<Vec<RatingRecord>>,
        fail: Cell<bool>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk full")]
    struct DiskFull;

    impl RatingLog for MemoryLog {
        type Error = DiskFull;

        fn append(&self, record: &RatingRecord) -> Result<(), DiskFull> {
            if self.fail.get() {
                return Err(DiskFull);
            }
            self.records.borrow_mut().push(record.clone());
            Ok(())
        }

        fn count_for_user(&self, user: &str) -> usize {
            self.records.borrow().iter().filter(|r| r.user == user).count()
        }
    }

    fn dataset() -> Dataset {
        let mut dataset = Dataset {
            users: UserTable::from_entries(vec![
                UserEntry {
                    name: "alice".into(),
                    annotator_id: "1".into(),
                },
                UserEntry {
                    name: "bob".into(),
                    annotator_id: "2".into(),
                },
            ]),
            ..Dataset::default()
        };
        dataset.assignments.insert(
            "1",
            vec![Assignment::new("p1", "human"), Assignment::new("p2", "gpt")],
        );
        dataset.reviews.insert(
            "p1",
            "human",
            serde_json::json!("**Summary**\nSolid.\n**Strengths**\n- clear"),
        );
        dataset
    }

    fn scores() -> Scores {
        Scores::new(4.0, 3.0, 2.5, 4.5)
    }

    #[test]
    fn fresh_session_starts_at_first_review() {
        let dataset = dataset();
        let log = MemoryLog::default();
        let session = AnnotationSession::resume(&dataset, &log, "alice").unwrap();
        assert_eq!(session.annotator_id(), "1");
        assert_eq!(
            session.status(),
            SessionStatus::InProgress {
                position: 1,
                total: 2
            }
        );
        let current = session.current().unwrap();
        assert_eq!(current.assignment, &Assignment::new("p1", "human"));
        assert_eq!(current.review.summary, vec!["Solid."]);
        assert_eq!(current.review.strengths, vec!["clear"]);
    }

    #[test]
    fn submit_advances_and_completes() {
        let dataset = dataset();
        let log = MemoryLog::default();
        let mut session = AnnotationSession::resume(&dataset, &log, "alice").unwrap();

        let record = session.submit(&log, scores()).unwrap();
        assert_eq!(record.paper_id, "p1");
        assert_eq!(record.review_type, "human");
        assert_eq!(session.completed(), 1);

        // Missing review text falls back to the not-found notice.
        let current = session.current().unwrap();
        assert_eq!(current.position, 2);
        assert!(current.review.is_empty());

        session.submit(&log, scores()).unwrap();
        assert_eq!(session.status(), SessionStatus::Complete { total: 2 });
        assert!(session.current().is_none());
        assert!(matches!(
            session.submit(&log, scores()),
            Err(SessionError::NothingPending(_))
        ));
        assert_eq!(log.count_for_user("alice"), 2);
    }

    #[test]
    fn resume_continues_after_stored_records() {
        let dataset = dataset();
        let log = MemoryLog::default();
        AnnotationSession::resume(&dataset, &log, "alice")
            .unwrap()
            .submit(&log, scores())
            .unwrap();

        let session = AnnotationSession::resume(&dataset, &log, "alice").unwrap();
        assert_eq!(
            session.current().unwrap().assignment,
            &Assignment::new("p2", "gpt")
        );
    }

    #[test]
    fn unrated_scores_do_not_advance() {
        let dataset = dataset();
        let log = MemoryLog::default();
        let mut session = AnnotationSession::resume(&dataset, &log, "alice").unwrap();
        let result = session.submit(&log, Scores::new(4.0, 0.0, 2.0, 1.0));
        assert!(matches!(result, Err(SessionError::Rating(_))));
        assert_eq!(session.completed(), 0);
        assert!(log.records.borrow().is_empty());
    }

    #[test]
    fn failed_append_does_not_advance() {
        let dataset = dataset();
        let log = MemoryLog::default();
        log.fail.set(true);
        let mut session = AnnotationSession::resume(&dataset, &log, "alice").unwrap();
        let result = session.submit(&log, scores());
        assert!(matches!(result, Err(SessionError::Log(_))));
        assert_eq!(session.completed(), 0);
    }

    #[test]
    fn user_without_queue_has_no_assignments() {
        let dataset = dataset();
        let log = MemoryLog::default();
        let session = AnnotationSession::resume(&dataset, &log, "bob").unwrap();
        assert_eq!(session.status(), SessionStatus::NoAssignments);
        assert!(session.current().is_none());
    }

    #[test]
    fn unknown_user_is_rejected() {
        let dataset = dataset();
        let log = MemoryLog::default();
        assert!(matches!(
            AnnotationSession::resume(&dataset, &log, "mallory"),
            Err(SessionError::UnknownUser(name)) if name == "mallory"
        ));
    }
}
