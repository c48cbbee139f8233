//! Rating records: one row per submitted evaluation.

use serde::{Deserialize, Serialize};

use crate::error::RatingError;

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 5.0;

/// `datetime.isoformat()`-style local timestamp, microsecond precision, no offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// The four scores an annotator assigns to one review.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub reviewer_confidence: f64,
    pub review_thoroughness: f64,
    pub constructiveness: f64,
    pub helpfulness: f64,
}

impl Scores {
    pub fn new(
        reviewer_confidence: f64,
        review_thoroughness: f64,
        constructiveness: f64,
        helpfulness: f64,
    ) -> Self {
        Self {
            reviewer_confidence,
            review_thoroughness,
            constructiveness,
            helpfulness,
        }
    }

    /// Scores paired with their column names, in column order.
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("reviewer_confidence", self.reviewer_confidence),
            ("review_thoroughness", self.review_thoroughness),
            ("constructiveness", self.constructiveness),
            ("helpfulness", self.helpfulness),
        ]
    }

    /// Check that every score lies in `[0.0, 5.0]` and none is left at zero.
    ///
    /// Zero is the form default, so it means "not rated".
    pub fn validate(&self) -> Result<(), RatingError> {
        for (score, value) in self.named() {
            if !value.is_finite() || !(MIN_SCORE..=MAX_SCORE).contains(&value) {
                return Err(RatingError::OutOfRange { score, value });
            }
            if value == 0.0 {
                return Err(RatingError::Unrated(score));
            }
        }
        Ok(())
    }
}

/// A persisted evaluation of one review by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    /// ISO 8601 timestamp string.
    pub timestamp: String,
    pub user: String,
    pub paper_id: String,
    pub review_type: String,
    #[serde(flatten)]
    pub scores: Scores,
}

impl RatingRecord {
    /// Validate `scores` and stamp a new record with the current local time.
    pub fn new(
        user: impl Into<String>,
        paper_id: impl Into<String>,
        review_type: impl Into<String>,
        scores: Scores,
    ) -> Result<Self, RatingError> {
        scores.validate()?;
        Ok(Self::with_timestamp(
            timestamp_now(),
            user,
            paper_id,
            review_type,
            scores,
        ))
    }

    /// Build a record as-is, without validation. Used when reading stored rows.
    pub fn with_timestamp(
        timestamp: impl Into<String>,
        user: impl Into<String>,
        paper_id: impl Into<String>,
        review_type: impl Into<String>,
        scores: Scores,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            user: user.into(),
            paper_id: paper_id.into(),
            review_type: review_type.into(),
            scores,
        }
    }
}

/// Current local time in the stored timestamp format.
pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}
