pub mod dataset;
pub mod error;
pub mod rating;
pub mod review;
pub mod schema;
pub mod session;

pub use dataset::{Assignment, DataPaths, Dataset, ReviewSource, UserEntry};
pub use error::{DatasetError, RatingError, SessionError};
pub use rating::{RatingRecord, Scores};
pub use review::{ParsedReview, parse_review, parse_review_value};
pub use schema::ratings;
pub use session::{AnnotationSession, CurrentReview, RatingLog, SessionStatus};
