//! Storage layer: append-only CSV log of rating records.

mod error;
pub use error::StoreError;

mod evaluations;
pub use evaluations::EvaluationStore;
