//! Annotation inputs: the user table, per-annotator review queues, and the
//! review texts themselves.
//!
//! Loaded once via [`Dataset::load`] and borrowed by every session.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::DatasetError;
use crate::review::{ParsedReview, parse_review, parse_review_value};

pub const USERS_FILE: &str = "user.csv";
pub const ASSIGNMENTS_FILE: &str = "annotator_mapping.json";
pub const REVIEWS_FILE: &str = "combined_mapping.json";
pub const RESULTS_FILE: &str = "evaluation_results.csv";

const USER_COLUMN: &str = "User";
const ANNOTATOR_COLUMN: &str = "annotator_id";

/// Locations of the input tables and the results file inside a data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    data_dir: PathBuf,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::new("data")
    }
}

impl DataPaths {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn users(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    pub fn assignments(&self) -> PathBuf {
        self.data_dir.join(ASSIGNMENTS_FILE)
    }

    pub fn reviews(&self) -> PathBuf {
        self.data_dir.join(REVIEWS_FILE)
    }

    pub fn results(&self) -> PathBuf {
        self.data_dir.join(RESULTS_FILE)
    }
}

// ── Users ──

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntry {
    /// Display name; also the `user` column of rating records.
    pub name: String,
    pub annotator_id: String,
}

/// Display name → annotator id, in file order.
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<UserEntry>,
}

impl UserTable {
    pub fn from_entries(users: Vec<UserEntry>) -> Self {
        Self { users }
    }

    /// Load `user.csv`. Header names are trimmed; every column is read as text.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let bytes = read_file(path)?;
        Self::from_csv(&bytes, path)
    }

    fn from_csv(bytes: &[u8], path: &Path) -> Result<Self, DatasetError> {
        let csv_err = |source: ArrowError| DatasetError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let (header, _) = Format::default()
            .with_header(true)
            .infer_schema(Cursor::new(bytes), Some(0))
            .map_err(csv_err)?;
        // Ids stay strings so numeric ids match the JSON mapping keys.
        let fields: Vec<Field> = header
            .fields()
            .iter()
            .map(|f| Field::new(f.name().trim(), DataType::Utf8, true))
            .collect();
        let schema = Arc::new(Schema::new(fields));

        let column = |column: &'static str| {
            schema
                .index_of(column)
                .map_err(|_| DatasetError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };
        let name_idx = column(USER_COLUMN)?;
        let id_idx = column(ANNOTATOR_COLUMN)?;

        let reader = ReaderBuilder::new(schema.clone())
            .with_header(true)
            .build(Cursor::new(bytes))
            .map_err(csv_err)?;

        let mut users = Vec::new();
        for batch in reader {
            let batch = batch.map_err(csv_err)?;
            let names = batch.column(name_idx).as_string::<i32>();
            let ids = batch.column(id_idx).as_string::<i32>();
            for row in 0..batch.num_rows() {
                if names.is_null(row) {
                    continue;
                }
                let annotator_id = if ids.is_null(row) {
                    String::new()
                } else {
                    ids.value(row).trim().to_string()
                };
                users.push(UserEntry {
                    name: names.value(row).trim().to_string(),
                    annotator_id,
                });
            }
        }
        Ok(Self { users })
    }

    pub fn users(&self) -> &[UserEntry] {
        &self.users
    }

    /// Annotator id of the first entry with this display name.
    pub fn annotator_for(&self, user: &str) -> Option<&str> {
        self.users
            .iter()
            .find(|u| u.name == user)
            .map(|u| u.annotator_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// ── Assignments ──

/// One review to rate: serialised as a `[paper_id, review_type]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct Assignment {
    pub paper_id: String,
    pub review_type: String,
}

impl Assignment {
    pub fn new(paper_id: impl Into<String>, review_type: impl Into<String>) -> Self {
        Self {
            paper_id: paper_id.into(),
            review_type: review_type.into(),
        }
    }
}

impl From<(String, String)> for Assignment {
    fn from((paper_id, review_type): (String, String)) -> Self {
        Self {
            paper_id,
            review_type,
        }
    }
}

impl From<Assignment> for (String, String) {
    fn from(a: Assignment) -> Self {
        (a.paper_id, a.review_type)
    }
}

/// Annotator id → ordered queue of assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignmentMap {
    queues: HashMap<String, Vec<Assignment>>,
}

impl AssignmentMap {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        read_json(path)
    }

    pub fn insert(&mut self, annotator_id: impl Into<String>, queue: Vec<Assignment>) {
        self.queues.insert(annotator_id.into(), queue);
    }

    /// The annotator's queue; empty if the annotator has none.
    pub fn queue_for(&self, annotator_id: &str) -> &[Assignment] {
        self.queues
            .get(annotator_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn annotator_count(&self) -> usize {
        self.queues.len()
    }
}

// ── Reviews ──

/// Paper id → review type → raw review value.
///
/// Values stay as JSON so non-string entries reach the parser as "not text".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewTable {
    papers: HashMap<String, HashMap<String, Value>>,
}

impl ReviewTable {
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        read_json(path)
    }

    pub fn insert(
        &mut self,
        paper_id: impl Into<String>,
        review_type: impl Into<String>,
        review: Value,
    ) {
        self.papers
            .entry(paper_id.into())
            .or_default()
            .insert(review_type.into(), review);
    }

    pub fn lookup(&self, paper_id: &str, review_type: &str) -> Option<&Value> {
        self.papers.get(paper_id)?.get(review_type)
    }

    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }
}

/// The raw review for an assignment, or the notice shown when it is missing.
#[derive(Debug, Clone, PartialEq)]
pub enum ReviewSource<'a> {
    Stored(&'a Value),
    Missing(String),
}

impl ReviewSource<'_> {
    pub fn parse(&self) -> ParsedReview {
        match self {
            ReviewSource::Stored(value) => parse_review_value(value),
            ReviewSource::Missing(notice) => parse_review(Some(notice.as_str())),
        }
    }
}

// ── Dataset ──

/// All annotation inputs, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub users: UserTable,
    pub assignments: AssignmentMap,
    pub reviews: ReviewTable,
}

impl Dataset {
    pub fn load(paths: &DataPaths) -> Result<Self, DatasetError> {
        let users = UserTable::load(&paths.users())?;
        let assignments = AssignmentMap::load(&paths.assignments())?;
        let reviews = ReviewTable::load(&paths.reviews())?;
        info!(
            users = users.len(),
            annotators = assignments.annotator_count(),
            papers = reviews.paper_count(),
            dir = %paths.data_dir().display(),
            "loaded dataset"
        );
        Ok(Self {
            users,
            assignments,
            reviews,
        })
    }

    pub fn review(&self, assignment: &Assignment) -> ReviewSource<'_> {
        match self
            .reviews
            .lookup(&assignment.paper_id, &assignment.review_type)
        {
            Some(value) => ReviewSource::Stored(value),
            None => ReviewSource::Missing(format!(
                "Review for Paper ID {} and type {} not found.",
                assignment.paper_id, assignment.review_type
            )),
        }
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, DatasetError> {
    std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            DatasetError::NotFound(path.to_path_buf())
        } else {
            DatasetError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })
}
