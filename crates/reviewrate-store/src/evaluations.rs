//! CSV evaluation store: the append-only log of submitted ratings.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::record_batch::RecordBatch;
use reviewrate_core::ratings::{self, COLUMNS};
use reviewrate_core::{RatingLog, RatingRecord, Scores};
use tracing::{debug, info, warn};

use crate::StoreError;

/// Append-only store of [`RatingRecord`]s in a single CSV file.
///
/// Every append reads the existing rows, adds one, and rewrites the whole
/// file through a temporary file in the same directory, so the file always
/// holds the result of the last successful append. There is no locking:
/// two processes appending at once can lose a record.
///
/// The number of rows per user doubles as that user's progress marker, see
/// [`count_for_user`](Self::count_for_user).
#[derive(Debug, Clone)]
pub struct EvaluationStore {
    path: PathBuf,
}

impl EvaluationStore {
    /// Use the results file at `path`. Nothing is read or created until the
    /// first call.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// All stored records in file order.
    ///
    /// A zero-byte or header-only file is an empty store.
    pub fn load(&self) -> Result<Vec<RatingRecord>, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };
        decode(&bytes)
    }

    /// Append one record, creating the file (with header) if needed.
    ///
    /// Fails without touching the file if the existing contents cannot be read.
    pub fn append(&self, record: &RatingRecord) -> Result<(), StoreError> {
        let mut records = if self.exists() {
            self.load()?
        } else {
            Vec::new()
        };
        records.push(record.clone());
        self.rewrite(&records)?;
        info!(
            path = %self.path.display(),
            user = %record.user,
            paper_id = %record.paper_id,
            total = records.len(),
            "appended rating"
        );
        Ok(())
    }

    /// Number of records stored for `user`.
    ///
    /// Progress tracking is best-effort: a missing, empty, or unreadable file
    /// counts as zero.
    pub fn count_for_user(&self, user: &str) -> usize {
        match self.load() {
            Ok(records) => records.iter().filter(|r| r.user == user).count(),
            Err(StoreError::NotFound(_)) => {
                debug!(path = %self.path.display(), "no results file yet");
                0
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "could not read results; treating progress as zero"
                );
                0
            }
        }
    }

    fn rewrite(&self, records: &[RatingRecord]) -> Result<(), StoreError> {
        let bytes = encode(records)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path)?;
        Ok(())
    }
}

impl RatingLog for EvaluationStore {
    type Error = StoreError;

    fn append(&self, record: &RatingRecord) -> Result<(), StoreError> {
        EvaluationStore::append(self, record)
    }

    fn count_for_user(&self, user: &str) -> usize {
        EvaluationStore::count_for_user(self, user)
    }
}

// ── CSV encoding ──

fn encode(records: &[RatingRecord]) -> Result<Vec<u8>, StoreError> {
    let batch = records_to_batch(records)?;
    let mut buf = Vec::new();
    {
        let mut writer = WriterBuilder::new().with_header(true).build(&mut buf);
        writer.write(&batch)?;
    }
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<Vec<RatingRecord>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    // The reader maps columns by position, so check the header names first.
    let (header, _) = Format::default()
        .with_header(true)
        .infer_schema(Cursor::new(bytes), Some(0))?;
    let found: Vec<String> = header.fields().iter().map(|f| f.name().clone()).collect();
    if found.len() != COLUMNS.len() || found.iter().zip(COLUMNS).any(|(f, c)| f != c) {
        return Err(StoreError::SchemaMismatch { found });
    }

    let reader = ReaderBuilder::new(Arc::new(ratings::rating_schema()))
        .with_header(true)
        .build(Cursor::new(bytes))?;

    let mut records = Vec::new();
    for batch in reader {
        batch_to_records(&batch?, &mut records)?;
    }
    Ok(records)
}

fn records_to_batch(records: &[RatingRecord]) -> Result<RecordBatch, StoreError> {
    let text = |field: fn(&RatingRecord) -> &str| -> ArrayRef {
        Arc::new(StringArray::from_iter_values(records.iter().map(field)))
    };
    let score = |field: fn(&Scores) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| field(&r.scores)),
        ))
    };

    let columns = vec![
        text(|r| r.timestamp.as_str()),
        text(|r| r.user.as_str()),
        text(|r| r.paper_id.as_str()),
        text(|r| r.review_type.as_str()),
        score(|s| s.reviewer_confidence),
        score(|s| s.review_thoroughness),
        score(|s| s.constructiveness),
        score(|s| s.helpfulness),
    ];
    Ok(RecordBatch::try_new(
        Arc::new(ratings::rating_schema()),
        columns,
    )?)
}

fn batch_to_records(batch: &RecordBatch, out: &mut Vec<RatingRecord>) -> Result<(), StoreError> {
    let timestamp = utf8_column(batch, "timestamp")?;
    let user = utf8_column(batch, "user")?;
    let paper_id = utf8_column(batch, "paper_id")?;
    let review_type = utf8_column(batch, "review_type")?;
    let confidence = f64_column(batch, "reviewer_confidence")?;
    let thoroughness = f64_column(batch, "review_thoroughness")?;
    let constructiveness = f64_column(batch, "constructiveness")?;
    let helpfulness = f64_column(batch, "helpfulness")?;

    // Empty cells read back as null.
    let text = |col: &StringArray, row: usize| -> String {
        if col.is_null(row) {
            String::new()
        } else {
            col.value(row).to_string()
        }
    };

    for row in 0..batch.num_rows() {
        out.push(RatingRecord::with_timestamp(
            text(timestamp, row),
            text(user, row),
            text(paper_id, row),
            text(review_type, row),
            Scores::new(
                confidence.value(row),
                thoroughness.value(row),
                constructiveness.value(row),
                helpfulness.value(row),
            ),
        ));
    }
    Ok(())
}

fn utf8_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b StringArray, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| StoreError::Other(format!("{name} column not utf8")))
}

fn f64_column<'b>(batch: &'b RecordBatch, name: &str) -> Result<&'b Float64Array, StoreError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
        .ok_or_else(|| StoreError::Other(format!("{name} column not f64")))
}
