/// Arrow schema definitions for the evaluation results table.
pub mod ratings {
    use arrow::datatypes::{DataType, Field, Schema};

    /// Column names of the results file, in order.
    pub const COLUMNS: [&str; 8] = [
        "timestamp",
        "user",
        "paper_id",
        "review_type",
        "reviewer_confidence",
        "review_thoroughness",
        "constructiveness",
        "helpfulness",
    ];

    /// Schema for rating records.
    ///
    /// Text columns are nullable because CSV reads empty cells back as null.
    pub fn rating_schema() -> Schema {
        Schema::new(vec![
            Field::new("timestamp", DataType::Utf8, true),
            Field::new("user", DataType::Utf8, true),
            Field::new("paper_id", DataType::Utf8, true),
            Field::new("review_type", DataType::Utf8, true),
            Field::new("reviewer_confidence", DataType::Float64, false),
            Field::new("review_thoroughness", DataType::Float64, false),
            Field::new("constructiveness", DataType::Float64, false),
            Field::new("helpfulness", DataType::Float64, false),
        ])
    }
}
