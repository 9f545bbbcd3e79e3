use mdrecon_table::DType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation; absent below two values.
    pub std_dev: Option<f64>,
    pub sum: f64,
}

/// Length summary in characters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringStats {
    pub min_length: usize,
    pub max_length: usize,
    pub avg_length: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
    /// Share of all rows, nulls included.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub dtype: DType,
    pub total_count: usize,
    pub null_count: usize,
    pub null_percentage: f64,
    pub unique_count: usize,
    /// Distinct non-null values over total rows; 0 for an empty column.
    pub cardinality: f64,
    pub is_unique: bool,
    pub is_constant: bool,
    pub numeric_stats: Option<NumericStats>,
    pub string_stats: Option<StringStats>,
    pub patterns: Vec<String>,
    pub top_values: Vec<ValueCount>,
    pub quality_score: f64,
    pub error: Option<String>,
}

impl ColumnProfile {
    /// Placeholder for a column whose statistics could not be computed.
    pub fn failed(name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            name: name.into(),
            dtype: DType::String,
            total_count: 0,
            null_count: 0,
            null_percentage: 0.0,
            unique_count: 0,
            cardinality: 0.0,
            is_unique: false,
            is_constant: false,
            numeric_stats: None,
            string_stats: None,
            patterns: Vec::new(),
            top_values: Vec::new(),
            quality_score: 0.0,
            error: Some(error.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResult {
    pub success: bool,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnProfile>,
    /// Rows identical to an earlier row across every column.
    pub duplicate_rows: usize,
    pub overall_quality_score: f64,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub profile_time_ms: u64,
}

impl ProfileResult {
    pub fn column(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }
}
