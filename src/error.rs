//! Error types for heatmap construction.

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, HeatmapError>;

/// Every way a dataset can be rejected.
///
/// There is no partial result: the first error aborts the whole
/// transformation for that dataset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeatmapError {
    #[error("Invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Records out of chronological order: {current} follows {previous}")]
    UnsortedInput { previous: String, current: String },

    #[error("Duplicate date in dataset: {0}")]
    DuplicateDate(String),

    #[error("Total mismatch on {date}: carried total {total}, counters sum to {sum}")]
    TotalMismatch { date: String, total: u32, sum: u32 },

    #[error("Counters on {0} sum past the supported maximum")]
    CountOverflow(String),

    #[error("Dataset spans {weeks} weeks ({first} to {last}), more than the {max_weeks} allowed")]
    SpanTooLarge {
        first: String,
        last: String,
        weeks: u64,
        max_weeks: usize,
    },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}
