//! Batch grouping errors.

/// Grouping failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum GroupingErrorKind {
    /// Input was non-empty but no creative carried an idea identifier.
    #[display("None of {} creatives could be grouped by idea", _0)]
    Ungroupable(usize),
}

/// Grouping error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Grouping Error: {} at line {} in {}", kind, line, file)]
pub struct GroupingError {
    /// The specific error condition
    pub kind: GroupingErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl GroupingError {
    /// Create a new GroupingError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GroupingErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
