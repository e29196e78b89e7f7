//! Tabular result types

/// Header row plus data rows, recomputed from the stored bytes on every read.
///
/// Row lengths are passed through as read; they are not forced to match `columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabularData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularData {
    /// True when the source held no records at all
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}
