//! Rows page sent back to the grid

use serde::{Deserialize, Serialize};

use crate::compiler::CompiledQuery;

/// One result row, column name to value
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Sentinel meaning "more rows may exist"
pub const UNKNOWN_LAST_ROW: i64 = -1;

/// One page of rows for a server-side row model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowsPage {
    pub rows: Vec<Row>,

    /// Index one past the last row, or -1 while the end is unknown
    pub last_row: i64,

    /// Pivot result column names, present only in pivot mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_columns: Option<Vec<String>>,

    /// The statement that produced `rows`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_sql: Option<CompiledQuery>,

    /// Error text safe to show to the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ux_reportable_error: Option<String>,
}

impl RowsPage {
    /// True if the client should stop requesting pages
    pub fn is_complete(&self) -> bool {
        self.last_row != UNKNOWN_LAST_ROW
    }
}

/// `start_row + returned` if that does not pass `end_row`, else -1.
///
/// A sum that overflows `i64` is past any `end_row`.
pub fn last_row(start_row: i64, end_row: i64, returned: usize) -> i64 {
    i64::try_from(returned)
        .ok()
        .and_then(|n| start_row.checked_add(n))
        .filter(|current| *current <= end_row)
        .unwrap_or(UNKNOWN_LAST_ROW)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_page_is_last() {
        assert_eq!(last_row(0, 10, 3), 3);
        assert_eq!(last_row(20, 29, 0), 20);
    }

    #[test]
    fn test_full_page_is_open_ended() {
        // 11 rows requested (0..=10), 11 returned
        assert_eq!(last_row(0, 10, 11), UNKNOWN_LAST_ROW);
    }

    #[test]
    fn test_boundary() {
        assert_eq!(last_row(0, 10, 10), 10);
    }

    #[test]
    fn test_overflow_is_open_ended() {
        assert_eq!(last_row(i64::MAX, i64::MAX, 1), UNKNOWN_LAST_ROW);
        assert_eq!(last_row(i64::MAX, i64::MAX, 0), i64::MAX);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let page = RowsPage {
            rows: Vec::new(),
            last_row: 0,
            secondary_columns: None,
            from_sql: None,
            ux_reportable_error: None,
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json, serde_json::json!({"rows": [], "lastRow": 0}));
        assert!(page.is_complete());
    }
}
