use crate::models::RawTable;
use crate::utils::error::{AppError, Result};

/// Picks the report table out of everything found on the page.
///
/// Kept behind a trait so a change in the page layout only needs a new
/// strategy, not changes to the parsing stages downstream.
pub trait TableSelector: Send + Sync {
    fn name(&self) -> &'static str;
    fn select(&self, tables: Vec<RawTable>) -> Result<RawTable>;
}

/// Chooses the table with the most cells (`rows * columns`). The first one
/// wins a tie.
#[derive(Debug, Clone, Copy, Default)]
pub struct LargestTableSelector;

impl TableSelector for LargestTableSelector {
    fn name(&self) -> &'static str {
        "largest"
    }

    fn select(&self, tables: Vec<RawTable>) -> Result<RawTable> {
        let mut best: Option<RawTable> = None;
        for table in tables {
            // Strictly greater keeps the earliest maximum
            if best.as_ref().is_none_or(|b| table.size() > b.size()) {
                best = Some(table);
            }
        }
        best.ok_or_else(|| AppError::parse("no tables found on the report page"))
    }
}
