pub mod normalized_table;
pub mod raw_table;
pub mod report_date;

// Re-exports for convenience
pub use normalized_table::{NormalizedRow, NormalizedTable, clean_label};
pub use raw_table::RawTable;
pub use report_date::ReportDate;
