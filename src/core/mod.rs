pub mod aggregation;
pub mod composer;
pub mod dedup;
pub mod report_parser;
pub mod table_selector;
pub mod time_gate;

pub use aggregation::{ExportFigures, export_figures, format_thousands, intersect};
pub use composer::MessageComposer;
pub use dedup::last_announced_date;
pub use report_parser::{extract_report_date, normalize};
pub use table_selector::{LargestTableSelector, TableSelector};
pub use time_gate::TimeWindowGate;
