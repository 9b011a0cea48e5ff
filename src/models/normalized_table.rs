use serde::{Deserialize, Serialize};

/// Lowercase ASCII letters only: `"NEW SALES 1/"` becomes `"newsales"`.
pub fn clean_label(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub label: String,
    pub values: Vec<String>,
}

/// Country-indexed report table with cleaned column names.
///
/// Row labels may repeat (the source page sometimes carries more than one
/// `TOTAL` line), so lookups return every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    columns: Vec<String>,
    rows: Vec<NormalizedRow>,
}

impl NormalizedTable {
    pub fn new(columns: Vec<String>, rows: Vec<NormalizedRow>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        let wanted = clean_label(column);
        self.columns.iter().position(|c| *c == wanted)
    }

    pub fn has_row(&self, label: &str) -> bool {
        let wanted = clean_label(label);
        self.rows.iter().any(|r| r.label == wanted)
    }

    /// All cells at `[label, column]`, in row order. `None` if the column does
    /// not exist; an empty vec if no row carries the label.
    pub fn lookup(&self, label: &str, column: &str) -> Option<Vec<&str>> {
        let index = self.column_index(column)?;
        let wanted = clean_label(label);
        Some(
            self.rows
                .iter()
                .filter(|r| r.label == wanted)
                .map(|r| r.values.get(index).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}
