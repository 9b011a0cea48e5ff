use crate::models::{NormalizedRow, NormalizedTable, RawTable, ReportDate, clean_label};
use crate::utils::error::{AppError, Result};

/// First-column text of the row that starts the country data.
pub const SENTINEL_LABEL: &str = "COUNTRY";

const DATE_MARKER: &str = "ending";
const INDEX_COLUMN: &str = "country";

/// Finds the "week ending ..." cell and reads the report date from it.
pub fn extract_report_date(table: &RawTable) -> Result<ReportDate> {
    let cell = table
        .first_column()
        .find(|text| text.to_lowercase().contains(DATE_MARKER))
        .ok_or_else(|| {
            AppError::parse(format!(
                "no row with {:?} in the first column of the report table",
                DATE_MARKER
            ))
        })?;

    ReportDate::parse_report_text(cell)
}

/// Reshapes the raw report table into a country-indexed table.
///
/// The single `COUNTRY` row marks the start of the data; the row right after
/// it holds the real column names, everything below that is data. A header
/// row that also starts with `COUNTRY` is the sentinel cell spanning down
/// into it and does not count as a second sentinel.
pub fn normalize(table: &RawTable) -> Result<NormalizedTable> {
    let sentinel_rows: Vec<usize> = table
        .first_column()
        .enumerate()
        .filter(|(_, text)| text.trim() == SENTINEL_LABEL)
        .map(|(index, _)| index)
        .collect();

    let sentinel = match sentinel_rows.as_slice() {
        [index] => *index,
        [index, spanned] if *spanned == index + 1 => *index,
        [] => {
            return Err(AppError::parse(format!(
                "no {:?} row in the report table",
                SENTINEL_LABEL
            )));
        }
        many => {
            return Err(AppError::parse(format!(
                "{:?} row appears {} times in the report table",
                SENTINEL_LABEL,
                many.len()
            )));
        }
    };

    let header = table.rows().get(sentinel + 1).ok_or_else(|| {
        AppError::parse(format!("no header row below the {:?} row", SENTINEL_LABEL))
    })?;

    let columns: Vec<String> = header.iter().map(|name| clean_label(name)).collect();
    let index_column = columns
        .iter()
        .position(|c| c == INDEX_COLUMN)
        .ok_or_else(|| {
            AppError::parse(format!(
                "header row {:?} has no {:?} column",
                header, INDEX_COLUMN
            ))
        })?;

    let rows = table
        .rows()
        .iter()
        .skip(sentinel + 2)
        .map(|row| NormalizedRow {
            label: clean_label(row.get(index_column).map(String::as_str).unwrap_or("")),
            values: row.clone(),
        })
        .collect();

    Ok(NormalizedTable::new(columns, rows))
}
