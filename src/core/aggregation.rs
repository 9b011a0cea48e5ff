use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::NormalizedTable;
use crate::utils::error::{AppError, Result};

/// The source reports running bales in thousands.
const UNIT_SCALE: i64 = 1000;

pub const TOTAL_ROW: &str = "TOTAL";
pub const EXPORTS_COLUMN: &str = "exports";
pub const NEW_SALES_COLUMN: &str = "newsales";
pub const CANCELS_COLUMN: &str = "cancel";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFigures {
    pub exports: String,
    pub new_sales: String,
    pub cancels: String,
}

/// Value at `[row_label, column_label]`, scaled to units and formatted with
/// thousands separators. Duplicate rows are summed.
///
/// Scaling is decimal, not binary floating point, so `4.35` becomes `4,350`
/// rather than `4,349`. A value too large to scale or sum is a
/// `ConversionError`.
pub fn intersect(table: &NormalizedTable, row_label: &str, column_label: &str) -> Result<String> {
    let cells = table.lookup(row_label, column_label).ok_or_else(|| {
        AppError::parse(format!(
            "no {:?} column in report table (columns: {:?})",
            column_label,
            table.columns()
        ))
    })?;

    if cells.is_empty() {
        return Err(AppError::parse(format!("no {:?} row in report table", row_label)));
    }

    let overflow = |value: &str| AppError::Conversion {
        value: value.to_string(),
        row: row_label.to_string(),
        column: column_label.to_string(),
    };

    let mut total = Decimal::ZERO;
    for cell in &cells {
        let scaled = parse_cell(cell, row_label, column_label)?
            .checked_mul(Decimal::from(UNIT_SCALE))
            .ok_or_else(|| overflow(*cell))?;
        total = total.checked_add(scaled).ok_or_else(|| overflow(*cell))?;
    }

    let units = total
        .trunc()
        .to_i64()
        .ok_or_else(|| overflow(&total.to_string()))?;

    tracing::debug!(row = row_label, column = column_label, ?cells, units, "Aggregated figure");
    Ok(format_thousands(units))
}

pub fn export_figures(table: &NormalizedTable) -> Result<ExportFigures> {
    Ok(ExportFigures {
        exports: intersect(table, TOTAL_ROW, EXPORTS_COLUMN)?,
        new_sales: intersect(table, TOTAL_ROW, NEW_SALES_COLUMN)?,
        cancels: intersect(table, TOTAL_ROW, CANCELS_COLUMN)?,
    })
}

fn parse_cell(cell: &str, row: &str, column: &str) -> Result<Decimal> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&cleaned).map_err(|_| AppError::Conversion {
        value: cell.to_string(),
        row: row.to_string(),
        column: column.to_string(),
    })
}

/// `9600` -> `"9,600"`, `-1234567` -> `"-1,234,567"`.
pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NormalizedRow;
    use rstest::rstest;

    fn table(rows: &[(&str, &str, &str, &str)]) -> NormalizedTable {
        NormalizedTable::new(
            vec!["country".into(), "exports".into(), "newsales".into(), "cancel".into()],
            rows.iter()
                .map(|(label, exports, sales, cancel)| NormalizedRow {
                    label: crate::models::clean_label(label),
                    values: vec![
                        label.to_string(),
                        exports.to_string(),
                        sales.to_string(),
                        cancel.to_string(),
                    ],
                })
                .collect(),
        )
    }

    #[test]
    fn test_intersect_scales_single_value() {
        let table = table(&[("CHINA", "1.0", "2.0", "0"), ("TOTAL", "9.6", "12.3", "0.4")]);
        assert_eq!(intersect(&table, "TOTAL", "exports").unwrap(), "9,600");
        assert_eq!(intersect(&table, "TOTAL", "newsales").unwrap(), "12,300");
        assert_eq!(intersect(&table, "TOTAL", "cancel").unwrap(), "400");
    }

    #[test]
    fn test_intersect_sums_duplicate_rows() {
        let table = table(&[("TOTAL", "9.6", "1", "0"), ("TOTAL", "0.4", "1", "0")]);
        assert_eq!(intersect(&table, "TOTAL", "exports").unwrap(), "10,000");
    }

    #[test]
    fn test_intersect_scaling_is_exact() {
        // 4.35 * 1000 is 4349.999... in binary floating point
        let table = table(&[("TOTAL", "4.35", "1,234.5", "-0.2")]);
        assert_eq!(intersect(&table, "TOTAL", "exports").unwrap(), "4,350");
        assert_eq!(intersect(&table, "TOTAL", "newsales").unwrap(), "1,234,500");
        assert_eq!(intersect(&table, "TOTAL", "cancel").unwrap(), "-200");
    }

    #[test]
    fn test_intersect_non_numeric_cell() {
        let table = table(&[("TOTAL", "n/a", "1", "0")]);
        let err = intersect(&table, "TOTAL", "exports").unwrap_err();
        match err {
            AppError::Conversion { value, row, column } => {
                assert_eq!(value, "n/a");
                assert_eq!(row, "TOTAL");
                assert_eq!(column, "exports");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_intersect_overflow_is_a_conversion_error() {
        let table = table(&[("TOTAL", "79228162514264337593543950335", "1", "0")]);
        let err = intersect(&table, "TOTAL", "exports").unwrap_err();
        match err {
            AppError::Conversion { value, column, .. } => {
                assert_eq!(value, "79228162514264337593543950335");
                assert_eq!(column, "exports");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_intersect_sum_overflow_is_a_conversion_error() {
        let huge = "79228162514264337593543950";
        let table = table(&[("TOTAL", huge, "1", "0"), ("TOTAL", huge, "1", "0")]);
        assert!(matches!(
            intersect(&table, "TOTAL", "exports").unwrap_err(),
            AppError::Conversion { .. }
        ));
    }

    #[test]
    fn test_intersect_beyond_i64_is_a_conversion_error() {
        let table = table(&[("TOTAL", "10000000000000000000", "1", "0")]);
        assert!(matches!(
            intersect(&table, "TOTAL", "exports").unwrap_err(),
            AppError::Conversion { .. }
        ));
    }

    #[test]
    fn test_intersect_missing_row_and_column() {
        let table = table(&[("CHINA", "1", "1", "0")]);
        assert!(matches!(
            intersect(&table, "TOTAL", "exports").unwrap_err(),
            AppError::Parse { .. }
        ));
        assert!(matches!(
            intersect(&table, "CHINA", "shipments").unwrap_err(),
            AppError::Parse { .. }
        ));
    }

    #[test]
    fn test_export_figures() {
        let table = table(&[("TOTAL", "9.6", "12.3", "0.4")]);
        let figures = export_figures(&table).unwrap();
        assert_eq!(
            figures,
            ExportFigures {
                exports: "9,600".into(),
                new_sales: "12,300".into(),
                cancels: "400".into(),
            }
        );
    }

    #[rstest]
    #[case(0, "0")]
    #[case(400, "400")]
    #[case(9600, "9,600")]
    #[case(100000, "100,000")]
    #[case(1234567, "1,234,567")]
    #[case(-1234, "-1,234")]
    fn test_format_thousands(#[case] value: i64, #[case] expected: &str) {
        assert_eq!(format_thousands(value), expected);
    }
}
