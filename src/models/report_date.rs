//! Report dates and the two text grammars they are read from.
//!
//! * Report grammar (the "week ending" cell of the source table): the first
//!   three runs of ASCII digits anywhere in the text are month, day and year.
//!   A year below 100 is a two-digit year.
//! * Announcement grammar (our own past posts): the first
//!   `digits/digits/digits` substring, read strictly as `%m/%d/%y`.
//!
//! The two are kept apart so a four-digit report year never gets confused with
//! the two-digit year that appears in published messages.

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use crate::utils::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportDate(NaiveDate);

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("static regex"))
}

fn slash_date() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+/\d+/\d+").expect("static regex"))
}

impl ReportDate {
    /// "Never announced". Compares below every real report date.
    pub const NEVER: ReportDate = ReportDate(NaiveDate::MIN);

    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(ReportDate)
    }

    pub fn is_never(&self) -> bool {
        *self == Self::NEVER
    }

    /// Reads a date with the report grammar.
    pub fn parse_report_text(text: &str) -> Result<Self> {
        let numbers: Vec<&str> = digit_runs().find_iter(text).map(|m| m.as_str()).collect();
        if numbers.len() < 3 {
            return Err(AppError::parse(format!(
                "expected at least three numeric groups in {:?}, found {}",
                text,
                numbers.len()
            )));
        }

        let component = |raw: &str| {
            raw.parse::<u32>()
                .map_err(|_| AppError::parse(format!("numeric group {:?} out of range in {:?}", raw, text)))
        };
        let month = component(numbers[0])?;
        let day = component(numbers[1])?;
        let year = expand_year(component(numbers[2])?);

        Self::from_ymd(year, month, day).ok_or_else(|| {
            AppError::parse(format!(
                "{}/{}/{} in {:?} is not a calendar date",
                numbers[0], numbers[1], numbers[2], text
            ))
        })
    }

    /// Reads a date with the announcement grammar. `None` when the text has no
    /// `d/d/d` substring; `Some(Err)` when it has one that is not `%m/%d/%y`.
    pub fn find_announced(text: &str) -> Option<Result<Self>> {
        let found = slash_date().find(text)?.as_str();
        Some(
            NaiveDate::parse_from_str(found, "%m/%d/%y")
                .map(ReportDate)
                .map_err(|e| AppError::parse(format!("{:?} is not a MM/DD/YY date: {}", found, e))),
        )
    }
}

/// Two-digit years pivot the same way `%y` does: 00-68 -> 20xx, 69-99 -> 19xx.
fn expand_year(year: u32) -> i32 {
    let year = year as i32;
    match year {
        0..=68 => 2000 + year,
        69..=99 => 1900 + year,
        _ => year,
    }
}

impl fmt::Display for ReportDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_never() {
            return f.write_str("never");
        }
        write!(f, "{}", self.0.format("%m/%d/%y"))
    }
}
