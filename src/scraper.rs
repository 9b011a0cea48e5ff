use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::config::ReportConfig;
use crate::models::RawTable;
use crate::utils::error::{AppError, Result};

/// Where the report tables come from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Every table on the report page, in document order.
    async fn fetch_tables(&self) -> Result<Vec<RawTable>>;
}

pub struct HttpReportSource {
    client: Client,
    url: String,
}

impl HttpReportSource {
    pub fn new(config: &ReportConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    async fn fetch_html(&self) -> Result<String> {
        let fetch_error = |message: String| AppError::Fetch {
            url: self.url.clone(),
            message,
        };

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| fetch_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("unexpected status {}", status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(format!("failed to read body: {}", e)))?;

        if body.trim().is_empty() {
            return Err(fetch_error("empty response body".to_string()));
        }

        Ok(body)
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch_tables(&self) -> Result<Vec<RawTable>> {
        let start_time = std::time::Instant::now();
        let html = self.fetch_html().await?;
        let tables = extract_tables(&html);

        tracing::debug!(
            url = %self.url,
            bytes = html.len(),
            tables = tables.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Fetched report page"
        );
        Ok(tables)
    }
}

/// HTML caps on span attributes; larger values are clamped.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Lifts every `<table>` out of an HTML document.
///
/// A nested table is returned as its own entry and its rows are not counted
/// in the enclosing table. Spanning cells are copied into every grid slot
/// they cover, across columns for `colspan` and down the rows below for
/// `rowspan`.
pub fn extract_tables(html: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let (Ok(table_selector), Ok(row_selector)) = (Selector::parse("table"), Selector::parse("tr"))
    else {
        return Vec::new();
    };

    document
        .select(&table_selector)
        .map(|table| {
            let mut carry = RowSpans::default();
            let rows = table
                .select(&row_selector)
                .filter(|row| owning_table(row).map(|t| t.id()) == Some(table.id()))
                .map(|row| row_cells(&row, &mut carry))
                .filter(|cells| !cells.is_empty())
                .collect();
            RawTable::new(rows)
        })
        .collect()
}

fn owning_table<'a>(row: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "table")
}

/// Cells still owed to the rows below by `rowspan`, keyed by column.
#[derive(Debug, Default)]
struct RowSpans {
    columns: Vec<Option<(String, usize)>>,
}

impl RowSpans {
    fn take(&mut self, column: usize) -> Option<String> {
        let slot = self.columns.get_mut(column)?;
        let (text, remaining) = slot.as_mut()?;
        let text = text.clone();
        *remaining -= 1;
        if *remaining == 0 {
            *slot = None;
        }
        Some(text)
    }

    fn hold(&mut self, column: usize, text: &str, rows_below: usize) {
        if rows_below == 0 {
            return;
        }
        if self.columns.len() <= column {
            self.columns.resize(column + 1, None);
        }
        self.columns[column] = Some((text.to_string(), rows_below));
    }

    fn pending_from(&self, column: usize) -> bool {
        self.columns.iter().skip(column).any(Option::is_some)
    }
}

fn span_attr(cell: &ElementRef<'_>, name: &str, max: usize) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .map_or(1, |n| n.min(max))
}

fn row_cells(row: &ElementRef<'_>, carry: &mut RowSpans) -> Vec<String> {
    let mut cells = Vec::new();
    for cell in row.children().filter_map(ElementRef::wrap) {
        if !matches!(cell.value().name(), "td" | "th") {
            continue;
        }

        while let Some(carried) = carry.take(cells.len()) {
            cells.push(carried);
        }

        let text = cell_text(&cell);
        let colspan = span_attr(&cell, "colspan", MAX_COLSPAN);
        let rowspan = span_attr(&cell, "rowspan", MAX_ROWSPAN);

        for _ in 0..colspan {
            carry.hold(cells.len(), &text, rowspan - 1);
            cells.push(text.clone());
        }
    }

    // Spans reaching past the last cell of this row
    while carry.pending_from(cells.len()) {
        let carried = carry.take(cells.len()).unwrap_or_default();
        cells.push(carried);
    }
    cells
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
