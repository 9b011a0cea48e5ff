use crate::core::aggregation::ExportFigures;
use crate::models::ReportDate;

#[derive(Debug, Clone)]
pub struct MessageComposer {
    source_url: String,
    hashtag: String,
}

impl MessageComposer {
    pub fn new(source_url: impl Into<String>, hashtag: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            hashtag: hashtag.into(),
        }
    }

    pub fn compose(&self, date: ReportDate, figures: &ExportFigures) -> String {
        format!(
            "U.S. EXPORT SALES {}\nExports: {}\nNew Sales: {}\nCancels: {}\n{}\n{}",
            date, figures.exports, figures.new_sales, figures.cancels, self.source_url, self.hashtag
        )
    }
}
