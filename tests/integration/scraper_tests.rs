use super::*;

use cotton_watcher::core::{LargestTableSelector, TableSelector, extract_report_date};
use cotton_watcher::models::ReportDate;
use cotton_watcher::scraper::ReportSource;
use cotton_watcher::AppError;

#[tokio::test]
async fn test_fetches_every_table_on_the_page() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;

    let source = HttpReportSource::new(&report_config(&server))?;
    let tables = source.fetch_tables().await?;

    assert_eq!(tables.len(), 3);
    let report = LargestTableSelector.select(tables)?;
    assert_eq!(report.width(), 6);
    assert_eq!(report.cell(1, 5), "Highlights for the week ending 03/21/24");
    assert_eq!(
        extract_report_date(&report)?,
        ReportDate::from_ymd(2024, 3, 21).unwrap()
    );
    Ok(())
}

#[tokio::test]
async fn test_sends_configured_user_agent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .and(wiremock::matchers::header("user-agent", "cotton-watcher-tests"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REPORT_HTML))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpReportSource::new(&report_config(&server))?;
    source.fetch_tables().await?;
    Ok(())
}

#[tokio::test]
async fn test_empty_body_is_a_fetch_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, "   ").await;

    let source = HttpReportSource::new(&report_config(&server))?;
    let err = source.fetch_tables().await.unwrap_err();

    assert!(matches!(err, AppError::Fetch { .. }));
    assert!(err.to_string().contains("empty"));
    Ok(())
}

#[tokio::test]
async fn test_not_found_is_a_fetch_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;

    let source = HttpReportSource::new(&report_config(&server))?;
    let err = source.fetch_tables().await.unwrap_err();

    assert!(err.to_string().contains("404"));
    Ok(())
}
