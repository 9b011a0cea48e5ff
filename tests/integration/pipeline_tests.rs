use super::*;
use chrono::{TimeZone, Utc};
use wiremock::matchers::body_json;

use cotton_watcher::models::ReportDate;
use cotton_watcher::{AppError, PipelineOutcome, PipelineStage};

#[tokio::test]
async fn test_posts_exact_message() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;
    mount_timeline(&server, &["U.S. EXPORT SALES 03/14/24\nExports: 88,000", "Good morning"]).await;

    let expected = format!(
        "U.S. EXPORT SALES 03/21/24\nExports: 197,350\nNew Sales: 195,550\nCancels: 4,000\n{}\n#cotton",
        report_config(&server).url
    );
    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .and(body_json(json!({ "text": expected })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": {"id": "1771", "text": "posted"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = create_test_pipeline(&server)?.run(Utc::now()).await?;

    assert_eq!(
        outcome,
        PipelineOutcome::Published {
            date: ReportDate::from_ymd(2024, 3, 21).unwrap(),
            message: expected,
            post_id: "1771".to_string(),
        }
    );
    Ok(())
}

#[tokio::test]
async fn test_already_announced_is_not_posted() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;
    mount_timeline(&server, &["U.S. EXPORT SALES 03/21/24\nExports: 197,350"]).await;

    Mock::given(method("POST"))
        .and(path("/2/tweets"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = create_test_pipeline(&server)?.run(Utc::now()).await?;

    assert!(matches!(outcome, PipelineOutcome::Duplicate { .. }));
    Ok(())
}

#[tokio::test]
async fn test_history_newer_than_page_is_not_posted() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;
    mount_timeline(&server, &["U.S. EXPORT SALES 03/28/24"]).await;

    let outcome = create_test_pipeline(&server)?.run(Utc::now()).await?;

    match outcome {
        PipelineOutcome::Duplicate { found, last_announced } => {
            assert_eq!(found, ReportDate::from_ymd(2024, 3, 21).unwrap());
            assert_eq!(last_announced, ReportDate::from_ymd(2024, 3, 28).unwrap());
        }
        other => panic!("expected a duplicate outcome, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_report_page_failure_is_a_fetch_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(REPORT_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = create_test_pipeline(&server)?
        .run(Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Fetch));
    assert!(matches!(err.root(), AppError::Fetch { .. }));
    Ok(())
}

#[tokio::test]
async fn test_page_without_sentinel_row_fails_to_normalize() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    let html = REPORT_HTML.replace(
        "<tr><td>COUNTRY</td><td>COUNTRY</td><td>COUNTRY</td><td>COUNTRY</td><td>COUNTRY</td><td>COUNTRY</td></tr>",
        "",
    );
    mount_report(&server, &html).await;
    mount_timeline(&server, &[]).await;

    let err = create_test_pipeline(&server)?
        .run(Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Normalize));
    Ok(())
}

#[tokio::test]
async fn test_rejected_credentials_stop_at_dedup() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;
    Mock::given(method("GET"))
        .and(path("/2/users/1001/tweets"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = create_test_pipeline(&server)?
        .run(Utc::now())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Dedup));
    assert!(matches!(err.root(), AppError::Publish { .. }));
    Ok(())
}

#[tokio::test]
async fn test_gate_closed_makes_no_requests() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // 16:00 UTC in July is past the summer cutoff
    let now = Utc.with_ymd_and_hms(2024, 7, 13, 16, 0, 0).unwrap();
    let outcome = create_test_pipeline(&server)?
        .ignore_window(false)
        .run(now)
        .await?;

    assert_eq!(outcome, PipelineOutcome::Gated);
    Ok(())
}

#[tokio::test]
async fn test_preview_skips_history() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    mount_report(&server, REPORT_HTML).await;
    Mock::given(method("GET"))
        .and(path("/2/users/1001/tweets"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = create_test_pipeline(&server)?.preview().await?;

    match outcome {
        PipelineOutcome::Composed { date, message } => {
            assert_eq!(date, ReportDate::from_ymd(2024, 3, 21).unwrap());
            assert!(message.contains("Exports: 197,350"));
        }
        other => panic!("expected a composed outcome, got {other:?}"),
    }
    Ok(())
}
