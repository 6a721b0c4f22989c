//! End-to-end export against a mocked Confluence site
//!
//! Drives the real HTTP client and the filesystem converter (HTML only, so
//! pandoc is not needed) through a whole-space export.

use confluence_dump::adapters::confluence::ConfluenceClient;
use confluence_dump::adapters::converter::{FileConverter, OutputOptions};
use confluence_dump::cli::commands::export::exit_code_for;
use confluence_dump::config::{secret_string, ConfluenceConfig, RetryConfig};
use confluence_dump::core::export::{ExportCoordinator, ExportJob, ExportMode};
use confluence_dump::domain::{ConfluenceError, DumpError, PageId};
use mockito::{Matcher, Server, ServerGuard};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

fn config_for(url: &str) -> ConfluenceConfig {
    ConfluenceConfig {
        base_url: Some(url.to_string()),
        username: Some("me@acme.com".to_string()),
        api_token: Some(secret_string("token".to_string())),
        retry: RetryConfig {
            max_retries: 2,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        ..Default::default()
    }
}

fn html_only() -> OutputOptions {
    OutputOptions {
        html: true,
        rst: false,
        ..Default::default()
    }
}

async fn json_mock(server: &mut ServerGuard, path: &str, body: &str) -> mockito::Mock {
    server
        .mock("GET", path)
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_space_export_writes_html_and_images() {
    let mut server = Server::new_async().await;

    let _spaces = json_mock(
        &mut server,
        "/wiki/api/v2/spaces",
        r#"{"results": [
            {"id": "7", "key": "OTHER", "name": "Other"},
            {"id": "1", "key": "DOCS", "name": "Team Docs", "homepageId": "10"}
        ]}"#,
    )
    .await;
    let _space = json_mock(
        &mut server,
        "/wiki/api/v2/spaces/1",
        r#"{"id": "1", "key": "DOCS", "name": "Team Docs"}"#,
    )
    .await;
    let _pages = json_mock(
        &mut server,
        "/wiki/api/v2/spaces/1/pages",
        r#"{"results": [
            {"id": "10", "title": "Home", "parentId": null, "spaceId": "1"},
            {"id": "11", "title": "Design: v2", "parentId": "10", "spaceId": "1"}
        ]}"#,
    )
    .await;
    let _home = json_mock(
        &mut server,
        "/wiki/rest/api/content/10",
        r#"{"id": "10", "title": "Home",
            "body": {"export_view": {"value":
                "<p>Welcome</p><img src=\"/wiki/download/attachments/10/diagram.png?version=1&amp;api=v2\">"}},
            "_links": {"base": "https://acme.atlassian.net/wiki", "webui": "/spaces/DOCS/overview"}}"#,
    )
    .await;
    let _design = json_mock(
        &mut server,
        "/wiki/rest/api/content/11",
        r#"{"id": "11", "title": "Design: v2",
            "body": {"export_view": {"value": "<h1>Design</h1><img src=\"https://cdn.example.com/logo.png\">"}},
            "_links": {"base": "https://acme.atlassian.net/wiki", "webui": "/spaces/DOCS/pages/11"}}"#,
    )
    .await;
    let _home_labels = json_mock(
        &mut server,
        "/wiki/api/v2/pages/10/labels",
        r#"{"results": [{"id": "1", "name": "start"}]}"#,
    )
    .await;
    let _design_labels = json_mock(
        &mut server,
        "/wiki/api/v2/pages/11/labels",
        r#"{"results": []}"#,
    )
    .await;
    let image = server
        .mock("GET", "/wiki/download/attachments/10/diagram.png")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(vec![0x89, b'P', b'N', b'G'])
        .create_async()
        .await;

    let outdir = TempDir::new().unwrap();
    let client = Arc::new(ConfluenceClient::new(&config_for(&server.url())).unwrap());
    let converter = Arc::new(FileConverter::new(client.clone()));

    let mut job = ExportJob::new(ExportMode::Space, "acme");
    job.space = Some("docs".to_string());
    job.outdir = outdir.path().to_path_buf();
    job.options = html_only();

    let (_tx, rx) = watch::channel(false);
    let report = ExportCoordinator::new(client, converter, job, rx)
        .run()
        .await
        .unwrap();

    assert!(report.is_successful(), "failures: {:?}", report.failures);
    assert_eq!(report.exported_count(), 2);

    let space_dir = outdir.path().join("1-Team Docs");
    let home = &report.pages["Home"];
    assert_eq!(home.path, space_dir.join("Home.html"));
    assert_eq!(home.url, "https://acme.atlassian.net/wiki/spaces/DOCS/overview");
    assert_eq!(home.space_key.as_deref(), Some("DOCS"));

    let written = std::fs::read_to_string(&home.path).unwrap();
    assert!(written.contains("Welcome"));
    assert!(written.contains("src=\"attachments/10_diagram.png\""));
    assert_eq!(
        std::fs::read(space_dir.join("attachments/10_diagram.png")).unwrap(),
        vec![0x89, b'P', b'N', b'G']
    );
    image.assert_async().await;

    let design = &report.pages["Design-_v2"];
    assert_eq!(design.page_id, PageId::from(11u64));
    let written = std::fs::read_to_string(&design.path).unwrap();
    // Images hosted elsewhere are left alone
    assert!(written.contains("https://cdn.example.com/logo.png"));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["pages"]["Home"]["site"], "acme");
    assert!(json["duration_secs"].is_number());
}

#[tokio::test]
async fn test_authentication_failure_stops_the_run() {
    let mut server = Server::new_async().await;
    let spaces = server
        .mock("GET", "/wiki/api/v2/spaces")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("Unauthorized")
        .expect(1)
        .create_async()
        .await;

    let outdir = TempDir::new().unwrap();
    let client = Arc::new(ConfluenceClient::new(&config_for(&server.url())).unwrap());
    let converter = Arc::new(FileConverter::new(client.clone()));

    let mut job = ExportJob::new(ExportMode::Space, "acme");
    job.space = Some("DOCS".to_string());
    job.outdir = outdir.path().to_path_buf();
    job.options = html_only();

    let (_tx, rx) = watch::channel(false);
    let err = ExportCoordinator::new(client, converter, job, rx)
        .run()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DumpError::Confluence(ConfluenceError::Authentication(_))
    ));
    assert_eq!(exit_code_for(&err), 4);
    spaces.assert_async().await;
    assert_eq!(std::fs::read_dir(outdir.path()).unwrap().count(), 0);
}
