//! Integration tests for the harvester
//!
//! These tests use wiremock to stand up a mock data hub and run the full
//! crawl-then-download cycle end-to-end.

use std::path::Path;
use tempfile::TempDir;
use xena_harvest::config::Config;
use xena_harvest::crawler::Coordinator;
use xena_harvest::state::DatasetOutcome;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LABEL: &str = "IlluminaHiSeq pancan normalized";

/// Creates a test configuration pointing at the mock hub
fn create_test_config(base_url: &str, destination: &Path) -> Config {
    let mut config = Config::default();
    config.hub.index_url = format!("{}/datapages/", base_url);
    config.navigator.settle_timeout_ms = 0;
    config.navigator.poll_interval_ms = 10;
    config.navigator.request_timeout_secs = 5;
    config.transfer.destination_dir = destination.to_path_buf();
    config.transfer.timeout_secs = 5;
    config
}

async fn mount_html(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_file(server: &MockServer, file_path: &str, status: u16, body: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_bytes(body)
                .insert_header("content-type", "application/gzip"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_single_failure_does_not_abort() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Hub index: two TCGA cohorts and one unrelated link
    mount_html(
        &mock_server,
        "/datapages/",
        format!(
            r#"<html><body>
            <a href="{0}/cohort/brca?cohort=TCGA%20Breast%20Cancer">TCGA Breast Cancer (BRCA)</a>
            <a href="{0}/cohort/gdc?cohort=GDC%20Pan-Cancer">GDC Pan-Cancer</a>
            <a href="/cohort/laml?cohort=TCGA%20Acute%20Myeloid%20Leukemia">TCGA LAML</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    // BRCA: two matching datasets plus one that does not match the label
    mount_html(
        &mock_server,
        "/cohort/brca",
        format!(
            r#"<html><body>
            <a href="/dataset/brca-pancan">gene expression RNAseq - {0}</a>
            <a href="/dataset/brca-hiseq">gene expression RNAseq - IlluminaHiSeq</a>
            <a href="/dataset/brca-pancan-v2">{0} (v2)</a>
            </body></html>"#,
            LABEL
        ),
    )
    .await;

    // LAML: nothing matches
    mount_html(
        &mock_server,
        "/cohort/laml",
        r#"<html><body><a href="/dataset/laml-cnv">copy number</a></body></html>"#.to_string(),
    )
    .await;

    mount_html(
        &mock_server,
        "/dataset/brca-pancan",
        r#"<html><body>
        <a href="/download/TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN.gz">download</a>
        <a href="/download/TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN.json">metadata</a>
        </body></html>"#
            .to_string(),
    )
    .await;

    mount_html(
        &mock_server,
        "/dataset/brca-pancan-v2",
        r#"<html><body><a href="/download/TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN_v2.gz">download</a></body></html>"#
            .to_string(),
    )
    .await;

    // First file fails on the server, second succeeds
    mount_file(
        &mock_server,
        "/download/TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN.gz",
        500,
        Vec::new(),
    )
    .await;
    let payload: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
    mount_file(
        &mock_server,
        "/download/TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN_v2.gz",
        200,
        payload.clone(),
    )
    .await;

    let temp = TempDir::new().expect("Failed to create temp dir");
    let destination = temp.path().join("DownloadedFiles");
    let config = create_test_config(&base_url, &destination);

    let coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await;

    assert!(report.fatal_error.is_none(), "{:?}", report.fatal_error);
    assert_eq!(report.cohorts_found, 2);
    assert_eq!(report.cohorts.len(), 2);
    assert_eq!(report.cohorts[0].dataset_links, 2);
    assert_eq!(report.cohorts_without_matches(), 1);
    assert_eq!(report.downloads_succeeded(), 1);
    assert_eq!(report.downloads_failed(), 1);

    assert!(matches!(
        &report.cohorts[0].outcomes[0],
        DatasetOutcome::Failed { error, .. } if error.contains("500")
    ));

    // Only the successful file is on disk, with its exact contents
    let saved = destination.join("TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN_v2.gz");
    assert_eq!(std::fs::read(&saved).expect("file missing"), payload);
    assert!(!destination
        .join("TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN.gz")
        .exists());
    assert!(!destination
        .join("TCGA.BRCA.sampleMap%2FHiSeqV2_PANCAN.gz.part")
        .exists());

    let entries = std::fs::read_dir(&destination).unwrap().count();
    assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_hub_without_cohorts() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/datapages/",
        r#"<html><body><p>No hubs are responding</p><a href="/help">help</a></body></html>"#
            .to_string(),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("DownloadedFiles");
    let config = create_test_config(&mock_server.uri(), &destination);

    let report = Coordinator::new(config).unwrap().run().await;

    assert_eq!(report.cohorts_found, 0);
    assert!(report.fatal_error.is_none());
    assert!(report.is_complete());
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_dataset_without_compressed_file() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/datapages/",
        r#"<a href="/cohort/luad?cohort=TCGA%20LUAD">LUAD</a>"#.to_string(),
    )
    .await;
    mount_html(
        &mock_server,
        "/cohort/luad",
        format!(r#"<a href="/dataset/luad">{}</a>"#, LABEL),
    )
    .await;
    mount_html(
        &mock_server,
        "/dataset/luad",
        r#"<a href="/download/luad/README.txt">readme</a>"#.to_string(),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("DownloadedFiles");
    let config = create_test_config(&mock_server.uri(), &destination);

    let report = Coordinator::new(config).unwrap().run().await;

    assert_eq!(report.missing_download_links(), 1);
    assert_eq!(report.downloads_succeeded(), 0);
    assert_eq!(report.downloads_failed(), 0);
    assert!(report.fatal_error.is_none());
    assert!(!destination.exists());

    // The download path was never requested
    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.path().starts_with("/download/")));
}

#[tokio::test]
async fn test_broken_cohort_page_stops_the_run() {
    let mock_server = MockServer::start().await;

    mount_html(
        &mock_server,
        "/datapages/",
        r#"
        <a href="/cohort/gone?cohort=TCGA%20GONE">gone</a>
        <a href="/cohort/ok?cohort=TCGA%20OK">ok</a>
        "#
        .to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/cohort/gone"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;
    mount_html(
        &mock_server,
        "/cohort/ok",
        format!(r#"<a href="/dataset/ok">{}</a>"#, LABEL),
    )
    .await;

    let temp = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), temp.path());

    let report = Coordinator::new(config).unwrap().run().await;

    let error = report.fatal_error.as_deref().expect("expected a fatal error");
    assert!(error.contains("502"), "{}", error);
    assert_eq!(report.cohorts_found, 2);
    assert_eq!(report.cohorts.len(), 1);
    assert!(!report.is_complete());

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.url.path() != "/cohort/ok"));
}

#[tokio::test]
async fn test_unreachable_hub_is_reported() {
    // Bind then drop a listener so the port is very likely closed
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let temp = TempDir::new().unwrap();
    let config = create_test_config(&format!("http://127.0.0.1:{}", port), temp.path());

    let report = Coordinator::new(config).unwrap().run().await;

    assert!(report.fatal_error.is_some());
    assert_eq!(report.cohorts_found, 0);
    assert!(report.finished_at.is_some());
}
