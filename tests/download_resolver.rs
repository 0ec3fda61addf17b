mod common;

use issues_exporter::contract::{FileVersion, MockRenderApi};
use issues_exporter::download::resolve_download;
use issues_exporter::error::{DownloadError, RenderError};
use mockall::predicate::eq;

fn version(date: chrono::DateTime<chrono::Utc>) -> FileVersion {
    FileVersion {
        version_id: Some("1".to_string()),
        modified_date: Some(date),
    }
}

#[tokio::test]
async fn pdf_download_derives_dated_filename_and_roundtrips_content() {
    let mut api = MockRenderApi::new();
    api.expect_get_file_versions()
        .with(eq("mockroot/abc.pdf"))
        .times(1)
        .returning(|_| Ok(vec![version(common::date(2026, 1, 2))]));
    api.expect_download_file()
        .with(eq("mockroot/abc.pdf"))
        .times(1)
        .returning(|_| Ok(b"file abc.pdf content".to_vec()));

    let payload = resolve_download(&api, "mockroot", "abc", false)
        .await
        .expect("download should resolve");

    assert_eq!(payload.content_type, "application/pdf");
    assert_eq!(payload.file_name, "Issues-2026-01-02.pdf");
    assert_eq!(payload.content, b"file abc.pdf content");
}

#[tokio::test]
async fn filename_derivation_is_idempotent_across_downloads() {
    let mut api = MockRenderApi::new();
    api.expect_get_file_versions()
        .times(2)
        .returning(|_| Ok(vec![version(common::date(2026, 1, 2))]));
    api.expect_download_file()
        .times(2)
        .returning(|_| Ok(b"pdf".to_vec()));

    let first = resolve_download(&api, "mockroot", "abc", false)
        .await
        .unwrap();
    let second = resolve_download(&api, "mockroot", "abc", false)
        .await
        .unwrap();
    assert_eq!(first.file_name, second.file_name);
}

#[tokio::test]
async fn missing_version_history_falls_back_to_generic_filename() {
    let mut api = MockRenderApi::new();
    api.expect_get_file_versions().returning(|_| Ok(vec![]));
    api.expect_download_file()
        .returning(|_| Ok(b"pdf".to_vec()));

    let payload = resolve_download(&api, "mockroot", "abc", false)
        .await
        .expect("fallback should not error");
    assert_eq!(payload.file_name, "Issues.pdf");
}

#[tokio::test]
async fn error_variant_serves_the_json_diagnostic() {
    let mut api = MockRenderApi::new();
    api.expect_get_file_versions()
        .with(eq("mockroot/abc-error.json"))
        .returning(|_| Ok(vec![version(common::date(2026, 4, 9))]));
    api.expect_download_file()
        .with(eq("mockroot/abc-error.json"))
        .returning(|_| Ok(b"{\"diag\":true}".to_vec()));

    let payload = resolve_download(&api, "mockroot", "abc-error", true)
        .await
        .expect("download should resolve");

    assert_eq!(payload.content_type, "application/json");
    assert_eq!(payload.file_name, "Error-2026-04-09.json");
}

#[tokio::test]
async fn storage_not_found_propagates_as_not_found() {
    let mut api = MockRenderApi::new();
    api.expect_get_file_versions().returning(|_| Ok(vec![]));
    api.expect_download_file()
        .returning(|path: &str| Err(RenderError::NotFound(path.to_string())));

    let err = resolve_download(&api, "mockroot", "missing", false)
        .await
        .expect_err("absent artifact should fail");
    assert!(matches!(err, DownloadError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}
