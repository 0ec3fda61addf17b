mod common;

use std::io::Cursor;

use issues_exporter::contract::{MockIssueTracker, MockRenderApi};
use issues_exporter::error::{ExportStage, TrackerError};
use issues_exporter::export::{download_link, export, ExportRequest};
use issues_exporter::fetch::IssueRef;
use mockall::predicate::eq;

fn request(refs: &[(i64, i64)]) -> ExportRequest {
    ExportRequest {
        issues: refs
            .iter()
            .map(|&(repository_id, issue_number)| IssueRef {
                repository_id,
                issue_number,
            })
            .collect(),
        generate_qr_code: true,
    }
}

fn archive_names(bytes: Vec<u8>) -> Vec<String> {
    let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("diagnostics should be a zip");
    archive.file_names().map(str::to_string).collect()
}

#[tokio::test]
async fn export_renders_pdf_and_returns_artifact_id() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .with(eq(42), eq(7))
        .return_once(|_, _| Ok(common::issue(7)));
    tracker
        .expect_get_comments()
        .times(0)
        .returning(|_, _| Ok(vec![]));
    tracker
        .expect_get_repository()
        .with(eq(42))
        .times(1)
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api
        .expect_render_document()
        .withf(|model, template, destination| {
            model.issues.len() == 1
                && template.contains("{{#issues}}")
                && destination.starts_with("mockroot/")
                && destination.ends_with(".pdf")
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let report = export(&common::config(), &tracker, &render_api, &request(&[(42, 7)]))
        .await
        .expect("export should succeed");

    assert!(!report.id.is_empty());
    assert_eq!(report.storage_path, format!("mockroot/{}.pdf", report.id));
    assert_eq!(report.stats.destination_path, report.storage_path);
    assert_eq!(
        download_link("http://mockaddr/", &report.id),
        format!("http://mockaddr/export/download/{}", report.id)
    );
}

#[tokio::test]
async fn repositories_are_resolved_once_per_distinct_id() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .times(3)
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_repository()
        .with(eq(99))
        .times(1)
        .returning(|id| Ok(common::repository(id)));
    tracker
        .expect_get_repository()
        .with(eq(42))
        .times(1)
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api
        .expect_render_document()
        .times(1)
        .returning(|_, _, _| Ok(()));

    let report = export(
        &common::config(),
        &tracker,
        &render_api,
        &request(&[(99, 1), (99, 2), (42, 3)]),
    )
    .await
    .expect("export should succeed");
    assert!(!report.id.is_empty());
}

#[tokio::test]
async fn comments_are_fetched_only_when_the_issue_has_any() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker.expect_get_issue().with(eq(1), eq(10)).return_once(|_, n| {
        let mut issue = common::issue(n);
        issue.comments = 2;
        Ok(issue)
    });
    tracker
        .expect_get_issue()
        .with(eq(1), eq(11))
        .return_once(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_comments()
        .with(eq(1), eq(10))
        .times(1)
        .returning(|_, _| Ok(vec![common::comment("alice", "first\nsecond")]));
    tracker
        .expect_get_repository()
        .times(1)
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api
        .expect_render_document()
        .withf(|model, _, _| {
            let with_comments = &model.issues[0];
            let without = &model.issues[1];
            with_comments.comments_not_empty
                && with_comments.comments.as_ref().map(Vec::len) == Some(1)
                && !without.comments_not_empty
                && without.comments.is_none()
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    export(
        &common::config(),
        &tracker,
        &render_api,
        &request(&[(1, 10), (1, 11)]),
    )
    .await
    .expect("export should succeed");
}

#[tokio::test]
async fn failed_issue_fetch_fails_the_whole_export() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .with(eq(1), eq(1))
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_issue()
        .with(eq(2), eq(2))
        .returning(|_, _| Err(TrackerError::NotFound("issue 2#2".to_string())));
    tracker.expect_get_repository().times(0);

    let mut render_api = MockRenderApi::new();
    render_api.expect_render_document().times(0);
    render_api
        .expect_upload_file()
        .times(1)
        .returning(|_, _| Ok(()));

    let failure = export(
        &common::config(),
        &tracker,
        &render_api,
        &request(&[(1, 1), (2, 2)]),
    )
    .await
    .expect_err("export should fail");

    assert_eq!(failure.stage, ExportStage::Fetching);
    assert_eq!(failure.status_code(), 404);

    // Only what was produced before the failure is archived.
    let names = archive_names(failure.diagnostics.expect("diagnostics should be attached"));
    assert_eq!(names, vec!["010_request_params.json", "020_user.json"]);
}

#[tokio::test]
async fn repository_failure_archives_user_and_issues_only() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_repository()
        .returning(|_| Err(TrackerError::RateLimited));

    let mut render_api = MockRenderApi::new();
    render_api.expect_render_document().times(0);
    render_api
        .expect_upload_file()
        .times(1)
        .returning(|_, _| Ok(()));

    let failure = export(&common::config(), &tracker, &render_api, &request(&[(5, 3)]))
        .await
        .expect_err("export should fail");

    assert_eq!(failure.stage, ExportStage::Resolving);
    assert_eq!(failure.status_code(), 429);
    let names = archive_names(failure.diagnostics.expect("diagnostics should be attached"));
    assert_eq!(
        names,
        vec![
            "010_request_params.json",
            "020_user.json",
            "030_issues.json"
        ]
    );
}

#[tokio::test]
async fn unreadable_template_fails_before_model_building() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_repository()
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api.expect_render_document().times(0);
    render_api
        .expect_upload_file()
        .times(1)
        .returning(|_, _| Ok(()));

    let mut config = common::config();
    config.template_path = "mockroot/missing-template.Mustache".to_string();

    let failure = export(&config, &tracker, &render_api, &request(&[(7, 1)]))
        .await
        .expect_err("export should fail");

    assert_eq!(failure.stage, ExportStage::Building);
    assert_eq!(failure.status_code(), 500);

    // Resolution finished, so the repository map is archived; the report
    // model was never built.
    let names = archive_names(failure.diagnostics.expect("diagnostics should be attached"));
    assert_eq!(
        names,
        vec![
            "010_request_params.json",
            "020_user.json",
            "030_issues.json",
            "040_repo_dict.json"
        ]
    );
}

#[tokio::test]
async fn render_failure_archives_every_stage_and_stores_the_bundle() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_repository()
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api
        .expect_render_document()
        .times(1)
        .returning(|_, _, _| {
            Err(issues_exporter::error::RenderError::Api {
                status: 502,
                message: "render backend unavailable".to_string(),
            })
        });
    render_api
        .expect_upload_file()
        .withf(|path, content| {
            path.starts_with("mockroot/") && path.ends_with("-error.json") && !content.is_empty()
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let failure = export(&common::config(), &tracker, &render_api, &request(&[(7, 1)]))
        .await
        .expect_err("export should fail");

    assert_eq!(failure.stage, ExportStage::Rendering);
    assert_eq!(failure.status_code(), 502);
    let diagnostic_id = failure.diagnostic_id.expect("bundle should be stored");
    assert!(diagnostic_id.ends_with("-error"));

    let names = archive_names(failure.diagnostics.expect("diagnostics should be attached"));
    assert_eq!(
        names,
        vec![
            "010_request_params.json",
            "020_user.json",
            "030_issues.json",
            "040_repo_dict.json",
            "050_report_model.json"
        ]
    );
}

#[tokio::test]
async fn diagnostic_upload_failure_keeps_the_original_error_and_bundle() {
    let mut tracker = MockIssueTracker::new();
    tracker
        .expect_current_user()
        .return_once(|| Ok(common::user("octocat")));
    tracker
        .expect_get_issue()
        .returning(|_, n| Ok(common::issue(n)));
    tracker
        .expect_get_repository()
        .returning(|id| Ok(common::repository(id)));

    let mut render_api = MockRenderApi::new();
    render_api
        .expect_render_document()
        .times(1)
        .returning(|_, _, _| {
            Err(issues_exporter::error::RenderError::Transport(
                "connection reset".to_string(),
            ))
        });
    render_api.expect_upload_file().times(1).returning(|_, _| {
        Err(issues_exporter::error::RenderError::Transport(
            "storage unreachable".to_string(),
        ))
    });

    let failure = export(&common::config(), &tracker, &render_api, &request(&[(7, 1)]))
        .await
        .expect_err("export should fail");

    // The archive still travels with the error; only the stored id is gone.
    assert_eq!(failure.stage, ExportStage::Rendering);
    assert!(failure.diagnostics.is_some());
    assert!(failure.diagnostic_id.is_none());
}
