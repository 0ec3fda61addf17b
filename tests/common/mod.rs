#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use issues_exporter::config::ExporterConfig;
use issues_exporter::contract::{Issue, IssueComment, RepositorySummary, User};
use issues_exporter::fetch::IssueRecord;

pub fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
}

pub fn user(login: &str) -> User {
    User {
        id: 1,
        login: login.to_string(),
    }
}

/// Minimal issue: no comments, every optional field absent.
pub fn issue(number: i64) -> Issue {
    Issue {
        id: number * 1000,
        number,
        title: format!("Issue {number}"),
        body: None,
        state: "open".to_string(),
        user: None,
        assignee: None,
        assignees: Vec::new(),
        milestone: None,
        labels: Vec::new(),
        reactions: None,
        comments: 0,
        html_url: None,
        created_at: None,
        updated_at: None,
        closed_at: None,
    }
}

pub fn comment(author: &str, body: &str) -> IssueComment {
    IssueComment {
        user: Some(user(author)),
        body: Some(body.to_string()),
        created_at: Some(date(2026, 3, 14)),
    }
}

pub fn repository(id: i64) -> RepositorySummary {
    RepositorySummary {
        id,
        full_name: format!("acme/repo-{id}"),
        description: Some("A repository".to_string()),
        updated_at: Some(date(2026, 2, 1)),
    }
}

pub fn record(repository_id: i64, issue: Issue) -> IssueRecord {
    IssueRecord {
        repository_id,
        issue_number: issue.number,
        issue,
        comments: None,
        repository: Some(repository(repository_id)),
    }
}

pub fn config() -> ExporterConfig {
    ExporterConfig {
        storage_root: "mockroot".to_string(),
        template_path: "template/Report-Issues.Mustache".to_string(),
        strict_diagnostics: false,
    }
}
