//! Report model building.
//!
//! Transforms fetched issue records into the flat, template-ready document
//! model submitted to the rendering API. Pure functions, no I/O, and total
//! over well-formed records: any missing optional upstream field degrades to
//! `None`/empty instead of panicking.
//!
//! Every value that feeds a conditional template section is wrapped in a
//! [`SectionProperty`] carrying explicit `notEmpty`/`empty` flags — the
//! template never inspects raw emptiness itself. Serialization is camelCase
//! to match the template's key convention.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contract::ReactionSummary;
use crate::fetch::IssueRecord;

/// Per-export report options.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Render a QR code with the issue's web link on each issue page.
    pub generate_qr_code: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            generate_qr_code: true,
        }
    }
}

/// A template value paired with explicit presence flags.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionProperty<T> {
    pub value: T,
    pub not_empty: bool,
    pub empty: bool,
}

impl<T> SectionProperty<T> {
    fn new(value: T, not_empty: bool) -> Self {
        Self {
            value,
            not_empty,
            empty: !not_empty,
        }
    }
}

/// The six reaction counters rendered in the reactions section.
#[derive(Debug, Clone, Serialize)]
pub struct ReactionCounts {
    pub plus1: u32,
    pub minus1: u32,
    pub laugh: u32,
    pub confused: u32,
    pub heart: u32,
    pub hooray: u32,
}

impl From<&ReactionSummary> for ReactionCounts {
    fn from(r: &ReactionSummary) -> Self {
        Self {
            plus1: r.plus1,
            minus1: r.minus1,
            laugh: r.laugh,
            confused: r.confused,
            heart: r.heart,
            hooray: r.hooray,
        }
    }
}

/// One rendered comment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentEntry {
    pub comment_author: Option<String>,
    pub comment_created: Option<String>,
    pub comment_text_lines: SectionProperty<Vec<String>>,
}

/// Display-ready model of a single issue.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueReportEntry {
    pub issue_name: String,
    pub project_name: Option<String>,
    pub summary: String,
    pub reporter: Option<String>,
    pub assignee: Option<String>,
    pub details_lines: SectionProperty<Vec<String>>,
    pub milestone: Option<String>,
    pub state: String,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub closed: Option<String>,
    /// Assignee logins; flagged not-empty only when more than one assignee is
    /// present (the template switches singular/plural rendering on it).
    pub assignee_list: SectionProperty<Vec<String>>,
    pub issue_labels_list: SectionProperty<Vec<String>>,
    pub issue_qr_image: String,
    pub issue_qr_image_visible: bool,
    pub issue_link: Option<String>,
    pub comments_not_empty: bool,
    pub comments: Option<Vec<CommentEntry>>,
    pub reactions_not_empty: bool,
    pub reactions: Option<ReactionCounts>,
}

/// Template-ready document model for one export request.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocumentModel {
    pub issues: Vec<IssueReportEntry>,
}

fn to_short_date(d: Option<&DateTime<Utc>>) -> Option<String> {
    d.map(|d| d.format("%Y-%m-%d").to_string())
}

/// Splits text on newline boundaries, trimming trailing carriage returns.
///
/// A present-but-empty body yields a single empty line (and therefore a
/// not-empty section); an absent body yields no lines.
fn text_lines(text: Option<&str>) -> Vec<String> {
    match text {
        Some(text) => text
            .split('\n')
            .map(|s| s.trim_end_matches('\r').to_string())
            .collect(),
        None => Vec::new(),
    }
}

fn qr_image_link(issue_link: Option<&str>) -> String {
    format!(
        "file://issue-link-qr?link={}",
        urlencoding::encode(issue_link.unwrap_or_default())
    )
}

/// Builds the document model from fetched issue records.
///
/// Precondition: repository back-references were populated by the resolver;
/// the builder still degrades to `None` rather than panicking when one is
/// absent.
pub fn build_report_model(issues: &[IssueRecord], options: &ReportOptions) -> ReportDocumentModel {
    let issues = issues
        .iter()
        .map(|record| issue_entry(record, options))
        .collect();
    ReportDocumentModel { issues }
}

fn issue_entry(record: &IssueRecord, options: &ReportOptions) -> IssueReportEntry {
    let issue = &record.issue;

    let details = text_lines(issue.body.as_deref());
    let details_not_empty = !details.is_empty();

    let assignee_list: Vec<String> = issue.assignees.iter().map(|u| u.login.clone()).collect();
    let multiple_assignees = assignee_list.len() > 1;

    let labels: Vec<String> = issue.labels.iter().map(|l| l.name.clone()).collect();
    let has_labels = !labels.is_empty();

    let comments = record.comments.as_ref().map(|comments| {
        comments
            .iter()
            .map(|c| {
                let lines = text_lines(c.body.as_deref());
                let has_lines = !lines.is_empty();
                CommentEntry {
                    comment_author: c.user.as_ref().map(|u| u.login.clone()),
                    comment_created: to_short_date(c.created_at.as_ref()),
                    comment_text_lines: SectionProperty::new(lines, has_lines),
                }
            })
            .collect()
    });

    IssueReportEntry {
        issue_name: issue.number.to_string(),
        project_name: record.repository.as_ref().map(|r| r.full_name.clone()),
        summary: issue.title.clone(),
        reporter: issue.user.as_ref().map(|u| u.login.clone()),
        assignee: issue.assignee.as_ref().map(|u| u.login.clone()),
        details_lines: SectionProperty::new(details, details_not_empty),
        milestone: issue.milestone.as_ref().map(|m| m.title.clone()),
        state: issue.state.clone(),
        created: to_short_date(issue.created_at.as_ref()),
        updated: to_short_date(issue.updated_at.as_ref()),
        closed: to_short_date(issue.closed_at.as_ref()),
        assignee_list: SectionProperty::new(assignee_list, multiple_assignees),
        issue_labels_list: SectionProperty::new(labels, has_labels),
        issue_qr_image: qr_image_link(issue.html_url.as_deref()),
        issue_qr_image_visible: options.generate_qr_code,
        issue_link: issue.html_url.clone(),
        comments_not_empty: issue.comments > 0,
        comments,
        reactions_not_empty: issue
            .reactions
            .as_ref()
            .map(|r| r.total_count > 0)
            .unwrap_or(false),
        reactions: issue.reactions.as_ref().map(ReactionCounts::from),
    }
}
