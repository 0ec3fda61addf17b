//! Issue fetching and repository resolution.
//!
//! First two stages of the export pipeline: acquire every requested issue
//! (with comments, when the issue has any) and then resolve the metadata of
//! each distinct repository those issues belong to. Pure data acquisition —
//! reshaping happens later in [`crate::report_model`].
//!
//! Both stages fan out with [`futures::future::try_join_all`]: calls within a
//! stage run concurrently with no shared mutable state, the stage completes
//! when all calls complete, and the first error fails the whole stage
//! (already-issued sibling calls are drained, not cancelled). Repository
//! resolution only starts once all issue fetches are done, because the set of
//! distinct repository ids is not known before that.

use std::collections::{BTreeSet, HashMap};

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::contract::{IssueComment, IssueTracker, RepositorySummary};
use crate::error::TrackerError;

/// Identifies one issue to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub repository_id: i64,
    pub issue_number: i64,
}

/// One fetched issue, enriched step by step as the pipeline advances.
///
/// `comments` stays `None` unless the issue reported a positive comment
/// count; `repository` stays `None` until [`assign_repositories`] runs and is
/// required to be populated before model building.
#[derive(Debug, Clone, Serialize)]
pub struct IssueRecord {
    pub repository_id: i64,
    pub issue_number: i64,
    pub issue: crate::contract::Issue,
    pub comments: Option<Vec<IssueComment>>,
    pub repository: Option<RepositorySummary>,
}

/// Fetches a single issue and, iff it has comments, all of its comments.
///
/// One network round trip for the issue plus at most one for the comments.
pub async fn fetch_issue<T>(
    tracker: &T,
    repository_id: i64,
    issue_number: i64,
) -> Result<IssueRecord, TrackerError>
where
    T: IssueTracker + ?Sized,
{
    let issue = tracker.get_issue(repository_id, issue_number).await?;
    let comments = if issue.comments > 0 {
        Some(tracker.get_comments(repository_id, issue_number).await?)
    } else {
        None
    };
    debug!(
        repository_id,
        issue_number,
        comment_count = issue.comments,
        "[EXPORT] Fetched issue"
    );
    Ok(IssueRecord {
        repository_id,
        issue_number,
        issue,
        comments,
        repository: None,
    })
}

/// Fetches all requested issues concurrently, fail-fast.
///
/// The result preserves the order of `refs`. A single failed fetch fails the
/// batch — no partial export of a subset of issues.
pub async fn fetch_issues<T>(tracker: &T, refs: &[IssueRef]) -> Result<Vec<IssueRecord>, TrackerError>
where
    T: IssueTracker + ?Sized,
{
    info!(issue_count = refs.len(), "[EXPORT] Fetching issues");
    try_join_all(
        refs.iter()
            .map(|r| fetch_issue(tracker, r.repository_id, r.issue_number)),
    )
    .await
}

/// Resolves each distinct repository referenced by the fetched issues,
/// exactly once per id, all lookups concurrent and fail-fast.
pub async fn resolve_repositories<T>(
    tracker: &T,
    issues: &[IssueRecord],
) -> Result<HashMap<i64, RepositorySummary>, TrackerError>
where
    T: IssueTracker + ?Sized,
{
    let ids: BTreeSet<i64> = issues.iter().map(|i| i.repository_id).collect();
    info!(repository_count = ids.len(), "[EXPORT] Resolving repositories");
    let resolved = try_join_all(ids.into_iter().map(|id| async move {
        let repository = tracker.get_repository(id).await?;
        Ok::<_, TrackerError>((id, repository))
    }))
    .await?;
    Ok(resolved.into_iter().collect())
}

/// Populates every record's repository back-reference from the resolved map.
///
/// Postcondition of the resolver stage and precondition of model building.
/// The map is keyed by the very ids taken from `issues`, so every lookup hits.
pub fn assign_repositories(
    issues: &mut [IssueRecord],
    repositories: &HashMap<i64, RepositorySummary>,
) {
    for record in issues.iter_mut() {
        record.repository = repositories.get(&record.repository_id).cloned();
    }
}
