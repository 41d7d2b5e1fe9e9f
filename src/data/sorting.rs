//! Ordering, merging and filtering of issue collections.
//!
//! This module is the single source of truth for list order: the list view,
//! pagination merges and in-place patches all go through [`sort_issues`].

use super::{Issue, WorkflowState};
use std::collections::HashSet;

/// Sort issues for display.
///
/// Order: state-type precedence (a missing state counts as unstarted), then
/// priority with "no priority" after low, then most recently updated first.
/// The sort is stable, so fully tied issues keep their arrival order.
pub fn sort_issues(issues: &mut [Issue]) {
    issues.sort_by(|a, b| {
        a.state_type()
            .precedence()
            .cmp(&b.state_type().precedence())
            .then_with(|| a.priority.sort_rank().cmp(&b.priority.sort_rank()))
            .then_with(|| b.updated_at.cmp(&a.updated_at))
    });
}

/// Merge a fetched page into `existing`, skipping ids already present.
///
/// Returns how many issues were actually added. The result is re-sorted.
pub fn append_unique(existing: &mut Vec<Issue>, page: Vec<Issue>) -> usize {
    let mut seen: HashSet<String> = existing.iter().map(|i| i.id.clone()).collect();
    let before = existing.len();
    for issue in page {
        if seen.insert(issue.id.clone()) {
            existing.push(issue);
        }
    }
    sort_issues(existing);
    existing.len() - before
}

/// Replace the issue with the same id and restore ordering.
///
/// Returns false when no issue with that id is present (the list is untouched).
pub fn patch_issue(issues: &mut [Issue], updated: &Issue) -> bool {
    match issues.iter_mut().find(|i| i.id == updated.id) {
        Some(slot) => {
            *slot = updated.clone();
            sort_issues(issues);
            true
        }
        None => false,
    }
}

/// Case-insensitive substring match on title, identifier and description.
pub fn issue_matches(issue: &Issue, query: &str) -> bool {
    let query = query.to_lowercase();
    issue.title.to_lowercase().contains(&query)
        || issue.identifier.to_lowercase().contains(&query)
        || issue.description.to_lowercase().contains(&query)
}

/// Issues matching `query`, in source order. An empty query matches everything.
pub fn filter_issues(issues: &[Issue], query: &str) -> Vec<Issue> {
    if query.is_empty() {
        return issues.to_vec();
    }
    issues
        .iter()
        .filter(|i| issue_matches(i, query))
        .cloned()
        .collect()
}

/// Workflow states in board column order: state-type precedence, then position.
pub fn board_states(states: &[WorkflowState]) -> Vec<WorkflowState> {
    let mut columns = states.to_vec();
    columns.sort_by(|a, b| {
        a.state_type
            .precedence()
            .cmp(&b.state_type.precedence())
            .then_with(|| a.position.total_cmp(&b.position))
    });
    columns
}

/// Issues belonging to a board column, in list order.
pub fn issues_in_state<'a>(issues: &'a [Issue], state_id: &str) -> Vec<&'a Issue> {
    issues
        .iter()
        .filter(|i| i.state.as_ref().is_some_and(|s| s.id == state_id))
        .collect()
}
