//! GraphQL variables built for listings and mutations.

use lazyliner::data::{
    IssueCreateInput, IssueFilter, IssueUpdateInput, Patch, Priority, StateType, Tab,
};
use lazyliner::integrations::linear::build_filter;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Tab filters
// ============================================================================

#[test]
fn project_tab_hides_closed_issues() {
    let filter = IssueFilter::for_tab(Tab::Project, Some("p1"), Some("ignored"));
    assert_eq!(
        build_filter(&filter),
        json!({
            "project": { "id": { "eq": "p1" } },
            "state": { "type": { "nin": ["completed", "canceled"] } }
        })
    );
}

#[test]
fn active_and_backlog_filter_by_state_type() {
    let active = IssueFilter::for_tab(Tab::Active, None, Some("p2"));
    assert_eq!(
        build_filter(&active),
        json!({
            "project": { "id": { "eq": "p2" } },
            "state": { "type": { "eq": "started" } }
        })
    );

    let backlog = IssueFilter::for_tab(Tab::Backlog, None, None);
    assert_eq!(backlog.state_type, Some(StateType::Backlog));
    assert_eq!(
        build_filter(&backlog),
        json!({ "state": { "type": { "eq": "backlog" } } })
    );
}

#[test]
fn my_issues_uses_the_viewer_query() {
    let filter = IssueFilter::for_tab(Tab::MyIssues, None, Some("p3"));
    assert!(filter.mine);
    assert_eq!(filter.project_id.as_deref(), Some("p3"));
    assert_eq!(filter.first, 50);

    let paged = filter.with_cursor(Some("abc".to_string()));
    assert_eq!(paged.after.as_deref(), Some("abc"));
}

// ============================================================================
// Mutation inputs
// ============================================================================

#[test]
fn create_input_omits_unset_fields() {
    let input = IssueCreateInput {
        title: "Fix login".to_string(),
        team_id: "t1".to_string(),
        priority: Some(Priority::High.as_int()),
        ..IssueCreateInput::default()
    };
    assert_eq!(
        serde_json::to_value(&input).unwrap(),
        json!({ "title": "Fix login", "teamId": "t1", "priority": 2 })
    );
}

#[test]
fn update_input_distinguishes_keep_clear_and_set() {
    let keep = IssueUpdateInput::state("s1");
    assert_eq!(
        serde_json::to_value(&keep).unwrap(),
        json!({ "stateId": "s1" })
    );

    let clear = IssueUpdateInput {
        project_id: Patch::Clear,
        assignee_id: Patch::Set("u1".to_string()),
        ..IssueUpdateInput::default()
    };
    assert_eq!(
        serde_json::to_value(&clear).unwrap(),
        json!({ "assigneeId": "u1", "projectId": null })
    );
}
