//! Domain types shared by the API client, the views and the CLI.
//!
//! Everything here is a value snapshot of remote data. Relations the API may
//! return as `null` (state, assignee, project, ...) stay `Option` so every
//! consumer has to pick a fallback explicitly.

pub mod sorting;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

pub use sorting::{
    append_unique, board_states, filter_issues, issue_matches, issues_in_state, patch_issue,
    sort_issues,
};

/// Linear issue priority (0-4 from API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Priority {
    #[default]
    NoPriority = 0,
    Urgent = 1,
    High = 2,
    Medium = 3,
    Low = 4,
}

impl Priority {
    /// Create from Linear API integer value (0-4). Anything else is "no priority".
    pub fn from_int(value: i64) -> Self {
        match value {
            1 => Self::Urgent,
            2 => Self::High,
            3 => Self::Medium,
            4 => Self::Low,
            _ => Self::NoPriority,
        }
    }

    pub fn as_int(self) -> i64 {
        self as i64
    }

    /// Sort rank: urgent first, unprioritized after low.
    pub fn sort_rank(self) -> u8 {
        match self {
            Self::NoPriority => 5,
            other => other as u8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "Urgent",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::NoPriority => "None",
        }
    }

    /// All priorities in API order (0..=4).
    pub fn all() -> [Self; 5] {
        [
            Self::NoPriority,
            Self::Urgent,
            Self::High,
            Self::Medium,
            Self::Low,
        ]
    }
}

/// Coarse lifecycle bucket of a workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateType {
    Backlog,
    #[default]
    Unstarted,
    Started,
    Completed,
    Canceled,
    Triage,
    #[serde(other)]
    Unknown,
}

impl StateType {
    pub fn from_api(value: &str) -> Self {
        match value {
            "backlog" => Self::Backlog,
            "unstarted" => Self::Unstarted,
            "started" => Self::Started,
            "completed" => Self::Completed,
            "canceled" => Self::Canceled,
            "triage" => Self::Triage,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Triage => "triage",
            Self::Unknown => "unknown",
        }
    }

    /// Display precedence used by list sorting and board column order.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Started => 0,
            Self::Unstarted => 1,
            Self::Backlog => 2,
            Self::Triage | Self::Unknown => 3,
            Self::Completed => 4,
            Self::Canceled => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub color: String,
    pub state_type: StateType,
    pub position: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
    pub active: bool,
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub key: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub state: Option<String>,
    pub progress: f64,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub identifier: String, // e.g., "ENG-123"
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub estimate: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub due_date: Option<String>,
    pub branch_name: String,
    pub url: String,
    pub state: Option<WorkflowState>,
    pub assignee: Option<User>,
    pub creator: Option<User>,
    pub team: Option<Team>,
    pub project: Option<Project>,
    pub labels: Vec<Label>,
}

impl Issue {
    /// State type, treating a missing state as unstarted.
    pub fn state_type(&self) -> StateType {
        self.state
            .as_ref()
            .map(|s| s.state_type)
            .unwrap_or(StateType::Unstarted)
    }

    pub fn state_name(&self) -> &str {
        self.state.as_ref().map(|s| s.name.as_str()).unwrap_or("Unknown")
    }

    pub fn assignee_name(&self) -> &str {
        self.assignee
            .as_ref()
            .map(|u| u.name.as_str())
            .unwrap_or("Unassigned")
    }
}

/// Cursor pagination state attached to every issue listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssuePage {
    pub issues: Vec<Issue>,
    pub page_info: PageInfo,
}

/// Predefined issue listings shown as tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tab {
    Project,
    MyIssues,
    AllIssues,
    Active,
    Backlog,
}

const TABS_WITH_PROJECT: [Tab; 5] = [
    Tab::Project,
    Tab::MyIssues,
    Tab::AllIssues,
    Tab::Active,
    Tab::Backlog,
];

impl Tab {
    pub fn title(self) -> &'static str {
        match self {
            Tab::Project => "Project",
            Tab::MyIssues => "My Issues",
            Tab::AllIssues => "All Issues",
            Tab::Active => "Active",
            Tab::Backlog => "Backlog",
        }
    }

    /// Tabs in display order. The Project tab only exists when a project was matched.
    pub fn available(has_project: bool) -> &'static [Tab] {
        if has_project {
            &TABS_WITH_PROJECT
        } else {
            &TABS_WITH_PROJECT[1..]
        }
    }

    /// Parse the `defaults.view` config value.
    pub fn from_config(value: &str) -> Option<Tab> {
        match value.trim().to_lowercase().as_str() {
            "my-issues" | "my_issues" | "mine" => Some(Tab::MyIssues),
            "all-issues" | "all_issues" | "all" => Some(Tab::AllIssues),
            "active" => Some(Tab::Active),
            "backlog" => Some(Tab::Backlog),
            _ => None,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Server-side filter for an issue listing.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFilter {
    /// List the viewer's assigned issues instead of the whole workspace.
    pub mine: bool,
    pub team_id: Option<String>,
    pub project_id: Option<String>,
    pub assignee_id: Option<String>,
    pub state_type: Option<StateType>,
    /// Drop completed and canceled issues.
    pub exclude_closed: bool,
    /// Case-insensitive title/description substring.
    pub query: Option<String>,
    pub first: usize,
    pub after: Option<String>,
}

impl Default for IssueFilter {
    fn default() -> Self {
        Self {
            mine: false,
            team_id: None,
            project_id: None,
            assignee_id: None,
            state_type: None,
            exclude_closed: false,
            query: None,
            first: DEFAULT_PAGE_SIZE,
            after: None,
        }
    }
}

impl IssueFilter {
    /// Build the listing for a tab.
    ///
    /// `current_project` is the project behind the Project tab, `filter_project`
    /// is the user-selected project filter applied to the other tabs.
    pub fn for_tab(tab: Tab, current_project: Option<&str>, filter_project: Option<&str>) -> Self {
        let filter_project = filter_project.map(str::to_string);
        match tab {
            Tab::Project => Self {
                project_id: current_project.map(str::to_string),
                exclude_closed: true,
                ..Self::default()
            },
            Tab::MyIssues => Self {
                mine: true,
                project_id: filter_project,
                ..Self::default()
            },
            Tab::AllIssues => Self {
                project_id: filter_project,
                ..Self::default()
            },
            Tab::Active => Self {
                project_id: filter_project,
                state_type: Some(StateType::Started),
                ..Self::default()
            },
            Tab::Backlog => Self {
                project_id: filter_project,
                state_type: Some(StateType::Backlog),
                ..Self::default()
            },
        }
    }

    pub fn with_cursor(mut self, after: Option<String>) -> Self {
        self.after = after;
        self
    }
}

/// Tri-state value for nullable fields of an update.
///
/// `Keep` leaves the field out of the payload, `Clear` sends an explicit
/// `null`, `Set` sends the value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    #[default]
    Keep,
    Clear,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// `Some` becomes `Set`, `None` becomes `Clear`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Set(v),
            None => Patch::Clear,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(value) => value.serialize(serializer),
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueCreateInput {
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub team_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub label_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub assignee_id: Patch<String>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub project_id: Patch<String>,
}

impl IssueUpdateInput {
    pub fn state(state_id: impl Into<String>) -> Self {
        Self {
            state_id: Some(state_id.into()),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority.as_int()),
            ..Self::default()
        }
    }

    /// `None` unassigns the issue.
    pub fn assignee(assignee_id: Option<String>) -> Self {
        Self {
            assignee_id: Patch::from_option(assignee_id),
            ..Self::default()
        }
    }
}

fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(['-', '_'], "")
}

/// Find the project whose name matches a git repository name.
///
/// Matches case-insensitively when either name contains the other, with and
/// without `-`/`_` separators.
pub fn match_project<'a>(projects: &'a [Project], repo_name: &str) -> Option<&'a Project> {
    let repo = repo_name.trim().to_lowercase();
    if repo.is_empty() {
        return None;
    }
    let repo_norm = normalize_name(&repo);

    projects.iter().find(|project| {
        let name = project.name.to_lowercase();
        let name_norm = normalize_name(&name);
        name.contains(&repo)
            || repo.contains(&name)
            || (!repo_norm.is_empty() && name_norm.contains(&repo_norm))
            || (!name_norm.is_empty() && repo_norm.contains(&name_norm))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.to_string(),
            name: name.to_string(),
            icon: None,
            color: None,
            state: None,
            progress: 0.0,
            url: None,
        }
    }

    #[test]
    fn priority_from_int_maps_out_of_range_to_none() {
        assert_eq!(Priority::from_int(1), Priority::Urgent);
        assert_eq!(Priority::from_int(4), Priority::Low);
        assert_eq!(Priority::from_int(7), Priority::NoPriority);
        assert_eq!(Priority::from_int(-1), Priority::NoPriority);
    }

    #[test]
    fn no_priority_ranks_after_low() {
        assert!(Priority::Low.sort_rank() < Priority::NoPriority.sort_rank());
        assert!(Priority::Urgent.sort_rank() < Priority::High.sort_rank());
    }

    #[test]
    fn state_type_precedence_matches_lifecycle() {
        assert_eq!(StateType::Started.precedence(), 0);
        assert_eq!(StateType::Unstarted.precedence(), 1);
        assert_eq!(StateType::Backlog.precedence(), 2);
        assert_eq!(StateType::Triage.precedence(), 3);
        assert_eq!(StateType::from_api("weird").precedence(), 3);
        assert_eq!(StateType::Completed.precedence(), 4);
        assert_eq!(StateType::Canceled.precedence(), 5);
    }

    #[test]
    fn patch_serializes_keep_clear_and_set() {
        let input = IssueUpdateInput {
            assignee_id: Patch::Clear,
            project_id: Patch::Set("p1".to_string()),
            ..IssueUpdateInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "assigneeId": null, "projectId": "p1" })
        );

        let untouched = serde_json::to_value(IssueUpdateInput::priority(Priority::High)).unwrap();
        assert_eq!(untouched, serde_json::json!({ "priority": 2 }));
    }

    #[test]
    fn create_input_omits_unset_optionals() {
        let input = IssueCreateInput {
            title: "Fix login".to_string(),
            team_id: "t1".to_string(),
            ..IssueCreateInput::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "Fix login", "teamId": "t1" }));
    }

    #[test]
    fn tabs_include_project_only_when_matched() {
        assert_eq!(Tab::available(false).len(), 4);
        assert_eq!(Tab::available(true)[0], Tab::Project);
        assert_eq!(Tab::from_config("backlog"), Some(Tab::Backlog));
        assert_eq!(Tab::from_config("nope"), None);
    }

    #[test]
    fn filter_for_tab_applies_project_filter() {
        let active = IssueFilter::for_tab(Tab::Active, None, Some("p9"));
        assert_eq!(active.state_type, Some(StateType::Started));
        assert_eq!(active.project_id.as_deref(), Some("p9"));

        let project = IssueFilter::for_tab(Tab::Project, Some("p1"), Some("p9"));
        assert_eq!(project.project_id.as_deref(), Some("p1"));
        assert!(project.exclude_closed);

        let mine = IssueFilter::for_tab(Tab::MyIssues, None, None);
        assert!(mine.mine);
        assert_eq!(mine.first, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn match_project_handles_separators_and_case() {
        let projects = vec![project("1", "Billing Service"), project("2", "Lazy Liner")];
        assert_eq!(match_project(&projects, "lazy-liner").map(|p| p.id.as_str()), None);
        let projects = vec![project("1", "billing"), project("2", "lazyliner")];
        assert_eq!(
            match_project(&projects, "Lazy_Liner").map(|p| p.id.as_str()),
            Some("2")
        );
        assert_eq!(
            match_project(&projects, "billing-api").map(|p| p.id.as_str()),
            Some("1")
        );
        assert!(match_project(&projects, "").is_none());
    }
}
