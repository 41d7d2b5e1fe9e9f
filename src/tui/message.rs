//! Message enum for the Elm-style update loop.
//!
//! Input events and async completions both arrive as messages and go through
//! `App::update()`. Completion payloads carry errors as display strings so
//! messages stay `Clone + PartialEq` and easy to build in tests.

use crate::data::{Issue, IssuePage, Label, Project, Team, User, Viewer, WorkflowState};
use crate::integrations::ai::Draft;
use crossterm::event::KeyEvent;

/// Result of the startup fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Bootstrap {
    pub viewer: Viewer,
    pub teams: Vec<Team>,
    pub projects: Vec<Project>,
    /// Name of the git repository the app was started in, if any.
    pub repo_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────
    /// No operation (pending chords, swallowed keys)
    None,
    Quit,
    /// Spinner/animation tick
    Tick,
    Resize(u16, u16),
    ToggleHelp,
    /// A key for the active view to interpret
    Key(KeyEvent),

    // ─────────────────────────────────────────────────────────────────────────
    // Loads
    // ─────────────────────────────────────────────────────────────────────────
    BootstrapLoaded(Result<Bootstrap, String>),
    /// A page for the active tab. `generation` is the list generation the
    /// request was issued under; `append` marks a "load more" page.
    IssuesLoaded {
        generation: u64,
        append: bool,
        result: Result<IssuePage, String>,
    },
    /// Full project listing used as the search source on the Project tab.
    ProjectIssuesLoaded {
        generation: u64,
        result: Result<IssuePage, String>,
    },
    StatesLoaded(Result<Vec<WorkflowState>, String>),
    LabelsLoaded(Result<Vec<Label>, String>),
    UsersLoaded(Result<Vec<User>, String>),

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────
    IssueCreated(Result<Issue, String>),
    IssueUpdated(Result<Issue, String>),
    /// Ok carries the identifier of the deleted issue.
    IssueDeleted(Result<String, String>),
    /// Ok carries the provider name and the draft.
    DraftGenerated(Result<(String, Draft), String>),

    /// Plain status line update from a side-effect task.
    Status { text: String, is_error: bool },
}
