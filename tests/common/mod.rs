//! Fixture builders shared by the integration tests.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use lazyliner::config::Config;
use lazyliner::data::{
    Issue, IssuePage, PageInfo, Priority, Project, StateType, Team, User, Viewer, WorkflowState,
};
use lazyliner::tui::{App, Command, Message};

pub fn state(id: &str, name: &str, state_type: StateType) -> WorkflowState {
    WorkflowState {
        id: id.to_string(),
        name: name.to_string(),
        color: "#888888".to_string(),
        state_type,
        position: 1.0,
    }
}

pub fn todo() -> WorkflowState {
    state("s-todo", "Todo", StateType::Unstarted)
}

pub fn in_progress() -> WorkflowState {
    state("s-doing", "In Progress", StateType::Started)
}

pub fn done() -> WorkflowState {
    state("s-done", "Done", StateType::Completed)
}

pub fn user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        display_name: name.to_lowercase(),
        email: format!("{}@example.com", name.to_lowercase()),
        active: true,
    }
}

pub fn team(id: &str, key: &str) -> Team {
    Team {
        id: id.to_string(),
        name: format!("Team {}", key),
        key: key.to_string(),
        color: None,
        icon: None,
    }
}

pub fn project(id: &str, name: &str) -> Project {
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

/// Issue `identifier` in state `state`, updated `hour` o'clock on a fixed day.
pub fn issue(identifier: &str, state: WorkflowState, priority: Priority, hour: u32) -> Issue {
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
    Issue {
        id: format!("id-{}", identifier.to_lowercase()),
        identifier: identifier.to_string(),
        title: format!("Issue {}", identifier),
        description: String::new(),
        priority,
        estimate: None,
        created_at: ts,
        updated_at: ts,
        due_date: None,
        branch_name: format!("eng/{}", identifier.to_lowercase()),
        url: format!("https://linear.app/acme/issue/{}", identifier),
        state: Some(state),
        assignee: None,
        creator: None,
        team: None,
        project: None,
        labels: Vec::new(),
    }
}

pub fn page(issues: Vec<Issue>, cursor: Option<&str>) -> IssuePage {
    IssuePage {
        issues,
        page_info: PageInfo {
            has_next_page: cursor.is_some(),
            end_cursor: cursor.map(str::to_string),
        },
    }
}

pub fn viewer() -> Viewer {
    Viewer {
        id: "me".to_string(),
        name: "Robin".to_string(),
        display_name: "robin".to_string(),
        email: "robin@example.com".to_string(),
    }
}

pub fn credentialed_app() -> App {
    let mut config = Config::default();
    config.linear.api_key = "lin_api_test".to_string();
    App::new(config, None, 120, 32)
}

pub fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

pub fn ch(c: char) -> Message {
    key(KeyCode::Char(c))
}

pub fn ctrl(c: char) -> Message {
    Message::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
}

pub fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.update(ch(c));
    }
}

/// Generation of the single `LoadIssues` in `commands`.
pub fn issued_generation(commands: &[Command]) -> u64 {
    commands
        .iter()
        .find_map(|c| match c {
            Command::LoadIssues { generation, .. } => Some(*generation),
            _ => None,
        })
        .expect("no LoadIssues command")
}
