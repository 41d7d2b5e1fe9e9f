//! Builders for unit tests.

use super::*;
use chrono::TimeZone;

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
}

pub fn state(id: &str, name: &str, state_type: StateType, position: f64) -> WorkflowState {
    WorkflowState {
        id: id.to_string(),
        name: name.to_string(),
        color: "#888888".to_string(),
        state_type,
        position,
    }
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

pub fn team(id: &str, name: &str, key: &str) -> Team {
    Team {
        id: id.to_string(),
        name: name.to_string(),
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

pub fn label(id: &str, name: &str) -> Label {
    Label {
        id: id.to_string(),
        name: name.to_string(),
        color: None,
    }
}

/// An unstarted, unassigned issue whose id is the lowercased identifier.
pub fn issue(identifier: &str) -> Issue {
    Issue {
        id: identifier.to_lowercase(),
        identifier: identifier.to_string(),
        title: format!("Title of {}", identifier),
        description: String::new(),
        priority: Priority::NoPriority,
        estimate: None,
        created_at: at(8),
        updated_at: at(9),
        due_date: None,
        branch_name: format!("feature/{}", identifier.to_lowercase()),
        url: format!("https://linear.app/acme/issue/{}", identifier),
        state: Some(state("todo", "Todo", StateType::Unstarted, 1.0)),
        assignee: None,
        creator: None,
        team: None,
        project: None,
        labels: vec![],
    }
}
