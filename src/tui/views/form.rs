//! Create and edit forms.
//!
//! Both forms are an ordered list of fields with a wrapping focus index.
//! Text fields take typed characters; select fields cycle with left/right.
//! The edit form can also open an embedded picker on a select field, and its
//! nullable selections (project, assignee) are submitted as explicit nulls
//! rather than omitted.

use super::picker::{PickerAction, PickerItem, PickerView};
use super::{muted_style, selected_style};
use crate::data::{
    Issue, IssueCreateInput, IssueUpdateInput, Label, Patch, Priority, Project, Team, User,
    WorkflowState,
};
use crate::integrations::ai::Draft;
use crate::tui::ui::icons;
use crate::tui::ui::layout::wrap_text;
use crate::tui::ui::status::{priority_config, state_config};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const DESCRIPTION_ROWS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction<T> {
    None,
    Submit(T),
    Cancel,
    /// Ask the text-generation provider for a draft built from `prompt`.
    GenerateDraft { prompt: String },
}

/// Minimal append-only text input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    multiline: bool,
}

impl TextField {
    pub fn single(value: &str) -> Self {
        Self {
            value: value.to_string(),
            multiline: false,
        }
    }

    pub fn multi(value: &str) -> Self {
        Self {
            value: value.to_string(),
            multiline: true,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    /// Returns true when the key edited the text.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.value.push(c),
            KeyCode::Backspace => {
                self.value.pop();
            }
            KeyCode::Enter if self.multiline => self.value.push('\n'),
            _ => return false,
        }
        true
    }

    fn lines(&self, width: usize, focused: bool, placeholder: &str) -> Vec<Line<'static>> {
        if self.value.is_empty() && !focused {
            return vec![Line::from(Span::styled(placeholder.to_string(), muted_style()))];
        }
        let mut rows = wrap_text(&self.value, width.max(1));
        if rows.is_empty() {
            rows.push(String::new());
        }
        if focused {
            if let Some(last) = rows.last_mut() {
                last.push('█');
            }
        }
        if self.multiline && rows.len() > DESCRIPTION_ROWS {
            rows.drain(..rows.len() - DESCRIPTION_ROWS);
        }
        rows.into_iter()
            .map(|row| Line::from(Span::styled(row, Style::default().fg(Color::White))))
            .collect()
    }
}

/// Step an optional index (None = "no selection") within `0..len`, clamped.
fn step_optional(current: Option<usize>, len: usize, dir: i32) -> Option<usize> {
    match (current, dir.signum()) {
        (None, 1) if len > 0 => Some(0),
        (None, _) => None,
        (Some(0), -1) => None,
        (Some(i), -1) => Some(i - 1),
        (Some(i), _) => Some((i + 1).min(len.saturating_sub(1))),
    }
}

fn step_required(current: usize, len: usize, dir: i32) -> usize {
    if dir < 0 {
        current.saturating_sub(1)
    } else {
        (current + 1).min(len.saturating_sub(1))
    }
}

fn step_priority(current: Priority, dir: i32) -> Priority {
    let next = (current.as_int() + i64::from(dir.signum())).clamp(0, 4);
    Priority::from_int(next)
}

fn field_label(name: &str, focused: bool) -> Span<'static> {
    let style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("{:<12}", name), style)
}

fn select_line(name: &str, value: String, focused: bool) -> Line<'static> {
    let style = if focused {
        selected_style()
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(vec![
        field_label(name, focused),
        Span::styled(
            format!("{} {} {}", icons::SELECT_LEFT, value, icons::SELECT_RIGHT),
            style,
        ),
    ])
}

fn priority_text(priority: Priority) -> String {
    format!("{} {}", priority_config(priority).icon, priority.label())
}

fn nav_key(key: &KeyEvent) -> Option<i32> {
    match key.code {
        KeyCode::Tab | KeyCode::Down => Some(1),
        KeyCode::BackTab | KeyCode::Up => Some(-1),
        _ => None,
    }
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Items for the priority pickers, in API order.
pub fn priority_items() -> Vec<PickerItem> {
    Priority::all()
        .into_iter()
        .map(|p| {
            let label = match p {
                Priority::NoPriority => "No Priority",
                other => other.label(),
            };
            PickerItem::new(p.as_int().to_string(), label).with_icon(priority_config(p).icon)
        })
        .collect()
}

/// Status picker items with state icons.
pub fn state_items(states: &[WorkflowState]) -> Vec<PickerItem> {
    states
        .iter()
        .map(|s| PickerItem::new(&s.id, &s.name).with_icon(state_config(s.state_type).icon))
        .collect()
}

/// "Unassigned" (empty id) followed by the users.
pub fn assignee_items(users: &[User]) -> Vec<PickerItem> {
    std::iter::once(PickerItem::new("", "Unassigned"))
        .chain(users.iter().map(|u| PickerItem::new(&u.id, &u.name)))
        .collect()
}

/// `first` (empty id) followed by the projects.
pub fn project_items(projects: &[Project], first: &str) -> Vec<PickerItem> {
    std::iter::once(PickerItem::new("", first))
        .chain(projects.iter().map(|p| {
            let item = PickerItem::new(&p.id, &p.name);
            match &p.icon {
                Some(icon) if !icon.is_empty() => item.with_icon(icon.clone()),
                _ => item,
            }
        }))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Create
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Title,
    Description,
    Team,
    Project,
    Priority,
    Assignee,
}

const CREATE_FIELDS: [CreateField; 6] = [
    CreateField::Title,
    CreateField::Description,
    CreateField::Team,
    CreateField::Project,
    CreateField::Priority,
    CreateField::Assignee,
];

#[derive(Debug, Clone)]
pub struct CreateForm {
    title: TextField,
    description: TextField,
    teams: Vec<Team>,
    projects: Vec<Project>,
    users: Vec<User>,
    team: usize,
    project: Option<usize>,
    priority: Priority,
    assignee: Option<usize>,
    /// Label ids suggested by a generated draft.
    label_ids: Vec<String>,
    label_names: Vec<String>,
    focus: usize,
    width: u16,
}

impl CreateForm {
    pub fn new(teams: &[Team], projects: &[Project], users: &[User], width: u16) -> Self {
        Self {
            title: TextField::single(""),
            description: TextField::multi(""),
            teams: teams.to_vec(),
            projects: projects.to_vec(),
            users: users.to_vec(),
            team: 0,
            project: None,
            priority: Priority::NoPriority,
            assignee: None,
            label_ids: Vec::new(),
            label_names: Vec::new(),
            focus: 0,
            width,
        }
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width;
    }

    pub fn focused(&self) -> CreateField {
        CREATE_FIELDS[self.focus]
    }

    pub fn title(&self) -> &str {
        self.title.value()
    }

    /// Preselect a project (used when the Project tab is active).
    pub fn select_project(&mut self, project_id: &str) {
        self.project = self.projects.iter().position(|p| p.id == project_id);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction<IssueCreateInput> {
        if is_ctrl(&key, 's') {
            return FormAction::Submit(self.input());
        }
        if is_ctrl(&key, 'g') {
            return FormAction::GenerateDraft {
                prompt: self.title.value().trim().to_string(),
            };
        }
        if key.code == KeyCode::Esc {
            return FormAction::Cancel;
        }
        if let Some(dir) = nav_key(&key) {
            let len = CREATE_FIELDS.len() as i32;
            self.focus = (self.focus as i32 + dir).rem_euclid(len) as usize;
            return FormAction::None;
        }

        let dir = match key.code {
            KeyCode::Left => -1,
            KeyCode::Right => 1,
            _ => 0,
        };
        match self.focused() {
            CreateField::Title => {
                self.title.handle_key(&key);
            }
            CreateField::Description => {
                self.description.handle_key(&key);
            }
            _ if dir == 0 => {}
            CreateField::Team => self.team = step_required(self.team, self.teams.len(), dir),
            CreateField::Project => {
                self.project = step_optional(self.project, self.projects.len(), dir)
            }
            CreateField::Priority => self.priority = step_priority(self.priority, dir),
            CreateField::Assignee => {
                self.assignee = step_optional(self.assignee, self.users.len(), dir)
            }
        }
        FormAction::None
    }

    /// Current values as a create payload. Unset optionals are omitted.
    pub fn input(&self) -> IssueCreateInput {
        IssueCreateInput {
            title: self.title.value().to_string(),
            description: self.description.value().to_string(),
            team_id: self
                .teams
                .get(self.team)
                .map(|t| t.id.clone())
                .unwrap_or_default(),
            project_id: self
                .project
                .and_then(|i| self.projects.get(i))
                .map(|p| p.id.clone()),
            assignee_id: self
                .assignee
                .and_then(|i| self.users.get(i))
                .map(|u| u.id.clone()),
            state_id: None,
            priority: (self.priority != Priority::NoPriority).then(|| self.priority.as_int()),
            label_ids: self.label_ids.clone(),
        }
    }

    /// Fill the form from a generated draft. Suggested labels are matched by
    /// name, case-insensitively, against `labels`.
    pub fn apply_draft(&mut self, draft: &Draft, labels: &[Label]) {
        if !draft.title.is_empty() {
            self.title.set(&draft.title);
        }
        if !draft.description.is_empty() {
            self.description.set(&draft.description);
        }
        self.priority = Priority::from_int(draft.suggested_priority.clamp(0, 4));

        let matched: Vec<&Label> = draft
            .suggested_labels
            .iter()
            .filter_map(|name| labels.iter().find(|l| l.name.eq_ignore_ascii_case(name)))
            .collect();
        self.label_ids = matched.iter().map(|l| l.id.clone()).collect();
        self.label_names = matched.iter().map(|l| l.name.clone()).collect();
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let text_width = (self.width.min(area.width) as usize).saturating_sub(16).max(20);
        let focus = self.focused();
        let mut lines = vec![
            Line::from(Span::styled(
                "Create Issue",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(field_label("Title", focus == CreateField::Title)),
        ];
        lines.extend(indent(self.title.lines(
            text_width,
            focus == CreateField::Title,
            "Issue title (ctrl+g drafts from this)",
        )));
        lines.push(Line::from(field_label(
            "Description",
            focus == CreateField::Description,
        )));
        lines.extend(indent(self.description.lines(
            text_width,
            focus == CreateField::Description,
            "Description (markdown supported)",
        )));
        lines.push(Line::from(""));

        let team = self
            .teams
            .get(self.team)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "None".to_string());
        lines.push(select_line("Team", team, focus == CreateField::Team));
        let project = match self.project.and_then(|i| self.projects.get(i)) {
            Some(p) => p.name.clone(),
            None if !self.project_changed => self
                .original_project
                .clone()
                .unwrap_or_else(|| "None".to_string()),
            None => "None".to_string(),
        };
        lines.push(select_line("Project", project, focus == CreateField::Project));
        lines.push(select_line(
            "Priority",
            priority_text(self.priority),
            focus == CreateField::Priority,
        ));
        let assignee = match self.assignee.and_then(|i| self.users.get(i)) {
            Some(u) => u.name.clone(),
            None if !self.assignee_changed => self
                .original_assignee
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
            None => "Unassigned".to_string(),
        };
        lines.push(select_line("Assignee", assignee, focus == CreateField::Assignee));
        if !self.label_names.is_empty() {
            lines.push(Line::from(vec![
                field_label("Labels", false),
                Span::raw(self.label_names.join(", ")),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab: next field  ←/→: change selection  Ctrl+G: AI draft  Ctrl+S: submit  Esc: cancel",
            muted_style(),
        )));

        f.render_widget(Paragraph::new(lines), padded(area));
    }
}

fn indent(lines: Vec<Line<'static>>) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .map(|mut line| {
            line.spans.insert(0, Span::raw("  "));
            line
        })
        .collect()
}

fn padded(area: Rect) -> Rect {
    Rect {
        x: area.x + 2.min(area.width),
        y: area.y + 1.min(area.height),
        width: area.width.saturating_sub(4),
        height: area.height.saturating_sub(1),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Edit
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Title,
    Description,
    Status,
    Priority,
    Assignee,
    Project,
}

const EDIT_FIELDS: [EditField; 6] = [
    EditField::Title,
    EditField::Description,
    EditField::Status,
    EditField::Priority,
    EditField::Assignee,
    EditField::Project,
];

#[derive(Debug, Clone)]
pub struct EditForm {
    issue_id: String,
    identifier: String,
    /// Shown when the issue's state is not one of `states`.
    original_state: String,
    title: TextField,
    description: TextField,
    states: Vec<WorkflowState>,
    projects: Vec<Project>,
    users: Vec<User>,
    state: Option<usize>,
    priority: Priority,
    assignee: Option<usize>,
    project: Option<usize>,
    /// Current relation names, shown until the user picks a new value.
    original_assignee: Option<String>,
    original_project: Option<String>,
    assignee_changed: bool,
    project_changed: bool,
    focus: usize,
    picker: Option<(EditField, PickerView)>,
    width: u16,
}

impl EditForm {
    pub fn new(
        issue: &Issue,
        states: &[WorkflowState],
        projects: &[Project],
        users: &[User],
        width: u16,
    ) -> Self {
        let state_id = issue.state.as_ref().map(|s| s.id.as_str());
        let project_id = issue.project.as_ref().map(|p| p.id.as_str());
        let assignee_id = issue.assignee.as_ref().map(|u| u.id.as_str());
        Self {
            issue_id: issue.id.clone(),
            identifier: issue.identifier.clone(),
            original_state: issue.state_name().to_string(),
            title: TextField::single(&issue.title),
            description: TextField::multi(&issue.description),
            states: states.to_vec(),
            projects: projects.to_vec(),
            users: users.to_vec(),
            state: state_id.and_then(|id| states.iter().position(|s| s.id == id)),
            priority: issue.priority,
            assignee: assignee_id.and_then(|id| users.iter().position(|u| u.id == id)),
            project: project_id.and_then(|id| projects.iter().position(|p| p.id == id)),
            original_assignee: issue.assignee.as_ref().map(|u| u.name.clone()),
            original_project: issue.project.as_ref().map(|p| p.name.clone()),
            assignee_changed: false,
            project_changed: false,
            focus: 0,
            picker: None,
            width,
        }
    }

    pub fn resize(&mut self, width: u16) {
        self.width = width;
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    pub fn focused(&self) -> EditField {
        EDIT_FIELDS[self.focus]
    }

    pub fn picker(&self) -> Option<&PickerView> {
        self.picker.as_ref().map(|(_, p)| p)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction<IssueUpdateInput> {
        if let Some((field, picker)) = self.picker.as_mut() {
            let field = *field;
            match picker.handle_key(key) {
                PickerAction::Select(item) => {
                    self.apply_pick(field, &item.id);
                    self.picker = None;
                }
                PickerAction::Cancel => self.picker = None,
                PickerAction::None => {}
            }
            return FormAction::None;
        }

        if is_ctrl(&key, 's') {
            return FormAction::Submit(self.input());
        }
        if key.code == KeyCode::Esc {
            return FormAction::Cancel;
        }
        if let Some(dir) = nav_key(&key) {
            let len = EDIT_FIELDS.len() as i32;
            self.focus = (self.focus as i32 + dir).rem_euclid(len) as usize;
            return FormAction::None;
        }

        let field = self.focused();
        match field {
            EditField::Title => {
                self.title.handle_key(&key);
            }
            EditField::Description => {
                self.description.handle_key(&key);
            }
            _ => match key.code {
                KeyCode::Enter => self.open_picker(field),
                KeyCode::Left => self.step(field, -1),
                KeyCode::Right => self.step(field, 1),
                _ => {}
            },
        }
        FormAction::None
    }

    fn open_picker(&mut self, field: EditField) {
        let picker = match field {
            EditField::Status => PickerView::new("Select Status", state_items(&self.states)),
            EditField::Priority => PickerView::new("Select Priority", priority_items()),
            EditField::Assignee => PickerView::new("Select Assignee", assignee_items(&self.users)),
            EditField::Project => {
                PickerView::new("Select Project", project_items(&self.projects, "None"))
            }
            EditField::Title | EditField::Description => return,
        };
        self.picker = Some((field, picker));
    }

    fn apply_pick(&mut self, field: EditField, id: &str) {
        match field {
            EditField::Status => {
                if let Some(i) = self.states.iter().position(|s| s.id == id) {
                    self.state = Some(i);
                }
            }
            EditField::Priority => {
                if let Ok(value) = id.parse::<i64>() {
                    self.priority = Priority::from_int(value);
                }
            }
            EditField::Assignee => {
                self.assignee = self.users.iter().position(|u| u.id == id);
                self.assignee_changed = true;
            }
            EditField::Project => {
                self.project = self.projects.iter().position(|p| p.id == id);
                self.project_changed = true;
            }
            EditField::Title | EditField::Description => {}
        }
    }

    fn step(&mut self, field: EditField, dir: i32) {
        match field {
            EditField::Status => {
                if !self.states.is_empty() {
                    let current = self.state.unwrap_or(0);
                    self.state = Some(step_required(current, self.states.len(), dir));
                }
            }
            EditField::Priority => self.priority = step_priority(self.priority, dir),
            EditField::Assignee => {
                self.assignee = step_optional(self.assignee, self.users.len(), dir);
                self.assignee_changed = true;
            }
            EditField::Project => {
                self.project = step_optional(self.project, self.projects.len(), dir);
                self.project_changed = true;
            }
            EditField::Title | EditField::Description => {}
        }
    }

    /// Update payload. Assignee and project are omitted until the user
    /// changes them; after that "None"/"Unassigned" clears them on the server.
    pub fn input(&self) -> IssueUpdateInput {
        IssueUpdateInput {
            title: Some(self.title.value().to_string()),
            description: Some(self.description.value().to_string()),
            state_id: self
                .state
                .and_then(|i| self.states.get(i))
                .map(|s| s.id.clone()),
            priority: Some(self.priority.as_int()),
            assignee_id: if self.assignee_changed {
                Patch::from_option(
                    self.assignee
                        .and_then(|i| self.users.get(i))
                        .map(|u| u.id.clone()),
                )
            } else {
                Patch::Keep
            },
            project_id: if self.project_changed {
                Patch::from_option(
                    self.project
                        .and_then(|i| self.projects.get(i))
                        .map(|p| p.id.clone()),
                )
            } else {
                Patch::Keep
            },
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect) {
        let text_width = (self.width.min(area.width) as usize).saturating_sub(16).max(20);
        let focus = self.focused();
        let mut lines = vec![
            Line::from(Span::styled(
                format!("Edit Issue: {}", self.identifier),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(field_label("Title", focus == EditField::Title)),
        ];
        lines.extend(indent(self.title.lines(
            text_width,
            focus == EditField::Title,
            "Issue title",
        )));
        lines.push(Line::from(field_label(
            "Description",
            focus == EditField::Description,
        )));
        lines.extend(indent(self.description.lines(
            text_width,
            focus == EditField::Description,
            "Description (markdown supported)",
        )));
        lines.push(Line::from(""));

        let status = match self.state.and_then(|i| self.states.get(i)) {
            Some(s) => format!("{} {}", state_config(s.state_type).icon, s.name),
            None => self.original_state.clone(),
        };
        lines.push(select_line("Status", status, focus == EditField::Status));
        lines.push(select_line(
            "Priority",
            priority_text(self.priority),
            focus == EditField::Priority,
        ));
        let assignee = self
            .assignee
            .and_then(|i| self.users.get(i))
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Unassigned".to_string());
        lines.push(select_line("Assignee", assignee, focus == EditField::Assignee));
        let project = self
            .project
            .and_then(|i| self.projects.get(i))
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "None".to_string());
        lines.push(select_line("Project", project, focus == EditField::Project));

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab: next  Enter: select  ←/→: quick change  Ctrl+S: save  Esc: cancel",
            muted_style(),
        )));

        f.render_widget(Paragraph::new(lines), padded(area));

        if let Some((_, picker)) = &self.picker {
            picker.render(f, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{issue, label, project, state, team, user};
    use crate::data::StateType;
    use crate::tui::views::testing::{contains, render_rows};
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text<T>(handle: &mut impl FnMut(KeyEvent) -> FormAction<T>, text: &str) {
        for c in text.chars() {
            handle(key(KeyCode::Char(c)));
        }
    }

    fn create_form() -> CreateForm {
        CreateForm::new(
            &[team("t1", "Engineering", "ENG"), team("t2", "Design", "DES")],
            &[project("p1", "Apollo")],
            &[user("u1", "Alex"), user("u2", "Dana")],
            80,
        )
    }

    #[test]
    fn step_optional_clamps_both_ends() {
        assert_eq!(step_optional(None, 2, -1), None);
        assert_eq!(step_optional(None, 2, 1), Some(0));
        assert_eq!(step_optional(Some(0), 2, -1), None);
        assert_eq!(step_optional(Some(1), 2, 1), Some(1));
        assert_eq!(step_optional(None, 0, 1), None);
    }

    #[test]
    fn create_form_defaults_omit_optionals() {
        let mut form = create_form();
        type_text(&mut |k| form.handle_key(k), "Fix login");
        let FormAction::Submit(input) = form.handle_key(ctrl('s')) else {
            panic!("expected submit");
        };
        assert_eq!(input.title, "Fix login");
        assert_eq!(input.team_id, "t1");
        assert_eq!(input.project_id, None);
        assert_eq!(input.assignee_id, None);
        assert_eq!(input.priority, None);
    }

    #[test]
    fn create_form_focus_wraps_and_selects() {
        let mut form = create_form();
        form.handle_key(key(KeyCode::BackTab));
        assert_eq!(form.focused(), CreateField::Assignee);
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Tab));
        assert_eq!(form.focused(), CreateField::Title);

        // Team, then project
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Right));
        form.handle_key(key(KeyCode::Right));

        let input = form.input();
        assert_eq!(input.team_id, "t2");
        assert_eq!(input.project_id.as_deref(), Some("p1"));
        assert_eq!(input.priority, Some(2));
        assert_eq!(input.assignee_id.as_deref(), Some("u2"));
    }

    #[test]
    fn description_accepts_newlines() {
        let mut form = create_form();
        form.handle_key(key(KeyCode::Tab));
        type_text(&mut |k| form.handle_key(k), "a");
        form.handle_key(key(KeyCode::Enter));
        type_text(&mut |k| form.handle_key(k), "b");
        form.handle_key(key(KeyCode::Backspace));
        assert_eq!(form.input().description, "a\n");
    }

    #[test]
    fn ctrl_g_requests_draft_from_title() {
        let mut form = create_form();
        type_text(&mut |k| form.handle_key(k), " login bug ");
        assert_eq!(
            form.handle_key(ctrl('g')),
            FormAction::GenerateDraft {
                prompt: "login bug".to_string()
            }
        );
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
    }

    #[test]
    fn apply_draft_fills_fields_and_matches_labels() {
        let mut form = create_form();
        let draft = Draft {
            title: "Fix login redirect".to_string(),
            description: "Steps".to_string(),
            suggested_labels: vec!["bug".to_string(), "Missing".to_string()],
            suggested_priority: 9,
        };
        form.apply_draft(&draft, &[label("l1", "Bug"), label("l2", "UI")]);
        let input = form.input();
        assert_eq!(input.title, "Fix login redirect");
        assert_eq!(input.description, "Steps");
        assert_eq!(input.priority, Some(4));
        assert_eq!(input.label_ids, vec!["l1".to_string()]);
    }

    fn edit_form() -> EditForm {
        let mut target = issue("ABC-12");
        target.assignee = Some(user("u1", "Alex"));
        target.project = Some(project("p1", "Apollo"));
        target.priority = Priority::High;
        EditForm::new(
            &target,
            &[
                state("todo", "Todo", StateType::Unstarted, 1.0),
                state("doing", "Doing", StateType::Started, 2.0),
            ],
            &[project("p1", "Apollo")],
            &[user("u1", "Alex"), user("u2", "Dana")],
            80,
        )
    }

    #[test]
    fn edit_form_prefills_from_issue() {
        let form = edit_form();
        let input = form.input();
        assert_eq!(input.title.as_deref(), Some("Title of ABC-12"));
        assert_eq!(input.state_id.as_deref(), Some("todo"));
        assert_eq!(input.priority, Some(2));
        // untouched relations are left alone on the server
        assert_eq!(input.assignee_id, Patch::Keep);
        assert_eq!(input.project_id, Patch::Keep);
    }

    #[test]
    fn edit_form_can_clear_assignee_and_project() {
        let mut form = edit_form();
        for _ in 0..4 {
            form.handle_key(key(KeyCode::Tab));
        }
        assert_eq!(form.focused(), EditField::Assignee);
        form.handle_key(key(KeyCode::Left));
        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Left));

        let input = form.input();
        assert_eq!(input.assignee_id, Patch::Clear);
        assert_eq!(input.project_id, Patch::Clear);
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["assigneeId"], serde_json::Value::Null);
        assert_eq!(json["projectId"], serde_json::Value::Null);
    }

    #[test]
    fn edit_form_keeps_relations_missing_from_catalogs() {
        let mut target = issue("ABC-12");
        target.assignee = Some(user("u-gone", "Former Member"));
        target.project = Some(project("p-archived", "Old Project"));
        let mut form = EditForm::new(
            &target,
            &[state("todo", "Todo", StateType::Unstarted, 1.0)],
            &[project("p1", "Apollo")],
            &[user("u1", "Alex")],
            80,
        );
        type_text(&mut |k| form.handle_key(k), "!");

        let input = form.input();
        assert_eq!(input.title.as_deref(), Some("Title of ABC-12!"));
        assert_eq!(input.assignee_id, Patch::Keep);
        assert_eq!(input.project_id, Patch::Keep);
        let json = serde_json::to_value(&input).unwrap();
        let fields = json.as_object().unwrap();
        assert!(!fields.contains_key("assigneeId"));
        assert!(!fields.contains_key("projectId"));

        let rows = render_rows(100, 30, |f| {
            let area = f.area();
            form.render(f, area)
        });
        assert!(contains(&rows, "Former Member"));
        assert!(contains(&rows, "Old Project"));
    }

    #[test]
    fn edit_form_before_users_load_keeps_assignee() {
        let mut target = issue("ABC-12");
        target.assignee = Some(user("u1", "Alex"));
        let form = EditForm::new(&target, &[], &[], &[], 80);
        assert_eq!(form.input().assignee_id, Patch::Keep);
        assert_eq!(form.input().project_id, Patch::Keep);
    }

    #[test]
    fn edit_form_picker_selects_assignee() {
        let mut form = edit_form();
        for _ in 0..4 {
            form.handle_key(key(KeyCode::Tab));
        }
        form.handle_key(key(KeyCode::Enter));
        assert_eq!(form.picker().map(|p| p.title()), Some("Select Assignee"));

        // keys go to the picker while it is open
        type_text(&mut |k| form.handle_key(k), "dan");
        assert_eq!(form.focused(), EditField::Assignee);
        form.handle_key(key(KeyCode::Enter));
        assert!(form.picker().is_none());
        assert_eq!(form.input().assignee_id, Patch::Set("u2".to_string()));
    }

    #[test]
    fn edit_form_picker_escape_keeps_value() {
        let mut form = edit_form();
        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Tab));
        form.handle_key(key(KeyCode::Enter));
        assert_eq!(form.picker().map(|p| p.title()), Some("Select Status"));
        form.handle_key(key(KeyCode::Down));
        form.handle_key(key(KeyCode::Esc));
        assert!(form.picker().is_none());
        assert_eq!(form.input().state_id.as_deref(), Some("todo"));
        assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
    }

    #[test]
    fn edit_form_renders_fields() {
        let form = edit_form();
        let rows = render_rows(100, 30, |f| {
            let area = f.area();
            form.render(f, area)
        });
        assert!(contains(&rows, "Edit Issue: ABC-12"));
        assert!(contains(&rows, "Alex"));
        assert!(contains(&rows, "Apollo"));
    }
}
