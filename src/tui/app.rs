use super::command::Command;
use super::message::{Bootstrap, Message};
use super::views::form::{assignee_items, priority_items, project_items, state_items};
use super::views::{
    CreateForm, DetailView, EditForm, FormAction, HelpTab, KanbanAction, KanbanView, ListView,
    Nav, PickerAction, PickerItem, PickerView, SetupView,
};
use crate::config::Config;
use crate::data::{
    append_unique, board_states, filter_issues, match_project, patch_issue, sort_issues, Issue,
    IssueFilter, IssuePage, IssueUpdateInput, Label, PageInfo, Priority, Project, Tab, Team, User,
    Viewer, WorkflowState,
};
use crate::integrations::ai::DraftRequest;
use crate::tui::ui::icons::SPINNER_FRAMES;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use tracing::{debug, info};

/// Rows taken by the header, the tab bar and the status bar.
pub const CHROME_HEIGHT: u16 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Typing mode: keys edit the query.
    pub active: bool,
    pub query: String,
}

#[derive(Debug, Clone)]
pub enum View {
    List,
    Detail(DetailView),
    Create(CreateForm),
    Edit(EditForm),
    Kanban(KanbanView),
    Setup(SetupView),
}

/// Payload-free view tag, for dispatch and rendering decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    List,
    Detail,
    Create,
    Edit,
    Kanban,
    Setup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerKind {
    Status,
    Assignee,
    Priority,
    ProjectFilter,
}

#[derive(Debug, Clone)]
pub struct ActivePicker {
    pub kind: PickerKind,
    /// Issue the picker edits; `None` for the project filter.
    pub issue_id: Option<String>,
    pub picker: PickerView,
}

pub struct App {
    pub config: Config,
    pub view: View,
    pub list: ListView,

    // Overlays
    pub show_help: bool,
    pub help_tab: HelpTab,
    pub picker: Option<ActivePicker>,

    // UI state
    pub status: Option<StatusLine>,
    pub loading: bool,
    pub loading_more: bool,
    pub spinner_frame: usize,
    pub width: u16,
    pub height: u16,
    pub should_quit: bool,
    /// Open the create form once the catalogs are in (`lazyliner create`).
    pub pending_create: bool,

    // Catalogs, fetched once
    pub viewer: Option<Viewer>,
    pub teams: Vec<Team>,
    pub projects: Vec<Project>,
    pub users: Vec<User>,
    pub states: Vec<WorkflowState>,
    pub labels: Vec<Label>,

    // Listing
    pub tab: Tab,
    pub current_project: Option<Project>,
    pub filter_project: Option<Project>,
    pub current_issue: Option<Issue>,
    /// All loaded issues of the active tab, sorted.
    pub issues: Vec<Issue>,
    pub page_info: PageInfo,
    /// Bumped by every fresh list fetch; older responses are dropped.
    pub list_generation: u64,

    // Search
    pub search: SearchState,
    pub filtered: Option<Vec<Issue>>,
    /// Wider candidate set (project issues incl. completed) while searching.
    pub search_source: Option<Vec<Issue>>,
}

impl App {
    pub fn new(config: Config, config_path: Option<PathBuf>, width: u16, height: u16) -> Self {
        let view = if config.has_credential() {
            View::List
        } else {
            View::Setup(SetupView::new(config_path))
        };
        let tab = Tab::from_config(&config.defaults.view).unwrap_or(Tab::MyIssues);
        let list_height = height.saturating_sub(CHROME_HEIGHT);
        let show_ids = config.ui.show_ids;

        Self {
            config,
            view,
            list: ListView::new(Vec::new(), list_height, show_ids),
            show_help: false,
            help_tab: HelpTab::default(),
            picker: None,
            status: None,
            loading: false,
            loading_more: false,
            spinner_frame: 0,
            width,
            height,
            should_quit: false,
            pending_create: false,
            viewer: None,
            teams: Vec::new(),
            projects: Vec::new(),
            users: Vec::new(),
            states: Vec::new(),
            labels: Vec::new(),
            tab,
            current_project: None,
            filter_project: None,
            current_issue: None,
            issues: Vec::new(),
            page_info: PageInfo::default(),
            list_generation: 0,
            search: SearchState::default(),
            filtered: None,
            search_source: None,
        }
    }

    /// Commands to run at startup. Setup mode does no network work.
    pub fn init(&mut self) -> Vec<Command> {
        if self.view_kind() == ViewKind::Setup {
            return Vec::new();
        }
        self.loading = true;
        vec![Command::LoadBootstrap]
    }

    pub fn view_kind(&self) -> ViewKind {
        match self.view {
            View::List => ViewKind::List,
            View::Detail(_) => ViewKind::Detail,
            View::Create(_) => ViewKind::Create,
            View::Edit(_) => ViewKind::Edit,
            View::Kanban(_) => ViewKind::Kanban,
            View::Setup(_) => ViewKind::Setup,
        }
    }

    /// Whether keys are text input for a picker, the search bar or a form.
    pub fn captures_text(&self) -> bool {
        self.picker.is_some()
            || self.search.active
            || matches!(self.view, View::Create(_) | View::Edit(_))
    }

    pub fn kanban_move_mode(&self) -> bool {
        matches!(&self.view, View::Kanban(k) if k.in_move_mode())
    }

    pub fn tabs(&self) -> &'static [Tab] {
        Tab::available(self.current_project.is_some())
    }

    /// Issues shown by the list: the search result when filtering.
    pub fn displayed_issues(&self) -> &[Issue] {
        self.filtered.as_deref().unwrap_or(&self.issues)
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn content_height(&self) -> u16 {
        let search = u16::from(self.search.active || !self.search.query.is_empty());
        self.height.saturating_sub(CHROME_HEIGHT + search)
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Update
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one message. Returns the async work it asks for; never does I/O.
    pub fn update(&mut self, msg: Message) -> Vec<Command> {
        match msg {
            Message::None => Vec::new(),
            Message::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Message::Tick => {
                if self.loading || self.loading_more {
                    self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
                }
                Vec::new()
            }
            Message::Resize(width, height) => {
                self.width = width;
                self.height = height;
                self.resize_views();
                Vec::new()
            }
            Message::ToggleHelp => {
                self.show_help = !self.show_help;
                self.help_tab = HelpTab::Shortcuts;
                Vec::new()
            }
            Message::Key(key) => self.handle_key(key),
            Message::BootstrapLoaded(result) => self.on_bootstrap(result),
            Message::IssuesLoaded {
                generation,
                append,
                result,
            } => self.on_issues(generation, append, result),
            Message::ProjectIssuesLoaded { generation, result } => {
                self.on_project_issues(generation, result)
            }
            Message::StatesLoaded(result) => {
                match result {
                    Ok(states) => {
                        self.states = states;
                        let height = self.content_height();
                        if let View::Kanban(board) = &mut self.view {
                            *board = KanbanView::new(
                                &self.states,
                                self.filtered.as_deref().unwrap_or(&self.issues),
                                self.width,
                                height,
                            );
                        }
                    }
                    Err(e) => self.set_error(format!("Error loading workflow states: {}", e)),
                }
                Vec::new()
            }
            Message::LabelsLoaded(result) => {
                match result {
                    Ok(labels) => self.labels = labels,
                    Err(e) => self.set_error(format!("Error loading labels: {}", e)),
                }
                Vec::new()
            }
            Message::UsersLoaded(result) => {
                match result {
                    Ok(users) => {
                        self.users = users;
                        if self.pending_create {
                            self.pending_create = false;
                            self.open_create();
                        }
                    }
                    Err(e) => self.set_error(format!("Error loading users: {}", e)),
                }
                Vec::new()
            }
            Message::IssueCreated(result) => match result {
                Ok(issue) => {
                    info!(issue = %issue.identifier, "issue created");
                    self.set_status(format!("Issue created: {}", issue.identifier));
                    self.view = View::List;
                    vec![self.fetch_list()]
                }
                Err(e) => {
                    self.set_error(format!("Error creating issue: {}", e));
                    Vec::new()
                }
            },
            Message::IssueUpdated(result) => {
                match result {
                    Ok(issue) => self.on_issue_updated(issue),
                    Err(e) => self.set_error(format!("Error: {}", e)),
                }
                Vec::new()
            }
            Message::IssueDeleted(result) => match result {
                Ok(identifier) => {
                    self.set_status(format!("Issue deleted: {}", identifier));
                    self.issues.retain(|i| i.identifier != identifier);
                    self.view = View::List;
                    self.current_issue = None;
                    self.refresh_list();
                    vec![self.fetch_list()]
                }
                Err(e) => {
                    self.set_error(format!("Error deleting issue: {}", e));
                    Vec::new()
                }
            },
            Message::DraftGenerated(result) => {
                match result {
                    Ok((provider, draft)) => {
                        if let View::Create(form) = &mut self.view {
                            form.apply_draft(&draft, &self.labels);
                            self.set_status(format!("Draft generated by {}", provider));
                        }
                    }
                    Err(e) => self.set_error(format!("Error generating draft: {}", e)),
                }
                Vec::new()
            }
            Message::Status { text, is_error } => {
                self.status = Some(StatusLine { text, is_error });
                Vec::new()
            }
        }
    }

    fn on_bootstrap(&mut self, result: Result<Bootstrap, String>) -> Vec<Command> {
        let boot = match result {
            Ok(boot) => boot,
            Err(e) => {
                self.loading = false;
                self.set_error(format!("Error: {}", e));
                return Vec::new();
            }
        };

        self.viewer = Some(boot.viewer);
        self.teams = boot.teams;
        self.projects = boot.projects;

        let saved = &self.config.defaults.project;
        self.current_project = self
            .projects
            .iter()
            .find(|p| !saved.is_empty() && &p.id == saved)
            .or_else(|| {
                boot.repo_name
                    .as_deref()
                    .and_then(|repo| match_project(&self.projects, repo))
            })
            .cloned();

        if let Some(project) = &self.current_project {
            info!(project = %project.name, "matched project");
            self.tab = Tab::Project;
        } else if self.tab == Tab::Project {
            self.tab = Tab::MyIssues;
        }

        let mut commands = vec![self.fetch_list()];
        if let Some(team) = self.teams.first() {
            commands.push(Command::LoadStates {
                team_id: team.id.clone(),
            });
            commands.push(Command::LoadLabels {
                team_id: team.id.clone(),
            });
        }
        commands.push(Command::LoadUsers);
        commands
    }

    fn list_filter(&self, after: Option<String>) -> IssueFilter {
        IssueFilter::for_tab(
            self.tab,
            self.current_project.as_ref().map(|p| p.id.as_str()),
            self.filter_project.as_ref().map(|p| p.id.as_str()),
        )
        .with_cursor(after)
    }

    /// Start a fresh fetch of the active tab.
    fn fetch_list(&mut self) -> Command {
        self.list_generation += 1;
        self.loading = true;
        self.loading_more = false;
        debug!(generation = self.list_generation, tab = ?self.tab, "fetching issues");
        Command::LoadIssues {
            filter: self.list_filter(None),
            generation: self.list_generation,
            append: false,
        }
    }

    fn load_more(&mut self) -> Vec<Command> {
        if !self.page_info.has_next_page || self.loading_more || self.loading {
            return Vec::new();
        }
        self.loading_more = true;
        self.set_status("Loading more issues...");
        vec![Command::LoadIssues {
            filter: self.list_filter(self.page_info.end_cursor.clone()),
            generation: self.list_generation,
            append: true,
        }]
    }

    fn on_issues(
        &mut self,
        generation: u64,
        append: bool,
        result: Result<IssuePage, String>,
    ) -> Vec<Command> {
        if generation != self.list_generation {
            debug!(
                generation,
                current = self.list_generation,
                "discarding stale issue page"
            );
            return Vec::new();
        }
        if append {
            self.loading_more = false;
        } else {
            self.loading = false;
        }

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                self.set_error(format!("Error loading issues: {}", e));
                return Vec::new();
            }
        };

        let has_more = page.page_info.has_next_page;
        self.page_info = page.page_info;
        if append {
            let added = append_unique(&mut self.issues, page.issues);
            debug!(added, total = self.issues.len(), "appended issue page");
            self.set_status(format!("Loaded {} total issues", self.issues.len()));
        } else {
            self.issues = page.issues;
            sort_issues(&mut self.issues);
            if has_more {
                self.set_status(format!(
                    "Loaded {} issues (more available, press L)",
                    self.issues.len()
                ));
            }
        }
        self.refresh_list();
        Vec::new()
    }

    fn on_project_issues(
        &mut self,
        generation: u64,
        result: Result<IssuePage, String>,
    ) -> Vec<Command> {
        if generation != self.list_generation || !self.search.active {
            debug!(generation, "discarding project search source");
            return Vec::new();
        }
        match result {
            Ok(page) => {
                let mut source = page.issues;
                sort_issues(&mut source);
                self.search_source = Some(source);
                self.apply_search();
            }
            Err(e) => self.set_error(format!("Error loading project issues: {}", e)),
        }
        Vec::new()
    }

    fn on_issue_updated(&mut self, issue: Issue) {
        self.set_status("Issue updated");
        if !patch_issue(&mut self.issues, &issue) {
            debug!(issue = %issue.identifier, "updated issue not in list");
        }
        if let Some(filtered) = &mut self.filtered {
            patch_issue(filtered, &issue);
        }
        if let Some(source) = &mut self.search_source {
            patch_issue(source, &issue);
        }
        let shown = self.displayed_issues().to_vec();
        self.list.set_issues(shown);

        if self
            .current_issue
            .as_ref()
            .is_some_and(|current| current.id == issue.id)
        {
            self.current_issue = Some(issue.clone());
        }

        let edited = matches!(&self.view, View::Edit(form) if form.issue_id() == issue.id);
        if edited {
            self.open_detail(issue);
            return;
        }
        match &mut self.view {
            View::Detail(detail) if detail.issue().id == issue.id => detail.set_issue(issue),
            View::Kanban(board) => {
                board.set_issues(self.filtered.as_deref().unwrap_or(&self.issues))
            }
            _ => {}
        }
    }

    /// Push the displayed issues into the list (and the board when open).
    fn refresh_list(&mut self) {
        if !self.search.query.is_empty() {
            self.filtered = Some(self.search_results());
        }
        let shown = self.displayed_issues().to_vec();
        if let View::Kanban(board) = &mut self.view {
            board.set_issues(&shown);
        }
        self.list.set_issues(shown);
    }

    fn resize_views(&mut self) {
        let (width, height) = (self.width, self.content_height());
        self.list.resize(height);
        match &mut self.view {
            View::Detail(detail) => detail.resize(width, height),
            View::Create(form) => form.resize(width),
            View::Edit(form) => form.resize(width),
            View::Kanban(board) => board.resize(width, height),
            View::List | View::Setup(_) => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tabs
    // ─────────────────────────────────────────────────────────────────────────

    fn switch_tab(&mut self, tab: Tab) -> Vec<Command> {
        if tab == self.tab {
            return Vec::new();
        }
        self.tab = tab;
        self.clear_search();
        vec![self.fetch_list()]
    }

    fn cycle_tab(&mut self, delta: isize) -> Vec<Command> {
        let tabs = self.tabs();
        let current = tabs.iter().position(|t| *t == self.tab).unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(tabs.len() as isize) as usize;
        self.switch_tab(tabs[next])
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Search
    // ─────────────────────────────────────────────────────────────────────────

    fn start_search(&mut self) -> Vec<Command> {
        self.search.active = true;
        self.resize_views();
        match (&self.tab, &self.current_project) {
            (Tab::Project, Some(project)) => vec![Command::LoadProjectIssues {
                project_id: project.id.clone(),
                generation: self.list_generation,
            }],
            _ => Vec::new(),
        }
    }

    fn search_results(&self) -> Vec<Issue> {
        let source = self.search_source.as_deref().unwrap_or(&self.issues);
        let mut results = filter_issues(source, &self.search.query);
        sort_issues(&mut results);
        results
    }

    fn apply_search(&mut self) {
        self.filtered = if self.search.query.is_empty() {
            None
        } else {
            Some(self.search_results())
        };
        let shown = self.displayed_issues().to_vec();
        self.list.set_issues(shown);
    }

    fn clear_search(&mut self) {
        self.search = SearchState::default();
        self.filtered = None;
        self.search_source = None;
        self.resize_views();
        self.list.set_issues(self.issues.clone());
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Vec<Command> {
        match key.code {
            KeyCode::Esc => self.clear_search(),
            KeyCode::Enter => {
                self.search.active = false;
                self.search_source = None;
                self.resize_views();
            }
            KeyCode::Backspace => {
                self.search.query.pop();
                self.apply_search();
            }
            KeyCode::Up | KeyCode::Down => {
                if let Some(nav) = Nav::from_key(&key) {
                    self.list.handle_nav(nav);
                }
            }
            KeyCode::Char(c) => {
                self.search.query.push(c);
                self.apply_search();
            }
            _ => {}
        }
        Vec::new()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if self.show_help {
            match key.code {
                KeyCode::Char('1') => self.help_tab = HelpTab::Shortcuts,
                KeyCode::Char('2') => self.help_tab = HelpTab::Legend,
                _ => {}
            }
            return Vec::new();
        }
        if self.picker.is_some() {
            return self.handle_picker_key(key);
        }
        if self.search.active {
            return self.handle_search_key(key);
        }
        match self.view_kind() {
            ViewKind::List => self.handle_list_key(key),
            ViewKind::Detail => self.handle_detail_key(key),
            ViewKind::Create => self.handle_create_key(key),
            ViewKind::Edit => self.handle_edit_key(key),
            ViewKind::Kanban => self.handle_kanban_key(key),
            ViewKind::Setup => Vec::new(),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Vec<Command> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(nav) = Nav::from_key(&key) {
                self.list.handle_nav(nav);
            }
            return Vec::new();
        }
        let selected = self.list.selected().cloned();
        match key.code {
            KeyCode::Char('/') => self.start_search(),
            KeyCode::Enter => {
                if let Some(issue) = selected {
                    self.open_detail(issue);
                }
                Vec::new()
            }
            KeyCode::Char('c') => {
                self.open_create();
                Vec::new()
            }
            KeyCode::Tab => self.cycle_tab(1),
            KeyCode::BackTab => self.cycle_tab(-1),
            KeyCode::Char(c @ '1'..='5') => {
                let index = (c as u8 - b'1') as usize;
                match self.tabs().get(index) {
                    Some(&tab) => self.switch_tab(tab),
                    None => Vec::new(),
                }
            }
            KeyCode::Char('r') => vec![self.fetch_list()],
            KeyCode::Char('s') => {
                self.open_issue_picker(PickerKind::Status, selected);
                Vec::new()
            }
            KeyCode::Char('P') => {
                self.open_project_filter();
                Vec::new()
            }
            KeyCode::Char('b') => {
                self.open_kanban();
                Vec::new()
            }
            KeyCode::Char('L') => self.load_more(),
            KeyCode::Char('y' | 'o' | 'w' | 'd') => self.issue_action(key.code, selected),
            _ => {
                if let Some(nav) = Nav::from_key(&key) {
                    self.list.handle_nav(nav);
                }
                Vec::new()
            }
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let current = self.current_issue.clone();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            _ if ctrl => {
                if let (Some(nav), View::Detail(detail)) = (Nav::from_key(&key), &mut self.view) {
                    detail.handle_nav(nav);
                }
                Vec::new()
            }
            KeyCode::Esc | KeyCode::Char('q') => {
                self.view = View::List;
                Vec::new()
            }
            KeyCode::Char('s') => {
                self.open_issue_picker(PickerKind::Status, current);
                Vec::new()
            }
            KeyCode::Char('a') => {
                self.open_issue_picker(PickerKind::Assignee, current);
                Vec::new()
            }
            KeyCode::Char('p') => {
                self.open_issue_picker(PickerKind::Priority, current);
                Vec::new()
            }
            KeyCode::Char('e') => {
                self.open_edit();
                Vec::new()
            }
            KeyCode::Char('y' | 'o' | 'w' | 'd') => self.issue_action(key.code, current),
            _ => {
                if let (Some(nav), View::Detail(detail)) = (Nav::from_key(&key), &mut self.view) {
                    detail.handle_nav(nav);
                }
                Vec::new()
            }
        }
    }

    fn handle_create_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Create(form) = &mut self.view else {
            return Vec::new();
        };
        match form.handle_key(key) {
            FormAction::None => Vec::new(),
            FormAction::Cancel => {
                self.view = View::List;
                Vec::new()
            }
            FormAction::Submit(input) => vec![Command::CreateIssue(input)],
            FormAction::GenerateDraft { prompt } => {
                if prompt.is_empty() {
                    self.set_error("Type a short description in the title to generate a draft");
                    return Vec::new();
                }
                self.set_status("Generating draft...");
                vec![Command::GenerateDraft(DraftRequest {
                    prompt,
                    available_labels: self.labels.iter().map(|l| l.name.clone()).collect(),
                })]
            }
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Edit(form) = &mut self.view else {
            return Vec::new();
        };
        match form.handle_key(key) {
            FormAction::None | FormAction::GenerateDraft { .. } => Vec::new(),
            FormAction::Cancel => {
                match self.current_issue.clone() {
                    Some(issue) => self.open_detail(issue),
                    None => self.view = View::List,
                }
                Vec::new()
            }
            FormAction::Submit(input) => vec![Command::UpdateIssue {
                id: form.issue_id().to_string(),
                input,
            }],
        }
    }

    fn handle_kanban_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let View::Kanban(board) = &mut self.view else {
            return Vec::new();
        };
        if board.in_move_mode() {
            let action = board.handle_key(key);
            return self.kanban_action(action);
        }
        let selected = board.selected().cloned();
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return Vec::new();
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.view = View::List;
                Vec::new()
            }
            KeyCode::Enter => {
                if let Some(issue) = selected {
                    self.open_detail(issue);
                }
                Vec::new()
            }
            KeyCode::Char('c') => {
                self.open_create();
                Vec::new()
            }
            KeyCode::Char('r') => {
                self.view = View::List;
                vec![self.fetch_list()]
            }
            KeyCode::Char('y' | 'o' | 'w' | 'd') => self.issue_action(key.code, selected),
            _ => {
                let action = board.handle_key(key);
                self.kanban_action(action)
            }
        }
    }

    fn kanban_action(&mut self, action: KanbanAction) -> Vec<Command> {
        match action {
            KanbanAction::None => Vec::new(),
            KanbanAction::Move { issue_id, state_id } => vec![Command::UpdateIssue {
                id: issue_id,
                input: IssueUpdateInput::state(state_id),
            }],
        }
    }

    /// Copy branch (`y`), open (`o`), start a work task (`w`) or delete (`d`) an issue.
    fn issue_action(&mut self, code: KeyCode, issue: Option<Issue>) -> Vec<Command> {
        let Some(issue) = issue else {
            return Vec::new();
        };
        match code {
            KeyCode::Char('y') if issue.branch_name.is_empty() => {
                self.set_error(format!("{} has no branch name", issue.identifier));
                Vec::new()
            }
            KeyCode::Char('y') => vec![Command::CopyToClipboard {
                text: issue.branch_name,
                success: "Branch name copied".to_string(),
            }],
            KeyCode::Char('o') => vec![Command::OpenUrl(issue.url)],
            KeyCode::Char('w') => vec![Command::OpenWorkTask {
                identifier: issue.identifier,
            }],
            KeyCode::Char('d') => vec![Command::DeleteIssue {
                id: issue.id,
                identifier: issue.identifier,
            }],
            _ => Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // View transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn open_detail(&mut self, issue: Issue) {
        self.current_issue = Some(issue.clone());
        self.view = View::Detail(DetailView::new(issue, self.width, self.content_height()));
    }

    fn open_create(&mut self) {
        let mut form = CreateForm::new(&self.teams, &self.projects, &self.users, self.width);
        if self.tab == Tab::Project {
            if let Some(project) = &self.current_project {
                form.select_project(&project.id);
            }
        }
        self.view = View::Create(form);
    }

    fn open_edit(&mut self) {
        if let Some(issue) = &self.current_issue {
            let form = EditForm::new(
                issue,
                &board_states(&self.states),
                &self.projects,
                &self.users,
                self.width,
            );
            self.view = View::Edit(form);
        }
    }

    fn open_kanban(&mut self) {
        let board = KanbanView::new(
            &self.states,
            self.displayed_issues(),
            self.width,
            self.content_height(),
        );
        self.view = View::Kanban(board);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pickers
    // ─────────────────────────────────────────────────────────────────────────

    fn open_issue_picker(&mut self, kind: PickerKind, issue: Option<Issue>) {
        let Some(issue) = issue else {
            return;
        };
        let picker = match kind {
            PickerKind::Status => {
                if self.states.is_empty() {
                    self.set_error("Workflow states not loaded yet");
                    return;
                }
                PickerView::new("Change Status", state_items(&board_states(&self.states)))
            }
            PickerKind::Assignee => PickerView::new("Change Assignee", assignee_items(&self.users)),
            PickerKind::Priority => PickerView::new("Change Priority", priority_items()),
            PickerKind::ProjectFilter => return,
        };
        self.picker = Some(ActivePicker {
            kind,
            issue_id: Some(issue.id),
            picker,
        });
    }

    fn open_project_filter(&mut self) {
        self.picker = Some(ActivePicker {
            kind: PickerKind::ProjectFilter,
            issue_id: None,
            picker: PickerView::new(
                "Filter by Project",
                project_items(&self.projects, "All Projects"),
            ),
        });
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Vec<Command> {
        let action = match self.picker.as_mut() {
            Some(active) => active.picker.handle_key(key),
            None => return Vec::new(),
        };
        match action {
            PickerAction::None => Vec::new(),
            PickerAction::Cancel => {
                self.picker = None;
                Vec::new()
            }
            PickerAction::Select(item) => match self.picker.take() {
                Some(active) => self.apply_pick(active.kind, active.issue_id, item),
                None => Vec::new(),
            },
        }
    }

    fn apply_pick(
        &mut self,
        kind: PickerKind,
        issue_id: Option<String>,
        item: PickerItem,
    ) -> Vec<Command> {
        let input = match kind {
            PickerKind::ProjectFilter => {
                if item.id.is_empty() {
                    self.filter_project = None;
                    self.set_status("Showing all projects");
                } else {
                    self.filter_project = self.projects.iter().find(|p| p.id == item.id).cloned();
                    self.set_status(format!("Filtering by: {}", item.label));
                }
                self.clear_search();
                return vec![self.fetch_list()];
            }
            PickerKind::Status => IssueUpdateInput::state(item.id),
            PickerKind::Assignee => {
                IssueUpdateInput::assignee((!item.id.is_empty()).then_some(item.id))
            }
            PickerKind::Priority => match item.id.parse::<i64>() {
                Ok(value) => IssueUpdateInput::priority(Priority::from_int(value)),
                Err(_) => return Vec::new(),
            },
        };
        match issue_id {
            Some(id) => vec![Command::UpdateIssue { id, input }],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{issue, project, state, team, user};
    use crate::data::{Patch, StateType};
    use crate::integrations::ai::Draft;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> Message {
        Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ch(c: char) -> Message {
        key(KeyCode::Char(c))
    }

    fn app() -> App {
        let mut config = Config::default();
        config.linear.api_key = "lin_api_test".to_string();
        App::new(config, None, 100, 30)
    }

    fn page(issues: Vec<Issue>, more: bool) -> IssuePage {
        IssuePage {
            issues,
            page_info: PageInfo {
                has_next_page: more,
                end_cursor: more.then(|| "cursor-1".to_string()),
            },
        }
    }

    fn loaded(issues: Vec<Issue>) -> App {
        let mut app = app();
        let generation = match app.fetch_list() {
            Command::LoadIssues { generation, .. } => generation,
            other => panic!("unexpected {:?}", other),
        };
        app.update(Message::IssuesLoaded {
            generation,
            append: false,
            result: Ok(page(issues, false)),
        });
        app
    }

    fn status(app: &App) -> &str {
        app.status.as_ref().map(|s| s.text.as_str()).unwrap_or("")
    }

    #[test]
    fn setup_mode_without_credential_does_no_work() {
        let mut app = App::new(Config::default(), None, 100, 30);
        assert_eq!(app.view_kind(), ViewKind::Setup);
        assert!(app.init().is_empty());
        assert!(app.update(ch('r')).is_empty());
    }

    #[test]
    fn bootstrap_matches_repo_and_fetches_catalogs() {
        let mut app = app();
        assert_eq!(app.init(), vec![Command::LoadBootstrap]);
        let commands = app.update(Message::BootstrapLoaded(Ok(Bootstrap {
            viewer: Viewer {
                id: "me".to_string(),
                name: "Me".to_string(),
                display_name: "me".to_string(),
                email: "me@example.com".to_string(),
            },
            teams: vec![team("t1", "Engineering", "ENG")],
            projects: vec![project("p1", "Apollo")],
            repo_name: Some("apollo-web".to_string()),
        })));

        assert_eq!(app.tab, Tab::Project);
        assert_eq!(app.tabs()[0], Tab::Project);
        assert_eq!(commands.len(), 4);
        assert!(matches!(
            &commands[0],
            Command::LoadIssues { filter, append: false, .. }
                if filter.project_id.as_deref() == Some("p1") && filter.exclude_closed
        ));
        assert_eq!(
            commands[1],
            Command::LoadStates {
                team_id: "t1".to_string()
            }
        );
        assert_eq!(commands[3], Command::LoadUsers);
    }

    #[test]
    fn bootstrap_failure_sets_error_status() {
        let mut app = app();
        app.init();
        app.update(Message::BootstrapLoaded(Err("boom".to_string())));
        assert!(!app.loading);
        assert_eq!(status(&app), "Error: boom");
        assert!(app.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn pagination_dedupes_and_reports_totals() {
        let mut app = app();
        let generation = match app.fetch_list() {
            Command::LoadIssues { generation, .. } => generation,
            other => panic!("unexpected {:?}", other),
        };
        app.update(Message::IssuesLoaded {
            generation,
            append: false,
            result: Ok(page(vec![issue("A-1"), issue("A-2"), issue("A-3")], true)),
        });
        assert_eq!(status(&app), "Loaded 3 issues (more available, press L)");

        let commands = app.update(ch('L'));
        assert!(matches!(
            &commands[..],
            [Command::LoadIssues { append: true, filter, .. }]
                if filter.after.as_deref() == Some("cursor-1")
        ));
        assert!(app.loading_more);
        // a second L while the first is in flight is ignored
        assert!(app.update(ch('L')).is_empty());

        app.update(Message::IssuesLoaded {
            generation,
            append: true,
            result: Ok(page(vec![issue("A-3"), issue("A-4")], false)),
        });
        assert_eq!(app.issues.len(), 4);
        assert_eq!(app.list.len(), 4);
        assert_eq!(status(&app), "Loaded 4 total issues");
        assert!(!app.loading_more);
        assert!(app.update(ch('L')).is_empty());
    }

    #[test]
    fn stale_generation_is_discarded() {
        let mut app = loaded(vec![issue("A-1")]);
        let stale = app.list_generation;
        app.update(Message::Key(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE)));
        assert!(app.loading);
        app.update(Message::IssuesLoaded {
            generation: stale,
            append: false,
            result: Ok(page(vec![issue("B-1"), issue("B-2")], false)),
        });
        assert!(app.loading);
        assert_eq!(app.issues.len(), 1);
    }

    #[test]
    fn failed_fetch_keeps_previous_list() {
        let mut app = loaded(vec![issue("A-1"), issue("A-2")]);
        let commands = app.update(ch('r'));
        let Command::LoadIssues { generation, .. } = commands[0].clone() else {
            panic!("expected fetch");
        };
        app.update(Message::IssuesLoaded {
            generation,
            append: false,
            result: Err("timeout".to_string()),
        });
        assert!(!app.loading);
        assert_eq!(app.issues.len(), 2);
        assert_eq!(status(&app), "Error loading issues: timeout");
    }

    #[test]
    fn tab_keys_switch_and_clear_search() {
        let mut app = loaded(vec![issue("A-1")]);
        app.update(ch('/'));
        app.update(ch('a'));
        app.update(key(KeyCode::Enter));
        assert_eq!(app.search.query, "a");

        let commands = app.update(ch('3'));
        assert_eq!(app.tab, Tab::Active);
        assert_eq!(commands.len(), 1);
        assert_eq!(app.search, SearchState::default());
        assert!(app.filtered.is_none());

        assert!(app.update(ch('3')).is_empty());
        assert!(app.update(ch('5')).is_empty());
        app.update(Message::Key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert_eq!(app.tab, Tab::AllIssues);
    }

    #[test]
    fn search_round_trip_restores_full_list() {
        let mut a = issue("ABC-12");
        a.title = "Fix login".to_string();
        let mut b = issue("ABC-13");
        b.title = "Dark mode".to_string();
        let mut app = loaded(vec![a, b]);

        app.update(ch('/'));
        for c in "abc-12".chars() {
            app.update(ch(c));
        }
        let shown: Vec<&str> = app.list.issues().iter().map(|i| i.identifier.as_str()).collect();
        assert_eq!(shown, vec!["ABC-12"]);

        app.update(key(KeyCode::Esc));
        assert_eq!(app.list.len(), 2);
        assert!(!app.search.active);
        assert!(app.filtered.is_none());
    }

    #[test]
    fn project_tab_search_uses_project_source() {
        let mut app = app();
        app.current_project = Some(project("p1", "Apollo"));
        app.tab = Tab::Project;
        let commands = app.update(ch('/'));
        assert_eq!(
            commands,
            vec![Command::LoadProjectIssues {
                project_id: "p1".to_string(),
                generation: app.list_generation,
            }]
        );
        let mut done = issue("A-9");
        done.title = "Old login work".to_string();
        app.update(Message::ProjectIssuesLoaded {
            generation: app.list_generation,
            result: Ok(page(vec![done], false)),
        });
        for c in "login".chars() {
            app.update(ch(c));
        }
        assert_eq!(app.list.len(), 1);
    }

    #[test]
    fn assignee_picker_patches_detail_in_place() {
        let mut app = loaded(vec![issue("ABC-12"), issue("ABC-13")]);
        app.users = vec![user("u1", "Alex"), user("u2", "Dana")];
        let target = app
            .issues
            .iter()
            .find(|i| i.identifier == "ABC-12")
            .cloned()
            .unwrap();
        app.open_detail(target);

        app.update(ch('a'));
        assert!(app.picker.is_some());
        for c in "dana".chars() {
            app.update(ch(c));
        }
        let commands = app.update(key(KeyCode::Enter));
        assert!(app.picker.is_none());
        let [Command::UpdateIssue { id, input }] = &commands[..] else {
            panic!("expected update, got {:?}", commands);
        };
        assert_eq!(id, "abc-12");
        assert_eq!(input.assignee_id, Patch::Set("u2".to_string()));

        let mut updated = issue("ABC-12");
        updated.assignee = Some(user("u2", "Dana"));
        app.update(Message::IssueUpdated(Ok(updated)));

        assert_eq!(status(&app), "Issue updated");
        let View::Detail(detail) = &app.view else {
            panic!("expected detail view");
        };
        assert_eq!(detail.issue().assignee_name(), "Dana");
        let listed = app.issues.iter().find(|i| i.id == "abc-12").unwrap();
        assert_eq!(listed.assignee_name(), "Dana");
    }

    #[test]
    fn unassigned_pick_clears_assignee() {
        let mut app = loaded(vec![issue("A-1")]);
        app.users = vec![user("u1", "Alex")];
        app.update(key(KeyCode::Enter));
        app.update(ch('a'));
        let commands = app.update(key(KeyCode::Enter));
        assert!(matches!(
            &commands[..],
            [Command::UpdateIssue { input, .. }] if input.assignee_id == Patch::Clear
        ));
    }

    #[test]
    fn update_for_unknown_issue_is_a_noop_on_the_list() {
        let mut app = loaded(vec![issue("A-1"), issue("A-2")]);
        let before = app.issues.clone();
        app.update(Message::IssueUpdated(Ok(issue("Z-9"))));
        assert_eq!(app.issues, before);
    }

    #[test]
    fn failed_update_keeps_record() {
        let mut app = loaded(vec![issue("A-1")]);
        let before = app.issues.clone();
        app.update(Message::IssueUpdated(Err("forbidden".to_string())));
        assert_eq!(app.issues, before);
        assert_eq!(status(&app), "Error: forbidden");
    }

    #[test]
    fn kanban_move_issues_state_update() {
        let mut app = loaded(vec![issue("A-1")]);
        app.states = vec![
            state("todo", "Todo", StateType::Unstarted, 1.0),
            state("doing", "Doing", StateType::Started, 1.0),
        ];
        app.update(ch('b'));
        assert_eq!(app.view_kind(), ViewKind::Kanban);
        // Doing is first; the issue sits in Todo
        app.update(ch('l'));
        app.update(ch('m'));
        assert!(app.kanban_move_mode());
        // esc leaves move mode but stays on the board
        app.update(key(KeyCode::Esc));
        assert_eq!(app.view_kind(), ViewKind::Kanban);

        let commands = app.update(ch('H'));
        assert_eq!(
            commands,
            vec![Command::UpdateIssue {
                id: "a-1".to_string(),
                input: IssueUpdateInput::state("doing"),
            }]
        );
        app.update(ch('q'));
        assert_eq!(app.view_kind(), ViewKind::List);
    }

    #[test]
    fn create_flow_and_draft() {
        let mut app = loaded(vec![]);
        app.teams = vec![team("t1", "Engineering", "ENG")];
        app.update(ch('c'));
        assert_eq!(app.view_kind(), ViewKind::Create);

        let ctrl_g = Message::Key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::CONTROL));
        assert!(app.update(ctrl_g.clone()).is_empty());
        assert!(app.status.as_ref().unwrap().is_error);

        for c in "login bug".chars() {
            app.update(ch(c));
        }
        let commands = app.update(ctrl_g);
        assert!(matches!(
            &commands[..],
            [Command::GenerateDraft(request)] if request.prompt == "login bug"
        ));

        app.update(Message::DraftGenerated(Ok((
            "ollama".to_string(),
            Draft {
                title: "Fix login bug".to_string(),
                ..Draft::default()
            },
        ))));
        assert_eq!(status(&app), "Draft generated by ollama");

        let ctrl_s = Message::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let commands = app.update(ctrl_s);
        assert!(matches!(
            &commands[..],
            [Command::CreateIssue(input)] if input.title == "Fix login bug" && input.team_id == "t1"
        ));

        let commands = app.update(Message::IssueCreated(Ok(issue("ENG-7"))));
        assert_eq!(status(&app), "Issue created: ENG-7");
        assert_eq!(app.view_kind(), ViewKind::List);
        assert!(matches!(&commands[..], [Command::LoadIssues { .. }]));
    }

    #[test]
    fn edit_success_returns_to_detail() {
        let mut app = loaded(vec![issue("A-1")]);
        app.update(key(KeyCode::Enter));
        app.update(ch('e'));
        assert_eq!(app.view_kind(), ViewKind::Edit);
        let ctrl_s = Message::Key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        let commands = app.update(ctrl_s);
        assert!(matches!(&commands[..], [Command::UpdateIssue { id, .. }] if id == "a-1"));

        let mut updated = issue("A-1");
        updated.title = "Renamed".to_string();
        app.update(Message::IssueUpdated(Ok(updated)));
        let View::Detail(detail) = &app.view else {
            panic!("expected detail");
        };
        assert_eq!(detail.issue().title, "Renamed");
    }

    #[test]
    fn delete_returns_to_list_and_refetches() {
        let mut app = loaded(vec![issue("A-1"), issue("A-2")]);
        app.update(key(KeyCode::Enter));
        let commands = app.update(ch('d'));
        assert_eq!(
            commands,
            vec![Command::DeleteIssue {
                id: "a-1".to_string(),
                identifier: "A-1".to_string()
            }]
        );
        let commands = app.update(Message::IssueDeleted(Ok("A-1".to_string())));
        assert_eq!(status(&app), "Issue deleted: A-1");
        assert_eq!(app.view_kind(), ViewKind::List);
        assert_eq!(app.list.len(), 1);
        assert_eq!(commands.len(), 1);
    }

    #[test]
    fn project_filter_picker_refetches() {
        let mut app = loaded(vec![issue("A-1")]);
        app.projects = vec![project("p1", "Apollo")];
        app.update(ch('P'));
        app.update(key(KeyCode::Down));
        let commands = app.update(key(KeyCode::Enter));
        assert_eq!(status(&app), "Filtering by: Apollo");
        assert!(matches!(
            &commands[..],
            [Command::LoadIssues { filter, .. }] if filter.project_id.as_deref() == Some("p1")
        ));

        app.update(ch('P'));
        app.update(key(KeyCode::Enter));
        assert_eq!(status(&app), "Showing all projects");
        assert!(app.filter_project.is_none());
    }

    #[test]
    fn help_toggle_and_tabs() {
        let mut app = loaded(vec![issue("A-1")]);
        app.update(Message::ToggleHelp);
        assert!(app.show_help);
        app.update(ch('2'));
        assert_eq!(app.help_tab, HelpTab::Legend);
        // keys under the overlay do not reach the list
        assert!(app.update(ch('r')).is_empty());
        app.update(Message::ToggleHelp);
        assert!(!app.show_help);
    }

    #[test]
    fn copy_and_open_commands() {
        let mut app = loaded(vec![issue("A-1")]);
        assert_eq!(
            app.update(ch('y')),
            vec![Command::CopyToClipboard {
                text: "feature/a-1".to_string(),
                success: "Branch name copied".to_string(),
            }]
        );
        assert_eq!(
            app.update(ch('o')),
            vec![Command::OpenUrl(
                "https://linear.app/acme/issue/A-1".to_string()
            )]
        );
        assert_eq!(
            app.update(ch('w')),
            vec![Command::OpenWorkTask {
                identifier: "A-1".to_string()
            }]
        );

        app.update(key(KeyCode::Enter));
        assert_eq!(app.view_kind(), ViewKind::Detail);
        assert_eq!(
            app.update(ch('w')),
            vec![Command::OpenWorkTask {
                identifier: "A-1".to_string()
            }]
        );
    }

    #[test]
    fn board_rebuilt_on_states_leaves_room_for_search_bar() {
        let mut app = loaded(vec![issue("ABC-1"), issue("ABC-2")]);
        app.update(ch('/'));
        for c in "abc".chars() {
            app.update(ch(c));
        }
        app.update(key(KeyCode::Enter));
        app.update(ch('b'));
        assert_eq!(app.view_kind(), ViewKind::Kanban);

        app.update(Message::StatesLoaded(Ok(vec![state(
            "todo",
            "Todo",
            StateType::Unstarted,
            1.0,
        )])));
        let View::Kanban(board) = &app.view else {
            panic!("expected kanban view");
        };
        assert_eq!(board.height(), app.content_height());
        assert_eq!(board.height(), 30 - CHROME_HEIGHT - 1);
    }

    #[test]
    fn tick_advances_spinner_only_while_loading() {
        let mut app = app();
        app.update(Message::Tick);
        assert_eq!(app.spinner_frame, 0);
        app.loading = true;
        app.update(Message::Tick);
        assert_eq!(app.spinner_frame, 1);
    }
}
