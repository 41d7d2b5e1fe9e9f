//! Typed client for the Linear GraphQL API.
//!
//! Responses are decoded into private `*Node` structs mirroring the wire
//! shape, then converted into the domain types in [`crate::data`].

use crate::data::{
    Issue, IssueCreateInput, IssueFilter, IssuePage, IssueUpdateInput, Label, PageInfo,
    Priority, Project, StateType, Team, User, Viewer, WorkflowState,
};
use crate::integrations::error::{ApiError, Result};
use crate::integrations::HTTP_CLIENT;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

const LINEAR_API_URL: &str = "https://api.linear.app/graphql";

const ISSUE_FIELDS: &str = r#"
    fragment IssueFields on Issue {
        id
        identifier
        title
        description
        priority
        estimate
        createdAt
        updatedAt
        dueDate
        branchName
        url
        state { id name color type position }
        assignee { id name displayName email active }
        creator { id name displayName email active }
        team { id name key color icon }
        project { id name icon color state progress url }
        labels { nodes { id name color } }
    }
"#;

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PagedConnection<T> {
    nodes: Vec<T>,
    page_info: PageInfoNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfoNode {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueNode {
    id: String,
    identifier: String,
    title: String,
    description: Option<String>,
    priority: Option<f64>,
    estimate: Option<f64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    due_date: Option<String>,
    branch_name: Option<String>,
    url: String,
    state: Option<StateNode>,
    assignee: Option<UserNode>,
    creator: Option<UserNode>,
    team: Option<TeamNode>,
    project: Option<ProjectNode>,
    labels: Option<Connection<LabelNode>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateNode {
    id: String,
    name: String,
    color: Option<String>,
    #[serde(rename = "type")]
    state_type: String,
    position: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserNode {
    id: String,
    name: String,
    display_name: Option<String>,
    email: Option<String>,
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TeamNode {
    id: String,
    name: String,
    key: Option<String>,
    color: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectNode {
    id: String,
    name: String,
    icon: Option<String>,
    color: Option<String>,
    state: Option<String>,
    progress: Option<f64>,
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LabelNode {
    id: String,
    name: String,
    color: Option<String>,
}

impl From<StateNode> for WorkflowState {
    fn from(node: StateNode) -> Self {
        WorkflowState {
            id: node.id,
            name: node.name,
            color: node.color.unwrap_or_else(|| "#888888".to_string()),
            state_type: StateType::from_api(&node.state_type),
            position: node.position.unwrap_or_default(),
        }
    }
}

impl From<UserNode> for User {
    fn from(node: UserNode) -> Self {
        User {
            display_name: node.display_name.unwrap_or_else(|| node.name.clone()),
            id: node.id,
            name: node.name,
            email: node.email.unwrap_or_default(),
            active: node.active.unwrap_or(true),
        }
    }
}

impl From<UserNode> for Viewer {
    fn from(node: UserNode) -> Self {
        Viewer {
            display_name: node.display_name.unwrap_or_else(|| node.name.clone()),
            id: node.id,
            name: node.name,
            email: node.email.unwrap_or_default(),
        }
    }
}

impl From<TeamNode> for Team {
    fn from(node: TeamNode) -> Self {
        Team {
            id: node.id,
            name: node.name,
            key: node.key.unwrap_or_default(),
            color: node.color,
            icon: node.icon,
        }
    }
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Project {
            id: node.id,
            name: node.name,
            icon: node.icon,
            color: node.color,
            state: node.state,
            progress: node.progress.unwrap_or_default(),
            url: node.url,
        }
    }
}

impl From<LabelNode> for Label {
    fn from(node: LabelNode) -> Self {
        Label {
            id: node.id,
            name: node.name,
            color: node.color,
        }
    }
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Self {
        Issue {
            id: node.id,
            identifier: node.identifier,
            title: node.title,
            description: node.description.unwrap_or_default(),
            priority: Priority::from_int(node.priority.unwrap_or_default() as i64),
            estimate: node.estimate,
            created_at: node.created_at,
            updated_at: node.updated_at,
            due_date: node.due_date,
            branch_name: node.branch_name.unwrap_or_default(),
            url: node.url,
            state: node.state.map(Into::into),
            assignee: node.assignee.map(Into::into),
            creator: node.creator.map(Into::into),
            team: node.team.map(Into::into),
            project: node.project.map(Into::into),
            labels: node
                .labels
                .map(|l| l.nodes.into_iter().map(Into::into).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<PagedConnection<IssueNode>> for IssuePage {
    fn from(conn: PagedConnection<IssueNode>) -> Self {
        IssuePage {
            issues: conn.nodes.into_iter().map(Into::into).collect(),
            page_info: PageInfo {
                has_next_page: conn.page_info.has_next_page,
                end_cursor: conn.page_info.end_cursor,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response envelopes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ViewerData {
    viewer: UserNode,
}

#[derive(Debug, Deserialize)]
struct TeamsData {
    teams: Connection<TeamNode>,
}

#[derive(Debug, Deserialize)]
struct ProjectsData {
    projects: Connection<ProjectNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatesData {
    workflow_states: Connection<StateNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelsData {
    issue_labels: Connection<LabelNode>,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    users: Connection<UserNode>,
}

#[derive(Debug, Deserialize)]
struct AssignedIssuesData {
    viewer: AssignedIssues,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignedIssues {
    assigned_issues: PagedConnection<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssuesData {
    issues: PagedConnection<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssueData {
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
struct IssuePayload {
    success: bool,
    issue: Option<IssueNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateData {
    issue_create: IssuePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateData {
    issue_update: IssuePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteData {
    issue_delete: DeletePayload,
}

#[derive(Debug, Deserialize)]
struct DeletePayload {
    success: bool,
}

impl IssuePayload {
    fn into_issue(self) -> Result<Issue> {
        match (self.success, self.issue) {
            (true, Some(node)) => Ok(node.into()),
            _ => Err(ApiError::EmptyResponse),
        }
    }
}

/// Translate an [`IssueFilter`] into Linear's `IssueFilter` input object.
///
/// `mine` is not part of the server filter; it selects the query instead.
pub fn build_filter(filter: &IssueFilter) -> Value {
    let mut f = serde_json::Map::new();

    if let Some(team_id) = &filter.team_id {
        f.insert("team".into(), json!({ "id": { "eq": team_id } }));
    }
    if let Some(project_id) = &filter.project_id {
        f.insert("project".into(), json!({ "id": { "eq": project_id } }));
    }
    if let Some(assignee_id) = &filter.assignee_id {
        f.insert("assignee".into(), json!({ "id": { "eq": assignee_id } }));
    }
    match (filter.state_type, filter.exclude_closed) {
        (Some(state_type), _) => {
            f.insert("state".into(), json!({ "type": { "eq": state_type.as_str() } }));
        }
        (None, true) => {
            f.insert(
                "state".into(),
                json!({ "type": { "nin": ["completed", "canceled"] } }),
            );
        }
        (None, false) => {}
    }
    if let Some(query) = filter.query.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        f.insert(
            "or".into(),
            json!([
                { "title": { "containsIgnoreCase": query } },
                { "description": { "containsIgnoreCase": query } }
            ]),
        );
    }

    Value::Object(f)
}

/// Linear API client. Cheap to clone; every clone shares the pooled HTTP client.
#[derive(Clone)]
pub struct LinearClient {
    api_key: String,
}

impl std::fmt::Debug for LinearClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearClient").finish_non_exhaustive()
    }
}

impl LinearClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingCredential);
        }
        Ok(Self { api_key })
    }

    async fn query<T: DeserializeOwned>(&self, query: &str, variables: Option<Value>) -> Result<T> {
        let request = GraphQLRequest { query, variables };

        let response = HTTP_CLIENT
            .post(LINEAR_API_URL)
            .header("Authorization", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GraphQLResponse<T> = serde_json::from_str(&body)?;
        if let Some(errors) = parsed.errors.filter(|e| !e.is_empty()) {
            return Err(ApiError::GraphQl {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        parsed.data.ok_or(ApiError::EmptyResponse)
    }

    pub async fn viewer(&self) -> Result<Viewer> {
        let query = "query Viewer { viewer { id name displayName email } }";
        let data: ViewerData = self.query(query, None).await?;
        Ok(data.viewer.into())
    }

    pub async fn teams(&self) -> Result<Vec<Team>> {
        let query = "query Teams { teams { nodes { id name key color icon } } }";
        let data: TeamsData = self.query(query, None).await?;
        Ok(data.teams.nodes.into_iter().map(Into::into).collect())
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        let query = r#"
            query Projects {
                projects(first: 100) {
                    nodes { id name icon color state progress url }
                }
            }
        "#;
        let data: ProjectsData = self.query(query, None).await?;
        Ok(data.projects.nodes.into_iter().map(Into::into).collect())
    }

    /// Viewer, teams and projects, fetched concurrently.
    pub async fn bootstrap(&self) -> Result<(Viewer, Vec<Team>, Vec<Project>)> {
        futures::try_join!(self.viewer(), self.teams(), self.projects())
    }

    pub async fn workflow_states(&self, team_id: &str) -> Result<Vec<WorkflowState>> {
        let query = r#"
            query WorkflowStates($teamId: ID!) {
                workflowStates(filter: { team: { id: { eq: $teamId } } }) {
                    nodes { id name color type position }
                }
            }
        "#;
        let data: StatesData = self
            .query(query, Some(json!({ "teamId": team_id })))
            .await?;
        Ok(data
            .workflow_states
            .nodes
            .into_iter()
            .map(Into::into)
            .collect())
    }

    pub async fn labels(&self, team_id: &str) -> Result<Vec<Label>> {
        let query = r#"
            query Labels($teamId: ID!) {
                issueLabels(filter: { team: { id: { eq: $teamId } } }) {
                    nodes { id name color }
                }
            }
        "#;
        let data: LabelsData = self
            .query(query, Some(json!({ "teamId": team_id })))
            .await?;
        Ok(data.issue_labels.nodes.into_iter().map(Into::into).collect())
    }

    /// Workspace members, deactivated ones included so existing assignees resolve.
    pub async fn users(&self) -> Result<Vec<User>> {
        let query = r#"
            query Users {
                users {
                    nodes { id name displayName email active }
                }
            }
        "#;
        let data: UsersData = self.query(query, None).await?;
        Ok(data.users.nodes.into_iter().map(Into::into).collect())
    }

    pub async fn my_issues(&self, first: usize, after: Option<&str>) -> Result<IssuePage> {
        let query = format!(
            r#"
            query MyIssues($first: Int!, $after: String) {{
                viewer {{
                    assignedIssues(first: $first, after: $after, orderBy: updatedAt) {{
                        nodes {{ ...IssueFields }}
                        pageInfo {{ hasNextPage endCursor }}
                    }}
                }}
            }}
            {ISSUE_FIELDS}"#
        );
        let data: AssignedIssuesData = self
            .query(&query, Some(json!({ "first": first, "after": after })))
            .await?;
        Ok(data.viewer.assigned_issues.into())
    }

    pub async fn issues(&self, filter: &IssueFilter) -> Result<IssuePage> {
        let query = format!(
            r#"
            query Issues($first: Int!, $after: String, $filter: IssueFilter) {{
                issues(first: $first, after: $after, filter: $filter, orderBy: updatedAt) {{
                    nodes {{ ...IssueFields }}
                    pageInfo {{ hasNextPage endCursor }}
                }}
            }}
            {ISSUE_FIELDS}"#
        );
        let variables = json!({
            "first": filter.first,
            "after": filter.after,
            "filter": build_filter(filter),
        });
        let data: IssuesData = self.query(&query, Some(variables)).await?;
        Ok(data.issues.into())
    }

    /// Issues of one project; completed and canceled ones only when asked for.
    pub async fn project_issues(
        &self,
        project_id: &str,
        first: usize,
        include_completed: bool,
        after: Option<String>,
    ) -> Result<IssuePage> {
        let filter = IssueFilter {
            project_id: Some(project_id.to_string()),
            exclude_closed: !include_completed,
            first,
            after,
            ..IssueFilter::default()
        };
        self.issues(&filter).await
    }

    /// Run a listing, choosing the viewer's assigned issues when `filter.mine` is set.
    ///
    /// Assigned issues are narrowed to the filter's project on the client.
    pub async fn fetch_issues(&self, filter: &IssueFilter) -> Result<IssuePage> {
        if !filter.mine {
            return self.issues(filter).await;
        }
        let mut page = self.my_issues(filter.first, filter.after.as_deref()).await?;
        if let Some(project_id) = &filter.project_id {
            page.issues
                .retain(|i| i.project.as_ref().is_some_and(|p| &p.id == project_id));
        }
        Ok(page)
    }

    /// Fetch one issue by id or identifier (e.g. "ENG-123").
    pub async fn issue(&self, id: &str) -> Result<Issue> {
        let query = format!(
            r#"
            query Issue($id: String!) {{
                issue(id: $id) {{ ...IssueFields }}
            }}
            {ISSUE_FIELDS}"#
        );
        let data: IssueData = self.query(&query, Some(json!({ "id": id }))).await?;
        data.issue
            .map(Into::into)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))
    }

    pub async fn create_issue(&self, input: &IssueCreateInput) -> Result<Issue> {
        let query = format!(
            r#"
            mutation CreateIssue($input: IssueCreateInput!) {{
                issueCreate(input: $input) {{
                    success
                    issue {{ ...IssueFields }}
                }}
            }}
            {ISSUE_FIELDS}"#
        );
        let data: CreateData = self
            .query(&query, Some(json!({ "input": input })))
            .await?;
        data.issue_create.into_issue()
    }

    pub async fn update_issue(&self, id: &str, input: &IssueUpdateInput) -> Result<Issue> {
        let query = format!(
            r#"
            mutation UpdateIssue($id: String!, $input: IssueUpdateInput!) {{
                issueUpdate(id: $id, input: $input) {{
                    success
                    issue {{ ...IssueFields }}
                }}
            }}
            {ISSUE_FIELDS}"#
        );
        let data: UpdateData = self
            .query(&query, Some(json!({ "id": id, "input": input })))
            .await?;
        data.issue_update.into_issue()
    }

    /// Move an issue to the trash. Returns the API's success flag.
    pub async fn delete_issue(&self, id: &str) -> Result<bool> {
        let query = r#"
            mutation DeleteIssue($id: String!) {
                issueDelete(id: $id) { success }
            }
        "#;
        let data: DeleteData = self.query(query, Some(json!({ "id": id }))).await?;
        Ok(data.issue_delete.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn issue_node_with_null_relations_converts() {
        let raw = json!({
            "id": "abc",
            "identifier": "ENG-1",
            "title": "Broken build",
            "description": null,
            "priority": 7.0,
            "estimate": null,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "updatedAt": "2024-05-02T10:00:00.000Z",
            "dueDate": null,
            "branchName": null,
            "url": "https://linear.app/acme/issue/ENG-1",
            "state": null,
            "assignee": null,
            "creator": null,
            "team": null,
            "project": null,
            "labels": null
        });
        let node: IssueNode = serde_json::from_value(raw).unwrap();
        let issue: Issue = node.into();
        assert_eq!(issue.description, "");
        assert_eq!(issue.branch_name, "");
        assert_eq!(issue.priority, Priority::NoPriority);
        assert!(issue.state.is_none());
        assert!(issue.labels.is_empty());
        assert_eq!(issue.state_name(), "Unknown");
        assert_eq!(issue.assignee_name(), "Unassigned");
    }

    #[test]
    fn paged_connection_carries_cursor() {
        let raw = json!({
            "nodes": [],
            "pageInfo": { "hasNextPage": true, "endCursor": "c1" }
        });
        let conn: PagedConnection<IssueNode> = serde_json::from_value(raw).unwrap();
        let page: IssuePage = conn.into();
        assert!(page.page_info.has_next_page);
        assert_eq!(page.page_info.end_cursor.as_deref(), Some("c1"));
    }

    #[test]
    fn state_node_parses_type_vocabulary() {
        let raw = json!({ "id": "s1", "name": "In Review", "color": null, "type": "started", "position": 2.5 });
        let state: WorkflowState = serde_json::from_value::<StateNode>(raw).unwrap().into();
        assert_eq!(state.state_type, StateType::Started);
        assert_eq!(state.position, 2.5);
        assert_eq!(state.color, "#888888");
    }

    #[test]
    fn graphql_errors_envelope_decodes() {
        let raw = r#"{"data": null, "errors": [{"message": "Authentication required"}]}"#;
        let parsed: GraphQLResponse<ViewerData> = serde_json::from_str(raw).unwrap();
        assert!(parsed.data.is_none());
        assert_eq!(parsed.errors.unwrap()[0].message, "Authentication required");
    }

    #[test]
    fn build_filter_for_project_excludes_closed() {
        let filter = IssueFilter {
            project_id: Some("p1".to_string()),
            exclude_closed: true,
            ..IssueFilter::default()
        };
        assert_eq!(
            build_filter(&filter),
            json!({
                "project": { "id": { "eq": "p1" } },
                "state": { "type": { "nin": ["completed", "canceled"] } }
            })
        );
    }

    #[test]
    fn build_filter_state_type_and_query() {
        let filter = IssueFilter {
            state_type: Some(StateType::Backlog),
            query: Some("  login ".to_string()),
            ..IssueFilter::default()
        };
        assert_eq!(
            build_filter(&filter),
            json!({
                "state": { "type": { "eq": "backlog" } },
                "or": [
                    { "title": { "containsIgnoreCase": "login" } },
                    { "description": { "containsIgnoreCase": "login" } }
                ]
            })
        );
        assert_eq!(build_filter(&IssueFilter::default()), json!({}));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            LinearClient::new("  "),
            Err(ApiError::MissingCredential)
        ));
        assert!(LinearClient::new("lin_api_123").is_ok());
    }
}
