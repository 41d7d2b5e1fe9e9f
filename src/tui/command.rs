//! Async side effects requested by `App::update()`.
//!
//! Each command runs as one detached tokio task which reports back with
//! exactly one `Message` on the app channel. Tasks never touch app state.

use super::message::{Bootstrap, Message};
use crate::config::{AiConfig, OpencodeConfig};
use crate::data::{IssueCreateInput, IssueFilter, IssueUpdateInput, DEFAULT_PAGE_SIZE};
use crate::integrations::ai::{DraftProvider, DraftRequest};
use crate::integrations::{system, LinearClient};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Upper bound for the project-wide search source.
const SEARCH_SOURCE_SIZE: usize = DEFAULT_PAGE_SIZE * 5;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadBootstrap,
    LoadIssues {
        filter: IssueFilter,
        generation: u64,
        append: bool,
    },
    /// All issues of a project, completed included.
    LoadProjectIssues {
        project_id: String,
        generation: u64,
    },
    LoadStates {
        team_id: String,
    },
    LoadLabels {
        team_id: String,
    },
    LoadUsers,
    CreateIssue(IssueCreateInput),
    UpdateIssue {
        id: String,
        input: IssueUpdateInput,
    },
    DeleteIssue {
        id: String,
        identifier: String,
    },
    CopyToClipboard {
        text: String,
        /// Status text on success.
        success: String,
    },
    OpenUrl(String),
    /// Launch the coding agent on an issue in a new terminal.
    OpenWorkTask {
        identifier: String,
    },
    GenerateDraft(DraftRequest),
}

/// Spawns command tasks against a shared client.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    client: Option<LinearClient>,
    ai: AiConfig,
    opencode: OpencodeConfig,
    tx: UnboundedSender<Message>,
}

impl CommandRunner {
    /// `client` is `None` in setup mode; remote commands then fail with a status.
    pub fn new(
        client: Option<LinearClient>,
        ai: AiConfig,
        opencode: OpencodeConfig,
        tx: UnboundedSender<Message>,
    ) -> Self {
        Self {
            client,
            ai,
            opencode,
            tx,
        }
    }

    pub fn spawn_all(&self, commands: Vec<Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    pub fn spawn(&self, command: Command) {
        let runner = self.clone();
        tokio::spawn(async move {
            let msg = runner.execute(command).await;
            // A closed channel means the UI is shutting down.
            let _ = runner.tx.send(msg);
        });
    }

    async fn execute(&self, command: Command) -> Message {
        // Local side effects first; they need no client.
        let command = match command {
            Command::CopyToClipboard { text, success } => {
                return match system::copy_to_clipboard(&text).await {
                    Ok(()) => Message::Status {
                        text: success,
                        is_error: false,
                    },
                    Err(e) => Message::Status {
                        text: format!("Failed to copy: {}", e),
                        is_error: true,
                    },
                };
            }
            Command::OpenUrl(url) => {
                return match system::open_url(&url).await {
                    Ok(()) => Message::Status {
                        text: "Opened in Linear".to_string(),
                        is_error: false,
                    },
                    Err(e) => Message::Status {
                        text: format!("Failed to open Linear: {}", e),
                        is_error: true,
                    },
                };
            }
            Command::OpenWorkTask { identifier } => {
                return match system::open_work_task(&self.opencode, &identifier).await {
                    Ok(()) => Message::Status {
                        text: format!("Opened opencode for {}", identifier),
                        is_error: false,
                    },
                    Err(e) => {
                        warn!(issue = %identifier, "work task launch failed: {:#}", e);
                        Message::Status {
                            text: format!("Failed to open terminal: {:#}", e),
                            is_error: true,
                        }
                    }
                };
            }
            Command::GenerateDraft(request) => return self.generate_draft(request).await,
            other => other,
        };

        let Some(client) = &self.client else {
            return Message::Status {
                text: "Error: no API key configured".to_string(),
                is_error: true,
            };
        };

        match command {
            Command::LoadBootstrap => {
                debug!("bootstrap fetch issued");
                let result = client.bootstrap().await.map_err(|e| e.to_string());
                let repo_name = system::repo_name().await;
                Message::BootstrapLoaded(result.map(|(viewer, teams, projects)| Bootstrap {
                    viewer,
                    teams,
                    projects,
                    repo_name,
                }))
            }
            Command::LoadIssues {
                filter,
                generation,
                append,
            } => {
                debug!(generation, append, "issue fetch issued");
                let result = client.fetch_issues(&filter).await.map_err(|e| e.to_string());
                Message::IssuesLoaded {
                    generation,
                    append,
                    result,
                }
            }
            Command::LoadProjectIssues {
                project_id,
                generation,
            } => {
                let result = client
                    .project_issues(&project_id, SEARCH_SOURCE_SIZE, true, None)
                    .await
                    .map_err(|e| e.to_string());
                Message::ProjectIssuesLoaded { generation, result }
            }
            Command::LoadStates { team_id } => Message::StatesLoaded(
                client
                    .workflow_states(&team_id)
                    .await
                    .map_err(|e| e.to_string()),
            ),
            Command::LoadLabels { team_id } => {
                Message::LabelsLoaded(client.labels(&team_id).await.map_err(|e| e.to_string()))
            }
            Command::LoadUsers => {
                Message::UsersLoaded(client.users().await.map_err(|e| e.to_string()))
            }
            Command::CreateIssue(input) => {
                let result = client.create_issue(&input).await.map_err(|e| e.to_string());
                if let Err(e) = &result {
                    warn!("create failed: {}", e);
                }
                Message::IssueCreated(result)
            }
            Command::UpdateIssue { id, input } => {
                let result = client
                    .update_issue(&id, &input)
                    .await
                    .map_err(|e| e.to_string());
                if let Err(e) = &result {
                    warn!(issue = %id, "update failed: {}", e);
                }
                Message::IssueUpdated(result)
            }
            Command::DeleteIssue { id, identifier } => {
                let result = match client.delete_issue(&id).await {
                    Ok(true) => Ok(identifier),
                    Ok(false) => Err(format!("{} was not deleted", identifier)),
                    Err(e) => Err(e.to_string()),
                };
                if let Err(e) = &result {
                    warn!(issue = %id, "delete failed: {}", e);
                }
                Message::IssueDeleted(result)
            }
            Command::CopyToClipboard { .. }
            | Command::OpenUrl(_)
            | Command::OpenWorkTask { .. }
            | Command::GenerateDraft(_) => Message::None,
        }
    }

    async fn generate_draft(&self, request: DraftRequest) -> Message {
        let provider = match DraftProvider::from_config(&self.ai) {
            Ok(provider) => provider,
            Err(e) => return Message::DraftGenerated(Err(e.to_string())),
        };
        debug!(provider = provider.name(), "draft requested");
        let result = provider
            .generate(&request)
            .await
            .map(|draft| (provider.name().to_string(), draft))
            .map_err(|e| e.to_string());
        if let Err(e) = &result {
            warn!("draft generation failed: {}", e);
        }
        Message::DraftGenerated(result)
    }
}
