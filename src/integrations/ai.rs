//! Issue draft generation through an LLM provider.
//!
//! Each provider gets the same JSON-only system prompt and must answer with
//! `{title, description, suggestedLabels, suggestedPriority}`.

use crate::config::AiConfig;
use crate::integrations::error::{ApiError, Result};
use crate::integrations::HTTP_CLIENT;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const ISSUE_PROMPT: &str = r#"You are an expert at creating well-structured issue tickets for software development.
Given a user's natural language description, generate a clear and actionable issue.

Guidelines:
- Title should be concise (max 80 chars), action-oriented, and describe the task
- Description should be in markdown format with:
  - A brief summary paragraph
  - Implementation details or steps if applicable
  - Acceptance criteria as a checklist
- Suggest appropriate labels from the available options
- Suggest a priority level (1=Urgent, 2=High, 3=Medium, 4=Low, 0=None)

Respond in JSON format:
{
  "title": "Issue title here",
  "description": "Markdown description here",
  "suggestedLabels": ["label1", "label2"],
  "suggestedPriority": 3
}"#;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftRequest {
    pub prompt: String,
    pub available_labels: Vec<String>,
}

/// Structured issue draft returned by a provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Draft {
    pub title: String,
    pub description: String,
    pub suggested_labels: Vec<String>,
    pub suggested_priority: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftProvider {
    OpenAi { api_key: String, model: String },
    Anthropic { api_key: String, model: String },
    Ollama { host: String, model: String },
}

impl DraftProvider {
    /// Select the provider named by `ai.provider`.
    pub fn from_config(config: &AiConfig) -> Result<Self> {
        match config.provider.trim() {
            "openai" => {
                if config.openai.api_key.is_empty() {
                    return Err(ApiError::Provider(
                        "OpenAI API key not configured".to_string(),
                    ));
                }
                Ok(Self::OpenAi {
                    api_key: config.openai.api_key.clone(),
                    model: config.openai.model.clone(),
                })
            }
            "anthropic" => {
                if config.anthropic.api_key.is_empty() {
                    return Err(ApiError::Provider(
                        "Anthropic API key not configured".to_string(),
                    ));
                }
                Ok(Self::Anthropic {
                    api_key: config.anthropic.api_key.clone(),
                    model: config.anthropic.model.clone(),
                })
            }
            "ollama" => Ok(Self::Ollama {
                host: config.ollama.host.trim_end_matches('/').to_string(),
                model: config.ollama.model.clone(),
            }),
            "" => Err(ApiError::Provider(
                "No AI provider configured (set ai.provider)".to_string(),
            )),
            other => Err(ApiError::Provider(format!("unknown AI provider: {}", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Anthropic { .. } => "anthropic",
            Self::Ollama { .. } => "ollama",
        }
    }

    pub async fn generate(&self, request: &DraftRequest) -> Result<Draft> {
        let labels = labels_context(&request.available_labels);
        let content = match self {
            Self::OpenAi { api_key, model } => {
                let body = json!({
                    "model": model,
                    "messages": [
                        { "role": "system", "content": format!("{}{}", ISSUE_PROMPT, labels) },
                        { "role": "user", "content": request.prompt },
                    ],
                    "temperature": 0.7,
                    "response_format": { "type": "json_object" },
                });
                let reply = post_json(
                    HTTP_CLIENT.post(OPENAI_URL).bearer_auth(api_key),
                    &body,
                )
                .await?;
                reply
                    .pointer("/choices/0/message/content")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Provider("no response from OpenAI".to_string()))?
            }
            Self::Anthropic { api_key, model } => {
                let body = json!({
                    "model": model,
                    "max_tokens": 2048,
                    "system": format!(
                        "{}{}\n\nRespond with valid JSON only, no markdown code blocks.",
                        ISSUE_PROMPT, labels
                    ),
                    "messages": [{ "role": "user", "content": request.prompt }],
                });
                let reply = post_json(
                    HTTP_CLIENT
                        .post(ANTHROPIC_URL)
                        .header("x-api-key", api_key)
                        .header("anthropic-version", ANTHROPIC_VERSION),
                    &body,
                )
                .await?;
                reply
                    .pointer("/content/0/text")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Provider("no response from Anthropic".to_string()))?
            }
            Self::Ollama { host, model } => {
                let body = json!({
                    "model": model,
                    "prompt": format!(
                        "{}{}\n\nUser request: {}\n\nRespond with valid JSON only:",
                        ISSUE_PROMPT, labels, request.prompt
                    ),
                    "stream": false,
                    "format": "json",
                });
                let url = format!("{}/api/generate", host);
                let reply = post_json(HTTP_CLIENT.post(url), &body).await?;
                reply
                    .get("response")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::Provider("no response from Ollama".to_string()))?
            }
        };

        parse_draft(&content)
    }
}

async fn post_json(builder: reqwest::RequestBuilder, body: &Value) -> Result<Value> {
    let response = builder.timeout(REQUEST_TIMEOUT).json(body).send().await?;
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(serde_json::from_str(&text)?)
}

fn labels_context(labels: &[String]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let list = serde_json::to_string(labels).unwrap_or_default();
    format!("\n\nAvailable labels to choose from: {}", list)
}

/// Decode a provider's text answer, tolerating a surrounding markdown fence.
pub fn parse_draft(content: &str) -> Result<Draft> {
    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .map_err(|e| ApiError::Provider(format!("failed to parse AI response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnthropicConfig, OllamaConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_draft_reads_camel_case_fields() {
        let draft = parse_draft(
            r#"{"title":"Add login","description":"Do it","suggestedLabels":["Bug"],"suggestedPriority":2}"#,
        )
        .unwrap();
        assert_eq!(
            draft,
            Draft {
                title: "Add login".to_string(),
                description: "Do it".to_string(),
                suggested_labels: vec!["Bug".to_string()],
                suggested_priority: 2,
            }
        );
    }

    #[test]
    fn parse_draft_strips_code_fence_and_defaults_missing() {
        let draft = parse_draft("```json\n{\"title\":\"Only title\"}\n```").unwrap();
        assert_eq!(draft.title, "Only title");
        assert!(draft.suggested_labels.is_empty());
        assert_eq!(draft.suggested_priority, 0);
    }

    #[test]
    fn parse_draft_rejects_prose() {
        let err = parse_draft("Sure! Here is your issue.").unwrap_err();
        assert!(err.to_string().starts_with("failed to parse AI response"));
    }

    #[test]
    fn provider_selection_validates_keys() {
        let mut config = AiConfig::default();
        assert!(DraftProvider::from_config(&config).is_err());

        config.provider = "anthropic".to_string();
        let err = DraftProvider::from_config(&config).unwrap_err();
        assert_eq!(err.to_string(), "Anthropic API key not configured");

        config.anthropic = AnthropicConfig {
            api_key: "sk-ant".to_string(),
            model: "claude-3-sonnet-20240229".to_string(),
        };
        assert_eq!(DraftProvider::from_config(&config).unwrap().name(), "anthropic");

        config.provider = "ollama".to_string();
        config.ollama = OllamaConfig {
            host: "http://localhost:11434/".to_string(),
            model: "llama2".to_string(),
        };
        assert_eq!(
            DraftProvider::from_config(&config).unwrap(),
            DraftProvider::Ollama {
                host: "http://localhost:11434".to_string(),
                model: "llama2".to_string(),
            }
        );

        config.provider = "bard".to_string();
        assert!(DraftProvider::from_config(&config).is_err());
    }

    #[test]
    fn labels_context_lists_names_as_json() {
        assert_eq!(labels_context(&[]), "");
        assert_eq!(
            labels_context(&["Bug".to_string(), "UI".to_string()]),
            "\n\nAvailable labels to choose from: [\"Bug\",\"UI\"]"
        );
    }
}
