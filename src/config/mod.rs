use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables that override `linear.api_key`, highest precedence first.
pub const API_KEY_ENV_VARS: [&str; 2] = ["LAZYLINER_API_KEY", "LINEAR_API_KEY"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub linear: LinearConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub opencode: OpencodeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearConfig {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Team id scoping `lazyliner list` when set.
    #[serde(default)]
    pub team: String,
    /// Remembered project id; opens the Project tab when it exists.
    #[serde(default)]
    pub project: String,
    /// Starting tab: my-issues, all, active or backlog.
    #[serde(default = "default_view")]
    pub view: String,
}

fn default_view() -> String {
    "my-issues".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_ids: bool,
}

fn default_true() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { show_ids: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiConfig {
    /// openai, anthropic or ollama. Empty disables draft generation.
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub anthropic: AnthropicConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_openai_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_anthropic_model")]
    pub model: String,
}

fn default_anthropic_model() -> String {
    "claude-3-sonnet-20240229".to_string()
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_anthropic_model(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_host")]
    pub host: String,
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama2".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Coding agent launched by the work-task action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpencodeConfig {
    /// auto, tmux, kitty, wezterm, ghostty, iterm, terminal or gnome-terminal.
    #[serde(default = "default_terminal")]
    pub terminal: String,
    #[serde(default = "default_opencode_command")]
    pub command: String,
}

fn default_terminal() -> String {
    "auto".to_string()
}

fn default_opencode_command() -> String {
    "opencode".to_string()
}

impl Default for OpencodeConfig {
    fn default() -> Self {
        Self {
            terminal: default_terminal(),
            command: default_opencode_command(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            team: String::new(),
            project: String::new(),
            view: default_view(),
        }
    }
}

impl Config {
    pub fn has_credential(&self) -> bool {
        !self.linear.api_key.trim().is_empty()
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
        {
            self.linear.api_key = key.trim().to_string();
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = directories::ProjectDirs::from("", "", "lazyliner")
        .context("Could not determine config directory")?
        .config_dir()
        .to_path_buf();
    Ok(dir)
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Read a config file. A missing file yields the defaults.
pub fn read_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    Ok(config)
}

/// Load the config file (default location unless `path` is given) and apply
/// environment overrides.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    let mut config = read_file(&path)?;
    config.apply_env_overrides(|name| std::env::var(name).ok());
    Ok(config)
}

/// Write a config file with owner-only permissions.
pub fn save(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config to {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    use std::io::{self, Write};

    print!("{}", label);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn init_wizard(path: Option<&Path>) -> Result<()> {
    println!("Lazyliner Configuration Wizard");
    println!("==============================\n");

    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if config_path.exists() {
        let answer = prompt(&format!(
            "Config already exists at {}. Overwrite? [y/N] ",
            config_path.display()
        ))?;
        if !answer.eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    let mut config = Config::default();
    config.linear.api_key = prompt("Linear API key (https://linear.app/settings/api): ")?;

    let provider = prompt("AI provider for drafts [openai/anthropic/ollama, Enter to skip]: ")?;
    match provider.as_str() {
        "openai" => config.ai.openai.api_key = prompt("OpenAI API key: ")?,
        "anthropic" => config.ai.anthropic.api_key = prompt("Anthropic API key: ")?,
        _ => {}
    }
    if matches!(provider.as_str(), "openai" | "anthropic" | "ollama") {
        config.ai.provider = provider;
    }

    save(&config, &config_path)?;

    println!("\nConfig saved to {}", config_path.display());
    println!("Run `lazyliner` to start.");

    Ok(())
}
