//! Non-interactive subcommands: `list` and `view`.

use crate::config::Config;
use crate::data::{Issue, IssueFilter};
use crate::integrations::LinearClient;
use crate::tui::ui::layout::{display_width, pad_to_width, truncate_str};
use anyhow::{Context, Result};
use ratatui::layout::Alignment;

const TITLE_WIDTH: usize = 50;
const DESCRIPTION_WIDTH: usize = 56;
const COLUMN_GAP: usize = 2;
const BOX_RULE: &str = "────────────────────────────────────────────────────────────";

/// Fail fast with setup instructions when no API key is configured.
pub fn require_credential(config: &Config) -> Result<()> {
    if config.has_credential() {
        return Ok(());
    }
    let path = crate::config::default_config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "~/.config/lazyliner/config.toml".to_string());
    eprintln!("Linear API key not configured.");
    eprintln!();
    eprintln!("Set it via environment variable:");
    eprintln!("  export LAZYLINER_API_KEY=lin_api_xxxxx");
    eprintln!();
    eprintln!("Or create a config file at {}:", path);
    eprintln!("  [linear]");
    eprintln!("  api_key = \"lin_api_xxxxx\"");
    eprintln!();
    eprintln!("Or run: lazyliner --init");
    anyhow::bail!("API key not configured")
}

pub async fn list(config: &Config, limit: usize, mine: bool) -> Result<()> {
    require_credential(config)?;
    let client = LinearClient::new(config.linear.api_key.clone())?;
    let team = config.defaults.team.trim();
    let filter = IssueFilter {
        mine,
        team_id: (!team.is_empty()).then(|| team.to_string()),
        first: limit,
        ..IssueFilter::default()
    };
    let page = client
        .fetch_issues(&filter)
        .await
        .context("failed to fetch issues")?;

    print!("{}", format_issue_table(&page.issues));
    println!();
    println!("Showing {} issues", page.issues.len());
    Ok(())
}

pub async fn view(config: &Config, id: &str) -> Result<()> {
    require_credential(config)?;
    let client = LinearClient::new(config.linear.api_key.clone())?;
    let issue = client
        .issue(id)
        .await
        .with_context(|| format!("failed to fetch issue {}", id))?;
    print!("{}", format_issue_view(&issue));
    Ok(())
}

/// Aligned `ID TITLE STATUS PRIORITY ASSIGNEE` table, one issue per row.
pub fn format_issue_table(issues: &[Issue]) -> String {
    let mut rows: Vec<[String; 5]> = vec![
        ["ID", "TITLE", "STATUS", "PRIORITY", "ASSIGNEE"].map(String::from),
        ["──", "─────", "──────", "────────", "────────"].map(String::from),
    ];
    rows.extend(issues.iter().map(|issue| {
        [
            issue.identifier.clone(),
            truncate_str(&issue.title, TITLE_WIDTH),
            issue.state_name().to_string(),
            issue.priority.label().to_string(),
            issue
                .assignee
                .as_ref()
                .map(|u| u.name.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }));

    let mut widths = [0usize; 5];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line: String = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| pad_to_width(cell, width + COLUMN_GAP, Alignment::Left))
            .collect();
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Box-drawn summary of one issue.
pub fn format_issue_view(issue: &Issue) -> String {
    let mut lines = vec![
        format!("╭{}╮", BOX_RULE),
        format!(
            "│ {}: {}",
            issue.identifier,
            truncate_str(&issue.title, TITLE_WIDTH)
        ),
        format!("├{}┤", BOX_RULE),
        format!("│ Status:   {}", issue.state_name()),
        format!("│ Priority: {}", issue.priority.label()),
        format!("│ Assignee: {}", issue.assignee_name()),
        format!("│ URL:      {}", issue.url),
    ];
    if !issue.branch_name.is_empty() {
        lines.push(format!("│ Branch:   {}", issue.branch_name));
    }
    lines.push(format!("├{}┤", BOX_RULE));

    if issue.description.is_empty() {
        lines.push("│ No description".to_string());
    } else {
        lines.push("│ Description:".to_string());
        lines.extend(
            issue
                .description
                .lines()
                .map(|line| format!("│   {}", truncate_str(line, DESCRIPTION_WIDTH))),
        );
    }
    lines.push(format!("╰{}╯", BOX_RULE));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
