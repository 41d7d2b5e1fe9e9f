//! Shell-outs: clipboard, browser/desktop app, coding-agent terminal, and
//! git remote lookup.

use crate::config::OpencodeConfig;
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

fn clipboard_command() -> Command {
    if cfg!(target_os = "macos") {
        Command::new("pbcopy")
    } else if cfg!(target_os = "windows") {
        Command::new("clip")
    } else {
        let mut cmd = Command::new("xclip");
        cmd.args(["-selection", "clipboard"]);
        cmd
    }
}

/// Pipe `text` into the platform clipboard tool.
pub async fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut child = clipboard_command()
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .context("clipboard tool not available")?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }

    let status = child.wait().await?;
    if !status.success() {
        bail!("clipboard tool exited with {}", status);
    }
    Ok(())
}

async fn open_in_browser(url: &str) -> Result<()> {
    let spawned = if cfg!(target_os = "macos") {
        Command::new("open").arg(url).spawn()
    } else if cfg!(target_os = "windows") {
        Command::new("rundll32")
            .args(["url.dll,FileProtocolHandler", url])
            .spawn()
    } else {
        // wslview covers WSL setups without xdg-open
        Command::new("xdg-open")
            .arg(url)
            .spawn()
            .or_else(|_| Command::new("wslview").arg(url).spawn())
    };
    spawned.with_context(|| format!("could not open {}", url))?;
    Ok(())
}

/// Open an issue URL in the Linear desktop app when installed (macOS), else the browser.
pub async fn open_url(url: &str) -> Result<()> {
    if cfg!(target_os = "macos") && Path::new("/Applications/Linear.app").exists() {
        Command::new("open")
            .args(["-a", "Linear", url])
            .spawn()
            .context("could not launch Linear.app")?;
        return Ok(());
    }
    open_in_browser(url).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            Self::Linux
        }
    }
}

/// A program and its arguments, spawned without a shell in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: String,
    pub args: Vec<String>,
}

impl Launch {
    fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Guess the terminal emulator from the environment read through `lookup`.
pub fn detect_terminal<F>(lookup: F, platform: Platform) -> &'static str
where
    F: Fn(&str) -> Option<String>,
{
    let set = |name: &str| lookup(name).is_some_and(|v| !v.is_empty());
    if set("TMUX") {
        return "tmux";
    }
    if set("KITTY_WINDOW_ID") {
        return "kitty";
    }
    if set("WEZTERM_PANE") {
        return "wezterm";
    }
    match lookup("TERM_PROGRAM").as_deref() {
        Some("ghostty") => return "ghostty",
        Some("iTerm.app") => return "iterm",
        Some("Apple_Terminal") => return "terminal",
        _ => {}
    }
    if lookup("TERM").as_deref() == Some("xterm-ghostty") {
        return "ghostty";
    }
    match platform {
        Platform::Linux => "gnome-terminal",
        Platform::MacOs | Platform::Windows => "terminal",
    }
}

/// Wrap `s` in single quotes for a POSIX shell.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', r#"\""#)
}

/// Command that opens a new terminal in `work_dir` running `agent --prompt <prompt>`.
pub fn work_task_launch(
    platform: Platform,
    terminal: &str,
    work_dir: &str,
    agent: &str,
    prompt: &str,
) -> Launch {
    if platform == Platform::Windows {
        let line = format!(r#"cd /d "{}" && {} --prompt "{}""#, work_dir, agent, prompt);
        return Launch::new("cmd", ["/c", "start", "cmd", "/k", line.as_str()]);
    }

    let line = format!("{} --prompt {}", agent, shell_quote(prompt));
    let osascript = |app: &str, body: &str| {
        let script = format!(
            "tell application \"{}\"\n{}\nend tell",
            app, body
        );
        Launch::new("osascript", ["-e", script.as_str()])
    };
    let cd_line = applescript_escape(&format!("cd {} && {}", shell_quote(work_dir), line));

    match (platform, terminal) {
        (_, "tmux") => Launch::new("tmux", ["new-window", "-c", work_dir, line.as_str()]),
        (Platform::MacOs, "ghostty") => Launch::new(
            "ghostty",
            [
                format!("--working-directory={}", work_dir),
                "-e".into(),
                "sh".into(),
                "-c".into(),
                line,
            ],
        ),
        (Platform::MacOs, "iterm") => osascript(
            "iTerm",
            &format!(
                "set newWindow to (create window with default profile)\n\
                 tell current session of newWindow to write text \"{}\"",
                cd_line
            ),
        ),
        (Platform::MacOs, _) => osascript(
            "Terminal",
            &format!("do script \"{}\"\nactivate", cd_line),
        ),
        (_, "ghostty") => Launch::new("ghostty", ["+new-window", "-e", "sh", "-c", line.as_str()]),
        (_, "kitty") => Launch::new(
            "kitty",
            [
                "@".to_string(),
                "launch".into(),
                "--type=os-window".into(),
                format!("--cwd={}", work_dir),
                "sh".into(),
                "-c".into(),
                line,
            ],
        ),
        (_, "wezterm") => Launch::new(
            "wezterm",
            [
                "cli", "spawn", "--new-window", "--cwd", work_dir, "--", "sh", "-c",
                line.as_str(),
            ],
        ),
        _ => Launch::new(
            "gnome-terminal",
            [
                "--window".to_string(),
                format!("--working-directory={}", work_dir),
                "--".into(),
                "sh".into(),
                "-c".into(),
                line,
            ],
        ),
    }
}

/// Open a terminal in the current directory running the coding agent on `/work_task <identifier>`.
pub async fn open_work_task(config: &OpencodeConfig, identifier: &str) -> Result<()> {
    let work_dir = std::env::current_dir().context("could not read working directory")?;
    let platform = Platform::current();
    let terminal = match config.terminal.trim() {
        "" | "auto" => detect_terminal(|name| std::env::var(name).ok(), platform),
        other => other,
    };
    let agent = match config.command.trim() {
        "" => "opencode",
        other => other,
    };
    let launch = work_task_launch(
        platform,
        terminal,
        &work_dir.to_string_lossy(),
        agent,
        &format!("/work_task {}", identifier),
    );

    Command::new(&launch.program)
        .args(&launch.args)
        .current_dir(&work_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("{} not available", launch.program))?;
    Ok(())
}

/// Name of the repository in the current directory, from the `origin` remote.
pub async fn repo_name() -> Option<String> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_repo_name(&String::from_utf8_lossy(&output.stdout))
}

/// Last path segment of a remote URL, without `.git`.
///
/// Handles both `git@host:owner/repo.git` and `https://host/owner/repo` forms.
pub fn parse_repo_name(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    let path = match url.strip_prefix("git@") {
        Some(rest) => rest.split_once(':').map(|(_, path)| path).unwrap_or(rest),
        None => url,
    };
    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    path.rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
