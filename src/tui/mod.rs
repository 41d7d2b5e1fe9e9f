pub mod app;
pub mod command;
pub mod input;
pub mod message;
pub mod ui;
pub mod views;

use crate::config::Config;
use crate::integrations::LinearClient;
use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

pub use app::App;
pub use command::{Command, CommandRunner};
pub use message::Message;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

/// Run the interactive UI until the user quits.
///
/// `open_create` starts on the create form once the catalogs are loaded.
pub async fn run(config: Config, config_path: Option<PathBuf>, open_create: bool) -> Result<()> {
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("lazyliner requires an interactive terminal");
    }

    let client = if config.has_credential() {
        Some(LinearClient::new(config.linear.api_key.clone())?)
    } else {
        info!("no API key configured, starting in setup mode");
        None
    };

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("failed to enter alternate screen");
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            return Err(e).context("failed to create terminal");
        }
    };

    let result = run_app(&mut terminal, config, config_path, client, open_create).await;

    // Restore terminal on every path
    let restored = restore_terminal(&mut terminal);
    result.and(restored)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(
    terminal: &mut Term,
    config: Config,
    config_path: Option<PathBuf>,
    client: Option<LinearClient>,
    open_create: bool,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = CommandRunner::new(client, config.ai.clone(), config.opencode.clone(), tx);

    let size = terminal.size()?;
    let mut app = App::new(config, config_path, size.width, size.height);
    app.pending_create = open_create;
    runner.spawn_all(app.init());

    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut input_state = input::InputState::new();

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            let msg = match event::read()? {
                Event::Key(key) => input::dispatch(&app, &mut input_state, key),
                Event::Resize(width, height) => Message::Resize(width, height),
                _ => Message::None,
            };
            runner.spawn_all(app.update(msg));
        }

        // Handle pending chord timeout (non-blocking)
        if let Some(msg) = input_state.expire() {
            runner.spawn_all(app.update(msg));
        }

        drain_completions(&mut app, &mut rx, &runner);

        if last_tick.elapsed() >= tick_rate {
            app.update(Message::Tick);
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Apply every completion that has arrived without waiting for more.
fn drain_completions(app: &mut App, rx: &mut UnboundedReceiver<Message>, runner: &CommandRunner) {
    loop {
        match rx.try_recv() {
            Ok(msg) => runner.spawn_all(app.update(msg)),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                warn!("completion channel closed");
                break;
            }
        }
    }
}
