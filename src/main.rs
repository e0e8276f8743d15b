//! A terminal working-directory selector.
//!
//! Run the binary to pick a working directory; on exit it prints
//! `__WD__=<path>` for the shell wrapper.  Run with `--init bash|zsh` to print
//! the wrapper function for your shell rc file.

mod app;
mod config;
mod core;
mod error;
mod i18n;
mod shell;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Frame, Terminal};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::spawn_event_reader,
    handler,
    state::{ActiveView, AppState},
};
use crate::config::{AppConfig, PICKER_HINT};
use crate::core::path::SelectedPath;
use crate::i18n::{Locale, MessageKey};
use crate::shell::integration::{self, Shell};
use crate::ui::{
    browser::{PickerBody, PickerPopup},
    layout::AppLayout,
    popup::HelpPopup,
    theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Pick a working directory", version)]
struct Cli {
    /// Initially selected working directory.
    path: Option<PathBuf>,

    /// UI language (`en`, `zh`); defaults to the config file, then `LANG`.
    #[arg(long)]
    locale: Option<Locale>,

    /// Config file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// External picker command; its stdout is taken as the chosen directory.
    #[arg(long)]
    browse_command: Option<String>,

    /// Show hidden (dot) directories in the picker.
    #[arg(long)]
    hidden: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the shell wrapper function and exit.
    #[arg(long, value_enum)]
    init: Option<Shell>,

    /// Write the effective config (defaults plus file) back to disk and exit.
    #[arg(long)]
    write_config: bool,
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env();
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        // stdout is reserved for the exit payload.
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
    Ok(())
}

/// Load the config file; a broken file is logged and replaced by defaults.
fn load_config(path: &Path) -> AppConfig {
    match AppConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "falling back to default config");
            AppConfig::default()
        }
    }
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let area = frame.area();
    state.terminal_area = area;
    let layout = AppLayout::from_area(area);

    frame.render_widget(state.selector(), layout.selector_area);

    let (text, is_error) = state.status_text();
    let style = if is_error {
        Theme::error_style()
    } else {
        Theme::status_bar_style()
    };
    frame.render_widget(Paragraph::new(text).style(style), layout.status_area);

    match state.active_view {
        ActiveView::Picker => {
            let Some(picker) = state.picker.as_mut() else {
                return;
            };
            let messages = &state.messages;
            let body = if picker.is_loading() {
                PickerBody::Loading(messages.t(MessageKey::PickerLoading))
            } else if let Some(tree) = &picker.tree {
                PickerBody::Tree {
                    tree,
                    empty: messages.t(MessageKey::PickerEmpty),
                }
            } else {
                PickerBody::Failed(picker.error.as_deref().unwrap_or_default())
            };
            let popup = PickerPopup::new(
                messages.t(MessageKey::PickerTitle),
                picker.root.display().to_string(),
                body,
                state.config.hint(PICKER_HINT, messages),
            );
            frame.render_stateful_widget(popup, area, &mut picker.list);
        }
        ActiveView::Help => frame.render_widget(
            HelpPopup {
                config: &state.config,
                messages: &state.messages,
            },
            area,
        ),
        ActiveView::Selector => {}
    }
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    // ── shell-integration mode ────────────────────────────────
    if let Some(shell) = cli.init {
        print!("{}", integration::shell_function(shell));
        return Ok(());
    }

    // ── configuration ─────────────────────────────────────────
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut user_config = load_config(&config_path);
    if cli.write_config {
        user_config.save(&config_path)?;
        eprintln!("wrote {}", config_path.display());
        return Ok(());
    }
    if cli.hidden {
        user_config.scan.show_hidden = true;
    }
    if let Some(command) = cli.browse_command {
        user_config.browse_command = Some(command);
    }
    let messages = user_config.messages(cli.locale);
    tracing::debug!(locale = %messages.locale(), config = %config_path.display(), "starting");

    let selected = cli
        .path
        .as_deref()
        .map(|p| p.canonicalize().unwrap_or_else(|_| p.to_path_buf()))
        .and_then(|p| SelectedPath::from_path(&p));
    let mut state = AppState::new(selected, user_config, messages);

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    // ── event channel ─────────────────────────────────────────
    // Terminal input and browse results arrive on the same channel.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let stop_reader = Arc::new(AtomicBool::new(false));
    let reader = spawn_event_reader(tx.clone(), Duration::from_millis(250), stop_reader.clone());

    // ── event loop ────────────────────────────────────────────
    let outcome = async {
        loop {
            terminal.draw(|frame| draw(frame, &mut state))?;

            let Some(event) = rx.recv().await else {
                break;
            };
            handler::handle_event(&mut state, event, &tx);
            // Apply everything already queued before redrawing.
            while let Ok(event) = rx.try_recv() {
                handler::handle_event(&mut state, event, &tx);
            }

            if state.should_quit {
                break;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    // ── teardown ──────────────────────────────────────────────
    // The reader must be gone before the shell gets the terminal back.
    stop_reader.store(true, Ordering::Relaxed);
    if let Err(err) = reader.await {
        tracing::warn!(%err, "event reader did not shut down cleanly");
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    outcome?;

    integration::print_exit_payload(state.selected.as_ref())?;
    Ok(())
}
