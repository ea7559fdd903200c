// Clippy configuration: enable pedantic but allow overly strict lints
#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::missing_panics_doc)] // Internal functions don't need # Panics docs
#![allow(clippy::must_use_candidate)] // Not all getters need #[must_use]
#![allow(clippy::module_name_repetitions)] // e.g., FocusConfig in config module is fine
#![allow(clippy::doc_markdown)] // Don't require backticks around WezTerm, JSON, etc.
#![allow(clippy::similar_names)] // Allow similar variable names like tmux/tmux_pane
#![allow(clippy::if_not_else)] // Negative conditions can be clearer for early returns
#![allow(clippy::single_match_else)] // match with else is fine for Result handling
#![allow(clippy::manual_let_else)] // if-let is clearer for multi-line error handling
#![allow(clippy::items_after_statements)] // Helper consts can be defined inline
#![allow(clippy::option_if_let_else)] // if-let is more readable for Option handling
#![allow(clippy::needless_pass_by_value)] // PathBuf by value is fine for config loading

//! focusbell - focus-aware audible alerts for coding-agent sessions
//!
//! Rings when a session goes idle or asks for permission, unless you are
//! already looking at it (terminal frontmost, or its tmux pane focused) or
//! the session is a background subagent.
//!
//! Usage:
//!   focusbell hook     # Handle one event from stdin (host pipes JSON)
//!   focusbell serve    # Event bus: handle events sent to the Unix socket
//!   focusbell check    # Show what the focus probes currently see

mod cli;
mod config;
mod dispatch;
mod errors;
mod event;
mod focus;
mod hook;
mod session;
mod shell;
mod sound;
mod terminal;

use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use config::FocusbellConfig;
use dispatch::NotificationDispatcher;
use focus::{FocusGate, FocusStrategy};
use hook::HookOutcome;
use session::{FileSessionStore, SessionRelevanceGate};
use shell::ProcessRunner;
use sound::CommandPlayer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::TerminalContext;
use tokio_util::sync::CancellationToken;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Dispatcher = NotificationDispatcher<
    FocusStrategy<ProcessRunner>,
    FileSessionStore,
    CommandPlayer<ProcessRunner>,
>;

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/focusbell/logs"),
        |dirs| dirs.cache_dir().join("focusbell").join("logs"),
    )
}

/// Setup file logging with daily rotation
///
/// Stdout is left alone so hosts that read hook output see nothing from us.
/// `serve` additionally logs to stderr.
fn init_logging(log_level: &str, to_stderr: bool) -> Option<WorkerGuard> {
    let log_dir = get_log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("focusbell: logging disabled, cannot create {}: {e}", log_dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "focusbell.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Accept either a bare level or full filter directives
    let log_filter = if log_level.contains('=') {
        log_level.to_string()
    } else {
        format!("focusbell={log_level}")
    };

    let stderr_layer = to_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(stderr_layer)
        .init();

    tracing::debug!("Log directory: {:?}", log_dir);
    Some(guard)
}

fn terminal_context(config: &FocusbellConfig) -> TerminalContext {
    TerminalContext::from_env().with_terminal_override(config.focus.terminal.as_deref())
}

/// Wire the dispatcher from configuration and the process environment
fn build_dispatcher(config: &FocusbellConfig) -> Dispatcher {
    let runner = ProcessRunner;

    let focus = if config.focus.enabled {
        let context = terminal_context(config);
        tracing::debug!(?context, "Focus gating enabled");
        FocusStrategy::Gate(FocusGate::new(runner, context, &config.focus.tmux_bin))
    } else {
        FocusStrategy::Disabled
    };

    let sessions = if config.sessions.enabled {
        SessionRelevanceGate::new(FileSessionStore::new(config.sessions.resolved_store_dir()))
    } else {
        SessionRelevanceGate::disabled()
    };

    let player = CommandPlayer::new(
        runner,
        config.sound.player.clone(),
        config.sound.args.clone(),
        config.sound.resolved_path(),
    );

    NotificationDispatcher::new(focus, sessions, player)
}

/// Handle one host event from stdin
///
/// Never fails on event problems: bad input is logged and dropped so the
/// host's event flow is never disturbed.
async fn handle_hook(socket_path: &Path, config: &FocusbellConfig) -> Result<()> {
    use std::io::Read;

    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        tracing::warn!(error = %e, "Failed to read stdin");
        return Ok(());
    }

    let origin = terminal_context(config);
    match hook::route(&input, &origin, socket_path, || build_dispatcher(config)).await {
        HookOutcome::Handled(outcome) => tracing::info!(?outcome, "Handled event in-process"),
        HookOutcome::Forwarded | HookOutcome::Dropped => {}
    }
    Ok(())
}

/// Run the event bus until Ctrl-C
async fn serve(socket_path: &Path, config: &FocusbellConfig) -> Result<()> {
    let dispatcher = Arc::new(build_dispatcher(config));
    let cancel = CancellationToken::new();

    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            return;
        }
        signal_cancel.cancel();
    });

    tracing::info!("Starting focusbell v{}", env!("CARGO_PKG_VERSION"));
    event::socket::listen(dispatcher, socket_path, cancel)
        .await
        .wrap_err_with(|| format!("Event bus failed on {}", socket_path.display()))
}

/// Print the current focus picture
async fn check(config: &FocusbellConfig) {
    let context = terminal_context(config);
    let gate = FocusGate::new(ProcessRunner, context, &config.focus.tmux_bin);
    let report = gate.diagnose().await;
    let context = gate.context();

    let or_none = |v: Option<&str>| v.unwrap_or("-").to_string();

    println!("Terminal program:  {}", or_none(context.terminal_program()));
    println!("Canonical key:     {}", or_none(Some(report.terminal_key.as_str()).filter(|k| !k.is_empty())));
    println!(
        "Aliases:           {}",
        report.aliases.iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!("Frontmost app:     {}", or_none(report.frontmost_app.as_deref()));
    println!("Terminal in front: {}", report.frontmost);
    println!("tmux pane:         {}", or_none(context.pane()));
    if let Some(focus) = report.pane_focus {
        println!("Pane focus:        {focus:?}");
    }
    println!(
        "Focus gating:      {}",
        if config.focus.enabled { "enabled" } else { "disabled" }
    );
    println!("Would notify:      {}", !config.focus.enabled || report.should_notify);

    let sound = config.sound.resolved_path();
    println!(
        "Sound:             {} ({})",
        sound.display(),
        if sound.exists() { "found" } else { "missing" }
    );
    println!(
        "Session store:     {}",
        if config.sessions.enabled {
            config.sessions.resolved_store_dir().display().to_string()
        } else {
            "disabled".to_string()
        }
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Completions { shell } => {
            cli::print_completions(shell);
            return Ok(());
        }
        Commands::Config => {
            print!("{}", FocusbellConfig::example());
            return Ok(());
        }
        _ => {}
    }

    let _logging_guard = init_logging(&cli.log_level, matches!(cli.command, Commands::Serve));

    let config = cli
        .config
        .clone()
        .map_or_else(FocusbellConfig::load, FocusbellConfig::load_from_path);

    let socket_path = cli
        .socket
        .clone()
        .or_else(|| config.socket.clone())
        .unwrap_or_else(cli::default_socket_path);

    match cli.command {
        Commands::Hook => handle_hook(&socket_path, &config).await,
        Commands::Serve => serve(&socket_path, &config).await,
        Commands::Check => {
            check(&config).await;
            Ok(())
        }
        Commands::Config | Commands::Completions { .. } => Ok(()),
    }
}
