//! CLI argument parsing
//!
//! Uses clap for argument parsing with derive macros.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

/// Get default socket path, preferring XDG_RUNTIME_DIR on Linux
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("focusbell.sock");
    }
    // Fall back to /tmp (macOS and fallback)
    PathBuf::from("/tmp/focusbell.sock")
}

/// Focus-aware audible alerts for coding-agent sessions
#[derive(Parser, Debug)]
#[command(name = "focusbell")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Event bus socket (default: config `socket`, then $XDG_RUNTIME_DIR/focusbell.sock or /tmp/focusbell.sock)
    #[arg(short, long, env = "FOCUSBELL_SOCKET", global = true)]
    pub socket: Option<PathBuf>,

    /// Config file (default: ~/.config/focusbell/config.toml)
    #[arg(short, long, env = "FOCUSBELL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Handle one host event read from stdin
    ///
    /// Forwards the event to a running `focusbell serve` when one is listening,
    /// otherwise gates and plays in this process.
    Hook,

    /// Run the event bus: gate every event sent to the socket
    Serve,

    /// Print what the focus probes see right now
    Check,

    /// Print an example configuration file
    Config,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Generate shell completions and print to stdout
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "focusbell", &mut io::stdout());
}
