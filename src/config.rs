use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration loaded from file
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FocusbellConfig {
    /// Event bus socket (overrides the CLI default)
    #[serde(default)]
    pub socket: Option<PathBuf>,

    /// Alert sound configuration
    #[serde(default)]
    pub sound: SoundConfig,

    /// Focus gating configuration
    #[serde(default)]
    pub focus: FocusConfig,

    /// Session relevance configuration
    #[serde(default)]
    pub sessions: SessionsConfig,
}

/// Alert sound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundConfig {
    /// Sound file; a leading `~/` is expanded to the home directory
    #[serde(default = "default_sound_path")]
    pub path: PathBuf,

    /// Audio player program
    #[serde(default = "default_player")]
    pub player: String,

    /// Extra player arguments, placed before the sound path
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            path: default_sound_path(),
            player: default_player(),
            args: Vec::new(),
        }
    }
}

impl SoundConfig {
    /// Sound path with `~/` expanded
    pub fn resolved_path(&self) -> PathBuf {
        expand_home(&self.path)
    }
}

fn default_sound_path() -> PathBuf {
    config_dir().join("sounds").join("alert.aiff")
}

fn default_player() -> String {
    crate::sound::default_player().to_string()
}

/// Focus gating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Check terminal/tmux focus before alerting
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Terminal identity to use instead of $TERM_PROGRAM
    #[serde(default)]
    pub terminal: Option<String>,

    /// tmux binary
    #[serde(default = "default_tmux_bin")]
    pub tmux_bin: String,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            terminal: None,
            tmux_bin: default_tmux_bin(),
        }
    }
}

fn default_tmux_bin() -> String {
    "tmux".to_string()
}

fn default_true() -> bool {
    true
}

/// Session relevance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Skip alerts for subagent sessions
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Directory holding one `<session id>.json` record per session
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store_dir: default_store_dir(),
        }
    }
}

impl SessionsConfig {
    pub fn resolved_store_dir(&self) -> PathBuf {
        expand_home(&self.store_dir)
    }
}

fn default_store_dir() -> PathBuf {
    opencode_store_dir(std::env::var_os("XDG_DATA_HOME").map(PathBuf::from))
}

/// opencode keeps its data under the XDG data home on every platform,
/// macOS included, so the platform data dir is not used here.
fn opencode_store_dir(xdg_data_home: Option<PathBuf>) -> PathBuf {
    let data_home = xdg_data_home
        .filter(|dir| dir.is_absolute())
        .unwrap_or_else(|| {
            directories::BaseDirs::new().map_or_else(
                || PathBuf::from("~/.local/share"),
                |dirs| dirs.home_dir().join(".local").join("share"),
            )
        });
    data_home.join("opencode").join("storage").join("session")
}

/// focusbell's own config directory
fn config_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("~/.config/focusbell"),
        |dirs| dirs.config_dir().join("focusbell"),
    )
}

/// Expand a leading `~/` against the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => directories::BaseDirs::new()
            .map_or_else(|| path.to_path_buf(), |dirs| dirs.home_dir().join(rest)),
        Err(_) => path.to_path_buf(),
    }
}

impl FocusbellConfig {
    /// Load configuration from default path (~/.config/focusbell/config.toml)
    pub fn load() -> Self {
        Self::load_from_path(Self::default_path())
    }

    /// Get the default configuration path
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Self {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Generate example configuration file content
    pub fn example() -> String {
        r#"# focusbell configuration
# Place this file at ~/.config/focusbell/config.toml

# Event bus socket used by `focusbell serve` and `focusbell hook`
# socket = "/tmp/focusbell.sock"

[sound]
# Alert sound file (~/ is expanded)
path = "~/.config/focusbell/sounds/alert.aiff"

# Audio player: "afplay" on macOS, "paplay" on Linux
player = "afplay"

# Extra player arguments, e.g. volume
args = ["-v", "0.6"]

[focus]
# Stay quiet while you are looking at the session (terminal frontmost /
# tmux pane focused). Disable to alert on every event.
enabled = true

# Override $TERM_PROGRAM, e.g. "WezTerm" or "iTerm.app"
# terminal = "iTerm.app"

tmux_bin = "tmux"

[sessions]
# Stay quiet for subagent sessions
enabled = true

# Where session records live (one <session id>.json per session)
store_dir = "~/.local/share/opencode/storage/session"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FocusbellConfig::load_from_path(dir.path().join("config.toml"));
        assert!(config.focus.enabled);
        assert!(config.sessions.enabled);
        assert_eq!(config.focus.tmux_bin, "tmux");
        assert!(config.socket.is_none());
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[focus\nenabled = ").unwrap();
        let config = FocusbellConfig::load_from_path(path);
        assert!(config.focus.enabled);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[focus]\nenabled = false\nterminal = \"WezTerm\"\n\n[sound]\nplayer = \"aplay\"\n",
        )
        .unwrap();

        let config = FocusbellConfig::load_from_path(path);
        assert!(!config.focus.enabled);
        assert_eq!(config.focus.terminal.as_deref(), Some("WezTerm"));
        assert_eq!(config.focus.tmux_bin, "tmux");
        assert_eq!(config.sound.player, "aplay");
        assert!(config.sound.args.is_empty());
        assert!(config.sessions.enabled);
    }

    #[test]
    fn test_example_parses() {
        let config: FocusbellConfig = toml::from_str(&FocusbellConfig::example()).unwrap();
        assert_eq!(config.sound.args, vec!["-v".to_string(), "0.6".to_string()]);
        assert!(config.focus.enabled);
    }

    #[test]
    fn test_default_store_dir_matches_example() {
        let example: FocusbellConfig = toml::from_str(&FocusbellConfig::example()).unwrap();
        assert_eq!(
            expand_home(&opencode_store_dir(None)),
            example.sessions.resolved_store_dir()
        );
    }

    #[test]
    fn test_store_dir_follows_xdg_data_home() {
        assert_eq!(
            opencode_store_dir(Some(PathBuf::from("/data"))),
            PathBuf::from("/data/opencode/storage/session")
        );
        // Relative XDG paths are invalid and ignored
        assert_eq!(
            opencode_store_dir(Some(PathBuf::from("data"))),
            opencode_store_dir(None)
        );
    }

    #[test]
    fn test_expand_home() {
        let absolute = PathBuf::from("/opt/sounds/ding.aiff");
        assert_eq!(expand_home(&absolute), absolute);

        let expanded = expand_home(Path::new("~/sounds/ding.aiff"));
        if let Some(dirs) = directories::BaseDirs::new() {
            assert_eq!(expanded, dirs.home_dir().join("sounds/ding.aiff"));
        }
    }
}
