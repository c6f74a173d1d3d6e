//! Configuration system for the task board engine.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults

use std::path::PathBuf;

use crate::policy::{MovePolicy, ParsePolicyError};

/// Errors that can occur when loading board configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The config file names an unknown move policy.
    #[error(transparent)]
    Policy(#[from] ParsePolicyError),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardConfigFile {
    board: BoardFileConfig,
}

/// `[board]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    move_policy: Option<String>,
    channel_capacity: Option<usize>,
    notice_buffer: Option<usize>,
}

// ---------------------------------------------------------------------------
// CLI arguments
// ---------------------------------------------------------------------------

/// CLI arguments for the board engine.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Multi-user kanban task board engine")]
pub struct BoardCliArgs {
    /// Move policy (`forward-only` or `unrestricted`).
    #[arg(short = 'p', long, env = "TASKBOARD_POLICY")]
    pub move_policy: Option<MovePolicy>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Capacity of the remote-change queue.
    #[arg(long)]
    pub channel_capacity: Option<usize>,

    /// Capacity of the user-notice queue.
    #[arg(long)]
    pub notice_buffer: Option<usize>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKBOARD_LOG")]
    pub log_level: String,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved board configuration.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    /// The active move policy.
    pub move_policy: MovePolicy,
    /// Capacity of the remote-change queue.
    pub channel_capacity: usize,
    /// Capacity of the user-notice queue.
    pub notice_buffer: usize,
    /// Log level filter string.
    pub log_level: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            move_policy: MovePolicy::default(),
            channel_capacity: 64,
            notice_buffer: 64,
            log_level: "info".to_string(),
        }
    }
}

impl BoardConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an error.
    /// If no `--config` is given, the default path is tried and a missing
    /// file is treated as empty config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed, or names an unknown policy.
    pub fn load(cli: &BoardCliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Self::resolve(cli, &file)
    }

    /// Resolve a `BoardConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default.
    fn resolve(cli: &BoardCliArgs, file: &BoardConfigFile) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let file_policy = file
            .board
            .move_policy
            .as_deref()
            .map(str::parse::<MovePolicy>)
            .transpose()?;

        Ok(Self {
            move_policy: cli
                .move_policy
                .or(file_policy)
                .unwrap_or(defaults.move_policy),
            channel_capacity: cli
                .channel_capacity
                .or(file.board.channel_capacity)
                .unwrap_or(defaults.channel_capacity),
            notice_buffer: cli
                .notice_buffer
                .or(file.board.notice_buffer)
                .unwrap_or(defaults.notice_buffer),
            log_level: cli.log_level.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file for the board.
fn load_config_file(
    explicit_path: Option<&std::path::Path>,
) -> Result<BoardConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(BoardConfigFile::default());
        };
        config_dir.join("taskboard").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BoardConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
