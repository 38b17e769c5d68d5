use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const EDIT_MODE_VAR: &str = "MONKEY_EDIT_MODE";
pub const HISTORY_VAR: &str = "MONKEY_HISTORY";
pub const PROMPT_VAR: &str = "MONKEY_PROMPT";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown edit mode '{0}', expected 'emacs' or 'vi'")]
    UnknownEditMode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Emacs,
    Vi,
}

impl FromStr for EditMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "emacs" => Ok(EditMode::Emacs),
            "vi" | "vim" => Ok(EditMode::Vi),
            _ => Err(ConfigError::UnknownEditMode(s.to_string())),
        }
    }
}

/// Settings for the interactive REPL.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplConfig {
    pub edit_mode: EditMode,
    pub history_file: PathBuf,
    pub prompt: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            edit_mode: EditMode::default(),
            history_file: PathBuf::from("monkey_history.txt"),
            prompt: ">> ".to_string(),
        }
    }
}

impl ReplConfig {
    /// Defaults overridden by `MONKEY_EDIT_MODE`, `MONKEY_HISTORY` and
    /// `MONKEY_PROMPT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = ReplConfig::default();
        if let Some(mode) = lookup(EDIT_MODE_VAR) {
            config.edit_mode = mode.parse()?;
        }
        if let Some(path) = lookup(HISTORY_VAR).filter(|path| !path.is_empty()) {
            config.history_file = PathBuf::from(path);
        }
        if let Some(prompt) = lookup(PROMPT_VAR) {
            config.prompt = prompt;
        }
        Ok(config)
    }
}
