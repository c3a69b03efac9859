//! Calculator settings read from a TOML file.
//!
//! ```toml
//! [session]
//! passes = 3            # rounds of applying bindings to an expression, 1..=8
//! max_script_depth = 8  # nesting limit of `file` commands
//! prompt = "> "
//!
//! [logging]
//! level = "warn"        # off, error, warn, info, debug, trace
//! file = false          # also write algex_log_<timestamp>.txt
//! ```
//! Missing sections and keys take their default values.
use serde::Deserialize;
use simplelog::LevelFilter;
use std::fmt;
use std::path::Path;

pub const MAX_PASSES: usize = 8;

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigError::Parse(msg) => write!(f, "malformed config: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub passes: usize,
    pub max_script_depth: usize,
    pub prompt: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            passes: 3,
            max_script_depth: 8,
            prompt: "> ".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub file: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "warn".to_string(),
            file: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AlgexConfig {
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

/// maps a level name to a filter
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_lowercase().as_str() {
        "off" | "none" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

impl AlgexConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: AlgexConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_PASSES).contains(&self.session.passes) {
            return Err(ConfigError::Invalid(format!(
                "passes must be within 1..={}, got {}",
                MAX_PASSES, self.session.passes
            )));
        }
        if self.session.max_script_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_script_depth must be positive".to_string(),
            ));
        }
        if parse_level(&self.logging.level).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown log level {:?}",
                self.logging.level
            )));
        }
        Ok(())
    }
}
