//! Logger configuration
//!
//! A [`LoggerConfig`] is read once (from JSON and/or environment overrides)
//! and turned into a [`Logger`] with a single pipeline. Nothing reads
//! process settings after that point.

use super::error::{LoggerError, Result};
use super::formatter::{LevelFormatter, MessageFormatter, TimestampFormatter};
use super::log_level::LogLevel;
use super::logger::{DispatchMode, Logger};
use super::pipeline::Pipeline;
use super::producer::Producer;
use super::timestamp::TimestampFormat;
use crate::consumers::{
    ConsoleConsumer, RotatingFileConsumer, RotationPolicy, StartupRotationPolicy,
    TemporalRotationPolicy, TimeField,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`RotationConfig::folder`]
pub const ENV_FOLDER: &str = "LOG_PIPELINE_FOLDER";
/// Environment variable overriding [`RotationConfig::policy`]
pub const ENV_ROTATION_POLICY: &str = "LOG_PIPELINE_ROTATION_POLICY";
/// Environment variable overriding [`LoggerConfig::min_level`]
pub const ENV_MIN_LEVEL: &str = "LOG_PIPELINE_MIN_LEVEL";

pub const DEFAULT_FOLDER: &str = "logs";
pub const DEFAULT_STARTUP_PATTERN: &str = "Startup {TIMESTAMP}-{ID}.log";
pub const DEFAULT_TEMPORAL_PATTERN: &str = "Temporal {TIMESTAMP}.log";

/// Serializable form of [`DispatchMode`]
///
/// ```
/// use rust_log_pipeline::core::DispatchConfig;
///
/// let mode: DispatchConfig = serde_json::from_str(r#"{"mode": "asynchronous", "capacity": 512}"#).unwrap();
/// assert_eq!(mode, DispatchConfig::Asynchronous { capacity: Some(512) });
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DispatchConfig {
    #[default]
    Synchronous,
    Asynchronous {
        #[serde(default)]
        capacity: Option<usize>,
    },
}

impl From<DispatchConfig> for DispatchMode {
    fn from(config: DispatchConfig) -> Self {
        match config {
            DispatchConfig::Synchronous => DispatchMode::Synchronous,
            DispatchConfig::Asynchronous { capacity } => DispatchMode::Asynchronous { capacity },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub colors: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            colors: true,
        }
    }
}

fn default_policy() -> String {
    "startup".to_string()
}

fn default_file_timestamp() -> TimestampFormat {
    TimestampFormat::FileSafe
}

fn default_step_width() -> u32 {
    1
}

fn default_step_field() -> TimeField {
    TimeField::Second
}

/// Where and how rotated log files are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationConfig {
    pub folder: PathBuf,

    /// `startup` or `temporal`, case-insensitive
    #[serde(default = "default_policy")]
    pub policy: String,

    /// Defaults depend on the policy
    #[serde(default)]
    pub name_pattern: Option<String>,

    #[serde(default = "default_file_timestamp")]
    pub timestamp_format: TimestampFormat,

    /// Temporal policy only
    #[serde(default = "default_step_width")]
    pub step_width: u32,

    /// Temporal policy only
    #[serde(default = "default_step_field")]
    pub step_field: TimeField,
}

impl RotationConfig {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            policy: default_policy(),
            name_pattern: None,
            timestamp_format: default_file_timestamp(),
            step_width: default_step_width(),
            step_field: default_step_field(),
        }
    }

    pub fn build_policy(&self) -> Result<Box<dyn RotationPolicy>> {
        match self.policy.to_ascii_lowercase().as_str() {
            "startup" => {
                let pattern = self.name_pattern.as_deref().unwrap_or(DEFAULT_STARTUP_PATTERN);
                Ok(Box::new(StartupRotationPolicy::new(
                    pattern,
                    self.timestamp_format.clone(),
                )?))
            }
            "temporal" => {
                let pattern = self.name_pattern.as_deref().unwrap_or(DEFAULT_TEMPORAL_PATTERN);
                Ok(Box::new(TemporalRotationPolicy::new(
                    pattern,
                    self.timestamp_format.clone(),
                    self.step_width,
                    self.step_field,
                )?))
            }
            _ => Err(LoggerError::config(
                "RotationConfig",
                format!("Invalid value for rotation policy: {}", self.policy),
            )),
        }
    }

    pub fn build_consumer(&self) -> Result<RotatingFileConsumer> {
        RotatingFileConsumer::new(&self.folder, self.build_policy()?)
    }
}

/// Top-level configuration for a single-pipeline logger
///
/// # Example
///
/// ```
/// use rust_log_pipeline::core::LoggerConfig;
/// use rust_log_pipeline::LogLevel;
///
/// let config = LoggerConfig::from_json_str(r#"{
///     "min_level": "Debug",
///     "dispatch": { "mode": "asynchronous" },
///     "console": { "enabled": true, "colors": false }
/// }"#).unwrap();
/// assert_eq!(config.min_level, LogLevel::Debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub dispatch: DispatchConfig,
    pub console: Option<ConsoleConfig>,
    pub rotation: Option<RotationConfig>,
    /// Timestamp format of rendered entries
    pub timestamp_format: TimestampFormat,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            dispatch: DispatchConfig::default(),
            console: Some(ConsoleConfig::default()),
            rotation: None,
            timestamp_format: TimestampFormat::default(),
        }
    }
}

impl LoggerConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            LoggerError::io_operation(
                "reading logger configuration",
                format!("cannot read '{}'", path.display()),
                e,
            )
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply settings from `lookup`, keyed by the `LOG_PIPELINE_*` names.
    ///
    /// A folder or policy override creates a rotation section when none
    /// is configured.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(ENV_MIN_LEVEL) {
            self.min_level = level
                .parse()
                .map_err(|e: String| LoggerError::config(ENV_MIN_LEVEL, e))?;
        }
        if let Some(folder) = lookup(ENV_FOLDER) {
            match self.rotation.as_mut() {
                Some(rotation) => rotation.folder = PathBuf::from(folder),
                None => self.rotation = Some(RotationConfig::new(folder)),
            }
        }
        if let Some(policy) = lookup(ENV_ROTATION_POLICY) {
            self.rotation
                .get_or_insert_with(|| RotationConfig::new(DEFAULT_FOLDER))
                .policy = policy;
        }
        Ok(())
    }

    /// [`apply_overrides`](Self::apply_overrides) from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> Result<()> {
        self.timestamp_format.validate()?;
        if let Some(rotation) = &self.rotation {
            rotation.build_policy()?;
        }
        if !self.console_enabled() && self.rotation.is_none() {
            return Err(LoggerError::config(
                "LoggerConfig",
                "at least one consumer must be configured",
            ));
        }
        Ok(())
    }

    fn console_enabled(&self) -> bool {
        self.console.as_ref().is_some_and(|console| console.enabled)
    }

    /// `[<timestamp> <LEVEL>] <message>` with the configured timestamp format
    pub fn producer(&self) -> Producer {
        Producer::new()
            .text("[")
            .formatter(TimestampFormatter::with_format(self.timestamp_format.clone()))
            .text(" ")
            .formatter(LevelFormatter::new())
            .text("] ")
            .formatter(MessageFormatter)
    }

    pub fn into_logger(self) -> Result<Logger> {
        self.validate()?;

        let mut pipeline = Pipeline::builder().producer(self.producer());
        if let Some(console) = self.console.as_ref().filter(|console| console.enabled) {
            pipeline = pipeline.consumer(ConsoleConsumer::with_colors(console.colors));
        }
        if let Some(rotation) = &self.rotation {
            pipeline = pipeline.consumer(rotation.build_consumer()?);
        }

        Logger::builder()
            .pipeline(pipeline.build()?)
            .min_level(self.min_level)
            .dispatch(self.dispatch.into())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_rotation_section() {
        let config = LoggerConfig::from_json_str(
            r#"{
                "console": null,
                "rotation": {
                    "folder": "/tmp/app-logs",
                    "policy": "Temporal",
                    "step_width": 2,
                    "step_field": "second"
                }
            }"#,
        )
        .unwrap();

        let rotation = config.rotation.as_ref().unwrap();
        assert_eq!(rotation.folder, PathBuf::from("/tmp/app-logs"));
        assert_eq!(rotation.timestamp_format, TimestampFormat::FileSafe);
        assert_eq!(rotation.build_policy().unwrap().name(), "temporal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_policy_name() {
        let mut rotation = RotationConfig::new("logs");
        rotation.policy = "weekly".into();
        let err = rotation.build_policy().err().unwrap();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for RotationConfig: Invalid value for rotation policy: weekly"
        );
    }

    #[test]
    fn test_malformed_json() {
        let err = LoggerConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LoggerError::JsonError(_)));
    }

    #[test]
    fn test_requires_a_consumer() {
        let config = LoggerConfig {
            console: Some(ConsoleConfig {
                enabled: false,
                colors: false,
            }),
            ..LoggerConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(config.into_logger().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = LoggerConfig::default();
        config
            .apply_overrides(lookup(&[
                (ENV_MIN_LEVEL, "warning"),
                (ENV_FOLDER, "/var/log/app"),
                (ENV_ROTATION_POLICY, "temporal"),
            ]))
            .unwrap();

        assert_eq!(config.min_level, LogLevel::Warn);
        let rotation = config.rotation.unwrap();
        assert_eq!(rotation.folder, PathBuf::from("/var/log/app"));
        assert_eq!(rotation.policy, "temporal");

        let mut config = LoggerConfig::default();
        let err = config
            .apply_overrides(lookup(&[(ENV_MIN_LEVEL, "LOGGER")]))
            .unwrap_err();
        assert!(err.to_string().contains("reserved"));
    }

    #[test]
    fn test_into_logger_writes_rotated_file() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig {
            console: None,
            rotation: Some(RotationConfig {
                name_pattern: Some("run-{ID}.log".into()),
                ..RotationConfig::new(dir.path())
            }),
            ..LoggerConfig::default()
        };

        let logger = config.into_logger().unwrap();
        logger.info("configured");
        logger.shutdown();

        let written = std::fs::read_to_string(dir.path().join("run-1.log")).unwrap();
        assert!(written.contains(" INFO] configured"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logger.json");
        let config = LoggerConfig {
            dispatch: DispatchConfig::Asynchronous { capacity: Some(64) },
            ..LoggerConfig::default()
        };
        std::fs::write(&path, config.to_json_string().unwrap()).unwrap();

        assert_eq!(LoggerConfig::from_file(&path).unwrap(), config);
        assert!(LoggerConfig::from_file(dir.path().join("missing.json")).is_err());
    }
}
