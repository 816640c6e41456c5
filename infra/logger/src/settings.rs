use serde::Deserialize;
use std::path::PathBuf;
use tracing_appender::rolling::Rotation;

pub(crate) const DEFAULT_MAX_FILES: usize = 10;

/// Rolling strategy for file output, as written in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(value: LogRotation) -> Self {
        match value {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

/// Deserializable logger settings, the `[logger]` section of the config file.
///
/// `level` accepts the usual filter names (`trace`, `debug`, `info`, `warn`,
/// `error`, `off`). File-only knobs (`rotation`, `max_files`, `json`) are
/// ignored unless `path` is set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: String,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub rotation: LogRotation,
    pub max_files: usize,
    pub json: bool,
    pub env_filter: Option<String>,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            path: None,
            rotation: LogRotation::Daily,
            max_files: DEFAULT_MAX_FILES,
            json: false,
            env_filter: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_keep_defaults() {
        let settings: LoggerSettings =
            serde_json::from_value(serde_json::json!({ "level": "debug", "rotation": "hourly" }))
                .expect("settings");

        assert_eq!(settings.level, "debug");
        assert_eq!(settings.rotation, LogRotation::Hourly);
        assert!(settings.console);
        assert_eq!(settings.max_files, DEFAULT_MAX_FILES);
        assert!(settings.path.is_none());
    }

    #[test]
    fn unknown_rotation_is_rejected() {
        let result = serde_json::from_value::<LoggerSettings>(serde_json::json!({
            "rotation": "weekly"
        }));
        assert!(result.is_err());
    }
}
