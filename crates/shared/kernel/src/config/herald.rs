use herald_logger::LoggerSettings;
use herald_runtime::RuntimeConfig;
use serde::Deserialize;

/// Top-level configuration of a Herald binary.
///
/// ```toml
/// [logger]
/// level = "debug"
/// path = "logs"
/// rotation = "hourly"
///
/// [runtime]
/// worker_threads = 4
/// max_blocking_threads = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub logger: LoggerSettings,
    pub runtime: RuntimeConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: HeraldConfig =
            serde_json::from_value(serde_json::json!({ "runtime": { "thread_name": "bus" } }))
                .expect("config");

        assert_eq!(cfg.logger, LoggerSettings::default());
        assert_eq!(cfg.runtime.thread_name, "bus");
        assert_eq!(cfg.runtime.stack_size, RuntimeConfig::default().stack_size);
    }
}
