mod herald;

pub use herald::HeraldConfig;

use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Base name of the config file looked up in the working directory when no
/// explicit path is given (`herald.toml`, `herald.yaml`, ...).
pub const DEFAULT_CONFIG_NAME: &str = "herald";
/// Prefix of environment overrides, e.g. `HERALD__LOGGER__LEVEL=debug`.
pub const ENV_PREFIX: &str = "HERALD";
const ENV_SEPARATOR: &str = "__";

/// Custom error type for config loading.
#[herald_derive::herald_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: With an explicit `path` the file must exist. Without one,
///    an optional `herald.*` file in the working directory is used if present.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with `HERALD__`.
///    Nested structures are accessed using double underscores (e.g., `HERALD__RUNTIME__WORKER_THREADS`
///    maps to `runtime.worker_threads`).
///
/// # Errors
/// This function will return an error if:
/// * An explicitly given configuration file cannot be found or parsed.
/// * The merged values do not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use herald_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_with_env(path.as_ref().map(AsRef::as_ref), env_source())
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

fn load_with_env<T>(path: Option<&Path>, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let file = match path {
        Some(path) => {
            info!("Loading config from {}", path.display());
            File::from(path).required(true)
        },
        None => {
            info!("Loading optional config '{DEFAULT_CONFIG_NAME}' with environment overrides");
            File::with_name(DEFAULT_CONFIG_NAME).required(false)
        },
    };

    let config = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_logger::LogRotation;
    use std::fs;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        env_source().source(Some(map))
    }

    #[test]
    fn env_overrides_file_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("herald.toml");
        fs::write(&path, "[logger]\nlevel = \"warn\"\n\n[runtime]\nworker_threads = 2\n")
            .expect("write config");

        let cfg: HeraldConfig = load_with_env(
            Some(&path),
            env(&[("HERALD__LOGGER__LEVEL", "debug"), ("HERALD__LOGGER__ROTATION", "hourly")]),
        )
        .expect("config");

        assert_eq!(cfg.logger.level, "debug");
        assert_eq!(cfg.logger.rotation, LogRotation::Hourly);
        assert_eq!(cfg.runtime.worker_threads, 2);
    }

    #[test]
    fn env_alone_is_enough_for_nested_numbers_and_bools() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").expect("write config");

        let cfg: HeraldConfig = load_with_env(
            Some(&path),
            env(&[
                ("HERALD__RUNTIME__MAX_BLOCKING_THREADS", "16"),
                ("HERALD__LOGGER__CONSOLE", "false"),
            ]),
        )
        .expect("config");

        assert_eq!(cfg.runtime.max_blocking_threads, 16);
        assert!(!cfg.logger.console);
    }

    #[test]
    fn unrelated_env_vars_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("herald.toml");
        fs::write(&path, "").expect("write config");

        let cfg: HeraldConfig =
            load_with_env(Some(&path), env(&[("OTHER__LOGGER__LEVEL", "trace")])).expect("config");
        assert_eq!(cfg, HeraldConfig::default());
    }

    #[test]
    fn invalid_env_value_is_reported_with_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("herald.toml");
        fs::write(&path, "").expect("write config");

        let err = load_with_env::<HeraldConfig>(
            Some(&path),
            env(&[("HERALD__LOGGER__ROTATION", "weekly")]),
        )
        .expect_err("unknown rotation");
        assert!(err.to_string().contains("Failed to deserialize config"));
    }
}
