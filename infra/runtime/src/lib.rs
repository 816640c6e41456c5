//! # Runtime
//!
//! Standardized [Tokio](https://tokio.rs) runtime construction for the workspace.
//!
//! The event bus runs blocking handlers on the runtime's blocking pool and async
//! handlers as tasks, so the shape of the runtime decides how much dispatch
//! parallelism is available. [`RuntimeConfig`] captures that shape and can be
//! loaded from configuration.
//!
//! ## Profiles
//! * **Default**: worker threads auto-detected, 512 blocking threads.
//! * **High Performance**: larger stacks, longer keep-alive, a wider blocking pool.
//! * **Memory Efficient**: half the workers and a narrow blocking pool.
//! * **Global**: a lazily built process runtime, see [`get_global_runtime`].
//!
//! ## Example
//!
//! ```rust
//! use herald_runtime::{RuntimeConfig, build_runtime_with_config};
//!
//! let config = RuntimeConfig::memory_efficient().with_thread_name("demo");
//! let runtime = build_runtime_with_config(&config)?;
//! let answer = runtime.block_on(async { 42 });
//! assert_eq!(answer, 42);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub use anyhow::Result;

use anyhow::anyhow;
use serde::Deserialize;
use std::{sync::OnceLock, thread::available_parallelism, time::Duration};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

/// The default number of worker threads if detection fails.
const DEFAULT_WORKER_THREADS: usize = 4;
const MAX_WORKER_THREADS: usize = 1024;
/// Tokio's own default for the blocking pool.
const DEFAULT_MAX_BLOCKING_THREADS: usize = 512;
const MAX_BLOCKING_THREADS: usize = 4096;
/// The default stack size for threads (3 `MiB`).
const DEFAULT_STACK_SIZE: usize = 3 * 1024 * 1024;
/// Minimum allowed stack size (1 `MiB`).
const MIN_STACK_SIZE: usize = 1024 * 1024;
/// Maximum allowed stack size (16 `MiB`).
const MAX_STACK_SIZE: usize = 16 * 1024 * 1024;
const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;
const DEFAULT_THREAD_NAME: &str = "herald-worker";

static WORKER_THREADS: OnceLock<usize> = OnceLock::new();

/// Detects the worker thread count from `TOKIO_WORKER_THREADS` or the hardware.
fn get_worker_threads() -> usize {
    *WORKER_THREADS.get_or_init(|| {
        std::env::var("TOKIO_WORKER_THREADS")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .filter(|&n| n > 0 && n <= MAX_WORKER_THREADS)
            .unwrap_or_else(|| {
                available_parallelism()
                    .map(std::num::NonZero::get)
                    .unwrap_or(DEFAULT_WORKER_THREADS)
            })
    })
}

fn thread_name_or_default(name: &str) -> String {
    if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name.to_owned() }
}

/// Configuration for the Tokio runtime.
///
/// Every field has a default, so a partial `[runtime]` section is enough.
/// Out-of-range values are clamped when the runtime is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub worker_threads: usize,
    /// Upper bound of the pool that blocking event handlers run on.
    pub max_blocking_threads: usize,
    pub stack_size: usize,
    pub thread_name: String,
    /// How long an idle thread stays alive, in seconds.
    pub keep_alive_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            max_blocking_threads: DEFAULT_MAX_BLOCKING_THREADS,
            stack_size: DEFAULT_STACK_SIZE,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
            keep_alive_secs: DEFAULT_KEEP_ALIVE_SECS,
        }
    }
}

impl RuntimeConfig {
    /// Preset for processes that dispatch many long-running handlers.
    #[must_use = "Use this configuration for high-throughput dispatch"]
    pub fn high_performance() -> Self {
        Self {
            worker_threads: get_worker_threads(),
            max_blocking_threads: 1024,
            stack_size: 4 * 1024 * 1024,
            thread_name: "herald-hp".to_owned(),
            keep_alive_secs: 300,
        }
    }

    /// Preset for processes where memory footprint matters more than fan-out.
    #[must_use = "Use this configuration for low-footprint processes"]
    pub fn memory_efficient() -> Self {
        Self {
            worker_threads: (get_worker_threads() / 2).max(1),
            max_blocking_threads: 64,
            stack_size: 2 * 1024 * 1024,
            thread_name: "herald-mem".to_owned(),
            keep_alive_secs: 30,
        }
    }

    #[must_use = "Customize the number of worker threads for the runtime"]
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.clamp(1, MAX_WORKER_THREADS);
        self
    }

    #[must_use = "Customize the size of the blocking pool"]
    pub fn with_max_blocking_threads(mut self, threads: usize) -> Self {
        self.max_blocking_threads = threads.clamp(1, MAX_BLOCKING_THREADS);
        self
    }

    #[must_use = "Customize the stack size for worker threads"]
    pub fn with_stack_size(mut self, size: usize) -> Self {
        self.stack_size = size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE);
        self
    }

    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = thread_name_or_default(&name.into());
        self
    }

    #[must_use = "Customize how long idle threads stay alive"]
    pub const fn with_keep_alive_secs(mut self, secs: u64) -> Self {
        self.keep_alive_secs = secs;
        self
    }

    #[must_use]
    pub const fn thread_keep_alive(&self) -> Duration {
        Duration::from_secs(self.keep_alive_secs)
    }

    /// Returns a copy with every field clamped into its supported range.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self {
            worker_threads: self.worker_threads.clamp(1, MAX_WORKER_THREADS),
            max_blocking_threads: self.max_blocking_threads.clamp(1, MAX_BLOCKING_THREADS),
            stack_size: self.stack_size.clamp(MIN_STACK_SIZE, MAX_STACK_SIZE),
            thread_name: thread_name_or_default(&self.thread_name),
            keep_alive_secs: self.keep_alive_secs,
        }
    }
}

/// Creates a multi-thread Tokio runtime from `config`.
///
/// The configuration is normalized first, so it never fails on out-of-range
/// values; all drivers (I/O, time) are enabled.
///
/// # Errors
///
/// Returns an error if Tokio cannot create the runtime, typically because
/// the OS refuses to spawn threads.
pub fn build_runtime_with_config(config: &RuntimeConfig) -> Result<Runtime> {
    let config = config.normalized();
    debug!(config = ?config, "Building tokio runtime");

    Builder::new_multi_thread()
        .worker_threads(config.worker_threads)
        .max_blocking_threads(config.max_blocking_threads)
        .thread_name(&config.thread_name)
        .thread_stack_size(config.stack_size)
        .thread_keep_alive(config.thread_keep_alive())
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to initialize runtime: {e}"))
}

/// Builds a runtime with the default [`RuntimeConfig`].
///
/// # Errors
///
/// See [`build_runtime_with_config`].
pub fn build_service_runtime() -> Result<Runtime> {
    let config = RuntimeConfig::default();
    info!(
        threads = config.worker_threads,
        blocking = config.max_blocking_threads,
        "Initializing service runtime"
    );
    build_runtime_with_config(&config)
}

static GLOBAL_RUNTIME: OnceLock<Runtime> = OnceLock::new();

/// Access the lazily initialized global process runtime.
///
/// Used by components that must schedule work but are called outside any
/// async context, such as an event bus created from plain `main` code.
///
/// # Panics
///
/// Panics if the runtime cannot be initialized (e.g., the OS refuses to
/// allocate threads). This is considered a fatal system error.
pub fn get_global_runtime() -> &'static Runtime {
    GLOBAL_RUNTIME.get_or_init(|| {
        build_service_runtime().expect("CRITICAL: Failed to initialize global process runtime")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_threads_validation() {
        let config = RuntimeConfig::default().with_worker_threads(0);
        assert_eq!(config.worker_threads, 1);

        let config = RuntimeConfig::default().with_worker_threads(2000);
        assert_eq!(config.worker_threads, MAX_WORKER_THREADS);
    }

    #[test]
    fn test_blocking_threads_validation() {
        let config = RuntimeConfig::default().with_max_blocking_threads(0);
        assert_eq!(config.max_blocking_threads, 1);

        let config = RuntimeConfig::default().with_max_blocking_threads(1_000_000);
        assert_eq!(config.max_blocking_threads, MAX_BLOCKING_THREADS);
    }

    #[test]
    fn test_stack_size_validation() {
        let config = RuntimeConfig::default().with_stack_size(100);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);

        let config = RuntimeConfig::default().with_stack_size(100 * 1024 * 1024);
        assert_eq!(config.stack_size, MAX_STACK_SIZE);
    }

    #[test]
    fn test_blank_thread_name_falls_back() {
        let config = RuntimeConfig::default().with_thread_name("   ");
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
    }

    #[test]
    fn test_normalized_clamps_deserialized_values() {
        let raw = serde_json::json!({ "worker_threads": 0, "stack_size": 1, "thread_name": "" });
        let config: RuntimeConfig = serde_json::from_value(raw).expect("runtime config");
        let config = config.normalized();

        assert_eq!(config.worker_threads, 1);
        assert_eq!(config.stack_size, MIN_STACK_SIZE);
        assert_eq!(config.thread_name, DEFAULT_THREAD_NAME);
        assert_eq!(config.max_blocking_threads, DEFAULT_MAX_BLOCKING_THREADS);
    }

    #[test]
    fn test_build_from_config_runs_blocking_work() {
        let config = RuntimeConfig::memory_efficient().with_worker_threads(1);
        let runtime = build_runtime_with_config(&config).expect("runtime");
        let value = runtime.block_on(async {
            tokio::task::spawn_blocking(|| 7).await.expect("blocking task")
        });
        assert_eq!(value, 7);
    }

    #[test]
    fn test_global_runtime_singleton() {
        let first = std::ptr::from_ref(get_global_runtime());
        let second = std::ptr::from_ref(get_global_runtime());
        assert_eq!(first, second);
    }
}
