//! Kernel utilities shared by Herald binaries.
//! Keep this crate lightweight; it owns layered config loading and the
//! top-level [`HeraldConfig`] aggregate.
//!
//! ## Config loading
//! ```rust,no_run
//! use herald_kernel::{HeraldConfig, config::load_config};
//!
//! let cfg: HeraldConfig = load_config(Some("herald.toml")).unwrap();
//! assert!(cfg.runtime.worker_threads > 0);
//! ```
pub mod config;

pub use config::HeraldConfig;
