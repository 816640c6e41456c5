mod pipeline;

use anyhow::Context;
use herald_event_bus::EventBus;
use herald_kernel::{HeraldConfig, config::load_config};
use herald_logger::Logger;
use herald_runtime::build_runtime_with_config;
use pipeline::Job;
use std::time::Duration;
use tracing::info;

const DEMO_JOBS: usize = 8;

fn main() -> anyhow::Result<()> {
    let path = std::env::args_os().nth(1);
    let cfg: HeraldConfig =
        load_config(path.as_ref()).context("Critical: Configuration is malformed")?;

    let _log = Logger::from_settings(env!("CARGO_PKG_NAME"), &cfg.logger)?;
    let runtime = build_runtime_with_config(&cfg.runtime)?;
    let bus = EventBus::with_handle(runtime.handle().clone());

    let jobs: Vec<Job> = (1..=DEMO_JOBS)
        .map(|n| {
            let millis = u64::try_from(n * 25).unwrap_or(u64::MAX);
            Job::new(format!("job-{n}"), Duration::from_millis(millis)).failing(n % 3 == 0)
        })
        .collect();

    let summary = pipeline::run(&bus, &jobs);
    info!(finished = summary.finished, failed = ?summary.failed, "Pipeline drained");

    Ok(())
}
