//! A small simulated job pipeline wired over the event bus.
//!
//! `job:queued` is handled by a worker that simulates the job and then emits
//! `job:finished` or `job:failed` from inside its own dispatch. Progress and
//! failure reporting are separate subscribers of those two events.

use herald_event_bus::{Event, EventBus, EventPayload, Handler};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

pub(crate) const JOB_QUEUED: &str = "job:queued";
pub(crate) const JOB_FINISHED: &str = "job:finished";
pub(crate) const JOB_FAILED: &str = "job:failed";

const OUTCOME_OK: &str = "ok";
const OUTCOME_FAIL: &str = "fail";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Job {
    pub(crate) id: String,
    pub(crate) duration: Duration,
    pub(crate) fails: bool,
}

impl Job {
    pub(crate) fn new(id: impl Into<String>, duration: Duration) -> Self {
        Self { id: id.into(), duration, fails: false }
    }

    #[must_use]
    pub(crate) const fn failing(mut self, fails: bool) -> Self {
        self.fails = fails;
        self
    }

    fn args(&self) -> [String; 3] {
        let outcome = if self.fails { OUTCOME_FAIL } else { OUTCOME_OK };
        [self.id.clone(), self.duration.as_millis().to_string(), outcome.to_owned()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub(crate) finished: usize,
    /// Ids of failed jobs, sorted.
    pub(crate) failed: Vec<String>,
}

struct Events {
    queued: Event,
    finished: Event,
    failed: Event,
}

/// Runs `jobs` through the bus, waits for every dispatch to drain and
/// unregisters the pipeline's handlers again.
pub(crate) fn run(bus: &EventBus, jobs: &[Job]) -> Summary {
    let events = Events {
        queued: bus.create_event(JOB_QUEUED),
        finished: bus.create_event(JOB_FINISHED),
        failed: bus.create_event(JOB_FAILED),
    };

    let progress = Arc::new(AtomicUsize::new(0));
    let failures = Arc::new(Mutex::new(Vec::new()));

    let worker = worker(bus.clone(), events.finished.clone(), events.failed.clone());
    let counter = progress_counter(Arc::clone(&progress), jobs.len());
    let reporter = failure_reporter(Arc::clone(&failures));

    bus.on(&events.queued, worker.clone());
    bus.on(&events.finished, counter.clone());
    bus.on(&events.failed, reporter.clone());

    for job in jobs {
        bus.emit_with_args(&events.queued, format!("run {}", job.id), job.args());
    }
    info!(jobs = jobs.len(), "Jobs queued");

    bus.wait();

    bus.off(&events.queued, &worker);
    bus.off(&events.finished, &counter);
    bus.off(&events.failed, &reporter);

    let mut failed = std::mem::take(&mut *failures.lock());
    failed.sort();
    Summary { finished: progress.load(Ordering::SeqCst), failed }
}

fn worker(bus: EventBus, finished: Event, failed: Event) -> Handler {
    Handler::new(move |payload: &EventPayload, args: &[String]| {
        let [id, millis, outcome] = args else {
            warn!(args = ?args, "Malformed job arguments");
            return;
        };

        debug!(job = %id, message = %payload.message, "Job started");
        std::thread::sleep(Duration::from_millis(millis.parse().unwrap_or_default()));

        if outcome == OUTCOME_FAIL {
            bus.emit_with_args(&failed, format!("{id} failed"), [id.clone()]);
        } else {
            bus.emit_with_args(&finished, format!("{id} finished"), [id.clone()]);
        }
    })
}

fn progress_counter(progress: Arc<AtomicUsize>, total: usize) -> Handler {
    Handler::new(move |_: &EventPayload, args: &[String]| {
        let done = progress.fetch_add(1, Ordering::SeqCst) + 1;
        info!(job = ?args.first(), done, total, "Job finished");
    })
}

fn failure_reporter(failures: Arc<Mutex<Vec<String>>>) -> Handler {
    Handler::new(move |payload: &EventPayload, args: &[String]| {
        warn!(message = %payload.message, "Job failed");
        if let Some(id) = args.first() {
            failures.lock().push(id.clone());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_runtime::{RuntimeConfig, build_runtime_with_config};

    #[test]
    fn pipeline_reports_finished_and_failed_jobs() {
        let runtime = build_runtime_with_config(&RuntimeConfig::memory_efficient())
            .expect("runtime");
        let bus = EventBus::with_handle(runtime.handle().clone());

        let jobs = [
            Job::new("a", Duration::from_millis(10)),
            Job::new("b", Duration::from_millis(30)).failing(true),
            Job::new("c", Duration::from_millis(20)),
        ];

        let summary = run(&bus, &jobs);

        assert_eq!(summary, Summary { finished: 2, failed: vec!["b".to_owned()] });
        assert_eq!(bus.in_flight(), 0);

        let queued = bus.event(JOB_QUEUED).expect("created by run");
        assert_eq!(bus.handler_count(&queued), 0);
    }

    #[test]
    fn malformed_jobs_are_skipped() {
        let runtime = build_runtime_with_config(&RuntimeConfig::memory_efficient())
            .expect("runtime");
        let bus = EventBus::with_handle(runtime.handle().clone());
        let finished = bus.create_event(JOB_FINISHED);
        let failed = bus.create_event(JOB_FAILED);
        let queued = bus.create_event(JOB_QUEUED);

        bus.on(&queued, worker(bus.clone(), finished, failed));
        assert_eq!(bus.emit_with_args(&queued, "run ?", ["only-an-id"]), 1);
        bus.wait();

        assert_eq!(bus.in_flight(), 0);
    }

    #[test]
    fn job_args_encode_outcome() {
        let job = Job::new("x", Duration::from_millis(5)).failing(true);
        assert_eq!(job.args(), ["x".to_owned(), "5".to_owned(), "fail".to_owned()]);
    }
}
