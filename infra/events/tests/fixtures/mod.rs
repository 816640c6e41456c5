#![allow(dead_code)]

use herald_event_bus::{EventPayload, Handler};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// One recorded invocation: the payload message and the positional arguments.
pub type Call = (String, Vec<String>);

#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub fn handler(&self) -> Handler {
        let count = Arc::clone(&self.0);
        Handler::new(move |_: &EventPayload, _: &[String]| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct Recorder(Arc<Mutex<Vec<Call>>>);

impl Recorder {
    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn handler(&self) -> Handler {
        let calls = Arc::clone(&self.0);
        Handler::new(move |payload: &EventPayload, args: &[String]| {
            calls.lock().push((payload.message.clone(), args.to_vec()));
        })
    }
}

pub fn sleeping_handler(duration: Duration) -> Handler {
    Handler::new(move |_: &EventPayload, _: &[String]| std::thread::sleep(duration))
}
