use crate::event::{Event, EventPayload};
use crate::handler::{Callable, Handler, HandlerId};
use crate::wait_group::GroupGuard;
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{trace, warn};

/// One scheduled handler invocation.
///
/// Owns the wait group slot taken at emit time. The slot is released when
/// this value drops, which happens after the handler returns, while a panic
/// unwinds out of it, or when the runtime discards the task unrun.
pub(crate) struct Dispatch {
    event: Event,
    handler: HandlerId,
    finished: bool,
    _guard: GroupGuard,
}

impl Dispatch {
    fn finish(mut self) {
        self.finished = true;
        trace!(event = %self.event, handler = %self.handler, "Handler finished");
    }
}

impl Drop for Dispatch {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let (event, handler) = (&self.event, self.handler);
        if std::thread::panicking() {
            warn!(event = %event, handler = %handler, "Handler panicked");
        } else {
            warn!(event = %event, handler = %handler, "Handler dropped before completion");
        }
    }
}

/// Schedules `handler` on `runtime`, moving `guard` into the execution unit.
pub(crate) fn spawn(
    runtime: &Handle,
    event: &Event,
    handler: &Handler,
    payload: &Arc<EventPayload>,
    args: &Arc<[String]>,
    guard: GroupGuard,
) {
    let dispatch =
        Dispatch { event: event.clone(), handler: handler.id(), finished: false, _guard: guard };
    let payload = Arc::clone(payload);
    let args = Arc::clone(args);

    match handler.callable() {
        Callable::Blocking(f) => {
            let f = Arc::clone(f);
            drop(runtime.spawn_blocking(move || {
                f(&payload, &args);
                dispatch.finish();
            }));
        },
        Callable::Async(f) => {
            let f = Arc::clone(f);
            drop(runtime.spawn(async move {
                f(payload, args).await;
                dispatch.finish();
            }));
        },
    }
}
