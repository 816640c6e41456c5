use crate::dispatch;
use crate::error::{EventBusError, EventBusErrorExt};
use crate::event::{Event, EventPayload};
use crate::handler::{Handler, HandlerId};
use crate::registry::Registry;
use crate::wait_group::WaitGroup;
use herald_runtime::get_global_runtime;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tracing::{debug, trace};

static GLOBAL_BUS: OnceLock<EventBus> = OnceLock::new();

struct Inner {
    registry: Mutex<Registry>,
    in_flight: WaitGroup,
    runtime: Handle,
}

/// A thread-safe registry of named events and their handlers.
///
/// Cloning is cheap and every clone shares the same registry, dispatch
/// counter and runtime.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Inner>,
}

impl EventBus {
    /// Creates an empty bus bound to the current Tokio runtime, or to the
    /// process-wide runtime when called outside of one.
    #[must_use]
    pub fn new() -> Self {
        let runtime =
            Handle::try_current().unwrap_or_else(|_| get_global_runtime().handle().clone());
        Self::with_handle(runtime)
    }

    /// Creates an empty bus that schedules handlers on `runtime`.
    ///
    /// The bus does not keep the runtime alive. Once it shuts down, emits
    /// still count and release their dispatches but no handler runs; each
    /// one is logged at `warn` as dropped before completion.
    #[must_use]
    pub fn with_handle(runtime: Handle) -> Self {
        debug!(runtime = ?runtime.runtime_flavor(), "Event bus created");
        Self {
            inner: Arc::new(Inner {
                registry: Mutex::new(Registry::default()),
                in_flight: WaitGroup::default(),
                runtime,
            }),
        }
    }

    /// Creates an empty bus bound to the runtime of the calling thread.
    ///
    /// # Errors
    /// Returns [`EventBusError::Runtime`] when called outside a Tokio runtime.
    pub fn try_current() -> Result<Self, EventBusError> {
        let runtime = Handle::try_current().context("EventBus::try_current")?;
        Ok(Self::with_handle(runtime))
    }

    /// The process-wide bus, created on first use on the global runtime.
    pub fn global() -> &'static Self {
        GLOBAL_BUS.get_or_init(|| Self::with_handle(get_global_runtime().handle().clone()))
    }

    /// Returns the event named `name`, creating it on first request.
    ///
    /// Every call with the same name on this bus returns the same identity,
    /// also under concurrent first calls. Any string is a valid name.
    ///
    /// ```rust
    /// use herald_event_bus::EventBus;
    ///
    /// let bus = EventBus::new();
    /// assert_eq!(bus.create_event("ready"), bus.create_event("ready"));
    /// assert_ne!(bus.create_event("ready"), bus.create_event("done"));
    /// ```
    pub fn create_event(&self, name: &str) -> Event {
        let (event, created) = self.inner.registry.lock().create_event(name);
        if created {
            trace!(event = %event, "Event created");
        }
        event
    }

    /// Looks up an event without creating it.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<Event> {
        self.inner.registry.lock().event(name)
    }

    /// Known events in creation order.
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.inner.registry.lock().events()
    }

    /// Appends `handler` to the handlers of `event`.
    ///
    /// Registering the same handler twice makes it run twice per emit.
    pub fn on(&self, event: &Event, handler: Handler) -> HandlerId {
        let id = handler.id();
        let count = self.inner.registry.lock().add(event, handler);
        trace!(event = %event, handler = %id, count, "Handler registered");
        id
    }

    /// Removes every registration of `handler` from `event`.
    ///
    /// Matching is by [`HandlerId`]; a separately constructed handler with the
    /// same body is a different handler. Unknown handlers or events are ignored.
    pub fn off(&self, event: &Event, handler: &Handler) {
        self.off_id(event, handler.id());
    }

    /// Same as [`EventBus::off`], keyed by the id returned from [`EventBus::on`].
    pub fn off_id(&self, event: &Event, id: HandlerId) {
        let removed = self.inner.registry.lock().remove(event, id);
        if removed > 0 {
            trace!(event = %event, handler = %id, removed, "Handler removed");
        }
    }

    #[must_use]
    pub fn handler_count(&self, event: &Event) -> usize {
        self.inner.registry.lock().handler_count(event)
    }

    /// Emits `event` without positional arguments. See [`EventBus::emit_with_args`].
    pub fn emit(&self, event: &Event, payload: impl Into<EventPayload>) -> usize {
        self.emit_with_args(event, payload, std::iter::empty::<String>())
    }

    /// Schedules every handler currently registered on `event` and returns
    /// the number of dispatches started, without waiting for any of them.
    ///
    /// The handler list is snapshotted under the registry lock; handlers run
    /// outside of it, concurrently, in no particular order. Registrations
    /// changed after this call returns do not affect the dispatches it started.
    ///
    /// The count is of dispatches handed to the runtime, not of handlers that
    /// will run: if the bus's runtime has shut down, each dispatch is dropped
    /// unrun (and released from [`EventBus::wait`]) yet still counted here.
    ///
    /// ```rust
    /// use herald_event_bus::{EventBus, EventPayload, Handler};
    /// use std::sync::{Arc, Mutex};
    ///
    /// let bus = EventBus::new();
    /// let seen = Arc::new(Mutex::new(Vec::new()));
    /// let event = bus.create_event("greet");
    ///
    /// let sink = Arc::clone(&seen);
    /// bus.on(&event, Handler::new(move |payload: &EventPayload, args: &[String]| {
    ///     sink.lock().unwrap().push(format!("{} {}", payload.message, args.join(",")));
    /// }));
    ///
    /// assert_eq!(bus.emit_with_args(&event, "hello", ["a", "b"]), 1);
    /// bus.wait();
    /// assert_eq!(*seen.lock().unwrap(), ["hello a,b"]);
    /// ```
    pub fn emit_with_args<I, S>(
        &self,
        event: &Event,
        payload: impl Into<EventPayload>,
        args: I,
    ) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let snapshot = self.inner.registry.lock().snapshot(event);
        let Some(handlers) = snapshot else {
            trace!(event = %event, "Event dropped: no handlers registered");
            return 0;
        };

        let payload = Arc::new(payload.into());
        let args: Arc<[String]> = args.into_iter().map(Into::into).collect();

        for handler in handlers.iter() {
            let guard = self.inner.in_flight.add();
            dispatch::spawn(&self.inner.runtime, event, handler, &payload, &args, guard);
        }

        trace!(event = %event, count = handlers.len(), "Event dispatched");
        handlers.len()
    }

    /// Blocks the calling thread until no dispatch is in flight.
    ///
    /// The barrier is bus-wide and drains until zero: dispatches started by
    /// other threads, or by handlers, before the count reaches zero are
    /// waited for too. There is no timeout; a handler that never returns
    /// blocks this forever.
    ///
    /// Do not call this from inside an async task. Use
    /// [`EventBus::wait_async`] there.
    pub fn wait(&self) {
        self.inner.in_flight.wait();
    }

    /// Async form of [`EventBus::wait`]. Wrap it in `tokio::time::timeout`
    /// to bound the wait.
    pub async fn wait_async(&self) {
        self.inner.in_flight.wait_async().await;
    }

    /// Number of dispatches started and not yet finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.count()
    }

    /// Removes every handler registration and returns how many were removed.
    ///
    /// Events stay known. In-flight dispatches keep running; call
    /// [`EventBus::wait`] afterwards to drain them.
    pub fn shutdown(&self) -> usize {
        let removed = self.inner.registry.lock().clear_handlers();
        debug!(removed, in_flight = self.in_flight(), "Event bus handlers cleared");
        removed
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.inner.registry.lock().events().len())
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}
