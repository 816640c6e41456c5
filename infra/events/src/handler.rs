use crate::event::EventPayload;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_HANDLER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`Handler`], shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        Self(NEXT_HANDLER_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;
pub(crate) type BlockingFn = Arc<dyn Fn(&EventPayload, &[String]) + Send + Sync + 'static>;
pub(crate) type AsyncFn =
    Arc<dyn Fn(Arc<EventPayload>, Arc<[String]>) -> BoxFuture + Send + Sync + 'static>;

#[derive(Clone)]
pub(crate) enum Callable {
    Blocking(BlockingFn),
    Async(AsyncFn),
}

/// A callback registered on an event.
///
/// Every constructor call mints a new [`HandlerId`]. Clones keep the id, so
/// keep a clone around (or the id returned by
/// [`EventBus::on`](crate::EventBus::on)) to remove the registration later.
/// Wrapping the same closure twice yields two unrelated handlers.
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    callable: Callable,
}

impl Handler {
    /// Wraps a synchronous callback. It runs on the runtime's blocking pool,
    /// so it may sleep or do blocking I/O.
    ///
    /// ```rust
    /// use herald_event_bus::{EventPayload, Handler};
    ///
    /// let handler = Handler::new(|payload: &EventPayload, args: &[String]| {
    ///     println!("{} {args:?}", payload.message);
    /// });
    /// assert!(!handler.is_async());
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&EventPayload, &[String]) + Send + Sync + 'static,
    {
        Self { id: HandlerId::next(), callable: Callable::Blocking(Arc::new(f)) }
    }

    /// Wraps an async callback. Each invocation is spawned as a runtime task.
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<EventPayload>, Arc<[String]>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let callable: AsyncFn =
            Arc::new(move |payload: Arc<EventPayload>, args: Arc<[String]>| -> BoxFuture {
                Box::pin(f(payload, args))
            });
        Self { id: HandlerId::next(), callable: Callable::Async(callable) }
    }

    #[must_use]
    pub const fn id(&self) -> HandlerId {
        self.id
    }

    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self.callable, Callable::Async(_))
    }

    pub(crate) const fn callable(&self) -> &Callable {
        &self.callable
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &self.id)
            .field("async", &self.is_async())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &EventPayload, _: &[String]) {}

    #[test]
    fn clones_share_identity() {
        let handler = Handler::new(noop);
        let clone = handler.clone();
        assert_eq!(handler.id(), clone.id());
        assert_eq!(handler, clone);
    }

    #[test]
    fn identical_logic_gets_distinct_ids() {
        let a = Handler::new(noop);
        let b = Handler::new(noop);
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }

    #[test]
    fn async_flavour_is_reported() {
        let handler = Handler::from_async(|_payload, _args| async {});
        assert!(handler.is_async());
        assert!(format!("{handler:?}").contains("async: true"));
    }
}
