//! # Event Bus
//!
//! An in-process, concurrent publish/subscribe bus keyed by event name.
//!
//! ## Overview
//!
//! Components register [`Handler`]s on named [`Event`]s; any component can
//! emit an event, which schedules every registered handler to run
//! concurrently on a Tokio runtime. [`EventBus::wait`] is a bus-wide barrier
//! that returns once every started handler invocation has finished.
//!
//! ## Features
//!
//! * **Identity-based events**: one [`Event`] per name per bus.
//! * **Identity-based removal**: handlers are removed by [`HandlerId`], all
//!   duplicates at once.
//! * **Fire and forget**: emit snapshots the handler list and returns
//!   immediately; handlers never run under the registry lock.
//! * **Blocking or async handlers**: blocking ones run on the blocking pool,
//!   async ones as tasks.
//! * **Panic tolerant accounting**: a panicking handler still releases its
//!   slot in the drain barrier.
//!
//! # Example
//!
//! ```rust
//! use herald_event_bus::{EventBus, EventPayload, Handler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let bus = EventBus::new();
//! let finished = bus.create_event("job:finished");
//!
//! let count = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&count);
//! let handler = Handler::new(move |_: &EventPayload, _: &[String]| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! bus.on(&finished, handler.clone());
//! bus.emit(&finished, "job 1 done");
//! bus.wait();
//! assert_eq!(count.load(Ordering::SeqCst), 1);
//!
//! bus.off(&finished, &handler);
//! assert_eq!(bus.emit(&finished, "job 2 done"), 0);
//! ```

mod bus;
mod dispatch;
mod error;
mod event;
mod handler;
mod registry;
mod wait_group;

pub use bus::EventBus;
pub use error::{EventBusError, EventBusErrorExt};
pub use event::{Event, EventPayload};
pub use handler::{Handler, HandlerId};
