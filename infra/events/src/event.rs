use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Identity token for a named event.
///
/// Obtained from [`EventBus::create_event`](crate::EventBus::create_event).
/// Equality and hashing go by identity, not by name: two buses that both
/// create `"ready"` hand out two different events.
#[derive(Clone)]
pub struct Event {
    name: Arc<str>,
}

impl Event {
    pub(crate) fn new(name: Arc<str>) -> Self {
        Self { name }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.name).cast::<()>(), state);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Event").field(&&*self.name).finish()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Data delivered to every handler of one emit.
///
/// Positional arguments travel next to the payload, see
/// [`EventBus::emit_with_args`](crate::EventBus::emit_with_args).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPayload {
    pub message: String,
}

impl EventPayload {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<&str> for EventPayload {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for EventPayload {
    fn from(message: String) -> Self {
        Self { message }
    }
}
