use crate::event::Event;
use crate::handler::{Handler, HandlerId};
use fxhash::FxHashMap;
use std::sync::Arc;

/// Name table plus per-event handler lists.
///
/// Handler lists are copy-on-write `Arc` slices: a dispatch snapshot is one
/// refcount bump, and mutations never disturb snapshots already handed out.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    events: FxHashMap<Arc<str>, Event>,
    order: Vec<Event>,
    handlers: FxHashMap<Event, Arc<[Handler]>>,
}

impl Registry {
    /// Returns the event for `name` and whether it was created by this call.
    pub(crate) fn create_event(&mut self, name: &str) -> (Event, bool) {
        if let Some(event) = self.events.get(name) {
            return (event.clone(), false);
        }

        let name: Arc<str> = Arc::from(name);
        let event = Event::new(Arc::clone(&name));
        self.events.insert(name, event.clone());
        self.order.push(event.clone());
        (event, true)
    }

    pub(crate) fn event(&self, name: &str) -> Option<Event> {
        self.events.get(name).cloned()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.order.clone()
    }

    /// Appends `handler`, returning the new length of the event's list.
    pub(crate) fn add(&mut self, event: &Event, handler: Handler) -> usize {
        let list = self.handlers.entry(event.clone()).or_insert_with(|| Arc::from([]));
        let mut next = Vec::with_capacity(list.len() + 1);
        next.extend(list.iter().cloned());
        next.push(handler);
        *list = next.into();
        list.len()
    }

    /// Removes every registration of `id`, returning how many were removed.
    /// An emptied list is dropped from the map.
    pub(crate) fn remove(&mut self, event: &Event, id: HandlerId) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            return 0;
        };

        let kept: Vec<Handler> = list.iter().filter(|h| h.id() != id).cloned().collect();
        let removed = list.len() - kept.len();

        if kept.is_empty() {
            self.handlers.remove(event);
        } else if removed > 0 {
            *list = kept.into();
        }
        removed
    }

    pub(crate) fn snapshot(&self, event: &Event) -> Option<Arc<[Handler]>> {
        self.handlers.get(event).map(Arc::clone)
    }

    pub(crate) fn handler_count(&self, event: &Event) -> usize {
        self.handlers.get(event).map_or(0, |list| list.len())
    }

    /// Drops all handler lists, returning the number of registrations removed.
    pub(crate) fn clear_handlers(&mut self) -> usize {
        self.handlers.drain().map(|(_, list)| list.len()).sum()
    }

    #[cfg(test)]
    pub(crate) fn has_entry(&self, event: &Event) -> bool {
        self.handlers.contains_key(event)
    }
}
