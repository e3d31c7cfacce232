//! Synchronous, typed publish/subscribe.

use super::{Event, EventKind, ListenerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Event handler. Runs on the publisher's thread.
pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

type Registry = HashMap<EventKind, Vec<(ListenerId, Handler)>>;

/// Registry of handlers keyed by event kind.
///
/// Handlers for a kind run in registration order. The registry lock is
/// released before any handler runs, so handlers may publish or (un)subscribe
/// freely. Nothing guards against publish cycles.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Mutex<Registry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Register `handler` for `kind`. An existing handler from the same
    /// listener is replaced in place and keeps its position.
    pub fn subscribe<F>(&self, kind: EventKind, listener: ListenerId, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(handler);
        let mut registry = self.registry();
        let list = registry.entry(kind).or_default();
        match list.iter_mut().find(|(id, _)| *id == listener) {
            Some(slot) => slot.1 = handler,
            None => list.push((listener, handler)),
        }
    }

    /// Remove `listener`'s handler for `kind`. Returns whether one existed.
    pub fn unsubscribe(&self, kind: EventKind, listener: ListenerId) -> bool {
        let mut registry = self.registry();
        let Some(list) = registry.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(id, _)| *id != listener);
        before != list.len()
    }

    /// Remove every handler `listener` holds.
    pub fn unsubscribe_all(&self, listener: ListenerId) {
        for list in self.registry().values_mut() {
            list.retain(|(id, _)| *id != listener);
        }
    }

    /// Deliver `event` to every handler of its kind, synchronously.
    pub fn publish(&self, event: Event) {
        let handlers: Vec<Handler> = match self.registry().get(&event.kind()) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };
        tracing::trace!(kind = ?event.kind(), handlers = handlers.len(), "publish");
        for handler in handlers {
            handler(&event);
        }
    }

    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.registry().get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry();
        let counts: HashMap<&EventKind, usize> =
            registry.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("EventDispatcher")
            .field("handlers", &counts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log2 = Arc::clone(&log);
        let make = move |tag: &'static str| -> Handler {
            let log = Arc::clone(&log2);
            Arc::new(move |e: &Event| log.lock().unwrap().push(format!("{tag}:{:?}", e.kind())))
        };
        (log, make)
    }

    #[test]
    fn test_publish_in_registration_order() {
        let d = EventDispatcher::new();
        let (log, make) = recorder();
        let (a, b) = (ListenerId::next(), ListenerId::next());
        let ha = make("a");
        let hb = make("b");
        d.subscribe(EventKind::RefreshReady, b, move |e| hb(e));
        d.subscribe(EventKind::RefreshReady, a, move |e| ha(e));
        d.publish(Event::RefreshReady { is_reset: true });
        assert_eq!(
            *log.lock().unwrap(),
            vec!["b:RefreshReady".to_string(), "a:RefreshReady".to_string()]
        );
    }

    #[test]
    fn test_publish_only_matching_kind() {
        let d = EventDispatcher::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        d.subscribe(EventKind::SessionStarted, ListenerId::next(), move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        d.publish(Event::RefreshReady { is_reset: false });
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        d.publish(Event::SessionStarted);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_replaces_same_listener() {
        let d = EventDispatcher::new();
        let (log, make) = recorder();
        let id = ListenerId::next();
        let first = make("first");
        let second = make("second");
        d.subscribe(EventKind::SessionStarted, id, move |e| first(e));
        d.subscribe(EventKind::SessionStarted, id, move |e| second(e));
        assert_eq!(d.handler_count(EventKind::SessionStarted), 1);
        d.publish(Event::SessionStarted);
        assert_eq!(*log.lock().unwrap(), vec!["second:SessionStarted".to_string()]);
    }

    #[test]
    fn test_unsubscribe() {
        let d = EventDispatcher::new();
        let id = ListenerId::next();
        d.subscribe(EventKind::PairChanged, id, |_| {});
        d.subscribe(EventKind::SessionStarted, id, |_| {});
        assert!(d.unsubscribe(EventKind::PairChanged, id));
        assert!(!d.unsubscribe(EventKind::PairChanged, id));
        assert_eq!(d.handler_count(EventKind::SessionStarted), 1);
        d.unsubscribe_all(id);
        assert_eq!(d.handler_count(EventKind::SessionStarted), 0);
    }

    #[test]
    fn test_handler_may_publish() {
        let d = Arc::new(EventDispatcher::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&d);
        d.subscribe(EventKind::FetchStarted, ListenerId::next(), move |_| {
            inner.publish(Event::RefreshReady { is_reset: false });
        });
        let h = Arc::clone(&hits);
        d.subscribe(EventKind::RefreshReady, ListenerId::next(), move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        d.publish(Event::FetchStarted { is_reset: false });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_handlers() {
        let d = EventDispatcher::new();
        d.publish(Event::SessionStarted);
        assert_eq!(d.handler_count(EventKind::SessionStarted), 0);
    }
}
