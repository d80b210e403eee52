//! Synchronous publish/subscribe.

use std::fmt;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Delivers each published event to every handler, in subscription order.
pub struct EventBus<E> {
    handlers: Vec<(SubscriptionId, Handler<E>)>,
    next_id: u64,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: impl Fn(&E) + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        self.handlers.len() != before
    }

    pub fn publish(&self, event: &E) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn delivers_until_unsubscribed() {
        let mut bus = EventBus::<u32>::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&seen);
        let id = bus.subscribe(move |v| {
            counter.fetch_add(*v as usize, Ordering::SeqCst);
        });
        bus.publish(&2);
        bus.publish(&3);
        assert_eq!(seen.load(Ordering::SeqCst), 5);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&10);
        assert_eq!(seen.load(Ordering::SeqCst), 5);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn ids_are_unique() {
        let mut bus = EventBus::<()>::new();
        let a = bus.subscribe(|_| {});
        let b = bus.subscribe(|_| {});
        assert_ne!(a, b);
        assert!(bus.unsubscribe(a));
        assert_eq!(bus.subscriber_count(), 1);
    }
}
