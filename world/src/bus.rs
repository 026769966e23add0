//! Observer registry delivering events to per-kind subscribers.

use std::{collections::BTreeMap, fmt};

use realm_defence_core::{Event, EventKind};

type Handler = Box<dyn FnMut(&Event)>;

/// Routes published events to the handlers subscribed to their kind.
#[derive(Default)]
pub struct EventBus {
    subscribers: BTreeMap<EventKind, Vec<Handler>>,
    catch_all: Vec<Handler>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events of `kind`.
    pub fn subscribe(&mut self, kind: EventKind, handler: impl FnMut(&Event) + 'static) {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(handler));
    }

    /// Registers `handler` for every event.
    pub fn subscribe_all(&mut self, handler: impl FnMut(&Event) + 'static) {
        self.catch_all.push(Box::new(handler));
    }

    /// Number of handlers that will receive events of `kind`.
    #[must_use]
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len) + self.catch_all.len()
    }

    /// Delivers `events` in order and returns the number of handler calls.
    pub fn publish(&mut self, events: &[Event]) -> usize {
        let mut deliveries = 0;
        for event in events {
            if let Some(handlers) = self.subscribers.get_mut(&event.kind()) {
                for handler in handlers.iter_mut() {
                    handler(event);
                    deliveries += 1;
                }
            }
            for handler in self.catch_all.iter_mut() {
                handler(event);
                deliveries += 1;
            }
        }
        deliveries
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("kinds", &self.subscribers.keys().collect::<Vec<_>>())
            .field("catch_all", &self.catch_all.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn handlers_only_receive_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::LivesChanged, move |event| {
            sink.borrow_mut().push(event.clone());
        });

        let delivered = bus.publish(&[
            Event::HeroDied,
            Event::LivesChanged { remaining: 3 },
        ]);

        assert_eq!(delivered, 1);
        assert_eq!(*seen.borrow(), vec![Event::LivesChanged { remaining: 3 }]);
    }

    #[test]
    fn catch_all_handlers_see_everything() {
        let count = Rc::new(RefCell::new(0_usize));
        let mut bus = EventBus::new();
        let counter = Rc::clone(&count);
        bus.subscribe_all(move |_| *counter.borrow_mut() += 1);

        let _ = bus.publish(&[Event::HeroDied, Event::WaveCompleted { wave: 0 }]);
        assert_eq!(*count.borrow(), 2);
        assert_eq!(bus.subscriber_count(EventKind::TowerBuilt), 1);
    }
}
