//! Event bus.
//!
//! Components receive an `Arc<EventBus>` explicitly so independent scenes
//! (and tests) never share a bus. Handlers run synchronously on the
//! emitting task, in subscription order.

use parking_lot::RwLock;

use super::events::{AppEvent, EventCategory};

/// Which events a handler receives
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Every event.
    #[default]
    All,
    /// Events in any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Box<dyn Fn(AppEvent) + Send + Sync>;

/// Event bus carrying history, restore, catalog and notice events
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(EventFilter, EventHandler)>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to every matching handler.
    ///
    /// Returns how many handlers saw it.
    pub fn emit(&self, event: AppEvent) -> usize {
        let handlers = self.handlers.read();
        let mut delivered = 0;
        for (filter, handler) in handlers.iter() {
            if filter.matches(&event) {
                handler(event.clone());
                delivered += 1;
            }
        }

        if delivered == 0 {
            tracing::trace!("Event with no listeners: {}", event.description());
        }
        delivered
    }

    /// Register a handler for events passing `filter`.
    ///
    /// The handler must not subscribe to this bus itself.
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F)
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write();
        handlers.push((filter, Box::new(handler)));
        tracing::debug!("Event handler {} registered", handlers.len());
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.read().len())
            .finish()
    }
}
