use crate::{input::events::MapEvent, prelude::HashMap, prelude::VecDeque};

pub type EventCallback = Box<dyn Fn(&MapEvent) + Send + Sync>;

/// Queue of map events plus named listeners.
///
/// The engine queues what happens with [`EventManager::emit`]. Nothing is
/// delivered until [`EventManager::process_events`] drains the queue, which
/// keeps listener calls out of the engine's own mutation paths.
#[derive(Default)]
pub struct EventManager {
    listeners: HashMap<&'static str, Vec<EventCallback>>,
    queue: VecDeque<MapEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listens for a Leaflet-style event name (`"click"`, `"load"`, ...)
    pub fn on<F>(&mut self, event_name: &'static str, callback: F)
    where
        F: Fn(&MapEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_name)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn emit(&mut self, event: MapEvent) {
        log::trace!("queue {}", event.name());
        self.queue.push_back(event);
    }

    /// Hands every queued event to its listeners and returns them in order
    pub fn process_events(&mut self) -> Vec<MapEvent> {
        let drained: Vec<MapEvent> = self.queue.drain(..).collect();
        for event in &drained {
            self.listeners
                .get(event.name())
                .into_iter()
                .flatten()
                .for_each(|callback| callback(event));
        }
        drained
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("queue", &self.queue)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geo::LatLng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_listeners_see_only_their_event() {
        let mut manager = EventManager::new();
        let clicks = Arc::new(AtomicUsize::new(0));
        let counter = clicks.clone();
        manager.on("click", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit(MapEvent::Click {
            lat_lng: LatLng::new(1.0, 1.0),
        });
        manager.emit(MapEvent::Ready);
        assert_eq!(manager.pending(), 2);
        assert_eq!(clicks.load(Ordering::SeqCst), 0);

        let events = manager.process_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1], MapEvent::Ready);
        assert_eq!(clicks.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending(), 0);
        assert!(manager.process_events().is_empty());
    }
}
