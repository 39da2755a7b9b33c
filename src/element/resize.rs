//! Window-level event source and the element's resize subscription

use crate::runtime::TimerId;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Signals a window can broadcast to its listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowSignal {
    Resize,
}

/// Handle of one window subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Default)]
struct Listeners {
    senders: Vec<(ListenerId, Sender<WindowSignal>)>,
    next_id: u64,
}

/// Shared source of window signals.
///
/// Clones refer to the same window. On the web the binding forwards DOM
/// `resize` events here; elsewhere hosts dispatch signals themselves.
#[derive(Debug, Clone, Default)]
pub struct WindowEvents {
    listeners: Arc<Mutex<Listeners>>,
}

impl WindowEvents {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a listener; signals dispatched from now on arrive on the receiver
    pub fn subscribe(&self) -> (ListenerId, Receiver<WindowSignal>) {
        let (tx, rx) = unbounded();
        let mut listeners = self.lock();
        listeners.next_id += 1;
        let id = ListenerId(listeners.next_id);
        listeners.senders.push((id, tx));
        (id, rx)
    }

    /// Removes a listener, returning whether it was subscribed
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.senders.len();
        listeners.senders.retain(|(listener, _)| *listener != id);
        listeners.senders.len() != before
    }

    /// Broadcasts a signal, returning how many listeners received it
    pub fn dispatch(&self, signal: WindowSignal) -> usize {
        let mut listeners = self.lock();
        // receivers that were dropped without unsubscribing are pruned here
        listeners
            .senders
            .retain(|(_, sender)| sender.send(signal).is_ok());
        listeners.senders.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().senders.len()
    }
}

/// The element's subscription to window resizes, with its debounce state
#[derive(Debug)]
pub struct ResizeListener {
    id: ListenerId,
    receiver: Receiver<WindowSignal>,
    /// Trailing debounce timer, if a burst is in progress
    pub(crate) pending: Option<TimerId>,
}

impl ResizeListener {
    pub fn subscribe(window: &WindowEvents) -> Self {
        let (id, receiver) = window.subscribe();
        Self {
            id,
            receiver,
            pending: None,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Takes every resize signal received so far
    pub fn drain(&self) -> usize {
        let mut count = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(WindowSignal::Resize) => count += 1,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reaches_subscribers() {
        let window = WindowEvents::new();
        let first = ResizeListener::subscribe(&window);
        let second = ResizeListener::subscribe(&window.clone());

        assert_eq!(window.dispatch(WindowSignal::Resize), 2);
        assert_eq!(window.dispatch(WindowSignal::Resize), 2);

        assert_eq!(first.drain(), 2);
        assert_eq!(second.drain(), 2);
        assert_eq!(first.drain(), 0);
    }

    #[test]
    fn test_unsubscribe() {
        let window = WindowEvents::new();
        let listener = ResizeListener::subscribe(&window);
        assert_eq!(window.listener_count(), 1);

        assert!(window.unsubscribe(listener.id()));
        assert!(!window.unsubscribe(listener.id()));
        assert_eq!(window.dispatch(WindowSignal::Resize), 0);
        assert_eq!(listener.drain(), 0);
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let window = WindowEvents::new();
        let listener = ResizeListener::subscribe(&window);
        drop(listener);

        assert_eq!(window.listener_count(), 1);
        assert_eq!(window.dispatch(WindowSignal::Resize), 0);
        assert_eq!(window.listener_count(), 0);
    }
}
