//! Notifications the element sends to its host

use crate::core::geo::LatLng;
use crate::element::MapHandle;
use crate::prelude::{HashMap, VecDeque};
use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Resolves once the tile layer has finished loading the tiles it started on.
///
/// Resolves to `false` if the element went away before that happened.
#[derive(Clone)]
pub struct TilesLoaded {
    inner: Shared<oneshot::Receiver<()>>,
}

impl TilesLoaded {
    /// Creates the future and the sender that resolves it
    pub fn channel() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { inner: rx.shared() })
    }

    /// Whether loading finished, without waiting
    pub fn is_loaded(&self) -> bool {
        self.inner
            .clone()
            .now_or_never()
            .is_some_and(|result| result.is_ok())
    }
}

impl Future for TilesLoaded {
    type Output = bool;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        Pin::new(&mut self.inner).poll(cx).map(|result| result.is_ok())
    }
}

impl std::fmt::Debug for TilesLoaded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilesLoaded")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

pub const TILES_LOADING: &str = "tiles-loading";
pub const CENTER_UPDATED: &str = "center-updated";
pub const MAP_READY: &str = "map-ready";

/// Domain event and its payload
pub enum ElementEvent<B> {
    TilesLoading(TilesLoaded),
    CenterUpdated(LatLng),
    MapReady(MapHandle<B>),
}

impl<B> ElementEvent<B> {
    pub fn name(&self) -> &'static str {
        match self {
            ElementEvent::TilesLoading(_) => TILES_LOADING,
            ElementEvent::CenterUpdated(_) => CENTER_UPDATED,
            ElementEvent::MapReady(_) => MAP_READY,
        }
    }
}

impl<B> Clone for ElementEvent<B> {
    fn clone(&self) -> Self {
        match self {
            ElementEvent::TilesLoading(loaded) => ElementEvent::TilesLoading(loaded.clone()),
            ElementEvent::CenterUpdated(center) => ElementEvent::CenterUpdated(*center),
            ElementEvent::MapReady(map) => ElementEvent::MapReady(map.clone()),
        }
    }
}

impl<B> std::fmt::Debug for ElementEvent<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementEvent::TilesLoading(loaded) => f.debug_tuple("TilesLoading").field(loaded).finish(),
            ElementEvent::CenterUpdated(center) => {
                f.debug_tuple("CenterUpdated").field(center).finish()
            }
            ElementEvent::MapReady(_) => f.write_str("MapReady(..)"),
        }
    }
}

/// A dispatched event with its DOM propagation flags
pub struct Notification<B> {
    pub event: ElementEvent<B>,
    pub bubbles: bool,
    pub composed: bool,
}

impl<B> Clone for Notification<B> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            bubbles: self.bubbles,
            composed: self.composed,
        }
    }
}

impl<B> std::fmt::Debug for Notification<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("event", &self.event)
            .field("bubbles", &self.bubbles)
            .field("composed", &self.composed)
            .finish()
    }
}

impl<B> Notification<B> {
    /// Element notifications cross shadow boundaries and bubble
    pub fn new(event: ElementEvent<B>) -> Self {
        Self {
            event,
            bubbles: true,
            composed: true,
        }
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }
}

pub type NotificationCallback<B> = Box<dyn FnMut(&Notification<B>)>;

/// Synchronous listeners plus a queue for hosts that prefer polling
pub struct NotificationBus<B> {
    listeners: HashMap<&'static str, Vec<NotificationCallback<B>>>,
    queue: VecDeque<Notification<B>>,
}

impl<B> NotificationBus<B> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::default(),
            queue: VecDeque::new(),
        }
    }

    /// Registers a listener, returning `false` for names the element never emits
    pub fn on<F>(&mut self, name: &str, callback: F) -> bool
    where
        F: FnMut(&Notification<B>) + 'static,
    {
        let Some(name) = [TILES_LOADING, CENTER_UPDATED, MAP_READY]
            .into_iter()
            .find(|known| *known == name)
        else {
            return false;
        };

        self.listeners
            .entry(name)
            .or_default()
            .push(Box::new(callback));
        true
    }

    pub fn dispatch(&mut self, event: ElementEvent<B>) {
        let notification = Notification::new(event);
        log::debug!("dispatch {}", notification.name());

        if let Some(callbacks) = self.listeners.get_mut(notification.name()) {
            for callback in callbacks.iter_mut() {
                callback(&notification);
            }
        }
        self.queue.push_back(notification);
    }

    pub fn take(&mut self) -> Vec<Notification<B>> {
        self.queue.drain(..).collect()
    }
}

impl<B> Default for NotificationBus<B> {
    fn default() -> Self {
        Self::new()
    }
}
