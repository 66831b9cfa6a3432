use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::registry::{Callback, Registry, SubscriberId};
use super::subscriber::{EventSubscriber, Subscription};

/// Identifies a publisher.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PublisherId(u64);

impl PublisherId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct QueuedEvent {
    type_id: TypeId,
    type_name: &'static str,
    payload: Box<dyn Any + Send>,
}

/// Cloneable handle that queues events on a publisher from any thread.
///
/// Queued events are dispatched on the publisher's thread by the next
/// `EventPublisher::process`.
#[derive(Clone)]
pub struct EventSender {
    tx: flume::Sender<QueuedEvent>,
}

impl EventSender {
    /// Queues `event`. Returns `false` when the publisher is gone.
    pub fn send<E: Send + 'static>(&self, event: E) -> bool {
        let queued = QueuedEvent {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            payload: Box::new(event),
        };

        if let Err(e) = self.tx.send(queued) {
            log::error!("failed to queue {}: publisher dropped", e.into_inner().type_name);
            return false;
        }
        true
    }
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("pending", &self.tx.len())
            .finish()
    }
}

/// Typed publish/subscribe hub.
///
/// Callbacks are keyed by the Rust type of the event. `publish_sync`
/// dispatches immediately; `publish` queues until `process`.
pub struct EventPublisher {
    id: PublisherId,
    registry: Rc<RefCell<Registry>>,
    tx: flume::Sender<QueuedEvent>,
    rx: flume::Receiver<QueuedEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self {
            id: PublisherId::next(),
            registry: Rc::new(RefCell::new(Registry::default())),
            tx,
            rx,
        }
    }

    pub fn id(&self) -> PublisherId {
        self.id
    }

    /// Registers a standalone callback for `E`.
    ///
    /// The callback stays registered until the returned handle is dropped.
    pub fn subscribe<E, F>(&self, callback: F) -> Subscription
    where
        E: 'static,
        F: Fn(&E) + 'static,
    {
        self.subscribe_as(SubscriberId::next(), callback)
    }

    pub(crate) fn subscribe_as<E, F>(&self, owner: SubscriberId, callback: F) -> Subscription
    where
        E: 'static,
        F: Fn(&E) + 'static,
    {
        let type_id = TypeId::of::<E>();
        let erased: Callback = Rc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });

        let handler = self.registry.borrow_mut().insert(type_id, owner, erased);
        log::trace!("subscribed to {}", std::any::type_name::<E>());

        Subscription::new(self.id, Rc::downgrade(&self.registry), type_id, handler, owner)
    }

    /// Invokes every callback registered for `E`, in registration order.
    pub fn publish_sync<E: 'static>(&self, event: E) {
        self.dispatch(TypeId::of::<E>(), &event);
    }

    /// Queues `event` for the next `process` call. No callback runs now.
    pub fn publish<E: Send + 'static>(&self, event: E) {
        let queued = QueuedEvent {
            type_id: TypeId::of::<E>(),
            type_name: std::any::type_name::<E>(),
            payload: Box::new(event),
        };
        // The receiver lives in `self`, so the channel cannot be disconnected.
        let _ = self.tx.send(queued);
    }

    /// Dispatches every event queued before this call, in publish order.
    ///
    /// Events queued by callbacks during processing wait for the next call.
    /// Returns the number of events dispatched.
    pub fn process(&self) -> usize {
        let batch: Vec<QueuedEvent> = self.rx.try_iter().take(self.rx.len()).collect();
        let count = batch.len();

        for queued in batch {
            log::trace!("dispatching queued {}", queued.type_name);
            self.dispatch(queued.type_id, queued.payload.as_ref());
        }

        count
    }

    /// Handle for queueing events from elsewhere, including other threads.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Drops every callback `subscriber` registered with this publisher.
    pub fn remove_subscriber(&self, subscriber: &EventSubscriber) -> usize {
        let removed = self.registry.borrow_mut().remove_owner(subscriber.id());
        removed.len()
    }

    /// Number of registered callbacks.
    pub fn event_count(&self) -> usize {
        self.registry.borrow().handler_count()
    }

    /// Number of distinct subscribers with at least one callback.
    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().owner_count()
    }

    /// Number of queued events not yet processed.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    pub(crate) fn registry(&self) -> &Rc<RefCell<Registry>> {
        &self.registry
    }

    fn dispatch(&self, type_id: TypeId, event: &dyn Any) {
        let callbacks = self.registry.borrow().callbacks(type_id);
        for callback in callbacks {
            callback(event);
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventPublisher")
            .field("id", &self.id)
            .field("callbacks", &self.event_count())
            .field("pending", &self.pending())
            .finish()
    }
}
