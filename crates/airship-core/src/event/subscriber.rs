use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Weak;

use super::publisher::{EventPublisher, PublisherId};
use super::registry::{HandlerId, Registry, SubscriberId};

/// One registered callback. Dropping it unregisters the callback.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    publisher: PublisherId,
    registry: Weak<RefCell<Registry>>,
    type_id: TypeId,
    handler: HandlerId,
    owner: SubscriberId,
}

impl Subscription {
    pub(crate) fn new(
        publisher: PublisherId,
        registry: Weak<RefCell<Registry>>,
        type_id: TypeId,
        handler: HandlerId,
        owner: SubscriberId,
    ) -> Self {
        Self {
            publisher,
            registry,
            type_id,
            handler,
            owner,
        }
    }

    pub fn publisher(&self) -> PublisherId {
        self.publisher
    }

    /// False once the publisher is gone or has removed this callback.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|r| r.borrow().contains(self.type_id, self.handler))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(registry) = self.registry.upgrade() else {
            return;
        };
        let removed = match registry.try_borrow_mut() {
            Ok(mut r) => r.remove(self.type_id, self.handler),
            Err(_) => {
                log::warn!("event registry busy; callback of {:?} left registered", self.owner);
                None
            }
        };
        // Released outside the borrow: the callback may hold subscriptions.
        drop(removed);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("publisher", &self.publisher)
            .field("owner", &self.owner)
            .finish()
    }
}

/// Listener that owns the subscriptions it made.
///
/// Dropping the subscriber removes all of its callbacks from every publisher.
pub struct EventSubscriber {
    id: SubscriberId,
    subscriptions: Vec<Subscription>,
}

impl EventSubscriber {
    pub fn new() -> Self {
        Self {
            id: SubscriberId::next(),
            subscriptions: Vec::new(),
        }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Registers `callback` for events of type `E` on `publisher`.
    pub fn subscribe_to<E, F>(&mut self, publisher: &EventPublisher, callback: F)
    where
        E: 'static,
        F: Fn(&E) + 'static,
    {
        let sub = publisher.subscribe_as(self.id, callback);
        self.subscriptions.push(sub);
    }

    /// Drops every callback this subscriber registered on `publisher`.
    pub fn cancel_subscription(&mut self, publisher: &EventPublisher) {
        let target = publisher.id();
        self.subscriptions.retain(|s| s.publisher != target);
        // Callbacks removed by the publisher side are already gone; make sure
        // nothing of ours survives either way.
        let removed = publisher.registry().borrow_mut().remove_owner(self.id);
        drop(removed);
    }

    /// Number of live publishers this subscriber still has callbacks on.
    pub fn subscribed_count(&self) -> usize {
        self.subscriptions
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.publisher)
            .collect::<HashSet<_>>()
            .len()
    }
}

impl Default for EventSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSubscriber")
            .field("id", &self.id)
            .field("subscribed", &self.subscribed_count())
            .finish()
    }
}
