use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub(crate) type Callback = Rc<dyn Fn(&dyn Any)>;

/// Identifies one listener across every publisher it subscribes to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

struct Handler {
    id: HandlerId,
    owner: SubscriberId,
    callback: Callback,
}

/// Callback table of one publisher, keyed by event type.
#[derive(Default)]
pub(crate) struct Registry {
    handlers: HashMap<TypeId, Vec<Handler>>,
}

impl Registry {
    pub(crate) fn insert(
        &mut self,
        type_id: TypeId,
        owner: SubscriberId,
        callback: Callback,
    ) -> HandlerId {
        let id = HandlerId::next();
        self.handlers
            .entry(type_id)
            .or_default()
            .push(Handler { id, owner, callback });
        id
    }

    /// Unregisters one handler and hands its callback back.
    ///
    /// Callbacks may own subscriptions of their own, so callers drop the
    /// returned value only after releasing the registry borrow.
    pub(crate) fn remove(&mut self, type_id: TypeId, id: HandlerId) -> Option<Callback> {
        let list = self.handlers.get_mut(&type_id)?;
        let idx = list.iter().position(|h| h.id == id)?;
        let handler = list.remove(idx);
        if list.is_empty() {
            self.handlers.remove(&type_id);
        }
        Some(handler.callback)
    }

    /// Unregisters every handler of `owner`; same drop rule as `remove`.
    pub(crate) fn remove_owner(&mut self, owner: SubscriberId) -> Vec<Callback> {
        let mut removed = Vec::new();
        for list in self.handlers.values_mut() {
            let (gone, kept): (Vec<Handler>, Vec<Handler>) =
                list.drain(..).partition(|h| h.owner == owner);
            *list = kept;
            removed.extend(gone.into_iter().map(|h| h.callback));
        }
        self.handlers.retain(|_, list| !list.is_empty());
        removed
    }

    pub(crate) fn contains(&self, type_id: TypeId, id: HandlerId) -> bool {
        self.handlers
            .get(&type_id)
            .is_some_and(|list| list.iter().any(|h| h.id == id))
    }

    /// Snapshot of the callbacks for `type_id`, in registration order.
    ///
    /// Dispatch runs on the snapshot so callbacks are free to touch the
    /// registry.
    pub(crate) fn callbacks(&self, type_id: TypeId) -> Vec<Callback> {
        self.handlers
            .get(&type_id)
            .map(|list| list.iter().map(|h| Rc::clone(&h.callback)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn handler_count(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub(crate) fn owner_count(&self) -> usize {
        self.handlers
            .values()
            .flatten()
            .map(|h| h.owner)
            .collect::<HashSet<_>>()
            .len()
    }
}
