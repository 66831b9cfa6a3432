//! Typed event bus.
//!
//! Events are plain Rust values; callbacks are keyed by the event's type.
//!
//! ```
//! use airship_core::event::{EventPublisher, EventSubscriber};
//!
//! struct Scored(u32);
//!
//! let bus = EventPublisher::new();
//! let mut hud = EventSubscriber::new();
//! hud.subscribe_to(&bus, |e: &Scored| println!("score {}", e.0));
//!
//! bus.publish(Scored(10));
//! assert_eq!(bus.process(), 1);
//! ```

mod publisher;
mod registry;
mod subscriber;

pub use publisher::{EventPublisher, EventSender, PublisherId};
pub use registry::SubscriberId;
pub use subscriber::{EventSubscriber, Subscription};

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    struct Hit {
        damage: i32,
        source: String,
    }

    struct Ping;
    struct Pong;

    fn counter() -> Rc<Cell<i32>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn publish_sync_delivers_payload() {
        let bus = EventPublisher::new();
        let mut sub = EventSubscriber::new();
        let got = Rc::new(RefCell::new(None));

        let g = Rc::clone(&got);
        sub.subscribe_to(&bus, move |e: &Hit| *g.borrow_mut() = Some(e.clone()));

        let ev = Hit { damage: 7, source: "spike".into() };
        bus.publish_sync(ev.clone());
        assert_eq!(got.borrow().as_ref(), Some(&ev));
    }

    #[test]
    fn callbacks_only_see_their_type() {
        let bus = EventPublisher::new();
        let mut sub = EventSubscriber::new();
        let pings = counter();

        let c = Rc::clone(&pings);
        sub.subscribe_to(&bus, move |_: &Ping| c.set(c.get() + 1));

        bus.publish_sync(Pong);
        bus.publish_sync(Ping);
        assert_eq!(pings.get(), 1);
    }

    #[test]
    fn registration_order_is_dispatch_order() {
        let bus = EventPublisher::new();
        let mut sub = EventSubscriber::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3 {
            let o = Rc::clone(&order);
            sub.subscribe_to(&bus, move |_: &Ping| o.borrow_mut().push(tag));
        }

        bus.publish_sync(Ping);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn queued_events_wait_for_process() {
        let bus = EventPublisher::new();
        let mut sub = EventSubscriber::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        sub.subscribe_to(&bus, move |e: &Hit| s.borrow_mut().push(e.damage));

        for damage in [3, 1, 2] {
            bus.publish(Hit { damage, source: String::new() });
        }
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.pending(), 3);

        assert_eq!(bus.process(), 3);
        assert_eq!(*seen.borrow(), vec![3, 1, 2]);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn events_queued_while_processing_wait_for_next_round() {
        let bus = Rc::new(EventPublisher::new());
        let pongs = counter();

        let weak = Rc::downgrade(&bus);
        let _ping = bus.subscribe(move |_: &Ping| {
            if let Some(bus) = weak.upgrade() {
                bus.publish(Pong);
            }
        });
        let c = Rc::clone(&pongs);
        let _pong = bus.subscribe(move |_: &Pong| c.set(c.get() + 1));

        bus.publish(Ping);
        assert_eq!(bus.process(), 1);
        assert_eq!(pongs.get(), 0);
        assert_eq!(bus.pending(), 1);

        assert_eq!(bus.process(), 1);
        assert_eq!(pongs.get(), 1);
    }

    #[test]
    fn callbacks_may_subscribe_during_dispatch() {
        let bus = Rc::new(EventPublisher::new());
        let extra: Rc<RefCell<Vec<Subscription>>> = Rc::new(RefCell::new(Vec::new()));

        let weak = Rc::downgrade(&bus);
        let store = Rc::clone(&extra);
        let _s = bus.subscribe(move |_: &Ping| {
            if let Some(bus) = weak.upgrade() {
                store.borrow_mut().push(bus.subscribe(|_: &Ping| {}));
            }
        });

        bus.publish_sync(Ping);
        assert_eq!(bus.event_count(), 2);

        extra.borrow_mut().clear();
        assert_eq!(bus.event_count(), 1);
    }

    #[test]
    fn dropping_subscriber_removes_callbacks() {
        let a = EventPublisher::new();
        let b = EventPublisher::new();
        let hits = counter();

        {
            let mut sub = EventSubscriber::new();
            let c = Rc::clone(&hits);
            sub.subscribe_to(&a, move |_: &Ping| c.set(c.get() + 1));
            sub.subscribe_to(&a, |_: &Pong| {});
            sub.subscribe_to(&b, |_: &Ping| {});

            assert_eq!(a.event_count(), 2);
            assert_eq!(a.subscriber_count(), 1);
            assert_eq!(sub.subscribed_count(), 2);
        }

        assert_eq!(a.event_count(), 0);
        assert_eq!(b.event_count(), 0);
        a.publish_sync(Ping);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn dropping_publisher_detaches_subscribers() {
        let keep = EventPublisher::new();
        let mut sub = EventSubscriber::new();
        {
            let gone = EventPublisher::new();
            sub.subscribe_to(&keep, |_: &Ping| {});
            sub.subscribe_to(&gone, |_: &Ping| {});
            assert_eq!(sub.subscribed_count(), 2);
        }
        assert_eq!(sub.subscribed_count(), 1);
    }

    #[test]
    fn remove_and_cancel() {
        let bus = EventPublisher::new();
        let mut a = EventSubscriber::new();
        let mut b = EventSubscriber::new();
        a.subscribe_to(&bus, |_: &Ping| {});
        a.subscribe_to(&bus, |_: &Pong| {});
        b.subscribe_to(&bus, |_: &Ping| {});
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.remove_subscriber(&a), 2);
        assert_eq!(a.subscribed_count(), 0);
        assert_eq!(bus.subscriber_count(), 1);

        b.cancel_subscription(&bus);
        assert_eq!(bus.event_count(), 0);
        assert_eq!(b.subscribed_count(), 0);
    }

    #[test]
    fn standalone_subscription_is_raii() {
        let bus = EventPublisher::new();
        let sub = bus.subscribe(|_: &Ping| {});
        assert!(sub.is_active());
        assert_eq!(bus.event_count(), 1);
        drop(sub);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn callback_owning_a_subscription_releases_it() {
        let bus = EventPublisher::new();
        let inner = bus.subscribe(|_: &Pong| {});
        let outer = bus.subscribe(move |_: &Ping| {
            let _ = &inner;
        });
        assert_eq!(bus.event_count(), 2);

        drop(outer);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn removed_subscriber_releases_captured_subscriptions() {
        let bus = EventPublisher::new();
        let inner = bus.subscribe(|_: &Pong| {});
        let mut owner = EventSubscriber::new();
        owner.subscribe_to(&bus, move |_: &Ping| {
            let _ = &inner;
        });

        assert_eq!(bus.remove_subscriber(&owner), 1);
        assert_eq!(bus.event_count(), 0);
    }

    #[test]
    fn sender_queues_from_other_threads() {
        let bus = EventPublisher::new();
        let total = counter();
        let t = Rc::clone(&total);
        let _s = bus.subscribe(move |e: &Hit| t.set(t.get() + e.damage));

        let handles: Vec<_> = (1..=4)
            .map(|damage| {
                let tx = bus.sender();
                thread::spawn(move || tx.send(Hit { damage, source: "remote".into() }))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }

        assert_eq!(bus.process(), 4);
        assert_eq!(total.get(), 10);
    }

    #[test]
    fn sender_reports_dropped_publisher() {
        let tx = {
            let bus = EventPublisher::new();
            bus.sender()
        };
        assert!(!tx.send(Ping));
    }
}
