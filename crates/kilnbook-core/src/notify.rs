use std::sync::mpsc::{channel, Receiver, Sender};

use serde::Serialize;

use crate::model::EntityRef;

/// A change to the store, published after it has been applied in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChangeEvent {
    Created { entity: EntityRef },
    Updated { entity: EntityRef },
    Deleted { entity: EntityRef },
    Linked { from: EntityRef, to: EntityRef },
    Unlinked { from: EntityRef, to: EntityRef },
    /// Indices were rebuilt from the store (bulk import or recovery).
    Rebuilt,
}

/// Something that wants to hear about changes as they happen.
pub trait ChangeListener: Send {
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

/// Handle returned by [`ChangeFeed::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// Fan-out point for change notifications. Presentation layers either poll a
/// channel receiver or register a listener.
#[derive(Default)]
pub struct ChangeFeed {
    senders: Vec<Sender<ChangeEvent>>,
    listeners: Vec<(ListenerId, Box<dyn ChangeListener>)>,
    next_id: u64,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe for polling. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<ChangeEvent> {
        let (tx, rx) = channel();
        self.senders.push(tx);
        rx
    }

    pub fn register(&mut self, listener: impl ChangeListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn publish(&mut self, event: ChangeEvent) {
        tracing::trace!(?event, "publishing change");
        for (_, listener) in &self.listeners {
            listener.on_change(&event);
        }
        // Disconnected receivers are pruned here.
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.senders.len() + self.listeners.len()
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("senders", &self.senders.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityKind;
    use std::sync::{Arc, Mutex};

    fn goal_ref() -> EntityRef {
        EntityRef::new(EntityKind::Goal, "g1")
    }

    #[test]
    fn test_polling_subscriber_receives_events() {
        let mut feed = ChangeFeed::new();
        let rx = feed.subscribe();
        feed.publish(ChangeEvent::Created { entity: goal_ref() });
        feed.publish(ChangeEvent::Rebuilt);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![ChangeEvent::Created { entity: goal_ref() }, ChangeEvent::Rebuilt]
        );
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let mut feed = ChangeFeed::new();
        let rx = feed.subscribe();
        drop(rx);
        feed.publish(ChangeEvent::Rebuilt);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn test_registered_listener_and_unregister() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut feed = ChangeFeed::new();
        let id = feed.register(move |event: &ChangeEvent| {
            sink.lock().unwrap().push(event.clone());
        });
        feed.publish(ChangeEvent::Deleted { entity: goal_ref() });
        assert!(feed.unregister(id));
        feed.publish(ChangeEvent::Rebuilt);
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
