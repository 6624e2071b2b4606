//! Broadcast channel for domain activity.
//!
//! [`ActivityBus`] wraps a [`tokio::sync::broadcast`] channel. Every
//! mutation in the service layer publishes an [`ActivityEvent`]; the
//! activity recorder subscribes to persist them.

use tokio::sync::broadcast;

use super::ActivityEvent;

/// Broadcast bus for [`ActivityEvent`]s.
///
/// When the ring buffer is full, the oldest activities are dropped for
/// lagging receivers.
#[derive(Debug, Clone)]
pub struct ActivityBus {
    sender: broadcast::Sender<ActivityEvent>,
}

impl ActivityBus {
    /// Creates a new `ActivityBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an activity to all subscribers.
    ///
    /// Returns the number of receivers that got it; with no receivers the
    /// activity is dropped.
    pub fn publish(&self, activity: ActivityEvent) -> usize {
        tracing::debug!(
            event_id = %activity.event_id(),
            activity_type = activity.activity_type_str(),
            "activity published"
        );
        self.sender.send(activity).unwrap_or(0)
    }

    /// Creates a receiver for all future activities.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ActivityEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventId, UserId};
    use chrono::Utc;

    fn make_activity(event_id: EventId) -> ActivityEvent {
        ActivityEvent::ProposalCreated {
            event_id,
            creator_id: UserId::new(),
            title: "Chess Open".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = ActivityBus::new(16);
        assert_eq!(bus.publish(make_activity(EventId::new())), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_same_activity() {
        let bus = ActivityBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = EventId::new();
        assert_eq!(bus.publish(make_activity(id)), 2);

        let Ok(a1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(a2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(a1.event_id(), id);
        assert_eq!(a2.event_id(), id);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = ActivityBus::new(16);
        assert_eq!(bus.receiver_count(), 0);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
