//! The "stats changed" broadcast.

use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::events::LedgerEvent;

const DEFAULT_CAPACITY: usize = 256;

/// Fans ledger events out to observers (dashboards, HUDs).
///
/// Publishing never blocks and never fails; slow observers miss events and
/// see `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct StatsNotifier {
    sender: broadcast::Sender<LedgerEvent>,
}

impl StatsNotifier {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Registers a new observer.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, events: Vec<LedgerEvent>) {
        for event in events {
            if self.sender.send(event).is_err() {
                trace!("no stats observers subscribed");
            }
        }
    }
}

impl Default for StatsNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use storyflow_core::event::EventMetadata;
    use storyflow_core::ids::{PlayerId, StoryId};
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::{LedgerEventKind, STORY_COMPLETED_EVENT_TYPE, StoryCompleted};

    fn event() -> LedgerEvent {
        LedgerEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: STORY_COMPLETED_EVENT_TYPE.to_owned(),
                player_id: PlayerId(Uuid::new_v4()),
                correlation_id: Uuid::new_v4(),
                occurred_at: Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            },
            kind: LedgerEventKind::StoryCompleted(StoryCompleted {
                story_id: StoryId(1),
                bonus_xp: 25,
            }),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_published_events() {
        let notifier = StatsNotifier::default();
        let mut receiver = notifier.subscribe();

        notifier.publish(vec![event()]);

        let received = receiver.recv().await.unwrap();
        assert!(matches!(received.kind, LedgerEventKind::StoryCompleted(_)));
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let notifier = StatsNotifier::new(4);
        notifier.publish(vec![event(), event()]);
    }
}
