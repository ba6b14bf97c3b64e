//! AsyncNotificationManager implementation

use crate::notifications::error::{NotificationError, NotificationResult};
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::traits::SubscriberStatistics;
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Receiver half handed to a subscriber
///
/// Events arrive in publish order; the single unbounded channel per
/// subscriber preserves it.
pub type EventReceiver = UnboundedReceiver<Event>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: SubscriberStatistics,
}

/// Fan-out event hub owned by the queue orchestrator
///
/// Unlike a process-wide service, each `ScanQueueManager` owns its manager and
/// hands out subscriptions through `ScanQueueManager::subscribe`. Publishing
/// never blocks: every subscriber gets an unbounded channel, and subscribers
/// whose receiver has been dropped are pruned on the next publish.
pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl Default for AsyncNotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber and return its event receiver
    ///
    /// Re-subscribing under an existing id replaces the previous subscription;
    /// the old receiver's channel closes and a warning is logged.
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> NotificationResult<EventReceiver> {
        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source: source.clone(),
            sender,
            statistics: SubscriberStatistics::new(),
        };

        if let Some(existing) = self.subscribers.insert(subscriber_id.clone(), subscriber_info) {
            log::warn!(
                "Subscriber '{}' replaced existing subscription (source: {} -> {})",
                subscriber_id,
                existing.source,
                source
            );
        }

        Ok(receiver)
    }

    /// Remove a subscriber; returns whether one was registered under the id
    pub fn unsubscribe(&mut self, subscriber_id: &str) -> bool {
        self.subscribers.remove(subscriber_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn get_subscriber_statistics(&self, subscriber_id: &str) -> Option<&SubscriberStatistics> {
        self.subscribers
            .get(subscriber_id)
            .map(|info| &info.statistics)
    }

    /// Deliver an event to every subscriber whose filter accepts it
    ///
    /// Subscribers with a closed channel are removed and reported through
    /// `NotificationError::PublishFailed`; delivery to the remaining
    /// subscribers still happens, so one dead consumer cannot stall the rest.
    pub async fn publish(&mut self, event: Event) -> NotificationResult<()> {
        let mut failed_subscribers = Vec::new();
        let event_type = match &event {
            Event::Scan(_) => "Scan",
            Event::Batch(_) => "Batch",
            Event::System(_) => "System",
        }
        .to_string();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if subscriber_info.filter.accepts(&event) {
                subscriber_info.statistics.increment_queue_size();

                if subscriber_info.sender.send(event.clone()).is_err() {
                    subscriber_info.statistics.record_send_error();
                    failed_subscribers.push(subscriber_id.clone());
                } else {
                    subscriber_info.statistics.record_event_delivered();
                }
            }
        }

        for subscriber_id in &failed_subscribers {
            log::debug!(
                "Removing subscriber '{}' with closed channel",
                subscriber_id
            );
            self.subscribers.remove(subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            });
        }

        Ok(())
    }
}
