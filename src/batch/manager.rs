//! Batch Manager
//!
//! Turns one bulk request into many queue submissions sharing a batch id and
//! tracks the member ids so the aggregate outcome can be derived on demand.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex as TokioMutex;

use crate::batch::error::{BatchError, BatchResult};
use crate::batch::types::{BatchCancelReport, BatchItemOutcome, BatchStatus, BatchSubmitReport};
use crate::notifications::api::{BatchEvent, BatchEventType, Event};
use crate::queue::entry::EntryState;
use crate::queue::manager::ScanQueueManager;
use crate::queue::types::{CancelOutcome, ScanSubmission};

/// Bulk submission adapter over the scan queue
///
/// Holds only the `batch_id -> member ids` index; everything else is derived
/// by querying the queue, so batch status can never drift from entry state.
pub struct BatchManager {
    queue: Arc<ScanQueueManager>,
    batches: TokioMutex<HashMap<String, Vec<String>>>,
}

impl BatchManager {
    pub fn new(queue: Arc<ScanQueueManager>) -> Self {
        Self {
            queue,
            batches: TokioMutex::new(HashMap::new()),
        }
    }

    /// Submit every item of a bulk request at the bulk priority
    ///
    /// A failed item (duplicate id, typically) is recorded and the remaining
    /// items continue; partial success is expected and reported item-by-item.
    pub async fn submit_batch(
        &self,
        batch_id: &str,
        requests: Vec<ScanSubmission>,
    ) -> BatchResult<BatchSubmitReport> {
        {
            let mut batches = self.batches.lock().await;
            if batches.contains_key(batch_id) {
                return Err(BatchError::DuplicateBatch {
                    batch_id: batch_id.to_string(),
                });
            }
            // Reserve the id up front so two racing submissions of the same
            // batch cannot interleave their members
            batches.insert(batch_id.to_string(), Vec::new());
        }

        let bulk_priority = self.queue.config().bulk_priority;
        let mut items = Vec::with_capacity(requests.len());
        let mut members = Vec::new();

        for request in requests {
            let request_id = request.request_id.clone();
            let submission = request
                .with_priority(bulk_priority)
                .with_batch_id(batch_id.to_string());

            match self.queue.submit(submission).await {
                Ok(_) => {
                    members.push(request_id.clone());
                    items.push(BatchItemOutcome::Accepted { request_id });
                }
                Err(error) => {
                    log::warn!(
                        "Batch '{}' item '{}' rejected: {}",
                        batch_id,
                        request_id,
                        error
                    );
                    items.push(BatchItemOutcome::Rejected { request_id, error });
                }
            }
        }

        let member_count = members.len();
        {
            let mut batches = self.batches.lock().await;
            if let Some(slot) = batches.get_mut(batch_id) {
                *slot = members;
            }
        }

        self.publish_event(BatchEvent::with_item_count(
            BatchEventType::Submitted,
            batch_id.to_string(),
            member_count,
        ))
        .await;

        Ok(BatchSubmitReport {
            batch_id: batch_id.to_string(),
            items,
        })
    }

    /// Derive the live status of a batch from its members' entry states
    pub async fn batch_status(&self, batch_id: &str) -> BatchResult<BatchStatus> {
        let members = self.members_of(batch_id).await?;

        let mut status = BatchStatus {
            total: members.len(),
            ..BatchStatus::default()
        };
        for request_id in &members {
            match self.queue.entry_state(request_id)? {
                Some(EntryState::Queued) => status.queued += 1,
                Some(EntryState::Running) => status.running += 1,
                Some(EntryState::Completed) => status.completed += 1,
                Some(EntryState::Failed) => status.failed += 1,
                Some(EntryState::Cancelled) => status.cancelled += 1,
                None => {
                    // Member outcomes are retained until remove_batch, so a
                    // missing record means the indexes disagree
                    log::error!(
                        "Batch '{}' member '{}' has no entry record",
                        batch_id,
                        request_id
                    );
                }
            }
        }
        Ok(status)
    }

    /// Cancel every member still waiting; running members are reported as
    /// not cancellable
    pub async fn cancel_batch(&self, batch_id: &str) -> BatchResult<BatchCancelReport> {
        let members = self.members_of(batch_id).await?;

        let mut report = BatchCancelReport::default();
        for request_id in &members {
            match self.queue.cancel(request_id).await? {
                CancelOutcome::Cancelled => report.cancelled += 1,
                CancelOutcome::AlreadyRunning => report.not_cancellable += 1,
                CancelOutcome::NotFound => report.already_terminal += 1,
            }
        }

        self.publish_event(BatchEvent::with_item_count(
            BatchEventType::Cancelled,
            batch_id.to_string(),
            report.cancelled,
        ))
        .await;

        Ok(report)
    }

    /// Forget a batch and reclaim its members' retained outcomes
    ///
    /// Returns whether the batch existed. After removal, `batch_status`
    /// reports the id as unknown and the member request ids become reusable.
    pub async fn remove_batch(&self, batch_id: &str) -> BatchResult<bool> {
        let members = {
            let mut batches = self.batches.lock().await;
            batches.remove(batch_id)
        };

        match members {
            Some(members) => {
                self.queue.release_batch_outcomes(&members)?;
                self.publish_event(BatchEvent::new(
                    BatchEventType::Removed,
                    batch_id.to_string(),
                ))
                .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Known batch ids, for status surfaces
    pub async fn batch_ids(&self) -> Vec<String> {
        self.batches.lock().await.keys().cloned().collect()
    }

    async fn members_of(&self, batch_id: &str) -> BatchResult<Vec<String>> {
        let batches = self.batches.lock().await;
        batches
            .get(batch_id)
            .cloned()
            .ok_or_else(|| BatchError::UnknownBatch {
                batch_id: batch_id.to_string(),
            })
    }

    async fn publish_event(&self, event: BatchEvent) {
        let notifications = self.queue.notifications_arc();
        let mut notifications = notifications.lock().await;
        if let Err(err) = notifications.publish(Event::Batch(event)).await {
            log::warn!("Batch event delivery incomplete: {}", err);
        }
    }
}
