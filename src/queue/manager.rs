//! ScanQueueManager - Central coordination for scan admission and execution slots
//!
//! The manager decides, for every scan request entering the system, whether it
//! runs immediately or waits; enforces the global concurrency ceiling; orders
//! waiting work by priority and arrival; promotes queued work when a slot
//! frees; and exposes cancellation, position, and wait-time estimates.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex as TokioMutex;

use crate::core::config::{ConfigError, QueueConfig};
use crate::core::sync::handle_mutex_poison;
use crate::notifications::api::{
    AsyncNotificationManager, Event, EventFilter, EventReceiver, NotificationResult, ScanEvent,
    ScanEventType, SystemEvent, SystemEventType,
};
use crate::queue::admission::AdmissionQueue;
use crate::queue::entry::{EntryState, QueueEntry};
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::estimator::WaitTimeEstimator;
use crate::queue::governor::ConcurrencyGovernor;
use crate::queue::types::{
    CancelOutcome, QueueStats, QueuedEntryInfo, ScanSubmission, SubmitOutcome,
};

/// Mutable queue state, serialized through a single mutex
///
/// Every mutation of the admission queue, the entry index, and the counters
/// happens under this one lock; the governor's atomics are only touched from
/// inside it as well, which makes "observe a free slot and take it" a single
/// critical section.
struct QueueState {
    admission: AdmissionQueue,
    /// Live entries: queued and running
    entries: HashMap<String, QueueEntry>,
    /// Terminal outcomes kept only for batch members, reclaimed by
    /// `BatchManager::remove_batch`; interactive entries are destroyed
    /// at their terminal transition
    batch_outcomes: HashMap<String, EntryState>,
    estimator: WaitTimeEstimator,
    completed: u64,
    failed: u64,
    cancelled: u64,
    /// Events staged under the lock, flushed in transition order
    dispatch: VecDeque<Event>,
}

/// Scan admission queue orchestrator
///
/// The manager is responsible for:
/// - Admitting submissions: start immediately or append to the waiting list
/// - Enforcing the `max_concurrent` ceiling through the governor
/// - Promoting the highest-priority waiting entry when a slot frees
/// - Cancellation of not-yet-started work
/// - Emitting one lifecycle event per state transition
///
/// # Thread Safety
///
/// Fully thread-safe behind `Arc<ScanQueueManager>`. Concurrent submissions
/// and completion notifications are serialized through an internal mutex, so
/// two callers racing for the last slot can never both start.
///
/// # Example
///
/// ```rust,no_run
/// use scangate::core::config::QueueConfig;
/// use scangate::notifications::api::EventFilter;
/// use scangate::queue::api::{ScanQueueManager, ScanRequest, ScanSubmission};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = ScanQueueManager::create(QueueConfig::default()).await?;
///
/// // The executor subscribes to Started events and launches scans
/// let mut events = manager
///     .subscribe("executor", EventFilter::ScanOnly, "executor:runner")
///     .await?;
///
/// let outcome = manager
///     .submit(ScanSubmission::new(
///         "req-1".to_string(),
///         "scan-1".to_string(),
///         "sha256:abc".to_string(),
///         ScanRequest::new("registry.local/app:1.4"),
///     ))
///     .await?;
/// println!("submitted: {:?}", outcome);
///
/// // ... scan finishes ...
/// manager.complete("req-1").await?;
/// # Ok(())
/// # }
/// ```
pub struct ScanQueueManager {
    config: QueueConfig,
    governor: ConcurrencyGovernor,
    state: Mutex<QueueState>,
    notifications: Arc<TokioMutex<AsyncNotificationManager>>,
}

impl ScanQueueManager {
    /// Build a manager from validated configuration
    pub fn new(config: QueueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let governor = ConcurrencyGovernor::new(config.max_concurrent);
        let estimator =
            WaitTimeEstimator::new(config.default_scan_duration(), config.duration_window);
        Ok(Self {
            config,
            governor,
            state: Mutex::new(QueueState {
                admission: AdmissionQueue::new(),
                entries: HashMap::new(),
                batch_outcomes: HashMap::new(),
                estimator,
                completed: 0,
                failed: 0,
                cancelled: 0,
                dispatch: VecDeque::new(),
            }),
            notifications: Arc::new(TokioMutex::new(AsyncNotificationManager::new())),
        })
    }

    /// Create a shared manager and publish the Startup event
    pub async fn create(config: QueueConfig) -> Result<Arc<Self>, ConfigError> {
        let manager = Arc::new(Self::new(config)?);
        manager
            .stage_system_event(SystemEvent::new(SystemEventType::Startup))
            .await;
        Ok(manager)
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Register an event subscriber
    pub async fn subscribe<S: Into<String>>(
        &self,
        subscriber_id: S,
        filter: EventFilter,
        source: S,
    ) -> NotificationResult<EventReceiver> {
        self.notifications
            .lock()
            .await
            .subscribe(subscriber_id.into(), filter, source.into())
    }

    /// Remove an event subscriber; returns whether one existed
    pub async fn unsubscribe(&self, subscriber_id: &str) -> bool {
        self.notifications.lock().await.unsubscribe(subscriber_id)
    }

    pub(crate) fn notifications_arc(&self) -> Arc<TokioMutex<AsyncNotificationManager>> {
        Arc::clone(&self.notifications)
    }

    /// Submit one scan request
    ///
    /// Returns immediately: either a slot was free and the entry is running
    /// (the executor learns about it via the `Started` event), or the entry
    /// joined the waiting list at the reported position. Never blocks on scan
    /// execution.
    pub async fn submit(&self, submission: ScanSubmission) -> QueueResult<SubmitOutcome> {
        let result = self.submit_locked(submission);
        self.flush_events().await;
        result
    }

    /// Report successful completion of a running scan
    ///
    /// Releases the slot, folds the duration into the wait-time average, and
    /// promotes waiting work. Must be called exactly once per started entry;
    /// a repeat call finds nothing and changes nothing.
    pub async fn complete(&self, request_id: &str) -> QueueResult<()> {
        let result = self.finish_locked(
            request_id,
            EntryState::Completed,
            ScanEventType::Completed,
            None,
        );
        self.flush_events().await;
        result
    }

    /// Report a failed scan
    ///
    /// Identical slot accounting to `complete`; the error detail travels on
    /// the `Failed` event. The queue never retries; retry policy belongs to
    /// the executor layer.
    pub async fn fail<S: Into<String>>(&self, request_id: &str, error_info: S) -> QueueResult<()> {
        let result = self.finish_locked(
            request_id,
            EntryState::Failed,
            ScanEventType::Failed,
            Some(error_info.into()),
        );
        self.flush_events().await;
        result
    }

    /// Cancel a not-yet-started entry
    ///
    /// Running entries are reported as `AlreadyRunning`; signalling the
    /// executor is the caller's responsibility, and the queue guarantees the
    /// entry will not be double-started either way. Unknown or terminal ids
    /// are a `NotFound` no-op.
    pub async fn cancel(&self, request_id: &str) -> QueueResult<CancelOutcome> {
        let result = self.cancel_locked(request_id);
        self.flush_events().await;
        result
    }

    /// Cancel every waiting entry; running entries are untouched
    ///
    /// Returns the number of entries cancelled.
    pub async fn clear_queue(&self) -> QueueResult<usize> {
        let result = self.clear_queue_locked();
        self.flush_events().await;
        result
    }

    /// Publish the Shutdown event
    pub async fn shutdown(&self) {
        self.stage_system_event(SystemEvent::new(SystemEventType::Shutdown))
            .await;
    }

    /// Point-in-time counters
    pub fn stats(&self) -> QueueResult<QueueStats> {
        let state = self.lock_state()?;
        Ok(QueueStats {
            running: self.governor.running(),
            queued: state.admission.len(),
            completed: state.completed,
            failed: state.failed,
            cancelled: state.cancelled,
        })
    }

    /// Ordered snapshot of the waiting list for position display
    pub fn queued_entries(&self) -> QueueResult<Vec<QueuedEntryInfo>> {
        let state = self.lock_state()?;
        let mut snapshot = Vec::with_capacity(state.admission.len());
        for (idx, request_id) in state.admission.ids().enumerate() {
            match state.entries.get(request_id) {
                Some(entry) => snapshot.push(QueuedEntryInfo {
                    position: idx + 1,
                    request_id: entry.request_id().to_string(),
                    scan_id: entry.scan_id().to_string(),
                    image_id: entry.image_id().to_string(),
                    priority: entry.priority(),
                    enqueued_at: entry.enqueued_at(),
                }),
                None => {
                    log::error!(
                        "Admission queue references unknown entry '{}'; skipping in snapshot",
                        request_id
                    );
                }
            }
        }
        Ok(snapshot)
    }

    /// 1-based queue position; `None` when the entry is not waiting
    /// (running, terminal, or unknown; distinguish via `entry_state`)
    pub fn queue_position(&self, request_id: &str) -> QueueResult<Option<usize>> {
        let state = self.lock_state()?;
        Ok(state.admission.position_of(request_id))
    }

    /// Advisory wait estimate for a waiting entry; `None` when not waiting
    pub fn estimated_wait(&self, request_id: &str) -> QueueResult<Option<Duration>> {
        let state = self.lock_state()?;
        Ok(state.admission.position_of(request_id).map(|position| {
            state
                .estimator
                .estimate(position, self.governor.max_concurrent())
        }))
    }

    /// Advisory wall-clock start estimate for a waiting entry
    pub fn estimated_start_at(&self, request_id: &str) -> QueueResult<Option<DateTime<Utc>>> {
        let state = self.lock_state()?;
        Ok(state.admission.position_of(request_id).map(|position| {
            state
                .estimator
                .estimated_start_at(position, self.governor.max_concurrent())
        }))
    }

    /// Current state of an entry: live, or the recorded outcome of a
    /// terminal batch member. `None` means unknown or already pruned.
    pub fn entry_state(&self, request_id: &str) -> QueueResult<Option<EntryState>> {
        let state = self.lock_state()?;
        Ok(state
            .entries
            .get(request_id)
            .map(QueueEntry::state)
            .or_else(|| state.batch_outcomes.get(request_id).copied()))
    }

    /// Drop recorded terminal outcomes for the given batch members
    pub(crate) fn release_batch_outcomes(&self, request_ids: &[String]) -> QueueResult<()> {
        let mut state = self.lock_state()?;
        for request_id in request_ids {
            state.batch_outcomes.remove(request_id);
        }
        Ok(())
    }

    fn lock_state(&self) -> QueueResult<std::sync::MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.state.lock(), |message| QueueError::LockPoisoned {
            message,
        })
    }

    fn submit_locked(&self, submission: ScanSubmission) -> QueueResult<SubmitOutcome> {
        let mut state = self.lock_state()?;
        let ScanSubmission {
            request_id,
            scan_id,
            image_id,
            request,
            priority,
            batch_id,
        } = submission;

        if state.entries.contains_key(&request_id)
            || state.batch_outcomes.contains_key(&request_id)
        {
            return Err(QueueError::DuplicateRequest { request_id });
        }

        let mut entry = QueueEntry::new(
            request_id.clone(),
            scan_id,
            image_id,
            request,
            priority,
            batch_id,
        );

        if self.governor.try_acquire() {
            if let Err(err) = entry.transition_to(EntryState::Running) {
                self.governor.release();
                return Err(err);
            }
            log::debug!("Scan '{}' started immediately", request_id);
            state.dispatch.push_back(Event::Scan(ScanEvent::with_request(
                ScanEventType::Started,
                request_id.clone(),
                entry.scan_id().to_string(),
                entry.image_id().to_string(),
                Arc::clone(entry.request()),
            )));
            state.entries.insert(request_id.clone(), entry);
            Ok(SubmitOutcome::Started { request_id })
        } else {
            state.admission.insert(request_id.clone(), priority);
            // The entry was just inserted, so a position always exists
            let position = state
                .admission
                .position_of(&request_id)
                .unwrap_or_else(|| state.admission.len());
            let estimated_wait = state
                .estimator
                .estimate(position, self.governor.max_concurrent());
            log::debug!(
                "Scan '{}' queued at position {} (priority {})",
                request_id,
                position,
                priority
            );
            state.dispatch.push_back(Event::Scan(ScanEvent::new(
                ScanEventType::Queued,
                request_id.clone(),
                entry.scan_id().to_string(),
                entry.image_id().to_string(),
            )));
            state.entries.insert(request_id.clone(), entry);
            Ok(SubmitOutcome::Queued {
                request_id,
                position,
                estimated_wait,
            })
        }
    }

    fn finish_locked(
        &self,
        request_id: &str,
        terminal: EntryState,
        event_type: ScanEventType,
        message: Option<String>,
    ) -> QueueResult<()> {
        let mut state = self.lock_state()?;

        let (scan_id, image_id, batch_member, elapsed) = {
            let entry =
                state
                    .entries
                    .get_mut(request_id)
                    .ok_or_else(|| QueueError::NotFound {
                        request_id: request_id.to_string(),
                    })?;
            entry.transition_to(terminal)?;
            (
                entry.scan_id().to_string(),
                entry.image_id().to_string(),
                entry.batch_id().is_some(),
                entry.running_duration(),
            )
        };

        state.entries.remove(request_id);
        if batch_member {
            state
                .batch_outcomes
                .insert(request_id.to_string(), terminal);
        }
        if let Some(duration) = elapsed {
            state.estimator.record(duration);
        }
        match terminal {
            EntryState::Completed => state.completed += 1,
            EntryState::Failed => state.failed += 1,
            _ => {}
        }
        self.governor.release();
        log::debug!("Scan '{}' finished as {}", request_id, terminal);

        let event = match message {
            Some(message) => ScanEvent::with_message(
                event_type,
                request_id.to_string(),
                scan_id,
                image_id,
                message,
            ),
            None => ScanEvent::new(event_type, request_id.to_string(), scan_id, image_id),
        };
        state.dispatch.push_back(Event::Scan(event));

        self.promote_locked(&mut state);
        Ok(())
    }

    fn cancel_locked(&self, request_id: &str) -> QueueResult<CancelOutcome> {
        let mut state = self.lock_state()?;
        let current = match state.entries.get(request_id) {
            Some(entry) => entry.state(),
            None => return Ok(CancelOutcome::NotFound),
        };

        match current {
            EntryState::Queued => {
                self.cancel_queued_entry(&mut state, request_id);
                Ok(CancelOutcome::Cancelled)
            }
            EntryState::Running => Ok(CancelOutcome::AlreadyRunning),
            // Terminal entries are pruned at their transition, so a live
            // entry can only be queued or running; report the stale record
            // as not found rather than touch it
            _ => Ok(CancelOutcome::NotFound),
        }
    }

    fn clear_queue_locked(&self) -> QueueResult<usize> {
        let mut state = self.lock_state()?;
        let waiting = state.admission.drain();
        for request_id in &waiting {
            self.cancel_queued_entry(&mut state, request_id);
        }
        let cleared = waiting.len();
        state.dispatch.push_back(Event::System(SystemEvent::with_message(
            SystemEventType::QueueCleared,
            format!("{} queued entries cancelled", cleared),
        )));
        log::info!("Queue cleared: {} entries cancelled", cleared);
        Ok(cleared)
    }

    /// Shared cancellation path; tolerates the id already being absent from
    /// the admission queue (clear_queue drains it up front)
    fn cancel_queued_entry(&self, state: &mut QueueState, request_id: &str) {
        state.admission.remove(request_id);

        let (scan_id, image_id, batch_member) = {
            let Some(entry) = state.entries.get_mut(request_id) else {
                log::error!(
                    "Cancellation of '{}' found no entry record; queue index out of sync",
                    request_id
                );
                return;
            };
            if let Err(err) = entry.transition_to(EntryState::Cancelled) {
                log::error!("Cancellation of '{}' rejected: {}", request_id, err);
                return;
            }
            (
                entry.scan_id().to_string(),
                entry.image_id().to_string(),
                entry.batch_id().is_some(),
            )
        };

        state.entries.remove(request_id);
        if batch_member {
            state
                .batch_outcomes
                .insert(request_id.to_string(), EntryState::Cancelled);
        }
        state.cancelled += 1;
        state.dispatch.push_back(Event::Scan(ScanEvent::new(
            ScanEventType::Cancelled,
            request_id.to_string(),
            scan_id,
            image_id,
        )));
    }

    /// Promotion loop: the only path from `queued` to `running`
    ///
    /// Errors here are recovered locally so a single bad entry can never
    /// stall the queue.
    fn promote_locked(&self, state: &mut QueueState) {
        loop {
            if state.admission.is_empty() {
                break;
            }
            if !self.governor.try_acquire() {
                break;
            }
            let Some(request_id) = state.admission.pop_highest_priority() else {
                // Raced with nothing: the queue emptied between the check and
                // the pop; give the slot back
                self.governor.release();
                break;
            };

            match state.entries.get_mut(&request_id) {
                Some(entry) => {
                    if let Err(err) = entry.transition_to(EntryState::Running) {
                        log::error!("Promotion of '{}' rejected: {}", request_id, err);
                        self.governor.release();
                        continue;
                    }
                    log::debug!("Scan '{}' promoted to running", request_id);
                    state.dispatch.push_back(Event::Scan(ScanEvent::with_request(
                        ScanEventType::Started,
                        request_id.clone(),
                        entry.scan_id().to_string(),
                        entry.image_id().to_string(),
                        Arc::clone(entry.request()),
                    )));
                }
                None => {
                    log::error!(
                        "Admission queue referenced unknown entry '{}'; dropping",
                        request_id
                    );
                    self.governor.release();
                }
            }
        }
    }

    async fn stage_system_event(&self, event: SystemEvent) {
        match self.lock_state() {
            Ok(mut state) => state.dispatch.push_back(Event::System(event)),
            Err(err) => log::error!("Could not stage system event: {}", err),
        }
        self.flush_events().await;
    }

    /// Deliver staged events in transition order
    ///
    /// Events are staged under the state lock and drained here under the
    /// notification lock, so delivery order always matches the order the
    /// transitions occurred in, across entries.
    async fn flush_events(&self) {
        let mut notifications = self.notifications.lock().await;
        loop {
            let batch: Vec<Event> = {
                let mut state = match self.state.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                state.dispatch.drain(..).collect()
            };
            if batch.is_empty() {
                break;
            }
            for event in batch {
                if let Err(err) = notifications.publish(event).await {
                    log::warn!("Event delivery incomplete: {}", err);
                }
            }
        }
    }
}
