//! Orchestrator test suites


use std::sync::Arc;

use crate::core::config::QueueConfig;
use crate::queue::entry::ScanRequest;
use crate::queue::manager::ScanQueueManager;
use crate::queue::types::ScanSubmission;

/// Manager with the given ceiling and fast-draining test defaults
pub(crate) async fn manager_with_ceiling(max_concurrent: usize) -> Arc<ScanQueueManager> {
    let config = QueueConfig {
        max_concurrent,
        ..QueueConfig::default()
    };
    ScanQueueManager::create(config)
        .await
        .expect("valid test configuration")
}

/// Interactive submission with derived scan and image ids
pub(crate) fn submission(request_id: &str) -> ScanSubmission {
    ScanSubmission::new(
        request_id.to_string(),
        format!("scan-{request_id}"),
        format!("sha256:{request_id}"),
        ScanRequest::new(format!("registry.local/{request_id}:latest")),
    )
}
