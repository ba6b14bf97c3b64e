//! Shared helpers for integration tests

use std::sync::Arc;

use scangate::core::config::QueueConfig;
use scangate::queue::api::{ScanQueueManager, ScanRequest, ScanSubmission};

/// Manager with the given concurrency ceiling
pub async fn manager_with_ceiling(max_concurrent: usize) -> Arc<ScanQueueManager> {
    let config = QueueConfig {
        max_concurrent,
        ..QueueConfig::default()
    };
    ScanQueueManager::create(config)
        .await
        .expect("valid test configuration")
}

/// Interactive submission with derived scan and image ids
pub fn submission(request_id: &str) -> ScanSubmission {
    ScanSubmission::new(
        request_id.to_string(),
        format!("scan-{request_id}"),
        format!("sha256:{request_id}"),
        ScanRequest::new(format!("registry.local/{request_id}:latest")),
    )
}
