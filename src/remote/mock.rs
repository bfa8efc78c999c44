//! Scriptable in-memory stand-in for the real backend.
//!
//! Lets the lifecycle tracker be exercised without a live backend:
//! each operation answers from a queue of scripted outcomes, falling
//! back to a benign default when its queue is empty, and records the
//! call for assertions. Transfers and polls can additionally be gated
//! so a test can interleave other work with an in-flight pipeline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::types::{Concept, RemoteServices};
use super::RemoteError;

#[derive(Default)]
pub struct MockRemoteServices {
    script: Mutex<Script>,
    calls: Mutex<Vec<String>>,
    transfer_gate: Mutex<Option<Arc<Notify>>>,
    poll_gate: Mutex<Option<Arc<Notify>>>,
}

#[derive(Default)]
struct Script {
    upload_destinations: VecDeque<Result<String, RemoteError>>,
    transfers: VecDeque<Result<(), RemoteError>>,
    triggers: VecDeque<Result<(), RemoteError>>,
    polls: VecDeque<Result<Option<String>, RemoteError>>,
    summaries: VecDeque<Result<String, RemoteError>>,
    concepts: VecDeque<Result<Vec<Concept>, RemoteError>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockRemoteServices {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Scripting ───────────────────────────────────────────

    pub fn queue_upload_destination(&self, outcome: Result<String, RemoteError>) {
        lock(&self.script).upload_destinations.push_back(outcome);
    }

    pub fn queue_transfer(&self, outcome: Result<(), RemoteError>) {
        lock(&self.script).transfers.push_back(outcome);
    }

    pub fn queue_trigger(&self, outcome: Result<(), RemoteError>) {
        lock(&self.script).triggers.push_back(outcome);
    }

    pub fn queue_poll(&self, outcome: Result<Option<String>, RemoteError>) {
        lock(&self.script).polls.push_back(outcome);
    }

    pub fn queue_summary(&self, outcome: Result<String, RemoteError>) {
        lock(&self.script).summaries.push_back(outcome);
    }

    pub fn queue_concepts(&self, outcome: Result<Vec<Concept>, RemoteError>) {
        lock(&self.script).concepts.push_back(outcome);
    }

    /// Block `transfer_file` until the returned handle is notified.
    pub fn gate_transfers(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.transfer_gate) = Some(gate.clone());
        gate
    }

    /// Block `poll_extracted_text` until the returned handle is notified.
    pub fn gate_polls(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *lock(&self.poll_gate) = Some(gate.clone());
        gate
    }

    // ── Assertions ──────────────────────────────────────────

    /// Every recorded call, oldest first.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    /// Whether any recorded call starts with the given prefix.
    pub fn called(&self, prefix: &str) -> bool {
        lock(&self.calls).iter().any(|c| c.starts_with(prefix))
    }

    fn record(&self, call: String) {
        lock(&self.calls).push(call);
    }
}

#[async_trait]
impl RemoteServices for MockRemoteServices {
    async fn request_upload_destination(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, RemoteError> {
        self.record(format!(
            "request_upload_destination {file_name} {content_type}"
        ));
        lock(&self.script)
            .upload_destinations
            .pop_front()
            .unwrap_or_else(|| Ok(format!("https://mock-storage.invalid/upload/{file_name}")))
    }

    async fn transfer_file(
        &self,
        destination: &str,
        _source_location: &str,
        _content_type: &str,
    ) -> Result<(), RemoteError> {
        self.record(format!("transfer_file {destination}"));
        let gate = lock(&self.transfer_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.script).transfers.pop_front().unwrap_or(Ok(()))
    }

    async fn trigger_processing(&self, remote_path: &str) -> Result<(), RemoteError> {
        self.record(format!("trigger_processing {remote_path}"));
        lock(&self.script).triggers.pop_front().unwrap_or(Ok(()))
    }

    async fn poll_extracted_text(
        &self,
        output_path: &str,
    ) -> Result<Option<String>, RemoteError> {
        self.record(format!("poll_extracted_text {output_path}"));
        let gate = lock(&self.poll_gate).clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        lock(&self.script).polls.pop_front().unwrap_or(Ok(None))
    }

    async fn summarize(&self, text: &str) -> Result<String, RemoteError> {
        self.record(format!("summarize {} chars", text.len()));
        lock(&self.script)
            .summaries
            .pop_front()
            .unwrap_or_else(|| Ok("Mock summary.".to_string()))
    }

    async fn extract_concepts(&self, text: &str) -> Result<Vec<Concept>, RemoteError> {
        self.record(format!("extract_concepts {} chars", text.len()));
        lock(&self.script).concepts.pop_front().unwrap_or(Ok(vec![]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn defaults_are_benign() {
        let mock = MockRemoteServices::new();
        let url = mock
            .request_upload_destination("report.pdf", "application/pdf")
            .await
            .unwrap();
        assert!(url.ends_with("report.pdf"));
        mock.transfer_file(&url, "/tmp/report.pdf", "application/pdf")
            .await
            .unwrap();
        mock.trigger_processing("uploads/guest/report.pdf")
            .await
            .unwrap();
        assert_eq!(mock.poll_extracted_text("some/path").await.unwrap(), None);
    }

    #[tokio::test]
    async fn scripted_outcomes_pop_in_order() {
        let mock = MockRemoteServices::new();
        mock.queue_poll(Ok(None));
        mock.queue_poll(Ok(Some("Hello world".into())));

        assert_eq!(mock.poll_extracted_text("p").await.unwrap(), None);
        assert_eq!(
            mock.poll_extracted_text("p").await.unwrap().as_deref(),
            Some("Hello world")
        );
        // Queue drained: back to the default.
        assert_eq!(mock.poll_extracted_text("p").await.unwrap(), None);
    }

    #[tokio::test]
    async fn scripted_error_is_returned() {
        let mock = MockRemoteServices::new();
        mock.queue_upload_destination(Err(RemoteError::Unauthenticated));
        let err = mock
            .request_upload_destination("a.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Unauthenticated));
    }

    #[tokio::test]
    async fn calls_are_recorded() {
        let mock = MockRemoteServices::new();
        mock.trigger_processing("uploads/guest/a.pdf").await.unwrap();
        mock.summarize("some text").await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], "trigger_processing uploads/guest/a.pdf");
        assert!(mock.called("summarize"));
        assert!(!mock.called("transfer_file"));
    }

    #[tokio::test]
    async fn gated_transfer_waits_for_release() {
        let mock = Arc::new(MockRemoteServices::new());
        let gate = mock.gate_transfers();

        let task = {
            let mock = mock.clone();
            tokio::spawn(async move {
                mock.transfer_file("dest", "src", "application/pdf").await
            })
        };

        // A stored permit means release-before-wait cannot deadlock.
        gate.notify_one();
        task.await.unwrap().unwrap();
    }
}
