//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use incident_desk::{
    config::CacheConfig,
    models::{Comment, Incident, IncidentFields, Page, PageRequest, Priority, Status},
    AppError,
    service::IncidentService,
    state::{CommentStore, InMemoryStore, IncidentStore},
    Result,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory store that records the name of every method invoked on it.
///
/// While [`set_unavailable`](Self::set_unavailable) is on, every call is
/// still recorded but fails with `StoreUnavailable`.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<&'static str>>,
    unavailable: AtomicBool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: &'static str) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(format!("{} failed", call)));
        }
        Ok(())
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Every call recorded so far
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls to `name`
    pub fn count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl IncidentStore for RecordingStore {
    async fn create_incident(&self, incident: &Incident) -> Result<Incident> {
        self.record("create_incident")?;
        self.inner.create_incident(incident).await
    }

    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>> {
        self.record("get_incident")?;
        self.inner.get_incident(id).await
    }

    async fn update_incident(&self, incident: &Incident) -> Result<Incident> {
        self.record("update_incident")?;
        self.inner.update_incident(incident).await
    }

    async fn delete_incident(&self, id: &Uuid) -> Result<bool> {
        self.record("delete_incident")?;
        self.inner.delete_incident(id).await
    }

    async fn query_by_status(&self, status: Status, page: &PageRequest) -> Result<Page<Incident>> {
        self.record("query_by_status")?;
        self.inner.query_by_status(status, page).await
    }

    async fn query_by_priority(
        &self,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        self.record("query_by_priority")?;
        self.inner.query_by_priority(priority, page).await
    }

    async fn query_by_status_and_priority(
        &self,
        status: Status,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        self.record("query_by_status_and_priority")?;
        self.inner
            .query_by_status_and_priority(status, priority, page)
            .await
    }

    async fn query_by_search_term(
        &self,
        term: &str,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        self.record("query_by_search_term")?;
        self.inner.query_by_search_term(term, page).await
    }

    async fn query_by_responsible(
        &self,
        email: &str,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        self.record("query_by_responsible")?;
        self.inner.query_by_responsible(email, page).await
    }

    async fn query_all(&self, page: &PageRequest) -> Result<Page<Incident>> {
        self.record("query_all")?;
        self.inner.query_all(page).await
    }

    async fn count_total(&self) -> Result<u64> {
        self.record("count_total")?;
        self.inner.count_total().await
    }

    async fn count_by_status(&self, status: Status) -> Result<u64> {
        self.record("count_by_status")?;
        self.inner.count_by_status(status).await
    }

    async fn count_by_priority(&self, priority: Priority) -> Result<u64> {
        self.record("count_by_priority")?;
        self.inner.count_by_priority(priority).await
    }
}

#[async_trait]
impl CommentStore for RecordingStore {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        self.record("create_comment")?;
        self.inner.create_comment(comment).await
    }

    async fn get_comment(&self, id: &Uuid) -> Result<Option<Comment>> {
        self.record("get_comment")?;
        self.inner.get_comment(id).await
    }

    async fn delete_comment(&self, id: &Uuid) -> Result<bool> {
        self.record("delete_comment")?;
        self.inner.delete_comment(id).await
    }

    async fn list_comments_by_incident(
        &self,
        incident_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Comment>> {
        self.record("list_comments_by_incident")?;
        self.inner.list_comments_by_incident(incident_id, page).await
    }
}

/// A service over a fresh recording store
pub fn recording_service() -> (IncidentService, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::new());
    let service = IncidentService::with_store(store.clone(), &CacheConfig::default());
    (service, store)
}

pub fn fields(title: &str, status: Status, priority: Priority) -> IncidentFields {
    IncidentFields {
        title: title.to_string(),
        description: Some(format!("{} in production", title)),
        priority,
        status,
        responsible_email: "oncall@example.com".to_string(),
        tags: vec![],
    }
}
