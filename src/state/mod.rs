pub mod store;
pub mod cache;

pub use store::*;
pub use cache::*;

use crate::error::Result;
use crate::models::{Comment, Incident, Page, PageRequest, Priority, Status};
use async_trait::async_trait;
use uuid::Uuid;

/// Authoritative storage for incidents.
///
/// Every method is expected to be transactionally consistent on its own.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Persist a new incident
    async fn create_incident(&self, incident: &Incident) -> Result<Incident>;

    /// Get an incident by ID
    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>>;

    /// Replace a stored incident; `NotFound` if it does not exist
    async fn update_incident(&self, incident: &Incident) -> Result<Incident>;

    /// Delete an incident, returning whether it existed
    async fn delete_incident(&self, id: &Uuid) -> Result<bool>;

    async fn query_by_status(&self, status: Status, page: &PageRequest) -> Result<Page<Incident>>;

    async fn query_by_priority(
        &self,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>>;

    async fn query_by_status_and_priority(
        &self,
        status: Status,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>>;

    /// Case-insensitive substring match over title or description
    async fn query_by_search_term(&self, term: &str, page: &PageRequest)
        -> Result<Page<Incident>>;

    async fn query_by_responsible(
        &self,
        email: &str,
        page: &PageRequest,
    ) -> Result<Page<Incident>>;

    async fn query_all(&self, page: &PageRequest) -> Result<Page<Incident>>;

    async fn count_total(&self) -> Result<u64>;

    async fn count_by_status(&self, status: Status) -> Result<u64>;

    async fn count_by_priority(&self, priority: Priority) -> Result<u64>;
}

/// Authoritative storage for comments
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment; `NotFound` if its incident does not exist
    async fn create_comment(&self, comment: &Comment) -> Result<Comment>;

    async fn get_comment(&self, id: &Uuid) -> Result<Option<Comment>>;

    /// Delete a comment, returning whether it existed
    async fn delete_comment(&self, id: &Uuid) -> Result<bool>;

    /// Comments of one incident, newest first
    async fn list_comments_by_incident(
        &self,
        incident_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Comment>>;
}
