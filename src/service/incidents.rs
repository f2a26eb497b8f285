use crate::config::CacheConfig;
use crate::error::{AppError, Result};
use crate::metrics::record_mutation;
use crate::models::{
    Comment, Incident, IncidentFields, Page, PageRequest, StatsSnapshot, Status,
};
use crate::query::{CommentKey, ListingCriteria, ListingKey, QueryRouter, StatsKey};
use crate::service::{CacheLayer, CacheStats, StatsAggregator};
use crate::state::{CommentStore, IncidentStore};
use std::sync::Arc;
use uuid::Uuid;

/// A comment to be attached to an incident
#[derive(Debug, Clone)]
pub struct NewComment {
    pub incident_id: Uuid,
    pub author: String,
    pub message: String,
}

/// Incident operations with read-through caching in front of the store.
///
/// Reads go through the cache regions in [`CacheLayer`]; every successful
/// mutation invalidates the regions that could now be stale before it
/// returns. Mutations that hit a missing id touch no cache.
#[derive(Clone)]
pub struct IncidentService {
    incidents: Arc<dyn IncidentStore>,
    comments: Arc<dyn CommentStore>,
    router: QueryRouter,
    aggregator: StatsAggregator,
    caches: CacheLayer,
}

impl IncidentService {
    pub fn new(
        incidents: Arc<dyn IncidentStore>,
        comments: Arc<dyn CommentStore>,
        config: &CacheConfig,
    ) -> Self {
        Self {
            router: QueryRouter::new(incidents.clone()),
            aggregator: StatsAggregator::new(incidents.clone()),
            caches: CacheLayer::new(config),
            incidents,
            comments,
        }
    }

    /// Build a service over a store implementing both record types
    pub fn with_store<S>(store: Arc<S>, config: &CacheConfig) -> Self
    where
        S: IncidentStore + CommentStore + 'static,
    {
        Self::new(store.clone(), store, config)
    }

    // ========== Incident reads ==========

    /// List incidents matching `criteria`, routed to a single store query
    pub async fn list_incidents(
        &self,
        criteria: &ListingCriteria,
        page: &PageRequest,
    ) -> Result<Arc<Page<Incident>>> {
        let key = ListingKey::filtered(criteria, page);
        self.caches
            .listings
            .read_through(key, || async {
                self.router.route(criteria, page).await.map(Arc::new)
            })
            .await
    }

    /// List incidents owned by one responsible party
    pub async fn list_by_responsible(
        &self,
        email: &str,
        page: &PageRequest,
    ) -> Result<Arc<Page<Incident>>> {
        let key = ListingKey::responsible(email, page);
        self.caches
            .listings
            .read_through(key, || async {
                self.incidents
                    .query_by_responsible(email, page)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    pub async fn get_incident(&self, id: &Uuid) -> Result<Option<Arc<Incident>>> {
        self.caches
            .items
            .read_through_optional(*id, || async {
                self.incidents
                    .get_incident(id)
                    .await
                    .map(|found| found.map(Arc::new))
            })
            .await
    }

    // ========== Incident mutations ==========

    pub async fn create_incident(&self, fields: IncidentFields) -> Result<Incident> {
        let incident = Incident::new(fields);
        let created = self.incidents.create_incident(&incident).await?;

        self.caches.incident_created();
        record_mutation("create_incident", true);

        tracing::info!(
            incident_id = %created.id,
            status = %created.status,
            priority = %created.priority,
            "Incident created"
        );
        Ok(created)
    }

    /// Replace every mutable field of an incident. `None` if it does not exist.
    pub async fn update_incident(
        &self,
        id: &Uuid,
        fields: IncidentFields,
    ) -> Result<Option<Incident>> {
        self.modify(id, "update_incident", |incident| incident.apply(fields))
            .await
    }

    /// Change only the status of an incident. `None` if it does not exist.
    pub async fn patch_status(&self, id: &Uuid, status: Status) -> Result<Option<Incident>> {
        self.modify(id, "patch_status", |incident| incident.set_status(status))
            .await
    }

    /// Delete an incident. `false` if it does not exist.
    pub async fn delete_incident(&self, id: &Uuid) -> Result<bool> {
        let deleted = self.incidents.delete_incident(id).await?;
        record_mutation("delete_incident", deleted);

        if deleted {
            self.caches.incident_deleted(id).await;
            tracing::info!(incident_id = %id, "Incident deleted");
        }
        Ok(deleted)
    }

    /// Read the authoritative record, mutate it, write it back, then
    /// invalidate. The cached copy is never used as the base of a write.
    async fn modify<F>(&self, id: &Uuid, operation: &str, mutate: F) -> Result<Option<Incident>>
    where
        F: FnOnce(&mut Incident),
    {
        let Some(mut incident) = self.incidents.get_incident(id).await? else {
            record_mutation(operation, false);
            return Ok(None);
        };

        mutate(&mut incident);

        let updated = match self.incidents.update_incident(&incident).await {
            Ok(updated) => updated,
            // Deleted between the read and the write
            Err(AppError::NotFound(_)) => {
                record_mutation(operation, false);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.caches.incident_changed(id).await;
        record_mutation(operation, true);

        tracing::info!(
            incident_id = %id,
            operation,
            status = %updated.status,
            "Incident modified"
        );
        Ok(Some(updated))
    }

    // ========== Comments ==========

    /// Comments of an incident, newest first
    pub async fn list_comments(
        &self,
        incident_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Arc<Page<Comment>>> {
        let key = CommentKey::new(*incident_id, page);
        self.caches
            .comments
            .read_through(key, || async {
                self.comments
                    .list_comments_by_incident(incident_id, page)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    /// Attach a comment. The incident's `updated_at` is left alone.
    pub async fn create_comment(&self, request: NewComment) -> Result<Comment> {
        let comment = Comment::new(request.incident_id, request.author, request.message);
        let created = self.comments.create_comment(&comment).await?;

        self.caches.comment_changed(&created.incident_id).await;
        record_mutation("create_comment", true);

        tracing::info!(
            comment_id = %created.id,
            incident_id = %created.incident_id,
            "Comment created"
        );
        Ok(created)
    }

    /// Delete a comment. `false` if it does not exist.
    pub async fn delete_comment(&self, id: &Uuid) -> Result<bool> {
        let Some(comment) = self.comments.get_comment(id).await? else {
            record_mutation("delete_comment", false);
            return Ok(false);
        };

        let deleted = self.comments.delete_comment(id).await?;
        record_mutation("delete_comment", deleted);

        if deleted {
            self.caches.comment_changed(&comment.incident_id).await;
            tracing::info!(
                comment_id = %id,
                incident_id = %comment.incident_id,
                "Comment deleted"
            );
        }
        Ok(deleted)
    }

    // ========== Stats ==========

    pub async fn get_stats(&self) -> Result<Arc<StatsSnapshot>> {
        self.caches
            .stats
            .read_through(StatsKey, || async {
                self.aggregator.compute().await.map(Arc::new)
            })
            .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.caches.stats()
    }
}
