use crate::error::{AppError, Result};
use crate::models::{
    Comment, Incident, Page, PageRequest, Priority, Sort, SortDirection, SortField, Status,
};
use crate::state::{CommentStore, IncidentStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::cmp::Ordering;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory incident and comment store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    incidents: Arc<DashMap<Uuid, Incident>>,
    comments: Arc<DashMap<Uuid, Comment>>,
    comment_index: Arc<DashMap<Uuid, Vec<Uuid>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(DashMap::new()),
            comments: Arc::new(DashMap::new()),
            comment_index: Arc::new(DashMap::new()),
        }
    }

    fn query<F>(&self, page: &PageRequest, predicate: F) -> Page<Incident>
    where
        F: Fn(&Incident) -> bool,
    {
        let mut incidents: Vec<Incident> = self
            .incidents
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        incidents.sort_by(|a, b| compare_incidents(a, b, page.sort.as_ref()));

        paginate(incidents, page)
    }

    fn count<F>(&self, predicate: F) -> u64
    where
        F: Fn(&Incident) -> bool,
    {
        self.incidents
            .iter()
            .filter(|entry| predicate(entry.value()))
            .count() as u64
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn paginate<T>(items: Vec<T>, page: &PageRequest) -> Page<T> {
    let total = items.len() as u64;
    let content = items
        .into_iter()
        .skip(page.offset())
        .take(page.size as usize)
        .collect();

    Page::new(content, page, total)
}

/// Order by the requested field, ties broken by creation time then id.
/// Without a sort, newest first.
fn compare_incidents(a: &Incident, b: &Incident, sort: Option<&Sort>) -> Ordering {
    let Some(sort) = sort else {
        return b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id));
    };

    let ordering = match sort.field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Priority => a.priority.cmp(&b.priority),
        SortField::Status => a.status.cmp(&b.status),
    }
    .then_with(|| a.created_at.cmp(&b.created_at))
    .then_with(|| a.id.cmp(&b.id));

    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl IncidentStore for InMemoryStore {
    async fn create_incident(&self, incident: &Incident) -> Result<Incident> {
        self.incidents.insert(incident.id, incident.clone());
        tracing::debug!(incident_id = %incident.id, "Incident saved");
        Ok(incident.clone())
    }

    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>> {
        Ok(self.incidents.get(id).map(|entry| entry.clone()))
    }

    async fn update_incident(&self, incident: &Incident) -> Result<Incident> {
        match self.incidents.get_mut(&incident.id) {
            Some(mut entry) => {
                *entry = incident.clone();
                tracing::debug!(incident_id = %incident.id, "Incident updated");
                Ok(incident.clone())
            }
            None => Err(AppError::NotFound(format!(
                "Incident {} not found",
                incident.id
            ))),
        }
    }

    async fn delete_incident(&self, id: &Uuid) -> Result<bool> {
        if self.incidents.remove(id).is_none() {
            return Ok(false);
        }

        // Comments do not outlive their incident
        if let Some((_, comment_ids)) = self.comment_index.remove(id) {
            for comment_id in comment_ids {
                self.comments.remove(&comment_id);
            }
        }

        tracing::debug!(incident_id = %id, "Incident deleted");
        Ok(true)
    }

    async fn query_by_status(&self, status: Status, page: &PageRequest) -> Result<Page<Incident>> {
        Ok(self.query(page, |i| i.status == status))
    }

    async fn query_by_priority(
        &self,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        Ok(self.query(page, |i| i.priority == priority))
    }

    async fn query_by_status_and_priority(
        &self,
        status: Status,
        priority: Priority,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        Ok(self.query(page, |i| i.status == status && i.priority == priority))
    }

    async fn query_by_search_term(
        &self,
        term: &str,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        let term = term.to_lowercase();
        Ok(self.query(page, |i| i.matches_term(&term)))
    }

    async fn query_by_responsible(
        &self,
        email: &str,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        Ok(self.query(page, |i| i.responsible_email == email))
    }

    async fn query_all(&self, page: &PageRequest) -> Result<Page<Incident>> {
        Ok(self.query(page, |_| true))
    }

    async fn count_total(&self) -> Result<u64> {
        Ok(self.incidents.len() as u64)
    }

    async fn count_by_status(&self, status: Status) -> Result<u64> {
        Ok(self.count(|i| i.status == status))
    }

    async fn count_by_priority(&self, priority: Priority) -> Result<u64> {
        Ok(self.count(|i| i.priority == priority))
    }
}

#[async_trait]
impl CommentStore for InMemoryStore {
    async fn create_comment(&self, comment: &Comment) -> Result<Comment> {
        if !self.incidents.contains_key(&comment.incident_id) {
            return Err(AppError::NotFound(format!(
                "Incident {} not found",
                comment.incident_id
            )));
        }

        self.comments.insert(comment.id, comment.clone());
        self.comment_index
            .entry(comment.incident_id)
            .or_default()
            .push(comment.id);

        tracing::debug!(
            comment_id = %comment.id,
            incident_id = %comment.incident_id,
            "Comment saved"
        );
        Ok(comment.clone())
    }

    async fn get_comment(&self, id: &Uuid) -> Result<Option<Comment>> {
        Ok(self.comments.get(id).map(|entry| entry.clone()))
    }

    async fn delete_comment(&self, id: &Uuid) -> Result<bool> {
        let Some((_, comment)) = self.comments.remove(id) else {
            return Ok(false);
        };

        if let Some(mut entry) = self.comment_index.get_mut(&comment.incident_id) {
            entry.retain(|comment_id| comment_id != id);
        }

        tracing::debug!(comment_id = %id, "Comment deleted");
        Ok(true)
    }

    async fn list_comments_by_incident(
        &self,
        incident_id: &Uuid,
        page: &PageRequest,
    ) -> Result<Page<Comment>> {
        let mut comments: Vec<Comment> = match self.comment_index.get(incident_id) {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.comments.get(id).map(|entry| entry.clone()))
                .collect(),
            None => Vec::new(),
        };

        comments.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        Ok(paginate(comments, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IncidentFields;

    fn incident(title: &str, priority: Priority, status: Status) -> Incident {
        Incident::new(IncidentFields {
            title: title.to_string(),
            description: Some(format!("{} description", title)),
            priority,
            status,
            responsible_email: "oncall@example.com".to_string(),
            tags: vec![],
        })
    }

    #[tokio::test]
    async fn test_save_and_get_incident() {
        let store = InMemoryStore::new();
        let incident = incident("Disk full on db-1", Priority::High, Status::Open);

        store.create_incident(&incident).await.unwrap();

        let retrieved = store.get_incident(&incident.id).await.unwrap();
        assert_eq!(retrieved, Some(incident));
    }

    #[tokio::test]
    async fn test_update_missing_incident_is_not_found() {
        let store = InMemoryStore::new();
        let incident = incident("Ghost incident", Priority::Low, Status::Open);

        let result = store.update_incident(&incident).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_filtered_queries_and_counts() {
        let store = InMemoryStore::new();

        for i in 0..6 {
            let priority = if i % 2 == 0 { Priority::High } else { Priority::Low };
            let status = if i < 3 { Status::Open } else { Status::Resolved };
            store
                .create_incident(&incident(&format!("Incident {}", i), priority, status))
                .await
                .unwrap();
        }

        let page = PageRequest::new(0, 10);
        let open_high = store
            .query_by_status_and_priority(Status::Open, Priority::High, &page)
            .await
            .unwrap();
        assert_eq!(open_high.total_elements, 2);

        let resolved = store.query_by_status(Status::Resolved, &page).await.unwrap();
        assert_eq!(resolved.total_elements, 3);

        assert_eq!(store.count_total().await.unwrap(), 6);
        assert_eq!(store.count_by_priority(Priority::High).await.unwrap(), 3);
        assert_eq!(store.count_by_status(Status::Cancelled).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_matches_title_or_description() {
        let store = InMemoryStore::new();
        let mut quiet = incident("Certificate expiry", Priority::Medium, Status::Open);
        quiet.description = Some("TLS cert on the DB proxy".to_string());
        store.create_incident(&quiet).await.unwrap();
        store
            .create_incident(&incident("Queue backlog", Priority::Low, Status::Open))
            .await
            .unwrap();

        let page = PageRequest::new(0, 10);
        let found = store.query_by_search_term("db", &page).await.unwrap();
        assert_eq!(found.content.len(), 1);
        assert_eq!(found.content[0].id, quiet.id);
    }

    #[tokio::test]
    async fn test_pagination_and_sort() {
        let store = InMemoryStore::new();
        for title in ["Charlie", "alpha", "Bravo"] {
            store
                .create_incident(&incident(title, Priority::Low, Status::Open))
                .await
                .unwrap();
        }

        let page = PageRequest::new(0, 2).with_sort(Sort::new(SortField::Title, SortDirection::Asc));
        let first = store.query_all(&page).await.unwrap();
        let titles: Vec<_> = first.content.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["alpha", "Bravo"]);
        assert_eq!(first.total_pages, 2);

        let second = store.query_all(&PageRequest { page: 1, ..page }).await.unwrap();
        assert_eq!(second.content.len(), 1);
        assert_eq!(second.content[0].title, "Charlie");
    }

    #[tokio::test]
    async fn test_comments_require_incident_and_cascade() {
        let store = InMemoryStore::new();
        let orphan = Comment::new(Uuid::new_v4(), "sre".to_string(), "hello".to_string());
        assert!(matches!(
            store.create_comment(&orphan).await,
            Err(AppError::NotFound(_))
        ));

        let parent = incident("API errors", Priority::High, Status::Open);
        store.create_incident(&parent).await.unwrap();
        let comment = Comment::new(parent.id, "sre".to_string(), "looking".to_string());
        store.create_comment(&comment).await.unwrap();
        let listed = store
            .list_comments_by_incident(&parent.id, &PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(listed.total_elements, 1);

        assert!(store.delete_incident(&parent.id).await.unwrap());
        assert!(store.get_comment(&comment.id).await.unwrap().is_none());
        assert!(!store.delete_comment(&comment.id).await.unwrap());
    }
}
