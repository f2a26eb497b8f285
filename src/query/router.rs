use crate::error::Result;
use crate::metrics::STORE_QUERIES_TOTAL;
use crate::models::{Incident, Page, PageRequest, Priority, Status};
use crate::query::build_search_term;
use crate::state::IncidentStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Optional filters accepted by an incident listing request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCriteria {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Raw free-text term, normalized by the router
    pub search: Option<String>,
}

impl ListingCriteria {
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
}

/// The single store query a listing request resolves to.
///
/// Status and priority always take precedence over the search term; search
/// is never combined with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryForm {
    StatusAndPriority(Status, Priority),
    Status(Status),
    Priority(Priority),
    SearchTerm(String),
    All,
}

impl QueryForm {
    /// Select the query form for `criteria`; first match wins
    pub fn select(criteria: &ListingCriteria) -> Self {
        match (criteria.status, criteria.priority) {
            (Some(status), Some(priority)) => QueryForm::StatusAndPriority(status, priority),
            (Some(status), None) => QueryForm::Status(status),
            (None, Some(priority)) => QueryForm::Priority(priority),
            (None, None) => match build_search_term(criteria.search.as_deref()) {
                Some(term) => QueryForm::SearchTerm(term),
                None => QueryForm::All,
            },
        }
    }

    /// Metric/log label
    pub fn label(&self) -> &'static str {
        match self {
            QueryForm::StatusAndPriority(..) => "status_and_priority",
            QueryForm::Status(_) => "status",
            QueryForm::Priority(_) => "priority",
            QueryForm::SearchTerm(_) => "search_term",
            QueryForm::All => "all",
        }
    }
}

/// Routes listing requests to exactly one store query
#[derive(Clone)]
pub struct QueryRouter {
    store: Arc<dyn IncidentStore>,
}

impl QueryRouter {
    pub fn new(store: Arc<dyn IncidentStore>) -> Self {
        Self { store }
    }

    /// Select and run the query for `criteria`
    pub async fn route(
        &self,
        criteria: &ListingCriteria,
        page: &PageRequest,
    ) -> Result<Page<Incident>> {
        self.execute(&QueryForm::select(criteria), page).await
    }

    /// Run an already-selected query form. Exactly one store call.
    pub async fn execute(&self, form: &QueryForm, page: &PageRequest) -> Result<Page<Incident>> {
        tracing::debug!(form = form.label(), page = page.page, size = page.size, "Routing listing query");
        STORE_QUERIES_TOTAL.with_label_values(&[form.label()]).inc();

        match form {
            QueryForm::StatusAndPriority(status, priority) => {
                self.store
                    .query_by_status_and_priority(*status, *priority, page)
                    .await
            }
            QueryForm::Status(status) => self.store.query_by_status(*status, page).await,
            QueryForm::Priority(priority) => self.store.query_by_priority(*priority, page).await,
            QueryForm::SearchTerm(term) => self.store.query_by_search_term(term, page).await,
            QueryForm::All => self.store.query_all(page).await,
        }
    }
}
