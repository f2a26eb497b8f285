pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::config::PaginationConfig;
use crate::service::IncidentService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<IncidentService>,
    pub pagination: PaginationConfig,
    /// Reported as uptime by the health check
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<IncidentService>) -> Self {
        Self {
            service,
            pagination: PaginationConfig::default(),
            started_at: Instant::now(),
        }
    }

    /// Count uptime from `started_at` instead of construction time
    pub fn with_started_at(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// Override the default page size bounds
    pub fn with_pagination(mut self, pagination: PaginationConfig) -> Self {
        self.pagination = pagination;
        self
    }
}
