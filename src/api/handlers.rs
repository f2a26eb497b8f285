use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::metrics::gather_metrics;
use crate::models::*;
use crate::query::ListingCriteria;
use crate::service::{CacheStats, NewComment};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Prometheus exposition endpoint
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
}

/// Pagination parameters shared by every listing endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// `field` or `field,direction`
    pub sort: Option<String>,
}

impl PageQuery {
    fn to_request(&self, state: &AppState) -> Result<PageRequest> {
        let mut request = PageRequest::new(
            self.page.unwrap_or(0),
            state.pagination.page_size(self.size),
        );

        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            request = request.with_sort(sort.parse()?);
        }

        Ok(request)
    }
}

/// List incidents
pub async fn list_incidents(
    State(state): State<AppState>,
    Query(params): Query<ListIncidentsQuery>,
) -> Result<Json<Page<Incident>>> {
    let page = PageQuery {
        page: params.page,
        size: params.size,
        sort: params.sort,
    }
    .to_request(&state)?;
    let criteria = ListingCriteria {
        status: params.status,
        priority: params.priority,
        search: params.q,
    };

    let incidents = state.service.list_incidents(&criteria, &page).await?;
    Ok(Json(incidents.as_ref().clone()))
}

#[derive(Debug, Deserialize)]
pub struct ListIncidentsQuery {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    /// Free-text search over title and description
    pub q: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
}

/// List incidents owned by a responsible party
pub async fn list_by_responsible(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<Incident>>> {
    let page = params.to_request(&state)?;
    let incidents = state.service.list_by_responsible(&email, &page).await?;
    Ok(Json(incidents.as_ref().clone()))
}

/// Get an incident by ID
pub async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Incident>> {
    let incident = state
        .service
        .get_incident(&id)
        .await?
        .ok_or_else(|| incident_not_found(&id))?;
    Ok(Json(incident.as_ref().clone()))
}

/// Create an incident
pub async fn create_incident(
    State(state): State<AppState>,
    Json(request): Json<IncidentRequest>,
) -> Result<(StatusCode, Json<Incident>)> {
    request.validate()?;

    let created = state.service.create_incident(request.into()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Replace an incident
pub async fn update_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IncidentRequest>,
) -> Result<Json<Incident>> {
    request.validate()?;

    let updated = state
        .service
        .update_incident(&id, request.into())
        .await?
        .ok_or_else(|| incident_not_found(&id))?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize, Validate)]
pub struct IncidentRequest {
    #[validate(length(min = 5, max = 120))]
    pub title: String,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    #[validate(email)]
    pub responsible_email: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl From<IncidentRequest> for IncidentFields {
    fn from(request: IncidentRequest) -> Self {
        IncidentFields {
            title: request.title,
            description: request.description,
            priority: request.priority,
            status: request.status,
            responsible_email: request.responsible_email,
            tags: request.tags,
        }
    }
}

/// Change only the status of an incident
pub async fn patch_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<StatusQuery>,
) -> Result<Json<Incident>> {
    let updated = state
        .service
        .patch_status(&id, params.status)
        .await?
        .ok_or_else(|| incident_not_found(&id))?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Status,
}

/// Delete an incident
pub async fn delete_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.service.delete_incident(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(incident_not_found(&id))
    }
}

/// List the comments of an incident
pub async fn list_comments(
    State(state): State<AppState>,
    Path(incident_id): Path<Uuid>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Page<Comment>>> {
    let page = params.to_request(&state)?;
    let comments = state.service.list_comments(&incident_id, &page).await?;
    Ok(Json(comments.as_ref().clone()))
}

/// Attach a comment to an incident
pub async fn create_comment(
    State(state): State<AppState>,
    Json(request): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    request.validate()?;

    let created = state
        .service
        .create_comment(NewComment {
            incident_id: request.incident_id,
            author: request.author,
            message: request.message,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    pub incident_id: Uuid,
    #[validate(length(min = 1, max = 120))]
    pub author: String,
    #[validate(length(min = 1, max = 2000))]
    pub message: String,
}

/// Delete a comment
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    if state.service.delete_comment(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Comment {} not found", id)))
    }
}

/// Incident counts by status and priority
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsSnapshot>> {
    let stats = state.service.get_stats().await?;
    Ok(Json(stats.as_ref().clone()))
}

/// Approximate cache occupancy
pub async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.cache_stats())
}

fn incident_not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("Incident {} not found", id))
}
