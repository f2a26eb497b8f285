use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A note attached to an incident. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,

    /// Owning incident
    pub incident_id: Uuid,

    pub author: String,

    pub message: String,

    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(incident_id: Uuid, author: String, message: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            incident_id,
            author,
            message,
            created_at: Utc::now(),
        }
    }
}
