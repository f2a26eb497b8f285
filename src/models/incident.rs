use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::query::normalize_tags;

/// A tracked operational incident
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier, assigned at creation
    pub id: Uuid,

    /// Short human-readable title
    pub title: String,

    /// Detailed description
    pub description: Option<String>,

    pub priority: Priority,

    pub status: Status,

    /// Email of the party responsible for the incident
    pub responsible_email: String,

    /// Normalized tags (trimmed, lowercase, deduplicated, sorted)
    pub tags: Vec<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last field-level mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Create a new incident with a fresh id and both timestamps set to now
    pub fn new(fields: IncidentFields) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title: fields.title,
            description: fields.description,
            priority: fields.priority,
            status: fields.status,
            responsible_email: fields.responsible_email,
            tags: normalize_tags(Some(fields.tags.as_slice())),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable field and refresh `updated_at`
    pub fn apply(&mut self, fields: IncidentFields) {
        self.title = fields.title;
        self.description = fields.description;
        self.priority = fields.priority;
        self.status = fields.status;
        self.responsible_email = fields.responsible_email;
        self.tags = normalize_tags(Some(fields.tags.as_slice()));
        self.touch();
    }

    /// Change only the status and refresh `updated_at`
    pub fn set_status(&mut self, status: Status) {
        self.status = status;
        self.touch();
    }

    /// Refresh `updated_at`, never moving it before `created_at`
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Case-insensitive substring match over title or description.
    ///
    /// `term` is expected to be already lowercased.
    pub fn matches_term(&self, term: &str) -> bool {
        self.title.to_lowercase().contains(term)
            || self
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(term))
                .unwrap_or(false)
    }
}

/// The caller-supplied fields of an incident, used on create and full update.
///
/// Tags may be raw; they are normalized when applied.
#[derive(Debug, Clone)]
pub struct IncidentFields {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub responsible_email: String,
    pub tags: Vec<String>,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Cancelled,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Priority {
    Low,
    Medium,
    High,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn sample() -> Incident {
        Incident::new(IncidentFields {
            title: "Database latency".to_string(),
            description: Some("Primary replica lagging".to_string()),
            priority: Priority::High,
            status: Status::Open,
            responsible_email: "oncall@example.com".to_string(),
            tags: vec![" Net ".to_string(), "db".to_string(), "DB".to_string()],
        })
    }

    #[test]
    fn test_new_incident_normalizes_tags() {
        let incident = sample();
        assert_eq!(incident.tags, vec!["db", "net"]);
        assert_eq!(incident.created_at, incident.updated_at);
    }

    #[test]
    fn test_set_status_refreshes_updated_at() {
        let mut incident = sample();
        let before = incident.updated_at;

        incident.set_status(Status::Resolved);

        assert_eq!(incident.status, Status::Resolved);
        assert!(incident.updated_at >= before);
        assert!(incident.updated_at >= incident.created_at);
    }

    #[test]
    fn test_apply_keeps_identity_and_creation_time() {
        let mut incident = sample();
        let (id, created_at) = (incident.id, incident.created_at);

        incident.apply(IncidentFields {
            title: "Database latency resolved".to_string(),
            description: None,
            priority: Priority::Low,
            status: Status::Resolved,
            responsible_email: "dba@example.com".to_string(),
            tags: vec!["Postgres".to_string(), "".to_string()],
        });

        assert_eq!(incident.id, id);
        assert_eq!(incident.created_at, created_at);
        assert_eq!(incident.tags, vec!["postgres"]);
        assert!(incident.updated_at >= created_at);
    }

    #[test]
    fn test_matches_term_checks_title_and_description() {
        let incident = sample();
        assert!(incident.matches_term("latency"));
        assert!(incident.matches_term("replica"));
        assert!(!incident.matches_term("network"));
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(Status::InProgress.to_string(), "IN_PROGRESS");
        assert_eq!(Status::from_str("in_progress").unwrap(), Status::InProgress);
        assert_eq!(
            serde_json::to_string(&Priority::Medium).unwrap(),
            "\"MEDIUM\""
        );
    }
}
