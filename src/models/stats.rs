use serde::{Deserialize, Serialize};

use crate::models::{Priority, Status};

/// Aggregate incident counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Count of all incidents, independent of the buckets below
    pub total: u64,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StatusCounts {
    pub open: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub cancelled: u64,
}

impl StatusCounts {
    pub fn set(&mut self, status: Status, count: u64) {
        match status {
            Status::Open => self.open = count,
            Status::InProgress => self.in_progress = count,
            Status::Resolved => self.resolved = count,
            Status::Cancelled => self.cancelled = count,
        }
    }

    pub fn get(&self, status: Status) -> u64 {
        match status {
            Status::Open => self.open,
            Status::InProgress => self.in_progress,
            Status::Resolved => self.resolved,
            Status::Cancelled => self.cancelled,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct PriorityCounts {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
}

impl PriorityCounts {
    pub fn set(&mut self, priority: Priority, count: u64) {
        match priority {
            Priority::Low => self.low = count,
            Priority::Medium => self.medium = count,
            Priority::High => self.high = count,
        }
    }

    pub fn get(&self, priority: Priority) -> u64 {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_status_has_a_bucket() {
        let mut counts = StatusCounts::default();
        for (i, status) in Status::iter().enumerate() {
            counts.set(status, i as u64 + 1);
        }
        for (i, status) in Status::iter().enumerate() {
            assert_eq!(counts.get(status), i as u64 + 1);
        }
    }

    #[test]
    fn test_wire_format_uses_enum_names() {
        let mut snapshot = StatsSnapshot::default();
        snapshot.by_status.set(Status::InProgress, 2);
        snapshot.by_priority.set(Priority::High, 1);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["by_status"]["IN_PROGRESS"], 2);
        assert_eq!(json["by_priority"]["HIGH"], 1);
    }
}
