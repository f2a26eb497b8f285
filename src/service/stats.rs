use crate::error::Result;
use crate::models::{Priority, StatsSnapshot, Status};
use crate::state::IncidentStore;
use std::sync::Arc;
use strum::IntoEnumIterator;

/// Computes incident counts from store count queries.
///
/// One total count, one count per status and one per priority; never a scan.
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn IncidentStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn IncidentStore>) -> Self {
        Self { store }
    }

    pub async fn compute(&self) -> Result<StatsSnapshot> {
        let mut snapshot = StatsSnapshot {
            total: self.store.count_total().await?,
            ..Default::default()
        };

        for status in Status::iter() {
            let count = self.store.count_by_status(status).await?;
            snapshot.by_status.set(status, count);
        }

        for priority in Priority::iter() {
            let count = self.store.count_by_priority(priority).await?;
            snapshot.by_priority.set(priority, count);
        }

        tracing::debug!(total = snapshot.total, "Computed incident stats");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Incident, IncidentFields};
    use crate::state::InMemoryStore;

    #[tokio::test]
    async fn test_compute_counts_every_bucket() {
        let store = Arc::new(InMemoryStore::new());
        let fixtures = [
            (Status::Open, Priority::High),
            (Status::Open, Priority::Low),
            (Status::InProgress, Priority::High),
            (Status::Cancelled, Priority::Medium),
        ];

        for (status, priority) in fixtures {
            let incident = Incident::new(IncidentFields {
                title: "Replica lag".to_string(),
                description: None,
                priority,
                status,
                responsible_email: "oncall@example.com".to_string(),
                tags: vec![],
            });
            store.create_incident(&incident).await.unwrap();
        }

        let stats = StatsAggregator::new(store).compute().await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_status.open, 2);
        assert_eq!(stats.by_status.in_progress, 1);
        assert_eq!(stats.by_status.resolved, 0);
        assert_eq!(stats.by_status.cancelled, 1);
        assert_eq!(stats.by_priority.high, 2);
        assert_eq!(stats.by_priority.medium, 1);
        assert_eq!(stats.by_priority.low, 1);
    }
}
