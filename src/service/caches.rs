use crate::config::CacheConfig;
use crate::models::{Comment, Incident, Page, StatsSnapshot};
use crate::query::{CommentKey, ListingKey, StatsKey};
use crate::state::AppCache;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Room for the single stats entry plus invalidated ones awaiting eviction
const STATS_CAPACITY: u64 = 8;

/// The four cache regions of the service and the rules for invalidating them.
///
/// Owned by a single [`IncidentService`](super::IncidentService); there is
/// no process-global cache state.
#[derive(Clone)]
pub struct CacheLayer {
    pub(crate) listings: AppCache<ListingKey, Arc<Page<Incident>>>,
    pub(crate) items: AppCache<Uuid, Arc<Incident>>,
    pub(crate) comments: AppCache<CommentKey, Arc<Page<Comment>>>,
    pub(crate) stats: AppCache<StatsKey, Arc<StatsSnapshot>>,
}

/// Approximate entry counts per cache region
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub listings: u64,
    pub items: u64,
    pub comments: u64,
    pub stats: u64,
}

impl CacheLayer {
    pub fn new(config: &CacheConfig) -> Self {
        let ttl = config.ttl();

        Self {
            listings: AppCache::new("listing", config.listing_capacity, ttl),
            items: AppCache::new("item", config.item_capacity, ttl),
            comments: AppCache::new("comments", config.comment_capacity, ttl),
            stats: AppCache::new("stats", STATS_CAPACITY, ttl),
        }
    }

    /// A new incident can appear in any listing and changes every count
    pub fn incident_created(&self) {
        self.listings.invalidate_all();
        self.stats.invalidate_all();
    }

    /// Update or status change of an existing incident
    pub async fn incident_changed(&self, id: &Uuid) {
        self.items.invalidate(id).await;
        self.listings.invalidate_all();
        self.stats.invalidate_all();
    }

    /// The store drops the incident's comments with it
    pub async fn incident_deleted(&self, id: &Uuid) {
        self.incident_changed(id).await;
        self.invalidate_comments_of(*id);
    }

    /// Comment create/delete. Listings and stats are unaffected.
    pub async fn comment_changed(&self, incident_id: &Uuid) {
        self.invalidate_comments_of(*incident_id);
        self.items.invalidate(incident_id).await;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            listings: self.listings.entry_count(),
            items: self.items.entry_count(),
            comments: self.comments.entry_count(),
            stats: self.stats.entry_count(),
        }
    }

    fn invalidate_comments_of(&self, incident_id: Uuid) {
        self.comments
            .invalidate_matching(move |key: &CommentKey| key.incident_id == incident_id);
    }
}
