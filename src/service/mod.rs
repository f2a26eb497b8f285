//! Query-and-cache consistency layer over the record store

pub mod caches;
pub mod incidents;
pub mod stats;

pub use caches::{CacheLayer, CacheStats};
pub use incidents::{IncidentService, NewComment};
pub use stats::StatsAggregator;
