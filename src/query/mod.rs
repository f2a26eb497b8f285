//! Listing query selection and request-shape normalization

pub mod key;
pub mod normalize;
pub mod router;

pub use key::{CommentKey, ListingKey, StatsKey};
pub use normalize::{build_search_term, normalize_tags};
pub use router::{ListingCriteria, QueryForm, QueryRouter};
