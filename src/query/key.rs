//! Cache keys derived from request shape

use crate::models::{PageRequest, Priority, Status};
use crate::query::{build_search_term, ListingCriteria};
use uuid::Uuid;

/// Key of the listing cache.
///
/// Every distinct combination of filters and pagination maps to a distinct
/// key. The search term is stored normalized, so `" DB "` and `"db"` share
/// an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListingKey {
    Filtered {
        status: Option<Status>,
        priority: Option<Priority>,
        search: Option<String>,
        page: PageRequest,
    },
    Responsible {
        email: String,
        page: PageRequest,
    },
}

impl ListingKey {
    pub fn filtered(criteria: &ListingCriteria, page: &PageRequest) -> Self {
        ListingKey::Filtered {
            status: criteria.status,
            priority: criteria.priority,
            search: build_search_term(criteria.search.as_deref()),
            page: page.clone(),
        }
    }

    pub fn responsible(email: &str, page: &PageRequest) -> Self {
        ListingKey::Responsible {
            email: email.to_string(),
            page: page.clone(),
        }
    }
}

/// Key of the comment cache: one entry per incident and page shape
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommentKey {
    pub incident_id: Uuid,
    pub page: PageRequest,
}

impl CommentKey {
    pub fn new(incident_id: Uuid, page: &PageRequest) -> Self {
        Self {
            incident_id,
            page: page.clone(),
        }
    }
}

/// The stats snapshot is cached as a single entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatsKey;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Sort, SortDirection, SortField};

    #[test]
    fn test_page_shape_is_part_of_the_key() {
        let criteria = ListingCriteria::default().with_status(Status::Open);

        let a = ListingKey::filtered(&criteria, &PageRequest::new(0, 20));
        let b = ListingKey::filtered(&criteria, &PageRequest::new(0, 10));
        let c = ListingKey::filtered(&criteria, &PageRequest::new(1, 20));
        let d = ListingKey::filtered(
            &criteria,
            &PageRequest::new(0, 20).with_sort(Sort::new(SortField::Title, SortDirection::Desc)),
        );

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a, ListingKey::filtered(&criteria, &PageRequest::new(0, 20)));
    }

    #[test]
    fn test_search_term_is_normalized_in_key() {
        let page = PageRequest::new(0, 20);
        let a = ListingKey::filtered(&ListingCriteria::default().with_search(" DB "), &page);
        let b = ListingKey::filtered(&ListingCriteria::default().with_search("db"), &page);
        assert_eq!(a, b);

        let blank = ListingKey::filtered(&ListingCriteria::default().with_search("  "), &page);
        assert_eq!(blank, ListingKey::filtered(&ListingCriteria::default(), &page));
    }

    #[test]
    fn test_search_is_kept_in_key_even_when_ignored() {
        let page = PageRequest::new(0, 20);
        let base = ListingCriteria::default().with_status(Status::Open);

        let with_search = ListingKey::filtered(&base.clone().with_search("db"), &page);
        let without = ListingKey::filtered(&base, &page);

        assert_ne!(with_search, without);
    }
}
