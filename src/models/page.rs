use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumString};

use crate::error::AppError;

/// Pagination and ordering requested by a caller.
///
/// Passed through to the store unmodified and echoed back on the resulting
/// [`Page`]. Part of every listing cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,

    /// Maximum number of items on the page
    pub size: u32,

    /// Optional ordering; stores fall back to newest-first when absent
    pub sort: Option<Sort>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Index of the first item on this page
    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field, self.direction)
    }
}

/// Parses `field` or `field,direction`, e.g. `createdAt,desc`
impl FromStr for Sort {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().unwrap_or_default().trim();
        let field = SortField::from_str(field)
            .map_err(|_| AppError::Validation(format!("Unknown sort field '{}'", field)))?;

        let direction = match parts.next().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(dir) => SortDirection::from_str(dir).map_err(|_| {
                AppError::Validation(format!("Unknown sort direction '{}'", dir))
            })?,
        };

        Ok(Sort { field, direction })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[strum(to_string = "createdAt", serialize = "created_at")]
    CreatedAt,
    #[strum(to_string = "updatedAt", serialize = "updated_at")]
    UpdatedAt,
    #[strum(serialize = "title")]
    Title,
    #[strum(serialize = "priority")]
    Priority,
    #[strum(serialize = "status")]
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One page of results plus the metadata needed to navigate the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub sort: Option<Sort>,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(request.size as u64)
        };

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
            sort: request.sort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_parsing() {
        let sort: Sort = "createdAt,desc".parse().unwrap();
        assert_eq!(sort, Sort::new(SortField::CreatedAt, SortDirection::Desc));

        let sort: Sort = "title".parse().unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);

        let sort: Sort = "updated_at, DESC".parse().unwrap();
        assert_eq!(sort, Sort::new(SortField::UpdatedAt, SortDirection::Desc));

        assert!("owner,asc".parse::<Sort>().is_err());
        assert!("title,sideways".parse::<Sort>().is_err());
    }

    #[test]
    fn test_page_metadata() {
        let request = PageRequest::new(1, 10);
        let page = Page::new(vec![1, 2, 3], &request, 23);

        assert_eq!(page.page, 1);
        assert_eq!(page.size, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.content, vec![1, 2, 3]);
    }
}
