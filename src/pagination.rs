use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{RecipeResponse, SubscriptionResponse, UserResponse};

/// Listing endpoints serve six items per page unless the caller overrides
/// it with the `limit` query parameter.
pub const DEFAULT_PAGE_SIZE: u64 = 6;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PageQuery {
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 6)]
    pub limit: Option<u64>,
}

impl PageQuery {
    /// 1-based page number; zero is clamped up rather than rejected.
    pub fn page(&self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1)
    }
}

/// Page envelope: total row count plus relative links to the neighbouring
/// pages, `null` at either end of the range.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    PaginatedUsers = Paginated<UserResponse>,
    PaginatedRecipes = Paginated<RecipeResponse>,
    PaginatedSubscriptions = Paginated<SubscriptionResponse>
)]
pub struct Paginated<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(path: &str, page: u64, limit: u64, count: u64, results: Vec<T>) -> Self {
        let next = if page * limit < count {
            Some(format!("{}?page={}&limit={}", path, page + 1, limit))
        } else {
            None
        };
        let previous = if page > 1 {
            Some(format!("{}?page={}&limit={}", path, page - 1, limit))
        } else {
            None
        };
        Paginated {
            count,
            next,
            previous,
            results,
        }
    }
}

/// In-memory page slice for listings whose rows are composed one by one
/// after the fetch.
pub fn page_slice<T>(items: Vec<T>, page: u64, limit: u64) -> Vec<T> {
    let start = (page.saturating_sub(1) * limit) as usize;
    items
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_six_per_page() {
        let query = PageQuery::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 6);
    }

    #[test]
    fn limit_parameter_overrides_page_size() {
        let query = PageQuery {
            page: Some(2),
            limit: Some(10),
        };
        assert_eq!(query.page(), 2);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn zero_values_are_clamped() {
        let query = PageQuery {
            page: Some(0),
            limit: Some(0),
        };
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 1);
    }

    #[test]
    fn links_point_at_neighbouring_pages() {
        let envelope = Paginated::new("/api/recipes", 2, 6, 20, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(envelope.count, 20);
        assert_eq!(envelope.next.as_deref(), Some("/api/recipes?page=3&limit=6"));
        assert_eq!(
            envelope.previous.as_deref(),
            Some("/api/recipes?page=1&limit=6")
        );
    }

    #[test]
    fn first_and_last_pages_drop_their_outer_links() {
        let first: Paginated<i64> = Paginated::new("/api/users", 1, 6, 10, vec![]);
        assert!(first.previous.is_none());
        assert!(first.next.is_some());

        let last: Paginated<i64> = Paginated::new("/api/users", 2, 6, 10, vec![]);
        assert!(last.next.is_none());
        assert!(last.previous.is_some());
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let envelope: Paginated<i64> = Paginated::new("/api/users", 2, 5, 10, vec![]);
        assert!(envelope.next.is_none());
    }

    #[test]
    fn page_slice_windows_the_rows() {
        let rows: Vec<i64> = (1..=10).collect();
        assert_eq!(page_slice(rows.clone(), 1, 4), vec![1, 2, 3, 4]);
        assert_eq!(page_slice(rows.clone(), 3, 4), vec![9, 10]);
        assert!(page_slice(rows, 4, 4).is_empty());
    }
}
