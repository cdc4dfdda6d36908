use crate::error::ValidationError;
use serde::Serialize;
use utoipa::ToSchema;

/// Page-size limits for listings. Call sites differ in what they show per
/// page, so the default is configuration rather than a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSettings {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

/// A resolved page window. `page` and `limit` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Resolve raw `page` / `limit` query values.
    ///
    /// A malformed page is rejected. A malformed, zero or negative limit
    /// falls back to the default, and a limit above the maximum is clamped.
    pub fn from_params(
        page: Option<&str>,
        limit: Option<&str>,
        settings: &PageSettings,
    ) -> Result<Self, ValidationError> {
        let page = match page.map(str::trim).filter(|p| !p.is_empty()) {
            None => 1,
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| ValidationError::InvalidPage(raw.to_string()))?,
        };

        let default_limit = settings.default_limit.max(1);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l > 0)
            .map(|l| l.min(i64::from(settings.max_limit.max(default_limit))) as u32)
            .unwrap_or(default_limit);

        Ok(Self::new(page, limit))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of matching items before this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Cut this page out of an already filtered and sorted sequence.
    pub fn window<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.skip()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(skip)
            .take(self.limit as usize)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    /// Number of recipes matching the filter, across all pages
    pub total_recipes: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
    pub limit: u32,
}

impl Pagination {
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(u64::from(request.limit));
        Self {
            current_page: request.page,
            total_pages,
            total_recipes: total,
            has_next_page: u64::from(request.page) < total_pages,
            has_prev_page: request.page > 1,
            limit: request.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(page: Option<&str>, limit: Option<&str>) -> Result<PageRequest, ValidationError> {
        PageRequest::from_params(page, limit, &PageSettings::default())
    }

    #[test]
    fn test_defaults() {
        let req = resolve(None, None).unwrap();
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 50);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn test_skip_offset() {
        let req = resolve(Some("3"), Some("20")).unwrap();
        assert_eq!(req.skip(), 40);
    }

    #[test]
    fn test_bad_limit_falls_back_to_default() {
        for raw in ["0", "-5", "ten", "", "1.5"] {
            assert_eq!(
                resolve(None, Some(raw)).unwrap().limit(),
                50,
                "limit {raw:?}"
            );
        }
    }

    #[test]
    fn test_limit_clamped_to_max() {
        assert_eq!(resolve(None, Some("5000")).unwrap().limit(), 100);
    }

    #[test]
    fn test_custom_default_limit() {
        let settings = PageSettings {
            default_limit: 52,
            max_limit: 100,
        };
        let req = PageRequest::from_params(None, Some("nope"), &settings).unwrap();
        assert_eq!(req.limit(), 52);
    }

    #[test]
    fn test_invalid_page_rejected() {
        for raw in ["0", "-1", "abc", "2.5"] {
            assert_eq!(
                resolve(Some(raw), None),
                Err(ValidationError::InvalidPage(raw.to_string()))
            );
        }
    }

    #[test]
    fn test_blank_page_is_first_page() {
        assert_eq!(resolve(Some(" "), None).unwrap().page(), 1);
    }

    #[test]
    fn test_pagination_last_partial_page() {
        let meta = Pagination::new(PageRequest::new(3, 50), 105);
        assert_eq!(meta.total_pages, 3);
        assert!(!meta.has_next_page);
        assert!(meta.has_prev_page);
    }

    #[test]
    fn test_pagination_empty_set() {
        let meta = Pagination::new(PageRequest::new(1, 50), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next_page);
        assert!(!meta.has_prev_page);
    }

    #[test]
    fn test_window_past_end_is_empty() {
        let req = PageRequest::new(999, 50);
        assert!(req.window(0..10).is_empty());
    }

    #[test]
    fn test_window_middle_page() {
        let req = PageRequest::new(2, 3);
        assert_eq!(req.window(0..10), vec![3, 4, 5]);
    }

    #[test]
    fn test_pagination_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::new(PageRequest::new(1, 10), 11)).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["totalRecipes"], 11);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], false);
        assert_eq!(json["limit"], 10);
    }
}
