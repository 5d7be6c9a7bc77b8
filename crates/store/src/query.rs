//! Paging parameters for the active-products listing.

/// Page size used when the caller asks for zero or fewer items.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Query for active products, optionally within one category.
///
/// The page token is the decimal offset of the first row of the page. An
/// absent token, or one that is not a non-negative `i64`, starts from the
/// beginning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveProductsQuery {
    /// Only products in this category.
    pub category: Option<String>,

    /// Requested page size; zero or negative means [`DEFAULT_PAGE_SIZE`].
    pub page_size: i64,

    /// Token returned with the previous page.
    pub page_token: Option<String>,
}

impl ActiveProductsQuery {
    /// Creates a query for the first page of every category.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by category. Blank categories are ignored.
    pub fn category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = (!category.trim().is_empty()).then(|| category.trim().to_string());
        self
    }

    pub fn page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }

    /// Effective number of rows per page, always in `1..=i64::MAX`.
    pub fn limit(&self) -> usize {
        match usize::try_from(self.page_size) {
            Ok(0) | Err(_) => DEFAULT_PAGE_SIZE,
            Ok(size) => size,
        }
    }

    /// Row offset encoded in the page token, always in `0..=i64::MAX`.
    pub fn offset(&self) -> usize {
        self.page_token
            .as_deref()
            .and_then(|token| token.trim().parse::<i64>().ok())
            .and_then(|offset| usize::try_from(offset).ok())
            .unwrap_or(0)
    }

    /// Token for the page after one that returned `returned` rows.
    pub fn next_page_token(&self, returned: usize) -> Option<String> {
        (returned == self.limit()).then(|| self.offset().saturating_add(returned).to_string())
    }
}
