use serde::Deserialize;

///
/// RepositoryConfig
///
/// Host-tunable repository behaviour. Deserializable so hosts can embed it
/// in their own configuration files; every field has a default.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Page size applied when a query plan carries no pagination at all.
    /// `None` returns every matching document.
    pub default_page_size: Option<u32>,

    /// Upper bound for client-requested page sizes.
    pub max_page_size: u32,

    /// Whether `find_all` runs a second count query for the total.
    pub include_total_count: bool,
}

impl RepositoryConfig {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    pub const MAX_PAGE_SIZE: u32 = 100;

    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_page_size: Some(Self::DEFAULT_PAGE_SIZE),
            max_page_size: Self::MAX_PAGE_SIZE,
            include_total_count: true,
        }
    }

    #[must_use]
    pub const fn with_default_page_size(mut self, size: Option<u32>) -> Self {
        self.default_page_size = size;
        self
    }

    #[must_use]
    pub const fn with_max_page_size(mut self, size: u32) -> Self {
        self.max_page_size = size;
        self
    }

    #[must_use]
    pub const fn with_total_count(mut self, enabled: bool) -> Self {
        self.include_total_count = enabled;
        self
    }

    /// Resolve the effective page size for a request.
    ///
    /// A requested size wins over the default; both are clamped to
    /// `max_page_size` (a zero maximum disables clamping). A zero size never
    /// reaches storage: it reads as unpaged.
    #[must_use]
    pub fn effective_page_size(&self, requested: Option<u32>) -> Option<u32> {
        let size = requested.or(self.default_page_size).filter(|size| *size > 0)?;

        if self.max_page_size == 0 {
            Some(size)
        } else {
            Some(size.min(self.max_page_size))
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self::new()
    }
}
