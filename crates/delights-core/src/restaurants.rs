use serde::{Deserialize, Serialize};

/// Display name used when a record has no usable name.
pub const DEFAULT_NAME: &str = "Unknown";
/// Display value used when a record has no usable cuisine.
pub const DEFAULT_CUISINE: &str = "N/A";
/// Display value used when a record has no usable location.
pub const DEFAULT_LOCATION: &str = "N/A";

/// Local asset shown when a restaurant has no images or an image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "/images/placeholder.jpg";

/// A restaurant record that is safe to render directly.
///
/// Produced only by the result normalizer, which guarantees:
/// - `id` is non-empty,
/// - `name`, `cuisine`, `location` are trimmed and never empty,
/// - `images` holds at most two paths under `public/uploads/images/` (or an
///   unrecognised prefix) whose file names end in `.jpg`, `.jpeg` or `.png`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRestaurant {
    pub id: String,
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub rating: f64,
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<serde_json::Value>,
}

impl CanonicalRestaurant {
    /// Full URLs for each image, joined onto `asset_origin`.
    ///
    /// Falls back to a single [`PLACEHOLDER_IMAGE`] entry when the record has
    /// no images.
    #[must_use]
    pub fn image_urls(&self, asset_origin: &str) -> Vec<String> {
        if self.images.is_empty() {
            return vec![PLACEHOLDER_IMAGE.to_string()];
        }
        let origin = asset_origin.trim_end_matches('/');
        self.images
            .iter()
            .map(|path| format!("{origin}/{}", path.trim_start_matches('/')))
            .collect()
    }
}

/// Optional search filters as entered by the user.
///
/// `None` means the filter is unset. Empty strings coming from form inputs
/// are mapped to `None` by [`SearchFilters::from_form`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub cuisine: Option<String>,
    pub location: Option<String>,
    pub rating: Option<String>,
}

impl SearchFilters {
    /// Builds filters from raw form fields, treating blank input as unset.
    #[must_use]
    pub fn from_form(cuisine: &str, location: &str, rating: &str) -> Self {
        let non_blank = |s: &str| (!s.trim().is_empty()).then(|| s.to_string());
        Self {
            cuisine: non_blank(cuisine),
            location: non_blank(location),
            rating: non_blank(rating),
        }
    }

    #[must_use]
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cuisine.is_none() && self.location.is_none() && self.rating.is_none()
    }
}

/// Query and pagination state for one screen session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub free_text_query: String,
    pub filters: SearchFilters,
    /// Current page, always `>= 1`.
    pub page: u32,
    /// Last known page count, always `>= 1`.
    pub total_pages: u32,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            free_text_query: String::new(),
            filters: SearchFilters::default(),
            page: 1,
            total_pages: 1,
        }
    }
}

impl QueryState {
    /// Replaces the query and filters and moves back to the first page.
    ///
    /// `total_pages` is left at its last known value until the next fetch
    /// settles.
    pub fn reset(&mut self, free_text_query: String, filters: SearchFilters) {
        self.free_text_query = free_text_query;
        self.filters = filters;
        self.page = 1;
    }

    /// Returns `true` when `page` lies within `1..=total_pages`.
    #[must_use]
    pub fn accepts_page(&self, page: u32) -> bool {
        (1..=self.total_pages).contains(&page)
    }
}

/// One page of normalized results as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub restaurants: Vec<CanonicalRestaurant>,
    pub page: u32,
    pub total_pages: u32,
}

impl ResultPage {
    #[must_use]
    pub fn empty(page: u32, total_pages: u32) -> Self {
        Self {
            restaurants: Vec::new(),
            page,
            total_pages,
        }
    }
}
