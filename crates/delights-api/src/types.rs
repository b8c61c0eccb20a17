//! Wire types for the restaurant service.
//!
//! ## Observed record shape
//!
//! Records come from a document store and are loosely typed:
//! - the identifier is `_id` on most records and `id` on some older ones;
//! - `images` is usually an array of relative paths, sometimes a single string,
//!   sometimes absent, and the paths use several historical prefixes;
//! - `rating` may be a number or a numeric string;
//! - text fields may carry stray whitespace.
//!
//! Every field of [`RawRestaurant`] is therefore an `Option<Value>` and all
//! interpretation happens in [`crate::normalize`].

use delights_core::{CanonicalRestaurant, SearchFilters};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A restaurant record exactly as the service returned it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRestaurant {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviews: Option<Value>,
}

impl RawRestaurant {
    /// Interprets one element of a response array.
    ///
    /// Elements that are not JSON objects become an empty record rather than
    /// an error, so a single bad element never hides the rest of the page.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "restaurant record is not an object; using defaults");
            Self::default()
        })
    }
}

impl From<CanonicalRestaurant> for RawRestaurant {
    fn from(r: CanonicalRestaurant) -> Self {
        let rating = serde_json::Number::from_f64(r.rating).map_or(Value::from(0), Value::Number);
        Self {
            document_id: None,
            id: Some(Value::String(r.id)),
            name: Some(Value::String(r.name)),
            cuisine: Some(Value::String(r.cuisine)),
            location: Some(Value::String(r.location)),
            rating: Some(rating),
            images: Some(Value::Array(
                r.images.into_iter().map(Value::String).collect(),
            )),
            description: r.description.map(Value::String),
            price_range: r.price_range.map(Value::String),
            contact: r.contact,
            opening_hours: r.opening_hours,
            menu: r.menu,
            reviews: r.reviews,
        }
    }
}

/// One logical search: free text, filters and the page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub query: String,
    pub filters: SearchFilters,
}

/// Raw records for one page plus the service's page count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub records: Vec<RawRestaurant>,
    /// Always `>= 1`.
    pub total_pages: u32,
}

/// Filter values after sanitization, ready to be sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct SanitizedFilters {
    pub(crate) cuisine: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) rating: Option<f64>,
}

impl SanitizedFilters {
    /// Lower-cases and trims `cuisine`/`location`, expands the common `chkn`
    /// abbreviation in `cuisine`, and parses `rating` as a float.
    ///
    /// Values that end up empty, and ratings that do not parse, are omitted.
    pub(crate) fn from_filters(filters: &SearchFilters) -> Self {
        let cuisine = filters
            .cuisine
            .as_deref()
            .map(|c| c.to_lowercase().replace("chkn", "chicken").trim().to_string())
            .filter(|c| !c.is_empty());
        let location = filters
            .location
            .as_deref()
            .map(|l| l.to_lowercase().trim().to_string())
            .filter(|l| !l.is_empty());
        let rating = filters.rating.as_deref().and_then(|raw| {
            let parsed = raw.trim().parse::<f64>().ok().filter(|r| r.is_finite());
            if parsed.is_none() && !raw.trim().is_empty() {
                tracing::debug!(rating = raw, "ignoring unparseable rating filter");
            }
            parsed
        });
        Self {
            cuisine,
            location,
            rating,
        }
    }
}

/// An image attached to a new or updated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ListingImage {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// MIME type inferred from the file extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        let lower = self.file_name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            "image/png"
        } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            "image/jpeg"
        } else {
            "application/octet-stream"
        }
    }
}

/// Form data for creating or updating a restaurant listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewListing {
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub rating: String,
    pub images: Vec<ListingImage>,
}

/// Registration form for a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAccount {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub password: String,
    pub role: String,
}
