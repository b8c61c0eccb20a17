//! Normalization from [`RawRestaurant`] to [`CanonicalRestaurant`].
//!
//! Normalization is total: fields that are missing or malformed degrade to
//! display defaults instead of failing, and whole records are never dropped
//! or reordered. Only the image list is filtered and truncated.

use std::sync::LazyLock;

use delights_core::{CanonicalRestaurant, DEFAULT_CUISINE, DEFAULT_LOCATION, DEFAULT_NAME};
use regex::Regex;
use serde_json::Value;
use uuid::Uuid;

use crate::types::RawRestaurant;

/// Prefix every stored image path is rewritten to.
pub const CANONICAL_IMAGE_PREFIX: &str = "public/uploads/images/";

/// Historical prefixes, longest first so `uploads/images/` wins over `uploads/`.
const LEGACY_IMAGE_PREFIXES: [&str; 4] = [
    "uploads/images/",
    "Ipublicluploads/",
    "public/images/",
    "uploads/",
];

/// Maximum number of images kept per restaurant.
pub const MAX_IMAGES: usize = 2;

static IMAGE_FILE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-zA-Z._-]+\.(jpg|jpeg|png)$").expect("valid image file name regex")
});

/// Normalizes a batch, preserving input order.
#[must_use]
pub fn normalize_restaurants(records: Vec<RawRestaurant>) -> Vec<CanonicalRestaurant> {
    records.into_iter().map(normalize_restaurant).collect()
}

/// Normalizes a single raw record.
#[must_use]
pub fn normalize_restaurant(raw: RawRestaurant) -> CanonicalRestaurant {
    let images = normalize_images(raw.images.as_ref());
    let id = resolve_id(raw.document_id.as_ref(), raw.id.as_ref());

    let name = text_or(raw.name.as_ref(), DEFAULT_NAME);
    let cuisine = text_or(raw.cuisine.as_ref(), DEFAULT_CUISINE);
    // Upstream data carries a recurring "chken" typo in locations.
    let location = text_or(raw.location.as_ref(), DEFAULT_LOCATION).replace("chken", "chicken");

    CanonicalRestaurant {
        id,
        name,
        cuisine,
        location,
        rating: rating(raw.rating.as_ref()),
        images,
        description: optional_text(raw.description.as_ref()),
        price_range: optional_text(raw.price_range.as_ref()),
        contact: raw.contact,
        opening_hours: raw.opening_hours,
        menu: raw.menu,
        reviews: raw.reviews,
    }
}

/// Rewrites a leading legacy prefix (optionally preceded by `/`) to
/// [`CANONICAL_IMAGE_PREFIX`]. Paths with any other prefix are returned as-is.
#[must_use]
pub fn rewrite_image_prefix(path: &str) -> String {
    let unrooted = path.strip_prefix('/').unwrap_or(path);
    LEGACY_IMAGE_PREFIXES
        .iter()
        .find_map(|prefix| unrooted.strip_prefix(prefix))
        .map_or_else(
            || path.to_string(),
            |rest| format!("{CANONICAL_IMAGE_PREFIX}{rest}"),
        )
}

/// Returns `true` when the final path segment is a plain `.jpg`, `.jpeg` or
/// `.png` file name.
#[must_use]
pub fn has_valid_image_name(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    IMAGE_FILE_NAME.is_match(file_name)
}

fn normalize_images(images: Option<&Value>) -> Vec<String> {
    let candidates: Vec<&str> = match images {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(single)) => vec![single.as_str()],
        _ => Vec::new(),
    };
    candidates
        .into_iter()
        .map(rewrite_image_prefix)
        .filter(|p| has_valid_image_name(p))
        .take(MAX_IMAGES)
        .collect()
}

/// Prefers `_id`, then `id`, then a random token.
fn resolve_id(document_id: Option<&Value>, id: Option<&Value>) -> String {
    document_id
        .and_then(id_text)
        .or_else(|| id.and_then(id_text))
        .unwrap_or_else(|| Uuid::new_v4().simple().to_string())
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        // Extended-JSON object ids: {"$oid": "..."}
        Value::Object(map) => map.get("$oid").and_then(id_text),
        _ => None,
    }
}

fn optional_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Trims first, then defaults, so whitespace-only input also gets `default`.
fn text_or(value: Option<&Value>, default: &str) -> String {
    optional_text(value).unwrap_or_else(|| default.to_string())
}

fn rating(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|r| r.is_finite()).unwrap_or(0.0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
