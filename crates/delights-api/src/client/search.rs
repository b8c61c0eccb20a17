//! Search and suggestion endpoints.

use std::future::Future;

use reqwest::Url;
use serde_json::Value;

use super::{ErrorMessages, RestaurantClient};
use crate::error::ServiceError;
use crate::types::{RawRestaurant, SanitizedFilters, SearchPage, SearchRequest};

const SEARCH_CONTEXT: &str = "restaurant search";

pub(crate) const SEARCH_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Invalid search parameters. Please check your filters.",
    unauthorized: "Invalid or expired session",
    forbidden: "Invalid or expired session",
    not_found: "Search service unavailable",
};

/// A paginated restaurant search backend.
///
/// [`RestaurantClient`] is the production implementation; the query
/// controller is generic over this trait so it can be driven by a scripted
/// backend in tests.
pub trait RestaurantSearch: Send + Sync + 'static {
    /// Fetches one page of raw records for `request`.
    ///
    /// `credential` is sent as a bearer token when present.
    fn search(
        &self,
        request: &SearchRequest,
        credential: Option<&str>,
    ) -> impl Future<Output = Result<SearchPage, ServiceError>> + Send;
}

impl RestaurantSearch for RestaurantClient {
    async fn search(
        &self,
        request: &SearchRequest,
        credential: Option<&str>,
    ) -> Result<SearchPage, ServiceError> {
        self.search_restaurants(request, credential).await
    }
}

impl RestaurantClient {
    /// Calls `GET /restaurants/search` with sanitized filters.
    ///
    /// The record list is read from `restaurants`, else `data`, else treated
    /// as empty. `totalPages` defaults to `1`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::BadRequest`] if `page` or `page_size` is zero (no
    ///   request is sent) or the service answers 400.
    /// - [`ServiceError::Unauthorized`] on 401/403.
    /// - [`ServiceError::ServiceUnavailable`] on 404.
    /// - [`ServiceError::InvalidFormat`] if the record list is not an array.
    /// - [`ServiceError::Timeout`] / [`ServiceError::Unknown`] otherwise.
    pub async fn search_restaurants(
        &self,
        request: &SearchRequest,
        credential: Option<&str>,
    ) -> Result<SearchPage, ServiceError> {
        if request.page == 0 || request.page_size == 0 {
            return Err(ServiceError::BadRequest {
                status: None,
                message: "Page and page size must be at least 1".to_owned(),
            });
        }

        let url = self.search_url(request)?;
        tracing::debug!(%url, page = request.page, "searching restaurants");
        let builder = Self::authorize(self.client.get(url), credential);
        let body = self
            .execute(builder, SEARCH_CONTEXT, &SEARCH_MESSAGES)
            .await?;
        parse_search_body(body)
    }

    /// Calls `GET /restaurants/suggestions` for type-ahead hints.
    ///
    /// A blank `query` returns an empty list without a request. Failures are
    /// returned rather than replaced by an empty list, so callers can tell
    /// "no hints" from "hint service down".
    ///
    /// # Errors
    ///
    /// Same status mapping as [`RestaurantClient::search_restaurants`];
    /// [`ServiceError::InvalidFormat`] if `suggestions` is not an array.
    pub async fn suggestions(
        &self,
        query: &str,
        credential: Option<&str>,
    ) -> Result<Vec<String>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut url = self.endpoint("restaurants/suggestions")?;
        url.query_pairs_mut().append_pair("query", query);
        let builder = Self::authorize(self.client.get(url), credential);
        let body = self
            .execute(builder, "restaurant suggestions", &SEARCH_MESSAGES)
            .await?;

        match body.get("suggestions") {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()),
            Some(other) => Err(ServiceError::InvalidFormat {
                context: "restaurant suggestions".to_owned(),
                reason: format!("expected an array of suggestions, got {}", json_type(other)),
            }),
        }
    }

    /// Builds the search URL with `page`, `limit`, `query` and whichever
    /// sanitized filters are set.
    pub(crate) fn search_url(&self, request: &SearchRequest) -> Result<Url, ServiceError> {
        let filters = SanitizedFilters::from_filters(&request.filters);
        let mut url = self.endpoint("restaurants/search")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &request.page.to_string());
            pairs.append_pair("limit", &request.page_size.to_string());
            pairs.append_pair("query", request.query.trim());
            if let Some(cuisine) = &filters.cuisine {
                pairs.append_pair("cuisine", cuisine);
            }
            if let Some(location) = &filters.location {
                pairs.append_pair("location", location);
            }
            if let Some(rating) = filters.rating {
                pairs.append_pair("rating", &rating.to_string());
            }
        }
        Ok(url)
    }
}

/// Interprets a search response body.
pub(crate) fn parse_search_body(body: Value) -> Result<SearchPage, ServiceError> {
    let Value::Object(mut map) = body else {
        return Ok(SearchPage {
            records: Vec::new(),
            total_pages: 1,
        });
    };

    let total_pages = map.get("totalPages").map_or(1, total_pages_from);
    let list = map
        .remove("restaurants")
        .filter(|v| !v.is_null())
        .or_else(|| map.remove("data").filter(|v| !v.is_null()));

    let records = match list {
        None => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(RawRestaurant::from_value).collect(),
        Some(other) => {
            return Err(ServiceError::InvalidFormat {
                context: SEARCH_CONTEXT.to_owned(),
                reason: format!("expected an array of restaurants, got {}", json_type(&other)),
            })
        }
    };

    Ok(SearchPage {
        records,
        total_pages,
    })
}

/// Reads `totalPages`, accepting integers, floats and numeric strings; any
/// value below one becomes `1`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn total_pages_from(value: &Value) -> u32 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(pages) if pages.is_finite() && pages >= 1.0 => {
            pages.min(f64::from(u32::MAX)).floor() as u32
        }
        _ => 1,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
