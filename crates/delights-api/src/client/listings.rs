//! Listing endpoints: create, update and delete restaurants.

use delights_core::CanonicalRestaurant;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde_json::Value;

use super::{ErrorMessages, RestaurantClient};
use crate::error::ServiceError;
use crate::normalize::{normalize_restaurant, MAX_IMAGES};
use crate::session::SessionStore;
use crate::types::{NewListing, RawRestaurant};

const EXPIRED_SESSION: &str = "Invalid or expired session. Please log in again.";

pub(crate) const CREATE_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Failed to add restaurant",
    unauthorized: "Please log in to add a restaurant",
    forbidden: EXPIRED_SESSION,
    not_found: "Restaurant service unavailable",
};

pub(crate) const UPDATE_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Failed to update restaurant",
    unauthorized: "Please log in to update a restaurant",
    forbidden: EXPIRED_SESSION,
    not_found: "Restaurant not found or service unavailable",
};

pub(crate) const DELETE_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Failed to delete restaurant",
    unauthorized: "Please log in to delete a restaurant",
    forbidden: EXPIRED_SESSION,
    not_found: "Restaurant not found or service unavailable",
};

impl RestaurantClient {
    /// Creates a listing via `POST /restaurants` (multipart) and returns the
    /// stored record, normalized.
    ///
    /// A 401 or 403 clears `session`.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::BadRequest`] if a required field is missing or the
    ///   rating is not a number (no request is sent), or the service answers
    ///   400 (validation messages are joined with `", "`).
    /// - [`ServiceError::Unauthorized`] on 401/403.
    /// - [`ServiceError::InvalidFormat`] if the response is not an object.
    pub async fn create_restaurant(
        &self,
        session: &SessionStore,
        listing: &NewListing,
    ) -> Result<CanonicalRestaurant, ServiceError> {
        let form = listing_form(listing)?;
        let url = self.endpoint("restaurants")?;
        let credential = session.credential();
        let builder =
            Self::authorize(self.client.post(url), credential.as_deref()).multipart(form);
        let result = self
            .execute(builder, "create restaurant", &CREATE_MESSAGES)
            .await;
        let body = drop_rejected_session(session, result)?;
        listing_from_body(body, "create restaurant")
    }

    /// Replaces a listing via `PUT /restaurants/{id}`.
    ///
    /// # Errors
    ///
    /// Same as [`RestaurantClient::create_restaurant`], plus
    /// [`ServiceError::BadRequest`] for a blank `id`.
    pub async fn update_restaurant(
        &self,
        session: &SessionStore,
        id: &str,
        listing: &NewListing,
    ) -> Result<CanonicalRestaurant, ServiceError> {
        let form = listing_form(listing)?;
        let url = self.restaurant_url(id)?;
        let credential = session.credential();
        let builder =
            Self::authorize(self.client.put(url), credential.as_deref()).multipart(form);
        let result = self
            .execute(builder, "update restaurant", &UPDATE_MESSAGES)
            .await;
        let body = drop_rejected_session(session, result)?;
        listing_from_body(body, "update restaurant")
    }

    /// Removes a listing via `DELETE /restaurants/{id}`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::BadRequest`] for a blank `id`; otherwise the usual
    /// status mapping. A 401 or 403 clears `session`.
    pub async fn delete_restaurant(
        &self,
        session: &SessionStore,
        id: &str,
    ) -> Result<(), ServiceError> {
        let url = self.restaurant_url(id)?;
        let credential = session.credential();
        let builder = Self::authorize(self.client.delete(url), credential.as_deref());
        let result = self
            .execute(builder, "delete restaurant", &DELETE_MESSAGES)
            .await;
        drop_rejected_session(session, result)?;
        Ok(())
    }

    fn restaurant_url(&self, id: &str) -> Result<Url, ServiceError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ServiceError::BadRequest {
                status: None,
                message: "Restaurant id is required".to_owned(),
            });
        }
        let mut url = self.endpoint("restaurants")?;
        let shown = url.to_string();
        url.path_segments_mut()
            .map_err(|()| ServiceError::InvalidBaseUrl {
                url: shown,
                reason: "base URL cannot have path segments".to_owned(),
            })?
            .push(id);
        Ok(url)
    }
}

/// Clears `session` when the service rejected the credential.
fn drop_rejected_session(
    session: &SessionStore,
    result: Result<Value, ServiceError>,
) -> Result<Value, ServiceError> {
    if let Err(ServiceError::Unauthorized { status, .. }) = &result {
        tracing::info!(status, "listing request rejected; clearing session");
        if let Err(e) = session.clear() {
            tracing::warn!(error = %e, "failed to persist cleared session");
        }
    }
    result
}

/// Validates `listing` and builds the multipart body.
///
/// Text fields are trimmed, `rating` is sent as a float, and at most
/// [`MAX_IMAGES`] images are attached.
pub(crate) fn listing_form(listing: &NewListing) -> Result<Form, ServiceError> {
    let name = listing.name.trim();
    let cuisine = listing.cuisine.trim();
    let location = listing.location.trim();
    let rating = listing.rating.trim();
    if name.is_empty() || cuisine.is_empty() || location.is_empty() || rating.is_empty() {
        return Err(ServiceError::BadRequest {
            status: None,
            message: "Name, Cuisine, Location, and Rating are required".to_owned(),
        });
    }
    let rating = rating
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .ok_or_else(|| ServiceError::BadRequest {
            status: None,
            message: "Rating must be a number".to_owned(),
        })?;

    if listing.images.len() > MAX_IMAGES {
        tracing::debug!(
            supplied = listing.images.len(),
            kept = MAX_IMAGES,
            "dropping extra listing images"
        );
    }

    let mut form = Form::new()
        .text("name", name.to_owned())
        .text("cuisine", cuisine.to_owned())
        .text("location", location.to_owned())
        .text("rating", rating.to_string());
    for image in listing.images.iter().take(MAX_IMAGES) {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type())?;
        form = form.part("images", part);
    }
    Ok(form)
}

fn listing_from_body(body: Value, context: &str) -> Result<CanonicalRestaurant, ServiceError> {
    if !body.is_object() {
        return Err(ServiceError::InvalidFormat {
            context: context.to_owned(),
            reason: "expected the stored restaurant object".to_owned(),
        });
    }
    Ok(normalize_restaurant(RawRestaurant::from_value(body)))
}
