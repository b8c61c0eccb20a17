//! HTTP client for the restaurant service.
//!
//! Wraps `reqwest` with bearer-credential handling, defensive JSON parsing and
//! the status-code mapping into [`ServiceError`]. Endpoint groups live in
//! submodules; all of them go through [`RestaurantClient::execute`].

mod auth;
mod listings;
mod search;

use std::time::Duration;

use delights_core::AppConfig;
use reqwest::{Client, RequestBuilder, Url};
use serde_json::Value;

use crate::error::ServiceError;

pub use search::RestaurantSearch;

/// Fallback messages used when the service does not supply its own text.
///
/// Each endpoint group has its own wording so notifications read naturally
/// ("Search service unavailable" vs "Login service unavailable").
#[derive(Debug, Clone, Copy)]
pub(crate) struct ErrorMessages {
    pub(crate) bad_request: &'static str,
    /// HTTP 401.
    pub(crate) unauthorized: &'static str,
    /// HTTP 403.
    pub(crate) forbidden: &'static str,
    pub(crate) not_found: &'static str,
}

/// Client for the restaurant REST service.
///
/// Use [`RestaurantClient::new`] with an explicit base URL (tests point it at
/// a `wiremock` server) or [`RestaurantClient::from_config`].
#[derive(Debug, Clone)]
pub struct RestaurantClient {
    client: Client,
    base_url: Url,
}

impl RestaurantClient {
    /// Creates a client with the given base URL, timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Client`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ServiceError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute URL.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `Url::join` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ServiceError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// See [`RestaurantClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        Self::new(
            &config.api_url,
            config.request_timeout_secs,
            &config.user_agent,
        )
    }

    /// Resolves `path` (no leading slash) against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|e| ServiceError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })
    }

    /// Attaches `Authorization: Bearer <credential>` when a non-blank
    /// credential is present.
    fn authorize(request: RequestBuilder, credential: Option<&str>) -> RequestBuilder {
        match credential.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Sends `request`, maps non-2xx statuses to typed errors and parses the
    /// body as JSON. An empty 2xx body yields `Value::Null`.
    ///
    /// Every failure is logged once here, with `context` naming the call.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Timeout`] or [`ServiceError::Unknown`] on transport failure.
    /// - The status mapping of [`map_status`] on a non-2xx response.
    /// - [`ServiceError::InvalidFormat`] if a 2xx body is not valid JSON.
    pub(crate) async fn execute(
        &self,
        request: RequestBuilder,
        context: &str,
        messages: &ErrorMessages,
    ) -> Result<Value, ServiceError> {
        let result = Self::execute_inner(request, context, messages).await;
        if let Err(err) = &result {
            tracing::warn!(
                context,
                status = err.status(),
                kind = ?err.kind(),
                error = %err,
                "restaurant service request failed"
            );
        }
        result
    }

    async fn execute_inner(
        request: RequestBuilder,
        context: &str,
        messages: &ErrorMessages,
    ) -> Result<Value, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(&e, context))?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&e, context))?;

        if !status.is_success() {
            let parsed = serde_json::from_str::<Value>(&body).unwrap_or(Value::Null);
            return Err(map_status(status.as_u16(), &parsed, &url, messages));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| ServiceError::InvalidFormat {
            context: context.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Maps a transport failure: timeouts get their own kind, everything else is
/// `Unknown` carrying the transport message.
fn transport_error(err: &reqwest::Error, context: &str) -> ServiceError {
    if err.is_timeout() {
        ServiceError::Timeout {
            context: context.to_owned(),
        }
    } else {
        ServiceError::Unknown {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Maps a non-2xx status to a [`ServiceError`], most specific first.
pub(crate) fn map_status(
    status: u16,
    body: &Value,
    url: &str,
    messages: &ErrorMessages,
) -> ServiceError {
    match status {
        400 => ServiceError::BadRequest {
            status: Some(status),
            message: server_message(body).unwrap_or_else(|| messages.bad_request.to_owned()),
        },
        401 => ServiceError::Unauthorized {
            status,
            message: messages.unauthorized.to_owned(),
        },
        403 => ServiceError::Unauthorized {
            status,
            message: messages.forbidden.to_owned(),
        },
        404 => ServiceError::ServiceUnavailable {
            url: url.to_owned(),
            message: messages.not_found.to_owned(),
        },
        _ => ServiceError::Unknown {
            status: Some(status),
            message: server_message(body)
                .unwrap_or_else(|| format!("Request failed with status code {status}")),
        },
    }
}

/// Extracts a human-readable message from an error body.
///
/// Validation failures arrive as `{"errors": [{"msg": ...}, ...]}` and are
/// joined with `", "`; everything else uses `{"error": "..."}`.
pub(crate) fn server_message(body: &Value) -> Option<String> {
    let validation: Vec<&str> = body
        .get("errors")
        .and_then(Value::as_array)
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    if !validation.is_empty() {
        return Some(validation.join(", "));
    }
    body.get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
