//! Login, signup and session-check endpoints.
//!
//! Successful logins store the returned token in the [`SessionStore`]; a
//! failed session check clears it. Persistence failures are logged and do not
//! fail the call, since the in-memory credential has already changed.

use serde_json::{json, Value};

use super::{ErrorMessages, RestaurantClient};
use crate::error::ServiceError;
use crate::session::SessionStore;
use crate::types::{NewAccount, SearchRequest};

const LOGIN_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Login failed. Please try again.",
    unauthorized: "Invalid email or password.",
    forbidden: "Invalid email or password.",
    not_found: "Login service unavailable. Please try again later.",
};

const SIGNUP_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Invalid registration data",
    unauthorized: "Registration failed",
    forbidden: "Registration failed",
    not_found: "Registration service unavailable",
};

const CHECK_MESSAGES: ErrorMessages = ErrorMessages {
    bad_request: "Authentication check failed",
    unauthorized: "Invalid or expired session",
    forbidden: "Invalid or expired session",
    not_found: "Authentication check unavailable",
};

impl RestaurantClient {
    /// Logs in with `POST /login` and stores the returned token.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unauthorized`] for wrong credentials.
    /// - [`ServiceError::InvalidFormat`] if the response carries no token.
    /// - The usual status/transport mapping otherwise.
    pub async fn login(
        &self,
        session: &SessionStore,
        email: &str,
        password: &str,
    ) -> Result<String, ServiceError> {
        let url = self.endpoint("login")?;
        let builder = self.client.post(url).json(&json!({
            "email": email.trim(),
            "password": password,
        }));
        let body = self.execute(builder, "login", &LOGIN_MESSAGES).await?;
        let token = token_from_body(&body, "login")?;
        store_token(session, &token);
        tracing::info!("logged in");
        Ok(token)
    }

    /// Registers with `POST /signup` and stores the returned token.
    ///
    /// # Errors
    ///
    /// Same as [`RestaurantClient::login`].
    pub async fn signup(
        &self,
        session: &SessionStore,
        account: &NewAccount,
    ) -> Result<String, ServiceError> {
        let url = self.endpoint("signup")?;
        let builder = self.client.post(url).json(&json!({
            "firstname": account.firstname.trim(),
            "lastname": account.lastname.trim(),
            "email": account.email.trim(),
            "password": account.password,
            "role": account.role,
        }));
        let body = self.execute(builder, "signup", &SIGNUP_MESSAGES).await?;
        let token = token_from_body(&body, "signup")?;
        store_token(session, &token);
        tracing::info!("account created");
        Ok(token)
    }

    /// Confirms that the stored credential is still accepted.
    ///
    /// Calls `GET /check-auth`; when that endpoint does not exist (404) a
    /// one-record search is used instead. Any failure clears the session.
    ///
    /// # Errors
    ///
    /// - [`ServiceError::Unauthorized`] if there is no credential or it was
    ///   rejected.
    /// - Whatever the check (or its fallback search) returned otherwise.
    pub async fn verify_session(&self, session: &SessionStore) -> Result<(), ServiceError> {
        let Some(credential) = session.credential() else {
            return Err(ServiceError::Unauthorized {
                status: 401,
                message: "Please log in to view restaurants".to_owned(),
            });
        };

        let url = self.endpoint("check-auth")?;
        let builder = Self::authorize(self.client.get(url), Some(&credential));
        let result = match self.execute(builder, "check-auth", &CHECK_MESSAGES).await {
            Err(ServiceError::ServiceUnavailable { .. }) => {
                tracing::debug!("check-auth endpoint missing; validating with a search");
                let lookup = SearchRequest {
                    page: 1,
                    page_size: 1,
                    query: String::new(),
                    filters: delights_core::SearchFilters::default(),
                };
                self.search_restaurants(&lookup, Some(&credential))
                    .await
                    .map(|_| ())
            }
            other => other.map(|_| ()),
        };

        if result.is_err() {
            if let Err(e) = session.clear() {
                tracing::warn!(error = %e, "failed to persist cleared session");
            }
        }
        result
    }
}

fn token_from_body(body: &Value, context: &str) -> Result<String, ServiceError> {
    body.get("token")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| ServiceError::InvalidFormat {
            context: context.to_owned(),
            reason: "No token received".to_owned(),
        })
}

fn store_token(session: &SessionStore, token: &str) {
    if let Err(e) = session.set(token) {
        tracing::warn!(error = %e, "failed to persist session credential");
    }
}
