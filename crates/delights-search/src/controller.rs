//! Debounced query controller.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle --submit/go_to_page--> (quiet period) --> Pending --> Settled
//!                                  ^                            |
//!                                  +---------- submit ----------+
//! ```
//!
//! Every `submit_query` and accepted `go_to_page` bumps a sequence number.
//! A completion is applied only when its sequence number is still the
//! latest; older completions are dropped on arrival. At most one debounce
//! timer exists at a time and it is aborted whenever a newer call arrives.
//! Aborting a timer never aborts a fetch that has already started.
//!
//! All methods must be called from within a Tokio runtime.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use delights_api::{
    normalize_restaurants, ErrorKind, RestaurantSearch, SearchPage, SearchRequest, ServiceError,
    SessionStore,
};
use delights_core::{AppConfig, QueryState, ResultPage, SearchFilters};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Notice shown when a search is attempted without a session.
pub const LOGIN_REQUIRED: &str = "Please log in to view restaurants";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Quiet period after the last `submit_query` before a fetch starts.
    pub quiet_period: Duration,
    pub page_size: u32,
    /// When set, a fetch with no stored credential settles as unauthorized
    /// without contacting the service.
    pub require_session: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            quiet_period: Duration::from_millis(500),
            page_size: 10,
            require_session: true,
        }
    }
}

impl ControllerSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            quiet_period: Duration::from_millis(config.search_debounce_ms),
            page_size: config.search_page_size.max(1),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing has been fetched yet.
    Idle,
    /// The latest fetch is in flight.
    Pending,
    /// The latest fetch resolved, successfully or not.
    Settled,
}

/// What the presentation layer reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// A new result page is current.
    Results(ResultPage),
    /// A one-line transient notification.
    Notice(String),
    /// The session is gone; navigate to the login screen.
    RedirectToLogin,
}

/// Owns the query state for one results screen.
///
/// Dropping the controller cancels a pending debounce timer. A fetch that is
/// already in flight still completes, but its result has nowhere to go.
pub struct QueryController<S: RestaurantSearch> {
    shared: Arc<Shared<S>>,
}

struct Shared<S> {
    service: S,
    session: SessionStore,
    settings: ControllerSettings,
    state: Mutex<ControllerState>,
    events: mpsc::UnboundedSender<ControllerEvent>,
}

struct ControllerState {
    query: QueryState,
    status: FetchStatus,
    current: Option<ResultPage>,
    latest_seq: u64,
    timer: Option<JoinHandle<()>>,
}

impl<S: RestaurantSearch> QueryController<S> {
    /// Creates a controller and the receiver for its events.
    pub fn new(
        service: S,
        session: SessionStore,
        settings: ControllerSettings,
    ) -> (Self, mpsc::UnboundedReceiver<ControllerEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            service,
            session,
            settings,
            state: Mutex::new(ControllerState {
                query: QueryState::default(),
                status: FetchStatus::Idle,
                current: None,
                latest_seq: 0,
                timer: None,
            }),
            events,
        });
        (Self { shared }, rx)
    }

    /// Replaces the query and filters, moves to page 1, and schedules a fetch
    /// after the quiet period. Any fetch scheduled by an earlier call that has
    /// not started yet is cancelled.
    pub fn submit_query(&self, free_text_query: impl Into<String>, filters: SearchFilters) {
        let mut state = self.shared.lock();
        state.query.reset(free_text_query.into(), filters);
        let seq = state.bump();

        let shared = Arc::clone(&self.shared);
        let quiet_period = self.shared.settings.quiet_period;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            Shared::start_fetch(&shared, seq);
        }));
        tracing::debug!(seq, "search scheduled");
    }

    /// Moves to page `n` and fetches it immediately.
    ///
    /// Returns `false` (and changes nothing) unless `1 <= n <= total_pages`,
    /// using the last known page count. While a submitted query is still
    /// waiting out its quiet period that count belongs to the previous query;
    /// the fetch that follows reports the new total. An accepted call also
    /// cancels any debounced fetch still waiting, since its query is already
    /// current.
    pub fn go_to_page(&self, n: u32) -> bool {
        let seq = {
            let mut state = self.shared.lock();
            if !state.query.accepts_page(n) {
                tracing::debug!(
                    requested = n,
                    total_pages = state.query.total_pages,
                    "page out of range"
                );
                return false;
            }
            state.query.page = n;
            state.bump()
        };
        Shared::start_fetch(&self.shared, seq);
        true
    }

    /// The last page applied, or `None` before the first fetch settles.
    #[must_use]
    pub fn current_result_page(&self) -> Option<ResultPage> {
        self.shared.lock().current.clone()
    }

    #[must_use]
    pub fn status(&self) -> FetchStatus {
        self.shared.lock().status
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.shared.lock().query.page
    }

    #[must_use]
    pub fn total_pages(&self) -> u32 {
        self.shared.lock().query.total_pages
    }

    #[must_use]
    pub fn query_state(&self) -> QueryState {
        self.shared.lock().query.clone()
    }
}

impl<S: RestaurantSearch> Drop for QueryController<S> {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            timer.abort();
        }
    }
}

impl ControllerState {
    /// Supersedes everything issued so far and cancels the waiting timer.
    fn bump(&mut self) -> u64 {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.latest_seq += 1;
        self.latest_seq
    }
}

impl<S: RestaurantSearch> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: ControllerEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("controller event receiver dropped");
        }
    }

    /// Starts fetch `seq` unless it has been superseded.
    fn start_fetch(this: &Arc<Self>, seq: u64) {
        let request = {
            let mut state = this.lock();
            if state.latest_seq != seq {
                return;
            }
            state.status = FetchStatus::Pending;
            SearchRequest {
                page: state.query.page,
                page_size: this.settings.page_size,
                query: state.query.free_text_query.clone(),
                filters: state.query.filters.clone(),
            }
        };

        // Read at fetch time so a clear is seen by the very next fetch.
        let credential = this.session.credential();
        if credential.is_none() && this.settings.require_session {
            tracing::debug!(seq, "no session credential; skipping search");
            this.complete(
                seq,
                Err(ServiceError::Unauthorized {
                    status: 401,
                    message: LOGIN_REQUIRED.to_owned(),
                }),
            );
            return;
        }

        tracing::debug!(seq, page = request.page, "search started");
        let shared = Arc::clone(this);
        tokio::spawn(async move {
            let result = shared.service.search(&request, credential.as_deref()).await;
            shared.complete(seq, result);
        });
    }

    /// Applies the outcome of fetch `seq` if it is still the latest.
    fn complete(&self, seq: u64, result: Result<SearchPage, ServiceError>) {
        let mut state = self.lock();
        if state.latest_seq != seq {
            tracing::debug!(seq, latest = state.latest_seq, "discarding stale search result");
            return;
        }
        state.status = FetchStatus::Settled;

        match result {
            Ok(page) => {
                let total_pages = page.total_pages.max(1);
                state.query.total_pages = total_pages;
                let result_page = ResultPage {
                    restaurants: normalize_restaurants(page.records),
                    page: state.query.page,
                    total_pages,
                };
                state.current = Some(result_page.clone());
                drop(state);
                tracing::debug!(
                    seq,
                    count = result_page.restaurants.len(),
                    total_pages,
                    "search settled"
                );
                self.emit(ControllerEvent::Results(result_page));
            }
            Err(err) if err.kind() == ErrorKind::Unauthorized => {
                let empty = ResultPage::empty(state.query.page, state.query.total_pages);
                state.current = Some(empty.clone());
                drop(state);
                tracing::info!(seq, "session rejected; clearing credential");
                if let Err(e) = self.session.clear() {
                    tracing::warn!(error = %e, "failed to persist cleared session");
                }
                self.emit(ControllerEvent::Notice(err.display_message()));
                self.emit(ControllerEvent::RedirectToLogin);
                self.emit(ControllerEvent::Results(empty));
            }
            Err(err) => {
                let first = if state.current.is_none() {
                    let empty = ResultPage::empty(state.query.page, state.query.total_pages);
                    state.current = Some(empty.clone());
                    Some(empty)
                } else {
                    None
                };
                drop(state);
                if err.kind() == ErrorKind::InvalidFormat {
                    tracing::error!(seq, error = %err, "search response violated contract");
                } else {
                    tracing::warn!(seq, error = %err, "search failed");
                }
                self.emit(ControllerEvent::Notice(format!(
                    "Error: {}",
                    err.display_message()
                )));
                if let Some(empty) = first {
                    self.emit(ControllerEvent::Results(empty));
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
